//! Decision Criteria
//!
//! The six site criteria every crop is judged on. Their order is fixed and
//! indexes the rows/columns of the pairwise matrix, the weight vector and the
//! per-criterion score arrays.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of criteria in the decision model
pub const CRITERIA_COUNT: usize = 6;

/// One of the fixed site criteria
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    /// Soil acidity (pH units)
    Ph,
    /// Annual rainfall (mm/year)
    Rain,
    /// Mean air temperature (°C)
    Temp,
    /// Sun intensity on a 0-1 scale
    Sun,
    /// Water availability for irrigation on a 0-1 scale
    Irrigation,
    /// Soil texture category
    Soil,
}

impl Criterion {
    /// All criteria in matrix order
    pub const ALL: [Criterion; CRITERIA_COUNT] = [
        Criterion::Ph,
        Criterion::Rain,
        Criterion::Temp,
        Criterion::Sun,
        Criterion::Irrigation,
        Criterion::Soil,
    ];

    /// Row/column position in the pairwise matrix
    pub fn index(self) -> usize {
        match self {
            Criterion::Ph => 0,
            Criterion::Rain => 1,
            Criterion::Temp => 2,
            Criterion::Sun => 3,
            Criterion::Irrigation => 4,
            Criterion::Soil => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Criterion::Ph => "ph",
            Criterion::Rain => "rain",
            Criterion::Temp => "temp",
            Criterion::Sun => "sun",
            Criterion::Irrigation => "irrigation",
            Criterion::Soil => "soil",
        }
    }

    /// Parse a criterion tag ("ph", "rain", ...), case-insensitive
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        Criterion::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(tag))
    }

    /// True for the criterion matched by category rather than numeric range
    pub fn is_categorical(self) -> bool {
        matches!(self, Criterion::Soil)
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_order() {
        for (i, c) in Criterion::ALL.iter().enumerate() {
            assert_eq!(c.index(), i);
        }
    }

    #[test]
    fn test_from_tag() {
        assert_eq!(Criterion::from_tag("irrigation"), Some(Criterion::Irrigation));
        assert_eq!(Criterion::from_tag(" PH "), Some(Criterion::Ph));
        assert_eq!(Criterion::from_tag("humidity"), None);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Criterion::Rain).unwrap();
        assert_eq!(json, "\"rain\"");
        let back: Criterion = serde_json::from_str("\"soil\"").unwrap();
        assert_eq!(back, Criterion::Soil);
    }
}
