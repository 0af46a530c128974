//! AHP Weighting Engine
//!
//! Derives criterion weights from a pairwise comparison matrix using the
//! normalize-and-average approximation of the principal eigenvector, then
//! checks the judgments with Saaty's consistency ratio.
//!
//! The expert matrix encodes:
//! - water (rain + irrigation) strongly dominates temperature/sun (5)
//! - soil type and pH are moderately more important than temperature/sun (3)
//!
//! ```text
//!        pH   Rain Temp Sun  Irr  Soil
//! pH     1    1/3  3    3    1/3  1
//! Rain   3    1    5    5    1    3
//! Temp   1/3  1/5  1    1    1/5  1/3
//! Sun    1/3  1/5  1    1    1/5  1/3
//! Irr    3    1    5    5    1    3
//! Soil   1    1/3  3    3    1/3  1
//! ```

use crate::criteria::{Criterion, CRITERIA_COUNT};
use crate::error::{EngineError, EngineResult};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Conventional acceptability threshold for the consistency ratio
pub const CONSISTENCY_THRESHOLD: f64 = 0.10;

const RECIPROCAL_TOLERANCE: f64 = 1e-6;

/// Saaty random consistency index, indexed by matrix size (n = 1..=10)
const RANDOM_INDEX: [f64; 10] = [0.0, 0.0, 0.58, 0.90, 1.12, 1.24, 1.32, 1.41, 1.45, 1.49];

/// Random index for an n×n matrix (published AHP table)
///
/// Sizes beyond the table reuse the last entry.
pub fn random_index(n: usize) -> f64 {
    match n {
        0 => 0.0,
        n if n <= RANDOM_INDEX.len() => RANDOM_INDEX[n - 1],
        _ => RANDOM_INDEX[RANDOM_INDEX.len() - 1],
    }
}

/// Square reciprocal matrix over the criteria, rows/columns in `Criterion::ALL` order
#[derive(Debug, Clone, PartialEq)]
pub struct PairwiseMatrix {
    cells: [[f64; CRITERIA_COUNT]; CRITERIA_COUNT],
}

impl PairwiseMatrix {
    /// Build from explicit rows, validating positivity, unit diagonal and reciprocity
    pub fn new(cells: [[f64; CRITERIA_COUNT]; CRITERIA_COUNT]) -> EngineResult<Self> {
        for i in 0..CRITERIA_COUNT {
            for j in 0..CRITERIA_COUNT {
                let value = cells[i][j];
                if !value.is_finite() || value <= 0.0 {
                    return Err(EngineError::InvalidMatrix(format!(
                        "entry ({}, {}) = {} must be a positive number",
                        Criterion::ALL[i],
                        Criterion::ALL[j],
                        value
                    )));
                }
            }
            if (cells[i][i] - 1.0).abs() > RECIPROCAL_TOLERANCE {
                return Err(EngineError::InvalidMatrix(format!(
                    "diagonal entry for {} is {}, expected 1",
                    Criterion::ALL[i],
                    cells[i][i]
                )));
            }
        }

        for i in 0..CRITERIA_COUNT {
            for j in (i + 1)..CRITERIA_COUNT {
                if (cells[i][j] * cells[j][i] - 1.0).abs() > RECIPROCAL_TOLERANCE {
                    return Err(EngineError::InvalidMatrix(format!(
                        "entries ({0}, {1}) = {2} and ({1}, {0}) = {3} are not reciprocal",
                        Criterion::ALL[i],
                        Criterion::ALL[j],
                        cells[i][j],
                        cells[j][i]
                    )));
                }
            }
        }

        Ok(Self { cells })
    }

    /// Hardcoded expert judgments (see module docs)
    pub fn expert() -> Self {
        const T: f64 = 1.0 / 3.0;
        const F: f64 = 1.0 / 5.0;
        Self {
            cells: [
                [1.0, T, 3.0, 3.0, T, 1.0],   // ph
                [3.0, 1.0, 5.0, 5.0, 1.0, 3.0], // rain
                [T, F, 1.0, 1.0, F, T],       // temp
                [T, F, 1.0, 1.0, F, T],       // sun
                [3.0, 1.0, 5.0, 5.0, 1.0, 3.0], // irrigation
                [1.0, T, 3.0, 3.0, T, 1.0],   // soil
            ],
        }
    }

    pub fn get(&self, row: Criterion, col: Criterion) -> f64 {
        self.cells[row.index()][col.index()]
    }

    pub fn size(&self) -> usize {
        CRITERIA_COUNT
    }

    fn column_sums(&self) -> [f64; CRITERIA_COUNT] {
        let mut sums = [0.0; CRITERIA_COUNT];
        for row in &self.cells {
            for (j, value) in row.iter().enumerate() {
                sums[j] += value;
            }
        }
        sums
    }
}

/// Normalized importance per criterion (sums to 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightVector {
    weights: [f64; CRITERIA_COUNT],
}

impl WeightVector {
    pub fn get(&self, criterion: Criterion) -> f64 {
        self.weights[criterion.index()]
    }

    pub fn as_array(&self) -> &[f64; CRITERIA_COUNT] {
        &self.weights
    }

    pub fn iter(&self) -> impl Iterator<Item = (Criterion, f64)> + '_ {
        Criterion::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    pub fn sum(&self) -> f64 {
        self.weights.iter().sum()
    }
}

impl Serialize for WeightVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(CRITERIA_COUNT))?;
        for (criterion, weight) in self.iter() {
            map.serialize_entry(criterion.as_str(), &weight)?;
        }
        map.end()
    }
}

/// Priority vector by column normalization followed by row averaging
pub fn compute_weights(matrix: &PairwiseMatrix) -> WeightVector {
    let column_sums = matrix.column_sums();
    let n = matrix.size() as f64;

    let mut weights = [0.0; CRITERIA_COUNT];
    for (i, row) in matrix.cells.iter().enumerate() {
        let normalized_sum: f64 = row
            .iter()
            .zip(column_sums.iter())
            .map(|(value, col_sum)| value / col_sum)
            .sum();
        weights[i] = normalized_sum / n;
    }

    WeightVector { weights }
}

/// Consistency ratio CR = CI / RI
///
/// lambda_max is the mean of (A·w)_i / w_i. A zero weight yields a non-finite
/// ratio; this cannot occur for a matrix that passed `PairwiseMatrix::new`.
pub fn compute_consistency_ratio(matrix: &PairwiseMatrix, weights: &WeightVector) -> f64 {
    let n = matrix.size();
    let ri = random_index(n);
    if ri == 0.0 {
        return 0.0;
    }

    let w = weights.as_array();
    let lambda_max = matrix
        .cells
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let weighted_sum: f64 = row.iter().zip(w.iter()).map(|(a, b)| a * b).sum();
            weighted_sum / w[i]
        })
        .sum::<f64>()
        / n as f64;

    let ci = (lambda_max - n as f64) / (n as f64 - 1.0);
    ci / ri
}

/// Weights and consistency ratio derived once at startup
///
/// Immutable after construction; share it by reference or `Arc`.
#[derive(Debug, Clone)]
pub struct AhpModel {
    matrix: PairwiseMatrix,
    weights: WeightVector,
    consistency_ratio: f64,
}

impl AhpModel {
    /// Build the model from the expert matrix
    pub fn initialize() -> Self {
        Self::from_matrix(PairwiseMatrix::expert())
    }

    pub fn from_matrix(matrix: PairwiseMatrix) -> Self {
        let weights = compute_weights(&matrix);
        let consistency_ratio = compute_consistency_ratio(&matrix, &weights);

        if consistency_ratio > CONSISTENCY_THRESHOLD {
            tracing::warn!(
                "Pairwise matrix consistency ratio {:.4} exceeds {:.2}; weights are used as-is",
                consistency_ratio,
                CONSISTENCY_THRESHOLD
            );
        } else {
            tracing::debug!("AHP consistency ratio: {:.4}", consistency_ratio);
        }

        Self {
            matrix,
            weights,
            consistency_ratio,
        }
    }

    pub fn weights(&self) -> &WeightVector {
        &self.weights
    }

    pub fn consistency_ratio(&self) -> f64 {
        self.consistency_ratio
    }

    pub fn matrix(&self) -> &PairwiseMatrix {
        &self.matrix
    }

    /// CR within the conventional 0.10 threshold
    pub fn is_consistent(&self) -> bool {
        self.consistency_ratio <= CONSISTENCY_THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_weights_positive_and_normalized() {
        let weights = compute_weights(&PairwiseMatrix::expert());
        for (_, w) in weights.iter() {
            assert!(w > 0.0);
        }
        assert_relative_eq!(weights.sum(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_expert_weights() {
        let weights = compute_weights(&PairwiseMatrix::expert());

        // Water criteria dominate, temp/sun share the remainder
        assert_relative_eq!(weights.get(Criterion::Rain), 0.31667286015112106, epsilon = 1e-12);
        assert_relative_eq!(weights.get(Criterion::Irrigation), 0.31667286015112106, epsilon = 1e-12);
        assert_relative_eq!(weights.get(Criterion::Ph), 0.13024897807506505, epsilon = 1e-12);
        assert_relative_eq!(weights.get(Criterion::Soil), 0.13024897807506505, epsilon = 1e-12);
        assert_relative_eq!(weights.get(Criterion::Temp), 0.05307816177381395, epsilon = 1e-12);
        assert_relative_eq!(weights.get(Criterion::Sun), 0.05307816177381395, epsilon = 1e-12);
    }

    #[test]
    fn test_expert_consistency_ratio_regression() {
        let model = AhpModel::initialize();
        assert_relative_eq!(model.consistency_ratio(), 0.0124886067611183, epsilon = 1e-10);
        assert!(model.is_consistent());
    }

    #[test]
    fn test_model_keeps_source_matrix() {
        let model = AhpModel::initialize();
        assert_eq!(model.matrix(), &PairwiseMatrix::expert());
        assert_eq!(model.matrix().get(Criterion::Rain, Criterion::Temp), 5.0);
        assert_relative_eq!(model.matrix().get(Criterion::Temp, Criterion::Rain), 0.2);
    }

    #[test]
    fn test_perfectly_consistent_matrix_has_zero_cr() {
        let model = AhpModel::from_matrix(PairwiseMatrix::new([[1.0; 6]; 6]).unwrap());
        assert_relative_eq!(model.consistency_ratio(), 0.0, epsilon = 1e-12);
        for (_, w) in model.weights().iter() {
            assert_relative_eq!(w, 1.0 / 6.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_inconsistent_matrix_is_reported_not_rejected() {
        // ph >> rain, rain >> temp, yet temp >> ph
        let mut cells = [[1.0; 6]; 6];
        cells[0][1] = 9.0;
        cells[1][0] = 1.0 / 9.0;
        cells[1][2] = 9.0;
        cells[2][1] = 1.0 / 9.0;
        cells[2][0] = 9.0;
        cells[0][2] = 1.0 / 9.0;

        let model = AhpModel::from_matrix(PairwiseMatrix::new(cells).unwrap());
        assert!(model.consistency_ratio() > CONSISTENCY_THRESHOLD);
        assert!(!model.is_consistent());
        assert_relative_eq!(model.weights().sum(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rejects_non_reciprocal_matrix() {
        let mut cells = [[1.0; 6]; 6];
        cells[0][1] = 3.0;
        cells[1][0] = 3.0;
        assert!(matches!(
            PairwiseMatrix::new(cells),
            Err(EngineError::InvalidMatrix(_))
        ));
    }

    #[test]
    fn test_rejects_non_positive_entry() {
        let mut cells = [[1.0; 6]; 6];
        cells[2][3] = 0.0;
        assert!(PairwiseMatrix::new(cells).is_err());
    }

    #[test]
    fn test_expert_matrix_passes_validation() {
        let expert = PairwiseMatrix::expert();
        let rebuilt = PairwiseMatrix::new(expert.cells).unwrap();
        assert_eq!(rebuilt, expert);
        assert_relative_eq!(expert.get(Criterion::Rain, Criterion::Temp), 5.0);
        assert_relative_eq!(expert.get(Criterion::Temp, Criterion::Rain), 0.2);
    }

    #[test]
    fn test_random_index_table() {
        assert_eq!(random_index(1), 0.0);
        assert_eq!(random_index(2), 0.0);
        assert_eq!(random_index(6), 1.24);
        assert_eq!(random_index(15), 1.49);
    }

    #[test]
    fn test_weight_vector_serializes_as_map() {
        let json = serde_json::to_value(compute_weights(&PairwiseMatrix::expert())).unwrap();
        assert!(json["rain"].as_f64().unwrap() > json["temp"].as_f64().unwrap());
        assert_eq!(json.as_object().unwrap().len(), 6);
    }
}
