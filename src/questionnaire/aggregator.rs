//! Answer Aggregator
//!
//! Converts a batch of questionnaire answers into one technical value per
//! criterion:
//! 1. Resolve each answer to (criterion, option value) via the questionnaire
//! 2. Average the values per criterion
//! 3. Fill unanswered criteria with safe defaults
//! 4. Map the averaged soil proxy back to a texture category
//!
//! Unknown question ids or option codes are handled by an explicit
//! `UnknownAnswerPolicy`; the default skips them.

use super::{OptionValue, Questionnaire};
use crate::criteria::{Criterion, CRITERIA_COUNT};
use crate::error::{EngineError, EngineResult};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::sync::OnceLock;

pub const DEFAULT_PH: f64 = 6.0;
pub const DEFAULT_RAIN: f64 = 1500.0;
pub const DEFAULT_TEMP: f64 = 25.0;
pub const DEFAULT_SUN: f64 = 0.6;
pub const DEFAULT_IRRIGATION: f64 = 0.6;
pub const DEFAULT_SOIL: SoilCategory = SoilCategory::Loam;

/// One submitted answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAnswer {
    pub question_id: String,
    /// Option code ('A', 'B', 'C')
    pub selected_option: String,
}

impl UserAnswer {
    pub fn new(question_id: impl Into<String>, selected_option: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            selected_option: selected_option.into(),
        }
    }
}

/// What to do with an answer that references an unknown question or option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownAnswerPolicy {
    /// Ignore it; the criterion may fall back to its default
    #[default]
    Skip,
    /// Fail the whole batch on the first unknown reference
    Reject,
}

/// Soil texture categories behind the 1/2/3 proxy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoilCategory {
    Clay,
    Loam,
    Sandy,
}

impl SoilCategory {
    /// Round an averaged proxy to the nearest category; out-of-range values map to Loam
    pub fn from_proxy(average: f64) -> Self {
        match average.round() as i64 {
            1 => SoilCategory::Clay,
            2 => SoilCategory::Loam,
            3 => SoilCategory::Sandy,
            _ => DEFAULT_SOIL,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SoilCategory::Clay => "Clay",
            SoilCategory::Loam => "Loam",
            SoilCategory::Sandy => "Sandy",
        }
    }
}

/// Resolved site measurements, one per criterion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalValues {
    /// Soil pH
    pub ph: f64,
    /// Annual rainfall (mm/year)
    pub rain: f64,
    /// Mean temperature (°C)
    pub temp: f64,
    /// Sun intensity (0-1)
    pub sun: f64,
    /// Irrigation availability (0-1)
    pub irrigation: f64,
    /// Soil texture category ("Clay", "Loam", "Sandy", or free text from direct input)
    pub soil: String,
}

impl Default for TechnicalValues {
    fn default() -> Self {
        Self {
            ph: DEFAULT_PH,
            rain: DEFAULT_RAIN,
            temp: DEFAULT_TEMP,
            sun: DEFAULT_SUN,
            irrigation: DEFAULT_IRRIGATION,
            soil: DEFAULT_SOIL.as_str().to_string(),
        }
    }
}

type Bucket = SmallVec<[f64; 4]>;

struct QuestionEntry {
    criterion: Criterion,
    options: FxHashMap<String, OptionValue>,
}

/// Question-id lookup built once from a questionnaire
pub struct AnswerAggregator {
    lookup: FxHashMap<String, QuestionEntry>,
    policy: UnknownAnswerPolicy,
}

impl AnswerAggregator {
    pub fn new(questionnaire: &Questionnaire) -> Self {
        let lookup = questionnaire
            .questions()
            .iter()
            .map(|q| {
                let options = q
                    .options
                    .iter()
                    .map(|o| (o.value_code.clone(), o.value))
                    .collect();
                (
                    q.id.clone(),
                    QuestionEntry {
                        criterion: q.category,
                        options,
                    },
                )
            })
            .collect();

        Self {
            lookup,
            policy: UnknownAnswerPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: UnknownAnswerPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> UnknownAnswerPolicy {
        self.policy
    }

    /// Aggregate under the configured policy
    pub fn aggregate(&self, answers: &[UserAnswer]) -> EngineResult<TechnicalValues> {
        let buckets = self.bucket(answers, self.policy)?;
        Ok(finish(&buckets))
    }

    /// Aggregate, skipping unknown references regardless of the configured policy
    pub fn map_answers_to_values(&self, answers: &[UserAnswer]) -> TechnicalValues {
        self.bucket(answers, UnknownAnswerPolicy::Skip)
            .map(|buckets| finish(&buckets))
            .unwrap_or_default()
    }

    fn resolve(&self, answer: &UserAnswer) -> EngineResult<(Criterion, f64)> {
        let entry = self
            .lookup
            .get(&answer.question_id)
            .ok_or_else(|| EngineError::UnknownQuestion(answer.question_id.clone()))?;

        let value = entry
            .options
            .get(&answer.selected_option)
            .ok_or_else(|| EngineError::UnknownOption {
                question_id: answer.question_id.clone(),
                code: answer.selected_option.clone(),
            })?;

        Ok((entry.criterion, value.as_f64()))
    }

    fn bucket(
        &self,
        answers: &[UserAnswer],
        policy: UnknownAnswerPolicy,
    ) -> EngineResult<[Bucket; CRITERIA_COUNT]> {
        let mut buckets: [Bucket; CRITERIA_COUNT] = Default::default();
        let mut skipped = 0usize;

        for answer in answers {
            match self.resolve(answer) {
                Ok((criterion, value)) => buckets[criterion.index()].push(value),
                Err(e) => match policy {
                    UnknownAnswerPolicy::Skip => {
                        tracing::debug!("Skipping answer: {}", e);
                        skipped += 1;
                    }
                    UnknownAnswerPolicy::Reject => return Err(e),
                },
            }
        }

        tracing::debug!(
            "Aggregated {} answers ({} skipped)",
            answers.len() - skipped,
            skipped
        );

        Ok(buckets)
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn finish(buckets: &[Bucket; CRITERIA_COUNT]) -> TechnicalValues {
    let avg = |c: Criterion| mean(&buckets[c.index()]);

    let soil = avg(Criterion::Soil)
        .map(SoilCategory::from_proxy)
        .unwrap_or(DEFAULT_SOIL);

    TechnicalValues {
        ph: avg(Criterion::Ph).unwrap_or(DEFAULT_PH),
        rain: avg(Criterion::Rain).unwrap_or(DEFAULT_RAIN),
        temp: avg(Criterion::Temp).unwrap_or(DEFAULT_TEMP),
        sun: avg(Criterion::Sun).unwrap_or(DEFAULT_SUN),
        irrigation: avg(Criterion::Irrigation).unwrap_or(DEFAULT_IRRIGATION),
        soil: soil.as_str().to_string(),
    }
}

static STANDARD_AGGREGATOR: OnceLock<AnswerAggregator> = OnceLock::new();

/// Aggregator over the built-in questionnaire, built on first use
pub fn standard_aggregator() -> &'static AnswerAggregator {
    STANDARD_AGGREGATOR.get_or_init(|| AnswerAggregator::new(&Questionnaire::standard()))
}

/// Aggregate against the built-in questionnaire, skipping unknown references
pub fn map_answers_to_values(answers: &[UserAnswer]) -> TechnicalValues {
    standard_aggregator().map_answers_to_values(answers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn answers(pairs: &[(&str, &str)]) -> Vec<UserAnswer> {
        pairs.iter().map(|(q, o)| UserAnswer::new(*q, *o)).collect()
    }

    #[test]
    fn test_two_ph_answers_average() {
        let values = map_answers_to_values(&answers(&[("q_ph_1", "A"), ("q_ph_2", "C")]));
        assert_relative_eq!(values.ph, 7.0);
    }

    #[test]
    fn test_mixed_ph_answers_average() {
        // 7.0, 5.0, 7.0 -> 6.333..
        let values = map_answers_to_values(&answers(&[
            ("q_ph_1", "A"),
            ("q_ph_2", "A"),
            ("q_ph_3", "C"),
        ]));
        assert_relative_eq!(values.ph, 19.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_no_answers_gives_defaults() {
        let values = map_answers_to_values(&[]);
        assert_eq!(values, TechnicalValues::default());
        assert_relative_eq!(values.ph, 6.0);
        assert_relative_eq!(values.rain, 1500.0);
        assert_relative_eq!(values.temp, 25.0);
        assert_relative_eq!(values.sun, 0.6);
        assert_relative_eq!(values.irrigation, 0.6);
        assert_eq!(values.soil, "Loam");
    }

    #[test]
    fn test_unanswered_criterion_defaults_independently() {
        let values = map_answers_to_values(&answers(&[("q_rain_1", "C"), ("q_sun_2", "A")]));
        assert_relative_eq!(values.rain, 2500.0);
        assert_relative_eq!(values.sun, 0.3);
        assert_relative_eq!(values.ph, DEFAULT_PH);
        assert_relative_eq!(values.irrigation, DEFAULT_IRRIGATION);
    }

    #[test]
    fn test_unknown_references_are_skipped() {
        let values = map_answers_to_values(&answers(&[
            ("q_ph_1", "Z"),
            ("q_nonexistent", "A"),
            ("q_temp_1", "C"),
        ]));
        assert_relative_eq!(values.ph, DEFAULT_PH);
        assert_relative_eq!(values.temp, 32.0);
    }

    #[test]
    fn test_reject_policy_fails_on_unknown_question() {
        let aggregator = AnswerAggregator::new(&Questionnaire::standard())
            .with_policy(UnknownAnswerPolicy::Reject);
        let result = aggregator.aggregate(&answers(&[("q_temp_1", "B"), ("q_wind", "A")]));
        assert!(matches!(result, Err(EngineError::UnknownQuestion(id)) if id == "q_wind"));
    }

    #[test]
    fn test_reject_policy_fails_on_unknown_option() {
        let aggregator = AnswerAggregator::new(&Questionnaire::standard())
            .with_policy(UnknownAnswerPolicy::Reject);
        let result = aggregator.aggregate(&answers(&[("q_soil_1", "D")]));
        assert!(matches!(result, Err(EngineError::UnknownOption { code, .. }) if code == "D"));

        // The lenient path still succeeds with the same aggregator
        let values = aggregator.map_answers_to_values(&answers(&[("q_soil_1", "D")]));
        assert_eq!(values.soil, "Loam");
    }

    #[test]
    fn test_soil_proxy_rounding() {
        // Clay (1) + Sandy (3) -> 2 -> Loam
        let values = map_answers_to_values(&answers(&[("q_soil_1", "A"), ("q_soil_2", "C")]));
        assert_eq!(values.soil, "Loam");

        // Loam (2) + Sandy (3) -> 2.5 -> 3 -> Sandy
        let values = map_answers_to_values(&answers(&[("q_soil_1", "B"), ("q_soil_2", "C")]));
        assert_eq!(values.soil, "Sandy");

        let values = map_answers_to_values(&answers(&[("q_soil_1", "A"), ("q_soil_2", "A")]));
        assert_eq!(values.soil, "Clay");
    }

    #[test]
    fn test_standard_aggregator_built_once() {
        let first = standard_aggregator();
        let second = standard_aggregator();
        assert!(std::ptr::eq(first, second));
        assert_eq!(first.policy(), UnknownAnswerPolicy::Skip);
        assert_eq!(
            first.map_answers_to_values(&answers(&[("q_ph_1", "A")])),
            map_answers_to_values(&answers(&[("q_ph_1", "A")]))
        );
    }

    #[test]
    fn test_soil_category_from_proxy() {
        assert_eq!(SoilCategory::from_proxy(1.4), SoilCategory::Clay);
        assert_eq!(SoilCategory::from_proxy(1.5), SoilCategory::Loam);
        assert_eq!(SoilCategory::from_proxy(0.2), SoilCategory::Loam);
        assert_eq!(SoilCategory::from_proxy(4.0), SoilCategory::Loam);
    }

    #[test]
    fn test_all_high_resource_answers() {
        let values = map_answers_to_values(&answers(&[
            ("q_rain_1", "C"),
            ("q_rain_2", "C"),
            ("q_sun_1", "C"),
            ("q_sun_2", "C"),
            ("q_irr_1", "C"),
            ("q_irr_2", "C"),
            ("q_soil_1", "B"),
            ("q_soil_2", "B"),
        ]));
        assert_relative_eq!(values.rain, 2500.0);
        assert_relative_eq!(values.sun, 1.0);
        assert_relative_eq!(values.irrigation, 1.0);
        assert_eq!(values.soil, "Loam");
    }
}
