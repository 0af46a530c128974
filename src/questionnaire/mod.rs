//! Site Questionnaire
//!
//! Multiple-choice questions that stand in for soil tests and weather
//! records. Each question is tagged with the criterion it informs; several
//! questions may inform the same criterion, and their answers are averaged.
//!
//! ## Architecture
//! - `mod.rs` - Question/option types and the `Questionnaire` container
//! - `standard.rs` - Built-in 13-question questionnaire
//! - `aggregator.rs` - Answers -> averaged `TechnicalValues`

pub mod aggregator;
pub mod standard;

pub use aggregator::{
    map_answers_to_values, standard_aggregator, AnswerAggregator, SoilCategory, TechnicalValues,
    UnknownAnswerPolicy, UserAnswer,
};

use crate::criteria::Criterion;
use anyhow::{bail, Context, Result};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Value carried by an answer option
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionValue {
    /// Technical measurement (pH, mm/year, °C, 0-1 intensity)
    Measure(f64),
    /// Soil texture proxy: 1 = Clay, 2 = Loam, 3 = Sandy
    SoilProxy(u8),
}

impl OptionValue {
    /// Numeric form used for averaging
    pub fn as_f64(&self) -> f64 {
        match *self {
            OptionValue::Measure(v) => v,
            OptionValue::SoilProxy(p) => f64::from(p),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOption {
    /// Option code submitted by the client ('A', 'B', 'C')
    pub value_code: String,
    pub label: String,
    pub description: String,
    pub value: OptionValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    /// Criterion this question informs
    pub category: Criterion,
    pub options: Vec<QuestionOption>,
}

impl Question {
    pub fn option(&self, code: &str) -> Option<&QuestionOption> {
        self.options.iter().find(|o| o.value_code == code)
    }
}

/// Ordered question list, loaded once at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Questionnaire {
    questions: Vec<Question>,
}

impl Questionnaire {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// Built-in questionnaire (see `standard.rs`)
    pub fn standard() -> Self {
        standard::standard_questionnaire()
    }

    /// Load a questionnaire from a JSON array of questions
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read questionnaire file: {:?}", path))?;
        Self::from_json_str(&contents)
    }

    /// Parse and validate a JSON array of questions
    pub fn from_json_str(json: &str) -> Result<Self> {
        let questionnaire: Self =
            serde_json::from_str(json).with_context(|| "Failed to parse questionnaire JSON")?;
        questionnaire
            .validate()
            .with_context(|| "Invalid questionnaire")?;
        Ok(questionnaire)
    }

    /// Structural checks the aggregator relies on:
    /// - question ids are unique
    /// - every question has options, with unique codes
    /// - soil questions carry soil proxies (1-3), all others finite measures
    pub fn validate(&self) -> Result<()> {
        let mut ids = FxHashSet::default();
        for question in &self.questions {
            if !ids.insert(question.id.as_str()) {
                bail!("duplicate question id '{}'", question.id);
            }
            if question.options.is_empty() {
                bail!("question '{}' has no options", question.id);
            }

            let mut codes = FxHashSet::default();
            for option in &question.options {
                if !codes.insert(option.value_code.as_str()) {
                    bail!(
                        "question '{}' repeats option code '{}'",
                        question.id,
                        option.value_code
                    );
                }
                match (question.category.is_categorical(), option.value) {
                    (true, OptionValue::SoilProxy(p)) if (1..=3).contains(&p) => {}
                    (false, OptionValue::Measure(v)) if v.is_finite() => {}
                    (_, value) => bail!(
                        "option '{}' of {} question '{}' has an unusable value {:?}",
                        option.value_code,
                        question.category,
                        question.id,
                        value
                    ),
                }
            }
        }
        Ok(())
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn get(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Questions informing one criterion, in questionnaire order
    pub fn for_criterion(&self, criterion: Criterion) -> impl Iterator<Item = &Question> {
        self.questions.iter().filter(move |q| q.category == criterion)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
