//! Crop Recommender
//!
//! Multi-criteria crop recommendation: a farmer answers a short questionnaire,
//! the answers are aggregated into six technical site values, and every crop
//! in the catalog is ranked by an AHP-weighted match score.
//!
//! ## Architecture
//! - `criteria`: the six fixed criteria and their canonical order
//! - `weighting`: AHP pairwise matrix, priority weights, consistency ratio
//! - `matching`: numeric-range, categorical and level match scorers
//! - `questionnaire/`: question catalog and answer aggregation
//! - `data`: crop catalog loading (Polars) and the crop store seam
//! - `scorer`: per-crop scoring and ranking (sequential + Rayon)
//! - `explanation`: plain-text / markdown formatters for tools and reports
//! - `api_server`: Axum HTTP surface (feature `api`)

pub mod criteria;
pub mod error;
pub mod weighting;
pub mod matching;
pub mod questionnaire;
pub mod data;
pub mod scorer;
pub mod explanation;

#[cfg(feature = "api")]
pub mod api_server;

// Re-export commonly used types
pub use criteria::{Criterion, CRITERIA_COUNT};
pub use error::{EngineError, EngineResult};
pub use weighting::{
    compute_consistency_ratio, compute_weights, AhpModel, PairwiseMatrix, WeightVector,
};
pub use matching::{categorical_match, level_match, numeric_match};
pub use questionnaire::{
    map_answers_to_values, standard_aggregator, AnswerAggregator, Questionnaire, TechnicalValues,
    UnknownAnswerPolicy, UserAnswer,
};
pub use data::{
    catalog_fingerprint, load_catalog, Crop, CropStore, InMemoryCropStore, UserInputRecord,
};
pub use scorer::{rank_crops, rank_crops_parallel, MatchDetails, Recommendation};

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState, ServerConfig};
