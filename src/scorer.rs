//! Ranking Engine
//!
//! Scores every crop against the site's technical values on all six criteria,
//! combines the per-criterion matches with the AHP weights, and returns the
//! catalog sorted by final score. Includes both sequential and parallel
//! (Rayon) implementations; both produce the same ordering.

use crate::criteria::Criterion;
use crate::data::Crop;
use crate::matching::{categorical_match, level_match, numeric_match};
use crate::questionnaire::TechnicalValues;
use crate::weighting::{AhpModel, WeightVector};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Per-criterion match scores kept for explanation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchDetails {
    pub ph: f64,
    pub rain: f64,
    pub temp: f64,
    pub sun: f64,
    pub irrigation: f64,
    pub soil: f64,
}

impl MatchDetails {
    pub fn get(&self, criterion: Criterion) -> f64 {
        match criterion {
            Criterion::Ph => self.ph,
            Criterion::Rain => self.rain,
            Criterion::Temp => self.temp,
            Criterion::Sun => self.sun,
            Criterion::Irrigation => self.irrigation,
            Criterion::Soil => self.soil,
        }
    }

    /// Weighted sum Σ weight[c] · score[c]
    pub fn weighted_sum(&self, weights: &WeightVector) -> f64 {
        Criterion::ALL
            .iter()
            .map(|&c| weights.get(c) * self.get(c))
            .sum()
    }
}

/// One ranked crop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub crop_name: String,
    /// Weighted score rounded to 4 decimals
    pub score: f64,
    pub match_details: MatchDetails,
}

/// Round to 4 decimals from the exact binary value, ties to even
///
/// Fixed-precision formatting is correctly rounded, so 0.03125 -> 0.0312 and
/// 0.00015 (stored just below the tie) -> 0.0001. Scaling by 1e4 first would
/// round both up.
fn round4(value: f64) -> f64 {
    format!("{:.4}", value).parse().unwrap_or(value)
}

/// Match one crop against the site on every criterion
pub fn match_crop(values: &TechnicalValues, crop: &Crop) -> MatchDetails {
    MatchDetails {
        ph: numeric_match(values.ph, crop.ph_min, crop.ph_max),
        rain: numeric_match(values.rain, crop.rain_min, crop.rain_max),
        temp: numeric_match(values.temp, crop.temp_min, crop.temp_max),
        sun: level_match(values.sun, &crop.sun_requirement),
        irrigation: level_match(values.irrigation, &crop.irrigation_need),
        soil: categorical_match(&values.soil, &crop.soil_type),
    }
}

/// Score one crop
pub fn score_crop(values: &TechnicalValues, weights: &WeightVector, crop: &Crop) -> Recommendation {
    let match_details = match_crop(values, crop);
    Recommendation {
        crop_name: crop.name.clone(),
        score: round4(match_details.weighted_sum(weights)),
        match_details,
    }
}

/// Stable descending sort; equal scores keep catalog order
fn sort_by_score(recommendations: &mut [Recommendation]) {
    recommendations.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}

/// Rank the catalog (sequential)
///
/// An empty catalog yields an empty list; callers treat that as "not found".
pub fn rank_crops(
    values: &TechnicalValues,
    weights: &WeightVector,
    crops: &[Crop],
) -> Vec<Recommendation> {
    let mut recommendations: Vec<Recommendation> = crops
        .iter()
        .map(|crop| score_crop(values, weights, crop))
        .collect();
    sort_by_score(&mut recommendations);
    recommendations
}

/// Rank the catalog, scoring crops in parallel
///
/// `collect` preserves catalog order, so the stable sort gives the same
/// result as `rank_crops`.
pub fn rank_crops_parallel(
    values: &TechnicalValues,
    weights: &WeightVector,
    crops: &[Crop],
) -> Vec<Recommendation> {
    let mut recommendations: Vec<Recommendation> = crops
        .par_iter()
        .map(|crop| score_crop(values, weights, crop))
        .collect();
    sort_by_score(&mut recommendations);
    recommendations
}

impl AhpModel {
    /// Rank with the model's cached weights
    pub fn rank_crops(&self, values: &TechnicalValues, crops: &[Crop]) -> Vec<Recommendation> {
        rank_crops(values, self.weights(), crops)
    }

    pub fn rank_crops_parallel(
        &self,
        values: &TechnicalValues,
        crops: &[Crop],
    ) -> Vec<Recommendation> {
        rank_crops_parallel(values, self.weights(), crops)
    }
}
