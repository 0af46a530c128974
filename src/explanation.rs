//! Text formatters for the assistant tool surface and reports
//!
//! The conversational assistant calls two tools: a recommendation tool that
//! returns the top few crops with scores, and a catalog tool that lists each
//! crop's growing parameters. Both return plain text.

use crate::criteria::Criterion;
use crate::data::Crop;
use crate::scorer::Recommendation;
use crate::weighting::AhpModel;
use std::fmt::Write;

/// Number of crops the recommendation tool reports
pub const TOOL_TOP_N: usize = 3;

/// "Top Recommendations:" list with 4-decimal scores
pub fn format_top_recommendations(recommendations: &[Recommendation], top_n: usize) -> String {
    let mut out = String::from("Top Recommendations:\n");
    for (i, rec) in recommendations.iter().take(top_n).enumerate() {
        let _ = writeln!(out, "{}. {} (Score: {:.4})", i + 1, rec.crop_name, rec.score);
    }
    out
}

/// Parameter listing for every crop in the catalog
pub fn format_catalog(crops: &[Crop]) -> String {
    if crops.is_empty() {
        return "No crops found in catalog.".to_string();
    }

    let mut out = String::from("Available Crops and Parameters:\n");
    for crop in crops {
        let _ = writeln!(out, "--- {} ---", crop.name);
        let _ = writeln!(
            out,
            "Description: {}",
            crop.description.as_deref().unwrap_or("No description.")
        );
        let _ = writeln!(out, "pH Range: {} - {}", crop.ph_min, crop.ph_max);
        let _ = writeln!(out, "Rainfall: {} - {} mm/year", crop.rain_min, crop.rain_max);
        let _ = writeln!(out, "Temperature: {} - {} C", crop.temp_min, crop.temp_max);
        let _ = writeln!(out, "Sun Requirement: {}", crop.sun_requirement);
        let _ = writeln!(out, "Irrigation Need: {}", crop.irrigation_need);
        let _ = writeln!(out, "Soil Type: {}\n", crop.soil_type);
    }
    out
}

/// Markdown table of criterion weights plus the consistency diagnostic
pub fn format_weights_markdown(model: &AhpModel) -> String {
    let mut out = String::from("| Criterion | Weight |\n|---|---|\n");
    for (criterion, weight) in model.weights().iter() {
        let _ = writeln!(out, "| {} | {:.4} |", criterion, weight);
    }
    let verdict = if model.is_consistent() {
        "consistent"
    } else {
        "inconsistent"
    };
    let _ = writeln!(
        out,
        "\nConsistency ratio: {:.4} ({})",
        model.consistency_ratio(),
        verdict
    );
    out
}

/// Markdown breakdown of one recommendation's per-criterion matches
pub fn format_match_breakdown(rec: &Recommendation) -> String {
    let mut out = format!("### {} ({:.4})\n\n", rec.crop_name, rec.score);
    for criterion in Criterion::ALL {
        let score = rec.match_details.get(criterion);
        let marker = if score >= 1.0 {
            "fits"
        } else if score > 0.0 {
            "near"
        } else {
            "outside"
        };
        let _ = writeln!(out, "- {}: {:.2} ({})", criterion, score, marker);
    }
    out
}
