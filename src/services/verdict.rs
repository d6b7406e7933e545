use crate::models::prediction_types::{Verdict, VerdictSummary};

/// Distance from the 0.5 decision boundary, scaled to a percentage.
///
/// 0.5 shows as 0% and either extreme as 100%. This is not a calibrated
/// probability.
pub fn display_confidence(score: f32) -> f64 {
    (score as f64 - Verdict::THRESHOLD as f64).abs() * 200.0
}

pub fn format_confidence(score: f32) -> String {
    format!("{:.1}%", display_confidence(score))
}

pub fn summarize(score: f32) -> VerdictSummary {
    VerdictSummary {
        label: Verdict::from_score(score).label().to_string(),
        score,
        confidence_pct: display_confidence(score),
        confidence_display: format_confidence(score),
    }
}
