//! Similarity scoring: bounded cosine similarity plus the percentage and
//! qualitative band derived from it.
//!
//! `EmbeddingVector` is one-dimensional by construction (the codec rejects any
//! other shape with `MatchError::Shape`), so only dimensionality is checked here.

use serde::{Deserialize, Serialize};

use crate::matching::codec::EmbeddingVector;
use crate::matching::error::MatchError;

/// Cosine similarity of two vectors clamped to `[0.0, 1.0]`.
///
/// Each vector is divided by its largest absolute element first, so very large
/// or very small finite values neither overflow nor underflow the norms.
/// A zero vector on either side yields exactly `0.0`.
pub fn score(a: &EmbeddingVector, b: &EmbeddingVector) -> Result<f64, MatchError> {
    let (a, b) = (a.as_slice(), b.as_slice());
    if a.len() != b.len() {
        return Err(MatchError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let scale_a = max_abs(a);
    let scale_b = max_abs(b);
    if scale_a == 0.0 || scale_b == 0.0 {
        return Ok(0.0);
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (x / scale_a, y / scale_b);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());
    if !similarity.is_finite() {
        return Ok(0.0);
    }
    Ok(similarity.clamp(0.0, 1.0))
}

fn max_abs(values: &[f64]) -> f64 {
    values.iter().fold(0.0, |acc, v| acc.max(v.abs()))
}

/// Converts a similarity into a percentage rounded to one decimal place.
pub fn percent(score: f64) -> f64 {
    (score * 1000.0).round() / 10.0
}

/// Qualitative verdict for a match percentage. Lower bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchBand {
    Excellent,
    Good,
    Moderate,
    Low,
    Limited,
}

impl MatchBand {
    pub fn from_percent(percent: f64) -> Self {
        match percent {
            p if p >= 85.0 => MatchBand::Excellent,
            p if p >= 70.0 => MatchBand::Good,
            p if p >= 50.0 => MatchBand::Moderate,
            p if p >= 30.0 => MatchBand::Low,
            _ => MatchBand::Limited,
        }
    }

    /// Human-readable analysis for this band, naming the target role.
    pub fn analysis(self, target_name: &str) -> String {
        match self {
            MatchBand::Excellent => format!(
                "Excellent match! Your skills align very well with the {target_name} position. \
                 You have a strong chance of success in this role."
            ),
            MatchBand::Good => format!(
                "Good match! Your profile shows solid compatibility with the {target_name} role. \
                 Consider highlighting your relevant experience."
            ),
            MatchBand::Moderate => format!(
                "Moderate match for {target_name}. You have some relevant skills, but may want to \
                 develop expertise in key areas mentioned in the job description."
            ),
            MatchBand::Low => format!(
                "Low match for {target_name}. Consider gaining more experience in the required \
                 skills before applying, or look for more entry-level positions."
            ),
            MatchBand::Limited => format!(
                "Limited match for {target_name}. This role may require significant skill \
                 development. Consider exploring related positions that better match your \
                 current profile."
            ),
        }
    }
}

/// Band plus analysis text for a percentage.
pub fn classify(percent: f64, target_name: &str) -> (MatchBand, String) {
    let band = MatchBand::from_percent(percent);
    (band, band.analysis(target_name))
}
