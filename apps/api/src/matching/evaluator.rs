//! Match evaluation: decodes two stored embeddings, scores them and applies the
//! target's minimum-score threshold. Pure computation; resolution of the profile
//! and job rows is the caller's concern.

use serde::Serialize;

use crate::matching::codec::{normalize, StoredEmbedding};
use crate::matching::error::MatchError;
use crate::matching::similarity::{classify, percent, score, MatchBand};

/// Outcome of comparing a candidate against a requirement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    /// Clamped cosine similarity in `[0, 1]`.
    pub similarity: f64,
    /// `similarity * 100` rounded to one decimal.
    pub score_percent: f64,
    pub band: MatchBand,
    pub analysis: String,
    pub meets_threshold: bool,
    pub threshold_percent: f64,
}

/// One side of a match: the stored embedding (if any) and a label for messages.
#[derive(Debug, Clone, Copy)]
pub struct MatchSide<'a> {
    pub embedding: Option<&'a StoredEmbedding>,
    pub not_ready_message: &'a str,
}

/// Evaluates `subject` against `target`.
///
/// Either side lacking an embedding, or holding an empty one, is
/// `MatchError::NotReady`, never a zero score.
/// `meets_threshold` is `score_percent >= threshold_percent`.
pub fn evaluate(
    subject: MatchSide<'_>,
    target: MatchSide<'_>,
    threshold_percent: f64,
    target_name: &str,
) -> Result<MatchResult, MatchError> {
    let subject_raw = subject
        .embedding
        .filter(|e| !e.is_blank())
        .ok_or_else(|| MatchError::NotReady(subject.not_ready_message.to_string()))?;
    let target_raw = target
        .embedding
        .filter(|e| !e.is_blank())
        .ok_or_else(|| MatchError::NotReady(target.not_ready_message.to_string()))?;

    let subject_vec = normalize(Some(subject_raw))?;
    let target_vec = normalize(Some(target_raw))?;

    let similarity = score(&subject_vec, &target_vec)?;
    let score_percent = percent(similarity);
    let (band, analysis) = classify(score_percent, target_name);

    Ok(MatchResult {
        similarity,
        score_percent,
        band,
        analysis,
        meets_threshold: score_percent >= threshold_percent,
        threshold_percent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SUBJECT_NOT_READY: &str = "User has not uploaded a resume yet.";
    const TARGET_NOT_READY: &str = "Job does not have a skills embedding.";

    fn stored(value: serde_json::Value) -> StoredEmbedding {
        StoredEmbedding::from_value(value).unwrap()
    }

    fn side<'a>(embedding: Option<&'a StoredEmbedding>, msg: &'static str) -> MatchSide<'a> {
        MatchSide {
            embedding,
            not_ready_message: msg,
        }
    }

    #[test]
    fn test_identical_profiles_meet_threshold() {
        let a = stored(json!([1, 0, 0]));
        let b = StoredEmbedding::Json("[1.0, 0.0, 0.0]".to_string());
        let result = evaluate(
            side(Some(&a), SUBJECT_NOT_READY),
            side(Some(&b), TARGET_NOT_READY),
            70.0,
            "Data Engineer",
        )
        .unwrap();

        assert_eq!(result.similarity, 1.0);
        assert_eq!(result.score_percent, 100.0);
        assert_eq!(result.band, MatchBand::Excellent);
        assert!(result.meets_threshold);
        assert!(result.analysis.contains("Data Engineer"));
    }

    #[test]
    fn test_orthogonal_profiles_fail_positive_threshold() {
        let a = stored(json!([1, 0]));
        let b = stored(json!([0, 1]));
        let result = evaluate(
            side(Some(&a), SUBJECT_NOT_READY),
            side(Some(&b), TARGET_NOT_READY),
            0.1,
            "QA",
        )
        .unwrap();

        assert_eq!(result.score_percent, 0.0);
        assert_eq!(result.band, MatchBand::Limited);
        assert!(!result.meets_threshold);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let a = stored(json!([1, 0]));
        let b = stored(json!([1, 0]));
        let result = evaluate(
            side(Some(&a), SUBJECT_NOT_READY),
            side(Some(&b), TARGET_NOT_READY),
            100.0,
            "SRE",
        )
        .unwrap();
        assert!(result.meets_threshold);
    }

    #[test]
    fn test_missing_subject_is_not_ready() {
        let b = stored(json!([1, 0]));
        let err = evaluate(
            side(None, SUBJECT_NOT_READY),
            side(Some(&b), TARGET_NOT_READY),
            50.0,
            "SRE",
        )
        .unwrap_err();
        assert_eq!(err, MatchError::NotReady(SUBJECT_NOT_READY.to_string()));
    }

    #[test]
    fn test_missing_target_is_not_ready() {
        let a = stored(json!([1, 0]));
        let err = evaluate(
            side(Some(&a), SUBJECT_NOT_READY),
            side(None, TARGET_NOT_READY),
            50.0,
            "SRE",
        )
        .unwrap_err();
        assert_eq!(err, MatchError::NotReady(TARGET_NOT_READY.to_string()));
    }

    #[test]
    fn test_dimension_mismatch_propagates() {
        let a = stored(json!([1, 0, 0]));
        let b = stored(json!([1, 0]));
        let err = evaluate(
            side(Some(&a), SUBJECT_NOT_READY),
            side(Some(&b), TARGET_NOT_READY),
            50.0,
            "SRE",
        )
        .unwrap_err();
        assert_eq!(err, MatchError::DimensionMismatch { left: 3, right: 2 });
    }

    #[test]
    fn test_malformed_target_is_format_error() {
        let a = stored(json!([1, 0]));
        let b = StoredEmbedding::Json("not json".to_string());
        let err = evaluate(
            side(Some(&a), SUBJECT_NOT_READY),
            side(Some(&b), TARGET_NOT_READY),
            50.0,
            "SRE",
        )
        .unwrap_err();
        assert!(matches!(err, MatchError::Format(_)));
    }

    #[test]
    fn test_empty_subject_vector_is_not_ready() {
        let a = StoredEmbedding::Sequence(Vec::new());
        let b = stored(json!([1, 0]));
        let err = evaluate(
            side(Some(&a), SUBJECT_NOT_READY),
            side(Some(&b), TARGET_NOT_READY),
            50.0,
            "SRE",
        )
        .unwrap_err();
        assert_eq!(err, MatchError::NotReady(SUBJECT_NOT_READY.to_string()));
    }

    #[test]
    fn test_blank_target_string_is_not_ready() {
        let a = stored(json!([1, 0]));
        let b = StoredEmbedding::Json(String::new());
        let err = evaluate(
            side(Some(&a), SUBJECT_NOT_READY),
            side(Some(&b), TARGET_NOT_READY),
            50.0,
            "SRE",
        )
        .unwrap_err();
        assert_eq!(err, MatchError::NotReady(TARGET_NOT_READY.to_string()));
    }
}
