//! Turns raw per-class scores into a ranked, thresholded outcome

use crate::error::FailureReason;
use crate::types::{ClassificationOutcome, RawScore, ScoredLabel};
use std::cmp::Ordering;

/// Interpret a score distribution.
///
/// Scores are ranked descending with ties broken by ascending label, so the
/// result does not depend on arrival order. The top entry is always reported
/// as the prediction; `abstained` only flags it when its score is below
/// `threshold`. Fewer scores than `top_k` is fine and yields all of them.
pub fn interpret(
    scores: &[RawScore],
    top_k: usize,
    threshold: f32,
) -> Result<ClassificationOutcome, FailureReason> {
    let mut ranked: Vec<&RawScore> = scores.iter().collect();
    ranked.sort_by(|a, b| rank(a, b));

    let best = ranked
        .first()
        .ok_or_else(|| FailureReason::malformed("response contained no candidate labels"))?;

    let top_k = ranked
        .iter()
        .take(top_k)
        .map(|s| ScoredLabel {
            label: s.label.clone(),
            confidence: s.score,
        })
        .collect();

    Ok(ClassificationOutcome {
        label: best.label.clone(),
        confidence: best.score,
        abstained: best.score < threshold,
        top_k,
    })
}

fn rank(a: &RawScore, b: &RawScore) -> Ordering {
    // Scores are finite, and -0.0 must tie with 0.0
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.label.cmp(&b.label))
}
