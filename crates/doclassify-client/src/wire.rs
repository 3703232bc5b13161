//! Response body format of the inference service
//!
//! The service may answer with a full per-class distribution (`scores`), with
//! its own pre-ranked `top_k` list, or only with the pre-computed
//! `label`/`confidence` pair. Raw scores are taken from the richest source
//! available so the outcome can always be recomputed locally.

use doclassify_core::{FailureReason, RawScore, NEEDS_REVIEW_LABEL};
use serde::Deserialize;
use std::collections::HashSet;

/// Success body as returned by `POST /predict`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictResponse {
    /// Service-side prediction, possibly replaced by a review sentinel
    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub confidence: Option<f32>,

    #[serde(default)]
    pub abstained: Option<bool>,

    #[serde(default)]
    pub top_k: Option<Vec<WireLabel>>,

    /// Full distribution, when the service exposes it
    #[serde(default)]
    pub scores: Option<Vec<RawScore>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireLabel {
    pub label: String,
    pub confidence: f32,
}

/// Where the raw scores of a response were taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreSource {
    Distribution,
    TopK,
    Prediction,
}

impl PredictResponse {
    /// Parse a response body
    pub fn from_slice(body: &[u8]) -> Result<Self, FailureReason> {
        serde_json::from_slice(body)
            .map_err(|e| FailureReason::malformed(format!("unexpected response body: {e}")))
    }

    /// Extract validated raw scores from the response
    pub fn into_scores(self) -> Result<(Vec<RawScore>, ScoreSource), FailureReason> {
        let (scores, source) = if let Some(scores) = self.scores.filter(|s| !s.is_empty()) {
            (scores, ScoreSource::Distribution)
        } else if let Some(top) = self.top_k.filter(|t| !t.is_empty()) {
            let scores = top
                .into_iter()
                .map(|w| RawScore::new(w.label, w.confidence))
                .collect();
            (scores, ScoreSource::TopK)
        } else if let (Some(label), Some(confidence)) = (self.label, self.confidence) {
            if label == NEEDS_REVIEW_LABEL {
                return Err(FailureReason::malformed(
                    "response names no class: only the review sentinel label was sent",
                ));
            }
            (vec![RawScore::new(label, confidence)], ScoreSource::Prediction)
        } else {
            return Err(FailureReason::malformed(
                "response contained no candidate labels",
            ));
        };

        validate_scores(&scores)?;
        Ok((scores, source))
    }
}

fn validate_scores(scores: &[RawScore]) -> Result<(), FailureReason> {
    let mut seen = HashSet::with_capacity(scores.len());
    for s in scores {
        if !s.score.is_finite() || !(0.0..=1.0).contains(&s.score) {
            return Err(FailureReason::malformed(format!(
                "score for '{}' is outside [0, 1]: {}",
                s.label, s.score
            )));
        }
        if !seen.insert(s.label.as_str()) {
            return Err(FailureReason::malformed(format!(
                "duplicate label '{}'",
                s.label
            )));
        }
    }
    Ok(())
}
