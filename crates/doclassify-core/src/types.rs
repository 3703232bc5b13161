//! Core types for Doclassify

use crate::error::{Error, FailureReason, Result};
use serde::{Deserialize, Serialize};

/// Number of ranked labels requested when the caller does not say
pub const DEFAULT_TOP_K: usize = 3;

/// Confidence below which a prediction is flagged for review
pub const DEFAULT_THRESHOLD: f32 = 0.65;

/// Label shown in place of the prediction when the outcome abstained
pub const NEEDS_REVIEW_LABEL: &str = "needs_review";

/// Per-submission knobs sent along with the document text
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RequestParams {
    top_k: usize,
    threshold: f32,
}

impl RequestParams {
    /// Validate and build request parameters.
    ///
    /// `top_k` must be at least 1 and `threshold` must lie in `[0, 1]`.
    pub fn new(top_k: usize, threshold: f32) -> Result<Self> {
        if top_k == 0 {
            return Err(Error::invalid_params("top_k must be at least 1"));
        }
        if !(0.0..=1.0).contains(&threshold) {
            return Err(Error::invalid_params(format!(
                "threshold must be within [0, 1], got {threshold}"
            )));
        }
        Ok(Self { top_k, threshold })
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

impl Default for RequestParams {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Immutable request sent to the inference service.
///
/// Serializes to the wire body `{text, top_k, threshold}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationRequest {
    text: String,
    top_k: usize,
    threshold: f32,
}

impl ClassificationRequest {
    /// Create a request from document text and validated parameters
    pub fn new(text: impl Into<String>, params: RequestParams) -> Self {
        Self {
            text: text.into(),
            top_k: params.top_k,
            threshold: params.threshold,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn params(&self) -> RequestParams {
        RequestParams {
            top_k: self.top_k,
            threshold: self.threshold,
        }
    }
}

/// One candidate class as scored by the inference service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawScore {
    /// Class label
    pub label: String,

    /// Probability-like score (0.0-1.0)
    pub score: f32,
}

impl RawScore {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// A ranked entry in an outcome's top-k list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredLabel {
    pub label: String,
    pub confidence: f32,
}

/// Interpreted result of one classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationOutcome {
    /// Predicted label; always present, even when abstained
    pub label: String,

    /// Score of the predicted label
    pub confidence: f32,

    /// Whether confidence fell below the request threshold
    pub abstained: bool,

    /// Highest-scoring labels, descending by confidence
    pub top_k: Vec<ScoredLabel>,
}

impl ClassificationOutcome {
    /// Label to show a reader: the prediction, or `needs_review` when abstained
    pub fn display_label(&self) -> &str {
        if self.abstained {
            NEEDS_REVIEW_LABEL
        } else {
            &self.label
        }
    }
}

/// Lifecycle of the single classification a session may run at a time
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "result", rename_all = "snake_case")]
pub enum RequestState {
    #[default]
    Idle,
    Validating,
    Requesting,
    Settled(std::result::Result<ClassificationOutcome, FailureReason>),
}

impl RequestState {
    /// True while a submission is being validated or is awaiting the service
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Validating | Self::Requesting)
    }

    pub fn outcome(&self) -> Option<&ClassificationOutcome> {
        match self {
            Self::Settled(Ok(outcome)) => Some(outcome),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        match self {
            Self::Settled(Err(reason)) => Some(reason),
            _ => None,
        }
    }
}
