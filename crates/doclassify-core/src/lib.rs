//! Doclassify Core
//!
//! Core types and the pure decision logic shared across Doclassify components.
//!
//! This crate provides:
//! - The request, score, and outcome data model
//! - Error types and the failure taxonomy for classification attempts
//! - The input eligibility check
//! - The result interpreter that ranks scores and decides abstention

pub mod error;
pub mod interpreter;
pub mod types;
pub mod validator;

pub use error::{Error, FailureReason, Result};
pub use interpreter::interpret;
pub use types::{
    ClassificationOutcome, ClassificationRequest, RawScore, RequestParams, RequestState,
    ScoredLabel, DEFAULT_THRESHOLD, DEFAULT_TOP_K, NEEDS_REVIEW_LABEL,
};
pub use validator::{is_eligible, MIN_DOCUMENT_CHARS};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, FailureReason, Result};
    pub use crate::interpreter::interpret;
    pub use crate::types::{
        ClassificationOutcome, ClassificationRequest, RawScore, RequestParams, RequestState,
    };
    pub use crate::validator::is_eligible;
}
