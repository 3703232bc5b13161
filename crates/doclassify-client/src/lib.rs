//! Doclassify Client
//!
//! The boundary between Doclassify and the external inference service.
//!
//! The service is opaque: a request carries document text plus ranking
//! parameters, and the answer is a set of per-class scores. Each call is a
//! single round trip with no retries; transport and contract violations are
//! normalized into [`FailureReason`](doclassify_core::FailureReason).

pub mod config;
pub mod http;
pub mod service;
pub mod wire;

pub use config::{ClientConfig, ConfigOverrides};
pub use http::{HealthStatus, HttpClassificationService};
pub use service::ClassificationService;
pub use wire::{PredictResponse, ScoreSource};
