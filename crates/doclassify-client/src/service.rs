//! Classification service trait

use async_trait::async_trait;
use doclassify_core::{ClassificationRequest, FailureReason, RawScore};

/// A backend that scores document text against its known classes.
///
/// Implementations make exactly one attempt per call: no retries, no caching.
/// Every failure must come back as a [`FailureReason`] so callers can settle
/// the attempt instead of propagating an error.
#[async_trait]
pub trait ClassificationService: Send + Sync {
    /// Score the request's text, returning one entry per candidate label
    async fn classify(
        &self,
        request: &ClassificationRequest,
    ) -> Result<Vec<RawScore>, FailureReason>;

    /// Get the service name
    fn name(&self) -> &str;
}
