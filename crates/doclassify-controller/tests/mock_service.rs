//! Mock classification services and end-to-end controller flows
//!
//! Provides a configurable mock implementation of the ClassificationService
//! trait for exercising the controller's lifecycle, concurrency guard,
//! timeout, and cancellation paths without a network.

use async_trait::async_trait;
use doclassify_client::ClassificationService;
use doclassify_controller::{RequestController, SubmitOutcome};
use doclassify_core::{ClassificationRequest, FailureReason, RawScore, RequestParams, RequestState};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

type ScoreResult = Result<Vec<RawScore>, FailureReason>;

/// A configurable mock service for testing
pub struct MockService {
    default: ScoreResult,
    scripted: Mutex<VecDeque<ScoreResult>>,
    simulated_latency: Option<Duration>,
    gate: Option<Arc<Notify>>,
    call_count: AtomicU32,
    last_request: Mutex<Option<ClassificationRequest>>,
}

impl MockService {
    /// Create a mock that answers every call with `scores`
    pub fn new(scores: &[(&str, f32)]) -> Self {
        Self {
            default: Ok(to_scores(scores)),
            scripted: Mutex::new(VecDeque::new()),
            simulated_latency: None,
            gate: None,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock that fails every call
    pub fn failing(reason: FailureReason) -> Self {
        Self {
            default: Err(reason),
            ..Self::new(&[])
        }
    }

    /// Queue a one-off result served before the default
    pub fn then(self, result: ScoreResult) -> Self {
        self.scripted.lock().push_back(result);
        self
    }

    /// Set simulated latency for each call
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.simulated_latency = Some(latency);
        self
    }

    /// Hold each call until [`release`](Self::release) is invoked
    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Notify::new()));
        self
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    /// Get the number of times classify was called
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ClassificationRequest> {
        self.last_request.lock().clone()
    }
}

#[async_trait]
impl ClassificationService for MockService {
    async fn classify(&self, request: &ClassificationRequest) -> ScoreResult {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock() = Some(request.clone());

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if let Some(latency) = self.simulated_latency {
            tokio::time::sleep(latency).await;
        }

        let scripted = self.scripted.lock().pop_front();
        scripted.unwrap_or_else(|| self.default.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

fn to_scores(pairs: &[(&str, f32)]) -> Vec<RawScore> {
    pairs.iter().map(|(l, s)| RawScore::new(*l, *s)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const INVOICE_TEXT: &str = "Invoice #8472 Total Due $1,250.50.";

    fn invoice_params() -> RequestParams {
        RequestParams::new(3, 0.65).unwrap()
    }

    fn setup(service: MockService) -> (Arc<MockService>, Arc<RequestController>) {
        let service = Arc::new(service);
        let controller = Arc::new(
            RequestController::new(service.clone()).with_params(invoice_params()),
        );
        (service, controller)
    }

    async fn wait_until_busy(controller: &RequestController) {
        while !controller.is_busy() {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_confident_classification() {
        let (service, controller) =
            setup(MockService::new(&[("invoice", 0.91), ("receipt", 0.05), ("contract", 0.04)]));
        controller.edit(INVOICE_TEXT);

        let result = controller.submit().await;

        let outcome = match result {
            SubmitOutcome::Settled(Ok(outcome)) => outcome,
            other => panic!("Expected settled outcome, got {other:?}"),
        };
        assert_eq!(outcome.label, "invoice");
        assert_eq!(outcome.confidence, 0.91);
        assert!(!outcome.abstained);
        let ranked: Vec<(&str, f32)> = outcome
            .top_k
            .iter()
            .map(|s| (s.label.as_str(), s.confidence))
            .collect();
        assert_eq!(
            ranked,
            vec![("invoice", 0.91), ("receipt", 0.05), ("contract", 0.04)]
        );
        assert_eq!(controller.state().outcome(), Some(&outcome));

        let sent = service.last_request().unwrap();
        assert_eq!(sent.text(), INVOICE_TEXT);
        assert_eq!(sent.top_k(), 3);
        assert_eq!(sent.threshold(), 0.65);
    }

    #[tokio::test]
    async fn test_low_confidence_abstains() {
        let (_, controller) =
            setup(MockService::new(&[("invoice", 0.40), ("receipt", 0.35), ("contract", 0.25)]));
        controller.edit(INVOICE_TEXT);

        controller.submit().await;

        let state = controller.state();
        let outcome = state.outcome().unwrap();
        assert!(outcome.abstained);
        assert_eq!(outcome.label, "invoice");
        assert_eq!(outcome.display_label(), "needs_review");
    }

    #[tokio::test]
    async fn test_short_text_makes_no_call() {
        let (service, controller) = setup(MockService::new(&[("invoice", 0.9)]));
        controller.edit("Hi!");

        assert_eq!(controller.submit().await, SubmitOutcome::Ineligible);
        assert_eq!(controller.state(), RequestState::Idle);
        assert_eq!(service.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_settles_as_transport_failure() {
        let service = Arc::new(MockService::new(&[("invoice", 0.9)]).with_latency(Duration::from_secs(60)));
        let controller = RequestController::new(service).with_timeout(Duration::from_secs(1));
        controller.edit(INVOICE_TEXT);

        let result = controller.submit().await;

        let reason = controller.state().failure().cloned().unwrap();
        assert!(reason.is_transport());
        assert!(reason.to_string().contains("timed out"));
        assert_eq!(result, SubmitOutcome::Settled(Err(reason)));
    }

    #[tokio::test]
    async fn test_client_failure_settles_with_reason() {
        let (_, controller) =
            setup(MockService::failing(FailureReason::transport("connection refused")));
        controller.edit(INVOICE_TEXT);

        controller.submit().await;

        assert_eq!(
            controller.state(),
            RequestState::Settled(Err(FailureReason::transport("connection refused")))
        );
    }

    #[tokio::test]
    async fn test_empty_scores_settle_as_malformed() {
        let (_, controller) = setup(MockService::new(&[]));
        controller.edit(INVOICE_TEXT);

        controller.submit().await;

        let state = controller.state();
        assert_eq!(state.failure().map(|f| f.kind()), Some("malformed_response"));
    }

    #[tokio::test]
    async fn test_submit_while_requesting_is_rejected() {
        let (service, controller) = setup(MockService::new(&[("invoice", 0.91)]).gated());
        controller.edit(INVOICE_TEXT);

        let first = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.submit().await })
        };
        wait_until_busy(&controller).await;

        assert_eq!(controller.submit().await, SubmitOutcome::Busy);
        assert_eq!(controller.state(), RequestState::Requesting);

        service.release();
        let result = first.await.unwrap();
        assert!(matches!(result, SubmitOutcome::Settled(Ok(_))));
        assert_eq!(service.call_count(), 1);
    }

    #[tokio::test]
    async fn test_reset_abandons_in_flight_request() {
        let (service, controller) = setup(MockService::new(&[("invoice", 0.91)]).gated());
        controller.edit(INVOICE_TEXT);

        let pending = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.submit().await })
        };
        wait_until_busy(&controller).await;

        controller.reset();
        service.release();

        assert_eq!(pending.await.unwrap(), SubmitOutcome::Cancelled);
        assert_eq!(controller.state(), RequestState::Idle);
        assert_eq!(controller.text(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_submit_does_not_wedge_session() {
        let (service, controller) = setup(
            MockService::new(&[("invoice", 0.91)]).with_latency(Duration::from_millis(200)),
        );
        controller.edit(INVOICE_TEXT);

        let dropped = tokio::time::timeout(Duration::from_millis(10), controller.submit()).await;
        assert!(dropped.is_err());

        let state = controller.state();
        assert!(!state.is_busy());
        assert!(state.failure().unwrap().is_transport());

        let result = controller.submit().await;
        assert!(matches!(result, SubmitOutcome::Settled(Ok(_))));
        assert_eq!(service.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_submit_after_reset_leaves_idle() {
        let (_, controller) = setup(MockService::new(&[("invoice", 0.91)]).gated());
        controller.edit(INVOICE_TEXT);

        let pending = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.submit().await })
        };
        wait_until_busy(&controller).await;

        controller.reset();
        pending.abort();
        let _ = pending.await;

        assert_eq!(controller.state(), RequestState::Idle);
    }

    #[tokio::test]
    async fn test_failed_resubmit_replaces_prior_result() {
        let (_, controller) = setup(
            MockService::new(&[("invoice", 0.91)])
                .then(Ok(to_scores(&[("invoice", 0.91)])))
                .then(Err(FailureReason::transport("gateway timeout"))),
        );
        controller.edit(INVOICE_TEXT);

        controller.submit().await;
        assert!(controller.state().outcome().is_some());

        controller.submit().await;
        let state = controller.state();
        assert!(state.outcome().is_none());
        assert!(state.failure().unwrap().is_transport());
    }

    #[tokio::test]
    async fn test_resubmit_after_failure_recovers() {
        let (service, controller) = setup(
            MockService::new(&[("contract", 0.88)])
                .then(Err(FailureReason::malformed("truncated body"))),
        );
        controller.edit("This agreement is made on 01/12/2023 between Party A and Party B.");

        controller.submit().await;
        assert!(controller.state().failure().is_some());

        controller.submit().await;
        assert_eq!(
            controller.state().outcome().map(|o| o.label.clone()),
            Some("contract".to_string())
        );
        assert_eq!(service.call_count(), 2);
    }

    #[tokio::test]
    async fn test_submit_with_overrides_params() {
        let (service, controller) =
            setup(MockService::new(&[("id", 0.7), ("invoice", 0.2), ("receipt", 0.1)]));
        controller.edit("Driver License Number D7834. Date of Birth 05/03/1990.");

        let params = RequestParams::new(1, 0.9).unwrap();
        controller.submit_with(params).await;

        let state = controller.state();
        let outcome = state.outcome().unwrap();
        assert_eq!(outcome.top_k.len(), 1);
        assert!(outcome.abstained);
        assert_eq!(service.last_request().unwrap().top_k(), 1);
    }
}
