use doclassify_client::ClassificationService;
use doclassify_core::{
    interpret, is_eligible, ClassificationOutcome, ClassificationRequest, FailureReason,
    RequestParams, RequestState,
};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// Bound on a single request when none is configured
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// What a call to [`RequestController::submit`] led to
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The request completed; the same result is now held in `Settled`
    Settled(Result<ClassificationOutcome, FailureReason>),
    /// Text too short; nothing was sent and the state is unchanged
    Ineligible,
    /// Another request is in flight; the state is unchanged
    Busy,
    /// The session was reset while this request was in flight
    Cancelled,
}

impl SubmitOutcome {
    fn metric_label(&self) -> &'static str {
        match self {
            Self::Settled(Ok(o)) if o.abstained => "abstained",
            Self::Settled(Ok(_)) => "ok",
            Self::Settled(Err(reason)) => reason.kind(),
            Self::Ineligible => "ineligible",
            Self::Busy => "busy",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Drives one classification session: the current text, and the lifecycle
/// of the single request that may be in flight for it.
///
/// All transitions go through `&self`, so a controller can be shared behind an
/// `Arc` and the at-most-one-request rule holds across concurrent callers.
pub struct RequestController {
    service: Arc<dyn ClassificationService>,
    params: RequestParams,
    timeout: Duration,
    inner: RwLock<Session>,
}

struct Session {
    text: String,
    state: RequestState,
    /// Bumped on every accepted submit and every reset
    generation: u64,
    cancel_sender: Option<oneshot::Sender<()>>,
}

impl RequestController {
    pub fn new(service: Arc<dyn ClassificationService>) -> Self {
        Self {
            service,
            params: RequestParams::default(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            inner: RwLock::new(Session {
                text: String::new(),
                state: RequestState::Idle,
                generation: 0,
                cancel_sender: None,
            }),
        }
    }

    /// Set the parameters used by [`submit`](Self::submit)
    pub fn with_params(mut self, params: RequestParams) -> Self {
        self.params = params;
        self
    }

    /// Set how long a request may stay in flight before it settles as a
    /// transport failure
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get current state
    pub fn state(&self) -> RequestState {
        self.inner.read().state.clone()
    }

    /// Get the current document text
    pub fn text(&self) -> String {
        self.inner.read().text.clone()
    }

    pub fn params(&self) -> RequestParams {
        self.params
    }

    /// Check if a submission is in progress
    pub fn is_busy(&self) -> bool {
        self.inner.read().state.is_busy()
    }

    /// Replace the document text. Never touches the request state, so a
    /// settled result stays visible while the user edits.
    pub fn edit(&self, text: impl Into<String>) {
        self.inner.write().text = text.into();
    }

    /// Submit the current text with the controller's parameters
    pub async fn submit(&self) -> SubmitOutcome {
        self.submit_with(self.params).await
    }

    /// Submit the current text with explicit parameters
    pub async fn submit_with(&self, params: RequestParams) -> SubmitOutcome {
        let (request, generation, cancelled) = match self.begin(params) {
            Ok(started) => started,
            Err(outcome) => return record(outcome),
        };

        let mut in_flight = InFlight {
            controller: self,
            generation,
            armed: true,
        };

        let start = Instant::now();
        let result = tokio::select! {
            result = tokio::time::timeout(self.timeout, self.service.classify(&request)) => {
                result.unwrap_or_else(|_| {
                    Err(FailureReason::transport(format!(
                        "request timed out after {}ms",
                        self.timeout.as_millis()
                    )))
                })
            }
            _ = cancelled => {
                in_flight.armed = false;
                debug!(generation, "In-flight request abandoned");
                return record(SubmitOutcome::Cancelled);
            }
        };
        metrics::histogram!("doclassify_request_latency_us")
            .record(start.elapsed().as_micros() as f64);

        let result =
            result.and_then(|scores| interpret(&scores, request.top_k(), request.threshold()));
        in_flight.armed = false;
        record(self.settle(generation, result))
    }

    /// Return to `Idle`, clearing text and any result. A request in flight
    /// is abandoned and its completion is discarded.
    pub fn reset(&self) {
        let mut inner = self.inner.write();
        inner.text.clear();
        inner.state = RequestState::Idle;
        inner.generation += 1;
        if let Some(sender) = inner.cancel_sender.take() {
            let _ = sender.send(());
            info!("Session reset while a request was in flight");
        }
    }

    /// Validate and move to `Requesting`, or report why not
    fn begin(
        &self,
        params: RequestParams,
    ) -> Result<(ClassificationRequest, u64, oneshot::Receiver<()>), SubmitOutcome> {
        let mut inner = self.inner.write();
        if inner.state.is_busy() {
            debug!("Submit rejected: a request is already in flight");
            return Err(SubmitOutcome::Busy);
        }

        let prior = std::mem::replace(&mut inner.state, RequestState::Validating);
        if !is_eligible(&inner.text) {
            inner.state = prior;
            debug!("Submit ignored: text too short");
            return Err(SubmitOutcome::Ineligible);
        }

        let (tx, rx) = oneshot::channel();
        inner.generation += 1;
        inner.cancel_sender = Some(tx);
        inner.state = RequestState::Requesting;

        let request = ClassificationRequest::new(inner.text.clone(), params);
        info!(
            generation = inner.generation,
            top_k = params.top_k(),
            threshold = params.threshold(),
            "Classification requested"
        );
        Ok((request, inner.generation, rx))
    }

    fn settle(
        &self,
        generation: u64,
        result: Result<ClassificationOutcome, FailureReason>,
    ) -> SubmitOutcome {
        let mut inner = self.inner.write();
        if inner.generation != generation {
            debug!(generation, "Discarding completion of a superseded request");
            return SubmitOutcome::Cancelled;
        }

        match &result {
            Ok(outcome) => info!(
                label = %outcome.label,
                confidence = outcome.confidence,
                abstained = outcome.abstained,
                "Classification settled"
            ),
            Err(reason) => warn!(kind = reason.kind(), %reason, "Classification failed"),
        }

        inner.cancel_sender = None;
        inner.state = RequestState::Settled(result.clone());
        SubmitOutcome::Settled(result)
    }
}

/// Settles the session if a `submit` future is dropped mid-request, so the
/// state never claims a request that nobody is awaiting anymore.
struct InFlight<'a> {
    controller: &'a RequestController,
    generation: u64,
    armed: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = self.controller.inner.write();
        if inner.generation != self.generation {
            return;
        }
        warn!(generation = self.generation, "Submit dropped before the request settled");
        inner.cancel_sender = None;
        inner.state = RequestState::Settled(Err(FailureReason::transport(
            "request abandoned before completion",
        )));
        metrics::counter!("doclassify_submissions_total", "result" => "abandoned").increment(1);
    }
}

fn record(outcome: SubmitOutcome) -> SubmitOutcome {
    metrics::counter!("doclassify_submissions_total", "result" => outcome.metric_label())
        .increment(1);
    outcome
}
