//! HTTP client for the inference service

use crate::config::ClientConfig;
use crate::service::ClassificationService;
use crate::wire::PredictResponse;
use async_trait::async_trait;
use bytes::Bytes;
use doclassify_core::{interpret, ClassificationRequest, Error, FailureReason, RawScore, Result};
use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, warn};
use url::Url;

/// Longest slice of an error body kept in a failure message
const ERROR_BODY_SNIPPET: usize = 200;

/// Body of the service's health route
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub ok: bool,
    #[serde(default)]
    pub status: Option<String>,
}

/// Classification service reached over HTTP.
///
/// Sends `POST <endpoint>` with a JSON `{text, top_k, threshold}` body and
/// makes a single attempt per call.
#[derive(Clone)]
pub struct HttpClassificationService {
    client: reqwest::Client,
    endpoint: Url,
    health: Url,
}

impl HttpClassificationService {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint_url()?,
            health: config.health_url()?,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Ask the service whether it is up
    pub async fn health(&self) -> std::result::Result<HealthStatus, FailureReason> {
        let response = self
            .client
            .get(self.health.clone())
            .send()
            .await
            .map_err(transport_failure)?;
        let body = read_success_body(response).await?;

        let status: HealthStatus = serde_json::from_slice(&body)
            .map_err(|e| FailureReason::malformed(format!("unexpected health body: {e}")))?;
        if !status.ok {
            return Err(FailureReason::transport(format!(
                "service reports unhealthy: {}",
                status.status.as_deref().unwrap_or("unknown")
            )));
        }
        Ok(status)
    }
}

#[async_trait]
impl ClassificationService for HttpClassificationService {
    async fn classify(
        &self,
        request: &ClassificationRequest,
    ) -> std::result::Result<Vec<RawScore>, FailureReason> {
        let start = Instant::now();
        debug!(
            endpoint = %self.endpoint,
            chars = request.text().chars().count(),
            "Sending classification request"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(transport_failure)?;
        let body = read_success_body(response).await?;

        let parsed = PredictResponse::from_slice(&body)?;
        let service_label = parsed.label.clone();
        let service_abstained = parsed.abstained;
        let (scores, source) = parsed.into_scores()?;

        debug!(
            latency_ms = start.elapsed().as_millis() as u64,
            candidates = scores.len(),
            ?source,
            "Received classification response"
        );

        if let Ok(local) = interpret(&scores, request.top_k(), request.threshold()) {
            let label_differs = service_label
                .as_deref()
                .is_some_and(|l| l != local.label && l != local.display_label());
            let abstain_differs = service_abstained.is_some_and(|a| a != local.abstained);
            if label_differs || abstain_differs {
                warn!(
                    service_label = service_label.as_deref().unwrap_or(""),
                    local_label = %local.label,
                    ?service_abstained,
                    local_abstained = local.abstained,
                    "Service verdict disagrees with recomputed outcome"
                );
            }
        }

        Ok(scores)
    }

    fn name(&self) -> &str {
        "http"
    }
}

fn transport_failure(e: reqwest::Error) -> FailureReason {
    if e.is_timeout() {
        FailureReason::transport(format!("request timed out: {e}"))
    } else {
        FailureReason::transport(e.to_string())
    }
}

async fn read_success_body(
    response: reqwest::Response,
) -> std::result::Result<Bytes, FailureReason> {
    let status = response.status();
    let body = response.bytes().await.map_err(transport_failure)?;

    if !status.is_success() {
        let text = String::from_utf8_lossy(&body);
        let snippet: String = text.chars().take(ERROR_BODY_SNIPPET).collect();
        return Err(FailureReason::transport(format!(
            "service returned {status}: {snippet}"
        )));
    }
    Ok(body)
}
