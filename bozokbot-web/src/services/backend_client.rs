//! Gateway to the question-answering backend.
//!
//! Every outcome of a backend call is turned into a [`ChatResponse`]; callers
//! never see a transport or protocol error. Internally the call is a
//! `Result<ChatResponse, BackendError>` folded into the envelope at the
//! boundary.

use crate::config::BackendSettings;
use crate::models::{ChatRequest, ChatResponse};
use crate::observability::TracedClientExt;
use crate::services::metrics;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use thiserror::Error;

const ASK_PATH: &str = "/ask";
const HEALTH_PATH: &str = "/health";

/// Shown when the backend answers with a non-success status.
pub const UNAVAILABLE_ANSWER: &str = "Sorry, I can't answer right now. Please try again later.";

/// Shown when the backend could not be reached or its reply was unreadable.
pub const CONNECTION_ANSWER: &str = "Connection error. Check whether the backend is running.";

/// Contract the chat handlers rely on.
#[async_trait]
pub trait QaBackend: Send + Sync {
    /// Ask a question, retrieving up to `top_k` sources. Never fails.
    async fn ask(&self, question: &str, top_k: u32) -> ChatResponse;

    /// True iff the backend health endpoint answers with a 2xx status.
    async fn check_health(&self) -> bool;
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("API error: {0}")]
    Status(StatusCode),

    /// Connection failure, timeout or undecodable body.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl BackendError {
    fn outcome(&self) -> &'static str {
        match self {
            BackendError::Status(_) => "http_error",
            BackendError::Transport(_) => "transport_error",
        }
    }
}

impl From<BackendError> for ChatResponse {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Status(status) => {
                ChatResponse::failure(UNAVAILABLE_ANSWER, format!("API error: {}", status))
            }
            // Alternate formatting keeps the cause chain, e.g. "connection refused".
            BackendError::Transport(e) => {
                ChatResponse::failure(CONNECTION_ANSWER, format!("{:#}", anyhow::Error::new(e)))
            }
        }
    }
}

/// HTTP client for the backend. Built once at startup and shared read-only.
pub struct BackendClient {
    client: Client,
    settings: BackendSettings,
}

impl BackendClient {
    pub fn new(settings: BackendSettings) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build backend HTTP client: {}", e))?;

        Ok(Self { client, settings })
    }

    pub fn base_url(&self) -> &str {
        &self.settings.base_url
    }

    /// Single `POST /ask` exchange without the failure folding of [`QaBackend::ask`].
    pub async fn try_ask(&self, question: &str, top_k: u32) -> Result<ChatResponse, BackendError> {
        let url = self.settings.endpoint(ASK_PATH);

        let response = self
            .client
            .traced_post(&url)
            .json(&ChatRequest { question, top_k })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status));
        }

        Ok(response.json::<ChatResponse>().await?)
    }
}

#[async_trait]
impl QaBackend for BackendClient {
    async fn ask(&self, question: &str, top_k: u32) -> ChatResponse {
        let start = Instant::now();
        let result = self.try_ask(question, top_k).await;
        let elapsed = start.elapsed().as_secs_f64();

        match result {
            Ok(response) => {
                metrics::record_backend_request(ASK_PATH, "success", elapsed);
                tracing::info!(
                    top_k,
                    success = response.success,
                    sources = response.sources.len(),
                    elapsed_secs = elapsed,
                    "Backend answered question"
                );
                response
            }
            Err(err) => {
                metrics::record_backend_request(ASK_PATH, err.outcome(), elapsed);
                match &err {
                    BackendError::Status(status) => {
                        tracing::error!(status = %status, "Backend returned error status");
                    }
                    BackendError::Transport(e) => {
                        tracing::error!(
                            error = ?e,
                            base_url = %self.settings.base_url,
                            "Error calling question-answering backend"
                        );
                    }
                }
                err.into()
            }
        }
    }

    async fn check_health(&self) -> bool {
        let start = Instant::now();
        let url = self.settings.endpoint(HEALTH_PATH);

        let healthy = match self.client.traced_get(&url).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::warn!(status = %response.status(), "Backend health check failed");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "Backend health check failed");
                false
            }
        };

        let outcome = if healthy { "success" } else { "unhealthy" };
        metrics::record_backend_request(HEALTH_PATH, outcome, start.elapsed().as_secs_f64());

        healthy
    }
}
