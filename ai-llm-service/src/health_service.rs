//! Reachability check for the chat provider: lists `/v1/models` and looks for
//! the configured model.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::llm_model_config::LlmModelConfig;
use crate::error_handler::{AiLlmError, Provider};
use crate::services::http;

/// A serializable health snapshot for a single config.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Provider name (e.g., "OpenAI").
    pub provider: String,
    /// Target endpoint base URL.
    pub endpoint: String,
    /// Model identifier the probe looked for.
    pub model: String,
    /// Overall health flag.
    pub ok: bool,
    /// Measured HTTP latency in milliseconds.
    pub latency_ms: u128,
    /// Short human-readable message with details.
    pub message: String,
}

impl HealthStatus {
    fn new(cfg: &LlmModelConfig, ok: bool, latency_ms: u128, message: impl Into<String>) -> Self {
        Self {
            provider: Provider::OpenAI.to_string(),
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            ok,
            latency_ms,
            message: message.into(),
        }
    }
}

/// Minimal `/v1/models` payload: `{ "data": [ { "id": "<model>" }, ... ] }`.
#[derive(Deserialize)]
struct Models {
    data: Vec<ModelItem>,
}

#[derive(Deserialize)]
struct ModelItem {
    id: String,
}

/// Health checker that reuses a single HTTP client.
pub struct HealthService {
    client: reqwest::Client,
    default_timeout: Duration,
}

impl HealthService {
    /// Creates a new health service with an optional client timeout (seconds).
    ///
    /// # Errors
    /// Returns [`AiLlmError::HttpTransport`] if the HTTP client cannot be built.
    pub fn new(timeout_secs: Option<u64>) -> Result<Self, AiLlmError> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(10));
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        info!(
            default_timeout_secs = timeout.as_secs(),
            "HealthService initialized"
        );

        Ok(Self {
            client,
            default_timeout: timeout,
        })
    }

    /// Checks the provider. Never returns an error: failures become `ok = false`.
    pub async fn check(&self, cfg: &LlmModelConfig) -> HealthStatus {
        let start = Instant::now();
        match self.try_probe(cfg).await {
            Ok(status) => {
                info!(
                    endpoint = %status.endpoint,
                    model = %status.model,
                    ok = status.ok,
                    latency_ms = status.latency_ms,
                    "health probe completed"
                );
                status
            }
            Err(err) => {
                let status =
                    HealthStatus::new(cfg, false, start.elapsed().as_millis(), err.to_string());
                warn!(
                    endpoint = %status.endpoint,
                    model = %status.model,
                    latency_ms = status.latency_ms,
                    message = %status.message,
                    "health probe failed"
                );
                status
            }
        }
    }

    /// Strict probe. Returns an error on hard failures (transport, non-2xx, bad config).
    pub async fn try_probe(&self, cfg: &LlmModelConfig) -> Result<HealthStatus, AiLlmError> {
        let url = http::api_url(cfg, "v1/models")?;
        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(self.default_timeout);

        let start = Instant::now();
        let resp = self
            .client
            .get(&url)
            .timeout(timeout)
            .header(header::AUTHORIZATION, http::bearer(cfg)?)
            .send()
            .await?;
        let latency = start.elapsed().as_millis();

        if !resp.status().is_success() {
            return Err(http::status_failure(resp, latency).await.into());
        }

        // A reachable server with an unexpected listing still counts as up.
        let status = match resp.json::<Models>().await {
            Ok(models) => status_for_models(cfg, &models, latency),
            Err(e) => {
                warn!(error = %e, latency_ms = latency, "could not decode /v1/models");
                HealthStatus::new(
                    cfg,
                    true,
                    latency,
                    format!("OpenAI is reachable; model list unreadable: {e}"),
                )
            }
        };
        Ok(status)
    }
}

fn status_for_models(cfg: &LlmModelConfig, models: &Models, latency: u128) -> HealthStatus {
    if models.data.iter().any(|m| m.id == cfg.model) {
        HealthStatus::new(cfg, true, latency, "OpenAI is healthy; model is available")
    } else {
        HealthStatus::new(
            cfg,
            false,
            latency,
            "OpenAI is up, but model not found in /v1/models",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(endpoint: &str) -> LlmModelConfig {
        LlmModelConfig {
            model: "gpt-4o".into(),
            endpoint: endpoint.into(),
            api_key: Some("sk-test".into()),
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: Some(1),
        }
    }

    #[test]
    fn model_listing_decides_ok() {
        let models: Models =
            serde_json::from_str(r#"{"data":[{"id":"gpt-4o-mini"},{"id":"gpt-4o"}]}"#).unwrap();
        assert!(status_for_models(&cfg("https://x"), &models, 3).ok);

        let models: Models = serde_json::from_str(r#"{"data":[{"id":"other"}]}"#).unwrap();
        let status = status_for_models(&cfg("https://x"), &models, 3);
        assert!(!status.ok);
        assert_eq!(status.provider, "OpenAI");
    }

    #[tokio::test]
    async fn invalid_endpoint_never_panics() {
        let svc = HealthService::new(Some(1)).unwrap();
        let status = svc.check(&cfg("ftp://nope")).await;
        assert!(!status.ok);
        assert!(status.message.contains("invalid endpoint"));
    }
}
