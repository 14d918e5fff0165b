//! Request plumbing shared by the chat client and the health probe.

use reqwest::header::{self, HeaderValue};
use tracing::error;

use crate::config::llm_model_config::LlmModelConfig;
use crate::error_handler::{HttpError, ProviderError, ProviderErrorKind, make_snippet};

/// `{endpoint}{path}` with exactly one slash between them.
pub(crate) fn api_url(cfg: &LlmModelConfig, path: &str) -> Result<String, ProviderError> {
    let base = cfg.endpoint.trim();
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(ProviderError::openai(ProviderErrorKind::InvalidEndpoint(
            cfg.endpoint.clone(),
        )));
    }
    Ok(format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/')))
}

/// `Authorization: Bearer <key>` for the configured key.
pub(crate) fn bearer(cfg: &LlmModelConfig) -> Result<HeaderValue, ProviderError> {
    let key = cfg
        .api_key
        .as_deref()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| ProviderError::openai(ProviderErrorKind::MissingApiKey))?;
    let mut value = HeaderValue::from_str(&format!("Bearer {key}")).map_err(|e| {
        ProviderError::openai(ProviderErrorKind::Decode(format!(
            "API key is not a valid header value: {e}"
        )))
    })?;
    value.set_sensitive(true);
    Ok(value)
}

pub(crate) fn default_headers(cfg: &LlmModelConfig) -> Result<header::HeaderMap, ProviderError> {
    let mut headers = header::HeaderMap::new();
    headers.insert(header::AUTHORIZATION, bearer(cfg)?);
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    Ok(headers)
}

/// Turns a non-2xx response into a provider error, logging a short body snippet.
pub(crate) async fn status_failure(resp: reqwest::Response, latency_ms: u128) -> ProviderError {
    let status = resp.status();
    let url = resp.url().to_string();
    let snippet = make_snippet(&resp.text().await.unwrap_or_default());

    error!(%status, %url, %snippet, latency_ms, "OpenAI returned non-success status");

    ProviderError::openai(ProviderErrorKind::HttpStatus(HttpError {
        status,
        url,
        snippet,
    }))
}
