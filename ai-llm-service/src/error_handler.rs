//! Errors for the OpenAI client and its configuration.
//!
//! Every message carries the `[AI LLM Service]` tag so it can be told apart in
//! mixed logs.

use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AiLlmError>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AiLlmError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Bad status, undecodable payload or empty reply.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("[AI LLM Service] transport error: {0}")]
    HttpTransport(#[from] reqwest::Error),

    #[error("[AI LLM Service] request timed out after {0:?}")]
    Timeout(Duration),
}

/// Problems found while reading or checking configuration at startup.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("[AI LLM Service] environment variable {0} is required")]
    MissingVar(&'static str),

    #[error("[AI LLM Service] {var} is not a number ({reason})")]
    InvalidNumber {
        var: &'static str,
        reason: &'static str,
    },

    #[error("[AI LLM Service] {var} is malformed: {reason}")]
    InvalidFormat {
        var: &'static str,
        reason: &'static str,
    },

    #[error("[AI LLM Service] {field} is out of range: {detail}")]
    OutOfRange {
        field: &'static str,
        detail: &'static str,
    },

    #[error("[AI LLM Service] model name must not be empty")]
    EmptyModel,
}

/// Upstream provider a [`ProviderError`] originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAI,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::OpenAI => f.write_str("OpenAI"),
        }
    }
}

/// Non-success HTTP response details, kept short enough to log.
#[derive(Debug, Clone)]
pub struct HttpError {
    /// Numeric HTTP status code.
    pub status: StatusCode,
    /// Request URL.
    pub url: String,
    /// Short snippet of the response body (trimmed).
    pub snippet: String,
}

/// What went wrong while talking to a provider.
#[non_exhaustive]
#[derive(Debug)]
pub enum ProviderErrorKind {
    /// The endpoint is empty or does not start with http/https.
    InvalidEndpoint(String),
    /// The provider requires an API key and none was configured.
    MissingApiKey,
    /// Upstream returned a non-successful HTTP status.
    HttpStatus(HttpError),
    /// Response payload could not be decoded as expected.
    Decode(String),
    /// Chat completion came back without any choices.
    EmptyChoices,
}

/// Provider-scoped error: which provider and what kind of failure.
#[derive(Debug, Error)]
#[error("[AI LLM Service] {provider}: {kind}")]
pub struct ProviderError {
    pub provider: Provider,
    pub kind: ProviderErrorKind,
}

impl ProviderError {
    pub fn new(provider: Provider, kind: ProviderErrorKind) -> Self {
        Self { provider, kind }
    }

    pub fn openai(kind: ProviderErrorKind) -> Self {
        Self::new(Provider::OpenAI, kind)
    }
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderErrorKind::InvalidEndpoint(e) => write!(f, "invalid endpoint: {e}"),
            ProviderErrorKind::MissingApiKey => f.write_str("missing API key"),
            ProviderErrorKind::HttpStatus(h) => {
                write!(f, "HTTP {} from {}: {}", h.status, h.url, h.snippet)
            }
            ProviderErrorKind::Decode(e) => write!(f, "decode error: {e}"),
            ProviderErrorKind::EmptyChoices => f.write_str("response contained no choices"),
        }
    }
}

/// Maximum number of characters of a response body kept in errors and logs.
pub const SNIPPET_LIMIT: usize = 300;

/// Trims a response body down to a single-line snippet suitable for logs.
pub fn make_snippet(body: &str) -> String {
    let flat = body.trim().replace(['\n', '\r'], " ");
    if flat.chars().count() <= SNIPPET_LIMIT {
        flat
    } else {
        let mut s: String = flat.chars().take(SNIPPET_LIMIT).collect();
        s.push('…');
        s
    }
}

/// Required variable; blank counts as missing.
pub fn must_env(name: &'static str) -> Result<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingVar(name).into()),
    }
}

/// Reads an optional environment variable, falling back to `default` when unset or empty.
pub fn env_or(name: &'static str, default: &str) -> String {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => default.to_string(),
    }
}

/// Optional `u32`; unset or blank gives `None`.
pub fn env_opt_u32(name: &'static str) -> Result<Option<u32>> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => v.trim().parse::<u32>().map(Some).map_err(|_| {
            AiLlmError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected u32",
            })
        }),
        _ => Ok(None),
    }
}

pub fn validate_http_endpoint(var: &'static str, value: &str) -> Result<()> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormat {
            var,
            reason: "must start with http:// or https://",
        }
        .into())
    }
}

/// `value` must be finite and inside `min..=max`.
pub fn validate_range_f32(field: &'static str, value: f32, min: f32, max: f32) -> Result<()> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            detail: "expected value in inclusive range",
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_is_flattened_and_truncated() {
        assert_eq!(make_snippet("  a\nb \r\n"), "a b");

        let long = "x".repeat(SNIPPET_LIMIT + 50);
        let s = make_snippet(&long);
        assert_eq!(s.chars().count(), SNIPPET_LIMIT + 1);
        assert!(s.ends_with('…'));
    }

    #[test]
    fn endpoint_scheme_is_checked() {
        assert!(validate_http_endpoint("OPENAI_URL", "https://api.openai.com").is_ok());
        let err = validate_http_endpoint("OPENAI_URL", "api.openai.com").unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Config(ConfigError::InvalidFormat { var: "OPENAI_URL", .. })
        ));
    }

    #[test]
    fn temperature_range() {
        assert!(validate_range_f32("temperature", 0.7, 0.0, 2.0).is_ok());
        assert!(validate_range_f32("temperature", 2.5, 0.0, 2.0).is_err());
        assert!(validate_range_f32("temperature", f32::NAN, 0.0, 2.0).is_err());
    }

    #[test]
    fn provider_error_message_names_provider() {
        let err = ProviderError::new(Provider::OpenAI, ProviderErrorKind::EmptyChoices);
        assert_eq!(
            err.to_string(),
            "[AI LLM Service] OpenAI: response contained no choices"
        );
    }
}
