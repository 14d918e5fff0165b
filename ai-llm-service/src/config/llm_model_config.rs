use crate::error_handler::{ConfigError, Result, validate_http_endpoint, validate_range_f32};

/// Configuration for a chat-completion model.
///
/// # Fields
///
/// - `model`: The model identifier (e.g., `"gpt-4o"`).
/// - `endpoint`: Base URL of the provider API (without the `/v1/...` suffix).
/// - `api_key`: API key sent as a bearer token.
/// - `max_tokens`: Optional ceiling applied on top of per-call limits.
/// - `temperature`: Default sampling temperature when a call does not set one.
/// - `top_p`: Nucleus sampling cutoff (alternative to temperature).
/// - `timeout_secs`: Request timeout in seconds.
///
/// # Examples
///
/// ```
/// use ai_llm_service::config::llm_model_config::LlmModelConfig;
///
/// let cfg = LlmModelConfig {
///     model: "gpt-4o".to_string(),
///     endpoint: "https://api.openai.com".to_string(),
///     api_key: Some("sk-...".to_string()),
///     max_tokens: None,
///     temperature: Some(0.7),
///     top_p: None,
///     timeout_secs: Some(60),
/// };
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    /// Model identifier string (e.g., `"gpt-4o"`).
    pub model: String,

    /// Provider base URL.
    pub endpoint: String,

    /// API key for bearer authentication.
    pub api_key: Option<String>,

    /// Upper bound on generated tokens.
    pub max_tokens: Option<u32>,

    /// Sampling temperature (controls creativity).
    pub temperature: Option<f32>,

    /// Nucleus sampling parameter.
    pub top_p: Option<f32>,

    /// Optional request timeout (in seconds).
    pub timeout_secs: Option<u64>,
}

impl LlmModelConfig {
    /// Checks the model name, endpoint scheme, limits and sampling ranges.
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel.into());
        }
        validate_http_endpoint("OPENAI_URL", self.endpoint.trim())?;
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::OutOfRange {
                field: "timeout_secs",
                detail: "must be at least one second",
            }
            .into());
        }
        if self.max_tokens == Some(0) {
            return Err(ConfigError::OutOfRange {
                field: "max_tokens",
                detail: "must be positive",
            }
            .into());
        }
        if let Some(t) = self.temperature {
            validate_range_f32("temperature", t, 0.0, 2.0)?;
        }
        if let Some(p) = self.top_p {
            validate_range_f32("top_p", p, 0.0, 1.0)?;
        }
        Ok(())
    }

    /// Caps a per-call token limit by the configured ceiling, if any.
    pub fn clamp_max_tokens(&self, requested: Option<u32>) -> Option<u32> {
        match (requested, self.max_tokens) {
            (Some(r), Some(cap)) => Some(r.min(cap)),
            (Some(r), None) => Some(r),
            (None, cap) => cap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handler::AiLlmError;

    fn cfg() -> LlmModelConfig {
        LlmModelConfig {
            model: "gpt-4o".into(),
            endpoint: "https://api.openai.com".into(),
            api_key: Some("sk-test".into()),
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: Some(60),
        }
    }

    #[test]
    fn empty_model_is_rejected() {
        let c = LlmModelConfig {
            model: "  ".into(),
            ..cfg()
        };
        assert!(matches!(
            c.validate(),
            Err(AiLlmError::Config(ConfigError::EmptyModel))
        ));
    }

    #[test]
    fn zero_limits_are_rejected() {
        let no_timeout = LlmModelConfig {
            timeout_secs: Some(0),
            ..cfg()
        };
        assert!(matches!(
            no_timeout.validate(),
            Err(AiLlmError::Config(ConfigError::OutOfRange { field: "timeout_secs", .. }))
        ));

        let no_tokens = LlmModelConfig {
            max_tokens: Some(0),
            ..cfg()
        };
        assert!(matches!(
            no_tokens.validate(),
            Err(AiLlmError::Config(ConfigError::OutOfRange { field: "max_tokens", .. }))
        ));

        let unset = LlmModelConfig {
            timeout_secs: None,
            max_tokens: Some(1),
            ..cfg()
        };
        assert!(unset.validate().is_ok());
    }

    #[test]
    fn max_tokens_ceiling() {
        assert_eq!(cfg().clamp_max_tokens(Some(1000)), Some(1000));
        let capped = LlmModelConfig {
            max_tokens: Some(600),
            ..cfg()
        };
        assert_eq!(capped.clamp_max_tokens(Some(1000)), Some(600));
        assert_eq!(capped.clamp_max_tokens(Some(500)), Some(500));
        assert_eq!(capped.clamp_max_tokens(None), Some(600));
    }
}
