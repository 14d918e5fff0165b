//! Default LLM config loaded strictly from environment variables.
//!
//! # Environment variables
//!
//! - `OPENAI_API_KEY`   = API key (mandatory)
//! - `OPENAI_URL`       = provider base URL (default `https://api.openai.com`)
//! - `OPENAI_MODEL`     = chat model (default `gpt-4o`)
//! - `LLM_TIMEOUT_SECS` = request timeout in seconds (default 60)
//! - `LLM_MAX_TOKENS`   = optional ceiling on generated tokens

use crate::{
    config::llm_model_config::LlmModelConfig,
    error_handler::{AiLlmError, env_opt_u32, env_or, must_env},
};

pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Constructs the OpenAI chat config from the environment and validates it.
///
/// Sampling parameters are left unset here; callers choose them per request.
///
/// # Errors
///
/// - [`crate::error_handler::ConfigError::MissingVar`] if `OPENAI_API_KEY` is missing
/// - [`crate::error_handler::ConfigError::InvalidNumber`] for malformed numbers
/// - [`crate::error_handler::ConfigError::InvalidFormat`] for a non-http endpoint
pub fn config_openai() -> Result<LlmModelConfig, AiLlmError> {
    let api_key = must_env("OPENAI_API_KEY")?;
    let endpoint = env_or("OPENAI_URL", DEFAULT_OPENAI_URL);
    let model = env_or("OPENAI_MODEL", DEFAULT_OPENAI_MODEL);
    let timeout_secs = env_opt_u32("LLM_TIMEOUT_SECS")?
        .map(u64::from)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    let max_tokens = env_opt_u32("LLM_MAX_TOKENS")?;

    let cfg = LlmModelConfig {
        model,
        endpoint,
        api_key: Some(api_key),
        max_tokens,
        temperature: None,
        top_p: None,
        timeout_secs: Some(timeout_secs),
    };
    cfg.validate()?;
    Ok(cfg)
}
