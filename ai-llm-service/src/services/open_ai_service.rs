//! Chat completions against the OpenAI REST API (`POST /v1/chat/completions`).
//!
//! One request per call, no streaming. The key and endpoint are checked when the
//! service is built so later calls can only fail upstream.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::llm_model_config::LlmModelConfig;
use crate::config::default_config::DEFAULT_TIMEOUT_SECS;
use crate::error_handler::{AiLlmError, ProviderError, ProviderErrorKind};
use crate::services::chat_backend::{ChatBackend, ChatRequest};
use crate::services::http;

#[derive(Debug)]
pub struct OpenAiService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    timeout: Duration,
    url_chat: String,
}

impl OpenAiService {
    /// # Errors
    /// - `MissingApiKey` / `InvalidEndpoint` provider errors for an unusable config
    /// - [`AiLlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        let url_chat = http::api_url(&cfg, "v1/chat/completions")?;
        let timeout = Duration::from_secs(cfg.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(http::default_headers(&cfg)?)
            .build()?;

        info!(
            model = %cfg.model,
            url = %url_chat,
            timeout_secs = timeout.as_secs(),
            "OpenAI chat client ready"
        );

        Ok(Self {
            client,
            cfg,
            timeout,
            url_chat,
        })
    }

    pub fn config(&self) -> &LlmModelConfig {
        &self.cfg
    }

    /// Sends one system/user exchange and returns the first choice's text.
    ///
    /// A choice without content yields an empty string.
    ///
    /// # Errors
    /// [`AiLlmError::Timeout`], [`AiLlmError::HttpTransport`], or a provider error
    /// (`HttpStatus`, `Decode`, `EmptyChoices`).
    pub async fn chat(&self, request: ChatRequest<'_>) -> Result<String, AiLlmError> {
        let started = Instant::now();
        let body = ChatCompletionRequest::from_cfg(&self.cfg, &request);
        debug!(
            model = %self.cfg.model,
            prompt_len = request.user.len(),
            json_object = request.json_object,
            "sending chat completion"
        );

        let resp = self
            .client
            .post(&self.url_chat)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !resp.status().is_success() {
            return Err(http::status_failure(resp, started.elapsed().as_millis())
                .await
                .into());
        }

        let decoded = resp
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| {
                error!(error = %e, model = %self.cfg.model, "chat completion body did not decode");
                ProviderError::openai(ProviderErrorKind::Decode(format!(
                    "{e}; expected `choices[0].message.content`"
                )))
            })?;
        let text = decoded.into_text()?;

        info!(
            model = %self.cfg.model,
            latency_ms = started.elapsed().as_millis(),
            reply_len = text.len(),
            "chat completion finished"
        );
        Ok(text)
    }

    fn transport_error(&self, e: reqwest::Error) -> AiLlmError {
        if e.is_timeout() {
            error!(timeout_secs = self.timeout.as_secs(), "OpenAI request timed out");
            AiLlmError::Timeout(self.timeout)
        } else {
            AiLlmError::from(e)
        }
    }
}

impl ChatBackend for OpenAiService {
    async fn complete(&self, request: ChatRequest<'_>) -> Result<String, AiLlmError> {
        self.chat(request).await
    }
}

/// Request body for `/v1/chat/completions`.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

impl<'a> ChatCompletionRequest<'a> {
    fn from_cfg(cfg: &'a LlmModelConfig, req: &ChatRequest<'a>) -> Self {
        Self {
            model: &cfg.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: req.system,
                },
                ChatMessage {
                    role: "user",
                    content: req.user,
                },
            ],
            response_format: req.json_object.then_some(ResponseFormat {
                kind: "json_object",
            }),
            temperature: req.temperature.or(cfg.temperature),
            top_p: cfg.top_p,
            max_tokens: cfg.clamp_max_tokens(req.max_tokens),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// The only part of the response the gateway reads.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

impl ChatCompletionResponse {
    fn into_text(self) -> Result<String, ProviderError> {
        self.choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or_else(|| ProviderError::openai(ProviderErrorKind::EmptyChoices))
    }
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageOut,
}

#[derive(Debug, Deserialize)]
struct ChatMessageOut {
    content: Option<String>,
}
