//! The chat-completion seam used by higher-level services.

use std::future::Future;

use crate::error_handler::AiLlmError;

/// A single non-streaming chat turn: one system message and one user message.
///
/// Sampling values set here override the model config for this call only.
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    pub system: &'a str,
    pub user: &'a str,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Ask the provider to constrain the reply to a single JSON object.
    pub json_object: bool,
}

impl<'a> ChatRequest<'a> {
    pub fn new(system: &'a str, user: &'a str) -> Self {
        Self {
            system,
            user,
            temperature: None,
            max_tokens: None,
            json_object: false,
        }
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.temperature = Some(t);
        self
    }

    pub fn max_tokens(mut self, n: u32) -> Self {
        self.max_tokens = Some(n);
        self
    }

    pub fn json_object(mut self) -> Self {
        self.json_object = true;
        self
    }
}

/// Anything that can answer a [`ChatRequest`] with the assistant's message text.
pub trait ChatBackend: Send + Sync {
    fn complete(
        &self,
        request: ChatRequest<'_>,
    ) -> impl Future<Output = Result<String, AiLlmError>> + Send;
}
