//! The content-assist gateway: prompt, call, normalise.

use ai_llm_service::{ChatBackend, ChatRequest};
use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::action::{AssistAction, AssistContext};
use crate::errors::AssistError;
use crate::parse::{self, AssistResponse};
use crate::prompt::{self, PromptPair};

/// Sampling settings for one kind of call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallSettings {
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Rewrites and retitles.
pub const CONTENT_SETTINGS: CallSettings = CallSettings {
    temperature: 0.7,
    max_tokens: 1000,
};

/// Follow-up question generation.
pub const SUGGESTION_SETTINGS: CallSettings = CallSettings {
    temperature: 0.8,
    max_tokens: 500,
};

/// Request as received from the API layer; action and context are still raw strings.
#[derive(Debug, Clone, Deserialize)]
pub struct AssistRequest {
    pub content: String,
    pub action: String,
    #[serde(default)]
    pub context: Option<String>,
}

/// Stateless gateway over any [`ChatBackend`]. Calls are independent and may run concurrently.
pub struct ContentAssistant<B> {
    backend: B,
}

impl<B: ChatBackend> ContentAssistant<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Validates the raw request, then runs [`Self::process`].
    ///
    /// Unknown actions or contexts are rejected before anything is sent upstream.
    pub async fn process_content(
        &self,
        request: &AssistRequest,
    ) -> Result<AssistResponse, AssistError> {
        let action: AssistAction = request.action.parse()?;
        let context = match request.context.as_deref() {
            Some(c) => c.parse()?,
            None => AssistContext::default(),
        };
        self.process(&request.content, action, context).await
    }

    /// Runs one transformation.
    ///
    /// # Errors
    /// [`AssistError::Upstream`] on any provider, transport or JSON failure. The
    /// underlying cause is logged, never returned.
    pub async fn process(
        &self,
        content: &str,
        action: AssistAction,
        context: AssistContext,
    ) -> Result<AssistResponse, AssistError> {
        let prompts = prompt::build(action, context, content);
        debug!(%action, %context, content_len = content.len(), "content assist request");

        let raw = self
            .call(&prompts, CONTENT_SETTINGS)
            .await
            .map_err(|e| {
                error!(%action, error = %e, "AI assistant call failed");
                AssistError::Upstream
            })?;

        let obj = parse::reply_object(&raw).map_err(|e| {
            error!(%action, error = %e, reply_len = raw.len(), "AI assistant reply is not valid JSON");
            AssistError::Upstream
        })?;

        Ok(parse::normalize(action, content, &obj))
    }

    /// Generates up to five related questions for `topic`.
    ///
    /// Best effort: any failure is logged and yields an empty list.
    pub async fn generate_question_suggestions(&self, topic: &str) -> Vec<String> {
        let prompts = prompt::question_suggestions(topic);

        let raw = match self.call(&prompts, SUGGESTION_SETTINGS).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "question suggestion call failed");
                return Vec::new();
            }
        };

        match parse::reply_object(&raw) {
            Ok(obj) => parse::questions(&obj),
            Err(e) => {
                warn!(error = %e, "question suggestion reply is not valid JSON");
                Vec::new()
            }
        }
    }

    async fn call(
        &self,
        prompts: &PromptPair,
        settings: CallSettings,
    ) -> Result<String, ai_llm_service::AiLlmError> {
        let request = ChatRequest::new(&prompts.system, &prompts.user)
            .temperature(settings.temperature)
            .max_tokens(settings.max_tokens)
            .json_object();
        self.backend.complete(request).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use ai_llm_service::AiLlmError;
    use ai_llm_service::error_handler::{Provider, ProviderError, ProviderErrorKind};

    use super::*;

    /// Scripted backend: pops one reply per call and records what it was asked.
    #[derive(Default)]
    struct FakeBackend {
        replies: Mutex<VecDeque<Result<String, AiLlmError>>>,
        calls: AtomicUsize,
        seen: Mutex<Vec<(String, Option<f32>, Option<u32>, bool)>>,
    }

    impl FakeBackend {
        fn replying(reply: &str) -> Self {
            let fake = Self::default();
            fake.replies
                .lock()
                .unwrap()
                .push_back(Ok(reply.to_string()));
            fake
        }

        fn failing() -> Self {
            let fake = Self::default();
            fake.replies.lock().unwrap().push_back(Err(ProviderError::new(
                Provider::OpenAI,
                ProviderErrorKind::EmptyChoices,
            )
            .into()));
            fake
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ChatBackend for FakeBackend {
        async fn complete(&self, request: ChatRequest<'_>) -> Result<String, AiLlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push((
                request.user.to_string(),
                request.temperature,
                request.max_tokens,
                request.json_object,
            ));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("{}".to_string()))
        }
    }

    fn request(content: &str, action: &str) -> AssistRequest {
        AssistRequest {
            content: content.to_string(),
            action: action.to_string(),
            context: None,
        }
    }

    #[tokio::test]
    async fn suggest_title_uses_first_title() {
        let assistant = ContentAssistant::new(FakeBackend::replying(
            r#"{"titles":["How do I reverse a list in Python?","Reversing a list: best practices","List reversal techniques"],"reasoning":"clarity"}"#,
        ));

        let r = assistant
            .process_content(&request("how do i reverse a list", "suggest-title"))
            .await
            .unwrap();

        assert_eq!(r.original_content, "how do i reverse a list");
        assert_eq!(r.improved_content, "How do I reverse a list in Python?");
        assert_eq!(
            r.suggestions,
            vec![
                "How do I reverse a list in Python?",
                "Reversing a list: best practices",
                "List reversal techniques",
            ]
        );
        assert_eq!(r.reasoning, "clarity");
    }

    #[tokio::test]
    async fn unknown_action_fails_before_any_call() {
        let assistant = ContentAssistant::new(FakeBackend::default());
        let err = assistant
            .process_content(&request("text", "translate"))
            .await
            .unwrap_err();
        assert_eq!(err, AssistError::UnknownAction("translate".into()));
        assert_eq!(assistant.backend().calls(), 0);
    }

    #[tokio::test]
    async fn unknown_context_fails_before_any_call() {
        let assistant = ContentAssistant::new(FakeBackend::default());
        let mut req = request("text", "polish");
        req.context = Some("comment".into());
        let err = assistant.process_content(&req).await.unwrap_err();
        assert_eq!(err, AssistError::UnknownContext("comment".into()));
        assert_eq!(assistant.backend().calls(), 0);
    }

    #[tokio::test]
    async fn original_content_is_preserved_for_every_action() {
        for action in AssistAction::ALL {
            let assistant =
                ContentAssistant::new(FakeBackend::replying(r#"{"improved_content":"better"}"#));
            let r = assistant
                .process("  raw\ttext  ", action, AssistContext::Answer)
                .await
                .unwrap();
            assert_eq!(r.original_content, "  raw\ttext  ", "{action}");
        }
    }

    #[tokio::test]
    async fn invalid_json_reply_is_generic_error() {
        let assistant = ContentAssistant::new(FakeBackend::replying("this is not json"));
        let err = assistant
            .process("text", AssistAction::Polish, AssistContext::Question)
            .await
            .unwrap_err();
        assert_eq!(err, AssistError::Upstream);
        assert_eq!(err.to_string(), "Failed to process content with AI assistant");
    }

    #[tokio::test]
    async fn provider_failure_is_generic_error() {
        let assistant = ContentAssistant::new(FakeBackend::failing());
        let err = assistant
            .process("text", AssistAction::Clarify, AssistContext::Question)
            .await
            .unwrap_err();
        assert_eq!(err, AssistError::Upstream);
        assert_eq!(assistant.backend().calls(), 1);
    }

    #[tokio::test]
    async fn content_call_uses_json_mode_and_content_settings() {
        let assistant = ContentAssistant::new(FakeBackend::replying("{}"));
        let r = assistant
            .process("body", AssistAction::Concise, AssistContext::Answer)
            .await
            .unwrap();
        assert_eq!(r.improved_content, "body");

        let seen = assistant.backend().seen.lock().unwrap();
        let (user, temperature, max_tokens, json) = &seen[0];
        assert!(user.contains("body"));
        assert_eq!(*temperature, Some(0.7));
        assert_eq!(*max_tokens, Some(1000));
        assert!(*json);
    }

    #[tokio::test]
    async fn suggestions_parse_questions() {
        let assistant = ContentAssistant::new(FakeBackend::replying(
            r#"{"questions":["a?","b?","c?","d?","e?"]}"#,
        ));
        let qs = assistant.generate_question_suggestions("borrowing").await;
        assert_eq!(qs.len(), 5);

        let seen = assistant.backend().seen.lock().unwrap();
        assert_eq!(seen[0].1, Some(0.8));
        assert_eq!(seen[0].2, Some(500));
    }

    #[tokio::test]
    async fn suggestions_swallow_failures() {
        let assistant = ContentAssistant::new(FakeBackend::failing());
        assert!(assistant.generate_question_suggestions("x").await.is_empty());

        let assistant = ContentAssistant::new(FakeBackend::replying("{oops"));
        assert!(assistant.generate_question_suggestions("x").await.is_empty());
    }
}
