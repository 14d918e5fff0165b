//! OpenAI chat-completion client shared by the Q&A backend.
//!
//! - [`services::open_ai_service::OpenAiService`]: non-streaming chat completions,
//!   optionally constrained to a JSON object reply.
//! - [`services::chat_backend::ChatBackend`]: the trait higher layers are generic over.
//! - [`health_service::HealthService`]: `/v1/models` probe.
//! - [`telemetry`]: workspace-scoped `tracing-subscriber` layer.

pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod services;
pub mod telemetry;

pub use config::llm_model_config::LlmModelConfig;
pub use error_handler::AiLlmError;
pub use services::chat_backend::{ChatBackend, ChatRequest};
pub use services::open_ai_service::OpenAiService;
