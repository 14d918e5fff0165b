pub mod chat_backend;
pub(crate) mod http;
pub mod open_ai_service;
