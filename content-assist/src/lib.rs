//! Content-assist gateway for the Q&A backend.
//!
//! Turns a piece of user text plus a requested transformation (polish, suggest-title,
//! clarify, concise) into a prompt pair, asks the chat backend for a JSON object, and
//! normalises whatever field names came back into [`AssistResponse`].
//!
//! Content transformation surfaces failures as [`AssistError::Upstream`]; question
//! suggestions degrade to an empty list instead.

pub mod action;
pub mod assistant;
pub mod errors;
pub mod parse;
pub mod prompt;

pub use action::{AssistAction, AssistContext};
pub use assistant::{AssistRequest, ContentAssistant};
pub use errors::AssistError;
pub use parse::AssistResponse;
