//! Errors surfaced by the content-assist gateway.

use thiserror::Error;

/// Message shown to callers for any upstream failure; details go to the logs only.
pub const UPSTREAM_FAILURE_MESSAGE: &str = "Failed to process content with AI assistant";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssistError {
    /// The requested transformation is not one of the known actions.
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// The content context is neither `question` nor `answer`.
    #[error("Unknown context: {0}")]
    UnknownContext(String),

    /// Provider call, transport or reply parsing failed.
    #[error("{}", UPSTREAM_FAILURE_MESSAGE)]
    Upstream,
}
