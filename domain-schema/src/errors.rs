use thiserror::Error;

use crate::validation::ValidationError;

pub type SchemaResult<T> = Result<T, SchemaError>;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Payload passed validation but could not be turned into the typed value.
    #[error("payload decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unknown vote target type: {0}")]
    InvalidVoteTarget(String),

    #[error("unknown vote type: {0}")]
    InvalidVoteDirection(String),

    #[error("unknown notification type: {0}")]
    UnknownNotificationKind(String),

    #[error("unknown table: {0}")]
    UnknownTable(String),
}
