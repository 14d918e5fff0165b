use domain_schema::SchemaError;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("duplicate row violates {constraint}")]
    Conflict { constraint: String },

    #[error("referenced row is missing or still referenced ({constraint})")]
    MissingReference { constraint: String },

    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A relationship rule the database cannot express was broken.
    #[error("invariant violated: {0}")]
    Invariant(String),

    #[error(transparent)]
    Validation(#[from] SchemaError),

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            let constraint = db.constraint().unwrap_or_default().to_string();
            match db.code().as_deref() {
                Some(UNIQUE_VIOLATION) => return StoreError::Conflict { constraint },
                Some(FOREIGN_KEY_VIOLATION) => return StoreError::MissingReference { constraint },
                _ => {}
            }
        }
        StoreError::Database(err)
    }
}
