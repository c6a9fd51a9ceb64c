// Error type shared by the store, the join layer and the request handlers.
use thiserror::Error;

pub mod response;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Auth(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    // A stored record points at an entity that no longer resolves.
    #[error("{entity} {id} references missing {target} {target_id}")]
    DanglingReference {
        entity: &'static str,
        id: String,
        target: &'static str,
        target_id: String,
    },

    #[error("Password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

impl AppError {
    pub fn not_found(what: &str) -> Self {
        AppError::NotFound(format!("{} not found", what))
    }

    pub fn dangling(
        entity: &'static str,
        id: &str,
        target: &'static str,
        target_id: &str,
    ) -> Self {
        AppError::DanglingReference {
            entity,
            id: id.to_string(),
            target,
            target_id: target_id.to_string(),
        }
    }
}

// Custom result type
pub type AppResult<T> = Result<T, AppError>;
