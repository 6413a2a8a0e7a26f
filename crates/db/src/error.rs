use bizdesk_core::error::CoreError;

/// Errors from repositories that enforce business rules on top of storage.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
