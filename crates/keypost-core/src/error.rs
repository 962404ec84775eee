use thiserror::Error;

/// Core error type for keypost operations.
#[derive(Error, Debug)]
pub enum KeypostError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using KeypostError.
pub type Result<T> = std::result::Result<T, KeypostError>;
