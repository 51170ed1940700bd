use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Rejections raised before any store call is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("message content is empty")]
    EmptyContent,
    #[error("no conversation selected")]
    NoCounterpart,
}
