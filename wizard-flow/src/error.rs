use thiserror::Error;

/// Errors raised by the flow engine. Screens themselves do not fail on bad
/// user input (they answer with guidance instead); these cover structural
/// problems only.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("page not found: {0}")]
    PageNotFound(String),

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("context error: {0}")]
    Context(String),

    #[error("screen execution failed: {0}")]
    ScreenFailed(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FlowError>;
