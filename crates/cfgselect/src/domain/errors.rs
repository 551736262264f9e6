//! Domain-specific errors.

use thiserror::Error;

/// Errors raised by the selection engine. All of them point at a configuration defect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    #[error("required field '{path}' is missing")]
    MissingField { path: String },
    #[error("required key must be single, found {count}")]
    NotSingleton { count: usize },
    #[error("no keys matched the condition")]
    EmptySet,
    #[error("config key '{key}' could not be resolved")]
    UnresolvedConfig { key: String },
    #[error("invalid condition: {0}")]
    InvalidCondition(String),
}

impl SelectError {
    pub(crate) fn missing_field(path: impl Into<String>) -> Self {
        SelectError::MissingField { path: path.into() }
    }
}
