//! Error types for the tournament engine.

use thiserror::Error;

use crate::llm::{LlmError, StructuredOutputError};

/// Result type for tournament operations.
pub type ArenaResult<T> = Result<T, ArenaError>;

/// Error types for tournament operations.
#[derive(Error, Debug)]
pub enum ArenaError {
    #[error("Judge gateway error: {0}")]
    Gateway(#[from] LlmError),

    #[error("Malformed structured output: {0}")]
    StructuredOutput(#[from] StructuredOutputError),

    #[error("Store error: {0}")]
    Store(#[from] arena_common_core::Error),

    #[error("Need at least {required} starter personas, found {found}")]
    InsufficientStarters { required: usize, found: usize },

    #[error("A round needs at least 2 active contestants, found {found}")]
    NotEnoughContestants { found: usize },

    #[error("Model pool is empty")]
    EmptyModelPool,

    #[error("Inconsistent tournament state: {0}")]
    InconsistentState(String),
}

impl ArenaError {
    /// Whether the failure came from the generation backend rather than local state.
    pub fn is_gateway(&self) -> bool {
        matches!(self, Self::Gateway(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_starters_message() {
        let err = ArenaError::InsufficientStarters {
            required: 5,
            found: 3,
        };
        assert_eq!(err.to_string(), "Need at least 5 starter personas, found 3");
    }

    #[test]
    fn test_store_error_conversion() {
        let err: ArenaError = arena_common_core::Error::new("disk full").into();
        assert!(matches!(err, ArenaError::Store(_)));
        assert!(!err.is_gateway());
    }

    #[test]
    fn test_gateway_error_conversion() {
        let err: ArenaError = LlmError::ParseError("truncated body".to_string()).into();
        assert!(err.is_gateway());
    }
}
