//! Error types for the terraforming engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("invalid state: expected {expected}, got {actual}")]
    InvalidState { expected: String, actual: String },

    #[error("insufficient {resource}: need {required}, have {available}")]
    InsufficientResource {
        resource: String,
        required: i32,
        available: i32,
    },

    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    #[error("invalid action: {0}")]
    InvalidAction(String),

    #[error("deck exhausted: requested {requested}, {available} remaining")]
    DeckExhausted { requested: usize, available: usize },

    #[error("unrecognized {0}")]
    Unrecognized(String),

    #[error("invalid card definition: {0}")]
    InvalidCardFormat(String),

    #[error("parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("task join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}

impl EngineError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        EngineError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn invalid_state(expected: impl ToString, actual: impl ToString) -> Self {
        EngineError::InvalidState {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    pub fn insufficient(resource: impl ToString, required: i32, available: i32) -> Self {
        EngineError::InsufficientResource {
            resource: resource.to_string(),
            required,
            available,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_expected_and_actual() {
        let err = EngineError::invalid_state("turn of player-1", "turn of player-2");
        assert_eq!(
            err.to_string(),
            "invalid state: expected turn of player-1, got turn of player-2"
        );

        let err = EngineError::insufficient("credits", 14, 3);
        assert_eq!(err.to_string(), "insufficient credits: need 14, have 3");

        let err = EngineError::not_found("card", "P01");
        assert_eq!(err.to_string(), "card not found: P01");
    }
}
