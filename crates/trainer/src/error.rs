//! Trainer error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrainerError {
    #[error("Configuration error: invalid {key}={value:?} ({reason})")]
    Config {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Unknown opening: {0}")]
    UnknownOpening(String),

    #[error("Invalid opening content: {0}")]
    Content(String),

    #[error("Invalid command: {0}")]
    Command(String),

    #[error("Replay error: {0}")]
    Replay(#[from] chess_core::ReplayError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
