//! Centralized error types for the game core.
//!
//! The core runs a closed real-time loop, so the taxonomy is narrow: wiring
//! bugs and corrupt layouts are fatal, everything else (stale treasure,
//! destroyed enemies, repeated game-over) is handled with liveness checks.

use std::io;

/// Main error type for the game core.
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    /// A step was attempted without the state it depends on (e.g. divider
    /// wall placement without a treasure). Room construction must abort.
    #[error("Precondition violated: {0}")]
    Precondition(String),

    /// A collaborator was used before it was initialized.
    #[error("Not initialized: {0}")]
    NotInitialized(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Settings parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;
