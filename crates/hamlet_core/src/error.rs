//! Error types for the simulation core.

use thiserror::Error;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all simulation errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// Map file could not be read.
    #[error("Failed to load map '{path}': {source}")]
    MapLoad {
        /// Path to the map that failed to load.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Map file could not be parsed.
    #[error("Failed to parse map '{path}': {message}")]
    MapParse {
        /// Path to the map that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Invalid player identifier.
    #[error("Invalid player id: {0}")]
    InvalidPlayer(usize),

    /// Replay file I/O failure.
    #[error("Replay error: {0}")]
    Replay(#[from] std::io::Error),

    /// Invalid simulation state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Serialization/deserialization failure.
    #[error("Serialization failed: {0}")]
    Serialization(String),
}
