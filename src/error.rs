//! Error types
//!
//! Storage and codec failures are absorbed by [`crate::persistence::PersistedValue`]
//! and only ever logged. Game errors are contract violations and are returned
//! to the caller.

use thiserror::Error;

/// Boxed error produced by a codec implementation
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures reported by a key-value store backend
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached at all (no window, storage disabled)
    #[error("storage unavailable: {reason}")]
    Unavailable { reason: String },
    /// Reading an entry failed
    #[error("failed to read `{key}`: {reason}")]
    Read { key: String, reason: String },
    /// Writing an entry failed (quota exceeded, private mode)
    #[error("failed to write `{key}`: {reason}")]
    Write { key: String, reason: String },
    /// Removing an entry failed
    #[error("failed to remove `{key}`: {reason}")]
    Remove { key: String, reason: String },
}

/// Failures converting a value to or from its persisted text form
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode value")]
    Encode(#[source] BoxError),
    #[error("failed to decode stored text")]
    Decode(#[source] BoxError),
}

/// Invalid arguments passed to the game engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Jump target outside the recorded history
    #[error("history index {index} out of range (history has {len} entries)")]
    InvalidHistoryIndex { index: usize, len: usize },
    /// Square index outside the 3x3 board
    #[error("square index {index} out of range (board has 9 squares)")]
    InvalidSquare { index: usize },
}
