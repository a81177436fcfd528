//! Tic-tac-toe with time travel, plus a name greeting
//!
//! Core modules:
//! - `persistence`: Values mirrored into a key-value store
//! - `game`: Board rules and move history
//! - `greeting`: Persisted name greeting
//! - `platform`: Browser/native platform abstraction
//! - `settings`: Storage keys and initial values

pub mod error;
pub mod game;
pub mod greeting;
pub mod persistence;
pub mod platform;
pub mod settings;

pub use error::{CodecError, GameError, StoreError};
pub use game::{Board, GameEngine, GameStatus, Player};
pub use greeting::Greeting;
pub use persistence::{KeyValueStore, MemoryStore, PersistedValue};
pub use settings::Settings;
