//! Persisted state
//!
//! Features:
//! - Injected key-value store (`KeyValueStore`), LocalStorage on the web
//! - Pluggable codecs, JSON by default
//! - `PersistedValue`: write-through value with key moves
//! - Silent fallback to memory-only state when storage fails

pub mod codec;
pub mod store;
pub mod truthy;
pub mod value;

pub use codec::{Codec, FnCodec, JsonCodec};
pub use store::{KeyValueStore, MemoryStore};
pub use truthy::Truthy;
pub use value::PersistedValue;
