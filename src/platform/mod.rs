//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Storage (LocalStorage on web, in-memory natively)

pub mod storage;

pub use storage::default_store;
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;
