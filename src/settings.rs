//! App settings
//!
//! Persisted separately from game state in the same store.

use serde::{Deserialize, Serialize};

use crate::persistence::KeyValueStore;

/// Storage keys and initial values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Key holding the list of board snapshots
    pub history_key: String,
    /// Key holding the viewed history position
    pub index_key: String,
    /// Key holding the greeting name
    pub name_key: String,
    /// Name shown before anything has been typed
    pub initial_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            history_key: "squares".to_string(),
            index_key: "historyIndex".to_string(),
            name_key: "name".to_string(),
            initial_name: String::new(),
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "tictactoe_settings";

    /// Load settings from the store, defaults on any failure
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from storage");
                    return settings;
                }
                Err(err) => log::warn!("Ignoring unreadable settings: {}", err),
            },
            Ok(None) => {}
            Err(err) => log::warn!("{}", err),
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to the store
    pub fn save(&self, store: &dyn KeyValueStore) {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(err) => {
                log::warn!("Failed to encode settings: {}", err);
                return;
            }
        };
        match store.set(Self::STORAGE_KEY, &json) {
            Ok(()) => log::info!("Settings saved"),
            Err(err) => log::warn!("{}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_defaults_when_absent() {
        let store = MemoryStore::new();
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let store = MemoryStore::new();
        let settings = Settings {
            history_key: "game2.squares".into(),
            ..Default::default()
        };
        settings.save(&store);
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let store = MemoryStore::new();
        store
            .set(Settings::STORAGE_KEY, r#"{"initial_name":"Kim"}"#)
            .unwrap();
        let settings = Settings::load(&store);
        assert_eq!(settings.initial_name, "Kim");
        assert_eq!(settings.history_key, "squares");
    }

    #[test]
    fn test_garbage_falls_back() {
        let store = MemoryStore::new();
        store.set(Settings::STORAGE_KEY, "[1,2").unwrap();
        assert_eq!(Settings::load(&store), Settings::default());
    }
}
