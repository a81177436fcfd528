//! Store selection per platform

use std::rc::Rc;

use crate::persistence::{KeyValueStore, MemoryStore};

#[cfg(target_arch = "wasm32")]
pub use web::LocalStorage;

/// The process-wide store: LocalStorage when available, memory otherwise
#[cfg(target_arch = "wasm32")]
pub fn default_store() -> Rc<dyn KeyValueStore> {
    match LocalStorage::open() {
        Ok(storage) => Rc::new(storage),
        Err(err) => {
            log::warn!("{}; state will not survive a reload", err);
            Rc::new(MemoryStore::new())
        }
    }
}

/// Native builds keep state in memory
#[cfg(not(target_arch = "wasm32"))]
pub fn default_store() -> Rc<dyn KeyValueStore> {
    Rc::new(MemoryStore::new())
}

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::JsValue;

    use crate::error::StoreError;
    use crate::persistence::KeyValueStore;

    /// `window.localStorage`
    pub struct LocalStorage {
        storage: web_sys::Storage,
    }

    fn describe(err: JsValue) -> String {
        err.as_string().unwrap_or_else(|| format!("{:?}", err))
    }

    impl LocalStorage {
        pub fn open() -> Result<Self, StoreError> {
            let window = web_sys::window().ok_or_else(|| StoreError::Unavailable {
                reason: "no window".to_string(),
            })?;
            let storage = window
                .local_storage()
                .map_err(|e| StoreError::Unavailable { reason: describe(e) })?
                .ok_or_else(|| StoreError::Unavailable {
                    reason: "localStorage disabled".to_string(),
                })?;
            Ok(Self { storage })
        }
    }

    impl KeyValueStore for LocalStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.storage.get_item(key).map_err(|e| StoreError::Read {
                key: key.to_string(),
                reason: describe(e),
            })
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            self.storage.set_item(key, value).map_err(|e| StoreError::Write {
                key: key.to_string(),
                reason: describe(e),
            })
        }

        fn remove(&self, key: &str) -> Result<(), StoreError> {
            self.storage.remove_item(key).map_err(|e| StoreError::Remove {
                key: key.to_string(),
                reason: describe(e),
            })
        }
    }
}
