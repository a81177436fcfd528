//! A value mirrored into a key-value store under a (changeable) key

use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::codec::{Codec, JsonCodec};
use super::store::KeyValueStore;
use super::truthy::Truthy;

/// In-memory value kept in sync with one store entry
///
/// After every `set`/`update`/`set_key` the entry at `key()` holds the
/// encoded value, and an entry left behind by a previous key is removed.
/// Store failures never surface: the value switches to ephemeral mode and
/// lives in memory only for the rest of the process.
pub struct PersistedValue<T, C = JsonCodec<T>> {
    store: Rc<dyn KeyValueStore>,
    codec: C,
    key: String,
    /// Key written by the last synchronization pass
    prev_key: String,
    value: T,
    ephemeral: bool,
}

impl<T> PersistedValue<T>
where
    T: Serialize + DeserializeOwned + Truthy,
{
    /// Load `key` as JSON, falling back to `default`
    pub fn new(store: Rc<dyn KeyValueStore>, key: impl Into<String>, default: T) -> Self {
        Self::with_codec(store, key, move || default, JsonCodec::new())
    }

    /// Load `key` as JSON, falling back to `default()` (only called when needed)
    pub fn new_with(
        store: Rc<dyn KeyValueStore>,
        key: impl Into<String>,
        default: impl FnOnce() -> T,
    ) -> Self {
        Self::with_codec(store, key, default, JsonCodec::new())
    }
}

impl<T: Truthy, C: Codec<T>> PersistedValue<T, C> {
    /// Load `key` with a custom codec, falling back to `default()`
    pub fn with_codec(
        store: Rc<dyn KeyValueStore>,
        key: impl Into<String>,
        default: impl FnOnce() -> T,
        codec: C,
    ) -> Self {
        let key = key.into();
        let mut ephemeral = false;

        let stored = match store.get(&key) {
            Ok(Some(text)) => match codec.deserialize(&text) {
                Ok(value) => Some(value),
                Err(err) => {
                    log::warn!("Discarding unreadable entry `{}`: {}", key, err);
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                log::warn!("{}; `{}` will not be persisted", err, key);
                ephemeral = true;
                None
            }
        };

        let value = match stored.filter(Truthy::is_truthy) {
            Some(value) => {
                log::debug!("Loaded `{}` from storage", key);
                value
            }
            None => default(),
        };

        let mut persisted = Self {
            store,
            codec,
            prev_key: key.clone(),
            key,
            value,
            ephemeral,
        };
        persisted.synchronize();
        persisted
    }

    /// Current value
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Key the value is persisted under
    pub fn key(&self) -> &str {
        &self.key
    }

    /// True once a store failure has made this value memory-only
    pub fn is_ephemeral(&self) -> bool {
        self.ephemeral
    }

    /// Replace the value and persist it
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.synchronize();
    }

    /// Mutate the value in place and persist it
    pub fn update(&mut self, f: impl FnOnce(&mut T)) {
        f(&mut self.value);
        self.synchronize();
    }

    /// Move the value to a new key, removing the old entry
    pub fn set_key(&mut self, key: impl Into<String>) {
        self.key = key.into();
        self.synchronize();
    }

    /// Reconcile the store with `(key, value)`
    ///
    /// Removes the entry at the previous key if the key changed, then writes
    /// the encoded value at the current key. A value that fails to encode
    /// leaves no entry behind.
    pub fn synchronize(&mut self) {
        if self.ephemeral {
            return;
        }

        if self.prev_key != self.key {
            if let Err(err) = self.store.remove(&self.prev_key) {
                self.degrade(&err);
                return;
            }
            log::debug!("Moved `{}` -> `{}`", self.prev_key, self.key);
        }
        self.prev_key = self.key.clone();

        let text = match self.codec.serialize(&self.value) {
            Ok(text) => text,
            Err(err) => {
                // Drop the entry so a reload cannot pick up an outdated value
                log::warn!("Cannot encode `{}`, clearing its entry: {}", self.key, err);
                if let Err(err) = self.store.remove(&self.key) {
                    self.degrade(&err);
                }
                return;
            }
        };

        if let Err(err) = self.store.set(&self.key, &text) {
            self.degrade(&err);
            return;
        }
        log::debug!("Synced `{}` ({} bytes)", self.key, text.len());
    }

    fn degrade(&mut self, err: &dyn std::error::Error) {
        log::warn!("{}; keeping `{}` in memory only", err, self.key);
        self.ephemeral = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CodecError, StoreError};
    use crate::persistence::codec::FnCodec;
    use crate::persistence::store::MemoryStore;
    use std::cell::Cell;

    /// Store whose writes start failing after `ok_writes` successes
    struct FailingStore {
        inner: MemoryStore,
        ok_writes: Cell<usize>,
        fail_reads: bool,
        fail_removes: bool,
    }

    impl FailingStore {
        fn new(ok_writes: usize) -> Self {
            Self {
                inner: MemoryStore::new(),
                ok_writes: Cell::new(ok_writes),
                fail_reads: false,
                fail_removes: false,
            }
        }
    }

    impl KeyValueStore for FailingStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            if self.fail_reads {
                return Err(StoreError::Unavailable {
                    reason: "disabled".into(),
                });
            }
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            match self.ok_writes.get() {
                0 => Err(StoreError::Write {
                    key: key.into(),
                    reason: "quota exceeded".into(),
                }),
                n => {
                    self.ok_writes.set(n - 1);
                    self.inner.set(key, value)
                }
            }
        }

        fn remove(&self, key: &str) -> Result<(), StoreError> {
            if self.fail_removes {
                return Err(StoreError::Remove {
                    key: key.into(),
                    reason: "locked".into(),
                });
            }
            self.inner.remove(key)
        }
    }

    fn memory() -> (Rc<MemoryStore>, Rc<dyn KeyValueStore>) {
        let store = Rc::new(MemoryStore::new());
        let handle: Rc<dyn KeyValueStore> = store.clone();
        (store, handle)
    }

    #[test]
    fn test_default_used_and_written_when_absent() {
        let (store, handle) = memory();
        let value = PersistedValue::new(handle, "name", "Ann".to_string());
        assert_eq!(value.get(), "Ann");
        assert_eq!(store.raw("name").as_deref(), Some("\"Ann\""));
    }

    #[test]
    fn test_stored_value_wins_over_default() {
        let (store, handle) = memory();
        store.set("count", "7").unwrap();
        let value = PersistedValue::new(handle, "count", 1u32);
        assert_eq!(*value.get(), 7);
    }

    #[test]
    fn test_falsy_stored_value_falls_back() {
        let (store, handle) = memory();
        store.set("name", "\"\"").unwrap();
        let value = PersistedValue::new(handle, "name", "Default".to_string());
        assert_eq!(value.get(), "Default");
        assert_eq!(store.raw("name").as_deref(), Some("\"Default\""));
    }

    #[test]
    fn test_supplier_only_called_when_needed() {
        let (store, handle) = memory();
        store.set("n", "5").unwrap();
        let called = Cell::new(false);
        let value = PersistedValue::new_with(handle, "n", || {
            called.set(true);
            9u32
        });
        assert_eq!(*value.get(), 5);
        assert!(!called.get());
    }

    #[test]
    fn test_corrupt_entry_falls_back_and_is_overwritten() {
        let (store, handle) = memory();
        store.set("n", "{not json").unwrap();
        let value = PersistedValue::new(handle, "n", 3u32);
        assert_eq!(*value.get(), 3);
        assert!(!value.is_ephemeral());
        assert_eq!(store.raw("n").as_deref(), Some("3"));
    }

    #[test]
    fn test_set_writes_through() {
        let (store, handle) = memory();
        let mut value = PersistedValue::new(handle, "n", 1u32);
        value.set(42);
        assert_eq!(store.raw("n").as_deref(), Some("42"));
        value.update(|n| *n += 1);
        assert_eq!(store.raw("n").as_deref(), Some("43"));
    }

    #[test]
    fn test_set_key_moves_entry() {
        let (store, handle) = memory();
        let mut value = PersistedValue::new(handle, "k1", "v".to_string());
        value.set_key("k2");
        assert_eq!(value.key(), "k2");
        assert!(!store.contains("k1"));
        assert_eq!(store.raw("k2").as_deref(), Some("\"v\""));

        // Same key again is just a rewrite
        value.set_key("k2");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_fresh_value_reads_back_what_was_set() {
        let (_, handle) = memory();
        let mut first = PersistedValue::new(handle.clone(), "list", vec![0u8]);
        first.set(vec![1, 2, 3]);
        let second = PersistedValue::new(handle, "list", vec![9u8]);
        assert_eq!(second.get(), &vec![1, 2, 3]);
    }

    #[test]
    fn test_write_failure_degrades_to_memory() {
        let store = Rc::new(FailingStore::new(1));
        let handle: Rc<dyn KeyValueStore> = store.clone();
        let mut value = PersistedValue::new(handle, "n", 1u32);
        assert!(!value.is_ephemeral());

        value.set(2);
        assert!(value.is_ephemeral());
        assert_eq!(*value.get(), 2);

        value.set(3);
        assert_eq!(*value.get(), 3);
        assert_eq!(store.inner.raw("n").as_deref(), Some("1"));
    }

    #[test]
    fn test_unavailable_store_uses_default_in_memory() {
        let mut store = FailingStore::new(usize::MAX);
        store.fail_reads = true;
        let store = Rc::new(store);
        let handle: Rc<dyn KeyValueStore> = store.clone();
        let mut value = PersistedValue::new(handle, "n", 4u32);
        assert!(value.is_ephemeral());
        assert_eq!(*value.get(), 4);
        value.set(5);
        assert!(store.inner.is_empty());
    }

    #[test]
    fn test_remove_failure_on_key_move_degrades() {
        let mut store = FailingStore::new(usize::MAX);
        store.fail_removes = true;
        let store = Rc::new(store);
        let handle: Rc<dyn KeyValueStore> = store.clone();
        let mut value = PersistedValue::new(handle, "k1", "a".to_string());

        value.set_key("k2");
        assert!(value.is_ephemeral());
        assert_eq!(value.key(), "k2");

        // Later changes stay in memory
        value.set("b".to_string());
        value.set_key("k3");
        assert_eq!(value.get(), "b");
        assert_eq!(store.inner.raw("k1").as_deref(), Some("\"a\""));
        assert!(!store.inner.contains("k2"));
        assert!(!store.inner.contains("k3"));
        assert_eq!(store.inner.len(), 1);
    }

    #[test]
    fn test_set_key_on_ephemeral_value_leaves_store_untouched() {
        let store = Rc::new(FailingStore::new(1));
        let handle: Rc<dyn KeyValueStore> = store.clone();
        let mut value = PersistedValue::new(handle, "k1", 1u32);
        value.set(2);
        assert!(value.is_ephemeral());

        value.set_key("k2");
        assert!(value.is_ephemeral());
        assert_eq!(value.key(), "k2");
        assert_eq!(*value.get(), 2);
        assert_eq!(store.inner.raw("k1").as_deref(), Some("1"));
        assert!(!store.inner.contains("k2"));
    }

    #[test]
    fn test_encode_failure_clears_entry() {
        let (store, handle) = memory();
        let encode_ok = Rc::new(Cell::new(true));
        let flag = encode_ok.clone();
        let codec = FnCodec::new(
            move |n: &u32| {
                if flag.get() {
                    Ok(n.to_string())
                } else {
                    Err(CodecError::Encode("encoder offline".into()))
                }
            },
            |text: &str| {
                text.parse::<u32>()
                    .map_err(|e| CodecError::Decode(Box::new(e)))
            },
        );
        let mut value = PersistedValue::with_codec(handle.clone(), "n", || 1u32, codec);
        assert_eq!(store.raw("n").as_deref(), Some("1"));

        encode_ok.set(false);
        value.set(2);
        assert_eq!(*value.get(), 2);
        assert!(!value.is_ephemeral());
        assert!(!store.contains("n"));

        // A reload sees no stale value
        let reloaded = PersistedValue::new(handle, "n", 7u32);
        assert_eq!(*reloaded.get(), 7);
    }

    #[test]
    fn test_custom_codec() {
        let (store, handle) = memory();
        let codec = FnCodec::new(
            |n: &u32| Ok(format!("n={}", n)),
            |text: &str| {
                text.strip_prefix("n=")
                    .and_then(|n| n.parse().ok())
                    .ok_or_else(|| CodecError::Decode("missing prefix".into()))
            },
        );
        let mut value = PersistedValue::with_codec(handle, "n", || 8u32, codec);
        value.set(12);
        assert_eq!(store.raw("n").as_deref(), Some("n=12"));
    }
}
