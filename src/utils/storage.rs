// ============================================================================
// STORAGE - Key/value persistence (localStorage in the browser)
// ============================================================================

use std::cell::RefCell;
use std::collections::HashMap;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::TrackerError;

/// Device-scoped string storage
pub trait KeyValueStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, TrackerError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), TrackerError>;
}

/// Serialise `value` as JSON under `key`
pub fn save_to_storage<T: Serialize>(
    storage: &dyn KeyValueStorage,
    key: &str,
    value: &T,
) -> Result<(), TrackerError> {
    let json = serde_json::to_string(value)?;
    storage.set_item(key, &json)
}

/// Read JSON under `key`; `Ok(None)` when the key is absent
pub fn load_from_storage<T: DeserializeOwned>(
    storage: &dyn KeyValueStorage,
    key: &str,
) -> Result<Option<T>, TrackerError> {
    match storage.get_item(key)? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// In-process storage, used headless and in tests
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, TrackerError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), TrackerError> {
        self.items.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserStorage;

#[cfg(target_arch = "wasm32")]
mod browser {
    use gloo_storage::{LocalStorage, Storage};

    use super::KeyValueStorage;
    use crate::error::TrackerError;

    /// `window.localStorage`, raw strings through gloo's handle
    #[derive(Debug, Clone, Copy, Default)]
    pub struct BrowserStorage;

    impl KeyValueStorage for BrowserStorage {
        fn get_item(&self, key: &str) -> Result<Option<String>, TrackerError> {
            LocalStorage::raw()
                .get_item(key)
                .map_err(|_| TrackerError::Storage(format!("Could not read '{}'", key)))
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), TrackerError> {
            LocalStorage::raw()
                .set_item(key, value)
                .map_err(|_| TrackerError::Storage(format!("Could not write '{}'", key)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_round_trip_through_storage() {
        let storage = MemoryStorage::new();
        save_to_storage(&storage, "k", &vec!["a".to_string(), "b".to_string()]).unwrap();
        assert_eq!(storage.raw("k").as_deref(), Some(r#"["a","b"]"#));

        let back: Option<Vec<String>> = load_from_storage(&storage, "k").unwrap();
        assert_eq!(back, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn missing_key_loads_none() {
        let storage = MemoryStorage::new();
        let value: Option<Vec<String>> = load_from_storage(&storage, "absent").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn corrupt_value_is_a_serialization_error() {
        let storage = MemoryStorage::new();
        storage.set_item("k", "not json").unwrap();
        let err = load_from_storage::<Vec<String>>(&storage, "k").unwrap_err();
        assert!(matches!(err, TrackerError::Serialization(_)));
    }
}
