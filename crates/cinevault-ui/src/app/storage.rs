//! LocalStorage-backed key/value store.

use gloo::console;
use gloo::storage::{LocalStorage, Storage};

use crate::core::store::{KeyValueStore, StoreError};

/// Browser LocalStorage; values are stored JSON-encoded.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct LocalStore;

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        LocalStorage::get::<String>(key).ok()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        LocalStorage::set(key, value).map_err(|err| {
            let detail = err.to_string();
            console::error!("storage operation failed", key, detail.clone());
            StoreError {
                key: key.to_string(),
                detail,
            }
        })
    }

    fn remove(&self, key: &str) {
        LocalStorage::delete(key);
    }
}
