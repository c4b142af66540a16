//! `window.sessionStorage` backend (wasm32 only).

use anyhow::{anyhow, Context};
use web_sys::Storage;

use crate::backend::{BackendError, StorageBackend};

/// Tab-scoped browser storage: survives reloads, not tab closure.
#[derive(Debug, Clone)]
pub struct SessionStorageBackend {
    storage: Storage,
}

impl SessionStorageBackend {
    pub fn new() -> anyhow::Result<Self> {
        let window = web_sys::window().context("no global window (not running in a browser tab)")?;
        let storage = window
            .session_storage()
            .map_err(|e| anyhow!("sessionStorage access denied: {e:?}"))?
            .context("sessionStorage is not available in this browser")?;

        Ok(Self { storage })
    }
}

impl StorageBackend for SessionStorageBackend {
    fn get(&self, key: &str) -> Option<String> {
        match self.storage.get_item(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = ?e, "sessionStorage read failed");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BackendError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| BackendError::Rejected {
                key: key.to_string(),
                detail: format!("{e:?}"),
            })
    }

    fn remove(&self, key: &str) {
        if let Err(e) = self.storage.remove_item(key) {
            tracing::warn!(key, error = ?e, "sessionStorage remove failed");
        }
    }

    fn keys(&self) -> Vec<String> {
        let len = self.storage.length().unwrap_or(0);
        (0..len)
            .filter_map(|index| self.storage.key(index).ok().flatten())
            .collect()
    }
}
