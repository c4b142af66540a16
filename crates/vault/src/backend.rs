//! Raw key/value storage underneath the encrypted store.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage rejected write to '{key}': {detail}")]
    Rejected { key: String, detail: String },
}

/// String key/value storage scoped to one browser tab.
///
/// Implementations use interior mutability: browser storage is mutated
/// through shared handles and the UI runs on a single thread.
pub trait StorageBackend {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), BackendError>;

    /// Remove `key`; no-op when absent.
    fn remove(&self, key: &str);

    /// Every key currently stored, including keys other code owns.
    fn keys(&self) -> Vec<String>;
}

impl<B: StorageBackend + ?Sized> StorageBackend for Rc<B> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BackendError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }

    fn keys(&self) -> Vec<String> {
        (**self).keys()
    }
}

/// In-memory backend for native hosts and tests.
///
/// Clones share the same map, like two handles onto one tab's storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
    quota_bytes: Option<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject writes once stored keys and values exceed `bytes`, like a full
    /// browser quota.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: Rc::default(),
            quota_bytes: Some(bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BackendError> {
        if let Some(quota) = self.quota_bytes {
            let needed = self.used_bytes_without(key) + key.len() + value.len();
            if needed > quota {
                return Err(BackendError::Rejected {
                    key: key.to_string(),
                    detail: format!("quota exceeded ({needed} > {quota} bytes)"),
                });
            }
        }

        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }
}
