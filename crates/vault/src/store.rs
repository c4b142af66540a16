//! Encrypted, tab-scoped key/value store.

use gatehouse_core::GateConfig;

use crate::backend::StorageBackend;
use crate::cipher::{Cipher, CipherError};

/// Key/value store whose values are encrypted at rest.
///
/// Every key is namespaced with the configured prefix, and [`clear_all`]
/// only removes keys carrying that prefix, leaving unrelated tab state alone.
///
/// [`clear_all`]: EphemeralStore::clear_all
#[derive(Debug, Clone)]
pub struct EphemeralStore<B> {
    backend: B,
    cipher: Cipher,
    prefix: String,
}

impl<B: StorageBackend> EphemeralStore<B> {
    pub fn new(backend: B, cipher: Cipher, prefix: impl Into<String>) -> Self {
        Self {
            backend,
            cipher,
            prefix: prefix.into(),
        }
    }

    pub fn from_config(backend: B, config: &GateConfig) -> Self {
        Self::new(backend, Cipher::new(&config.secret), config.storage_prefix.clone())
    }

    /// Encrypt `value` and write it under `key`.
    ///
    /// A rejected write (quota, privacy mode) is logged; the key then reads
    /// as whatever it held before.
    pub fn set_item(&self, key: &str, value: &str) {
        let ciphertext = self.cipher.encrypt(value);
        if ciphertext.is_empty() {
            return;
        }

        if let Err(err) = self.backend.set(&self.namespaced(key), &ciphertext) {
            tracing::warn!(key, %err, "failed to write to ephemeral storage");
        }
    }

    /// Read and decrypt `key`; empty when absent or undecodable.
    pub fn get_item(&self, key: &str) -> String {
        let raw = self.backend.get(&self.namespaced(key)).unwrap_or_default();

        match self.cipher.try_decrypt(&raw) {
            Ok(plaintext) => plaintext,
            Err(CipherError::Empty) => String::new(),
            Err(err) => {
                tracing::debug!(key, %err, fault = ?err.fault(), "stored value is unreadable; treating as absent");
                String::new()
            }
        }
    }

    pub fn remove_item(&self, key: &str) {
        self.backend.remove(&self.namespaced(key));
    }

    /// Remove every entry this store owns.
    pub fn clear_all(&self) {
        let owned: Vec<String> = self
            .backend
            .keys()
            .into_iter()
            .filter(|key| key.starts_with(&self.prefix))
            .collect();

        tracing::debug!(count = owned.len(), "clearing ephemeral store");
        for key in owned {
            self.backend.remove(&key);
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.backend.get(&self.namespaced(key)).is_some()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use gatehouse_core::CredentialSecret;

    fn store(backend: MemoryBackend) -> EphemeralStore<MemoryBackend> {
        EphemeralStore::new(
            backend,
            Cipher::new(&CredentialSecret::new("store-secret")),
            "gh.",
        )
    }

    #[test]
    fn values_are_encrypted_at_rest() {
        let backend = MemoryBackend::new();
        let store = store(backend.clone());

        store.set_item("token", "tok1");

        let raw = backend.get("gh.token").unwrap();
        assert_ne!(raw, "tok1");
        assert!(!raw.contains("tok1"));
        assert_eq!(store.get_item("token"), "tok1");
    }

    #[test]
    fn absent_key_reads_as_empty() {
        let store = store(MemoryBackend::new());
        assert_eq!(store.get_item("missing"), "");
        assert!(!store.contains("missing"));
    }

    #[test]
    fn corrupted_value_reads_as_empty() {
        let backend = MemoryBackend::new();
        let store = store(backend.clone());

        backend.set("gh.user", "definitely not ciphertext").unwrap();
        assert_eq!(store.get_item("user"), "");
    }

    #[test]
    fn remove_item_is_idempotent() {
        let store = store(MemoryBackend::new());
        store.set_item("token", "tok1");

        store.remove_item("token");
        store.remove_item("token");
        assert_eq!(store.get_item("token"), "");
    }

    #[test]
    fn clear_all_only_touches_owned_keys() {
        let backend = MemoryBackend::new();
        let store = store(backend.clone());

        store.set_item("token", "tok1");
        store.set_item("user", "{}");
        backend.set("theme", "dark").unwrap();
        backend.set("other-app.token", "x").unwrap();

        store.clear_all();

        assert_eq!(backend.keys(), vec!["other-app.token".to_string(), "theme".to_string()]);
        assert_eq!(store.get_item("token"), "");
    }

    #[test]
    fn rejected_write_keeps_previous_value() {
        let backend = MemoryBackend::with_quota(200);
        let store = store(backend.clone());

        store.set_item("token", "short");
        store.set_item("token", &"x".repeat(500));

        assert_eq!(store.get_item("token"), "short");
    }
}
