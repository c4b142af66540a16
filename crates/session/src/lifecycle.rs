//! Durable session slots: establish, read, clear.

use serde::de::DeserializeOwned;
use serde::Serialize;

use gatehouse_auth::{AuthUpdate, SessionSnapshot};
use gatehouse_core::{GateConfig, SessionFault, SlotNames};
use gatehouse_vault::{EphemeralStore, StorageBackend};

/// The `token`, `user` and `permissions` slots on top of an encrypted store.
#[derive(Debug, Clone)]
pub struct SessionStore<B> {
    store: EphemeralStore<B>,
    slots: SlotNames,
}

impl<B: StorageBackend> SessionStore<B> {
    pub fn new(store: EphemeralStore<B>, slots: SlotNames) -> Self {
        Self { store, slots }
    }

    pub fn from_config(backend: B, config: &GateConfig) -> Self {
        Self::new(EphemeralStore::from_config(backend, config), config.slots.clone())
    }

    /// Write every present field; absent fields and empty tokens are left
    /// untouched.
    pub fn set_auth_user(&self, update: &AuthUpdate) {
        if let Some(token) = update.token.as_deref().filter(|t| !t.is_empty()) {
            self.store.set_item(&self.slots.token, token);
        }
        if let Some(user) = &update.user {
            self.write_json(&self.slots.user, user);
        }
        if let Some(permissions) = &update.permissions {
            self.write_json(&self.slots.permissions, permissions);
        }
    }

    /// Read all three slots. Missing, undecodable or unparseable values come
    /// back as `None`; this never fails.
    pub fn get_auth_data(&self) -> SessionSnapshot {
        let token = self.store.get_item(&self.slots.token);

        SessionSnapshot {
            token: Some(token).filter(|t| !t.is_empty()),
            user: self.read_json(&self.slots.user),
            permissions: self.read_json(&self.slots.permissions),
        }
    }

    /// Remove the three slots, then sweep everything else the store owns.
    pub fn remove_auth_data(&self) {
        for slot in self.slots.all() {
            self.store.remove_item(slot);
        }
        self.store.clear_all();
    }

    pub fn ephemeral(&self) -> &EphemeralStore<B> {
        &self.store
    }

    pub fn slots(&self) -> &SlotNames {
        &self.slots
    }

    fn write_json<T: Serialize>(&self, slot: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(text) => self.store.set_item(slot, &text),
            Err(err) => tracing::warn!(slot, %err, "failed to serialize session slot; left unchanged"),
        }
    }

    fn read_json<T: DeserializeOwned>(&self, slot: &str) -> Option<T> {
        let text = self.store.get_item(slot);
        if text.trim().is_empty() {
            return None;
        }

        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(err) => {
                let fault = SessionFault::malformed(slot, err.to_string());
                tracing::debug!(%fault, "discarding unreadable session slot");
                None
            }
        }
    }
}
