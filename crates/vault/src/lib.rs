//! `gatehouse-vault`: encryption at rest for tab-scoped browser storage.
//!
//! Values pass through [`Cipher`] on every write and read. Failures never
//! reach the caller: an undecodable value reads as an empty string.

pub mod backend;
pub mod cipher;
pub mod store;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use backend::{BackendError, MemoryBackend, StorageBackend};
pub use cipher::{Cipher, CipherError};
pub use store::EphemeralStore;

#[cfg(target_arch = "wasm32")]
pub use web::SessionStorageBackend;
