//! `gatehouse-core`: shared foundation for the console's session gate.
//!
//! This crate contains configuration and the error taxonomy only; it has no
//! storage, crypto or UI concerns.

pub mod config;
pub mod error;

pub use config::{CredentialSecret, GateConfig, LoginPaths, SlotNames};
pub use error::{ConfigError, SessionFault};
