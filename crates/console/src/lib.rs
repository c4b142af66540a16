//! `gatehouse-console`
//!
//! **Responsibility:** wire the session gate into the admin console's UI.
//!
//! This crate provides:
//! - The console's route requirements and navigation gates (all targets)
//! - A Leptos session provider, route guard and permission gate (wasm32)
//!
//! The browser copy of the session is advisory. The API re-validates every
//! privileged call.

pub mod routes;

#[cfg(target_arch = "wasm32")]
pub mod frontend;

pub use routes::{console_routes, explain_nav, nav_items, NavItem};
