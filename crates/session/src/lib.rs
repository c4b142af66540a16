//! `gatehouse-session`: authenticated-session lifecycle and its reactive
//! in-memory mirror.
//!
//! [`SessionStore`] owns the durable, tab-scoped copy. [`SessionContext`]
//! holds the snapshot the UI tree reads. An attached context writes through
//! to its store on `login`, `update_profile` and `logout`, so the two views
//! cannot drift apart.

pub mod context;
pub mod lifecycle;

pub use context::{ContextError, SessionContext, SubscriptionId};
pub use lifecycle::SessionStore;
