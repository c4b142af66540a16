//! `gatehouse-auth`: pure session model and authorization decisions.
//!
//! This crate is intentionally decoupled from storage, encryption and the UI.
//! Every decision here is advisory: the remote service re-validates each
//! privileged operation.

pub mod evaluate;
pub mod guard;
pub mod permissions;
pub mod profile;
pub mod snapshot;

pub use evaluate::{
    explain_permission, has_all_permissions, has_any_permission, has_permission, DenialKind, Gate,
    PermissionCheck, PermissionExplanation,
};
pub use guard::{guard, guard_route, GuardDecision, ReturnTo, RouteRequirement, RouteTable};
pub use permissions::{Operation, PermissionGrant, PermissionSet, ResourceKey, UnknownOperation};
pub use profile::UserProfile;
pub use snapshot::{AuthUpdate, LoginResponse, SessionSnapshot};
