//! Permission evaluation for UI visibility decisions.
//!
//! - No IO
//! - No panics
//! - Unknown resources or operations evaluate to `false`

use std::borrow::Cow;

use serde::Serialize;

use crate::permissions::{Operation, PermissionSet};

/// A single `(resource, operation)` requirement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionCheck {
    pub resource_key: Cow<'static, str>,
    pub operation: Operation,
}

impl PermissionCheck {
    pub fn new(resource_key: impl Into<Cow<'static, str>>, operation: Operation) -> Self {
        Self {
            resource_key: resource_key.into(),
            operation,
        }
    }
}

/// Whether `operation` is allowed on `resource_key`.
///
/// An empty key is denied. Elements that should always be visible declare
/// [`Gate::Ungated`] instead of omitting the key.
pub fn has_permission(set: &PermissionSet, resource_key: &str, operation: Operation) -> bool {
    if resource_key.trim().is_empty() {
        return false;
    }
    set.allows(resource_key, operation)
}

/// True iff at least one check passes. An empty list is `false`.
pub fn has_any_permission(set: &PermissionSet, checks: &[PermissionCheck]) -> bool {
    checks
        .iter()
        .any(|check| has_permission(set, &check.resource_key, check.operation))
}

/// True iff every check passes. An empty list is `false`, not vacuously true.
pub fn has_all_permissions(set: &PermissionSet, checks: &[PermissionCheck]) -> bool {
    !checks.is_empty()
        && checks
            .iter()
            .all(|check| has_permission(set, &check.resource_key, check.operation))
}

/// Visibility rule declared by a UI element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    /// Always visible, with or without a session.
    Ungated,
    Requires(PermissionCheck),
    AnyOf(Vec<PermissionCheck>),
    AllOf(Vec<PermissionCheck>),
}

impl Gate {
    pub fn requires(resource_key: impl Into<Cow<'static, str>>, operation: Operation) -> Self {
        Gate::Requires(PermissionCheck::new(resource_key, operation))
    }

    /// The individual checks this gate is made of.
    pub fn checks(&self) -> &[PermissionCheck] {
        match self {
            Gate::Ungated => &[],
            Gate::Requires(check) => core::slice::from_ref(check),
            Gate::AnyOf(checks) | Gate::AllOf(checks) => checks,
        }
    }

    /// Evaluate against the session's permissions (`None` when logged out).
    pub fn allows(&self, permissions: Option<&PermissionSet>) -> bool {
        match (self, permissions) {
            (Gate::Ungated, _) => true,
            (_, None) => false,
            (Gate::Requires(check), Some(set)) => {
                has_permission(set, &check.resource_key, check.operation)
            }
            (Gate::AnyOf(checks), Some(set)) => has_any_permission(set, checks),
            (Gate::AllOf(checks), Some(set)) => has_all_permissions(set, checks),
        }
    }
}

impl From<PermissionCheck> for Gate {
    fn from(check: PermissionCheck) -> Self {
        Gate::Requires(check)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Explanation (debug panels)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    NoSession,
    EmptyResourceKey,
    UnknownResource,
    MissingOperation,
}

/// Why a permission check passed or failed.
#[derive(Debug, Clone, Serialize)]
pub struct PermissionExplanation {
    pub resource_key: String,
    pub operation: Operation,
    pub granted: bool,
    pub reason: String,
    /// Operations the session holds on this resource (sorted).
    pub granted_operations: Vec<Operation>,
    pub denial: Option<DenialKind>,
}

/// Explain the decision [`has_permission`] would make.
pub fn explain_permission(
    permissions: Option<&PermissionSet>,
    resource_key: &str,
    operation: Operation,
) -> PermissionExplanation {
    let denied = |kind: DenialKind, reason: String, granted_operations: Vec<Operation>| {
        PermissionExplanation {
            resource_key: resource_key.to_string(),
            operation,
            granted: false,
            reason,
            granted_operations,
            denial: Some(kind),
        }
    };

    let Some(set) = permissions else {
        return denied(
            DenialKind::NoSession,
            "No active session; permissions are unavailable".to_string(),
            Vec::new(),
        );
    };

    if resource_key.trim().is_empty() {
        return denied(
            DenialKind::EmptyResourceKey,
            "Empty resource key; declare the element as ungated instead".to_string(),
            Vec::new(),
        );
    }

    let Some(ops) = set.operations(resource_key) else {
        return denied(
            DenialKind::UnknownResource,
            format!("No grant exists for resource '{resource_key}'"),
            Vec::new(),
        );
    };

    let granted_operations: Vec<Operation> = ops.iter().copied().collect();

    if ops.contains(&operation) {
        PermissionExplanation {
            resource_key: resource_key.to_string(),
            operation,
            granted: true,
            reason: format!("Grant for '{resource_key}' includes '{operation}'"),
            granted_operations,
            denial: None,
        }
    } else {
        denied(
            DenialKind::MissingOperation,
            format!(
                "Grant for '{resource_key}' does not include '{operation}'. Granted: {granted_operations:?}"
            ),
            granted_operations,
        )
    }
}
