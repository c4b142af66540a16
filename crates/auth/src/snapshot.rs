//! Session snapshot and the payloads that change it.

use serde::{Deserialize, Serialize};

use crate::evaluate::{has_any_permission, has_permission, Gate, PermissionCheck};
use crate::permissions::{Operation, PermissionSet};
use crate::profile::UserProfile;

/// The `{ token, user, permissions }` tuple mirrored by the UI tree.
///
/// `user` is present iff a login has not been followed by a logout. A token
/// without a user is not expected; a user without a token is possible (cached
/// profile, credential never issued or dropped).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
    pub permissions: Option<PermissionSet>,
}

impl SessionSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn has_token(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.is_admin)
    }

    /// [`has_permission`] against this session; `false` when logged out.
    pub fn can(&self, resource_key: &str, operation: Operation) -> bool {
        self.permissions
            .as_ref()
            .is_some_and(|set| has_permission(set, resource_key, operation))
    }

    /// [`has_any_permission`] against this session; `false` when logged out.
    pub fn can_any(&self, checks: &[PermissionCheck]) -> bool {
        self.permissions
            .as_ref()
            .is_some_and(|set| has_any_permission(set, checks))
    }

    pub fn passes(&self, gate: &Gate) -> bool {
        gate.allows(self.permissions.as_ref())
    }
}

/// Successful authentication response from the login service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
    #[serde(default)]
    pub permissions: PermissionSet,
}

impl From<LoginResponse> for SessionSnapshot {
    fn from(login: LoginResponse) -> Self {
        Self {
            token: Some(login.token).filter(|t| !t.is_empty()),
            user: Some(login.user),
            permissions: Some(login.permissions),
        }
    }
}

/// Partial session update. Fields left `None` are not touched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthUpdate {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
    pub permissions: Option<PermissionSet>,
}

impl AuthUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn user(mut self, user: UserProfile) -> Self {
        self.user = Some(user);
        self
    }

    pub fn permissions(mut self, permissions: PermissionSet) -> Self {
        self.permissions = Some(permissions);
        self
    }

    /// Apply to an in-memory snapshot with the same rules the durable store
    /// uses: empty tokens are ignored.
    pub fn apply_to(&self, snapshot: &mut SessionSnapshot) {
        if let Some(token) = self.token.as_ref().filter(|t| !t.is_empty()) {
            snapshot.token = Some(token.clone());
        }
        if let Some(user) = &self.user {
            snapshot.user = Some(user.clone());
        }
        if let Some(permissions) = &self.permissions {
            snapshot.permissions = Some(permissions.clone());
        }
    }
}

impl From<LoginResponse> for AuthUpdate {
    fn from(login: LoginResponse) -> Self {
        Self {
            token: Some(login.token),
            user: Some(login.user),
            permissions: Some(login.permissions),
        }
    }
}
