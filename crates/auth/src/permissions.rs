use std::borrow::{Borrow, Cow};
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// An action a user may perform on a resource.
///
/// The set is closed so that evaluation is an exhaustive match rather than
/// string probing. Names the backend sends that are not listed here are
/// dropped while parsing a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Read,
    Create,
    Update,
    Delete,
    Export,
    Import,
    Approve,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::Read,
        Operation::Create,
        Operation::Update,
        Operation::Delete,
        Operation::Export,
        Operation::Import,
        Operation::Approve,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Read => "read",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Export => "export",
            Operation::Import => "import",
            Operation::Approve => "approve",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown operation '{0}'")]
pub struct UnknownOperation(pub String);

impl core::str::FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownOperation(s.to_string()))
    }
}

impl core::fmt::Display for Operation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a protected resource (e.g. "users", "posts").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceKey(Cow<'static, str>);

impl ResourceKey {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Borrow<str> for ResourceKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One resource and the operations allowed on it (wire shape).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionGrant {
    pub resource_key: ResourceKey,
    #[serde(default, deserialize_with = "known_operations")]
    pub allowed_operations: BTreeSet<Operation>,
}

impl PermissionGrant {
    pub fn new(
        resource_key: impl Into<Cow<'static, str>>,
        operations: impl IntoIterator<Item = Operation>,
    ) -> Self {
        Self {
            resource_key: ResourceKey::new(resource_key),
            allowed_operations: operations.into_iter().collect(),
        }
    }
}

fn known_operations<'de, D>(deserializer: D) -> Result<BTreeSet<Operation>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(entries
        .iter()
        .filter_map(|entry| match entry {
            Value::String(name) => match name.parse::<Operation>() {
                Ok(op) => Some(op),
                Err(err) => {
                    tracing::debug!(%err, "skipping operation not modelled by the client");
                    None
                }
            },
            other => {
                tracing::debug!(entry = %other, "skipping non-string operation entry");
                None
            }
        })
        .collect())
}

/// A user's permission grants, indexed by resource key.
///
/// Serialized as the list of grants the login service sends. Keys are unique;
/// a key repeated on the wire is merged by union. A key that is absent grants
/// nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<PermissionGrant>", into = "Vec<PermissionGrant>")]
pub struct PermissionSet {
    grants: BTreeMap<ResourceKey, BTreeSet<Operation>>,
}

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add operations for a resource, merging with any existing grant.
    pub fn grant(
        mut self,
        resource_key: impl Into<Cow<'static, str>>,
        operations: impl IntoIterator<Item = Operation>,
    ) -> Self {
        self.insert(PermissionGrant::new(resource_key, operations));
        self
    }

    pub fn insert(&mut self, grant: PermissionGrant) {
        self.grants
            .entry(grant.resource_key)
            .or_default()
            .extend(grant.allowed_operations);
    }

    pub fn operations(&self, resource_key: &str) -> Option<&BTreeSet<Operation>> {
        self.grants.get(resource_key)
    }

    pub fn allows(&self, resource_key: &str, operation: Operation) -> bool {
        self.operations(resource_key)
            .is_some_and(|ops| ops.contains(&operation))
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

impl From<Vec<PermissionGrant>> for PermissionSet {
    fn from(grants: Vec<PermissionGrant>) -> Self {
        let mut set = PermissionSet::new();
        for grant in grants {
            set.insert(grant);
        }
        set
    }
}

impl From<PermissionSet> for Vec<PermissionGrant> {
    fn from(set: PermissionSet) -> Self {
        set.grants
            .into_iter()
            .map(|(resource_key, allowed_operations)| PermissionGrant {
                resource_key,
                allowed_operations,
            })
            .collect()
    }
}

impl FromIterator<PermissionGrant> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = PermissionGrant>>(iter: I) -> Self {
        let mut set = PermissionSet::new();
        for grant in iter {
            set.insert(grant);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_parse_is_case_insensitive() {
        assert_eq!("READ".parse::<Operation>().unwrap(), Operation::Read);
        assert_eq!(" export ".parse::<Operation>().unwrap(), Operation::Export);
        assert!("launch".parse::<Operation>().is_err());
    }

    #[test]
    fn grants_parse_from_login_payload() {
        let raw = r#"[
            { "resourceKey": "users", "allowedOperations": ["read", "update"] },
            { "resourceKey": "posts", "allowedOperations": ["read"] }
        ]"#;
        let set: PermissionSet = serde_json::from_str(raw).unwrap();

        assert_eq!(set.len(), 2);
        assert!(set.allows("users", Operation::Update));
        assert!(!set.allows("users", Operation::Delete));
        assert!(set.allows("posts", Operation::Read));
    }

    #[test]
    fn unknown_operations_are_skipped_not_fatal() {
        let raw = r#"[{ "resourceKey": "reports", "allowedOperations": ["read", "teleport"] }]"#;
        let set: PermissionSet = serde_json::from_str(raw).unwrap();

        let ops = set.operations("reports").unwrap();
        assert_eq!(ops.len(), 1);
        assert!(ops.contains(&Operation::Read));
    }

    #[test]
    fn null_or_non_string_operations_do_not_drop_other_grants() {
        let raw = r#"[
            { "resourceKey": "posts", "allowedOperations": ["read"] },
            { "resourceKey": "audit", "allowedOperations": null },
            { "resourceKey": "reports", "allowedOperations": ["export", null, 7, { "op": "read" }] }
        ]"#;
        let set: PermissionSet = serde_json::from_str(raw).unwrap();

        assert!(set.allows("posts", Operation::Read));
        assert!(set.operations("audit").unwrap().is_empty());
        assert_eq!(
            set.operations("reports").unwrap().iter().copied().collect::<Vec<_>>(),
            vec![Operation::Export]
        );
    }

    #[test]
    fn missing_operations_field_grants_nothing() {
        let raw = r#"[{ "resourceKey": "audit" }]"#;
        let set: PermissionSet = serde_json::from_str(raw).unwrap();

        assert!(set.operations("audit").unwrap().is_empty());
        assert!(!set.allows("audit", Operation::Read));
    }

    #[test]
    fn duplicate_resource_keys_merge_by_union() {
        let set = PermissionSet::from(vec![
            PermissionGrant::new("users", [Operation::Read]),
            PermissionGrant::new("users", [Operation::Delete]),
        ]);

        assert_eq!(set.len(), 1);
        assert!(set.allows("users", Operation::Read));
        assert!(set.allows("users", Operation::Delete));
    }

    #[test]
    fn serializes_back_to_wire_shape() {
        let set = PermissionSet::new().grant("users", [Operation::Read, Operation::Update]);
        let json = serde_json::to_value(&set).unwrap();

        assert_eq!(
            json,
            serde_json::json!([{ "resourceKey": "users", "allowedOperations": ["read", "update"] }])
        );
    }
}
