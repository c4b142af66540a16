//! User profile as returned by the login/profile service.
//!
//! The profile's shape belongs to the remote service. Decoding never fails on
//! a field this client cannot use: `null` reads as the default, and a value of
//! the wrong type (or a timestamp that does not parse) is kept verbatim in
//! `extra` under its wire name.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Profile record of the signed-in user.
///
/// Fields this client does not model are kept in `extra` so a round trip
/// through storage is lossless. `id` is empty when the service sent none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "WireProfile")]
pub struct UserProfile {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub display_name: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub username: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_title: Option<String>,

    /// Privileged (administrator) account.
    #[serde(skip_serializing_if = "is_false")]
    pub is_admin: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: String::new(),
            username: String::new(),
            email: String::new(),
            phone: None,
            role_title: None,
            is_admin: false,
            created_at: None,
            updated_at: None,
            extra: Map::new(),
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn admin(mut self) -> Self {
        self.is_admin = true;
        self
    }
}

/// Anything the service may send; every modelled field is optional and untyped.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireProfile {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    display_name: Value,
    #[serde(default)]
    username: Value,
    #[serde(default)]
    email: Value,
    #[serde(default)]
    phone: Value,
    #[serde(default)]
    role_title: Value,
    #[serde(default)]
    is_admin: Value,
    #[serde(default)]
    created_at: Value,
    #[serde(default)]
    updated_at: Value,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<WireProfile> for UserProfile {
    fn from(wire: WireProfile) -> Self {
        let mut extra = wire.extra;

        Self {
            id: text(wire.id, "id", &mut extra).unwrap_or_default(),
            display_name: text(wire.display_name, "displayName", &mut extra).unwrap_or_default(),
            username: text(wire.username, "username", &mut extra).unwrap_or_default(),
            email: text(wire.email, "email", &mut extra).unwrap_or_default(),
            phone: text(wire.phone, "phone", &mut extra),
            role_title: text(wire.role_title, "roleTitle", &mut extra),
            is_admin: flag(wire.is_admin, "isAdmin", &mut extra),
            created_at: timestamp(wire.created_at, "createdAt", &mut extra),
            updated_at: timestamp(wire.updated_at, "updatedAt", &mut extra),
            extra,
        }
    }
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

// A default-valued field is not serialized, so a stashed value never
// collides with it on the way back out.
fn stash<T>(field: &str, value: Value, extra: &mut Map<String, Value>) -> Option<T> {
    tracing::debug!(field, "keeping profile field of unexpected shape verbatim");
    extra.insert(field.to_string(), value);
    None
}

// Some backends emit numeric ids.
fn text(value: Value, field: &str, extra: &mut Map<String, Value>) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        other => stash(field, other, extra),
    }
}

fn flag(value: Value, field: &str, extra: &mut Map<String, Value>) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => b,
        other => stash::<bool>(field, other, extra).unwrap_or_default(),
    }
}

fn timestamp(value: Value, field: &str, extra: &mut Map<String, Value>) -> Option<DateTime<Utc>> {
    match value {
        Value::Null => None,
        Value::String(raw) => match parse_timestamp(&raw) {
            Some(at) => Some(at),
            None => stash(field, Value::String(raw), extra),
        },
        other => stash(field, other, extra),
    }
}

/// RFC 3339, or a zone-less date/time taken as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .into_iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_profile_with_numeric_id_and_unknown_fields() {
        let raw = r#"{
            "id": 42,
            "displayName": "Ada Lovelace",
            "username": "ada",
            "email": "ada@example.com",
            "roleTitle": "Editor",
            "isAdmin": true,
            "createdAt": "2024-05-01T10:00:00Z",
            "avatarUrl": "https://cdn.example.com/ada.png"
        }"#;
        let profile: UserProfile = serde_json::from_str(raw).unwrap();

        assert_eq!(profile.id, "42");
        assert_eq!(profile.display_name, "Ada Lovelace");
        assert!(profile.is_admin);
        assert_eq!(profile.role_title.as_deref(), Some("Editor"));
        assert!(profile.created_at.is_some());
        assert_eq!(
            profile.extra.get("avatarUrl"),
            Some(&Value::String("https://cdn.example.com/ada.png".into()))
        );
    }

    #[test]
    fn round_trip_keeps_unknown_fields() {
        let raw = r#"{ "id": "u1", "department": "ops" }"#;
        let profile: UserProfile = serde_json::from_str(raw).unwrap();
        let text = serde_json::to_string(&profile).unwrap();
        let back: UserProfile = serde_json::from_str(&text).unwrap();

        assert_eq!(back, profile);
        assert_eq!(back.extra.get("department"), Some(&Value::String("ops".into())));
    }

    #[test]
    fn missing_id_reads_as_empty() {
        let profile: UserProfile = serde_json::from_str(r#"{ "username": "ghost" }"#).unwrap();
        assert_eq!(profile.id, "");
        assert_eq!(profile.username, "ghost");
    }

    #[test]
    fn null_fields_take_their_defaults() {
        let raw = r#"{
            "id": "u1",
            "displayName": null,
            "username": null,
            "email": null,
            "phone": null,
            "roleTitle": null,
            "isAdmin": null,
            "createdAt": null
        }"#;
        let profile: UserProfile = serde_json::from_str(raw).unwrap();

        assert_eq!(profile, UserProfile::new("u1"));
    }

    #[test]
    fn zone_less_timestamps_are_read_as_utc() {
        let raw = r#"{ "id": "u1", "createdAt": "2024-05-01T10:00:00", "updatedAt": "2024-05-02" }"#;
        let profile: UserProfile = serde_json::from_str(raw).unwrap();

        let created = profile.created_at.unwrap();
        assert_eq!(created.to_rfc3339(), "2024-05-01T10:00:00+00:00");
        assert_eq!(profile.updated_at.unwrap().to_rfc3339(), "2024-05-02T00:00:00+00:00");
        assert!(profile.extra.is_empty());
    }

    #[test]
    fn unusable_values_are_kept_verbatim() {
        let raw = r#"{
            "id": "u1",
            "createdAt": "last tuesday",
            "email": { "primary": "ada@example.com" },
            "isAdmin": "yes"
        }"#;
        let profile: UserProfile = serde_json::from_str(raw).unwrap();

        assert_eq!(profile.created_at, None);
        assert_eq!(profile.email, "");
        assert!(!profile.is_admin);
        assert_eq!(profile.extra.get("createdAt"), Some(&Value::String("last tuesday".into())));
        assert_eq!(profile.extra.get("isAdmin"), Some(&Value::String("yes".into())));
        assert!(profile.extra.contains_key("email"));

        let back: UserProfile =
            serde_json::from_str(&serde_json::to_string(&profile).unwrap()).unwrap();
        assert_eq!(back, profile);
    }
}
