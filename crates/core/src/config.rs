//! Gate configuration.
//!
//! The credential secret and storage prefix are fixed when the client bundle
//! is built. Everything else has defaults the whole application agrees on;
//! changing slot names or the prefix orphans existing ciphertext, which only
//! forces a re-login.

use serde::Deserialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::ConfigError;

const DEV_SECRET: &str = "gatehouse-insecure-dev-secret";
const DEFAULT_PREFIX: &str = "gatehouse.";

/// Symmetric key material for session encryption at rest.
///
/// Never logged; `Debug` is redacted.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop, Deserialize)]
#[serde(transparent)]
pub struct CredentialSecret(String);

impl CredentialSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl core::fmt::Debug for CredentialSecret {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("CredentialSecret(<redacted>)")
    }
}

/// Storage slot names for the three session fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SlotNames {
    pub token: String,
    pub user: String,
    pub permissions: String,
}

impl SlotNames {
    pub fn all(&self) -> [&str; 3] {
        [&self.token, &self.user, &self.permissions]
    }
}

impl Default for SlotNames {
    fn default() -> Self {
        Self {
            token: "token".to_string(),
            user: "user".to_string(),
            permissions: "permissions".to_string(),
        }
    }
}

/// Where the route guard sends unauthenticated visitors.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoginPaths {
    pub standard: String,
    pub privileged: String,
}

impl LoginPaths {
    pub fn for_requirement(&self, require_admin: bool) -> &str {
        if require_admin {
            &self.privileged
        } else {
            &self.standard
        }
    }
}

impl Default for LoginPaths {
    fn default() -> Self {
        Self {
            standard: "/login".to_string(),
            privileged: "/admin/login".to_string(),
        }
    }
}

/// Full configuration for the session gate.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub secret: CredentialSecret,
    /// Namespace for every key the ephemeral store writes.
    pub storage_prefix: String,
    pub slots: SlotNames,
    pub login_paths: LoginPaths,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            secret: CredentialSecret::new(DEV_SECRET),
            storage_prefix: DEFAULT_PREFIX.to_string(),
            slots: SlotNames::default(),
            login_paths: LoginPaths::default(),
        }
    }
}

impl GateConfig {
    /// Configuration baked in at build time.
    ///
    /// Reads `GATEHOUSE_CREDENTIAL_SECRET` and `GATEHOUSE_STORAGE_PREFIX`
    /// from the compile-time environment.
    pub fn from_build_env() -> Self {
        let secret = match option_env!("GATEHOUSE_CREDENTIAL_SECRET") {
            Some(secret) if !secret.is_empty() => CredentialSecret::new(secret),
            _ => CredentialSecret::new(DEV_SECRET),
        };

        let storage_prefix = option_env!("GATEHOUSE_STORAGE_PREFIX")
            .filter(|prefix| !prefix.is_empty())
            .unwrap_or(DEFAULT_PREFIX)
            .to_string();

        let config = Self {
            secret,
            storage_prefix,
            ..Default::default()
        };

        // Development builds run on the defaults; the warning marks them.
        if let Err(err) = config.validate() {
            tracing::warn!(%err, "build-time gate configuration is not production-safe");
        }
        config
    }

    /// Parse and validate a runtime-injected JSON configuration.
    ///
    /// Missing fields take their defaults, except `secret`: without one the
    /// development default applies and validation rejects it.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: GateConfig =
            serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        if self.secret.expose() == DEV_SECRET.as_bytes() {
            return Err(ConfigError::InsecureSecret);
        }
        if self.storage_prefix.is_empty() {
            return Err(ConfigError::EmptyPrefix);
        }

        let [token, user, permissions] = self.slots.all();
        if token.is_empty()
            || user.is_empty()
            || permissions.is_empty()
            || token == user
            || token == permissions
            || user == permissions
        {
            return Err(ConfigError::InvalidSlotNames);
        }

        for path in [&self.login_paths.standard, &self.login_paths.privileged] {
            if !path.starts_with('/') || path.starts_with("//") {
                return Err(ConfigError::InvalidLoginPath(path.clone()));
            }
        }

        Ok(())
    }
}
