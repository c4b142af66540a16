//! Session error taxonomy.

use thiserror::Error;

/// Why a session value could not be used.
///
/// None of these are fatal. Every fault degrades to "no session", which the
/// UI handles by redirecting to a login page. The enum exists so that the
/// degradation is logged with a stable classification.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionFault {
    /// Ciphertext does not correspond to the configured secret (rotated
    /// secret or corrupted storage).
    #[error("stored value does not decrypt under the current secret")]
    DecryptionMismatch,

    /// Decrypted text is not a valid serialization of the slot's type.
    #[error("malformed structured text in slot '{slot}': {detail}")]
    MalformedStructuredText { slot: String, detail: String },

    /// The token is present but the remote service rejected it.
    #[error("credential was rejected by the remote service")]
    StaleOrRevokedCredential,

    /// The durable store and the in-memory snapshot disagree.
    #[error("durable session and in-memory snapshot disagree")]
    InconsistentDualWrite,
}

impl SessionFault {
    pub fn malformed(slot: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::MalformedStructuredText {
            slot: slot.into(),
            detail: detail.into(),
        }
    }
}

/// Invalid gate configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("credential secret must not be empty")]
    EmptySecret,

    #[error("credential secret is missing or is the insecure development default")]
    InsecureSecret,

    #[error("storage prefix must not be empty")]
    EmptyPrefix,

    #[error("slot names must be non-empty and distinct")]
    InvalidSlotNames,

    #[error("login path '{0}' must be an absolute path starting with '/'")]
    InvalidLoginPath(String),

    #[error("configuration is not valid JSON: {0}")]
    Parse(String),
}
