//! Symmetric encryption of UTF-8 strings under the credential secret.
//!
//! AES-256-GCM with a random 96-bit nonce per call. The key is derived from
//! the secret with HKDF-SHA256. Output is base64 (standard alphabet) of:
//!
//! ```text
//! [VERSION(1)][NONCE(12)][CIPHERTEXT(N)][TAG(16)]
//! ```

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hkdf::Hkdf;
use sha2::Sha256;
use thiserror::Error;
use zeroize::Zeroizing;

use gatehouse_core::{CredentialSecret, SessionFault};

pub const FORMAT_VERSION: u8 = 1;
pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;
/// Smallest valid blob: header plus the tag of an empty plaintext.
pub const MIN_BLOB_LEN: usize = 1 + NONCE_LEN + TAG_LEN;

const HKDF_SALT: &[u8] = b"gatehouse";
const HKDF_INFO: &[u8] = b"gatehouse/session-at-rest/v1";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CipherError {
    #[error("no ciphertext")]
    Empty,

    #[error("ciphertext is not valid base64: {0}")]
    Encoding(String),

    #[error("ciphertext too short ({actual} bytes, minimum {minimum})")]
    Truncated { actual: usize, minimum: usize },

    #[error("unsupported ciphertext version {0}")]
    UnsupportedVersion(u8),

    #[error("authentication failed: wrong secret or tampered data")]
    Mismatch,

    #[error("decrypted bytes are not UTF-8")]
    Utf8,

    #[error("random number generator unavailable: {0}")]
    Rng(String),

    #[error("encryption failed")]
    Seal,
}

impl CipherError {
    /// Session-level classification; `None` for "nothing was stored".
    pub fn fault(&self) -> Option<SessionFault> {
        match self {
            CipherError::Empty | CipherError::Rng(_) | CipherError::Seal => None,
            _ => Some(SessionFault::DecryptionMismatch),
        }
    }
}

/// Encrypts and decrypts session values with a key derived from the secret.
#[derive(Clone)]
pub struct Cipher {
    aead: Aes256Gcm,
}

impl Cipher {
    pub fn new(secret: &CredentialSecret) -> Self {
        let hkdf = Hkdf::<Sha256>::new(Some(HKDF_SALT), secret.expose());
        let mut key = Zeroizing::new([0u8; 32]);
        hkdf.expand(HKDF_INFO, &mut key[..])
            .expect("32 bytes is a valid HKDF-SHA256 output length");

        Self {
            aead: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key[..])),
        }
    }

    /// Encrypt `plaintext`. Returns an empty string if the platform RNG is
    /// unavailable, which the store treats as "nothing written".
    pub fn encrypt(&self, plaintext: &str) -> String {
        match self.try_encrypt(plaintext) {
            Ok(ciphertext) => ciphertext,
            Err(err) => {
                tracing::error!(%err, "failed to encrypt session value");
                String::new()
            }
        }
    }

    pub fn try_encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        let mut nonce = [0u8; NONCE_LEN];
        getrandom::getrandom(&mut nonce).map_err(|e| CipherError::Rng(e.to_string()))?;

        let sealed = self
            .aead
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|_| CipherError::Seal)?;

        let mut blob = Vec::with_capacity(1 + NONCE_LEN + sealed.len());
        blob.push(FORMAT_VERSION);
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&sealed);

        Ok(STANDARD.encode(blob))
    }

    /// Decrypt `ciphertext`; malformed, foreign or empty input yields `""`.
    pub fn decrypt(&self, ciphertext: &str) -> String {
        match self.try_decrypt(ciphertext) {
            Ok(plaintext) => plaintext,
            Err(CipherError::Empty) => String::new(),
            Err(err) => {
                tracing::debug!(%err, "treating undecodable value as absent");
                String::new()
            }
        }
    }

    pub fn try_decrypt(&self, ciphertext: &str) -> Result<String, CipherError> {
        let encoded = ciphertext.trim();
        if encoded.is_empty() {
            return Err(CipherError::Empty);
        }

        let blob = STANDARD
            .decode(encoded)
            .map_err(|e| CipherError::Encoding(e.to_string()))?;

        if blob.len() < MIN_BLOB_LEN {
            return Err(CipherError::Truncated {
                actual: blob.len(),
                minimum: MIN_BLOB_LEN,
            });
        }
        if blob[0] != FORMAT_VERSION {
            return Err(CipherError::UnsupportedVersion(blob[0]));
        }

        let (nonce, sealed) = blob[1..].split_at(NONCE_LEN);
        let plaintext = self
            .aead
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| CipherError::Mismatch)?;

        String::from_utf8(plaintext).map_err(|_| CipherError::Utf8)
    }
}

impl core::fmt::Debug for Cipher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Cipher").finish_non_exhaustive()
    }
}
