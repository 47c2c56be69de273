//! Credential hashing.
//!
//! Passwords are stored as the lowercase hex SHA-256 digest of the secret.
//! The digest is unsalted and fast, so identical passwords share a digest.
//! Swapping in a salted KDF only needs a new `PasswordDigest` encoding; callers
//! go through `hash_password` / `PasswordDigest::matches` and never compare
//! digests themselves.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Length of an encoded digest (32 bytes, two hex chars each).
pub const DIGEST_HEX_LEN: usize = 64;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("password is required")]
    InvalidInput,
}

/// Hex-encoded one-way digest of a password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Wrap a digest previously produced by [`hash_password`] and persisted.
    pub fn from_stored(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Recompute the digest of `secret` and compare it with this one.
    pub fn matches(&self, secret: &str) -> bool {
        match hash_password(secret) {
            Ok(candidate) => candidate.0.as_bytes() == self.0.as_bytes(),
            Err(_) => false,
        }
    }
}

impl core::fmt::Display for PasswordDigest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hash a plaintext secret into its stored form.
pub fn hash_password(secret: &str) -> Result<PasswordDigest, PasswordError> {
    if secret.is_empty() {
        return Err(PasswordError::InvalidInput);
    }

    let digest = Sha256::digest(secret.as_bytes());
    Ok(PasswordDigest(hex::encode(digest)))
}
