// render-cfg: Configuration Template Renderer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Encryption key material and where it comes from.
//!
//! ```text
//! KeySource
//!   EnvKeySource     base64 key in an environment variable (RENDER_KEY)
//!   FileKeySource    base64 key in a file
//!   StaticKeySource  key handed over by the caller
//!
//! resolve_key(&[sources]) --> first Some(EncryptionKey)
//! ```

use std::path::{Path, PathBuf};

use aes_gcm::Aes256Gcm;
use aes_gcm::aead::{KeyInit, OsRng};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// Key length for AES-256.
pub const KEY_LEN: usize = 32;

/// Default environment variable holding the base64 key.
pub const DEFAULT_KEY_ENV: &str = "RENDER_KEY";

/// A 256-bit key, wiped from memory on drop.
#[derive(Clone)]
pub struct EncryptionKey {
    bytes: Zeroizing<[u8; KEY_LEN]>,
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EncryptionKey([redacted])")
    }
}

impl EncryptionKey {
    /// Creates a key from raw bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self {
            bytes: Zeroizing::new(bytes),
        }
    }

    /// Generates a random key from the OS RNG.
    #[must_use]
    pub fn generate() -> Self {
        let generated = Aes256Gcm::generate_key(&mut OsRng);
        let mut bytes = [0u8; KEY_LEN];
        bytes.copy_from_slice(&generated);
        Self::from_bytes(bytes)
    }

    /// Parses a base64 encoded key.
    ///
    /// `source_name` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKey`] if the text is not base64 or does not
    /// decode to exactly 32 bytes.
    pub fn from_base64(text: &str, source_name: &str) -> Result<Self, CryptoError> {
        let decoded = Zeroizing::new(STANDARD.decode(text.trim()).map_err(|e| {
            CryptoError::InvalidKey {
                source_name: source_name.to_string(),
                message: e.to_string(),
            }
        })?);

        let bytes: [u8; KEY_LEN] =
            decoded
                .as_slice()
                .try_into()
                .map_err(|_| CryptoError::InvalidKey {
                    source_name: source_name.to_string(),
                    message: format!("expected {KEY_LEN} bytes, got {}", decoded.len()),
                })?;
        Ok(Self::from_bytes(bytes))
    }

    /// Encodes the key as base64.
    #[must_use]
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.bytes.as_slice())
    }

    pub(crate) fn as_key(&self) -> &aes_gcm::Key<Aes256Gcm> {
        aes_gcm::Key::<Aes256Gcm>::from_slice(self.bytes.as_slice())
    }
}

/// A place an encryption key can be loaded from.
pub trait KeySource {
    /// Human readable description for logs and errors.
    fn describe(&self) -> String;

    /// Loads the key.
    ///
    /// Returns `Ok(None)` when the source is simply not configured.
    ///
    /// # Errors
    ///
    /// Returns an error when the source is present but unreadable or malformed.
    fn load(&self) -> Result<Option<EncryptionKey>, CryptoError>;
}

/// Reads a base64 key from an environment variable.
#[derive(Debug, Clone)]
pub struct EnvKeySource {
    var: String,
}

impl EnvKeySource {
    #[must_use]
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvKeySource {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_ENV)
    }
}

impl KeySource for EnvKeySource {
    fn describe(&self) -> String {
        format!("environment variable {}", self.var)
    }

    fn load(&self) -> Result<Option<EncryptionKey>, CryptoError> {
        match std::env::var(&self.var) {
            Ok(value) if !value.trim().is_empty() => {
                EncryptionKey::from_base64(&value, &self.describe()).map(Some)
            }
            _ => Ok(None),
        }
    }
}

/// Reads a base64 key from a file.
///
/// Unlike [`EnvKeySource`], a configured file that is missing is an error.
#[derive(Debug, Clone)]
pub struct FileKeySource {
    path: PathBuf,
}

impl FileKeySource {
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl KeySource for FileKeySource {
    fn describe(&self) -> String {
        format!("key file {}", self.path.display())
    }

    fn load(&self) -> Result<Option<EncryptionKey>, CryptoError> {
        let text = Zeroizing::new(std::fs::read_to_string(&self.path).map_err(|source| {
            CryptoError::KeyUnavailable {
                source_name: self.describe(),
                source,
            }
        })?);
        EncryptionKey::from_base64(&text, &self.describe()).map(Some)
    }
}

/// A key supplied directly by the caller.
#[derive(Debug, Clone)]
pub struct StaticKeySource(EncryptionKey);

impl StaticKeySource {
    #[must_use]
    pub const fn new(key: EncryptionKey) -> Self {
        Self(key)
    }
}

impl KeySource for StaticKeySource {
    fn describe(&self) -> String {
        "static key".to_string()
    }

    fn load(&self) -> Result<Option<EncryptionKey>, CryptoError> {
        Ok(Some(self.0.clone()))
    }
}

/// Returns the key from the first source that yields one.
///
/// # Errors
///
/// Propagates the first source error; later sources are not consulted.
pub fn resolve_key(sources: &[&dyn KeySource]) -> Result<Option<EncryptionKey>, CryptoError> {
    for source in sources {
        if let Some(key) = source.load()? {
            debug!(source = %source.describe(), "Loaded encryption key");
            return Ok(Some(key));
        }
        debug!(source = %source.describe(), "No encryption key in source");
    }
    Ok(None)
}
