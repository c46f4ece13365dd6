// render-cfg: Configuration Template Renderer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Symmetric encryption of sensitive template values.
//!
//! ```text
//! encrypt:  plaintext --AES-256-GCM(key, random nonce)--> nonce || ct || tag --base64--> text
//! decrypt:  text --base64--> nonce || ct || tag --open--> plaintext
//! ```
//!
//! The key is injected through a [`key::KeySource`]; it is never compiled in.

pub mod key;


use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::CryptoError;
pub use key::EncryptionKey;

/// Nonce length for AES-GCM (96 bits).
pub const NONCE_LEN: usize = 12;

/// AES-256-GCM cipher bound to one key.
#[derive(Clone)]
pub struct Cipher {
    inner: Aes256Gcm,
}

impl std::fmt::Debug for Cipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cipher").finish_non_exhaustive()
    }
}

impl Cipher {
    /// Creates a cipher from an encryption key.
    #[must_use]
    pub fn new(key: &EncryptionKey) -> Self {
        Self {
            inner: Aes256Gcm::new(key.as_key()),
        }
    }

    /// Encrypts `plaintext` with a fresh random nonce.
    ///
    /// The nonce is prepended to the ciphertext and the result is base64 encoded.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Encrypt`] if the cipher rejects the input.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let sealed = self
            .inner
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| CryptoError::Encrypt)?;

        let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&sealed);
        Ok(STANDARD.encode(out))
    }

    /// Decrypts a value produced by [`Cipher::encrypt`].
    ///
    /// # Errors
    ///
    /// - [`CryptoError::Decode`] if the input is not base64.
    /// - [`CryptoError::TooShort`] if it cannot hold a nonce.
    /// - [`CryptoError::Decrypt`] if authentication fails.
    /// - [`CryptoError::Utf8`] if the plaintext is not UTF-8.
    pub fn decrypt(&self, ciphertext: &str) -> Result<String, CryptoError> {
        let data = STANDARD.decode(ciphertext.trim())?;
        if data.len() < NONCE_LEN {
            return Err(CryptoError::TooShort { len: data.len() });
        }

        let (nonce, sealed) = data.split_at(NONCE_LEN);
        let plaintext = self
            .inner
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| CryptoError::Decrypt)?;

        Ok(String::from_utf8(plaintext)?)
    }
}
