// render-cfg: Configuration Template Renderer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `decrypt` and `keygen` commands.

use anyhow::{Context, anyhow};

use crate::cli::crypto::DecryptArgs;
use crate::cmd::render::load_cipher;
use crate::config::Config;
use crate::crypto::Cipher;
use crate::crypto::key::EncryptionKey;
use crate::error::Result;

/// Decrypts each ciphertext in order.
///
/// # Errors
///
/// Fails on the first value that is not valid ciphertext for `cipher`.
pub fn decrypt_values(cipher: &Cipher, ciphertexts: &[String]) -> Result<Vec<String>> {
    ciphertexts
        .iter()
        .enumerate()
        .map(|(i, text)| {
            cipher
                .decrypt(text)
                .with_context(|| format!("failed to decrypt value #{}", i + 1))
        })
        .collect()
}

/// Main handler for the decrypt command.
///
/// # Errors
///
/// Returns an error if no key is configured or a value fails to decrypt.
pub fn run_decrypt_command(args: &DecryptArgs, config: &Config) -> Result<()> {
    let cipher = load_cipher(config)?.ok_or_else(|| {
        anyhow!(
            "no encryption key configured: set {} or pass --key-file",
            config.crypto.key_env
        )
    })?;

    for plaintext in decrypt_values(&cipher, &args.ciphertexts)? {
        println!("{plaintext}");
    }
    Ok(())
}

/// Prints a freshly generated base64 key.
pub fn run_keygen_command() {
    println!("{}", EncryptionKey::generate().to_base64());
}
