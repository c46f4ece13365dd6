// render-cfg: Configuration Template Renderer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Arguments for the `decrypt` command.

use clap::Args;

/// Arguments for the `decrypt` command.
#[derive(Debug, Clone, Default, Args)]
pub struct DecryptArgs {
    /// Base64 ciphertexts as written by `encrypt`; one plaintext per line is
    /// printed in the same order.
    #[arg(value_name = "CIPHERTEXT", required = true)]
    pub ciphertexts: Vec<String>,
}
