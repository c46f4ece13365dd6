// render-cfg: Configuration Template Renderer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Render command: env files + templates --> output tree.
//!
//! ```text
//! load_mapping(config)   process env? + env files (later wins)
//! load_cipher(config)    key file, then key env var
//! Engine::new            discover templates
//! Engine::run            render + write, stop at first failure
//! ```

use anyhow::Context;
use tracing::info;

use crate::config::Config;
use crate::crypto::Cipher;
use crate::crypto::key::{KeySource, resolve_key};
use crate::env::{EnvMapping, load_env_files_into};
use crate::error::Result;
use crate::template::{Engine, RunSummary};

/// Builds the variable mapping from the configured env files.
///
/// # Errors
///
/// Returns an error if an existing env file cannot be read or parsed.
pub fn load_mapping(config: &Config) -> Result<EnvMapping> {
    let base = if config.render.process_env {
        EnvMapping::with_process_env()
    } else {
        EnvMapping::new()
    };
    let mapping = load_env_files_into(base, &config.render.env_files)
        .context("failed to load env files")?;
    info!(
        variables = mapping.len(),
        files = mapping.sources().len(),
        "Environment loaded"
    );
    Ok(mapping)
}

/// Loads the encryption key, if one is configured.
///
/// A configured key file takes precedence over the key variable.
///
/// # Errors
///
/// Returns an error if a configured source exists but holds no valid key.
pub fn load_cipher(config: &Config) -> Result<Option<Cipher>> {
    let file = config.crypto.file_source();
    let env = config.crypto.env_source();

    let mut sources: Vec<&dyn KeySource> = Vec::with_capacity(2);
    if let Some(ref file) = file {
        sources.push(file);
    }
    sources.push(&env);

    let key = resolve_key(&sources).context("failed to load encryption key")?;
    Ok(key.map(|key| Cipher::new(&key)))
}

/// Renders every template and writes the output tree.
///
/// # Errors
///
/// Returns the first env, key, discovery, render or write failure.
pub fn render(config: &Config, dry_run: bool) -> Result<RunSummary> {
    let mapping = load_mapping(config)?;
    let cipher = load_cipher(config)?;
    let engine = Engine::new(config.to_render_config(dry_run), cipher)?;
    Ok(engine.run(&mapping)?)
}

/// Main handler for the default render command.
///
/// # Errors
///
/// See [`render`].
pub fn run_render_command(config: &Config, dry_run: bool) -> Result<()> {
    let summary = render(config, dry_run)?;
    let output = config.render.output.display();
    let count = summary.written().len();

    if summary.dry_run() {
        println!("Dry run: {count} file(s) would be written to {output}");
    } else {
        println!("Configuration rendered: {count} file(s) written to {output}");
    }
    Ok(())
}
