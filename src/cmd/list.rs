// render-cfg: Configuration Template Renderer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! List command implementation.

use serde::Serialize;

use crate::cli::render::ListArgs;
use crate::config::Config;
use crate::error::Result;
use crate::template::Engine;

/// A discovered template and the file it renders to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListEntry {
    pub template: String,
    pub output: String,
}

/// Discovers templates without rendering them.
///
/// # Errors
///
/// Returns an error if the template directory is missing or an exclude
/// pattern is invalid.
pub fn list_entries(config: &Config) -> Result<Vec<ListEntry>> {
    let render_config = config.to_render_config(true);
    let engine = Engine::new(render_config, None)?;
    let output_root = engine.config().output_dir();

    Ok(engine
        .templates()
        .iter()
        .map(|t| ListEntry {
            template: t.path().display().to_string(),
            output: t.output_path(output_root).display().to_string(),
        })
        .collect())
}

/// Main handler for list command.
///
/// # Errors
///
/// Returns an error if discovery fails.
pub fn run_list_command(args: &ListArgs, config: &Config) -> Result<()> {
    let entries = list_entries(config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No templates found");
        return Ok(());
    }

    let width = entries.iter().map(|e| e.template.len()).max().unwrap_or(0);
    for entry in &entries {
        println!("{:<width$} -> {}", entry.template, entry.output);
    }
    Ok(())
}
