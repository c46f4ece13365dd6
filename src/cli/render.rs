// render-cfg: Configuration Template Renderer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Render options and the `list` command arguments.
//!
//! ```text
//! -t DIR   → render.templates      --[no-]strict → render.strict
//! -o DIR   → render.output         --encrypt S,. → render.encrypt_suffixes
//! --syntax go|jinja → render.syntax
//! -e F,..  → render.env_files      --process-env → render.process_env
//! --key-file F → crypto.key_file   --key-env V   → crypto.key_env
//! ```
//!
//! Unset flags leave the configured value alone.

use clap::{ArgAction, Args};
use std::path::{Path, PathBuf};

use crate::template::TemplateSyntax;

/// Options that shape a render run.
#[derive(Debug, Clone, Default, Args)]
pub struct RenderArgs {
    /// Template directory [default: ./templates]
    #[arg(short = 't', long = "templates", value_name = "DIR", global = true)]
    pub templates: Option<PathBuf>,

    /// Output directory [default: ./output]
    #[arg(short = 'o', long = "output", value_name = "DIR", global = true)]
    pub output: Option<PathBuf>,

    /// Env files, comma separated or repeated; later files override earlier
    /// ones [default: .env]
    #[arg(
        short = 'e',
        long = "env",
        value_name = "FILE",
        value_delimiter = ',',
        action = ArgAction::Append,
        global = true
    )]
    pub env_files: Vec<PathBuf>,

    /// Fails on undefined variables instead of rendering them empty.
    #[arg(long, global = true, overrides_with = "no_strict")]
    pub strict: bool,

    /// Renders undefined variables empty, even if the configuration says strict.
    #[arg(long = "no-strict", global = true, overrides_with = "strict")]
    pub no_strict: bool,

    /// Template language [default: go]
    #[arg(long, value_enum, value_name = "SYNTAX", global = true)]
    pub syntax: Option<TemplateSyntax>,

    /// Key-name suffixes that `encrypt` encrypts [default: PASSWORD,SECRET,KEY]
    #[arg(
        long = "encrypt",
        value_name = "SUFFIX",
        value_delimiter = ',',
        action = ArgAction::Append,
        global = true
    )]
    pub encrypt_suffixes: Vec<String>,

    /// File holding the base64 encryption key.
    #[arg(long = "key-file", value_name = "FILE", global = true)]
    pub key_file: Option<PathBuf>,

    /// Environment variable holding the base64 encryption key [default: RENDER_KEY]
    #[arg(long = "key-env", value_name = "VAR", global = true)]
    pub key_env: Option<String>,

    /// Seeds variables from the process environment before reading env files.
    #[arg(long = "process-env", global = true)]
    pub process_env: bool,

    /// Renders everything but writes nothing.
    #[arg(long, global = true)]
    pub dry: bool,
}

fn path_value(path: &Path) -> config::Value {
    path.display().to_string().into()
}

impl RenderArgs {
    /// Converts the flags that were given into configuration overrides.
    #[must_use]
    pub fn to_config_overrides(&self) -> Vec<(&'static str, config::Value)> {
        let mut overrides = Vec::new();

        if let Some(ref path) = self.templates {
            overrides.push(("render.templates", path_value(path)));
        }
        if let Some(ref path) = self.output {
            overrides.push(("render.output", path_value(path)));
        }
        if !self.env_files.is_empty() {
            let files: Vec<config::Value> =
                self.env_files.iter().map(|p| path_value(p)).collect();
            overrides.push(("render.env_files", files.into()));
        }
        if self.strict {
            overrides.push(("render.strict", true.into()));
        } else if self.no_strict {
            overrides.push(("render.strict", false.into()));
        }
        if let Some(syntax) = self.syntax {
            overrides.push(("render.syntax", syntax.to_string().into()));
        }
        if !self.encrypt_suffixes.is_empty() {
            overrides.push(("render.encrypt_suffixes", self.encrypt_suffixes.clone().into()));
        }
        if self.process_env {
            overrides.push(("render.process_env", true.into()));
        }
        if let Some(ref path) = self.key_file {
            overrides.push(("crypto.key_file", path_value(path)));
        }
        if let Some(ref var) = self.key_env {
            overrides.push(("crypto.key_env", var.clone().into()));
        }

        overrides
    }
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, Args)]
pub struct ListArgs {
    /// Prints a JSON array instead of aligned text.
    #[arg(long)]
    pub json: bool,
}
