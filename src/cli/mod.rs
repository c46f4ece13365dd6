// render-cfg: Configuration Template Renderer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module for render-cfg using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! render-cfg [global options] [render options]          render templates
//! render-cfg [..] list [--json]                         show template → output
//! render-cfg [..] decrypt <CIPHERTEXT>...               decrypt values
//! render-cfg keygen                                     print a fresh key
//! render-cfg [..] options                               effective config
//! render-cfg [..] config-files                          loaded config files
//! render-cfg version
//! ```

pub mod crypto;
pub mod global;
pub mod render;


use crate::cli::crypto::DecryptArgs;
use crate::cli::global::GlobalOptions;
use crate::cli::render::{ListArgs, RenderArgs};
use clap::{Parser, Subcommand};

/// Configuration Template Renderer
///
/// Renders configuration files from templates and dotenv files.
#[derive(Debug, Parser)]
#[command(
    name = "render-cfg",
    author,
    version,
    about = "Render configuration files from templates and dotenv files",
    long_about = "render-cfg Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Renders every *.tmpl / *.tpl file under the template directory\n\
                  into the output directory, mirroring the directory layout and\n\
                  dropping the template extension. Variables come from the env\n\
                  files, later files overriding earlier ones.",
    after_help = "CONFIG FILES:\n\n\
                  render-cfg reads `render-cfg.toml` from the current directory\n\
                  when present, then every file given with --config, then\n\
                  RENDER_CFG_<SECTION>__<KEY> environment variables. Command line\n\
                  flags override all of them. Use --no-default-config to skip\n\
                  `render-cfg.toml`.\n\n\
                  ENCRYPTION:\n\n\
                  `encrypt(KEY, value)` encrypts with AES-256-GCM when KEY ends\n\
                  with one of the --encrypt suffixes. The key is a base64 string\n\
                  read from --key-file or the RENDER_KEY environment variable;\n\
                  `render-cfg keygen` prints a new one."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Render options, also read by `list`, `decrypt` and `options`
    #[command(flatten)]
    pub render: RenderArgs,

    /// Command to execute, renders when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    Version,

    /// Lists discovered templates and their output paths.
    List(ListArgs),

    /// Decrypts values produced by `encrypt`.
    Decrypt(DecryptArgs),

    /// Generates a new base64 encryption key.
    Keygen,

    /// Lists all options and their effective values.
    Options,

    /// Lists the configuration files that were loaded.
    #[command(name = "config-files")]
    ConfigFiles,
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Parses command-line arguments from an iterator.
pub fn parse_from<I, T>(iter: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::parse_from(iter)
}

/// Tries to parse command-line arguments, returning an error on failure.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if help/version information
/// was requested.
pub fn try_parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}
