// render-cfg: Configuration Template Renderer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management for render-cfg.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. render-cfg.toml (cwd, optional)
//! 3. --config FILE (required, repeatable)
//! 4. RENDER_CFG_* env vars
//! 5. CLI flags
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! RENDER_CFG_RENDER__STRICT=true        → render.strict = true
//! RENDER_CFG_RENDER__ENV_FILES=.env,.e2 → render.env_files = [".env", ".e2"]
//! RENDER_CFG_CRYPTO__KEY_FILE=k.b64     → crypto.key_file = "k.b64"
//! ```

pub mod loader;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::crypto::key::{DEFAULT_KEY_ENV, EnvKeySource, FileKeySource};
use crate::error::{ConfigError, Result};
use crate::template::discovery::DEFAULT_EXTENSIONS;
use crate::template::engine::DEFAULT_ENCRYPT_SUFFIXES;
use crate::template::{RenderConfig, TemplateSyntax, WalkOptions};

pub use loader::ConfigLoader;

/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "render-cfg.toml";

/// Prefix for configuration environment variables.
pub const ENV_PREFIX: &str = "RENDER_CFG";

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Rendering options.
    pub render: RenderSettings,
    /// Encryption key options.
    pub crypto: CryptoSettings,
}

/// `[render]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderSettings {
    /// Template root directory.
    pub templates: PathBuf,
    /// Output root directory.
    pub output: PathBuf,
    /// Env files, later files override earlier ones.
    pub env_files: Vec<PathBuf>,
    /// Undefined variables fail the render.
    pub strict: bool,
    /// Template language, `go` or `jinja`.
    pub syntax: TemplateSyntax,
    /// Key-name suffixes that trigger encryption.
    pub encrypt_suffixes: Vec<String>,
    /// Template file extensions, without the dot.
    pub extensions: Vec<String>,
    /// Glob patterns of templates to skip.
    pub exclude: Vec<String>,
    pub include_hidden: bool,
    pub respect_gitignore: bool,
    pub follow_links: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
    /// Seed the mapping with the process environment before env files.
    pub process_env: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            templates: PathBuf::from("./templates"),
            output: PathBuf::from("./output"),
            env_files: vec![PathBuf::from(".env")],
            strict: false,
            syntax: TemplateSyntax::Go,
            encrypt_suffixes: DEFAULT_ENCRYPT_SUFFIXES.map(String::from).to_vec(),
            extensions: DEFAULT_EXTENSIONS.map(String::from).to_vec(),
            exclude: Vec::new(),
            include_hidden: true,
            respect_gitignore: false,
            follow_links: false,
            max_depth: None,
            process_env: false,
        }
    }
}

/// `[crypto]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CryptoSettings {
    /// Environment variable holding the base64 key.
    pub key_env: String,
    /// File holding the base64 key, preferred over `key_env` when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_file: Option<PathBuf>,
}

impl Default for CryptoSettings {
    fn default() -> Self {
        Self {
            key_env: DEFAULT_KEY_ENV.to_string(),
            key_file: None,
        }
    }
}

impl CryptoSettings {
    /// Configured key file, if any.
    #[must_use]
    pub fn file_source(&self) -> Option<FileKeySource> {
        self.key_file.as_deref().map(FileKeySource::new)
    }

    #[must_use]
    pub fn env_source(&self) -> EnvKeySource {
        EnvKeySource::new(&self.key_env)
    }
}

impl Config {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use render_cfg::config::Config;
    ///
    /// let config = Config::builder()
    ///     .add_toml_file_optional("render-cfg.toml")
    ///     .with_env_prefix("RENDER_CFG")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a single TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// does not match the `Config` structure.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder().add_toml_file(path).build()
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match the
    /// `Config` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Check values the type system cannot.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an empty extension list, an
    /// empty or blank encrypt suffix list, or an empty key variable name.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let invalid = |section: &str, key: &str, message: &str| ConfigError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            message: message.to_string(),
        };

        if self.render.extensions.iter().all(|e| e.trim().is_empty()) {
            return Err(invalid(
                "render",
                "extensions",
                "at least one template extension is required",
            ));
        }
        if self.render.encrypt_suffixes.iter().all(String::is_empty) {
            return Err(invalid(
                "render",
                "encrypt_suffixes",
                "at least one non-empty suffix is required",
            ));
        }
        if self.crypto.key_env.trim().is_empty() {
            return Err(invalid("crypto", "key_env", "variable name must not be empty"));
        }
        Ok(())
    }

    /// Discovery options from `[render]`.
    #[must_use]
    pub fn walk_options(&self) -> WalkOptions {
        let render = &self.render;
        WalkOptions::builder()
            .with_extensions(
                render
                    .extensions
                    .iter()
                    .map(|e| e.trim_start_matches('.').to_string())
                    .collect(),
            )
            .maybe_with_max_depth(render.max_depth)
            .with_follow_links(render.follow_links)
            .with_include_hidden(render.include_hidden)
            .with_respect_gitignore(render.respect_gitignore)
            .with_exclude(render.exclude.clone())
            .build()
    }

    /// Engine settings from `[render]`.
    #[must_use]
    pub fn to_render_config(&self, dry_run: bool) -> RenderConfig {
        RenderConfig::builder()
            .template_dir(self.render.templates.clone())
            .output_dir(self.render.output.clone())
            .with_strict(self.render.strict)
            .with_syntax(self.render.syntax)
            .with_encrypt_suffixes(self.render.encrypt_suffixes.clone())
            .with_walk(self.walk_options())
            .with_dry_run(dry_run)
            .build()
    }

    /// Format configuration options for display.
    ///
    /// Output is deterministically ordered and column aligned.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let mut options = BTreeMap::new();
        self.format_render_options(&mut options);
        self.format_crypto_options(&mut options);

        let max_key_len = options.keys().map(String::len).max().unwrap_or(0);

        options
            .into_iter()
            .map(|(key, value)| format!("{key:<max_key_len$} = {value}"))
            .collect()
    }

    fn format_render_options(&self, options: &mut BTreeMap<String, String>) {
        let list = |items: &[String]| format!("[{}]", items.join(", "));
        let render = &self.render;

        options.insert("render.templates".into(), render.templates.display().to_string());
        options.insert("render.output".into(), render.output.display().to_string());
        options.insert(
            "render.env_files".into(),
            list(
                &render
                    .env_files
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>(),
            ),
        );
        options.insert("render.strict".into(), render.strict.to_string());
        options.insert("render.syntax".into(), render.syntax.to_string());
        options.insert(
            "render.encrypt_suffixes".into(),
            list(&render.encrypt_suffixes),
        );
        options.insert("render.extensions".into(), list(&render.extensions));
        options.insert("render.exclude".into(), list(&render.exclude));
        options.insert(
            "render.include_hidden".into(),
            render.include_hidden.to_string(),
        );
        options.insert(
            "render.respect_gitignore".into(),
            render.respect_gitignore.to_string(),
        );
        options.insert("render.follow_links".into(), render.follow_links.to_string());
        if let Some(depth) = render.max_depth {
            options.insert("render.max_depth".into(), depth.to_string());
        }
        options.insert("render.process_env".into(), render.process_env.to_string());
    }

    fn format_crypto_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert("crypto.key_env".into(), self.crypto.key_env.clone());
        if let Some(path) = &self.crypto.key_file {
            options.insert("crypto.key_file".into(), path.display().to_string());
        }
    }
}
