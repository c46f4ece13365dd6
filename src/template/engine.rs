// render-cfg: Configuration Template Renderer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Render engine.
//!
//! ```text
//! Engine::new(RenderConfig, cipher)
//!   discover(template_dir) --> [TemplateDescriptor] (sorted)
//!
//! Engine::run(&EnvMapping), per template:
//!   read --> [gotext::translate] --> parse --> render(ctx) --> output path
//!        --> mkdir -p --> write
//!   first failure aborts the run, earlier outputs stay on disk
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bon::Builder;
use clap::ValueEnum;
use minijinja::{AutoEscape, Environment, ErrorKind, UndefinedBehavior};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::discovery::{TemplateDescriptor, WalkOptions, discover};
use super::functions::{self, EncryptPolicy};
use super::gotext;
use crate::crypto::Cipher;
use crate::env::EnvMapping;
use crate::error::{FsError, FunctionError, RenderResult, TemplateError};

/// Default key-name suffixes that trigger encryption.
pub const DEFAULT_ENCRYPT_SUFFIXES: [&str; 3] = ["PASSWORD", "SECRET", "KEY"];

/// Template language accepted by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TemplateSyntax {
    /// Go text/template actions: `{{ .HOST }}`, `{{ encrypt "K" .V }}`
    #[default]
    Go,
    /// minijinja expressions: `{{ HOST }}`, `{{ encrypt("K", V) }}`
    Jinja,
}

impl std::fmt::Display for TemplateSyntax {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Go => "go",
            Self::Jinja => "jinja",
        })
    }
}

/// Settings for one render run.
#[derive(Debug, Clone, Builder)]
pub struct RenderConfig {
    /// Root directory scanned for templates
    #[builder(into)]
    template_dir: PathBuf,
    /// Root directory receiving rendered files
    #[builder(into)]
    output_dir: PathBuf,
    /// Undefined variables are errors instead of empty strings
    #[builder(setters(name = with_strict), default = false)]
    strict: bool,
    /// Template language
    #[builder(setters(name = with_syntax), default)]
    syntax: TemplateSyntax,
    /// Key-name suffixes that make `encrypt` actually encrypt
    #[builder(setters(name = with_encrypt_suffixes), default = DEFAULT_ENCRYPT_SUFFIXES.map(String::from).to_vec())]
    encrypt_suffixes: Vec<String>,
    /// Discovery options
    #[builder(setters(name = with_walk), default)]
    walk: WalkOptions,
    /// Render without writing anything
    #[builder(setters(name = with_dry_run), default = false)]
    dry_run: bool,
}

impl RenderConfig {
    #[must_use]
    pub fn template_dir(&self) -> &Path {
        &self.template_dir
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    #[must_use]
    pub const fn strict(&self) -> bool {
        self.strict
    }

    #[must_use]
    pub const fn syntax(&self) -> TemplateSyntax {
        self.syntax
    }

    #[must_use]
    pub fn encrypt_suffixes(&self) -> &[String] {
        &self.encrypt_suffixes
    }

    #[must_use]
    pub const fn walk(&self) -> &WalkOptions {
        &self.walk
    }

    #[must_use]
    pub const fn dry_run(&self) -> bool {
        self.dry_run
    }
}

/// One rendered template and where it goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedOutput {
    pub template: PathBuf,
    pub output: PathBuf,
    pub content: String,
}

/// What a run produced.
#[derive(Debug, Default)]
pub struct RunSummary {
    written: Vec<PathBuf>,
    dry_run: bool,
}

impl RunSummary {
    /// Output files in render order (would-be files for dry runs).
    #[must_use]
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    #[must_use]
    pub const fn dry_run(&self) -> bool {
        self.dry_run
    }
}

/// Discovers and renders templates.
pub struct Engine {
    config: Arc<RenderConfig>,
    env: Environment<'static>,
    templates: Vec<TemplateDescriptor>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("templates", &self.templates)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Creates an engine and discovers templates under the template root.
    ///
    /// # Errors
    ///
    /// Returns an error if the template root is missing or an exclude
    /// pattern is invalid.
    pub fn new(config: RenderConfig, cipher: Option<Cipher>) -> RenderResult<Self> {
        let discovery = discover(config.template_dir(), config.walk())?;
        if discovery.error_count() > 0 {
            warn!(
                errors = discovery.error_count(),
                "Some entries under the template directory could not be read"
            );
        }

        let engine = Self::with_templates(config, cipher, discovery.into_templates());
        engine.report_collisions();
        Ok(engine)
    }

    /// Creates an engine over an explicit template list, skipping discovery.
    #[must_use]
    pub fn with_templates(
        config: RenderConfig,
        cipher: Option<Cipher>,
        templates: Vec<TemplateDescriptor>,
    ) -> Self {
        let policy = Arc::new(EncryptPolicy::new(config.encrypt_suffixes(), cipher));
        let env = build_environment(config.strict(), policy);
        info!(
            root = %config.template_dir().display(),
            count = templates.len(),
            strict = config.strict(),
            syntax = %config.syntax(),
            "Templates discovered"
        );

        Self {
            config: Arc::new(config),
            env,
            templates,
        }
    }

    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Templates in render order.
    #[must_use]
    pub fn templates(&self) -> &[TemplateDescriptor] {
        &self.templates
    }

    fn report_collisions(&self) {
        let mut seen: BTreeMap<PathBuf, &Path> = BTreeMap::new();
        for template in &self.templates {
            if let Some(previous) = seen.insert(template.relative_output(), template.relative()) {
                warn!(
                    output = %template.relative_output().display(),
                    overwritten = %previous.display(),
                    winner = %template.relative().display(),
                    "Two templates render to the same output, the later one wins"
                );
            }
        }
    }

    /// Parses and renders template source text against `mapping`.
    ///
    /// `name` identifies the template in error messages. Go syntax is
    /// compiled to minijinja first and sees the whole mapping as `.`.
    ///
    /// # Errors
    ///
    /// Returns a [`TemplateError`] describing a syntax or execution failure.
    pub fn render_str(
        &self,
        name: &str,
        source: &str,
        mapping: &EnvMapping,
    ) -> Result<String, TemplateError> {
        let rendered = match self.config.syntax() {
            TemplateSyntax::Go => gotext::translate(source).and_then(|compiled| {
                self.env.render_named_str(
                    name,
                    &compiled,
                    mapping.to_context_with_root(gotext::ROOT),
                )
            }),
            TemplateSyntax::Jinja => {
                self.env
                    .render_named_str(name, source, mapping.to_context())
            }
        };
        rendered.map_err(|e| classify_render_error(name, e))
    }

    /// Reads and renders one template without writing it.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Read`] if the file cannot be read, or the
    /// render failure.
    pub fn render_template(
        &self,
        template: &TemplateDescriptor,
        mapping: &EnvMapping,
    ) -> Result<RenderedOutput, TemplateError> {
        let path = template.path();
        let source = std::fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let content = self.render_str(&path.display().to_string(), &source, mapping)?;
        Ok(RenderedOutput {
            template: path.to_path_buf(),
            output: template.output_path(self.config.output_dir()),
            content,
        })
    }

    /// Renders every template in order and writes the results.
    ///
    /// # Errors
    ///
    /// Stops at the first template that fails to read, parse, render or
    /// write. Outputs written before the failure are left in place.
    pub fn run(&self, mapping: &EnvMapping) -> RenderResult<RunSummary> {
        let mut summary = RunSummary {
            written: Vec::with_capacity(self.templates.len()),
            dry_run: self.config.dry_run(),
        };

        for template in &self.templates {
            let rendered = self.render_template(template, mapping)?;

            if self.config.dry_run() {
                info!(
                    template = %template.relative().display(),
                    output = %rendered.output.display(),
                    bytes = rendered.content.len(),
                    "Rendered template (dry run, not written)"
                );
            } else {
                write_output(&rendered.output, rendered.content.as_bytes())?;
                info!(
                    template = %template.relative().display(),
                    output = %rendered.output.display(),
                    "Rendered template"
                );
            }
            summary.written.push(rendered.output);
        }

        Ok(summary)
    }
}

fn build_environment(strict: bool, policy: Arc<EncryptPolicy>) -> Environment<'static> {
    let mut env = Environment::new();
    env.set_undefined_behavior(if strict {
        UndefinedBehavior::Strict
    } else {
        UndefinedBehavior::Lenient
    });
    env.set_keep_trailing_newline(true);
    env.set_auto_escape_callback(|_| AutoEscape::None);
    functions::register(&mut env, policy);
    env
}

/// Maps a minijinja error onto the matching [`TemplateError`].
fn classify_render_error(name: &str, err: minijinja::Error) -> TemplateError {
    let path = name.to_string();
    let function_error =
        std::error::Error::source(&err).and_then(|source| source.downcast_ref::<FunctionError>());
    let missing_value = matches!(function_error, Some(FunctionError::MissingValue { .. }));
    let type_error = matches!(function_error, Some(FunctionError::Type { .. }));

    if missing_value {
        TemplateError::MissingValue { path, source: err }
    } else if type_error {
        TemplateError::Type { path, source: err }
    } else {
        match err.kind() {
            ErrorKind::SyntaxError => TemplateError::Syntax { path, source: err },
            ErrorKind::UndefinedError => TemplateError::Undefined { path, source: err },
            _ => TemplateError::Execute { path, source: err },
        }
    }
}

/// Writes `bytes` to `path`, creating missing parent directories.
fn write_output(path: &Path, bytes: &[u8]) -> Result<(), FsError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|source| FsError::CreateDir {
            path: parent.display().to_string(),
            source,
        })?;
    }

    std::fs::write(path, bytes).map_err(|source| FsError::Write {
        path: path.display().to_string(),
        source,
    })?;
    debug!(path = %path.display(), bytes = bytes.len(), "Wrote output file");
    Ok(())
}
