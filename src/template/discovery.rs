// render-cfg: Configuration Template Renderer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::TemplateError;
use bon::Builder;
use ignore::WalkBuilder;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use wax::{Glob, Program};

/// Default recognized template extensions.
pub const DEFAULT_EXTENSIONS: [&str; 2] = ["tmpl", "tpl"];

/// Options for template discovery.
#[derive(Debug, Clone, Builder)]
pub struct WalkOptions {
    /// File extensions (without the dot) that mark a template
    #[builder(setters(name = with_extensions), default = DEFAULT_EXTENSIONS.map(String::from).to_vec())]
    extensions: Vec<String>,
    /// Maximum depth to traverse (None = unlimited)
    #[builder(setters(name = with_max_depth))]
    max_depth: Option<usize>,
    /// Follow symbolic links
    #[builder(setters(name = with_follow_links), default = false)]
    follow_links: bool,
    /// Include hidden files/directories
    #[builder(setters(name = with_include_hidden), default = true)]
    include_hidden: bool,
    /// Respect .gitignore files
    #[builder(setters(name = with_respect_gitignore), default = false)]
    respect_gitignore: bool,
    /// Glob patterns, relative to the root, of templates to leave out
    #[builder(setters(name = with_exclude), default)]
    exclude: Vec<String>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl WalkOptions {
    /// Returns the recognized extensions.
    #[must_use]
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Returns the maximum depth to traverse.
    #[must_use]
    pub const fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Returns whether to follow symbolic links.
    #[must_use]
    pub const fn follow_links(&self) -> bool {
        self.follow_links
    }

    /// Returns whether to include hidden files/directories.
    #[must_use]
    pub const fn include_hidden(&self) -> bool {
        self.include_hidden
    }

    /// Returns whether to respect .gitignore files.
    #[must_use]
    pub const fn respect_gitignore(&self) -> bool {
        self.respect_gitignore
    }

    /// Returns the exclude patterns.
    #[must_use]
    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    /// Whether `path` carries one of the recognized extensions.
    #[must_use]
    pub fn is_template(&self, path: &Path) -> bool {
        path.extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }
}

/// A template file found under the template root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TemplateDescriptor {
    relative: PathBuf,
    path: PathBuf,
}

impl TemplateDescriptor {
    /// Creates a descriptor from the template root and a path inside it.
    #[must_use]
    pub fn new(root: &Path, path: &Path) -> Self {
        let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();
        Self {
            relative,
            path: path.to_path_buf(),
        }
    }

    /// Full path of the template file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path relative to the template root.
    #[must_use]
    pub fn relative(&self) -> &Path {
        &self.relative
    }

    /// Output path relative to the output root: same directories, last
    /// extension removed (`a/app.conf.tmpl` -> `a/app.conf`).
    #[must_use]
    pub fn relative_output(&self) -> PathBuf {
        self.relative.with_extension("")
    }

    /// Output path under `output_root`.
    #[must_use]
    pub fn output_path(&self, output_root: &Path) -> PathBuf {
        output_root.join(self.relative_output())
    }
}

/// Result of a discovery walk.
#[derive(Debug, Default)]
pub struct Discovery {
    templates: Vec<TemplateDescriptor>,
    error_count: usize,
}

impl Discovery {
    /// Templates sorted by relative path.
    #[must_use]
    pub fn templates(&self) -> &[TemplateDescriptor] {
        &self.templates
    }

    #[must_use]
    pub fn into_templates(self) -> Vec<TemplateDescriptor> {
        self.templates
    }

    /// Number of entries that could not be visited.
    #[must_use]
    pub const fn error_count(&self) -> usize {
        self.error_count
    }
}

/// Builds a `WalkBuilder` with the given options.
fn build_walker(root: &Path, options: &WalkOptions) -> WalkBuilder {
    let mut builder = WalkBuilder::new(root);

    if let Some(depth) = options.max_depth() {
        builder.max_depth(Some(depth));
    }

    builder.follow_links(options.follow_links());
    builder.hidden(!options.include_hidden());

    // Plain walk unless asked otherwise: no ignore files of any kind
    builder.ignore(options.respect_gitignore());
    builder.parents(options.respect_gitignore());
    builder.git_ignore(options.respect_gitignore());
    builder.git_global(options.respect_gitignore());
    builder.git_exclude(options.respect_gitignore());
    builder.require_git(false);

    builder
}

fn compile_excludes(patterns: &[String]) -> Result<Vec<Glob<'_>>, TemplateError> {
    patterns
        .iter()
        .map(|pattern| {
            Glob::new(pattern).map_err(|e| TemplateError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })
        })
        .collect()
}

/// Walks `root` and collects template files.
///
/// Unreadable entries are logged and counted, then skipped; traversal
/// continues into every directory. The result is sorted by relative path so
/// rendering order does not depend on the filesystem.
///
/// # Errors
///
/// Returns [`TemplateError::RootNotFound`] if `root` does not exist,
/// [`TemplateError::RootNotDirectory`] if it is a file, and
/// [`TemplateError::InvalidPattern`] if an exclude glob is malformed.
pub fn discover(root: &Path, options: &WalkOptions) -> Result<Discovery, TemplateError> {
    if !root.exists() {
        return Err(TemplateError::RootNotFound(root.display().to_string()));
    }
    if !root.is_dir() {
        return Err(TemplateError::RootNotDirectory(root.display().to_string()));
    }

    let excludes = compile_excludes(options.exclude())?;
    let mut templates = Vec::new();
    let mut error_count = 0;

    for entry in build_walker(root, options).build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "walk error");
                error_count += 1;
                continue;
            }
        };

        let path = entry.path();
        if entry.file_type().is_none_or(|ft| ft.is_dir()) || !options.is_template(path) {
            continue;
        }

        let descriptor = TemplateDescriptor::new(root, path);
        if excludes.iter().any(|glob| glob.is_match(descriptor.relative())) {
            debug!(path = %path.display(), "Template excluded");
            continue;
        }
        templates.push(descriptor);
    }

    templates.sort();
    debug!(
        root = %root.display(),
        count = templates.len(),
        errors = error_count,
        "Template discovery finished"
    );

    Ok(Discovery {
        templates,
        error_count,
    })
}
