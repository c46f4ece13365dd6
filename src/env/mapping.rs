// render-cfg: Configuration Template Renderer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! The merged variable mapping handed to templates.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Merged environment variables, keyed case-sensitively.
///
/// Built once before rendering and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvMapping {
    vars: BTreeMap<String, String>,
    sources: Vec<PathBuf>,
}

impl EnvMapping {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vars: BTreeMap::new(),
            sources: Vec::new(),
        }
    }

    /// Seeds a mapping with the current process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are left out.
    #[must_use]
    pub fn with_process_env() -> Self {
        Self {
            vars: std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
            sources: Vec::new(),
        }
    }

    /// Inserts or replaces a single variable.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Layers the contents of one file on top of the mapping.
    pub(crate) fn merge_file(&mut self, path: &Path, vars: Vec<(String, String)>) {
        self.vars.extend(vars);
        self.sources.push(path.to_path_buf());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Files that were actually read, in load order.
    #[must_use]
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Builds the template context value.
    #[must_use]
    pub fn to_context(&self) -> minijinja::Value {
        minijinja::Value::from_serialize(&self.vars)
    }

    /// Like [`Self::to_context`], with the whole mapping also bound to `root`.
    #[must_use]
    pub fn to_context_with_root(&self, root: &str) -> minijinja::Value {
        let mut context: BTreeMap<&str, minijinja::Value> = self
            .vars
            .iter()
            .map(|(k, v)| (k.as_str(), minijinja::Value::from(v.as_str())))
            .collect();
        context.insert(root, self.to_context());
        minijinja::Value::from_serialize(&context)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvMapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            sources: Vec::new(),
        }
    }
}
