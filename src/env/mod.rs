// render-cfg: Configuration Template Renderer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Environment file loading.
//!
//! # Merge Order
//!
//! ```text
//! [process env]   (optional, lowest)
//! .env            \
//! .env.local       > later files override earlier ones
//! .env.prod       /
//!        |
//!        v
//!   EnvMapping (BTreeMap<String, String>)
//! ```
//!
//! - **Missing files are skipped**, unreadable or malformed files abort the load
//! - **Case-sensitive keys** on every platform
//! - **Last line wins** for keys repeated inside one file
//! - **`${VAR}` expansion** sees the file's earlier keys, then earlier files;
//!   the process env is visible only when it seeded the base mapping

pub mod mapping;
pub mod parse;

#[cfg(test)]
mod tests;

use std::path::Path;

use tracing::{debug, info};

use crate::error::EnvError;
pub use mapping::EnvMapping;

/// Loads and merges dotenv files in order.
///
/// # Errors
///
/// Returns [`EnvError::Read`] if a file exists but cannot be read, or
/// [`EnvError::Parse`] if any line is malformed. No partial mapping is
/// returned on error.
pub fn load_env_files<P: AsRef<Path>>(paths: &[P]) -> Result<EnvMapping, EnvError> {
    load_env_files_into(EnvMapping::new(), paths)
}

/// Like [`load_env_files`], layering the files on top of `base`.
///
/// # Errors
///
/// See [`load_env_files`].
pub fn load_env_files_into<P: AsRef<Path>>(
    mut base: EnvMapping,
    paths: &[P],
) -> Result<EnvMapping, EnvError> {
    for path in paths {
        let path = path.as_ref();
        match std::fs::metadata(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Env file not found, skipping");
                continue;
            }
            Err(source) => {
                return Err(EnvError::Read {
                    path: path.display().to_string(),
                    source,
                });
            }
            Ok(_) => {}
        }

        let vars = read_env_file(path, &base)?;
        debug!(path = %path.display(), count = vars.len(), "Loaded env file");
        base.merge_file(path, vars);
    }

    info!(
        files = base.sources().len(),
        variables = base.len(),
        "Environment loaded"
    );
    Ok(base)
}

/// Parses one dotenv file into key/value pairs in file order.
///
/// References expand against the file itself, then against `base`.
fn read_env_file(path: &Path, base: &EnvMapping) -> Result<Vec<(String, String)>, EnvError> {
    let content = std::fs::read_to_string(path).map_err(|source| EnvError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse::parse(&content, base).map_err(|e| EnvError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
