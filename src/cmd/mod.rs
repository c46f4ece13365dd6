// render-cfg: Configuration Template Renderer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command implementations.
//!
//! ```text
//! CLI args --> Config --> cmd::run_* handlers
//!   render, list, crypto (decrypt, keygen), config (options, config-files)
//! ```

pub mod config;
pub mod crypto;
pub mod list;
pub mod render;

#[cfg(test)]
mod tests;
