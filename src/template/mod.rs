// render-cfg: Configuration Template Renderer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Template discovery, function library and rendering.
//!
//! ```text
//! discovery   discover(), WalkOptions, TemplateDescriptor
//!                 |
//!                 v
//! engine      Engine::new() --> Engine::run(&EnvMapping)
//!                 |
//!                 v
//! gotext      Go text/template actions --> minijinja source
//! functions   isset, regexMatch, default, required, encrypt, toBool, split, join
//! value       Scalar (typed view of template values)
//! ```
//!
//! Templates use Go syntax by default, `HOST={{ .HOST }}` and
//! `{{ encrypt "DB_PASSWORD" .DB_PASSWORD }}`, or minijinja syntax with
//! [`TemplateSyntax::Jinja`]: `{{ encrypt("DB_PASSWORD", DB_PASSWORD) }}`.

pub mod discovery;
pub mod engine;
pub mod functions;
pub mod gotext;
pub mod value;


pub use discovery::{Discovery, TemplateDescriptor, WalkOptions, discover};
pub use engine::{Engine, RenderConfig, RenderedOutput, RunSummary, TemplateSyntax};
