// render-cfg: Configuration Template Renderer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Typed view of template values at the function-library boundary.

use minijinja::value::{Value, ValueKind};

/// What a template value looks like to the domain functions.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Undefined or `none`.
    Absent,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Sequences, maps and anything else, by kind name.
    Other(String),
}

impl Scalar {
    /// Absent or the empty string.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Absent => true,
            Self::Str(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Short type name used in error messages.
    #[must_use]
    pub fn type_name(&self) -> String {
        match self {
            Self::Absent => "none".to_string(),
            Self::Bool(_) => "bool".to_string(),
            Self::Int(_) => "integer".to_string(),
            Self::Float(_) => "float".to_string(),
            Self::Str(_) => "string".to_string(),
            Self::Other(kind) => kind.clone(),
        }
    }

    /// Boolean coercion: strings `true` (any case) and `1` are true, numbers
    /// are true when nonzero, everything else is false.
    #[must_use]
    pub fn to_bool(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Str(s) => s.eq_ignore_ascii_case("true") || s == "1",
            Self::Int(n) => *n != 0,
            Self::Float(n) => *n != 0.0,
            Self::Absent | Self::Other(_) => false,
        }
    }
}

impl From<&Value> for Scalar {
    fn from(value: &Value) -> Self {
        match value.kind() {
            ValueKind::Undefined | ValueKind::None => Self::Absent,
            ValueKind::Bool => Self::Bool(value.is_true()),
            ValueKind::String => Self::Str(value.as_str().unwrap_or_default().to_string()),
            ValueKind::Number => value.as_i64().map_or_else(
                || f64::try_from(value.clone()).map_or(Self::Float(f64::NAN), Self::Float),
                Self::Int,
            ),
            kind => Self::Other(kind.to_string()),
        }
    }
}
