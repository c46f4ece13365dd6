// render-cfg: Configuration Template Renderer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!              RenderError (~24 bytes)
//!                     |
//!   +------+------+---+---+------+-----+------+
//!   |      |      |       |      |     |      |
//!   v      v      v       v      v     v      v
//! Bail   Env  Template  Crypto  Cfg   Fs   Io/Other
//!        Box    Box      Box    Box   Box  Box<str>
//!
//! Sub-errors (unboxed internally):
//!   Env       Read, Parse
//!   Template  RootNotFound, RootNotDirectory, Read, Syntax, Undefined,
//!             MissingValue, Type, Execute
//!   Function  MissingValue, Type, Crypto  (raised inside template functions)
//!   Crypto    Decode, TooShort, Decrypt, InvalidKey, MissingKey
//!   Config    ReadError, ParseError, InvalidValue
//!   Fs        CreateDir, Write
//!
//! All variants boxed => RenderError fits in 24 bytes.
//! ```

use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`RenderError`].
pub type RenderResult<T> = std::result::Result<T, RenderError>;

/// Top-level application error type.
///
/// All sub-errors are boxed to keep this enum at ~24 bytes on the stack.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Fatal error that should terminate the application.
    #[error("fatal error: {0}")]
    Bailed(Box<str>),

    /// Environment file loading failed.
    #[error("env error: {0}")]
    Env(#[from] Box<EnvError>),

    /// Template discovery or rendering failed.
    #[error("template error: {0}")]
    Template(#[from] Box<TemplateError>),

    /// Encryption or key handling failed.
    #[error("crypto error: {0}")]
    Crypto(#[from] Box<CryptoError>),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] Box<ConfigError>),

    /// Filesystem error while writing output.
    #[error("filesystem error: {0}")]
    Fs(#[from] Box<FsError>),

    /// I/O error.
    #[error("io error: {0}")]
    Io(Box<std::io::Error>),

    /// Generic error with message.
    #[error("{0}")]
    Other(Box<str>),
}

/// Create a fatal [`RenderError::Bailed`] that terminates the application.
pub fn bail_out(message: impl Into<String>) -> RenderError {
    RenderError::Bailed(message.into().into_boxed_str())
}

// --- From implementations for boxing ---

/// Macro to generate `From` implementations that box the source error.
macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for RenderError {
                fn from(err: $error) -> Self {
                    RenderError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    EnvError => Env,
    TemplateError => Template,
    CryptoError => Crypto,
    ConfigError => Config,
    FsError => Fs,
    std::io::Error => Io,
}

// --- Env Errors ---

/// Errors raised while loading dotenv files.
#[derive(Debug, Error)]
pub enum EnvError {
    /// The file exists but could not be read.
    #[error("failed to read env file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A line could not be parsed as `KEY=VALUE`.
    #[error("failed to parse env file '{path}': {message}")]
    Parse { path: String, message: String },
}

// --- Template Errors ---

/// Template discovery and rendering errors.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Template root directory does not exist.
    #[error("template directory not found: {0}")]
    RootNotFound(String),

    /// Template root exists but is a file.
    #[error("template root is not a directory: {0}")]
    RootNotDirectory(String),

    /// An exclude glob could not be compiled.
    #[error("invalid exclude pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Template source could not be read.
    #[error("failed to read template '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Template source is not valid template syntax.
    #[error("failed to parse template '{path}': {source}")]
    Syntax {
        path: String,
        #[source]
        source: minijinja::Error,
    },

    /// Strict mode hit an undefined variable.
    #[error("undefined variable in template '{path}': {source}")]
    Undefined {
        path: String,
        #[source]
        source: minijinja::Error,
    },

    /// `required` was called on an absent or empty value.
    #[error("missing required value in template '{path}': {source}")]
    MissingValue {
        path: String,
        #[source]
        source: minijinja::Error,
    },

    /// A template function received a value of the wrong type.
    #[error("type error in template '{path}': {source}")]
    Type {
        path: String,
        #[source]
        source: minijinja::Error,
    },

    /// Any other runtime failure while executing the template.
    #[error("failed to render template '{path}': {source}")]
    Execute {
        path: String,
        #[source]
        source: minijinja::Error,
    },
}

impl TemplateError {
    /// Path of the template the error belongs to, if any.
    #[must_use]
    pub fn template_path(&self) -> Option<&str> {
        match self {
            Self::RootNotFound(_) | Self::RootNotDirectory(_) | Self::InvalidPattern { .. } => None,
            Self::Read { path, .. }
            | Self::Syntax { path, .. }
            | Self::Undefined { path, .. }
            | Self::MissingValue { path, .. }
            | Self::Type { path, .. }
            | Self::Execute { path, .. } => Some(path),
        }
    }
}

// --- Function Errors ---

/// Errors raised by the template function library.
///
/// These travel as the source of a `minijinja::Error` and are recovered by
/// the engine to pick the matching [`TemplateError`] variant.
#[derive(Debug, Error)]
pub enum FunctionError {
    /// Value was absent or empty where one is required.
    #[error("{function}: value is missing or empty")]
    MissingValue { function: &'static str },

    /// Value had an unexpected type.
    #[error("{function}: expected {expected}, got {found}")]
    Type {
        function: &'static str,
        expected: &'static str,
        found: String,
    },

    /// Encryption failed inside a template.
    #[error("{function}: {source}")]
    Crypto {
        function: &'static str,
        #[source]
        source: CryptoError,
    },
}

impl FunctionError {
    /// Wraps this error into a `minijinja::Error` carrying it as source.
    #[must_use]
    pub fn into_template_error(self) -> minijinja::Error {
        minijinja::Error::new(minijinja::ErrorKind::InvalidOperation, self.to_string())
            .with_source(self)
    }
}

// --- Crypto Errors ---

/// Encryption, decryption and key handling errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Input is not valid base64.
    #[error("ciphertext is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    /// Input is shorter than the nonce.
    #[error("ciphertext too short: {len} bytes")]
    TooShort { len: usize },

    /// Authentication failed (wrong key or tampered data).
    #[error("decryption failed: authentication tag mismatch")]
    Decrypt,

    /// The cipher refused to encrypt the input.
    #[error("encryption failed")]
    Encrypt,

    /// Decrypted bytes are not UTF-8.
    #[error("decrypted value is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Key material is malformed.
    #[error("invalid encryption key from {source_name}: {message}")]
    InvalidKey {
        source_name: String,
        message: String,
    },

    /// Key source exists but could not be read.
    #[error("failed to read encryption key from {source_name}: {source}")]
    KeyUnavailable {
        source_name: String,
        #[source]
        source: std::io::Error,
    },

    /// Encryption was requested but no key is configured.
    #[error("no encryption key configured (needed for '{key}')")]
    MissingKey { key: String },
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },

    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },

    /// Configuration file not found.
    #[error("config file not found: {0}")]
    NotFound(String),
}

// --- Filesystem Errors ---

/// Filesystem errors while producing output files.
#[derive(Debug, Error)]
pub enum FsError {
    /// Output directory could not be created.
    #[error("failed to create directory '{path}': {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Output file could not be written.
    #[error("failed to write '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
