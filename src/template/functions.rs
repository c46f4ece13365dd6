// render-cfg: Configuration Template Renderer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Function library bound into every template.
//!
//! ```text
//! functions  isset  regexMatch  default  required  encrypt  toBool  split  join
//!            print  println  printf  __range
//! filters    required  toBool  snake_case  pascal_case  camel_case
//!            kebab_case  shouty_snake_case  b64enc  b64dec
//! builtins   everything minijinja ships (upper, lower, trim, replace, ...)
//! ```

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use heck::{ToKebabCase, ToLowerCamelCase, ToPascalCase, ToShoutySnakeCase, ToSnakeCase};
use minijinja::value::{Rest, Value, ValueKind};
use minijinja::{Environment, Error, ErrorKind, State};
use regex::Regex;

use super::gotext::RANGE;
use super::value::Scalar;
use crate::crypto::Cipher;
use crate::error::{CryptoError, FunctionError};

/// Names registered as template functions.
pub const FUNCTIONS: &[&str] = &[
    "isset",
    "regexMatch",
    "default",
    "required",
    "encrypt",
    "toBool",
    "split",
    "join",
    "print",
    "println",
    "printf",
];

/// Decides which keys get encrypted and holds the cipher to do it.
#[derive(Debug, Clone, Default)]
pub struct EncryptPolicy {
    suffixes: Vec<String>,
    cipher: Option<Cipher>,
}

impl EncryptPolicy {
    /// Empty suffixes are dropped since they would match every key.
    #[must_use]
    pub fn new(suffixes: &[String], cipher: Option<Cipher>) -> Self {
        Self {
            suffixes: suffixes
                .iter()
                .filter(|s| !s.is_empty())
                .cloned()
                .collect(),
            cipher,
        }
    }

    /// Whether values stored under `key` must be encrypted.
    #[must_use]
    pub fn matches(&self, key: &str) -> bool {
        self.suffixes.iter().any(|suffix| key.ends_with(suffix.as_str()))
    }

    /// Encrypts `value` when `key` matches a suffix, otherwise returns it as is.
    ///
    /// # Errors
    ///
    /// Fails with a crypto error if a match needs a cipher and none is configured.
    pub fn apply(&self, key: &str, value: &str) -> Result<String, FunctionError> {
        if !self.matches(key) {
            return Ok(value.to_string());
        }

        let crypto_error = |source: CryptoError| FunctionError::Crypto {
            function: "encrypt",
            source,
        };
        let cipher = self.cipher.as_ref().ok_or_else(|| {
            crypto_error(CryptoError::MissingKey {
                key: key.to_string(),
            })
        })?;
        cipher.encrypt(value).map_err(crypto_error)
    }
}

/// Registers the whole library on `env`.
pub fn register(env: &mut Environment<'static>, policy: Arc<EncryptPolicy>) {
    env.add_function("isset", isset);
    env.add_function("regexMatch", regex_match);
    env.add_function("default", default);
    env.add_function("required", required);
    env.add_function("toBool", to_bool);
    env.add_function("split", split);
    env.add_function("join", join);
    env.add_function("encrypt", move |key: String, value: Value| {
        encrypt(&policy, &key, &value)
    });
    env.add_function("print", go_print);
    env.add_function("println", go_println);
    env.add_function("printf", go_printf);
    env.add_function(RANGE, range_items);

    env.add_filter("required", required);
    env.add_filter("toBool", to_bool);
    env.add_filter("snake_case", |s: &str| s.to_snake_case());
    env.add_filter("pascal_case", |s: &str| s.to_pascal_case());
    env.add_filter("camel_case", |s: &str| s.to_lower_camel_case());
    env.add_filter("kebab_case", |s: &str| s.to_kebab_case());
    env.add_filter("shouty_snake_case", |s: &str| s.to_shouty_snake_case());
    env.add_filter("b64enc", |s: &str| STANDARD.encode(s));
    env.add_filter("b64dec", b64dec);
}

/// `isset(key)` checks the root context, `isset(mapping, key)` a mapping.
fn isset(state: &State, first: Value, key: Option<String>) -> bool {
    match key {
        Some(key) => first
            .get_attr(&key)
            .is_ok_and(|value| !value.is_undefined()),
        None => first
            .as_str()
            .and_then(|name| state.lookup(name))
            .is_some_and(|value| !value.is_undefined()),
    }
}

/// A malformed pattern never matches.
fn regex_match(pattern: &str, input: Value) -> bool {
    let Ok(re) = Regex::new(pattern) else {
        return false;
    };
    let text = match Scalar::from(&input) {
        Scalar::Str(s) => s,
        Scalar::Absent => String::new(),
        _ => input.to_string(),
    };
    re.is_match(&text)
}

fn default(fallback: Value, value: Option<Value>) -> Value {
    match value {
        Some(value) if !Scalar::from(&value).is_blank() => value,
        _ => fallback,
    }
}

fn required(value: Option<Value>) -> Result<Value, Error> {
    match value {
        Some(value) if !Scalar::from(&value).is_blank() => Ok(value),
        _ => Err(FunctionError::MissingValue {
            function: "required",
        }
        .into_template_error()),
    }
}

fn to_bool(value: Option<Value>) -> bool {
    value.is_some_and(|v| Scalar::from(&v).to_bool())
}

fn split(input: &str, separator: &str) -> Vec<String> {
    input.split(separator).map(str::to_string).collect()
}

fn join(items: Value, separator: &str) -> Result<String, Error> {
    let parts = items
        .try_iter()?
        .map(|item| match item.as_str() {
            Some(s) => s.to_string(),
            None => item.to_string(),
        })
        .collect::<Vec<_>>();
    Ok(parts.join(separator))
}

fn encrypt(policy: &EncryptPolicy, key: &str, value: &Value) -> Result<Value, Error> {
    match Scalar::from(value) {
        Scalar::Str(s) => policy
            .apply(key, &s)
            .map(Value::from)
            .map_err(FunctionError::into_template_error),
        other => Err(FunctionError::Type {
            function: "encrypt",
            expected: "string",
            found: other.type_name(),
        }
        .into_template_error()),
    }
}

fn b64dec(input: &str) -> Result<String, Error> {
    let bytes = STANDARD.decode(input).map_err(|e| {
        Error::new(ErrorKind::InvalidOperation, "b64dec: invalid base64").with_source(e)
    })?;
    String::from_utf8(bytes).map_err(|e| {
        Error::new(ErrorKind::InvalidOperation, "b64dec: not valid UTF-8").with_source(e)
    })
}

/// Text form used by the print family: absent values print nothing.
fn display(value: &Value) -> String {
    match Scalar::from(value) {
        Scalar::Absent => String::new(),
        Scalar::Str(s) => s,
        _ => value.to_string(),
    }
}

/// Go `print`: a space goes between operands when neither is a string.
fn go_print(args: Rest<Value>) -> String {
    let mut out = String::new();
    let mut previous_is_string = true;
    for (i, arg) in args.iter().enumerate() {
        let is_string = arg.kind() == ValueKind::String;
        if i > 0 && !is_string && !previous_is_string {
            out.push(' ');
        }
        out.push_str(&display(arg));
        previous_is_string = is_string;
    }
    out
}

fn go_println(args: Rest<Value>) -> String {
    let mut line = args.iter().map(display).collect::<Vec<_>>().join(" ");
    line.push('\n');
    line
}

/// Go `printf` with the `%s %v %q %d %t %x %f %%` verbs; `%f` takes an
/// optional precision such as `%.2f`.
fn go_printf(format: &str, args: Rest<Value>) -> String {
    let mut out = String::new();
    let mut args = args.iter();
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let mut precision = None;
        if chars.next_if_eq(&'.').is_some() {
            let mut digits = String::new();
            while let Some(d) = chars.next_if(char::is_ascii_digit) {
                digits.push(d);
            }
            precision = digits.parse::<usize>().ok();
        }

        let Some(verb) = chars.next() else {
            out.push_str("%!(NOVERB)");
            break;
        };
        if verb == '%' {
            out.push('%');
            continue;
        }
        match args.next() {
            Some(arg) => out.push_str(&format_verb(verb, precision, arg)),
            None => out.push_str(&format!("%!{verb}(MISSING)")),
        }
    }

    let extra: Vec<String> = args.map(display).collect();
    if !extra.is_empty() {
        out.push_str(&format!("%!(EXTRA {})", extra.join(", ")));
    }
    out
}

fn format_verb(verb: char, precision: Option<usize>, arg: &Value) -> String {
    match (verb, Scalar::from(arg)) {
        ('s' | 'v', _) => display(arg),
        ('q', _) => format!("{:?}", display(arg)),
        ('d', Scalar::Int(n)) => n.to_string(),
        ('t', Scalar::Bool(b)) => b.to_string(),
        ('x', Scalar::Int(n)) => format!("{n:x}"),
        ('x', Scalar::Str(s)) => s.bytes().map(|b| format!("{b:02x}")).collect(),
        ('f', Scalar::Float(f)) => format!("{f:.*}", precision.unwrap_or(6)),
        (verb, _) => format!("%!{verb}({})", display(arg)),
    }
}

/// Sequence a Go `range` walks: elements of a list, values of a map in key
/// order, nothing for an absent value. With `pairs`, each item is
/// `[index or key, element]`.
fn range_items(value: Value, pairs: Option<bool>) -> Result<Value, Error> {
    let pairs = pairs.unwrap_or(false);
    let items: Vec<Value> = match value.kind() {
        ValueKind::Undefined | ValueKind::None => Vec::new(),
        ValueKind::Map => {
            let mut keys: Vec<Value> = value.try_iter()?.collect();
            keys.sort();
            keys.into_iter()
                .map(|key| {
                    let item = value.get_item(&key)?;
                    Ok(if pairs {
                        Value::from(vec![key, item])
                    } else {
                        item
                    })
                })
                .collect::<Result<_, Error>>()?
        }
        _ => value
            .try_iter()?
            .enumerate()
            .map(|(index, item)| {
                if pairs {
                    Value::from(vec![Value::from(index), item])
                } else {
                    item
                }
            })
            .collect(),
    };
    Ok(Value::from(items))
}
