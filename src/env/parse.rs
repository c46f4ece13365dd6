// render-cfg: Configuration Template Renderer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Dotenv parser.
//!
//! ```text
//! # comment
//! export KEY=value        `export ` prefix is ignored
//! KEY=plain value # note  unquoted: trimmed, ` #` starts a comment
//! KEY='literal ${X}'      single quotes: no escapes, no expansion
//! KEY="a\nb ${X}"         double quotes: escapes, expansion, may span lines
//! ```
//!
//! `${NAME}` and `$NAME` resolve against keys defined earlier in the same
//! file, then against the base mapping (earlier files, plus the process
//! environment only when the caller seeded it). Unknown names expand to "".

use std::collections::BTreeMap;

use super::EnvMapping;

/// A malformed line, numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

/// Parses dotenv `content` into pairs in file order.
///
/// # Errors
///
/// Returns [`ParseError`] for the first malformed line.
pub fn parse(content: &str, base: &EnvMapping) -> Result<Vec<(String, String)>, ParseError> {
    let mut cursor = Cursor {
        src: content,
        pos: 0,
        line: 1,
    };
    let mut local = BTreeMap::new();
    let mut pairs = Vec::new();

    loop {
        cursor.skip_while(char::is_whitespace);
        match cursor.peek() {
            None => break,
            Some('#') => {
                cursor.skip_while(|c| c != '\n');
                continue;
            }
            Some(_) => {}
        }

        let line = cursor.line;
        let fail = |message: &str| ParseError {
            line,
            message: message.to_string(),
        };

        let mut key = cursor.take_while(is_key_char);
        if key == "export" && cursor.peek().is_some_and(|c| c == ' ' || c == '\t') {
            cursor.skip_while(|c| c == ' ' || c == '\t');
            key = cursor.take_while(is_key_char);
        }
        if key.is_empty() {
            return Err(fail("missing variable name"));
        }
        cursor.skip_while(|c| c == ' ' || c == '\t');
        if cursor.bump() != Some('=') {
            return Err(fail(&format!("expected '=' after '{key}'")));
        }
        cursor.skip_while(|c| c == ' ' || c == '\t');

        let lookup = |name: &str| -> String {
            local
                .get(name)
                .map(String::as_str)
                .or_else(|| base.get(name))
                .unwrap_or_default()
                .to_string()
        };

        let value = match cursor.peek() {
            Some('\'') => {
                cursor.bump();
                let raw = cursor.take_while(|c| c != '\'');
                if cursor.bump() != Some('\'') {
                    return Err(fail("unterminated single-quoted value"));
                }
                cursor.expect_line_end().map_err(|m| fail(m))?;
                raw.to_string()
            }
            Some('"') => {
                cursor.bump();
                let raw = cursor
                    .take_double_quoted()
                    .ok_or_else(|| fail("unterminated double-quoted value"))?;
                cursor.expect_line_end().map_err(|m| fail(m))?;
                substitute(raw, true, &lookup).map_err(|m| fail(m))?
            }
            _ => {
                let raw = strip_comment(cursor.take_while(|c| c != '\n')).trim_end();
                substitute(raw, false, &lookup).map_err(|m| fail(m))?
            }
        };

        local.insert(key.to_string(), value.clone());
        pairs.push((key.to_string(), value));
    }

    Ok(pairs)
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn take_while(&mut self, keep: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek()
            && keep(c)
        {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    fn skip_while(&mut self, skip: impl Fn(char) -> bool) {
        self.take_while(skip);
    }

    /// Raw text up to the closing unescaped `"`, which is consumed.
    fn take_double_quoted(&mut self) -> Option<&'a str> {
        let start = self.pos;
        loop {
            match self.bump()? {
                '\\' => {
                    self.bump()?;
                }
                '"' => return Some(&self.src[start..self.pos - 1]),
                _ => {}
            }
        }
    }

    /// Allows trailing blanks and a comment after a quoted value.
    fn expect_line_end(&mut self) -> Result<(), &'static str> {
        self.skip_while(|c| c == ' ' || c == '\t' || c == '\r');
        match self.peek() {
            None | Some('\n') => Ok(()),
            Some('#') => {
                self.skip_while(|c| c != '\n');
                Ok(())
            }
            Some(_) => Err("unexpected characters after quoted value"),
        }
    }
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Cuts an unquoted value at the first `#` preceded by whitespace.
fn strip_comment(raw: &str) -> &str {
    let mut prev = ' ';
    for (i, c) in raw.char_indices() {
        if c == '#' && prev.is_whitespace() {
            return &raw[..i];
        }
        prev = c;
    }
    raw
}

/// Expands `$NAME` / `${NAME}`. `\$` is always a literal dollar; the
/// remaining escapes apply only inside double quotes.
fn substitute(
    raw: &str,
    escapes: bool,
    lookup: &impl Fn(&str) -> String,
) -> Result<String, &'static str> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'$') => {
                chars.next();
                out.push('$');
            }
            '\\' if escapes => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some(c @ ('\\' | '"')) => out.push(c),
                Some(c) => {
                    out.push('\\');
                    out.push(c);
                }
                None => out.push('\\'),
            },
            '$' if chars.peek() == Some(&'{') => {
                chars.next();
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => name.push(c),
                        None => return Err("unterminated '${' reference"),
                    }
                }
                out.push_str(&lookup(&name));
            }
            '$' if chars.peek().is_some_and(|&c| is_name_char(c)) => {
                let mut name = String::new();
                while let Some(&c) = chars.peek()
                    && is_name_char(c)
                {
                    name.push(c);
                    chars.next();
                }
                out.push_str(&lookup(&name));
            }
            c => out.push(c),
        }
    }

    Ok(out)
}
