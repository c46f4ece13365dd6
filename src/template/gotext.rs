// render-cfg: Configuration Template Renderer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Go `text/template` syntax, compiled to minijinja source.
//!
//! ```text
//! {{ .HOST }}                           {{ HOST }}
//! {{ encrypt "DB_PASSWORD" .DB_PW }}    {{ encrypt("DB_PASSWORD", DB_PW) }}
//! {{ .NAME | default "app" }}           {{ default("app", NAME) }}
//! {{ .NAME | upper }}                   {{ (NAME|upper) }}
//! {{ if isset . "X" }}..{{ end }}       {% if isset(__root, "X") %}..{% endif %}
//! {{ range $i, $v := .L }}..{{ end }}   {% for __key1, __dot1 in __range(L, true) %}..
//! {{ with .X }}..{{ else }}..{{ end }}  {% with __dot1 = X %}{% if __dot1 %}..
//! ```
//!
//! Text between actions is copied through unchanged and `{{-` / `-}}` trim
//! adjacent whitespace. Names the function library does not define are
//! applied as minijinja filters to their last argument, which is where Go
//! pipelines put the piped value.

use std::collections::HashSet;

use minijinja::{Error, ErrorKind};

use super::functions::FUNCTIONS;

/// Context variable bound to the whole mapping (Go's `$`).
pub const ROOT: &str = "__root";

/// Helper function turning a `range` operand into a sequence.
pub const RANGE: &str = "__range";

/// Names that cannot be emitted as bare minijinja identifiers.
const RESERVED: &[&str] = &[
    "true", "false", "none", "True", "False", "None", "and", "or", "not", "in", "is", "if",
    "else", "elif", "loop", "self", "range", "dict", "namespace", "debug",
];

/// Compiles Go template source into minijinja source.
///
/// # Errors
///
/// Returns a [`ErrorKind::SyntaxError`] naming the line of the offending
/// action.
pub fn translate(source: &str) -> Result<String, Error> {
    Translator::new(source).run()
}

// =============================================================================
// Translator
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    If,
    Range,
    With,
}

#[derive(Debug)]
struct Block {
    kind: BlockKind,
    line: usize,
    /// The block rebound dot and has not reached `else` yet.
    scoped: bool,
    in_else: bool,
}

struct Translator<'a> {
    source: &'a str,
    out: String,
    blocks: Vec<Block>,
    dots: Vec<String>,
    vars: HashSet<String>,
    next_id: usize,
    line: usize,
}

impl<'a> Translator<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            out: String::with_capacity(source.len()),
            blocks: Vec::new(),
            dots: Vec::new(),
            vars: HashSet::new(),
            next_id: 0,
            line: 1,
        }
    }

    fn run(mut self) -> Result<String, Error> {
        let mut rest = self.source;
        let mut trim_next = false;

        while let Some(start) = rest.find("{{") {
            let (text, after) = rest.split_at(start);
            let after = &after[2..];
            let trim_prev = after.starts_with('-') && after[1..].starts_with(is_space);

            let mut emitted = text;
            if trim_next {
                emitted = emitted.trim_start_matches(is_space);
            }
            if trim_prev {
                emitted = emitted.trim_end_matches(is_space);
            }
            self.text(emitted);
            self.line += newlines(text);

            let body_src = if trim_prev { &after[1..] } else { after };
            let (body, trim_after, remainder) =
                split_action(body_src).map_err(|msg| self.error(&msg))?;
            self.action(body).map_err(|msg| self.error(&msg))?;
            self.line += newlines(&body_src[..body_src.len() - remainder.len()]);

            rest = remainder;
            trim_next = trim_after;
        }

        let tail = if trim_next {
            rest.trim_start_matches(is_space)
        } else {
            rest
        };
        self.text(tail);

        if let Some(block) = self.blocks.last() {
            return Err(syntax_error(block.line, "unexpected EOF, missing {{end}}"));
        }
        Ok(self.out)
    }

    fn error(&self, message: &str) -> Error {
        syntax_error(self.line, message)
    }

    fn text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        // Literal text that minijinja would read as a delimiter
        if text.contains("{%") || text.contains("{#") || text.ends_with('{') {
            self.out.push_str(&format!("{{{{ {} }}}}", quote(text)));
        } else {
            self.out.push_str(text);
        }
    }

    fn action(&mut self, body: &str) -> Result<(), String> {
        let body = body.trim_matches(is_space);
        if body.starts_with("/*") {
            return Ok(());
        }

        let tokens = lex(body)?;
        let keyword = match tokens.first() {
            Some(Lexeme {
                token: Token::Ident(word),
                ..
            }) => word.as_str(),
            _ => "",
        };

        match keyword {
            "if" => {
                let pipe = Parser::parse(&tokens[1..], false)?;
                let expr = self.emit_pipeline(&pipe)?;
                self.out.push_str(&format!("{{% if {expr} %}}"));
                self.open(BlockKind::If, false);
                Ok(())
            }
            "else" => self.else_action(&tokens[1..]),
            "end" => self.end_action(&tokens[1..]),
            "range" => self.range_action(&tokens[1..]),
            "with" => self.with_action(&tokens[1..]),
            "define" | "template" | "block" | "break" | "continue" => {
                Err(format!("the {keyword} action is not supported"))
            }
            _ => self.output_action(&tokens),
        }
    }

    fn output_action(&mut self, tokens: &[Lexeme]) -> Result<(), String> {
        let pipe = Parser::parse(tokens, true)?;
        let expr = self.emit_pipeline(&pipe)?;

        match pipe.decl.as_slice() {
            [] => self.out.push_str(&format!("{{{{ {expr} }}}}")),
            [name] => {
                let var = if pipe.define {
                    self.declare(name)?
                } else {
                    self.lookup_var(name)?
                };
                self.out.push_str(&format!("{{% set {var} = {expr} %}}"));
            }
            _ => return Err("too many declarations in command".into()),
        }
        Ok(())
    }

    fn range_action(&mut self, tokens: &[Lexeme]) -> Result<(), String> {
        let pipe = Parser::parse(tokens, true)?;
        if !pipe.decl.is_empty() && !pipe.define {
            return Err("range can only initialize variables".into());
        }
        let expr = self.emit_pipeline(&pipe)?;
        let id = self.fresh_id();
        let dot = format!("__dot{id}");

        let header = match pipe.decl.as_slice() {
            [] => format!("{{% for {dot} in {RANGE}({expr}) %}}"),
            [value] => {
                let value = self.declare(value)?;
                format!("{{% for {dot} in {RANGE}({expr}) %}}{{% set {value} = {dot} %}}")
            }
            [key, value] => {
                let (key, value) = (self.declare(key)?, self.declare(value)?);
                format!(
                    "{{% for __key{id}, {dot} in {RANGE}({expr}, true) %}}\
                     {{% set {key} = __key{id} %}}{{% set {value} = {dot} %}}"
                )
            }
            _ => return Err("too many declarations in range".into()),
        };

        self.out.push_str(&header);
        self.dots.push(dot);
        self.open(BlockKind::Range, true);
        Ok(())
    }

    fn with_action(&mut self, tokens: &[Lexeme]) -> Result<(), String> {
        let pipe = Parser::parse(tokens, true)?;
        let expr = self.emit_pipeline(&pipe)?;
        let dot = format!("__dot{}", self.fresh_id());

        let mut header = format!("{{% with {dot} = {expr} %}}{{% if {dot} %}}");
        match pipe.decl.as_slice() {
            [] => {}
            [name] if pipe.define => {
                let var = self.declare(name)?;
                header.push_str(&format!("{{% set {var} = {dot} %}}"));
            }
            _ => return Err("with can only initialize a single variable".into()),
        }

        self.out.push_str(&header);
        self.dots.push(dot);
        self.open(BlockKind::With, true);
        Ok(())
    }

    fn else_action(&mut self, tokens: &[Lexeme]) -> Result<(), String> {
        let Some(&Block { kind, in_else, .. }) = self.blocks.last() else {
            return Err("unexpected {{else}}".into());
        };
        if in_else {
            return Err("expected {{end}}, found {{else}}".into());
        }

        match tokens {
            [] => {
                if let Some(block) = self.blocks.last_mut() {
                    block.in_else = true;
                    if block.scoped {
                        block.scoped = false;
                        self.dots.pop();
                    }
                }
                self.out.push_str("{% else %}");
            }
            [
                Lexeme {
                    token: Token::Ident(word),
                    ..
                },
                rest @ ..,
            ] if word == "if" && kind == BlockKind::If => {
                let pipe = Parser::parse(rest, false)?;
                let expr = self.emit_pipeline(&pipe)?;
                self.out.push_str(&format!("{{% elif {expr} %}}"));
            }
            _ => return Err("unsupported {{else}} form".into()),
        }
        Ok(())
    }

    fn end_action(&mut self, tokens: &[Lexeme]) -> Result<(), String> {
        if !tokens.is_empty() {
            return Err("unexpected arguments to {{end}}".into());
        }
        let block = self.blocks.pop().ok_or("unexpected {{end}}")?;
        if block.scoped {
            self.dots.pop();
        }
        self.out.push_str(match block.kind {
            BlockKind::If => "{% endif %}",
            BlockKind::Range => "{% endfor %}",
            BlockKind::With => "{% endif %}{% endwith %}",
        });
        Ok(())
    }

    fn open(&mut self, kind: BlockKind, scoped: bool) {
        self.blocks.push(Block {
            kind,
            line: self.line,
            scoped,
            in_else: false,
        });
    }

    fn fresh_id(&mut self) -> usize {
        self.next_id += 1;
        self.next_id
    }

    fn declare(&mut self, name: &str) -> Result<String, String> {
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(format!("unsupported variable name \"${name}\""));
        }
        self.vars.insert(name.to_string());
        Ok(var_name(name))
    }

    fn lookup_var(&self, name: &str) -> Result<String, String> {
        if self.vars.contains(name) {
            Ok(var_name(name))
        } else {
            Err(format!("undefined variable \"${name}\""))
        }
    }

    // -------------------------------------------------------------------------
    // Expressions
    // -------------------------------------------------------------------------

    fn emit_pipeline(&self, pipe: &Pipeline) -> Result<String, String> {
        let mut piped = None;
        for command in &pipe.commands {
            piped = Some(self.emit_command(command, piped)?);
        }
        piped.ok_or_else(|| "missing value for command".to_string())
    }

    fn emit_command(&self, command: &[Operand], piped: Option<String>) -> Result<String, String> {
        let (first, rest) = command
            .split_first()
            .ok_or("missing value for command")?;

        if let Term::Ident(name) = &first.term
            && first.fields.is_empty()
        {
            let mut args = rest
                .iter()
                .map(|operand| self.emit_operand(operand))
                .collect::<Result<Vec<_>, _>>()?;
            args.extend(piped);
            return call(name, args);
        }

        if !rest.is_empty() || piped.is_some() {
            return Err("can't give argument to non-function".into());
        }
        self.emit_operand(first)
    }

    fn emit_operand(&self, operand: &Operand) -> Result<String, String> {
        let mut fields = operand.fields.iter();
        let mut expr = match &operand.term {
            Term::Dot if self.dots.is_empty() => match fields.next() {
                Some(name) if is_plain(name) => name.clone(),
                Some(name) => format!("{ROOT}[{}]", quote(name)),
                None => ROOT.to_string(),
            },
            Term::Dot => self.dots.last().cloned().unwrap_or_else(|| ROOT.to_string()),
            Term::Var(name) if name.is_empty() => ROOT.to_string(),
            Term::Var(name) => self.lookup_var(name)?,
            Term::Ident(name) => call(name, Vec::new())?,
            Term::Str(s) => quote(s),
            Term::Number(n) => n.clone(),
            Term::Bool(b) => b.to_string(),
            Term::Nil => "none".to_string(),
            Term::Paren(pipe) => format!("({})", self.emit_pipeline(pipe)?),
        };

        for name in fields {
            if is_plain(name) {
                expr.push('.');
                expr.push_str(name);
            } else {
                expr.push_str(&format!("[{}]", quote(name)));
            }
        }
        Ok(expr)
    }
}

/// Emits a call to a Go builtin, a library function or a filter.
fn call(name: &str, mut args: Vec<String>) -> Result<String, String> {
    let arity = |min: usize, max: Option<usize>, args: &[String]| {
        if args.len() < min || max.is_some_and(|max| args.len() > max) {
            Err(format!("wrong number of args for {name}: got {}", args.len()))
        } else {
            Ok(())
        }
    };

    match name {
        "and" | "or" => {
            arity(1, None, &args)?;
            Ok(format!("({})", args.join(&format!(" {name} "))))
        }
        "not" => {
            arity(1, Some(1), &args)?;
            Ok(format!("(not {})", args[0]))
        }
        "eq" => {
            arity(2, None, &args)?;
            let (first, rest) = args.split_at(1);
            let alternatives: Vec<String> =
                rest.iter().map(|arg| format!("{} == {arg}", first[0])).collect();
            Ok(format!("({})", alternatives.join(" or ")))
        }
        "ne" | "lt" | "le" | "gt" | "ge" => {
            arity(2, Some(2), &args)?;
            let op = match name {
                "ne" => "!=",
                "lt" => "<",
                "le" => "<=",
                "gt" => ">",
                _ => ">=",
            };
            Ok(format!("({} {op} {})", args[0], args[1]))
        }
        "len" => {
            arity(1, Some(1), &args)?;
            Ok(format!("({}|length)", args[0]))
        }
        "index" => {
            arity(1, None, &args)?;
            let mut expr = format!("({})", args[0]);
            for key in &args[1..] {
                expr.push_str(&format!("[{key}]"));
            }
            Ok(expr)
        }
        "html" => Ok(filter("escape", args)),
        _ if FUNCTIONS.contains(&name) => Ok(format!("{name}({})", args.join(", "))),
        _ => {
            if args.is_empty() {
                return Ok(format!("{name}()"));
            }
            args.rotate_right(1);
            Ok(filter(name, args))
        }
    }
}

/// `args[0]` is the filtered value, the rest are filter arguments.
fn filter(name: &str, args: Vec<String>) -> String {
    match args.split_first() {
        None => format!("{name}()"),
        Some((input, [])) => format!("({input}|{name})"),
        Some((input, rest)) => format!("({input}|{name}({}))", rest.join(", ")),
    }
}

fn var_name(name: &str) -> String {
    format!("__v_{name}")
}

/// Whether `name` can be written as a bare minijinja identifier.
fn is_plain(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with("__")
        && !RESERVED.contains(&name)
        && !FUNCTIONS.contains(&name)
}

/// minijinja string literal for `s`.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn syntax_error(line: usize, message: &str) -> Error {
    Error::new(ErrorKind::SyntaxError, format!("line {line}: {message}"))
}

const fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

fn newlines(s: &str) -> usize {
    s.bytes().filter(|&b| b == b'\n').count()
}

// =============================================================================
// Action boundaries
// =============================================================================

/// Splits `s` (the text after `{{` and any left trim marker) into the action
/// body, whether it ends with a right trim marker, and the text after `}}`.
fn split_action(s: &str) -> Result<(&str, bool, &str), String> {
    let bytes = s.as_bytes();
    let lead = s.len() - s.trim_start_matches(is_space).len();

    if s[lead..].starts_with("/*") {
        let end = s[lead + 2..]
            .find("*/")
            .map(|pos| lead + 2 + pos + 2)
            .ok_or("unclosed comment")?;
        let (trim, len) = close_at(bytes, end).ok_or("comment ends before closing delimiter")?;
        return Ok((&s[..end], trim, &s[end + len..]));
    }

    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            delim @ (b'"' | b'\'') => i = skip_quoted(bytes, i, delim)?,
            b'`' => {
                i = s[i + 1..]
                    .find('`')
                    .map(|pos| i + pos + 2)
                    .ok_or("unterminated raw quoted string")?;
            }
            _ => {
                if let Some((trim, len)) = close_at(bytes, i) {
                    return Ok((&s[..i], trim, &s[i + len..]));
                }
                i += 1;
            }
        }
    }
    Err("unclosed action".into())
}

/// Matches `}}` or ` -}}` at `i`, returning the trim flag and match length.
fn close_at(bytes: &[u8], i: usize) -> Option<(bool, usize)> {
    let rest = &bytes[i..];
    if rest.starts_with(b"}}") {
        Some((false, 2))
    } else if rest.len() >= 4 && is_space(char::from(rest[0])) && rest[1..].starts_with(b"-}}") {
        Some((true, 4))
    } else {
        None
    }
}

fn skip_quoted(bytes: &[u8], start: usize, quote: u8) -> Result<usize, String> {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => break,
            b if b == quote => return Ok(i + 1),
            _ => i += 1,
        }
    }
    Err("unterminated quoted string".into())
}

// =============================================================================
// Lexer
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Dot,
    Field(String),
    Var(String),
    Ident(String),
    Str(String),
    Number(String),
    LParen,
    RParen,
    Pipe,
    Comma,
    Declare,
    Assign,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Self::Dot => "\".\"".into(),
            Self::Field(name) => format!(".{name}"),
            Self::Var(name) => format!("${name}"),
            Self::Ident(name) | Self::Number(name) => name.clone(),
            Self::Str(s) => format!("{s:?}"),
            Self::LParen => "\"(\"".into(),
            Self::RParen => "\")\"".into(),
            Self::Pipe => "\"|\"".into(),
            Self::Comma => "\",\"".into(),
            Self::Declare => "\":=\"".into(),
            Self::Assign => "\"=\"".into(),
        }
    }
}

#[derive(Debug)]
struct Lexeme {
    token: Token,
    /// Whitespace precedes the token.
    spaced: bool,
}

fn lex(body: &str) -> Result<Vec<Lexeme>, String> {
    let chars: Vec<char> = body.chars().collect();
    let mut tokens = Vec::new();
    let mut spaced = false;
    let mut i = 0;

    while let Some(&c) = chars.get(i) {
        if is_space(c) {
            spaced = true;
            i += 1;
            continue;
        }

        let next = chars.get(i + 1).copied();
        let token = match c {
            '(' => Token::LParen,
            ')' => Token::RParen,
            '|' => Token::Pipe,
            ',' => Token::Comma,
            '=' => Token::Assign,
            ':' if next == Some('=') => {
                i += 1;
                Token::Declare
            }
            '"' => {
                let (s, end) = lex_quoted(&chars, i, '"')?;
                i = end - 1;
                Token::Str(s)
            }
            '\'' => {
                let (s, end) = lex_quoted(&chars, i, '\'')?;
                let mut it = s.chars();
                let (Some(ch), None) = (it.next(), it.next()) else {
                    return Err(format!("malformed character constant: '{s}'"));
                };
                i = end - 1;
                Token::Number(u32::from(ch).to_string())
            }
            '`' => {
                let len = chars[i + 1..]
                    .iter()
                    .position(|&ch| ch == '`')
                    .ok_or("unterminated raw quoted string")?;
                let s: String = chars[i + 1..i + 1 + len].iter().collect();
                i += len + 1;
                Token::Str(s)
            }
            '$' => {
                i += 1;
                let name = take_ident(&chars, &mut i);
                i -= 1;
                Token::Var(name)
            }
            '.' if next.is_some_and(|n| n.is_ascii_digit()) => {
                Token::Number(lex_number(&chars, &mut i)?)
            }
            '.' => {
                i += 1;
                let name = take_ident(&chars, &mut i);
                i -= 1;
                if name.is_empty() {
                    Token::Dot
                } else {
                    Token::Field(name)
                }
            }
            '-' | '+' if next.is_some_and(|n| n.is_ascii_digit() || n == '.') => {
                Token::Number(lex_number(&chars, &mut i)?)
            }
            c if c.is_ascii_digit() => Token::Number(lex_number(&chars, &mut i)?),
            c if c.is_alphabetic() || c == '_' => {
                let name = take_ident(&chars, &mut i);
                i -= 1;
                Token::Ident(name)
            }
            other => return Err(format!("unexpected {other:?} in command")),
        };

        tokens.push(Lexeme { token, spaced });
        spaced = false;
        i += 1;
    }
    Ok(tokens)
}

/// Consumes identifier characters starting at `i`, leaving `i` just past them.
fn take_ident(chars: &[char], i: &mut usize) -> String {
    let mut name = String::new();
    while let Some(&c) = chars.get(*i)
        && (c.is_alphanumeric() || c == '_')
    {
        name.push(c);
        *i += 1;
    }
    name
}

/// Consumes a number starting at `i`, leaving `i` on its last character.
fn lex_number(chars: &[char], i: &mut usize) -> Result<String, String> {
    let mut text = String::new();
    while let Some(&c) = chars.get(*i) {
        let exponent_sign = (c == '+' || c == '-')
            && text.len() > 1
            && text.ends_with(['e', 'E'])
            && !text.contains(['x', 'X']);
        let leading_sign = (c == '+' || c == '-') && text.is_empty();
        if c.is_ascii_alphanumeric() || c == '_' || c == '.' || exponent_sign || leading_sign {
            text.push(c);
            *i += 1;
        } else {
            break;
        }
    }
    *i -= 1;
    parse_number(&text)
}

/// Normalizes a Go number literal into a minijinja one.
fn parse_number(text: &str) -> Result<String, String> {
    let cleaned: String = text.chars().filter(|&c| c != '_').collect();
    let (negative, digits) = match cleaned.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, cleaned.strip_prefix('+').unwrap_or(&cleaned)),
    };

    let radix_digits = |prefixes: [&str; 2]| {
        prefixes
            .iter()
            .find_map(|prefix| digits.strip_prefix(prefix))
    };
    let int = if let Some(hex) = radix_digits(["0x", "0X"]) {
        i64::from_str_radix(hex, 16).ok()
    } else if let Some(oct) = radix_digits(["0o", "0O"]) {
        i64::from_str_radix(oct, 8).ok()
    } else if let Some(bin) = radix_digits(["0b", "0B"]) {
        i64::from_str_radix(bin, 2).ok()
    } else if digits.len() > 1 && digits.starts_with('0') && digits.bytes().all(|b| b.is_ascii_digit())
    {
        i64::from_str_radix(&digits[1..], 8).ok()
    } else {
        digits.parse::<i64>().ok()
    };

    if let Some(n) = int {
        let n = if negative { -n } else { n };
        return Ok(n.to_string());
    }
    digits
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(|f| format!("{:?}", if negative { -f } else { f }))
        .ok_or_else(|| format!("bad number syntax: {text:?}"))
}

/// Reads a quoted literal starting at `start`; returns it and the index
/// just past the closing quote.
fn lex_quoted(chars: &[char], start: usize, quote: char) -> Result<(String, usize), String> {
    let mut out = String::new();
    let mut i = start + 1;
    while let Some(&c) = chars.get(i) {
        match c {
            c if c == quote => return Ok((out, i + 1)),
            '\\' => {
                let (decoded, next) = unescape(chars, i + 1)?;
                out.push(decoded);
                i = next;
            }
            '\n' => break,
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    Err("unterminated quoted string".into())
}

fn unescape(chars: &[char], i: usize) -> Result<(char, usize), String> {
    let c = *chars.get(i).ok_or("unterminated quoted string")?;
    let simple = match c {
        'a' => Some('\x07'),
        'b' => Some('\x08'),
        'f' => Some('\x0c'),
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        'v' => Some('\x0b'),
        '\\' | '\'' | '"' => Some(c),
        _ => None,
    };
    if let Some(ch) = simple {
        return Ok((ch, i + 1));
    }

    let (start, len, radix) = match c {
        'x' => (i + 1, 2, 16),
        'u' => (i + 1, 4, 16),
        'U' => (i + 1, 8, 16),
        '0'..='7' => (i, 3, 8),
        _ => return Err(format!("unknown escape sequence: \\{c}")),
    };
    let digits: String = chars
        .get(start..start + len)
        .ok_or("unterminated escape sequence")?
        .iter()
        .collect();
    let decoded = u32::from_str_radix(&digits, radix)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| format!("invalid escape sequence: \\{c}{digits}"))?;
    Ok((decoded, start + len))
}

// =============================================================================
// Parser
// =============================================================================

#[derive(Debug)]
struct Pipeline {
    decl: Vec<String>,
    /// `:=` rather than `=`.
    define: bool,
    commands: Vec<Vec<Operand>>,
}

#[derive(Debug)]
struct Operand {
    term: Term,
    fields: Vec<String>,
}

#[derive(Debug)]
enum Term {
    Dot,
    Var(String),
    Ident(String),
    Str(String),
    Number(String),
    Bool(bool),
    Nil,
    Paren(Pipeline),
}

struct Parser<'t> {
    tokens: &'t [Lexeme],
    pos: usize,
}

impl<'t> Parser<'t> {
    fn parse(tokens: &'t [Lexeme], allow_decl: bool) -> Result<Pipeline, String> {
        let mut parser = Self { tokens, pos: 0 };
        let pipe = parser.pipeline(allow_decl)?;
        match parser.tokens.get(parser.pos) {
            None => Ok(pipe),
            Some(lexeme) => Err(format!("unexpected {} in command", lexeme.token.describe())),
        }
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos).map(|lexeme| &lexeme.token)
    }

    fn next(&mut self) -> Option<&'t Lexeme> {
        let lexeme = self.tokens.get(self.pos);
        if lexeme.is_some() {
            self.pos += 1;
        }
        lexeme
    }

    fn pipeline(&mut self, allow_decl: bool) -> Result<Pipeline, String> {
        let (decl, define) = if allow_decl {
            self.declaration()
        } else {
            (Vec::new(), false)
        };

        let mut commands = vec![self.command()?];
        while self.peek() == Some(&Token::Pipe) {
            self.pos += 1;
            commands.push(self.command()?);
        }
        Ok(Pipeline {
            decl,
            define,
            commands,
        })
    }

    fn declaration(&mut self) -> (Vec<String>, bool) {
        let window: Vec<&Token> = self.tokens[self.pos..]
            .iter()
            .take(4)
            .map(|lexeme| &lexeme.token)
            .collect();
        let (vars, define, used) = match window.as_slice() {
            [Token::Var(a), Token::Comma, Token::Var(b), Token::Declare, ..] => {
                (vec![a.clone(), b.clone()], true, 4)
            }
            [Token::Var(a), Token::Comma, Token::Var(b), Token::Assign, ..] => {
                (vec![a.clone(), b.clone()], false, 4)
            }
            [Token::Var(a), Token::Declare, ..] => (vec![a.clone()], true, 2),
            [Token::Var(a), Token::Assign, ..] => (vec![a.clone()], false, 2),
            _ => return (Vec::new(), false),
        };
        self.pos += used;
        (vars, define)
    }

    fn command(&mut self) -> Result<Vec<Operand>, String> {
        let mut operands = Vec::new();
        while let Some(token) = self.peek() {
            if matches!(token, Token::Pipe | Token::RParen) {
                break;
            }
            operands.push(self.operand()?);
        }
        if operands.is_empty() {
            return Err("missing value for command".into());
        }
        Ok(operands)
    }

    fn operand(&mut self) -> Result<Operand, String> {
        let lexeme = self.next().ok_or("unexpected end of command")?;
        let (term, mut fields) = match &lexeme.token {
            Token::Dot => (Term::Dot, Vec::new()),
            Token::Field(name) => (Term::Dot, vec![name.clone()]),
            Token::Var(name) => (Term::Var(name.clone()), Vec::new()),
            Token::Ident(name) => {
                let term = match name.as_str() {
                    "true" => Term::Bool(true),
                    "false" => Term::Bool(false),
                    "nil" => Term::Nil,
                    _ => Term::Ident(name.clone()),
                };
                (term, Vec::new())
            }
            Token::Str(s) => (Term::Str(s.clone()), Vec::new()),
            Token::Number(n) => (Term::Number(n.clone()), Vec::new()),
            Token::LParen => {
                let inner = self.pipeline(false)?;
                if self.next().map(|lexeme| &lexeme.token) != Some(&Token::RParen) {
                    return Err("unclosed left paren".into());
                }
                (Term::Paren(inner), Vec::new())
            }
            other => return Err(format!("unexpected {} in operand", other.describe())),
        };

        while let Some(Lexeme {
            token: Token::Field(name),
            spaced: false,
        }) = self.tokens.get(self.pos)
        {
            fields.push(name.clone());
            self.pos += 1;
        }
        Ok(Operand { term, fields })
    }
}
