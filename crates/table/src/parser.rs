//! Lua table-literal reader
//!
//! Accepts the subset of Lua that mission files use: assignments of
//! constructor expressions with `[key] = value`, `name = value` and
//! positional fields, short and long strings, decimal and hex numbers,
//! booleans, `nil` and `math.huge`. Comments may appear anywhere.

use crate::value::{Key, Table, Value};
use thiserror::Error;

/// Deepest table nesting accepted
pub const MAX_DEPTH: usize = 512;

/// Syntax error with the position it was detected at
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}, column {column}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// Parse a chunk of `name = value` assignments
pub fn parse_chunk(src: &str) -> Result<Vec<(String, Value)>, ParseError> {
    let mut parser = Parser::new(src);
    let mut assignments = Vec::new();
    loop {
        parser.skip_trivia()?;
        if parser.at_end() {
            break;
        }
        let name = parser.dotted_name()?;
        parser.skip_trivia()?;
        parser.expect('=')?;
        let value = parser.value()?;
        if let Some(value) = value {
            assignments.push((name, value));
        }
        parser.skip_trivia()?;
        parser.eat(';');
    }
    Ok(assignments)
}

/// Parse a chunk holding a single `name = { ... }` assignment
pub fn parse_assignment(src: &str) -> Result<(String, Table), ParseError> {
    let mut assignments = parse_chunk(src)?;
    if assignments.len() != 1 {
        return Err(ParseError {
            line: 1,
            column: 1,
            message: format!("expected exactly one assignment, found {}", assignments.len()),
        });
    }
    match assignments.remove(0) {
        (name, Value::Table(table)) => Ok((name, table)),
        (name, other) => Err(ParseError {
            line: 1,
            column: 1,
            message: format!("'{}' is a {}, expected a table", name, other.type_name()),
        }),
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        // tolerate a UTF-8 byte order mark
        let src = src.strip_prefix('\u{feff}').unwrap_or(src);
        Self {
            src,
            pos: 0,
            line: 1,
            column: 1,
            depth: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            line: self.line,
            column: self.column,
            message: message.into(),
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.bump();
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected '{}', found '{}'", expected, c))),
            None => Err(self.error(format!("expected '{}', found end of input", expected))),
        }
    }

    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('-') if self.peek_nth(1) == Some('-') => {
                    self.bump();
                    self.bump();
                    if let Some(level) = self.long_bracket_level() {
                        self.long_bracket(level)?;
                    } else {
                        while let Some(c) = self.peek() {
                            if c == '\n' {
                                break;
                            }
                            self.bump();
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// `[[`, `[=[`, ... at the cursor: returns the number of `=`
    fn long_bracket_level(&self) -> Option<usize> {
        let rest = self.rest();
        let after = rest.strip_prefix('[')?;
        let level = after.chars().take_while(|c| *c == '=').count();
        after[level..].starts_with('[').then_some(level)
    }

    fn long_bracket(&mut self, level: usize) -> Result<String, ParseError> {
        for _ in 0..level + 2 {
            self.bump();
        }
        // a newline right after the opening bracket is skipped
        if self.peek() == Some('\r') {
            self.bump();
        }
        if self.peek() == Some('\n') {
            self.bump();
        }
        let close = format!("]{}]", "=".repeat(level));
        match self.rest().find(&close) {
            Some(offset) => {
                let body = self.rest()[..offset].to_string();
                for _ in 0..body.chars().count() + close.len() {
                    self.bump();
                }
                Ok(body)
            }
            None => Err(self.error("unterminated long bracket")),
        }
    }

    fn identifier(&mut self) -> Option<&'a str> {
        let rest = self.rest();
        let mut chars = rest.char_indices();
        match chars.next() {
            Some((_, c)) if c == '_' || c.is_ascii_alphabetic() => {}
            _ => return None,
        }
        let end = chars
            .find(|(_, c)| !(*c == '_' || c.is_ascii_alphanumeric()))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let ident = &rest[..end];
        for _ in 0..end {
            self.bump();
        }
        Some(ident)
    }

    fn dotted_name(&mut self) -> Result<String, ParseError> {
        let mut name = self
            .identifier()
            .ok_or_else(|| self.error("expected a name"))?
            .to_string();
        while self.peek() == Some('.') {
            self.bump();
            let part = self
                .identifier()
                .ok_or_else(|| self.error("expected a name after '.'"))?;
            name.push('.');
            name.push_str(part);
        }
        Ok(name)
    }

    /// Parse a value; `nil` yields `None`
    fn value(&mut self) -> Result<Option<Value>, ParseError> {
        self.skip_trivia()?;
        match self.peek() {
            Some('{') => self.table().map(|t| Some(Value::Table(t))),
            Some('"') | Some('\'') => self.short_string().map(|s| Some(Value::Str(s))),
            Some('[') => match self.long_bracket_level() {
                Some(level) => self.long_bracket(level).map(|s| Some(Value::Str(s))),
                None => Err(self.error("unexpected '['")),
            },
            Some('-') => {
                self.bump();
                self.skip_trivia()?;
                if self.peek() == Some('-') {
                    return Err(self.error("'-' must precede a number"));
                }
                match self.value()? {
                    Some(Value::Int(i)) => Ok(Some(Value::Int(-i))),
                    Some(Value::Float(f)) => Ok(Some(Value::Float(-f))),
                    _ => Err(self.error("'-' must precede a number")),
                }
            }
            Some(c) if c.is_ascii_digit() || (c == '.' && self.peek_nth(1).is_some_and(|d| d.is_ascii_digit())) => {
                self.number().map(Some)
            }
            Some(c) if c == '_' || c.is_ascii_alphabetic() => {
                let name = self.dotted_name()?;
                match name.as_str() {
                    "true" => Ok(Some(Value::Bool(true))),
                    "false" => Ok(Some(Value::Bool(false))),
                    "nil" => Ok(None),
                    "math.huge" => Ok(Some(Value::Float(f64::INFINITY))),
                    other => Err(self.error(format!("unsupported expression '{}'", other))),
                }
            }
            Some(c) => Err(self.error(format!("unexpected character '{}'", c))),
            None => Err(self.error("expected a value, found end of input")),
        }
    }

    fn table(&mut self) -> Result<Table, ParseError> {
        if self.depth == MAX_DEPTH {
            return Err(self.error(format!("tables nested deeper than {}", MAX_DEPTH)));
        }
        self.depth += 1;
        let table = self.table_fields();
        self.depth -= 1;
        table
    }

    fn table_fields(&mut self) -> Result<Table, ParseError> {
        self.expect('{')?;
        let mut table = Table::new();
        let mut next_index: i64 = 1;
        loop {
            self.skip_trivia()?;
            if self.eat('}') {
                return Ok(table);
            }

            if self.peek() == Some('[') && self.long_bracket_level().is_none() {
                // [key] = value
                self.bump();
                let key = match self.value()? {
                    Some(v) => self.key_from(v)?,
                    None => return Err(self.error("table index is nil")),
                };
                self.skip_trivia()?;
                self.expect(']')?;
                self.skip_trivia()?;
                self.expect('=')?;
                if let Some(value) = self.value()? {
                    table.insert(key, value);
                }
            } else if let Some(name) = self.field_name() {
                // name = value
                self.skip_trivia()?;
                self.expect('=')?;
                if let Some(value) = self.value()? {
                    table.insert(Key::Str(name), value);
                }
            } else {
                // positional
                if let Some(value) = self.value()? {
                    table.insert(Key::Int(next_index), value);
                }
                next_index += 1;
            }

            self.skip_trivia()?;
            if !(self.eat(',') || self.eat(';')) {
                self.skip_trivia()?;
                self.expect('}')?;
                return Ok(table);
            }
        }
    }

    /// `name =` inside a constructor; leaves the cursor untouched otherwise
    fn field_name(&mut self) -> Option<String> {
        let checkpoint = (self.pos, self.line, self.column);
        if let Some(ident) = self.identifier() {
            let ident = ident.to_string();
            let _ = self.skip_trivia();
            if self.peek() == Some('=') && self.peek_nth(1) != Some('=') {
                return Some(ident);
            }
        }
        (self.pos, self.line, self.column) = checkpoint;
        None
    }

    fn key_from(&self, value: Value) -> Result<Key, ParseError> {
        match value {
            Value::Str(s) => Ok(Key::Str(s)),
            Value::Int(i) => Ok(Key::Int(i)),
            Value::Float(f) if f.fract() == 0.0 && f.is_finite() => Ok(Key::Int(f as i64)),
            other => Err(self.error(format!("unsupported key type {}", other.type_name()))),
        }
    }

    fn short_string(&mut self) -> Result<String, ParseError> {
        let quote = self.bump().ok_or_else(|| self.error("expected a string"))?;
        // escapes produce raw bytes; the whole literal must be UTF-8
        let mut out = Vec::new();
        loop {
            let c = self
                .bump()
                .ok_or_else(|| self.error("unterminated string"))?;
            match c {
                c if c == quote => {
                    return String::from_utf8(out)
                        .map_err(|_| self.error("string is not valid UTF-8"));
                }
                '\n' => return Err(self.error("unescaped newline in string")),
                '\\' => self.escape(&mut out)?,
                c => push_char(&mut out, c),
            }
        }
    }

    fn escape(&mut self, out: &mut Vec<u8>) -> Result<(), ParseError> {
        let c = self
            .bump()
            .ok_or_else(|| self.error("unterminated escape"))?;
        match c {
            'n' | '\n' => out.push(b'\n'),
            'r' => out.push(b'\r'),
            't' => out.push(b'\t'),
            'a' => out.push(0x07),
            'b' => out.push(0x08),
            'f' => out.push(0x0c),
            'v' => out.push(0x0b),
            '\\' => out.push(b'\\'),
            '"' => out.push(b'"'),
            '\'' => out.push(b'\''),
            '\r' => {
                self.eat('\n');
                out.push(b'\n');
            }
            'x' => {
                let mut code = 0u8;
                for _ in 0..2 {
                    let d = self
                        .bump()
                        .and_then(|d| d.to_digit(16))
                        .ok_or_else(|| self.error("invalid hex escape"))?;
                    code = code * 16 + d as u8;
                }
                out.push(code);
            }
            'z' => {
                while self.peek().is_some_and(char::is_whitespace) {
                    self.bump();
                }
            }
            d if d.is_ascii_digit() => {
                let mut code = d.to_digit(10).unwrap_or(0);
                for _ in 0..2 {
                    match self.peek().and_then(|c| c.to_digit(10)) {
                        Some(n) => {
                            self.bump();
                            code = code * 10 + n;
                        }
                        None => break,
                    }
                }
                let byte = u8::try_from(code).map_err(|_| self.error("decimal escape too large"))?;
                out.push(byte);
            }
            other => return Err(self.error(format!("invalid escape '\\{}'", other))),
        }
        Ok(())
    }

    fn number(&mut self) -> Result<Value, ParseError> {
        let value = self.number_literal()?;
        // `0/0` is how NaN is written
        let checkpoint = (self.pos, self.line, self.column);
        let _ = self.skip_trivia();
        if self.eat('/') {
            let _ = self.skip_trivia();
            let divisor = self.number_literal()?;
            let (a, b) = (
                value.as_f64().unwrap_or_default(),
                divisor.as_f64().unwrap_or_default(),
            );
            return Ok(Value::Float(a / b));
        }
        (self.pos, self.line, self.column) = checkpoint;
        Ok(value)
    }

    fn number_literal(&mut self) -> Result<Value, ParseError> {
        let rest = self.rest();
        if rest.starts_with("0x") || rest.starts_with("0X") {
            let digits: String = rest[2..]
                .chars()
                .take_while(|c| c.is_ascii_hexdigit())
                .collect();
            if digits.is_empty() {
                return Err(self.error("malformed hex number"));
            }
            let value = u64::from_str_radix(&digits, 16)
                .map_err(|e| self.error(format!("malformed hex number: {}", e)))?;
            for _ in 0..digits.len() + 2 {
                self.bump();
            }
            return Ok(Value::Int(value as i64));
        }

        let mut end = 0;
        let mut is_float = false;
        let bytes = rest.as_bytes();
        while end < bytes.len() {
            let b = bytes[end];
            if b.is_ascii_digit() {
                end += 1;
            } else if b == b'.' {
                is_float = true;
                end += 1;
            } else if b == b'e' || b == b'E' {
                is_float = true;
                end += 1;
                if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
                    end += 1;
                }
            } else {
                break;
            }
        }
        let text = &rest[..end];
        let value = if is_float {
            text.parse::<f64>()
                .map(Value::Float)
                .map_err(|e| self.error(format!("malformed number '{}': {}", text, e)))?
        } else {
            match text.parse::<i64>() {
                Ok(i) => Value::Int(i),
                // out of i64 range: Lua would read it as a float as well
                Err(_) => text
                    .parse::<f64>()
                    .map(Value::Float)
                    .map_err(|e| self.error(format!("malformed number '{}': {}", text, e)))?,
            }
        };
        for _ in 0..end {
            self.bump();
        }
        Ok(value)
    }
}

fn push_char(out: &mut Vec<u8>, c: char) {
    let mut buf = [0u8; 4];
    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}
