//! Streaming pull reader over a JSON document.
//!
//! The reader tokenizes lazily and keeps at most one token of look-ahead, so
//! a decoder can peek at the next token (for example to test for `null`)
//! without buffering anything else. It tracks its position inside the
//! document so that value errors carry a JSON Pointer to the offending
//! property.

use std::borrow::Cow;

use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

use super::token::{Token, TokenKind};
use crate::codec::primitive;
use crate::error::{CodecError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    /// Right after `{` or `[`: a key/element or the closing bracket.
    First,
    /// After a complete member: `,` or the closing bracket.
    Next,
    /// After `"key":`, objects only.
    Value,
}

#[derive(Debug)]
struct Frame {
    container: Container,
    expect: Expect,
    /// Last property name read in this object.
    key: Option<String>,
    /// Number of elements started in this array.
    len: usize,
}

impl Frame {
    fn new(container: Container) -> Self {
        Self {
            container,
            expect: Expect::First,
            key: None,
            len: 0,
        }
    }
}

/// A pull reader over a UTF-8 JSON document.
///
/// # Example
///
/// ```
/// use fabric_json_codec::json::JsonReader;
///
/// let mut reader = JsonReader::new(r#"{"NodeName":"N1","Extra":[1,2]}"#);
/// reader.enter_object().unwrap();
/// assert_eq!(reader.next_property().unwrap().as_deref(), Some("NodeName"));
/// assert_eq!(reader.read_string().unwrap(), "N1");
/// assert_eq!(reader.next_property().unwrap().as_deref(), Some("Extra"));
/// reader.skip_value().unwrap();
/// assert_eq!(reader.next_property().unwrap(), None);
/// reader.finish().unwrap();
/// ```
pub struct JsonReader<'a> {
    text: &'a str,
    uint8: &'a [u8],
    x: usize,
    /// Start offset of the most recently scanned token.
    start: usize,
    frames: Vec<Frame>,
    peeked: Option<Token<'a>>,
    /// The top-level value has been started.
    started: bool,
    base_path: String,
}

impl<'a> JsonReader<'a> {
    /// Creates a reader over a complete document.
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            uint8: text.as_bytes(),
            x: 0,
            start: 0,
            frames: Vec::new(),
            peeked: None,
            started: false,
            base_path: String::new(),
        }
    }

    /// Creates a reader over raw bytes, validating UTF-8 first.
    pub fn from_slice(data: &'a [u8]) -> Result<Self> {
        let text = std::str::from_utf8(data).map_err(|_| CodecError::InvalidUtf8)?;
        Ok(Self::new(text))
    }

    /// Prefixes every reported path with `base_path`. Used when a fragment
    /// of a larger document is decoded on its own.
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Current byte offset.
    pub fn offset(&self) -> usize {
        self.x
    }

    /// Current nesting depth (number of open objects and arrays).
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// JSON Pointer of the current position.
    pub fn path(&self) -> String {
        let mut out = self.base_path.clone();
        for frame in &self.frames {
            match frame.container {
                Container::Object => {
                    if let Some(key) = &frame.key {
                        out.push('/');
                        out.push_str(&escape_pointer_segment(key));
                    }
                }
                Container::Array => {
                    if frame.len > 0 {
                        out.push('/');
                        out.push_str(&(frame.len - 1).to_string());
                    }
                }
            }
        }
        out
    }

    /// JSON Pointer of the current position extended with `key`.
    pub fn child_path(&self, key: &str) -> String {
        format!("{}/{}", self.path(), escape_pointer_segment(key))
    }

    // ---------------------------------------------------------------------
    // Token level

    /// Returns the next token without consuming it.
    pub fn peek(&mut self) -> Result<&Token<'a>> {
        if self.peeked.is_none() {
            let token = self.scan()?;
            self.peeked = Some(token);
        }
        match &self.peeked {
            Some(token) => Ok(token),
            None => Err(self.malformed("token")),
        }
    }

    /// Kind of the next token, without consuming it.
    pub fn current_token_kind(&mut self) -> Result<TokenKind> {
        Ok(self.peek()?.kind())
    }

    /// Consumes and returns the next token.
    pub fn next_token(&mut self) -> Result<Token<'a>> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.scan(),
        }
    }

    /// Consumes `{`.
    pub fn enter_object(&mut self) -> Result<()> {
        match self.next_token()? {
            Token::BeginObject => Ok(()),
            other => Err(self.mismatch("object", &other)),
        }
    }

    /// Consumes `}`.
    pub fn exit_object(&mut self) -> Result<()> {
        match self.next_token()? {
            Token::EndObject => Ok(()),
            other => Err(self.mismatch("end of object", &other)),
        }
    }

    /// Consumes `[`.
    pub fn enter_array(&mut self) -> Result<()> {
        match self.next_token()? {
            Token::BeginArray => Ok(()),
            other => Err(self.mismatch("array", &other)),
        }
    }

    /// Consumes `]`.
    pub fn exit_array(&mut self) -> Result<()> {
        match self.next_token()? {
            Token::EndArray => Ok(()),
            other => Err(self.mismatch("end of array", &other)),
        }
    }

    /// Returns `true` and consumes `]` when the current array is exhausted.
    pub fn end_of_array(&mut self) -> Result<bool> {
        if matches!(self.peek()?, Token::EndArray) {
            self.next_token()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Reads the next property name of the current object, or `None` after
    /// consuming the closing `}`.
    pub fn next_property(&mut self) -> Result<Option<Cow<'a, str>>> {
        match self.next_token()? {
            Token::PropertyName(name) => Ok(Some(name)),
            Token::EndObject => Ok(None),
            other => Err(self.mismatch("property name", &other)),
        }
    }

    /// Reads a property name; the object must not be exhausted.
    pub fn read_property_name(&mut self) -> Result<Cow<'a, str>> {
        match self.next_token()? {
            Token::PropertyName(name) => Ok(name),
            other => Err(self.mismatch("property name", &other)),
        }
    }

    /// Consumes a `null` if one is next.
    pub fn try_read_null(&mut self) -> Result<bool> {
        if matches!(self.peek()?, Token::Null) {
            self.next_token()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Skips one complete value, however deeply nested.
    pub fn skip_value(&mut self) -> Result<()> {
        let token = self.next_token()?;
        match token {
            Token::BeginObject | Token::BeginArray => {
                let base = self.frames.len() - 1;
                while self.frames.len() > base {
                    self.next_token()?;
                }
                Ok(())
            }
            ref t if t.is_value_start() => Ok(()),
            other => Err(self.mismatch("value", &other)),
        }
    }

    /// Skips one complete value and returns its raw text.
    pub fn capture_value(&mut self) -> Result<&'a str> {
        self.peek()?;
        let begin = self.start;
        self.skip_value()?;
        Ok(&self.text[begin..self.x])
    }

    /// Checks that only whitespace follows the top-level value.
    pub fn finish(&mut self) -> Result<()> {
        match self.next_token()? {
            Token::EndOfDocument => Ok(()),
            _ => Err(CodecError::MalformedToken {
                offset: self.start,
                expected: "end of input",
            }),
        }
    }

    // ---------------------------------------------------------------------
    // Typed reads

    pub fn read_string(&mut self) -> Result<Cow<'a, str>> {
        match self.next_token()? {
            Token::String(s) => Ok(s),
            other => Err(self.mismatch("string", &other)),
        }
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        match self.next_token()? {
            Token::Bool(b) => Ok(b),
            other => Err(self.mismatch("boolean", &other)),
        }
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let lexeme = self.read_number_lexeme("32-bit integer")?;
        lexeme
            .parse::<i32>()
            .map_err(|_| self.value_error("32-bit integer", format!("number {lexeme}")))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        let lexeme = self.read_number_lexeme("64-bit integer")?;
        lexeme
            .parse::<i64>()
            .map_err(|_| self.value_error("64-bit integer", format!("number {lexeme}")))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        let lexeme = self.read_number_lexeme("number")?;
        match lexeme.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(self.value_error("finite number", format!("number {lexeme}"))),
        }
    }

    pub fn read_guid(&mut self) -> Result<Uuid> {
        let s = self.read_string()?;
        primitive::parse_guid(&s).ok_or_else(|| self.value_error("guid", format!("string {s:?}")))
    }

    pub fn read_datetime(&mut self) -> Result<DateTime<Utc>> {
        let s = self.read_string()?;
        primitive::parse_datetime(&s)
            .ok_or_else(|| self.value_error("ISO-8601 date-time", format!("string {s:?}")))
    }

    pub fn read_timespan(&mut self) -> Result<TimeDelta> {
        let s = self.read_string()?;
        primitive::parse_timespan(&s)
            .ok_or_else(|| self.value_error("ISO-8601 duration", format!("string {s:?}")))
    }

    fn read_number_lexeme(&mut self, expected: &'static str) -> Result<&'a str> {
        match self.next_token()? {
            Token::Number(n) => Ok(n),
            other => Err(self.mismatch(expected, &other)),
        }
    }

    // ---------------------------------------------------------------------
    // Errors

    /// A `MalformedValue` error at the current path.
    pub fn value_error(&self, expected: &'static str, found: impl Into<String>) -> CodecError {
        CodecError::MalformedValue {
            path: self.path(),
            expected,
            found: found.into(),
        }
    }

    fn mismatch(&self, expected: &'static str, found: &Token<'_>) -> CodecError {
        self.value_error(expected, found.describe())
    }

    fn malformed(&self, expected: &'static str) -> CodecError {
        CodecError::MalformedToken {
            offset: self.x,
            expected,
        }
    }

    // ---------------------------------------------------------------------
    // Scanner

    fn scan(&mut self) -> Result<Token<'a>> {
        self.skip_ws();
        self.start = self.x;
        let Some(frame) = self.frames.last() else {
            if self.started {
                return if self.x == self.uint8.len() {
                    Ok(Token::EndOfDocument)
                } else {
                    Err(self.malformed("end of input"))
                };
            }
            self.started = true;
            return self.scan_value();
        };
        let (container, expect) = (frame.container, frame.expect);

        match (container, expect) {
            (Container::Object, Expect::First) => {
                if self.byte() == Some(b'}') {
                    return Ok(self.close());
                }
                self.scan_key()
            }
            (Container::Object, Expect::Next) => match self.byte() {
                Some(b'}') => Ok(self.close()),
                Some(b',') => {
                    self.x += 1;
                    self.skip_ws();
                    self.start = self.x;
                    self.scan_key()
                }
                _ => Err(self.malformed("`,` or `}`")),
            },
            (Container::Object, Expect::Value) => {
                self.mark_member();
                self.scan_value()
            }
            (Container::Array, Expect::First) => {
                if self.byte() == Some(b']') {
                    return Ok(self.close());
                }
                self.mark_member();
                self.scan_value()
            }
            (Container::Array, Expect::Next) => match self.byte() {
                Some(b']') => Ok(self.close()),
                Some(b',') => {
                    self.x += 1;
                    self.skip_ws();
                    self.start = self.x;
                    self.mark_member();
                    self.scan_value()
                }
                _ => Err(self.malformed("`,` or `]`")),
            },
            (Container::Array, Expect::Value) => Err(self.malformed("array element")),
        }
    }

    /// Records that a member of the innermost container has started.
    fn mark_member(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            frame.expect = Expect::Next;
            if frame.container == Container::Array {
                frame.len += 1;
            }
        }
    }

    fn close(&mut self) -> Token<'a> {
        self.x += 1;
        match self.frames.pop().map(|f| f.container) {
            Some(Container::Array) => Token::EndArray,
            _ => Token::EndObject,
        }
    }

    fn scan_key(&mut self) -> Result<Token<'a>> {
        if self.byte() != Some(b'"') {
            return Err(self.malformed("property name"));
        }
        let name = self.scan_string()?;
        self.skip_ws();
        if self.byte() != Some(b':') {
            return Err(self.malformed("`:`"));
        }
        self.x += 1;
        if let Some(frame) = self.frames.last_mut() {
            frame.expect = Expect::Value;
            frame.key = Some(name.clone().into_owned());
        }
        Ok(Token::PropertyName(name))
    }

    fn scan_value(&mut self) -> Result<Token<'a>> {
        match self.byte() {
            Some(b'{') => {
                self.x += 1;
                self.frames.push(Frame::new(Container::Object));
                Ok(Token::BeginObject)
            }
            Some(b'[') => {
                self.x += 1;
                self.frames.push(Frame::new(Container::Array));
                Ok(Token::BeginArray)
            }
            Some(b'"') => Ok(Token::String(self.scan_string()?)),
            Some(b't') => self.scan_literal("true", Token::Bool(true)),
            Some(b'f') => self.scan_literal("false", Token::Bool(false)),
            Some(b'n') => self.scan_literal("null", Token::Null),
            Some(b'-' | b'0'..=b'9') => Ok(Token::Number(self.scan_number()?)),
            _ => Err(self.malformed("value")),
        }
    }

    fn scan_literal(&mut self, literal: &'static str, token: Token<'a>) -> Result<Token<'a>> {
        let end = self.x + literal.len();
        if self.uint8.get(self.x..end) == Some(literal.as_bytes()) {
            self.x = end;
            Ok(token)
        } else {
            Err(self.malformed(literal))
        }
    }

    fn scan_number(&mut self) -> Result<&'a str> {
        let begin = self.x;
        if self.byte() == Some(b'-') {
            self.x += 1;
        }
        match self.byte() {
            Some(b'0') => self.x += 1,
            Some(b'1'..=b'9') => self.skip_digits(),
            _ => return Err(self.malformed("digit")),
        }
        if self.byte() == Some(b'.') {
            self.x += 1;
            if !matches!(self.byte(), Some(b'0'..=b'9')) {
                return Err(self.malformed("digit"));
            }
            self.skip_digits();
        }
        if matches!(self.byte(), Some(b'e' | b'E')) {
            self.x += 1;
            if matches!(self.byte(), Some(b'+' | b'-')) {
                self.x += 1;
            }
            if !matches!(self.byte(), Some(b'0'..=b'9')) {
                return Err(self.malformed("digit"));
            }
            self.skip_digits();
        }
        Ok(&self.text[begin..self.x])
    }

    fn skip_digits(&mut self) {
        while matches!(self.byte(), Some(b'0'..=b'9')) {
            self.x += 1;
        }
    }

    /// Scans a string starting at its opening quote.
    fn scan_string(&mut self) -> Result<Cow<'a, str>> {
        self.x += 1;
        let begin = self.x;
        loop {
            match self.byte() {
                Some(b'"') => {
                    let s = &self.text[begin..self.x];
                    self.x += 1;
                    return Ok(Cow::Borrowed(s));
                }
                Some(b'\\') => break,
                Some(b) if b < 0x20 => return Err(self.malformed("escaped control character")),
                Some(_) => self.x += 1,
                None => return Err(self.malformed("`\"`")),
            }
        }

        let mut out = String::from(&self.text[begin..self.x]);
        loop {
            match self.byte() {
                Some(b'"') => {
                    self.x += 1;
                    return Ok(Cow::Owned(out));
                }
                Some(b'\\') => {
                    self.x += 1;
                    self.scan_escape(&mut out)?;
                }
                Some(b) if b < 0x20 => return Err(self.malformed("escaped control character")),
                Some(_) => {
                    let run = self.x;
                    while matches!(self.byte(), Some(b) if b != b'"' && b != b'\\' && b >= 0x20) {
                        self.x += 1;
                    }
                    out.push_str(&self.text[run..self.x]);
                }
                None => return Err(self.malformed("`\"`")),
            }
        }
    }

    fn scan_escape(&mut self, out: &mut String) -> Result<()> {
        let Some(b) = self.byte() else {
            return Err(self.malformed("escape sequence"));
        };
        self.x += 1;
        match b {
            b'"' => out.push('"'),
            b'\\' => out.push('\\'),
            b'/' => out.push('/'),
            b'b' => out.push('\u{0008}'),
            b'f' => out.push('\u{000C}'),
            b'n' => out.push('\n'),
            b'r' => out.push('\r'),
            b't' => out.push('\t'),
            b'u' => {
                let hi = self.scan_hex4()?;
                let code = if (0xD800..0xDC00).contains(&hi) {
                    if self.uint8.get(self.x..self.x + 2) != Some(b"\\u") {
                        return Err(self.malformed("low surrogate"));
                    }
                    self.x += 2;
                    let lo = self.scan_hex4()?;
                    if !(0xDC00..0xE000).contains(&lo) {
                        return Err(self.malformed("low surrogate"));
                    }
                    0x10000 + ((hi - 0xD800) << 10) + (lo - 0xDC00)
                } else {
                    hi
                };
                match char::from_u32(code) {
                    Some(c) => out.push(c),
                    None => return Err(self.malformed("unicode scalar value")),
                }
            }
            _ => return Err(self.malformed("escape sequence")),
        }
        Ok(())
    }

    fn scan_hex4(&mut self) -> Result<u32> {
        let digits = self
            .text
            .get(self.x..self.x + 4)
            .ok_or_else(|| self.malformed("4 hex digits"))?;
        let code = u32::from_str_radix(digits, 16).map_err(|_| self.malformed("4 hex digits"))?;
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(self.malformed("4 hex digits"));
        }
        self.x += 4;
        Ok(code)
    }

    fn skip_ws(&mut self) {
        while matches!(self.byte(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.x += 1;
        }
    }

    #[inline]
    fn byte(&self) -> Option<u8> {
        self.uint8.get(self.x).copied()
    }
}

/// Escapes a JSON Pointer reference token (RFC 6901).
pub fn escape_pointer_segment(segment: &str) -> Cow<'_, str> {
    if segment.contains(['~', '/']) {
        Cow::Owned(segment.replace('~', "~0").replace('/', "~1"))
    } else {
        Cow::Borrowed(segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Result<Vec<Token<'_>>> {
        let mut reader = JsonReader::new(text);
        let mut out = Vec::new();
        loop {
            let token = reader.next_token()?;
            if token == Token::EndOfDocument {
                return Ok(out);
            }
            out.push(token);
        }
    }

    #[test]
    fn tokenizes_nested_document() {
        let out = tokens(r#" {"a": [1, -2.5e3, true], "b": {"c": null}, "d": "x"} "#).unwrap();
        assert_eq!(
            out,
            vec![
                Token::BeginObject,
                Token::PropertyName("a".into()),
                Token::BeginArray,
                Token::Number("1"),
                Token::Number("-2.5e3"),
                Token::Bool(true),
                Token::EndArray,
                Token::PropertyName("b".into()),
                Token::BeginObject,
                Token::PropertyName("c".into()),
                Token::Null,
                Token::EndObject,
                Token::PropertyName("d".into()),
                Token::String("x".into()),
                Token::EndObject,
            ]
        );
    }

    #[test]
    fn unescapes_strings() {
        let out = tokens(r#""a\"b\\c\/d\né😀""#).unwrap();
        assert_eq!(out, vec![Token::String("a\"b\\c/d\né😀".into())]);
    }

    #[test]
    fn borrows_unescaped_strings() {
        let mut reader = JsonReader::new(r#""plain""#);
        match reader.next_token().unwrap() {
            Token::String(Cow::Borrowed(s)) => assert_eq!(s, "plain"),
            other => panic!("expected borrowed string, got {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_documents() {
        for text in [
            "{",
            "[1,]",
            r#"{"a":1,}"#,
            r#"{"a" 1}"#,
            "01",
            "-",
            "1.",
            "tru",
            r#""\x""#,
            r#""\ud83d""#,
            "[1 2]",
            "{} {}",
            "\"a\nb\"",
        ] {
            assert!(tokens(text).is_err(), "expected failure for {text:?}");
        }
    }

    #[test]
    fn malformed_token_reports_offset() {
        let err = tokens("[1, x]").unwrap_err();
        match err {
            CodecError::MalformedToken { offset, .. } => assert_eq!(offset, 4),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn peek_does_not_consume() {
        let mut reader = JsonReader::new("[null, 1]");
        reader.enter_array().unwrap();
        assert_eq!(reader.current_token_kind().unwrap(), TokenKind::Null);
        assert_eq!(reader.current_token_kind().unwrap(), TokenKind::Null);
        assert!(reader.try_read_null().unwrap());
        assert!(!reader.try_read_null().unwrap());
        assert_eq!(reader.read_i32().unwrap(), 1);
        assert!(reader.end_of_array().unwrap());
        reader.finish().unwrap();
    }

    #[test]
    fn skip_and_capture_values() {
        let mut reader = JsonReader::new(r#"{"skip":{"x":[1,{"y":2}]},"keep": [ 1 , 2 ],"z":3}"#);
        reader.enter_object().unwrap();
        reader.read_property_name().unwrap();
        reader.skip_value().unwrap();
        reader.read_property_name().unwrap();
        assert_eq!(reader.capture_value().unwrap(), "[ 1 , 2 ]");
        assert_eq!(reader.read_property_name().unwrap(), "z");
        assert_eq!(reader.read_i64().unwrap(), 3);
        reader.exit_object().unwrap();
        reader.finish().unwrap();
    }

    #[test]
    fn path_tracks_keys_and_indices() {
        let mut reader = JsonReader::new(r#"{"Items":[{"a/b":"x"},{"Id":"not-a-guid"}]}"#);
        reader.enter_object().unwrap();
        reader.read_property_name().unwrap();
        reader.enter_array().unwrap();
        reader.skip_value().unwrap();
        reader.enter_object().unwrap();
        reader.read_property_name().unwrap();
        let err = reader.read_guid().unwrap_err();
        assert_eq!(err.path(), Some("/Items/1/Id"));

        let mut reader = JsonReader::new(r#"{"a/b~":1}"#).with_base_path("/Root");
        reader.enter_object().unwrap();
        reader.read_property_name().unwrap();
        assert_eq!(reader.path(), "/Root/a~1b~0");
    }

    #[test]
    fn integer_reads_are_strict() {
        let mut reader = JsonReader::new("[1.5, 2147483648, 9223372036854775807]");
        reader.enter_array().unwrap();
        assert!(reader.read_i32().is_err());
        assert!(reader.read_i32().is_err());
        assert_eq!(reader.read_i64().unwrap(), i64::MAX);
    }

    #[test]
    fn from_slice_rejects_invalid_utf8() {
        assert!(matches!(
            JsonReader::from_slice(&[b'"', 0xff, b'"']),
            Err(CodecError::InvalidUtf8)
        ));
    }
}
