//! Token shapes produced by [`JsonReader`](super::JsonReader).

use std::borrow::Cow;

/// The shape of a token, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    PropertyName,
    String,
    Number,
    Bool,
    Null,
    EndOfDocument,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BeginObject => "object",
            Self::EndObject => "end of object",
            Self::BeginArray => "array",
            Self::EndArray => "end of array",
            Self::PropertyName => "property name",
            Self::String => "string",
            Self::Number => "number",
            Self::Bool => "boolean",
            Self::Null => "null",
            Self::EndOfDocument => "end of document",
        }
    }
}

/// A single JSON token. String payloads borrow from the input unless they
/// contained escape sequences.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    PropertyName(Cow<'a, str>),
    String(Cow<'a, str>),
    /// Raw number lexeme, already checked against the JSON number grammar.
    Number(&'a str),
    Bool(bool),
    Null,
    EndOfDocument,
}

impl Token<'_> {
    pub fn kind(&self) -> TokenKind {
        match self {
            Self::BeginObject => TokenKind::BeginObject,
            Self::EndObject => TokenKind::EndObject,
            Self::BeginArray => TokenKind::BeginArray,
            Self::EndArray => TokenKind::EndArray,
            Self::PropertyName(_) => TokenKind::PropertyName,
            Self::String(_) => TokenKind::String,
            Self::Number(_) => TokenKind::Number,
            Self::Bool(_) => TokenKind::Bool,
            Self::Null => TokenKind::Null,
            Self::EndOfDocument => TokenKind::EndOfDocument,
        }
    }

    /// Short human-readable rendering used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::PropertyName(name) => format!("property `{name}`"),
            Self::String(s) => format!("string {s:?}"),
            Self::Number(n) => format!("number {n}"),
            Self::Bool(b) => format!("boolean {b}"),
            other => other.kind().as_str().to_string(),
        }
    }

    /// True for tokens that start a value (scalars and container openers).
    pub fn is_value_start(&self) -> bool {
        matches!(
            self,
            Self::BeginObject
                | Self::BeginArray
                | Self::String(_)
                | Self::Number(_)
                | Self::Bool(_)
                | Self::Null
        )
    }
}
