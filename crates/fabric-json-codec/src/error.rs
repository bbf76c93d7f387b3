//! Codec error types.

use thiserror::Error;

/// Errors raised while decoding or encoding a payload.
///
/// Every variant is fatal for the call that produced it. `path` fields are
/// JSON Pointers into the wire document (`""` is the root).
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed JSON at byte {offset}: expected {expected}")]
    MalformedToken {
        offset: usize,
        expected: &'static str,
    },
    #[error("invalid UTF-8")]
    InvalidUtf8,
    #[error("malformed value at `{path}`: expected {expected}, found {found}")]
    MalformedValue {
        path: String,
        expected: &'static str,
        found: String,
    },
    #[error("unknown discriminator `{value}` for `{family}` at `{path}`")]
    UnknownDiscriminator {
        family: String,
        value: String,
        path: String,
    },
    #[error("missing discriminator property `{property}` for `{family}` at `{path}`")]
    MissingDiscriminatorProperty {
        family: String,
        property: String,
        path: String,
    },
    #[error("unknown {enum_name} value `{value}` at `{path}`")]
    UnknownEnumValue {
        enum_name: String,
        value: String,
        path: String,
    },
    #[error("missing required field `{field}` of `{type_id}` at `{path}`")]
    MissingRequiredField {
        type_id: String,
        field: String,
        path: String,
    },
    #[error("type mismatch at `{path}`: expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },
    #[error("duplicate key `{key}` at `{path}`")]
    DuplicateKey { key: String, path: String },
    #[error("nesting deeper than {limit} at `{path}`")]
    DepthLimitExceeded { limit: usize, path: String },
    #[error("unknown type `{0}`")]
    UnknownType(String),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CodecError {
    /// Wire path the error points at, when it carries one.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::MalformedValue { path, .. }
            | Self::UnknownDiscriminator { path, .. }
            | Self::MissingDiscriminatorProperty { path, .. }
            | Self::UnknownEnumValue { path, .. }
            | Self::MissingRequiredField { path, .. }
            | Self::TypeMismatch { path, .. }
            | Self::DuplicateKey { path, .. }
            | Self::DepthLimitExceeded { path, .. } => Some(path),
            Self::MalformedToken { .. }
            | Self::InvalidUtf8
            | Self::UnknownType(_)
            | Self::Serialize(_) => None,
        }
    }
}

/// Errors raised while building a [`Registry`](crate::schema::Registry).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("empty identifier")]
    EmptyId,
    #[error("`{0}` is defined more than once")]
    DuplicateDefinition(String),
    #[error("`{type_id}` extends unknown type `{parent}`")]
    UnknownParent { type_id: String, parent: String },
    #[error("inheritance cycle through `{0}`")]
    Cycle(String),
    #[error("`{type_id}` references unknown {kind} `{target}`")]
    UnresolvedReference {
        type_id: String,
        kind: &'static str,
        target: String,
    },
    #[error("`{type_id}` declares tag `{tag}` but its family has no discriminator")]
    TagWithoutDiscriminator { type_id: String, tag: String },
    #[error("tag `{tag}` is declared by both `{first}` and `{second}`")]
    DuplicateTag {
        tag: String,
        first: String,
        second: String,
    },
    #[error("`{type_id}` declares field `{field}` more than once")]
    DuplicateField { type_id: String, field: String },
    #[error("`{type_id}` redeclares the discriminator `{field}` as a field")]
    DiscriminatorAsField { type_id: String, field: String },
    #[error("invalid field type `{0}`")]
    InvalidFieldType(String),
}

pub type Result<T, E = CodecError> = std::result::Result<T, E>;
