//! Decode and encode engines behind a [`Codec`] facade.

mod collection;
mod decode;
mod encode;
pub mod primitive;

use std::sync::Arc;

use crate::error::{CodecError, Result};
use crate::json::{JsonReader, JsonWriter};
use crate::options::CodecOptions;
use crate::schema::Registry;
use crate::value::{Record, Value};

use decode::Decoder;
use encode::{Encoder, PathNode};

/// Decodes and encodes values of the types held by a [`Registry`].
///
/// Names passed to the entry points may be type ids, enum names or aliases.
/// A codec keeps no state between calls and can be cloned or shared across
/// threads.
///
/// ```
/// use std::sync::Arc;
/// use fabric_json_codec::{Codec, FieldType, SchemaBuilder};
///
/// let mut schema = SchemaBuilder::new();
/// schema.family("Shape", "Kind");
/// schema.object("Circle").extends("Shape").tag("Circle").required("Radius", FieldType::Double);
/// let codec = Codec::new(Arc::new(schema.build().unwrap()));
///
/// let value = codec.decode("Shape", r#"{"Radius": 2.5, "Kind": "Circle"}"#).unwrap();
/// let record = value.as_record().unwrap();
/// assert_eq!(record.type_id(), "Circle");
/// assert_eq!(codec.encode(&value).unwrap(), r#"{"Kind":"Circle","Radius":2.5}"#);
/// ```
#[derive(Debug, Clone)]
pub struct Codec {
    registry: Arc<Registry>,
    options: CodecOptions,
}

impl Codec {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            options: CodecOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CodecOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    fn decoder(&self) -> Decoder<'_> {
        Decoder::new(&self.registry, &self.options)
    }

    fn encoder(&self) -> Encoder<'_> {
        Encoder::new(&self.registry, &self.options)
    }

    // ---------------------------------------------------------------------
    // Decode

    /// Decodes a document holding a value of `name`. A top-level `null` is
    /// an error; see [`decode_optional`](Self::decode_optional).
    pub fn decode(&self, name: &str, text: &str) -> Result<Value> {
        self.decode_optional(name, text)?.ok_or_else(null_document)
    }

    /// Decodes a document; a top-level `null` yields `None`.
    pub fn decode_optional(&self, name: &str, text: &str) -> Result<Option<Value>> {
        self.decode_document(name, JsonReader::new(text))
    }

    /// Like [`decode`](Self::decode) over raw bytes, validating UTF-8 first.
    pub fn decode_slice(&self, name: &str, data: &[u8]) -> Result<Value> {
        self.decode_document(name, JsonReader::from_slice(data)?)?
            .ok_or_else(null_document)
    }

    /// Decodes a document that must hold a record of `type_id`.
    pub fn decode_record(&self, type_id: &str, text: &str) -> Result<Record> {
        match self.decode(type_id, text)? {
            Value::Record(record) => Ok(record),
            other => Err(CodecError::TypeMismatch {
                path: String::new(),
                expected: "record".to_string(),
                found: other.kind().to_string(),
            }),
        }
    }

    /// Decodes the next value from a reader the caller holds open. Trailing
    /// content is left for the caller.
    pub fn decode_from(&self, name: &str, reader: &mut JsonReader<'_>) -> Result<Option<Value>> {
        let field_type = self.registry.resolve(name)?;
        self.decoder().decode_value(reader, &field_type, 0)
    }

    fn decode_document(&self, name: &str, mut reader: JsonReader<'_>) -> Result<Option<Value>> {
        let value = self.decode_from(name, &mut reader)?;
        if self.options.reject_trailing_content {
            reader.finish()?;
        }
        Ok(value)
    }

    // ---------------------------------------------------------------------
    // Encode

    /// Encodes a record as its own type.
    pub fn encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::Record(record) => self.encode_record(record),
            other => Err(CodecError::TypeMismatch {
                path: String::new(),
                expected: "record".to_string(),
                found: other.kind().to_string(),
            }),
        }
    }

    pub fn encode_record(&self, record: &Record) -> Result<String> {
        let mut writer = JsonWriter::new();
        self.encoder()
            .encode_record(&mut writer, record, &PathNode::Root, 1)?;
        Ok(writer.finish())
    }

    /// Encodes `value` as `name` (a type id, enum or alias).
    pub fn encode_as(&self, name: &str, value: &Value) -> Result<String> {
        let mut writer = JsonWriter::new();
        self.encode_to(&mut writer, name, value)?;
        Ok(writer.finish())
    }

    /// Encodes an optional value; `None` is written as `null`.
    pub fn encode_optional(&self, name: &str, value: Option<&Value>) -> Result<String> {
        match value {
            Some(value) => self.encode_as(name, value),
            None => {
                self.registry.resolve(name)?;
                let mut writer = JsonWriter::new();
                writer.write_null();
                Ok(writer.finish())
            }
        }
    }

    /// Appends `value` as `name` to a writer the caller holds open.
    pub fn encode_to(&self, writer: &mut JsonWriter, name: &str, value: &Value) -> Result<()> {
        let field_type = self.registry.resolve(name)?;
        self.encoder()
            .encode_value(writer, &field_type, value, &PathNode::Root, 0)
    }
}

fn null_document() -> CodecError {
    CodecError::MalformedValue {
        path: String::new(),
        expected: "value",
        found: "null".to_string(),
    }
}
