//! Encode engine: [`Value`] graphs to wire JSON.
//!
//! Objects are written discriminator first, then every required field in
//! declaration order, then the present optional fields in declaration order.
//! Values are checked against the declared field types as they are written.

use std::fmt;

use crate::error::{CodecError, Result};
use crate::json::{escape_pointer_segment, JsonWriter};
use crate::options::CodecOptions;
use crate::schema::{FieldType, Registry};
use crate::value::{Record, Value};

/// Position of the value being written, rendered as a JSON Pointer only
/// when an error needs it.
#[derive(Debug, Clone, Copy)]
pub(crate) enum PathNode<'p> {
    Root,
    Key(&'p PathNode<'p>, &'p str),
    Index(&'p PathNode<'p>, usize),
}

impl fmt::Display for PathNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => Ok(()),
            Self::Key(parent, key) => write!(f, "{parent}/{}", escape_pointer_segment(key)),
            Self::Index(parent, index) => write!(f, "{parent}/{index}"),
        }
    }
}

pub(crate) struct Encoder<'r> {
    registry: &'r Registry,
    options: &'r CodecOptions,
}

impl<'r> Encoder<'r> {
    pub(crate) fn new(registry: &'r Registry, options: &'r CodecOptions) -> Self {
        Self { registry, options }
    }

    pub(super) fn check_depth(&self, path: &PathNode<'_>, depth: usize) -> Result<()> {
        if depth > self.options.max_depth {
            return Err(CodecError::DepthLimitExceeded {
                limit: self.options.max_depth,
                path: path.to_string(),
            });
        }
        Ok(())
    }

    /// Writes `value` as `field_type`. `depth` is the nesting of the
    /// enclosing container.
    pub(crate) fn encode_value(
        &self,
        writer: &mut JsonWriter,
        field_type: &FieldType,
        value: &Value,
        path: &PathNode<'_>,
        depth: usize,
    ) -> Result<()> {
        match (field_type, value) {
            (FieldType::Str, Value::String(s)) => writer.write_str(s)?,
            (FieldType::Bool, Value::Bool(b)) => writer.write_bool(*b),
            (FieldType::Int, Value::Int(n)) => writer.write_i32(*n),
            (FieldType::Long, Value::Long(n)) => writer.write_i64(*n),
            (FieldType::Double, Value::Double(n)) => {
                if !n.is_finite() {
                    return Err(CodecError::MalformedValue {
                        path: path.to_string(),
                        expected: "finite number",
                        found: n.to_string(),
                    });
                }
                writer.write_f64(*n)?;
            }
            (FieldType::Guid, Value::Guid(g)) => writer.write_guid(g)?,
            (FieldType::DateTime, Value::DateTime(d)) => writer.write_datetime(d)?,
            (FieldType::TimeSpan, Value::TimeSpan(d)) => writer.write_timespan(d)?,
            (FieldType::Bytes, Value::Bytes(bytes)) => {
                self.encode_bytes(writer, bytes, path, depth + 1)?
            }
            (FieldType::Any, Value::Json(json)) => writer.write_json(json)?,
            (FieldType::Enum(name), Value::Enum(literal)) => {
                let descriptor = self
                    .registry
                    .enum_descriptor(name)
                    .ok_or_else(|| CodecError::UnknownType(name.clone()))?;
                if !descriptor.contains(literal) {
                    return Err(CodecError::UnknownEnumValue {
                        enum_name: name.clone(),
                        value: literal.clone(),
                        path: path.to_string(),
                    });
                }
                writer.write_str(literal)?;
            }
            (FieldType::Object(type_id), Value::Record(record)) => {
                if !self.registry.is_subtype(record.type_id(), type_id) {
                    return Err(CodecError::TypeMismatch {
                        path: path.to_string(),
                        expected: format!("`{type_id}` or a subtype"),
                        found: format!("`{}`", record.type_id()),
                    });
                }
                self.encode_record(writer, record, path, depth + 1)?;
            }
            (FieldType::List(item), Value::List(items)) => {
                self.encode_list(writer, item, items, path, depth + 1)?
            }
            (FieldType::PairMap(value_type), Value::Map(map)) => {
                self.encode_pairs(writer, value_type, map, path, depth + 1)?
            }
            (FieldType::Map(value_type), Value::Map(map)) => {
                self.encode_map(writer, value_type, map, path, depth + 1)?
            }
            (expected, found) => {
                return Err(CodecError::TypeMismatch {
                    path: path.to_string(),
                    expected: expected.to_string(),
                    found: found.kind().to_string(),
                })
            }
        }
        Ok(())
    }

    pub(crate) fn encode_record(
        &self,
        writer: &mut JsonWriter,
        record: &Record,
        path: &PathNode<'_>,
        depth: usize,
    ) -> Result<()> {
        self.check_depth(path, depth)?;
        let descriptor = record.descriptor();
        if descriptor.is_abstract() {
            return Err(CodecError::TypeMismatch {
                path: path.to_string(),
                expected: "a concrete type".to_string(),
                found: format!("abstract `{}`", descriptor.id()),
            });
        }

        writer.begin_object();
        if let (Some(discriminator), Some(tag)) = (descriptor.discriminator(), descriptor.tag()) {
            writer.property_name(discriminator)?;
            writer.write_str(tag)?;
        }
        for required in [true, false] {
            for (field, value) in record.fields().filter(|(f, _)| f.required == required) {
                match value {
                    Some(value) => {
                        writer.property_name(&field.wire_name)?;
                        let field_path = PathNode::Key(path, &field.wire_name);
                        self.encode_value(writer, &field.field_type, value, &field_path, depth)?;
                    }
                    None if required => {
                        return Err(CodecError::MissingRequiredField {
                            type_id: descriptor.id().to_string(),
                            field: field.wire_name.clone(),
                            path: path.to_string(),
                        });
                    }
                    None => {}
                }
            }
        }
        writer.end_object();
        Ok(())
    }
}
