//! Field tables: field types, field descriptors, type and enum descriptors.

use std::fmt;
use std::str::FromStr;

use indexmap::{IndexMap, IndexSet};

use crate::error::SchemaError;

/// Semantic type of a field, as carried on the wire.
///
/// The textual form (see [`Display`](fmt::Display) and [`FromStr`]) is the
/// grammar used by schema documents: `string`, `bool`, `int32`, `int64`,
/// `double`, `guid`, `date-time`, `duration`, `bytes`, `any`, `enum:Name`,
/// `ref:TypeId`, `list<T>`, `pairs<T>` and `map<T>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Str,
    Bool,
    Int,
    Long,
    Double,
    Guid,
    DateTime,
    TimeSpan,
    /// JSON array of integers in `0..=255`.
    Bytes,
    /// Raw JSON subtree, kept as-is.
    Any,
    /// Closed set of string literals, by enum name.
    Enum(String),
    /// Nested object decoded through a registered type (or family).
    Object(String),
    List(Box<FieldType>),
    /// String-keyed map carried as `[{"Key": k, "Value": v}, ...]`.
    PairMap(Box<FieldType>),
    /// String-keyed map carried as a JSON object.
    Map(Box<FieldType>),
}

impl FieldType {
    pub fn enumeration(name: impl Into<String>) -> Self {
        Self::Enum(name.into())
    }

    pub fn object(type_id: impl Into<String>) -> Self {
        Self::Object(type_id.into())
    }

    pub fn list(item: FieldType) -> Self {
        Self::List(Box::new(item))
    }

    pub fn pairs(value: FieldType) -> Self {
        Self::PairMap(Box::new(value))
    }

    pub fn map(value: FieldType) -> Self {
        Self::Map(Box::new(value))
    }

    /// Visits this type and every type nested in it.
    pub fn walk<'t>(&'t self, visit: &mut impl FnMut(&'t FieldType)) {
        visit(self);
        match self {
            Self::List(inner) | Self::PairMap(inner) | Self::Map(inner) => inner.walk(visit),
            _ => {}
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str => f.write_str("string"),
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int32"),
            Self::Long => f.write_str("int64"),
            Self::Double => f.write_str("double"),
            Self::Guid => f.write_str("guid"),
            Self::DateTime => f.write_str("date-time"),
            Self::TimeSpan => f.write_str("duration"),
            Self::Bytes => f.write_str("bytes"),
            Self::Any => f.write_str("any"),
            Self::Enum(name) => write!(f, "enum:{name}"),
            Self::Object(id) => write!(f, "ref:{id}"),
            Self::List(inner) => write!(f, "list<{inner}>"),
            Self::PairMap(inner) => write!(f, "pairs<{inner}>"),
            Self::Map(inner) => write!(f, "map<{inner}>"),
        }
    }
}

impl FromStr for FieldType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SchemaError::InvalidFieldType(s.to_string());
        let s = s.trim();
        if let Some(name) = s.strip_prefix("enum:") {
            return if name.is_empty() {
                Err(invalid())
            } else {
                Ok(Self::Enum(name.to_string()))
            };
        }
        if let Some(id) = s.strip_prefix("ref:") {
            return if id.is_empty() {
                Err(invalid())
            } else {
                Ok(Self::Object(id.to_string()))
            };
        }
        if let Some((head, rest)) = s.split_once('<') {
            let inner = rest.strip_suffix('>').ok_or_else(invalid)?;
            let inner = Box::new(inner.parse::<FieldType>()?);
            return match head {
                "list" => Ok(Self::List(inner)),
                "pairs" => Ok(Self::PairMap(inner)),
                "map" => Ok(Self::Map(inner)),
                _ => Err(invalid()),
            };
        }
        match s {
            "string" => Ok(Self::Str),
            "bool" => Ok(Self::Bool),
            "int32" => Ok(Self::Int),
            "int64" => Ok(Self::Long),
            "double" => Ok(Self::Double),
            "guid" => Ok(Self::Guid),
            "date-time" => Ok(Self::DateTime),
            "duration" => Ok(Self::TimeSpan),
            "bytes" => Ok(Self::Bytes),
            "any" => Ok(Self::Any),
            _ => Err(invalid()),
        }
    }
}

/// One wire property of a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub wire_name: String,
    pub field_type: FieldType,
    /// Always written on encode. Decode stays lenient and leaves a missing
    /// required field absent.
    pub required: bool,
}

impl FieldDescriptor {
    pub fn required(wire_name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            wire_name: wire_name.into(),
            field_type,
            required: true,
        }
    }

    pub fn optional(wire_name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            wire_name: wire_name.into(),
            field_type,
            required: false,
        }
    }
}

/// Metadata of one registered type, with inherited fields already expanded.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    pub(crate) id: String,
    pub(crate) parent: Option<String>,
    pub(crate) discriminator: Option<String>,
    pub(crate) tag: Option<String>,
    pub(crate) is_abstract: bool,
    pub(crate) fields: IndexMap<String, FieldDescriptor>,
    /// Tag → direct child whose subtree declares that tag.
    pub(crate) dispatch: IndexMap<String, String>,
    /// Fields some subtype redeclares with a different field type.
    pub(crate) retyped_below: IndexSet<String>,
}

impl TypeDescriptor {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Name of the discriminator property of the family this type belongs to.
    pub fn discriminator(&self) -> Option<&str> {
        self.discriminator.as_deref()
    }

    /// Discriminator value naming this type.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// True when decoding through this type re-dispatches on the
    /// discriminator.
    pub fn is_polymorphic(&self) -> bool {
        !self.dispatch.is_empty()
    }

    pub fn dispatch_table(&self) -> &IndexMap<String, String> {
        &self.dispatch
    }

    /// True when a subtype declares `wire_name` with another field type, so
    /// its value cannot be decoded until the discriminator is known.
    pub fn is_retyped_below(&self, wire_name: &str) -> bool {
        self.retyped_below.contains(wire_name)
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    pub fn field(&self, wire_name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(wire_name)
    }

    pub fn field_index(&self, wire_name: &str) -> Option<usize> {
        self.fields.get_index_of(wire_name)
    }

    pub fn field_at(&self, index: usize) -> Option<&FieldDescriptor> {
        self.fields.get_index(index).map(|(_, field)| field)
    }
}

/// A closed set of enum literals, compared ordinally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
    pub(crate) name: String,
    pub(crate) values: IndexSet<String>,
}

impl EnumDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.contains(value)
    }

    /// Declaration index of `value`.
    pub fn position(&self, value: &str) -> Option<usize> {
        self.values.get_index_of(value)
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_type_text_form() {
        let cases = [
            ("string", FieldType::Str),
            ("int64", FieldType::Long),
            ("date-time", FieldType::DateTime),
            ("duration", FieldType::TimeSpan),
            ("enum:HealthState", FieldType::enumeration("HealthState")),
            ("ref:NodeEvent", FieldType::object("NodeEvent")),
            (
                "list<ref:HealthEvaluationWrapper>",
                FieldType::list(FieldType::object("HealthEvaluationWrapper")),
            ),
            ("pairs<string>", FieldType::pairs(FieldType::Str)),
            (
                "map<list<int32>>",
                FieldType::map(FieldType::list(FieldType::Int)),
            ),
        ];
        for (text, expected) in cases {
            let parsed: FieldType = text.parse().unwrap();
            assert_eq!(parsed, expected);
            assert_eq!(parsed.to_string(), text);
        }
    }

    #[test]
    fn field_type_rejects_unknown_forms() {
        for text in ["", "int", "ref:", "enum:", "list<string", "set<string>", "list<>"] {
            assert!(text.parse::<FieldType>().is_err(), "{text}");
        }
    }

    #[test]
    fn walk_visits_nested_types() {
        let ty = FieldType::map(FieldType::list(FieldType::object("X")));
        let mut seen = Vec::new();
        ty.walk(&mut |t| seen.push(t.to_string()));
        assert_eq!(seen, vec!["map<list<ref:X>>", "list<ref:X>", "ref:X"]);
    }
}
