//! Decoded value graph.
//!
//! A [`Record`] is an immutable instance of a registered type: one slot per
//! field of its descriptor, `None` meaning the field was absent on the wire.
//! Absent is never replaced by a default, so an omitted `false` or `0` stays
//! distinguishable from a present one.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use indexmap::IndexMap;
use uuid::Uuid;

use crate::error::{CodecError, Result};
use crate::schema::{FieldDescriptor, TypeDescriptor};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Bool(bool),
    Int(i32),
    Long(i64),
    Double(f64),
    Guid(Uuid),
    DateTime(DateTime<Utc>),
    TimeSpan(TimeDelta),
    Bytes(Vec<u8>),
    /// Enum literal, by name.
    Enum(String),
    List(Vec<Value>),
    /// Ordered string-keyed map (pair lists and JSON-object maps).
    Map(IndexMap<String, Value>),
    Record(Record),
    /// Untyped JSON subtree.
    Json(serde_json::Value),
}

impl Value {
    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int32",
            Self::Long(_) => "int64",
            Self::Double(_) => "double",
            Self::Guid(_) => "guid",
            Self::DateTime(_) => "date-time",
            Self::TimeSpan(_) => "duration",
            Self::Bytes(_) => "bytes",
            Self::Enum(_) => "enum",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Record(_) => "record",
            Self::Json(_) => "any",
        }
    }

    pub fn enumeration(name: impl Into<String>) -> Self {
        Self::Enum(name.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Long(n) => Some(*n),
            Self::Int(n) => Some(i64::from(*n)),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_guid(&self) -> Option<&Uuid> {
        match self {
            Self::Guid(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::DateTime(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_timespan(&self) -> Option<&TimeDelta> {
        match self {
            Self::TimeSpan(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&str> {
        match self {
            Self::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn into_record(self) -> Option<Record> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Self::Guid(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::DateTime(v)
    }
}

impl From<TimeDelta> for Value {
    fn from(v: TimeDelta) -> Self {
        Self::TimeSpan(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(v: IndexMap<String, Value>) -> Self {
        Self::Map(v)
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Self::Record(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Self::Json(v)
    }
}

/// An instance of a registered type.
#[derive(Debug, Clone)]
pub struct Record {
    descriptor: Arc<TypeDescriptor>,
    slots: Vec<Option<Value>>,
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor.id() == other.descriptor.id() && self.slots == other.slots
    }
}

impl Record {
    pub(crate) fn from_slots(descriptor: Arc<TypeDescriptor>, slots: Vec<Option<Value>>) -> Self {
        debug_assert_eq!(descriptor.field_count(), slots.len());
        Self { descriptor, slots }
    }

    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    pub fn type_id(&self) -> &str {
        self.descriptor.id()
    }

    /// Discriminator value of the record's type, if it belongs to a family.
    pub fn tag(&self) -> Option<&str> {
        self.descriptor.tag()
    }

    pub fn get(&self, wire_name: &str) -> Option<&Value> {
        let index = self.descriptor.field_index(wire_name)?;
        self.slots.get(index)?.as_ref()
    }

    pub fn is_present(&self, wire_name: &str) -> bool {
        self.get(wire_name).is_some()
    }

    /// Every declared field with its value, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&FieldDescriptor, Option<&Value>)> {
        self.descriptor
            .fields()
            .zip(self.slots.iter().map(Option::as_ref))
    }

    /// Present fields only, in declaration order.
    pub fn present_fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields()
            .filter_map(|(field, value)| value.map(|v| (field.wire_name.as_str(), v)))
    }

    pub fn get_str(&self, wire_name: &str) -> Option<&str> {
        self.get(wire_name).and_then(Value::as_str)
    }

    pub fn get_bool(&self, wire_name: &str) -> Option<bool> {
        self.get(wire_name).and_then(Value::as_bool)
    }

    pub fn get_i32(&self, wire_name: &str) -> Option<i32> {
        self.get(wire_name).and_then(Value::as_i32)
    }

    pub fn get_i64(&self, wire_name: &str) -> Option<i64> {
        self.get(wire_name).and_then(Value::as_i64)
    }

    pub fn get_f64(&self, wire_name: &str) -> Option<f64> {
        self.get(wire_name).and_then(Value::as_f64)
    }

    pub fn get_guid(&self, wire_name: &str) -> Option<&Uuid> {
        self.get(wire_name).and_then(Value::as_guid)
    }

    pub fn get_datetime(&self, wire_name: &str) -> Option<&DateTime<Utc>> {
        self.get(wire_name).and_then(Value::as_datetime)
    }

    pub fn get_timespan(&self, wire_name: &str) -> Option<&TimeDelta> {
        self.get(wire_name).and_then(Value::as_timespan)
    }

    pub fn get_bytes(&self, wire_name: &str) -> Option<&[u8]> {
        self.get(wire_name).and_then(Value::as_bytes)
    }

    pub fn get_enum(&self, wire_name: &str) -> Option<&str> {
        self.get(wire_name).and_then(Value::as_enum)
    }

    pub fn get_list(&self, wire_name: &str) -> Option<&[Value]> {
        self.get(wire_name).and_then(Value::as_list)
    }

    pub fn get_map(&self, wire_name: &str) -> Option<&IndexMap<String, Value>> {
        self.get(wire_name).and_then(Value::as_map)
    }

    pub fn get_record(&self, wire_name: &str) -> Option<&Record> {
        self.get(wire_name).and_then(Value::as_record)
    }

    /// A builder seeded with this record's values.
    pub fn to_builder(&self) -> RecordBuilder {
        RecordBuilder {
            descriptor: Arc::clone(&self.descriptor),
            slots: self.slots.clone(),
            error: None,
        }
    }
}

/// Assembles a [`Record`] field by field.
#[derive(Debug)]
pub struct RecordBuilder {
    descriptor: Arc<TypeDescriptor>,
    slots: Vec<Option<Value>>,
    error: Option<CodecError>,
}

impl RecordBuilder {
    pub(crate) fn new(descriptor: Arc<TypeDescriptor>) -> Self {
        let slots = vec![None; descriptor.field_count()];
        Self {
            descriptor,
            slots,
            error: None,
        }
    }

    pub fn set(mut self, wire_name: &str, value: impl Into<Value>) -> Self {
        match self.descriptor.field_index(wire_name) {
            Some(index) => self.slots[index] = Some(value.into()),
            None => self.unknown_field(wire_name),
        }
        self
    }

    /// Sets the field when `value` is `Some`, clears it otherwise.
    pub fn set_opt<V: Into<Value>>(mut self, wire_name: &str, value: Option<V>) -> Self {
        match self.descriptor.field_index(wire_name) {
            Some(index) => self.slots[index] = value.map(Into::into),
            None => self.unknown_field(wire_name),
        }
        self
    }

    pub fn unset(self, wire_name: &str) -> Self {
        self.set_opt::<Value>(wire_name, None)
    }

    fn unknown_field(&mut self, wire_name: &str) {
        if self.error.is_none() {
            self.error = Some(CodecError::TypeMismatch {
                path: format!("/{}", crate::json::escape_pointer_segment(wire_name)),
                expected: format!("a field of `{}`", self.descriptor.id()),
                found: "undeclared field".to_string(),
            });
        }
    }

    /// Finishes the record. Abstract types cannot be instantiated.
    pub fn build(self) -> Result<Record> {
        if let Some(error) = self.error {
            return Err(error);
        }
        if self.descriptor.is_abstract() {
            return Err(CodecError::TypeMismatch {
                path: String::new(),
                expected: "a concrete type".to_string(),
                found: format!("abstract `{}`", self.descriptor.id()),
            });
        }
        Ok(Record::from_slots(self.descriptor, self.slots))
    }
}
