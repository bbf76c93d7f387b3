//! Decode engine: wire JSON to [`Value`] graphs.
//!
//! Polymorphic objects are decoded in one pass over the property stream. The
//! decoder starts from the entry descriptor and, when it meets the
//! discriminator, walks down the dispatch tables to the most derived type.
//! Properties seen before that point which the current type does not know,
//! or which a subtype declares with another field type, are captured as raw
//! text and replayed once the type is resolved.

use std::sync::Arc;

use crate::error::{CodecError, Result};
use crate::json::JsonReader;
use crate::options::CodecOptions;
use crate::schema::{FieldType, Registry, TypeDescriptor};
use crate::value::{Record, Value};

/// A property captured before the discriminator resolved.
struct Deferred<'a> {
    name: String,
    path: String,
    raw: &'a str,
}

pub(crate) struct Decoder<'r> {
    pub(super) registry: &'r Registry,
    pub(super) options: &'r CodecOptions,
}

impl<'r> Decoder<'r> {
    pub(crate) fn new(registry: &'r Registry, options: &'r CodecOptions) -> Self {
        Self { registry, options }
    }

    /// Decodes one value of `field_type`. `null` is absent.
    ///
    /// `depth` is the nesting of the enclosing container; containers opened
    /// by this value count from `depth + 1`.
    pub(crate) fn decode_value(
        &self,
        reader: &mut JsonReader<'_>,
        field_type: &FieldType,
        depth: usize,
    ) -> Result<Option<Value>> {
        if reader.try_read_null()? {
            return Ok(None);
        }
        let value = match field_type {
            FieldType::Str => Value::String(reader.read_string()?.into_owned()),
            FieldType::Bool => Value::Bool(reader.read_bool()?),
            FieldType::Int => Value::Int(reader.read_i32()?),
            FieldType::Long => Value::Long(reader.read_i64()?),
            FieldType::Double => Value::Double(reader.read_f64()?),
            FieldType::Guid => Value::Guid(reader.read_guid()?),
            FieldType::DateTime => Value::DateTime(reader.read_datetime()?),
            FieldType::TimeSpan => Value::TimeSpan(reader.read_timespan()?),
            FieldType::Bytes => self.decode_bytes(reader, depth + 1)?,
            FieldType::Any => self.decode_any(reader)?,
            FieldType::Enum(name) => self.decode_enum(reader, name)?,
            FieldType::Object(type_id) => {
                let descriptor = self
                    .registry
                    .type_descriptor(type_id)
                    .ok_or_else(|| CodecError::UnknownType(type_id.clone()))?;
                Value::Record(self.decode_record(reader, descriptor, depth + 1)?)
            }
            FieldType::List(item) => self.decode_list(reader, item, depth + 1)?,
            FieldType::PairMap(value) => self.decode_pairs(reader, value, depth + 1)?,
            FieldType::Map(value) => self.decode_map(reader, value, depth + 1)?,
        };
        Ok(Some(value))
    }

    pub(super) fn check_depth(&self, reader: &JsonReader<'_>, depth: usize) -> Result<()> {
        if depth > self.options.max_depth {
            return Err(CodecError::DepthLimitExceeded {
                limit: self.options.max_depth,
                path: reader.path(),
            });
        }
        Ok(())
    }

    /// Decodes an object through `entry`, re-dispatching on the
    /// discriminator when `entry` heads a family.
    ///
    /// Every occurrence of the discriminator resolves from `entry`, so a
    /// repeated discriminator behaves like any duplicate property: the last
    /// one wins.
    pub(crate) fn decode_record<'a>(
        &self,
        reader: &mut JsonReader<'a>,
        entry: &Arc<TypeDescriptor>,
        depth: usize,
    ) -> Result<Record> {
        self.check_depth(reader, depth)?;
        reader.enter_object()?;

        let mut current = Arc::clone(entry);
        let mut slots: Vec<Option<Value>> = vec![None; current.field_count()];
        let mut seen_discriminator = false;
        let mut deferred: Vec<Deferred<'a>> = Vec::new();

        while let Some(name) = reader.next_property()? {
            if current.discriminator() == Some(&*name) {
                let tag = reader.read_string()?;
                let resolved = self.resolve(entry, &tag, reader)?;
                seen_discriminator = true;
                if !Arc::ptr_eq(&resolved, &current) {
                    slots = remap(&current, &resolved, slots);
                    current = resolved;
                }
                if !deferred.is_empty() {
                    deferred = self.replay(&current, &mut slots, deferred, depth, true)?;
                }
                continue;
            }

            // A later discriminator may still move to a subtype that knows
            // this property, or gives it another field type.
            let index = current.field_index(&name);
            if current.is_polymorphic() && (index.is_none() || current.is_retyped_below(&name)) {
                let path = reader.path();
                let raw = reader.capture_value()?;
                deferred.push(Deferred {
                    name: name.into_owned(),
                    path,
                    raw,
                });
                continue;
            }

            if let Some(index) = index {
                let field_type = &current.fields[index].field_type;
                slots[index] = self.decode_value(reader, field_type, depth)?;
                continue;
            }

            tracing::trace!(type_id = current.id(), property = %name, "skipping unknown property");
            reader.skip_value()?;
        }

        if !seen_discriminator && (current.is_polymorphic() || current.is_abstract()) {
            return Err(CodecError::MissingDiscriminatorProperty {
                family: current.id().to_string(),
                property: current.discriminator().unwrap_or_default().to_string(),
                path: reader.path(),
            });
        }
        if !deferred.is_empty() {
            self.replay(&current, &mut slots, deferred, depth, false)?;
        }

        Ok(Record::from_slots(current, slots))
    }

    /// Walks the dispatch tree from `from` to the type tagged `tag`.
    fn resolve(
        &self,
        from: &Arc<TypeDescriptor>,
        tag: &str,
        reader: &JsonReader<'_>,
    ) -> Result<Arc<TypeDescriptor>> {
        let unknown = || CodecError::UnknownDiscriminator {
            family: from.id().to_string(),
            value: tag.to_string(),
            path: reader.path(),
        };

        let mut node = Arc::clone(from);
        while node.tag() != Some(tag) {
            let Some(child) = node.dispatch_table().get(tag) else {
                return Err(unknown());
            };
            tracing::trace!(from = node.id(), to = child.as_str(), tag, "dispatch");
            let next = self
                .registry
                .type_descriptor(child)
                .cloned()
                .ok_or_else(|| CodecError::UnknownType(child.clone()))?;
            node = next;
        }
        if node.is_abstract() {
            return Err(unknown());
        }
        Ok(node)
    }

    /// Decodes deferred properties against the resolved type, in wire order.
    ///
    /// With `open` set, properties a subtype of `descriptor` could still
    /// claim or retype are handed back for a later discriminator; otherwise
    /// properties unknown to `descriptor` are dropped.
    fn replay<'a>(
        &self,
        descriptor: &TypeDescriptor,
        slots: &mut [Option<Value>],
        deferred: Vec<Deferred<'a>>,
        depth: usize,
        open: bool,
    ) -> Result<Vec<Deferred<'a>>> {
        tracing::debug!(
            type_id = descriptor.id(),
            count = deferred.len(),
            "replaying deferred properties"
        );
        let mut pending = Vec::new();
        for property in deferred {
            let index = descriptor.field_index(&property.name);
            let unsettled = index.is_none() || descriptor.is_retyped_below(&property.name);
            if open && descriptor.is_polymorphic() && unsettled {
                pending.push(property);
                continue;
            }
            let Some(index) = index else {
                tracing::trace!(
                    type_id = descriptor.id(),
                    property = %property.name,
                    "dropping unknown deferred property"
                );
                continue;
            };
            let mut sub = JsonReader::new(property.raw).with_base_path(property.path);
            slots[index] = self.decode_value(&mut sub, &descriptor.fields[index].field_type, depth)?;
        }
        Ok(pending)
    }

    fn decode_enum(&self, reader: &mut JsonReader<'_>, name: &str) -> Result<Value> {
        let descriptor = self
            .registry
            .enum_descriptor(name)
            .ok_or_else(|| CodecError::UnknownType(name.to_string()))?;
        let literal = reader.read_string()?;
        if !descriptor.contains(&literal) {
            return Err(CodecError::UnknownEnumValue {
                enum_name: name.to_string(),
                value: literal.into_owned(),
                path: reader.path(),
            });
        }
        Ok(Value::Enum(literal.into_owned()))
    }

    fn decode_any(&self, reader: &mut JsonReader<'_>) -> Result<Value> {
        let raw = reader.capture_value()?;
        Ok(Value::Json(serde_json::from_str(raw)?))
    }
}

/// Moves slot values to the layout of `to`, by wire name. A value is only
/// carried over when `to` declares the field with the same field type.
fn remap(from: &TypeDescriptor, to: &TypeDescriptor, slots: Vec<Option<Value>>) -> Vec<Option<Value>> {
    let mut out = vec![None; to.field_count()];
    for (field, value) in from.fields().zip(slots) {
        let Some(value) = value else {
            continue;
        };
        match to.field_index(&field.wire_name) {
            Some(index) if to.fields[index].field_type == field.field_type => out[index] = Some(value),
            _ => tracing::trace!(
                from = from.id(),
                to = to.id(),
                property = %field.wire_name,
                "dropping value the re-dispatched type does not declare"
            ),
        }
    }
    out
}
