//! Read-only lookup of type descriptors, enums and aliases.

use std::sync::Arc;

use indexmap::IndexMap;

use super::builder::SchemaBuilder;
use super::types::{EnumDescriptor, FieldType, TypeDescriptor};
use crate::error::{CodecError, Result};
use crate::value::RecordBuilder;

/// Immutable set of descriptors produced by [`SchemaBuilder::build`].
///
/// A registry is built once and then shared (`Arc<Registry>`) by any number
/// of concurrent decode and encode calls.
#[derive(Debug, Default)]
pub struct Registry {
    types: IndexMap<String, Arc<TypeDescriptor>>,
    enums: IndexMap<String, Arc<EnumDescriptor>>,
    aliases: IndexMap<String, FieldType>,
}

impl Registry {
    pub(crate) fn new(
        types: IndexMap<String, Arc<TypeDescriptor>>,
        enums: IndexMap<String, Arc<EnumDescriptor>>,
        aliases: IndexMap<String, FieldType>,
    ) -> Self {
        Self {
            types,
            enums,
            aliases,
        }
    }

    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    pub fn type_descriptor(&self, id: &str) -> Option<&Arc<TypeDescriptor>> {
        self.types.get(id)
    }

    pub fn enum_descriptor(&self, name: &str) -> Option<&Arc<EnumDescriptor>> {
        self.enums.get(name)
    }

    pub fn alias(&self, name: &str) -> Option<&FieldType> {
        self.aliases.get(name)
    }

    /// Resolves a type, enum or alias name to the field type that decodes it.
    pub fn resolve(&self, name: &str) -> Result<FieldType> {
        if self.types.contains_key(name) {
            Ok(FieldType::Object(name.to_string()))
        } else if self.enums.contains_key(name) {
            Ok(FieldType::Enum(name.to_string()))
        } else if let Some(alias) = self.aliases.get(name) {
            Ok(alias.clone())
        } else {
            Err(CodecError::UnknownType(name.to_string()))
        }
    }

    pub fn types(&self) -> impl Iterator<Item = &Arc<TypeDescriptor>> {
        self.types.values()
    }

    pub fn enums(&self) -> impl Iterator<Item = &Arc<EnumDescriptor>> {
        self.enums.values()
    }

    /// Roots of polymorphic families.
    pub fn families(&self) -> impl Iterator<Item = &Arc<TypeDescriptor>> {
        self.types
            .values()
            .filter(|t| t.parent.is_none() && t.is_polymorphic())
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn enum_count(&self) -> usize {
        self.enums.len()
    }

    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }

    /// True if `id` is `ancestor` or inherits from it.
    pub fn is_subtype(&self, id: &str, ancestor: &str) -> bool {
        let mut current = Some(id);
        while let Some(cursor) = current {
            if cursor == ancestor {
                return true;
            }
            current = self.types.get(cursor).and_then(|t| t.parent());
        }
        false
    }

    /// Starts building a record of a concrete type.
    pub fn record(&self, type_id: &str) -> Result<RecordBuilder> {
        let descriptor = self
            .type_descriptor(type_id)
            .ok_or_else(|| CodecError::UnknownType(type_id.to_string()))?;
        Ok(RecordBuilder::new(Arc::clone(descriptor)))
    }
}
