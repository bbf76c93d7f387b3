//! Fluent construction of a [`Registry`].
//!
//! Types are declared flat, each naming its parent with
//! [`TypeDef::extends`]. [`SchemaBuilder::build`] expands inherited fields
//! (parent first, a redefinition replaces the inherited field in place),
//! inherits the discriminator property name down each family, and derives the
//! dispatch table of every node from the tags declared beneath it.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use super::document::SchemaDocument;
use super::registry::Registry;
use super::types::{EnumDescriptor, FieldDescriptor, FieldType, TypeDescriptor};
use crate::error::SchemaError;

/// A type declaration, before expansion.
#[derive(Debug, Clone, Default)]
pub struct TypeDef {
    id: String,
    parent: Option<String>,
    discriminator: Option<String>,
    tag: Option<String>,
    is_abstract: bool,
    fields: Vec<FieldDescriptor>,
}

impl TypeDef {
    fn new(id: String) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn extends(&mut self, parent: impl Into<String>) -> &mut Self {
        self.parent = Some(parent.into());
        self
    }

    /// Names the discriminator property. Descendants inherit it.
    pub fn discriminator(&mut self, property: impl Into<String>) -> &mut Self {
        self.discriminator = Some(property.into());
        self
    }

    /// The discriminator value that selects this type.
    pub fn tag(&mut self, value: impl Into<String>) -> &mut Self {
        self.tag = Some(value.into());
        self
    }

    /// Marks the type as never instantiated on its own.
    pub fn abstract_(&mut self) -> &mut Self {
        self.is_abstract = true;
        self
    }

    pub fn required(&mut self, wire_name: impl Into<String>, field_type: FieldType) -> &mut Self {
        self.fields
            .push(FieldDescriptor::required(wire_name, field_type));
        self
    }

    pub fn optional(&mut self, wire_name: impl Into<String>, field_type: FieldType) -> &mut Self {
        self.fields
            .push(FieldDescriptor::optional(wire_name, field_type));
        self
    }

    pub fn field(&mut self, field: FieldDescriptor) -> &mut Self {
        self.fields.push(field);
        self
    }
}

/// Collects type, enum and alias declarations and builds a [`Registry`].
///
/// ```
/// use fabric_json_codec::schema::{FieldType, SchemaBuilder};
///
/// let mut schema = SchemaBuilder::new();
/// schema
///     .family("Shape", "Kind")
///     .optional("Label", FieldType::Str);
/// schema
///     .object("Circle")
///     .extends("Shape")
///     .tag("Circle")
///     .required("Radius", FieldType::Double);
/// let registry = schema.build().unwrap();
/// assert_eq!(registry.type_descriptor("Circle").unwrap().field_count(), 2);
/// ```
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    types: IndexMap<String, TypeDef>,
    enums: IndexMap<String, Vec<String>>,
    aliases: IndexMap<String, FieldType>,
    errors: Vec<SchemaError>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an abstract family root dispatching on `discriminator`.
    pub fn family(&mut self, id: impl Into<String>, discriminator: impl Into<String>) -> &mut TypeDef {
        let def = self.object(id);
        def.discriminator(discriminator).abstract_();
        def
    }

    /// Declares a concrete type.
    pub fn object(&mut self, id: impl Into<String>) -> &mut TypeDef {
        let id = id.into();
        self.claim(&id);
        self.types
            .entry(id.clone())
            .and_modify(|def| *def = TypeDef::new(id.clone()))
            .or_insert_with(|| TypeDef::new(id))
    }

    pub fn enumeration<I, S>(&mut self, name: impl Into<String>, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        self.claim(&name);
        self.enums
            .insert(name, values.into_iter().map(Into::into).collect());
        self
    }

    /// Names a field type so it can be decoded and encoded by name.
    pub fn alias(&mut self, name: impl Into<String>, field_type: FieldType) -> &mut Self {
        let name = name.into();
        self.claim(&name);
        self.aliases.insert(name, field_type);
        self
    }

    /// Merges the declarations of a schema document.
    pub fn import(&mut self, document: &SchemaDocument) -> Result<&mut Self, SchemaError> {
        for e in &document.enums {
            self.enumeration(e.name.clone(), e.values.iter().cloned());
        }
        for a in &document.aliases {
            let field_type = a.type_.parse()?;
            self.alias(a.name.clone(), field_type);
        }
        for t in &document.types {
            let mut fields = Vec::with_capacity(t.fields.len());
            for f in &t.fields {
                fields.push(FieldDescriptor {
                    wire_name: f.name.clone(),
                    field_type: f.type_.parse()?,
                    required: f.required,
                });
            }
            let def = self.object(t.id.clone());
            if let Some(parent) = &t.extends {
                def.extends(parent.clone());
            }
            if let Some(discriminator) = &t.discriminator {
                def.discriminator(discriminator.clone());
            }
            if let Some(tag) = &t.tag {
                def.tag(tag.clone());
            }
            if t.is_abstract {
                def.abstract_();
            }
            for field in fields {
                def.field(field);
            }
        }
        Ok(self)
    }

    fn claim(&mut self, name: &str) {
        if name.is_empty() {
            self.errors.push(SchemaError::EmptyId);
        } else if self.types.contains_key(name)
            || self.enums.contains_key(name)
            || self.aliases.contains_key(name)
        {
            self.errors
                .push(SchemaError::DuplicateDefinition(name.to_string()));
        }
    }

    /// Validates the declarations and freezes them into a [`Registry`].
    pub fn build(self) -> Result<Registry, SchemaError> {
        if let Some(error) = self.errors.into_iter().next() {
            return Err(error);
        }

        let mut chains: HashMap<&str, Vec<&TypeDef>> = HashMap::new();
        for def in self.types.values() {
            chains.insert(def.id.as_str(), ancestry(def, &self.types)?);
        }

        let mut descriptors: IndexMap<String, TypeDescriptor> = IndexMap::new();
        for def in self.types.values() {
            let chain = &chains[def.id.as_str()];
            let descriptor = expand(def, chain)?;
            descriptors.insert(def.id.clone(), descriptor);
        }

        for descriptor in descriptors.values() {
            for field in descriptor.fields() {
                check_references(&descriptor.id, &field.field_type, &self.types, &self.enums)?;
            }
        }
        for (name, field_type) in &self.aliases {
            check_references(name, field_type, &self.types, &self.enums)?;
        }

        // (family root, tag) -> declaring type
        let mut owners: HashMap<(&str, &str), &str> = HashMap::new();
        let mut routes: Vec<(String, String, String)> = Vec::new();
        for def in self.types.values() {
            let Some(tag) = def.tag.as_deref() else {
                continue;
            };
            let chain = &chains[def.id.as_str()];
            let root = chain[0].id.as_str();
            if let Some(first) = owners.insert((root, tag), def.id.as_str()) {
                return Err(SchemaError::DuplicateTag {
                    tag: tag.to_string(),
                    first: first.to_string(),
                    second: def.id.clone(),
                });
            }
            // chain is root..=def; every ancestor routes the tag to the next
            // link on the way down.
            for pair in chain.windows(2) {
                routes.push((pair[0].id.clone(), tag.to_string(), pair[1].id.clone()));
            }
        }
        for (ancestor, tag, child) in routes {
            if let Some(descriptor) = descriptors.get_mut(&ancestor) {
                descriptor.dispatch.insert(tag, child);
            }
        }

        let mut retyped: Vec<(String, String)> = Vec::new();
        for def in self.types.values() {
            let descriptor = &descriptors[def.id.as_str()];
            let chain = &chains[def.id.as_str()];
            for ancestor in &chain[..chain.len() - 1] {
                for field in descriptors[ancestor.id.as_str()].fields() {
                    let redeclared = descriptor.field(&field.wire_name);
                    if redeclared.is_some_and(|f| f.field_type != field.field_type) {
                        retyped.push((ancestor.id.clone(), field.wire_name.clone()));
                    }
                }
            }
        }
        for (ancestor, wire_name) in retyped {
            if let Some(descriptor) = descriptors.get_mut(&ancestor) {
                descriptor.retyped_below.insert(wire_name);
            }
        }

        let enums = self
            .enums
            .into_iter()
            .map(|(name, values)| {
                let descriptor = EnumDescriptor {
                    name: name.clone(),
                    values: values.into_iter().collect::<IndexSet<_>>(),
                };
                (name, Arc::new(descriptor))
            })
            .collect::<IndexMap<_, _>>();
        let types = descriptors
            .into_iter()
            .map(|(id, descriptor)| (id, Arc::new(descriptor)))
            .collect::<IndexMap<_, _>>();

        let registry = Registry::new(types, enums, self.aliases);
        tracing::debug!(
            types = registry.type_count(),
            enums = registry.enum_count(),
            aliases = registry.alias_count(),
            "schema registry built"
        );
        Ok(registry)
    }
}

/// Root-first chain of declarations ending with `def`.
fn ancestry<'d>(
    def: &'d TypeDef,
    types: &'d IndexMap<String, TypeDef>,
) -> Result<Vec<&'d TypeDef>, SchemaError> {
    let mut chain = vec![def];
    let mut visited: HashSet<&str> = HashSet::from([def.id.as_str()]);
    let mut current = def;
    while let Some(parent_id) = current.parent.as_deref() {
        let parent = types.get(parent_id).ok_or_else(|| SchemaError::UnknownParent {
            type_id: current.id.clone(),
            parent: parent_id.to_string(),
        })?;
        if !visited.insert(parent.id.as_str()) {
            return Err(SchemaError::Cycle(def.id.clone()));
        }
        chain.push(parent);
        current = parent;
    }
    chain.reverse();
    Ok(chain)
}

fn expand(def: &TypeDef, chain: &[&TypeDef]) -> Result<TypeDescriptor, SchemaError> {
    let discriminator = chain.iter().rev().find_map(|d| d.discriminator.clone());
    if let (None, Some(tag)) = (&discriminator, &def.tag) {
        return Err(SchemaError::TagWithoutDiscriminator {
            type_id: def.id.clone(),
            tag: tag.clone(),
        });
    }

    let mut fields: IndexMap<String, FieldDescriptor> = IndexMap::new();
    for link in chain {
        let mut own: HashSet<&str> = HashSet::new();
        for field in &link.fields {
            if !own.insert(field.wire_name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    type_id: link.id.clone(),
                    field: field.wire_name.clone(),
                });
            }
            if discriminator.as_deref() == Some(field.wire_name.as_str()) {
                return Err(SchemaError::DiscriminatorAsField {
                    type_id: link.id.clone(),
                    field: field.wire_name.clone(),
                });
            }
            // IndexMap::insert keeps the original slot for an existing key.
            fields.insert(field.wire_name.clone(), field.clone());
        }
    }

    Ok(TypeDescriptor {
        id: def.id.clone(),
        parent: def.parent.clone(),
        discriminator,
        tag: def.tag.clone(),
        is_abstract: def.is_abstract,
        fields,
        dispatch: IndexMap::new(),
        retyped_below: IndexSet::new(),
    })
}

fn check_references(
    owner: &str,
    field_type: &FieldType,
    types: &IndexMap<String, TypeDef>,
    enums: &IndexMap<String, Vec<String>>,
) -> Result<(), SchemaError> {
    let mut missing: Option<SchemaError> = None;
    field_type.walk(&mut |t| {
        if missing.is_some() {
            return;
        }
        match t {
            FieldType::Object(id) if !types.contains_key(id) => {
                missing = Some(SchemaError::UnresolvedReference {
                    type_id: owner.to_string(),
                    kind: "type",
                    target: id.clone(),
                });
            }
            FieldType::Enum(name) if !enums.contains_key(name) => {
                missing = Some(SchemaError::UnresolvedReference {
                    type_id: owner.to_string(),
                    kind: "enum",
                    target: name.clone(),
                });
            }
            _ => {}
        }
    });
    missing.map_or(Ok(()), Err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events() -> SchemaBuilder {
        let mut s = SchemaBuilder::new();
        s.family("Event", "Kind")
            .required("Id", FieldType::Guid)
            .optional("Note", FieldType::Str);
        s.object("NodeEvent")
            .extends("Event")
            .tag("NodeEvent")
            .required("NodeName", FieldType::Str);
        s.object("NodeAborted")
            .extends("NodeEvent")
            .tag("NodeAborted")
            .optional("Note", FieldType::Long)
            .required("Instance", FieldType::Long);
        s
    }

    #[test]
    fn expands_inherited_fields_parent_first() {
        let registry = events().build().unwrap();
        let aborted = registry.type_descriptor("NodeAborted").unwrap();
        let names: Vec<_> = aborted.fields().map(|f| f.wire_name.as_str()).collect();
        assert_eq!(names, vec!["Id", "Note", "NodeName", "Instance"]);
        assert_eq!(aborted.field("Note").unwrap().field_type, FieldType::Long);
        assert_eq!(aborted.discriminator(), Some("Kind"));
        assert_eq!(aborted.parent(), Some("NodeEvent"));
    }

    #[test]
    fn dispatch_tables_route_through_intermediate_nodes() {
        let registry = events().build().unwrap();
        let root = registry.type_descriptor("Event").unwrap();
        assert!(root.is_abstract());
        assert_eq!(root.dispatch_table().get("NodeAborted").map(String::as_str), Some("NodeEvent"));
        assert_eq!(root.dispatch_table().get("NodeEvent").map(String::as_str), Some("NodeEvent"));

        let node = registry.type_descriptor("NodeEvent").unwrap();
        assert_eq!(node.dispatch_table().get("NodeAborted").map(String::as_str), Some("NodeAborted"));
        assert!(!node.dispatch_table().contains_key("NodeEvent"));

        let leaf = registry.type_descriptor("NodeAborted").unwrap();
        assert!(!leaf.is_polymorphic());
    }

    #[test]
    fn records_fields_retyped_by_subtypes() {
        let registry = events().build().unwrap();
        for id in ["Event", "NodeEvent"] {
            let descriptor = registry.type_descriptor(id).unwrap();
            assert!(descriptor.is_retyped_below("Note"), "{id}");
            assert!(!descriptor.is_retyped_below("Id"), "{id}");
        }
        assert!(!registry.type_descriptor("NodeAborted").unwrap().is_retyped_below("Note"));

        let mut s = SchemaBuilder::new();
        s.family("Check", "Kind").optional("Id", FieldType::Str);
        s.object("Quorum")
            .extends("Check")
            .tag("Quorum")
            .required("Id", FieldType::Str);
        let registry = s.build().unwrap();
        assert!(!registry.type_descriptor("Check").unwrap().is_retyped_below("Id"));
    }

    #[test]
    fn rejects_duplicate_tags_within_a_family() {
        let mut s = events();
        s.object("Other").extends("Event").tag("NodeAborted");
        assert!(matches!(s.build(), Err(SchemaError::DuplicateTag { .. })));
    }

    #[test]
    fn rejects_structural_errors() {
        let mut s = SchemaBuilder::new();
        s.object("A").extends("Missing");
        assert!(matches!(s.build(), Err(SchemaError::UnknownParent { .. })));

        let mut s = SchemaBuilder::new();
        s.object("A").extends("B");
        s.object("B").extends("A");
        assert!(matches!(s.build(), Err(SchemaError::Cycle(_))));

        let mut s = SchemaBuilder::new();
        s.object("A").required("X", FieldType::object("Nope"));
        assert!(matches!(s.build(), Err(SchemaError::UnresolvedReference { kind: "type", .. })));

        let mut s = SchemaBuilder::new();
        s.object("A").required("X", FieldType::list(FieldType::enumeration("Nope")));
        assert!(matches!(s.build(), Err(SchemaError::UnresolvedReference { kind: "enum", .. })));

        let mut s = SchemaBuilder::new();
        s.object("A").tag("A");
        assert!(matches!(s.build(), Err(SchemaError::TagWithoutDiscriminator { .. })));

        let mut s = SchemaBuilder::new();
        s.object("A").required("X", FieldType::Str).optional("X", FieldType::Int);
        assert!(matches!(s.build(), Err(SchemaError::DuplicateField { .. })));

        let mut s = SchemaBuilder::new();
        s.family("A", "Kind").required("Kind", FieldType::Str);
        assert!(matches!(s.build(), Err(SchemaError::DiscriminatorAsField { .. })));

        let mut s = SchemaBuilder::new();
        s.object("A");
        s.enumeration("A", ["X"]);
        assert!(matches!(s.build(), Err(SchemaError::DuplicateDefinition(_))));

        let mut s = SchemaBuilder::new();
        s.object("");
        assert!(matches!(s.build(), Err(SchemaError::EmptyId)));
    }
}
