//! Field tables and the discriminator registry.
//!
//! - [`FieldType`], [`FieldDescriptor`]: what a single property looks like.
//! - [`TypeDescriptor`]: one type's expanded field table plus its place in a
//!   polymorphic family (discriminator, tag, dispatch table).
//! - [`SchemaBuilder`] / [`SchemaDocument`]: declaration, in code or as data.
//! - [`Registry`]: the frozen, shareable result.

pub mod builder;
pub mod document;
pub mod registry;
pub mod types;

pub use builder::{SchemaBuilder, TypeDef};
pub use document::{AliasDocument, EnumDocument, FieldDocument, SchemaDocument, TypeDocument};
pub use registry::Registry;
pub use types::{EnumDescriptor, FieldDescriptor, FieldType, TypeDescriptor};
