//! Schema-driven JSON codec for discriminated-union payloads.
//!
//! Types are declared once as descriptors (field tables plus a place in a
//! polymorphic family) and a single engine decodes and encodes every one of
//! them:
//!
//! - [`json`]: a pull reader and a writer over JSON text.
//! - [`schema`]: field types, type descriptors and the [`Registry`] with its
//!   discriminator dispatch tables.
//! - [`codec`]: the decode and encode engines behind [`Codec`].
//! - [`value`]: the decoded value graph ([`Value`], [`Record`]).
//!
//! Decoding tolerates unknown properties, accepts the discriminator at any
//! position and re-dispatches through multi-level hierarchies. Encoding
//! writes the discriminator first and checks values against their declared
//! types.

pub mod codec;
pub mod error;
pub mod json;
pub mod options;
pub mod schema;
pub mod value;

pub use codec::Codec;
pub use error::{CodecError, Result, SchemaError};
pub use json::{JsonReader, JsonWriter};
pub use options::{CodecOptions, DuplicateKeyPolicy};
pub use schema::{
    EnumDescriptor, FieldDescriptor, FieldType, Registry, SchemaBuilder, SchemaDocument,
    TypeDescriptor,
};
pub use value::{Record, RecordBuilder, Value};
