//! Naming-service properties: the `PropertyValue` family and the
//! descriptions that carry it.

use fabric_json_codec::{FieldType, SchemaBuilder};

use FieldType::{Bytes, DateTime, Double, Guid, Int, Long, Str};

pub(crate) fn register(schema: &mut SchemaBuilder) {
    schema.family("PropertyValue", "Kind");
    schema
        .object("BinaryPropertyValue")
        .extends("PropertyValue")
        .tag("Binary")
        .required("Data", Bytes);
    schema
        .object("Int64PropertyValue")
        .extends("PropertyValue")
        .tag("Int64")
        .required("Data", Long);
    schema
        .object("DoublePropertyValue")
        .extends("PropertyValue")
        .tag("Double")
        .required("Data", Double);
    schema
        .object("StringPropertyValue")
        .extends("PropertyValue")
        .tag("String")
        .required("Data", Str);
    schema
        .object("GuidPropertyValue")
        .extends("PropertyValue")
        .tag("Guid")
        .required("Data", Guid);

    schema
        .object("PropertyDescription")
        .required("PropertyName", Str)
        .optional("CustomTypeId", Str)
        .required("Value", FieldType::object("PropertyValue"));
    schema
        .object("PropertyMetadata")
        .optional("TypeId", FieldType::enumeration("PropertyValueKind"))
        .optional("CustomTypeId", Str)
        .optional("Parent", Str)
        .optional("SizeInBytes", Int)
        .optional("LastModifiedUtcTimestamp", DateTime)
        .optional("SequenceNumber", Str);
    schema
        .object("PropertyInfo")
        .required("Name", Str)
        .optional("Value", FieldType::object("PropertyValue"))
        .required("Metadata", FieldType::object("PropertyMetadata"));
}
