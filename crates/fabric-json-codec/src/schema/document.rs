//! Schema documents: type declarations as data.
//!
//! A document lets descriptors be generated from an API description rather
//! than written in Rust. Field types use the text grammar of
//! [`FieldType`](super::FieldType).
//!
//! ```json
//! {
//!   "enums": [{ "name": "HealthState", "values": ["Invalid", "Ok"] }],
//!   "aliases": [{ "name": "ApplicationParameters", "type": "pairs<string>" }],
//!   "types": [
//!     { "id": "FabricEvent", "discriminator": "Kind", "abstract": true,
//!       "fields": [{ "name": "EventInstanceId", "type": "guid", "required": true }] },
//!     { "id": "NodeEvent", "extends": "FabricEvent", "tag": "NodeEvent",
//!       "fields": [{ "name": "NodeName", "type": "string", "required": true }] }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    #[serde(default)]
    pub enums: Vec<EnumDocument>,
    #[serde(default)]
    pub aliases: Vec<AliasDocument>,
    #[serde(default)]
    pub types: Vec<TypeDocument>,
}

impl SchemaDocument {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumDocument {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AliasDocument {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeDocument {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default)]
    pub fields: Vec<FieldDocument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDocument {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub required: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;
    use crate::schema::{FieldType, SchemaBuilder};

    const DOC: &str = r#"{
        "enums": [{ "name": "HealthState", "values": ["Invalid", "Ok", "Warning", "Error"] }],
        "aliases": [{ "name": "ApplicationParameters", "type": "pairs<string>" }],
        "types": [
            { "id": "FabricEvent", "discriminator": "Kind", "abstract": true,
              "fields": [
                { "name": "EventInstanceId", "type": "guid", "required": true },
                { "name": "HasCorrelatedEvents", "type": "bool" }
              ] },
            { "id": "NodeEvent", "extends": "FabricEvent", "tag": "NodeEvent",
              "fields": [{ "name": "NodeName", "type": "string", "required": true }] },
            { "id": "NodeDown", "extends": "NodeEvent", "tag": "NodeDown",
              "fields": [{ "name": "LastNodeUpAt", "type": "date-time" }] }
        ]
    }"#;

    #[test]
    fn imports_document_into_builder() {
        let doc = SchemaDocument::from_json(DOC).unwrap();
        let mut schema = SchemaBuilder::new();
        schema.import(&doc).unwrap();
        let registry = schema.build().unwrap();

        let down = registry.type_descriptor("NodeDown").unwrap();
        assert_eq!(down.field_count(), 4);
        assert!(down.field("EventInstanceId").unwrap().required);
        assert!(!down.field("LastNodeUpAt").unwrap().required);
        assert_eq!(
            registry.alias("ApplicationParameters"),
            Some(&FieldType::pairs(FieldType::Str))
        );
        let root = registry.type_descriptor("FabricEvent").unwrap();
        assert_eq!(root.dispatch_table().get("NodeDown").map(String::as_str), Some("NodeEvent"));
    }

    #[test]
    fn rejects_bad_field_type_text() {
        let doc = SchemaDocument::from_json(
            r#"{"types":[{"id":"A","fields":[{"name":"X","type":"int"}]}]}"#,
        )
        .unwrap();
        let mut schema = SchemaBuilder::new();
        assert!(matches!(
            schema.import(&doc),
            Err(SchemaError::InvalidFieldType(_))
        ));
    }

    #[test]
    fn rejects_unknown_document_keys() {
        assert!(SchemaDocument::from_json(r#"{"typez":[]}"#).is_err());
    }
}
