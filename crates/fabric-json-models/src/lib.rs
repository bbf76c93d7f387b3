//! Cluster management DTO catalog for `fabric-json-codec`.
//!
//! The catalog declares the polymorphic families of the management API
//! (`FabricEvent`, `HealthEvaluation`, `PropertyValue`, `SafetyCheck`,
//! `BackupStorageDescription`, `ServiceDescription` and
//! `PartitionSchemeDescription`), the plain DTOs around them and their enums.
//! It is built once per process and shared read-only.
//!
//! ```
//! let codec = fabric_json_models::codec().unwrap();
//! let event = codec
//!     .decode(
//!         "FabricEvent",
//!         r#"{"Kind":"NodeDown","NodeName":"N1","NodeInstance":7,
//!             "EventInstanceId":"3fa85f64-5717-4562-b3fc-2c963f66afa6",
//!             "TimeStamp":"2023-01-01T00:00:00Z","LastNodeUpAt":"2022-12-31T23:00:00Z"}"#,
//!     )
//!     .unwrap();
//! assert_eq!(event.as_record().unwrap().type_id(), "NodeDownEvent");
//! ```

use std::sync::{Arc, OnceLock};

use fabric_json_codec::{Codec, Registry, SchemaBuilder, SchemaError};

mod families;

pub use families::application::APPLICATION_PARAMETERS;

static CATALOG: OnceLock<Result<Arc<Registry>, SchemaError>> = OnceLock::new();

/// Declares the whole catalog into `schema`, so callers can extend it with
/// their own types before building.
pub fn register(schema: &mut SchemaBuilder) {
    families::register(schema);
}

/// Builds a fresh catalog registry.
pub fn build_catalog() -> Result<Registry, SchemaError> {
    let mut schema = SchemaBuilder::new();
    register(&mut schema);
    schema.build()
}

/// The process-wide catalog, built on first use.
pub fn catalog() -> Result<&'static Arc<Registry>, SchemaError> {
    CATALOG
        .get_or_init(|| {
            let catalog = build_catalog().map(Arc::new);
            if let Ok(registry) = &catalog {
                tracing::debug!(
                    families = registry.families().count(),
                    types = registry.type_count(),
                    "management catalog initialised"
                );
            }
            catalog
        })
        .as_ref()
        .map_err(Clone::clone)
}

/// A codec over the process-wide catalog with default options.
pub fn codec() -> Result<Codec, SchemaError> {
    Ok(Codec::new(Arc::clone(catalog()?)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_builds_and_is_shared() {
        let first = catalog().unwrap();
        let second = catalog().unwrap();
        assert!(Arc::ptr_eq(first, second));

        let families: Vec<_> = first.families().map(|t| t.id()).collect();
        for family in [
            "FabricEvent",
            "HealthEvaluation",
            "PropertyValue",
            "SafetyCheck",
            "BackupStorageDescription",
            "PartitionSchemeDescription",
            "ServiceDescription",
        ] {
            assert!(families.contains(&family), "{family}");
        }
    }

    #[test]
    fn event_dispatch_tables_route_through_intermediate_kinds() {
        let registry = catalog().unwrap();
        let root = registry.type_descriptor("FabricEvent").unwrap();
        let route = |tag: &str| root.dispatch_table().get(tag).map(String::as_str);
        assert_eq!(route("NodeAborted"), Some("NodeEvent"));
        assert_eq!(route("ApplicationCreated"), Some("ApplicationEvent"));
        assert_eq!(route("PartitionPrimaryMoveAnalysis"), Some("PartitionEvent"));
        assert_eq!(route("ReplicaEvent"), Some("ReplicaEvent"));

        let partition = registry.type_descriptor("PartitionEvent").unwrap();
        assert_eq!(
            partition
                .dispatch_table()
                .get("PartitionPrimaryMoveAnalysis")
                .map(String::as_str),
            Some("PartitionAnalysisEvent")
        );
    }

    #[test]
    fn every_partition_safety_check_inherits_partition_id() {
        let registry = catalog().unwrap();
        let checks: Vec<_> = registry
            .types()
            .filter(|t| t.parent() == Some("PartitionSafetyCheck"))
            .collect();
        assert_eq!(checks.len(), 6);
        for check in checks {
            assert!(check.field("PartitionId").is_some(), "{}", check.id());
            assert!(check.tag().is_some());
        }
    }

    #[test]
    fn register_composes_with_caller_types() {
        let mut schema = SchemaBuilder::new();
        register(&mut schema);
        schema
            .object("CustomEvent")
            .extends("FabricEvent")
            .tag("Custom");
        let registry = schema.build().unwrap();
        assert!(registry.is_subtype("CustomEvent", "FabricEvent"));
    }
}
