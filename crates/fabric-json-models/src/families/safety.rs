//! `SafetyCheck` family, reported while upgrades and node deactivations wait.

use fabric_json_codec::{FieldType, SchemaBuilder};

const PARTITION_CHECKS: [&str; 6] = [
    "EnsurePartitionQuorum",
    "WaitForPrimaryPlacement",
    "WaitForPrimarySwap",
    "WaitForReconfiguration",
    "WaitForInbuildReplica",
    "EnsureAvailability",
];

pub(crate) fn register(schema: &mut SchemaBuilder) {
    schema.family("SafetyCheck", "Kind");
    schema
        .object("SeedNodeSafetyCheck")
        .extends("SafetyCheck")
        .tag("EnsureSeedNodeQuorum");
    schema
        .object("PartitionSafetyCheck")
        .extends("SafetyCheck")
        .abstract_()
        .optional("PartitionId", FieldType::Guid);
    for kind in PARTITION_CHECKS {
        schema
            .object(format!("{kind}SafetyCheck"))
            .extends("PartitionSafetyCheck")
            .tag(kind);
    }
    schema
        .object("SafetyCheckWrapper")
        .optional("SafetyCheck", FieldType::object("SafetyCheck"));
}
