//! Enum literal sets. Literals are part of the wire contract and compare
//! exactly.

use fabric_json_codec::SchemaBuilder;

pub(crate) fn register(schema: &mut SchemaBuilder) {
    schema
        .enumeration("HealthState", ["Invalid", "Ok", "Warning", "Error", "Unknown"])
        .enumeration(
            "NodeStatus",
            [
                "Invalid", "Up", "Down", "Enabling", "Disabling", "Disabled", "Unknown", "Removed",
            ],
        )
        .enumeration("ServiceKind", ["Invalid", "Stateless", "Stateful"])
        .enumeration(
            "ApplicationStatus",
            ["Invalid", "Ready", "Upgrading", "Creating", "Deleting", "Failed"],
        )
        .enumeration(
            "ApplicationDefinitionKind",
            ["Invalid", "ServiceFabricApplicationDescription", "Compose"],
        )
        .enumeration(
            "PropertyValueKind",
            ["Invalid", "Binary", "Int64", "Double", "String", "Guid"],
        )
        .enumeration(
            "PartitionScheme",
            ["Invalid", "Singleton", "UniformInt64Range", "Named"],
        )
        .enumeration(
            "ServicePartitionStatus",
            ["Invalid", "Ready", "NotReady", "InQuorumLoss", "Reconfiguring", "Deleting"],
        )
        .enumeration(
            "ReplicaRole",
            [
                "Unknown",
                "None",
                "Primary",
                "IdleSecondary",
                "ActiveSecondary",
                "IdleAuxiliary",
                "ActiveAuxiliary",
                "PrimaryAuxiliary",
            ],
        )
        .enumeration("UpgradeKind", ["Invalid", "Rolling"]);
}
