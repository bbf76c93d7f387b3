//! Service descriptions (`ServiceKind`) and the partition schemes they embed
//! (`PartitionScheme`).

use fabric_json_codec::{FieldType, SchemaBuilder};

use FieldType::{Bool, Bytes, Int, Long, Str};

pub(crate) fn register(schema: &mut SchemaBuilder) {
    schema.family("PartitionSchemeDescription", "PartitionScheme");
    schema
        .object("SingletonPartitionSchemeDescription")
        .extends("PartitionSchemeDescription")
        .tag("Singleton");
    schema
        .object("UniformInt64RangePartitionSchemeDescription")
        .extends("PartitionSchemeDescription")
        .tag("UniformInt64Range")
        .required("Count", Int)
        .required("LowKey", Str)
        .required("HighKey", Str);
    schema
        .object("NamedPartitionSchemeDescription")
        .extends("PartitionSchemeDescription")
        .tag("Named")
        .required("Count", Int)
        .required("Names", FieldType::list(Str));

    schema
        .family("ServiceDescription", "ServiceKind")
        .optional("ApplicationName", Str)
        .required("ServiceName", Str)
        .required("ServiceTypeName", Str)
        .optional("InitializationData", Bytes)
        .required(
            "PartitionDescription",
            FieldType::object("PartitionSchemeDescription"),
        )
        .optional("PlacementConstraints", Str)
        .optional("IsDefaultMoveCostSpecified", Bool)
        .optional("ServiceDnsName", Str);
    schema
        .object("StatelessServiceDescription")
        .extends("ServiceDescription")
        .tag("Stateless")
        .required("InstanceCount", Int)
        .optional("MinInstanceCount", Int)
        .optional("MinInstancePercentage", Int);
    schema
        .object("StatefulServiceDescription")
        .extends("ServiceDescription")
        .tag("Stateful")
        .required("TargetReplicaSetSize", Int)
        .required("MinReplicaSetSize", Int)
        .required("HasPersistedState", Bool)
        .optional("ReplicaRestartWaitDurationSeconds", Long)
        .optional("QuorumLossWaitDurationSeconds", Long)
        .optional("StandByReplicaKeepDurationSeconds", Long);
}
