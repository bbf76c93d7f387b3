//! `FabricEvent` family: cluster event records, dispatched on `Kind`.
//!
//! The intermediate event kinds (`ApplicationEvent`, `NodeEvent`, ...) carry
//! their own tag and are returned as-is when the wire names them; their
//! children are reached through them.

use fabric_json_codec::{FieldType, SchemaBuilder};

use FieldType::{Bool, DateTime, Double, Guid, Int, Long, Str, TimeSpan};

pub(crate) fn register(schema: &mut SchemaBuilder) {
    schema
        .family("FabricEvent", "Kind")
        .required("EventInstanceId", Guid)
        .optional("Category", Str)
        .required("TimeStamp", DateTime)
        .optional("HasCorrelatedEvents", Bool);

    application(schema);
    cluster(schema);
    node(schema);
    partition(schema);
    replica(schema);
    service(schema);
}

fn application(schema: &mut SchemaBuilder) {
    schema
        .object("ApplicationEvent")
        .extends("FabricEvent")
        .tag("ApplicationEvent")
        .required("ApplicationId", Str);
    schema
        .object("ApplicationCreatedEvent")
        .extends("ApplicationEvent")
        .tag("ApplicationCreated")
        .required("ApplicationTypeName", Str)
        .required("ApplicationTypeVersion", Str)
        .required(
            "ApplicationDefinitionKind",
            FieldType::enumeration("ApplicationDefinitionKind"),
        );
    schema
        .object("ApplicationDeletedEvent")
        .extends("ApplicationEvent")
        .tag("ApplicationDeleted")
        .required("ApplicationTypeName", Str)
        .required("ApplicationTypeVersion", Str);
}

fn cluster(schema: &mut SchemaBuilder) {
    schema
        .object("ClusterEvent")
        .extends("FabricEvent")
        .tag("ClusterEvent");
    schema
        .object("ChaosStartedEvent")
        .extends("ClusterEvent")
        .tag("ChaosStarted")
        .required("MaxConcurrentFaults", Long)
        .required("TimeToRunInSeconds", Double)
        .required("MaxClusterStabilizationTimeoutInSeconds", Double)
        .required("WaitTimeBetweenIterationsInSeconds", Double)
        .required("WaitTimeBetweenFaultsInSeconds", Double)
        .required("MoveReplicaFaultEnabled", Bool)
        .optional("IncludedNodeTypeList", Str)
        .optional("IncludedApplicationList", Str)
        .optional("ClusterHealthPolicy", Str)
        .optional("ChaosContext", Str);
}

fn node(schema: &mut SchemaBuilder) {
    schema
        .object("NodeEvent")
        .extends("FabricEvent")
        .tag("NodeEvent")
        .required("NodeName", Str);
    schema
        .object("NodeAbortedEvent")
        .extends("NodeEvent")
        .tag("NodeAborted")
        .required("NodeInstance", Long)
        .required("NodeId", Str)
        .required("UpgradeDomain", Str)
        .required("FaultDomain", Str)
        .required("IpAddressOrFQDN", Str)
        .required("Hostname", Str)
        .required("IsSeedNode", Bool)
        .required("NodeVersion", Str);
    schema
        .object("NodeUpEvent")
        .extends("NodeEvent")
        .tag("NodeUp")
        .required("NodeInstance", Long)
        .required("LastNodeDownAt", DateTime);
    schema
        .object("NodeDownEvent")
        .extends("NodeEvent")
        .tag("NodeDown")
        .required("NodeInstance", Long)
        .required("LastNodeUpAt", DateTime);
}

fn partition(schema: &mut SchemaBuilder) {
    schema
        .object("PartitionEvent")
        .extends("FabricEvent")
        .tag("PartitionEvent")
        .required("PartitionId", Guid);
    schema
        .object("AnalysisEventMetadata")
        .optional("Delay", TimeSpan)
        .optional("Duration", TimeSpan);
    schema
        .object("PartitionAnalysisEvent")
        .extends("PartitionEvent")
        .abstract_()
        .required("Metadata", FieldType::object("AnalysisEventMetadata"));
    schema
        .object("PartitionPrimaryMoveAnalysisEvent")
        .extends("PartitionAnalysisEvent")
        .tag("PartitionPrimaryMoveAnalysis")
        .required("WhenMoveCompleted", DateTime)
        .required("PreviousNode", Str)
        .required("CurrentNode", Str)
        .required("MoveReason", Str)
        .required("RelevantTraces", Str);
}

fn replica(schema: &mut SchemaBuilder) {
    schema
        .object("ReplicaEvent")
        .extends("FabricEvent")
        .tag("ReplicaEvent")
        .required("PartitionId", Guid)
        .required("ReplicaId", Long);
}

fn service(schema: &mut SchemaBuilder) {
    schema
        .object("ServiceEvent")
        .extends("FabricEvent")
        .tag("ServiceEvent")
        .required("ServiceId", Str);
    schema
        .object("ServiceCreatedEvent")
        .extends("ServiceEvent")
        .tag("ServiceCreated")
        .required("ServiceTypeName", Str)
        .required("ApplicationName", Str)
        .required("ApplicationTypeName", Str)
        .required("ServiceInstance", Long)
        .required("IsStateful", Bool)
        .required("PartitionCount", Int)
        .required("TargetReplicaSetSize", Int)
        .required("MinReplicaSetSize", Int)
        .required("ServicePackageVersion", Str)
        .required("PartitionId", Guid);
}
