//! `HealthEvaluation` family and the health event it can point at.
//! Evaluations nest through `HealthEvaluationWrapper` lists.

use fabric_json_codec::{FieldType, SchemaBuilder};

use FieldType::{Bool, DateTime, Guid, Int, Long, Str, TimeSpan};

fn health_state() -> FieldType {
    FieldType::enumeration("HealthState")
}

fn unhealthy_evaluations() -> FieldType {
    FieldType::list(FieldType::object("HealthEvaluationWrapper"))
}

pub(crate) fn register(schema: &mut SchemaBuilder) {
    schema
        .object("HealthEvent")
        .optional("SourceId", Str)
        .optional("Property", Str)
        .optional("HealthState", health_state())
        .optional("TimeToLiveInMilliSeconds", TimeSpan)
        .optional("Description", Str)
        .optional("SequenceNumber", Str)
        .optional("RemoveWhenExpired", Bool)
        .optional("HealthReportId", Str)
        .optional("SourceUtcTimestamp", DateTime)
        .optional("LastModifiedUtcTimestamp", DateTime)
        .optional("IsExpired", Bool)
        .optional("LastOkTransitionAt", DateTime)
        .optional("LastWarningTransitionAt", DateTime)
        .optional("LastErrorTransitionAt", DateTime);

    schema
        .family("HealthEvaluation", "Kind")
        .optional("AggregatedHealthState", health_state())
        .optional("Description", Str);
    schema
        .object("HealthEvaluationWrapper")
        .optional("HealthEvaluation", FieldType::object("HealthEvaluation"));

    schema
        .object("ApplicationHealthEvaluation")
        .extends("HealthEvaluation")
        .tag("Application")
        .optional("ApplicationName", Str)
        .optional("UnhealthyEvaluations", unhealthy_evaluations());
    schema
        .object("ApplicationsHealthEvaluation")
        .extends("HealthEvaluation")
        .tag("Applications")
        .optional("MaxPercentUnhealthyApplications", Int)
        .optional("TotalCount", Long)
        .optional("UnhealthyEvaluations", unhealthy_evaluations());
    schema
        .object("NodeHealthEvaluation")
        .extends("HealthEvaluation")
        .tag("Node")
        .optional("NodeName", Str)
        .optional("UnhealthyEvaluations", unhealthy_evaluations());
    schema
        .object("NodesHealthEvaluation")
        .extends("HealthEvaluation")
        .tag("Nodes")
        .optional("MaxPercentUnhealthyNodes", Int)
        .optional("TotalCount", Long)
        .optional("UnhealthyEvaluations", unhealthy_evaluations());
    schema
        .object("PartitionHealthEvaluation")
        .extends("HealthEvaluation")
        .tag("Partition")
        .optional("PartitionId", Guid)
        .optional("UnhealthyEvaluations", unhealthy_evaluations());
    schema
        .object("ReplicaHealthEvaluation")
        .extends("HealthEvaluation")
        .tag("Replica")
        .optional("PartitionId", Guid)
        .optional("ReplicaOrInstanceId", Str)
        .optional("UnhealthyEvaluations", unhealthy_evaluations());
    schema
        .object("ServiceHealthEvaluation")
        .extends("HealthEvaluation")
        .tag("Service")
        .optional("ServiceName", Str)
        .optional("UnhealthyEvaluations", unhealthy_evaluations());
    schema
        .object("EventHealthEvaluation")
        .extends("HealthEvaluation")
        .tag("Event")
        .optional("ConsiderWarningAsError", Bool)
        .optional("UnhealthyEvent", FieldType::object("HealthEvent"));
}
