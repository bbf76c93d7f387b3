//! Application and node DTOs, plus the `ApplicationParameters` pair list.

use fabric_json_codec::{FieldType, SchemaBuilder};

use FieldType::{Bool, DateTime, Str};

pub const APPLICATION_PARAMETERS: &str = "ApplicationParameters";

fn parameters() -> FieldType {
    FieldType::pairs(Str)
}

pub(crate) fn register(schema: &mut SchemaBuilder) {
    schema.alias(APPLICATION_PARAMETERS, parameters());

    schema
        .object("ApplicationDescription")
        .required("Name", Str)
        .required("TypeName", Str)
        .required("TypeVersion", Str)
        .optional("ParameterList", parameters());
    schema
        .object("ApplicationInfo")
        .optional("Id", Str)
        .optional("Name", Str)
        .optional("TypeName", Str)
        .optional("TypeVersion", Str)
        .optional("Status", FieldType::enumeration("ApplicationStatus"))
        .optional("Parameters", parameters())
        .optional("HealthState", FieldType::enumeration("HealthState"))
        .optional(
            "ApplicationDefinitionKind",
            FieldType::enumeration("ApplicationDefinitionKind"),
        );

    schema.object("NodeId").optional("Id", Str);
    schema
        .object("NodeInfo")
        .optional("Name", Str)
        .optional("IpAddressOrFQDN", Str)
        .optional("Type", Str)
        .optional("CodeVersion", Str)
        .optional("ConfigVersion", Str)
        .optional("NodeStatus", FieldType::enumeration("NodeStatus"))
        .optional("NodeUpTimeInSeconds", Str)
        .optional("HealthState", FieldType::enumeration("HealthState"))
        .optional("IsSeedNode", Bool)
        .optional("UpgradeDomain", Str)
        .optional("FaultDomain", Str)
        .optional("Id", FieldType::object("NodeId"))
        .optional("InstanceId", Str)
        .optional("IsStopped", Bool)
        .optional("NodeDownTimeInSeconds", Str)
        .optional("NodeUpAt", DateTime)
        .optional("NodeDownAt", DateTime);
}
