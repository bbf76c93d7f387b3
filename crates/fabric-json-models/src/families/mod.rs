//! Declarations of the catalog, one module per area of the management API.

use fabric_json_codec::SchemaBuilder;

pub mod application;
mod backup;
mod enums;
mod events;
mod health;
mod property;
mod safety;
mod service;

pub(crate) fn register(schema: &mut SchemaBuilder) {
    enums::register(schema);
    application::register(schema);
    events::register(schema);
    health::register(schema);
    property::register(schema);
    safety::register(schema);
    backup::register(schema);
    service::register(schema);
}
