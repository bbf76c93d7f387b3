use std::sync::Arc;

use chrono::{TimeDelta, TimeZone, Utc};
use fabric_json_codec::{Codec, FieldType, Record, SchemaBuilder, Value};
use indexmap::IndexMap;
use proptest::prelude::*;
use uuid::Uuid;

fn codec() -> Codec {
    let mut schema = SchemaBuilder::new();
    schema.enumeration("State", ["Up", "Down", "Unknown"]);
    schema
        .family("Event", "Kind")
        .required("EventInstanceId", FieldType::Guid)
        .required("TimeStamp", FieldType::DateTime)
        .optional("HasCorrelatedEvents", FieldType::Bool);
    schema
        .object("NodeEvent")
        .extends("Event")
        .tag("NodeEvent")
        .required("NodeName", FieldType::Str)
        .optional("State", FieldType::enumeration("State"))
        .optional("Uptime", FieldType::TimeSpan)
        .optional("Load", FieldType::Double)
        .optional("Parameters", FieldType::pairs(FieldType::Str))
        .optional("Ids", FieldType::list(FieldType::Long));
    Codec::new(Arc::new(schema.build().unwrap()))
}

prop_compose! {
    fn node_event()(
        id in any::<u128>(),
        secs in 0i64..4_000_000_000,
        correlated in proptest::option::of(any::<bool>()),
        name in "[A-Za-z0-9_./ \"\\\\-]{0,12}",
        state in proptest::option::of(prop_oneof![Just("Up"), Just("Down"), Just("Unknown")]),
        uptime in proptest::option::of(-1_000_000i64..1_000_000),
        load in proptest::option::of(-1.0e6f64..1.0e6),
        parameters in proptest::option::of(proptest::collection::vec(("[a-z]{1,6}", "[ -~]{0,8}"), 0..4)),
        ids in proptest::option::of(proptest::collection::vec(any::<i64>(), 0..4)),
    ) -> Record {
        let codec = codec();
        let parameters = parameters.map(|pairs| {
            pairs
                .into_iter()
                .map(|(k, v)| (k, Value::from(v)))
                .collect::<IndexMap<_, _>>()
        });
        codec
            .registry()
            .record("NodeEvent")
            .unwrap()
            .set("EventInstanceId", Uuid::from_u128(id))
            .set("TimeStamp", Utc.timestamp_opt(secs, 0).unwrap())
            .set_opt("HasCorrelatedEvents", correlated)
            .set("NodeName", name)
            .set_opt("State", state.map(Value::enumeration))
            .set_opt("Uptime", uptime.map(TimeDelta::milliseconds))
            .set_opt("Load", load)
            .set_opt("Parameters", parameters)
            .set_opt("Ids", ids.map(|ids| ids.into_iter().map(Value::Long).collect::<Vec<_>>()))
            .build()
            .unwrap()
    }
}

proptest! {
    #[test]
    fn decode_of_encode_is_identity(record in node_event()) {
        let codec = codec();
        let text = codec.encode_record(&record).unwrap();
        prop_assert!(text.starts_with(r#"{"Kind":"NodeEvent","#), "unexpected prefix: {}", text);
        let via_family = codec.decode_record("Event", &text).unwrap();
        let via_type = codec.decode_record("NodeEvent", &text).unwrap();
        prop_assert_eq!(&via_family, &record);
        prop_assert_eq!(&via_type, &record);
        prop_assert_eq!(codec.encode_record(&via_family).unwrap(), text);
    }
}
