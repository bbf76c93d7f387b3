use std::sync::Arc;

use fabric_json_codec::{Codec, CodecError, CodecOptions, FieldType, SchemaBuilder, SchemaDocument, Value};
use serde_json::json;

const SCHEMA: &str = r#"{
    "enums": [{ "name": "Level", "values": ["Low", "High"] }],
    "types": [
        { "id": "Check", "discriminator": "Kind", "abstract": true,
          "fields": [{ "name": "Weight", "type": "int32" }] },
        { "id": "SeedCheck", "extends": "Check", "tag": "Seed" },
        { "id": "PartitionCheck", "extends": "Check", "abstract": true,
          "fields": [{ "name": "PartitionId", "type": "guid", "required": true }] },
        { "id": "QuorumCheck", "extends": "PartitionCheck", "tag": "Quorum",
          "fields": [{ "name": "Level", "type": "enum:Level" }] },
        { "id": "SwapCheck", "extends": "PartitionCheck", "tag": "Swap" },
        { "id": "CheckWrapper",
          "fields": [
            { "name": "Check", "type": "ref:Check", "required": true },
            { "name": "Children", "type": "list<ref:CheckWrapper>" }
          ] }
    ]
}"#;

const PID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

fn codec() -> Codec {
    let doc = SchemaDocument::from_json(SCHEMA).unwrap();
    let mut schema = SchemaBuilder::new();
    schema.import(&doc).unwrap();
    Codec::new(Arc::new(schema.build().unwrap()))
}

#[test]
fn dispatch_from_every_ancestor_matrix() {
    let codec = codec();
    let payload = json!({"PartitionId": PID, "Level": "High", "Kind": "Quorum"}).to_string();
    let via_root = codec.decode("Check", &payload).unwrap();
    let via_mid = codec.decode("PartitionCheck", &payload).unwrap();
    let via_leaf = codec.decode("QuorumCheck", &payload).unwrap();
    assert_eq!(via_root, via_mid);
    assert_eq!(via_mid, via_leaf);

    let record = via_root.as_record().unwrap();
    assert_eq!(record.type_id(), "QuorumCheck");
    assert_eq!(record.get_enum("Level"), Some("High"));
    assert_eq!(record.get_guid("PartitionId").unwrap().to_string(), PID);
}

#[test]
fn discriminator_position_does_not_matter_matrix() {
    let codec = codec();
    let payloads = [
        format!(r#"{{"Kind":"Quorum","PartitionId":"{PID}","Weight":2}}"#),
        format!(r#"{{"PartitionId":"{PID}","Kind":"Quorum","Weight":2}}"#),
        format!(r#"{{"PartitionId":"{PID}","Weight":2,"Kind":"Quorum"}}"#),
    ];
    let decoded: Vec<_> = payloads.iter().map(|p| codec.decode("Check", p).unwrap()).collect();
    assert_eq!(decoded[0], decoded[1]);
    assert_eq!(decoded[1], decoded[2]);
    assert_eq!(
        codec.encode(&decoded[2]).unwrap(),
        format!(r#"{{"Kind":"Quorum","PartitionId":"{PID}","Weight":2}}"#)
    );
}

#[test]
fn discriminator_failures_matrix() {
    let codec = codec();
    let cases: [(&str, &str, fn(&CodecError) -> bool); 5] = [
        ("Check", r#"{"Kind":"Future"}"#, |e| {
            matches!(e, CodecError::UnknownDiscriminator { value, .. } if value == "Future")
        }),
        ("Check", r#"{"Kind":"quorum"}"#, |e| {
            matches!(e, CodecError::UnknownDiscriminator { .. })
        }),
        ("PartitionCheck", r#"{"Kind":"Seed"}"#, |e| {
            matches!(e, CodecError::UnknownDiscriminator { .. })
        }),
        ("Check", r#"{"Weight":1}"#, |e| {
            matches!(e, CodecError::MissingDiscriminatorProperty { property, .. } if property == "Kind")
        }),
        ("Check", r#"{"Kind":7}"#, |e| matches!(e, CodecError::MalformedValue { .. })),
    ];
    for (name, payload, check) in cases {
        let err = codec.decode(name, payload).unwrap_err();
        assert!(check(&err), "{name} {payload}: {err:?}");
    }
}

#[test]
fn abstract_intermediate_tag_is_rejected() {
    let mut schema = SchemaBuilder::new();
    schema.family("Root", "Kind");
    schema.object("Mid").extends("Root").tag("Mid").abstract_();
    schema.object("Leaf").extends("Mid").tag("Leaf");
    let codec = Codec::new(Arc::new(schema.build().unwrap()));
    assert!(matches!(
        codec.decode("Root", r#"{"Kind":"Mid"}"#),
        Err(CodecError::UnknownDiscriminator { .. })
    ));
    let leaf = codec.decode("Root", r#"{"Kind":"Leaf"}"#).unwrap();
    assert_eq!(leaf.as_record().unwrap().type_id(), "Leaf");
}

#[test]
fn nested_polymorphic_lists_report_paths_matrix() {
    let codec = codec();
    let payload = json!({
        "Check": {"Kind": "Seed"},
        "Children": [
            {"Check": {"Kind": "Swap", "PartitionId": PID}},
            null,
            {"Check": {"Kind": "Quorum", "PartitionId": PID, "Level": "Medium"}}
        ]
    })
    .to_string();
    let err = codec.decode("CheckWrapper", &payload).unwrap_err();
    match err {
        CodecError::UnknownEnumValue { enum_name, value, path } => {
            assert_eq!(enum_name, "Level");
            assert_eq!(value, "Medium");
            assert_eq!(path, "/Children/2/Check/Level");
        }
        other => panic!("unexpected {other:?}"),
    }

    let ok = payload.replace("Medium", "Low");
    let value = codec.decode("CheckWrapper", &ok).unwrap();
    let children = value.as_record().unwrap().get_list("Children").unwrap();
    assert_eq!(children.len(), 2);
    let kinds: Vec<_> = children
        .iter()
        .map(|c| c.as_record().unwrap().get_record("Check").unwrap().tag().unwrap())
        .collect();
    assert_eq!(kinds, vec!["Swap", "Quorum"]);
}

#[test]
fn deferred_values_are_checked_after_dispatch() {
    let codec = codec();
    let err = codec
        .decode("Check", r#"{"PartitionId":"nope","Kind":"Swap"}"#)
        .unwrap_err();
    assert_eq!(err.path(), Some("/PartitionId"));

    // unknown to the resolved type: dropped without looking at the value
    let value = codec
        .decode("Check", r#"{"PartitionId":"nope","Kind":"Seed"}"#)
        .unwrap();
    assert_eq!(value.as_record().unwrap().type_id(), "SeedCheck");
}

fn retyping_codec() -> Codec {
    let mut schema = SchemaBuilder::new();
    schema.family("Base", "Kind").optional("X", FieldType::Long);
    schema
        .object("Child")
        .extends("Base")
        .tag("Child")
        .optional("X", FieldType::Str);
    schema.object("Other").extends("Base").tag("Other");
    schema.object("Mid").extends("Base").tag("Mid");
    schema
        .object("MidLeaf")
        .extends("Mid")
        .tag("MidLeaf")
        .required("X", FieldType::Str);
    Codec::new(Arc::new(schema.build().unwrap()))
}

#[test]
fn retyped_field_decodes_with_discriminator_anywhere_matrix() {
    let codec = retyping_codec();
    let cases = [
        ("Child", r#""abc""#, Value::from("abc")),
        ("MidLeaf", r#""abc""#, Value::from("abc")),
        ("Other", "7", Value::Long(7)),
        ("Mid", "7", Value::Long(7)),
    ];
    for (tag, x, expected) in cases {
        let first = format!(r#"{{"Kind":"{tag}","X":{x}}}"#);
        let last = format!(r#"{{"X":{x},"Kind":"{tag}"}}"#);
        for entry in ["Base", tag] {
            for payload in [&first, &last] {
                let value = codec.decode(entry, payload).unwrap();
                let record = value.as_record().unwrap();
                assert_eq!(record.tag(), Some(tag), "{entry} {payload}");
                assert_eq!(record.get("X"), Some(&expected), "{entry} {payload}");
            }
        }
    }

    let err = codec.decode("Base", r#"{"X":"abc","Kind":"Other"}"#).unwrap_err();
    assert_eq!(err.path(), Some("/X"));
}

#[test]
fn repeated_discriminator_last_one_wins() {
    let codec = codec();
    let swap = codec
        .decode("Check", &format!(r#"{{"Kind":"Quorum","PartitionId":"{PID}","Level":"Low","Kind":"Swap"}}"#))
        .unwrap();
    let record = swap.as_record().unwrap();
    assert_eq!(record.type_id(), "SwapCheck");
    assert_eq!(record.get_guid("PartitionId").unwrap().to_string(), PID);
    assert!(record.get("Level").is_none());

    let quorum = codec
        .decode("Check", &format!(r#"{{"Kind":"Seed","Level":"High","Kind":"Quorum","PartitionId":"{PID}"}}"#))
        .unwrap();
    let record = quorum.as_record().unwrap();
    assert_eq!(record.type_id(), "QuorumCheck");
    assert_eq!(record.get_enum("Level"), None);

    let retyped = retyping_codec()
        .decode("Base", r#"{"Kind":"Mid","X":"abc","Kind":"MidLeaf"}"#)
        .unwrap();
    assert_eq!(retyped.as_record().unwrap().get_str("X"), Some("abc"));

    assert!(matches!(
        codec.decode("Check", r#"{"Kind":"Quorum","Kind":"Future"}"#),
        Err(CodecError::UnknownDiscriminator { value, .. }) if value == "Future"
    ));
}

#[test]
fn depth_limit_matrix() {
    let codec = codec().with_options(CodecOptions::default().with_max_depth(5));
    let leaf = json!({"Check": {"Kind": "Seed"}});
    let one = json!({"Check": {"Kind": "Seed"}, "Children": [leaf]});
    let two = json!({"Check": {"Kind": "Seed"}, "Children": [one]});
    assert!(codec.decode("CheckWrapper", &one.to_string()).is_ok());
    assert!(matches!(
        codec.decode("CheckWrapper", &two.to_string()),
        Err(CodecError::DepthLimitExceeded { limit: 5, .. })
    ));

    let decoded = codec
        .clone()
        .with_options(CodecOptions::default())
        .decode("CheckWrapper", &two.to_string())
        .unwrap();
    assert!(matches!(
        codec.encode(&decoded),
        Err(CodecError::DepthLimitExceeded { limit: 5, .. })
    ));
}

#[test]
fn registry_is_shared_across_threads() {
    let codec = codec();
    let payload = json!({"Kind": "Quorum", "PartitionId": PID}).to_string();
    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..50 {
                    let value = codec.decode("Check", &payload).unwrap();
                    assert_eq!(codec.encode(&value).unwrap(), payload);
                }
            });
        }
    });
}

#[test]
fn encode_rejects_values_outside_declared_hierarchy() {
    let codec = codec();
    let seed = codec.registry().record("SeedCheck").unwrap().build().unwrap();
    assert!(matches!(
        codec.encode_as("PartitionCheck", &Value::from(seed.clone())),
        Err(CodecError::TypeMismatch { .. })
    ));
    let wrapper = codec
        .registry()
        .record("CheckWrapper")
        .unwrap()
        .set("Check", seed)
        .set("Children", Vec::<Value>::new())
        .build()
        .unwrap();
    assert_eq!(
        codec.encode(&wrapper.into()).unwrap(),
        r#"{"Check":{"Kind":"Seed"},"Children":[]}"#
    );
    assert!(matches!(
        codec.encode_as("Check", &Value::from("text")),
        Err(CodecError::TypeMismatch { .. })
    ));
    assert_eq!(
        codec.registry().resolve("CheckWrapper").unwrap(),
        FieldType::object("CheckWrapper")
    );
}
