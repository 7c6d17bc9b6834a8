//! PROV-JSON round-trip tests
//!
//! Documents are decoded, re-encoded and decoded again; the results must be
//! structurally equal and references must point at the decoded records.

use pretty_assertions::assert_eq;
use provdm::{AttributeId, DocumentConfig, Error, ProvDocument, ProvJsonConverter, RecordKind, TimeOrderPolicy};
use serde_json::json;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

const GENERATION_EXAMPLE: &str = r#"{
    "prefix": {"ex": "http://example.org/"},
    "entity": {"ex:e1": {}},
    "activity": {"ex:a1": {}},
    "wasGeneratedBy": {
        "_:g1": {
            "prov:entity": "ex:e1",
            "prov:activity": "ex:a1",
            "prov:time": "\"2020-01-01T00:00:00\"^^xsd:dateTime"
        }
    }
}"#;

#[test]
fn test_generation_example() {
    init_tracing();
    let doc = ProvDocument::from_json_str(GENERATION_EXAMPLE).unwrap();
    assert_eq!(doc.len(), 3);

    let e1 = doc.get_record("ex:e1").unwrap();
    let a1 = doc.get_record("ex:a1").unwrap();
    let generation = doc
        .root()
        .records()
        .find(|record| record.kind() == RecordKind::Generation)
        .unwrap();
    assert!(generation.identifier().is_none());
    assert_eq!(
        generation.attribute(AttributeId::Entity).unwrap().as_reference(),
        Some(e1.id())
    );
    assert_eq!(
        generation.attribute(AttributeId::Activity).unwrap().as_reference(),
        Some(a1.id())
    );
    assert_eq!(
        generation
            .attribute(AttributeId::Time)
            .unwrap()
            .as_timestamp()
            .unwrap()
            .to_iso(),
        "2020-01-01T00:00:00"
    );

    assert!(doc.get_provn().contains("wasGeneratedBy("));
}

#[test]
fn test_reencode_is_structurally_equal() {
    init_tracing();
    let doc = ProvDocument::from_json_str(GENERATION_EXAMPLE).unwrap();
    let text = doc.to_json_string().unwrap();
    let again = ProvDocument::from_json_str(&text).unwrap();
    assert_eq!(again, doc);
    assert_eq!(again.to_json(), doc.to_json());
}

#[test]
fn test_full_document_round_trip() {
    init_tracing();
    let mut doc = ProvDocument::new();
    doc.add_namespace("ex", "http://example.org/").unwrap();
    doc.set_default_namespace("http://default.example.org/").unwrap();
    {
        let mut root = doc.root_mut();
        root.entity("ex:article", vec![("ex:title".into(), "Provenance".into())]).unwrap();
        root.entity("ex:dataset", vec![]).unwrap();
        root.entity("ex:draft", vec![]).unwrap();
        root.entity("ex:chart", vec![]).unwrap();
        root.entity("ex:collection", vec![]).unwrap();
        root.activity(
            "ex:compose",
            Some("2020-01-01T09:00:00+01:00".into()),
            Some("2020-01-01T17:30:00.250+01:00".into()),
            vec![],
        )
        .unwrap();
        root.activity("ex:review", None, None, vec![]).unwrap();
        root.agent("ex:alice", vec![("prov:type".into(), provdm::Namespace::prov().qname("Person").into())])
            .unwrap();
        root.agent("ex:acme", vec![]).unwrap();

        root.usage("ex:compose", Some("ex:dataset".into()), None, None, vec![]).unwrap();
        root.generation("ex:article", Some("ex:compose".into()), None, Some("ex:gen".into()), vec![])
            .unwrap();
        root.communication("ex:review", "ex:compose", None, vec![]).unwrap();
        root.start("ex:compose", Some("ex:dataset".into()), None, None, None, vec![]).unwrap();
        root.end("ex:compose", None, Some("ex:review".into()), None, None, vec![]).unwrap();
        root.invalidation("ex:draft", Some("ex:compose".into()), None, None, vec![]).unwrap();
        root.revision("ex:article", "ex:draft", None, None, None, None, vec![]).unwrap();
        root.attribution("ex:article", "ex:alice", None, vec![]).unwrap();
        root.association("ex:compose", Some("ex:alice".into()), None, None, vec![]).unwrap();
        root.delegation("ex:alice", "ex:acme", Some("ex:compose".into()), None, vec![]).unwrap();
        root.influence("ex:article", "ex:dataset", None, None, vec![]).unwrap();
        root.specialization("ex:chart", "ex:article", vec![]).unwrap();
        root.alternate("ex:chart", "ex:dataset", vec![]).unwrap();
        root.membership("ex:collection", "ex:article", vec![]).unwrap();
        root.entity("local", vec![]).unwrap();
    }

    let text = doc.to_json_string().unwrap();
    let decoded = ProvDocument::from_json_str(&text).unwrap();
    assert_eq!(decoded.len(), doc.len());
    assert_eq!(decoded, doc);
    assert_eq!(
        decoded.get_record("local").unwrap().identifier().unwrap().uri(),
        "http://default.example.org/local"
    );

    let compose = decoded.get_record("ex:compose").unwrap();
    let end = compose.attribute(AttributeId::EndTime).unwrap().as_timestamp().unwrap();
    assert_eq!(end.to_iso(), "2020-01-01T17:30:00.250000+01:00");
}

#[test]
fn test_nested_bundle_visibility() {
    init_tracing();
    let value = json!({
        "prefix": {"ex": "http://example.org/"},
        "entity": {"ex:outer": {}},
        "bundle": {
            "ex:b1": {
                "entity": {"ex:inner": {}},
                "wasDerivedFrom": {
                    "_:d1": {"prov:generatedEntity": "ex:inner", "prov:usedEntity": "ex:outer"}
                }
            }
        }
    });
    let doc = ProvDocument::from_json_value(&value).unwrap();

    assert!(doc.get_record("ex:inner").is_none());
    let b1 = doc.get_bundle("ex:b1").unwrap();
    let inner = b1.get_record("ex:inner").unwrap();
    assert_eq!(inner.bundle(), b1.id());
    assert!(b1.get_record("ex:outer").is_some());

    let derivation = b1
        .records()
        .find(|record| record.kind() == RecordKind::Derivation)
        .unwrap();
    let used = derivation.attribute(AttributeId::UsedEntity).unwrap().as_reference().unwrap();
    assert_eq!(doc.record(used).identifier().unwrap().to_string(), "ex:outer");

    assert_eq!(ProvDocument::from_json_value(&doc.to_json()).unwrap(), doc);
}

#[test]
fn test_dangling_reference_fails() {
    let value = json!({
        "entity": {"e1": {}},
        "wasGeneratedBy": {"_:g1": {"prov:entity": "e1", "prov:activity": "a404"}}
    });
    let err = ProvDocument::from_json_value(&value).unwrap_err();
    assert!(matches!(err, Error::UnresolvedReference { attribute: "prov:activity", .. }));
}

#[test]
fn test_missing_required_attribute_fails() {
    let value = json!({
        "activity": {"a1": {}},
        "wasGeneratedBy": {"_:g1": {"prov:activity": "a1"}}
    });
    let err = ProvDocument::from_json_value(&value).unwrap_err();
    assert!(matches!(
        err,
        Error::MissingRequiredAttribute { kind: "wasGeneratedBy", attribute: "prov:entity" }
    ));
}

#[test]
fn test_decoder_config_applies() {
    let value = json!({
        "activity": {"a1": {
            "prov:startTime": "\"2020-01-02T00:00:00\"^^xsd:dateTime",
            "prov:endTime": "\"2020-01-01T00:00:00\"^^xsd:dateTime"
        }}
    });
    assert!(ProvDocument::from_json_value(&value).is_err());

    let lenient = ProvJsonConverter::with_config(DocumentConfig::default().with_time_order(TimeOrderPolicy::Warn));
    let doc = lenient.decode(&value).unwrap();
    assert_eq!(doc.config().time_order(), TimeOrderPolicy::Warn);
}

#[test]
fn test_anonymous_ids_skip_past_generated_identifiers() {
    let mut doc = ProvDocument::new();
    let generated = doc.anonymous();
    assert_eq!(generated.to_string(), "_:id1");
    let mut root = doc.root_mut();
    root.entity("e1", vec![]).unwrap();
    root.invalidation("e1", None, Some("2020-01-01T00:00:00".into()), None, vec![]).unwrap();
    assert_eq!(doc.to_json()["wasInvalidatedBy"].as_object().unwrap().keys().next().unwrap(), "_:id2");
}
