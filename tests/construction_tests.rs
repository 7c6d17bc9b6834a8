//! Record construction tests
//!
//! Attribute validation for every record kind, namespace handling and
//! identifier generation.

use chrono::{FixedOffset, NaiveDate, TimeZone};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use provdm::records::attributes;
use provdm::records::AttributeType;
use provdm::{
    AttributeId, Error, Identifier, Name, Namespace, ProvDocument, RawValue, RecordKind, Timestamp,
};
use std::collections::HashSet;

fn document() -> ProvDocument {
    let mut doc = ProvDocument::new();
    doc.add_namespace("ex", "http://example.org/").unwrap();
    doc
}

/// A value `accepts` takes in a document built by `document_with_elements`
fn valid_value(accepts: AttributeType) -> RawValue {
    match accepts {
        AttributeType::Record(kinds) => match kinds[0] {
            RecordKind::Entity => "ex:e".into(),
            RecordKind::Activity => "ex:a".into(),
            RecordKind::Agent => "ex:ag".into(),
            other => panic!("no sample record of kind {}", other),
        },
        AttributeType::Identifier => "ex:elsewhere".into(),
        AttributeType::DateTime => "2020-01-01T00:00:00".into(),
    }
}

fn document_with_elements() -> ProvDocument {
    let mut doc = document();
    let mut root = doc.root_mut();
    root.entity("ex:e", vec![]).unwrap();
    root.activity("ex:a", None, None, vec![]).unwrap();
    root.agent("ex:ag", vec![]).unwrap();
    doc
}

#[test]
fn test_missing_required_attribute_for_every_kind() {
    let mut checked = 0;
    for kind in RecordKind::ALL {
        let schema = attributes::schema(kind);
        for omitted in schema.iter().filter(|spec| spec.is_required()) {
            let others: Vec<(AttributeId, RawValue)> = schema
                .iter()
                .filter(|spec| spec.is_required() && spec.id != omitted.id)
                .map(|spec| (spec.id, valid_value(spec.accepts)))
                .collect();
            let mut doc = document_with_elements();
            let err = doc.root_mut().add_record(kind, None, others, Vec::new()).unwrap_err();
            match err {
                Error::MissingRequiredAttribute { kind: label, attribute } => {
                    assert_eq!(label, kind.label());
                    assert_eq!(attribute, omitted.id.key());
                }
                other => panic!("{} without {}: unexpected error {:?}", kind, omitted.id, other),
            }
            checked += 1;
        }
    }
    // every required slot of the relation kinds
    assert_eq!(checked, 25);
}

#[test]
fn test_required_attributes_alone_are_enough() {
    for kind in RecordKind::ALL.into_iter().filter(|kind| kind.is_relation()) {
        let required: Vec<(AttributeId, RawValue)> = attributes::schema(kind)
            .iter()
            .filter(|spec| spec.is_required())
            .map(|spec| (spec.id, valid_value(spec.accepts)))
            .collect();
        let mut doc = document_with_elements();
        let extras = match kind {
            RecordKind::Invalidation => vec![("ex:reason".into(), "expired".into())],
            _ => Vec::new(),
        };
        let result = doc.root_mut().add_record(kind, None, required, extras);
        assert!(result.is_ok(), "{}: {:?}", kind, result);
    }
}

#[test]
fn test_elements_need_no_attributes() {
    let mut doc = document();
    let mut root = doc.root_mut();
    for (kind, name) in [
        (RecordKind::Entity, "ex:e"),
        (RecordKind::Activity, "ex:a"),
        (RecordKind::Agent, "ex:ag"),
    ] {
        assert!(root.add_record(kind, Some(name.into()), Vec::new(), Vec::new()).is_ok());
    }
    assert_eq!(doc.len(), 3);
}

#[test]
fn test_undeclared_attribute_rejected() {
    let mut doc = document();
    let mut root = doc.root_mut();
    root.entity("ex:e1", vec![]).unwrap();
    let err = root
        .add_record(
            RecordKind::Entity,
            Some("ex:e2".into()),
            vec![(AttributeId::Plan, "ex:e1".into())],
            Vec::new(),
        )
        .unwrap_err();
    assert!(matches!(err, Error::InvalidAttributeType { kind: "entity", .. }));
}

#[test]
fn test_timestamp_inputs() {
    let mut doc = document();
    let noon = NaiveDate::from_ymd_opt(2021, 6, 1).unwrap().and_hms_opt(12, 0, 0).unwrap();
    let offset = FixedOffset::east_opt(2 * 3600).unwrap().from_local_datetime(&noon).unwrap();

    let mut root = doc.root_mut();
    let a1 = root.activity("ex:a1", Some(noon.into()), Some(offset.into()), vec![]);
    // 12:00+02:00 is before 12:00 UTC
    assert!(matches!(a1, Err(Error::DomainConstraint { .. })));

    let a2 = root
        .activity("ex:a2", Some(offset.into()), Some(noon.into()), vec![])
        .unwrap();
    let start = doc.record(a2).attribute(AttributeId::StartTime).unwrap().as_timestamp().unwrap();
    assert_eq!(start.to_iso(), "2021-06-01T12:00:00+02:00");
}

#[test]
fn test_namespace_collision_renames_prefix() {
    let mut doc = document();
    let renamed = doc.add_namespace("ex", "http://other.example.org/").unwrap();
    assert_eq!(renamed.prefix(), "ex_1");

    let same = doc.add_namespace("ex", "http://example.org/").unwrap();
    assert_eq!(same.prefix(), "ex");

    let foreign = Namespace::new("ex", "http://third.example.org/");
    let e1 = doc
        .root_mut()
        .entity(Name::from(foreign.qname("thing")), vec![])
        .unwrap();
    let identifier = doc.record(e1).identifier().unwrap().clone();
    assert_eq!(identifier.to_string(), "ex_2:thing");
    assert_eq!(identifier.uri(), "http://third.example.org/thing");

    let decoded = ProvDocument::from_json_value(&doc.to_json()).unwrap();
    assert_eq!(decoded, doc);
    assert!(decoded.get_record(Identifier::uri_ref("http://third.example.org/thing")).is_some());
}

#[test]
fn test_invalid_namespaces_rejected() {
    let mut doc = ProvDocument::new();
    assert!(matches!(doc.add_namespace("1ex", "http://example.org/"), Err(Error::Namespace(_))));
    assert!(matches!(doc.add_namespace("ex", "not a uri"), Err(Error::Namespace(_))));
    assert!(doc.set_default_namespace("relative/path").is_err());
}

#[test]
fn test_lookup_by_uri_and_qname() {
    let mut doc = document();
    doc.root_mut().entity("ex:e1", vec![]).unwrap();
    let ex = doc.namespaces().get_namespace("ex").unwrap().clone();

    assert!(doc.get_record("http://example.org/e1").is_some());
    assert!(doc.get_record(ex.qname("e1")).is_some());
    assert!(doc.get_record("_:e1").is_none());
}

#[test]
fn test_blank_identifier_creates_unidentified_record() {
    let mut doc = document();
    let e = doc.root_mut().entity("_:local", vec![]).unwrap();
    assert!(doc.record(e).identifier().is_none());
}

proptest! {
    #[test]
    fn prop_anonymous_identifiers_are_distinct(count in 1usize..200) {
        let mut doc = ProvDocument::new();
        let ids: HashSet<String> = (0..count).map(|_| doc.anonymous().to_string()).collect();
        prop_assert_eq!(ids.len(), count);
        prop_assert!(ids.iter().all(|id| id.starts_with("_:id")));
    }

    #[test]
    fn prop_timestamp_iso_round_trip(
        year in 1900i32..2100,
        month in 1u32..=12,
        day in 1u32..=28,
        hour in 0u32..24,
        minute in 0u32..60,
        second in 0u32..60,
        micros in prop::option::of(1u32..1_000_000),
        offset_minutes in prop::option::of(-14 * 60i32..=14 * 60),
    ) {
        let local = NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_micro_opt(hour, minute, second, micros.unwrap_or(0))
            .unwrap();
        let ts = match offset_minutes {
            Some(minutes) => {
                let offset = FixedOffset::east_opt(minutes * 60).unwrap();
                Timestamp::with_offset(offset.from_local_datetime(&local).unwrap())
            }
            None => Timestamp::naive(local),
        };
        let parsed = Timestamp::parse(&ts.to_iso()).unwrap();
        prop_assert_eq!(parsed, ts);
    }
}
