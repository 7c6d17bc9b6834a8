//! Structural equality of bundles
//!
//! Identified records are matched by kind and identifier; unidentified
//! records by searching for the first structurally equal counterpart that
//! has not been claimed yet. Not a canonical graph isomorphism test.

use super::{Bundle, ProvDocument};
use crate::records::{AttributeValue, ExtraValue, Record, RecordKind};
use crate::namespaces::Identifier;

impl<'a> Bundle<'a> {
    /// Compare two bundles structurally
    pub fn structurally_eq(&self, other: &Bundle<'_>) -> bool {
        bundles_eq(*self, *other)
    }
}

impl PartialEq for Bundle<'_> {
    fn eq(&self, other: &Self) -> bool {
        bundles_eq(*self, *other)
    }
}

impl PartialEq for ProvDocument {
    fn eq(&self, other: &Self) -> bool {
        bundles_eq(self.root(), other.root())
    }
}

fn bundles_eq(a: Bundle<'_>, b: Bundle<'_>) -> bool {
    if a.len() != b.len() {
        tracing::debug!(left = a.len(), right = b.len(), "bundles differ in record count");
        return false;
    }

    let mut pool: Vec<&Record> = b.records().filter(|r| r.identifier().is_none()).collect();
    for record in a.records() {
        let matched = match record.identifier() {
            Some(id) => match counterpart(b, record.kind(), id) {
                Some(other) => records_eq(a.doc, record, b.doc, other),
                None => {
                    tracing::debug!(identifier = %id, kind = record.kind().label(), "no counterpart");
                    false
                }
            },
            None => match pool.iter().position(|other| records_eq(a.doc, record, b.doc, other)) {
                Some(index) => {
                    pool.swap_remove(index);
                    true
                }
                None => false,
            },
        };
        if !matched {
            tracing::debug!(record = %record.id(), kind = record.kind().label(), "records differ");
            return false;
        }
    }
    true
}

fn counterpart<'b>(bundle: Bundle<'b>, kind: RecordKind, id: &Identifier) -> Option<&'b Record> {
    let doc = bundle.doc;
    let found = if kind == RecordKind::Bundle {
        doc.local_bundle(bundle.id, id).and_then(|b| doc.bundle_record(b))
    } else {
        doc.local_record(bundle.id, id)
    };
    found.map(|id| doc.record(id)).filter(|other| other.kind() == kind)
}

fn records_eq(a_doc: &ProvDocument, a: &Record, b_doc: &ProvDocument, b: &Record) -> bool {
    if a.kind() != b.kind() || a.identifier() != b.identifier() {
        return false;
    }

    let attributes_eq = a
        .attributes()
        .zip(b.attributes())
        .all(|((_, x), (_, y))| values_eq(a_doc, x, b_doc, y));
    if !attributes_eq || !extras_eq(a.extra_attributes(), b.extra_attributes()) {
        return false;
    }

    match (a.sub_bundle(), b.sub_bundle()) {
        (Some(x), Some(y)) => bundles_eq(a_doc.bundle(x), b_doc.bundle(y)),
        (None, None) => true,
        _ => false,
    }
}

fn values_eq(
    a_doc: &ProvDocument,
    a: Option<&AttributeValue>,
    b_doc: &ProvDocument,
    b: Option<&AttributeValue>,
) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(AttributeValue::Reference(x)), Some(AttributeValue::Reference(y))) => {
            let (x, y) = (a_doc.record(*x), b_doc.record(*y));
            match (x.identifier(), y.identifier()) {
                (Some(x_id), Some(y_id)) => x.kind() == y.kind() && x_id == y_id,
                (None, None) => records_eq(a_doc, x, b_doc, y),
                _ => false,
            }
        }
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// Multiset comparison of extra attributes
fn extras_eq(a: &[(Identifier, ExtraValue)], b: &[(Identifier, ExtraValue)]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut remaining: Vec<&(Identifier, ExtraValue)> = b.iter().collect();
    a.iter().all(|item| match remaining.iter().position(|other| *other == item) {
        Some(index) => {
            remaining.swap_remove(index);
            true
        }
        None => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(order: &[&str]) -> ProvDocument {
        let mut doc = ProvDocument::new();
        doc.add_namespace("ex", "http://example.org/").unwrap();
        let mut root = doc.root_mut();
        root.entity("ex:e1", vec![]).unwrap();
        root.activity("ex:a1", None, None, vec![]).unwrap();
        for step in order {
            match *step {
                "gen" => {
                    root.generation("ex:e1", Some("ex:a1".into()), None, None, vec![]).unwrap();
                }
                "use" => {
                    root.usage("ex:a1", Some("ex:e1".into()), None, None, vec![]).unwrap();
                }
                _ => unreachable!(),
            }
        }
        doc
    }

    #[test]
    fn test_unidentified_records_match_in_any_order() {
        assert!(build(&["gen", "use"]) == build(&["use", "gen"]));
    }

    #[test]
    fn test_different_counts_differ() {
        assert!(build(&["gen"]) != build(&["gen", "use"]));
    }

    #[test]
    fn test_each_counterpart_claimed_once() {
        assert!(build(&["gen", "gen"]) != build(&["gen", "use"]));
        assert!(build(&["gen", "gen"]) == build(&["gen", "gen"]));
    }

    #[test]
    fn test_extras_compared_as_multiset() {
        let make = |values: [&str; 2]| {
            let mut doc = ProvDocument::new();
            doc.add_namespace("ex", "http://example.org/").unwrap();
            let extras = values.iter().map(|v| ("ex:tag".into(), (*v).into())).collect();
            doc.root_mut().entity("ex:e1", extras).unwrap();
            doc
        };
        assert!(make(["a", "b"]) == make(["b", "a"]));
        assert!(make(["a", "a"]) != make(["a", "b"]));
    }

    #[test]
    fn test_nested_bundles_compared() {
        let make = |inner: &str| {
            let mut doc = ProvDocument::new();
            doc.add_namespace("ex", "http://example.org/").unwrap();
            let mut root = doc.root_mut();
            let mut b1 = root.bundle("ex:b1").unwrap();
            b1.entity(inner, vec![]).unwrap();
            doc
        };
        assert!(make("ex:x") == make("ex:x"));
        assert!(make("ex:x") != make("ex:y"));
    }
}
