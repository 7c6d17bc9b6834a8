//! Records and attribute validation
//!
//! A [`Record`] is built by its owning bundle. Raw attribute values are
//! checked against the kind's declarations and resolved into references,
//! identifiers or timestamps; construction fails if any required attribute
//! is missing or any value cannot be coerced.

use super::attributes::{self, AttributeId, AttributeSpec, AttributeType};
use super::datatypes::{BuiltinDatatype, Literal, Timestamp};
use super::kinds::RecordKind;
use super::values::{AttributeValue, ExtraValue, RawValue};
use crate::config::TimeOrderPolicy;
use crate::documents::{BundleId, ProvDocument, RecordId};
use crate::error::{Error, Result};
use crate::namespaces::{Identifier, Name, PROV_NAMESPACE};

/// Raw PROV attributes, keyed by attribute id
pub type RawAttributes = Vec<(AttributeId, RawValue)>;

/// Extra attributes before key resolution
pub type Extras = Vec<(Name, ExtraValue)>;

/// A PROV record
#[derive(Debug, Clone)]
pub struct Record {
    pub(crate) id: RecordId,
    pub(crate) kind: RecordKind,
    pub(crate) bundle: BundleId,
    pub(crate) identifier: Option<Identifier>,
    /// One slot per declared attribute, in declaration order
    pub(crate) attributes: Vec<(AttributeId, Option<AttributeValue>)>,
    pub(crate) extra: Vec<(Identifier, ExtraValue)>,
    /// Contents of a bundle record
    pub(crate) contents: Option<BundleId>,
}

impl Record {
    pub(crate) fn shell(
        id: RecordId,
        kind: RecordKind,
        bundle: BundleId,
        identifier: Option<Identifier>,
    ) -> Self {
        Self {
            id,
            kind,
            bundle,
            identifier,
            attributes: attributes::schema(kind).iter().map(|spec| (spec.id, None)).collect(),
            extra: Vec::new(),
            contents: None,
        }
    }

    /// Handle of this record in its document
    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Record kind
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Bundle that owns this record
    pub fn bundle(&self) -> BundleId {
        self.bundle
    }

    /// Identifier, if the record has one
    pub fn identifier(&self) -> Option<&Identifier> {
        self.identifier.as_ref()
    }

    /// Check if this record is an element
    pub fn is_element(&self) -> bool {
        self.kind.is_element()
    }

    /// Check if this record is a relation
    pub fn is_relation(&self) -> bool {
        self.kind.is_relation()
    }

    /// PROV attributes in declaration order; absent optional ones are `None`
    pub fn attributes(&self) -> impl Iterator<Item = (AttributeId, Option<&AttributeValue>)> {
        self.attributes.iter().map(|(id, value)| (*id, value.as_ref()))
    }

    /// Get one PROV attribute
    pub fn attribute(&self, id: AttributeId) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .find(|(attr, _)| *attr == id)
            .and_then(|(_, value)| value.as_ref())
    }

    /// Extra attributes, in insertion order
    pub fn extra_attributes(&self) -> &[(Identifier, ExtraValue)] {
        &self.extra
    }

    /// Values of `prov:type`
    pub fn asserted_types(&self) -> Vec<&ExtraValue> {
        self.extra
            .iter()
            .filter(|(key, _)| is_prov_type(key))
            .map(|(_, value)| value)
            .collect()
    }

    /// Contents of this record, if it is a bundle
    pub fn sub_bundle(&self) -> Option<BundleId> {
        self.contents
    }
}

fn is_prov_type(key: &Identifier) -> bool {
    key.uri().strip_prefix(PROV_NAMESPACE) == Some("type")
}

/// Check raw attributes against the schema of `kind` and resolve them
pub(crate) fn validate_attributes(
    doc: &mut ProvDocument,
    bundle: BundleId,
    kind: RecordKind,
    mut raw: RawAttributes,
    has_extras: bool,
) -> Result<Vec<(AttributeId, Option<AttributeValue>)>> {
    for (id, _) in &raw {
        attributes::lookup(kind, *id)?;
    }

    let mut resolved = Vec::with_capacity(attributes::schema(kind).len());
    for spec in attributes::schema(kind) {
        let value = match raw.iter().position(|(id, _)| *id == spec.id) {
            Some(index) => Some(resolve_value(doc, bundle, kind, spec, raw.swap_remove(index).1)?),
            None if spec.is_required() => {
                return Err(Error::MissingRequiredAttribute {
                    kind: kind.label(),
                    attribute: spec.id.key(),
                })
            }
            None => None,
        };
        resolved.push((spec.id, value));
    }

    check_constraints(doc, kind, &resolved, has_extras)?;
    Ok(resolved)
}

/// Resolve extra attribute keys and values through the namespace manager
///
/// A key naming one of `kind`'s PROV attributes is rejected.
pub(crate) fn resolve_extras(
    doc: &mut ProvDocument,
    kind: RecordKind,
    extras: Extras,
) -> Result<Vec<(Identifier, ExtraValue)>> {
    extras
        .into_iter()
        .map(|(key, value)| {
            let key = doc
                .namespaces_mut()
                .resolve(&key)
                .ok_or_else(|| Error::Name(format!("'{}' cannot be used as an attribute name", key)))?;
            if let Some(id) = declared_attribute(kind, &key) {
                return Err(Error::DomainConstraint {
                    kind: kind.label(),
                    detail: format!("{} is a PROV attribute and cannot be given as an extra attribute", id),
                });
            }
            let value = match value {
                ExtraValue::Identifier(id) => ExtraValue::Identifier(qualify(doc, id)),
                ExtraValue::Literal(literal) => {
                    let datatype = qualify(doc, literal.datatype().clone());
                    ExtraValue::Literal(Literal::new(literal.value(), datatype))
                }
                other => other,
            };
            Ok((key, value))
        })
        .collect()
}

/// Register the namespace of a QName, rebinding it if its prefix was renamed
fn qualify(doc: &mut ProvDocument, id: Identifier) -> Identifier {
    doc.namespaces_mut()
        .resolve(&Name::Identifier(id.clone()))
        .unwrap_or(id)
}

fn declared_attribute(kind: RecordKind, key: &Identifier) -> Option<AttributeId> {
    let local = key.uri().strip_prefix(PROV_NAMESPACE)?.to_string();
    AttributeId::from_key(&format!("prov:{}", local)).filter(|id| attributes::lookup(kind, *id).is_ok())
}

fn resolve_value(
    doc: &mut ProvDocument,
    bundle: BundleId,
    kind: RecordKind,
    spec: &AttributeSpec,
    raw: RawValue,
) -> Result<AttributeValue> {
    tracing::trace!(kind = kind.label(), attribute = spec.id.key(), value = %raw, "resolving attribute");
    let invalid = |raw: &RawValue| Error::InvalidAttributeType {
        kind: kind.label(),
        attribute: spec.id.key(),
        value: raw.to_string(),
        expected: spec.accepts.to_string(),
    };

    match spec.accepts {
        AttributeType::Record(accepted) => {
            let target = match &raw {
                RawValue::Record(target) if doc.is_visible(bundle, *target) => *target,
                RawValue::Record(target) => {
                    return Err(Error::UnresolvedReference {
                        kind: kind.label(),
                        attribute: spec.id.key(),
                        reference: doc
                            .get_record_by_id(*target)
                            .and_then(Record::identifier)
                            .map_or_else(|| target.to_string(), ToString::to_string),
                    })
                }
                RawValue::Identifier(_) | RawValue::Text(_) => {
                    let id = raw_identifier(doc, &raw).ok_or_else(|| invalid(&raw))?;
                    doc.find_record(bundle, &id)
                        .or_else(|| doc.find_bundle(bundle, &id).and_then(|b| doc.bundle_record(b)))
                        .ok_or_else(|| Error::UnresolvedReference {
                            kind: kind.label(),
                            attribute: spec.id.key(),
                            reference: raw.to_string(),
                        })?
                }
                RawValue::Timestamp(_) | RawValue::Literal(_) => return Err(invalid(&raw)),
            };
            let target_kind = doc.record(target).kind();
            if accepted.iter().any(|expected| target_kind.satisfies(*expected)) {
                Ok(AttributeValue::Reference(target))
            } else {
                Err(invalid(&raw))
            }
        }
        AttributeType::Identifier => match &raw {
            RawValue::Record(target) => doc
                .record(*target)
                .identifier()
                .cloned()
                .map(AttributeValue::Identifier)
                .ok_or_else(|| invalid(&raw)),
            RawValue::Identifier(id) => doc
                .namespaces_mut()
                .resolve(&Name::Identifier(id.clone()))
                .map(AttributeValue::Identifier)
                .ok_or_else(|| invalid(&raw)),
            RawValue::Text(text) => doc
                .namespaces_mut()
                .resolve(&Name::Text(text.clone()))
                .map(AttributeValue::Identifier)
                .ok_or_else(|| invalid(&raw)),
            RawValue::Timestamp(_) | RawValue::Literal(_) => Err(invalid(&raw)),
        },
        AttributeType::DateTime => match &raw {
            RawValue::Timestamp(ts) => Ok(AttributeValue::Timestamp(*ts)),
            RawValue::Text(text) => Timestamp::parse(text)
                .map(AttributeValue::Timestamp)
                .map_err(|_| invalid(&raw)),
            RawValue::Literal(literal)
                if BuiltinDatatype::from_uri(&literal.datatype().uri())
                    == Some(BuiltinDatatype::DateTime) =>
            {
                Timestamp::parse(literal.value())
                    .map(AttributeValue::Timestamp)
                    .map_err(|_| invalid(&raw))
            }
            _ => Err(invalid(&raw)),
        },
    }
}

/// Identifier named by a raw value, without registering anything
pub(crate) fn raw_identifier(doc: &ProvDocument, raw: &RawValue) -> Option<Identifier> {
    match raw {
        RawValue::Identifier(id) => Some(id.clone()),
        RawValue::Text(text) => doc.namespaces().lookup(text),
        _ => None,
    }
}

fn check_constraints(
    doc: &ProvDocument,
    kind: RecordKind,
    resolved: &[(AttributeId, Option<AttributeValue>)],
    has_extras: bool,
) -> Result<()> {
    let get = |id: AttributeId| {
        resolved
            .iter()
            .find(|(attr, _)| *attr == id)
            .and_then(|(_, value)| value.as_ref())
    };

    match kind {
        RecordKind::Invalidation => {
            if get(AttributeId::Activity).is_none() && get(AttributeId::Time).is_none() && !has_extras {
                return Err(Error::DomainConstraint {
                    kind: kind.label(),
                    detail: "at least one of prov:activity, prov:time or an extra attribute must be present"
                        .to_string(),
                });
            }
        }
        RecordKind::Activity => {
            let start = get(AttributeId::StartTime).and_then(AttributeValue::as_timestamp);
            let end = get(AttributeId::EndTime).and_then(AttributeValue::as_timestamp);
            if let (Some(start), Some(end)) = (start, end) {
                if start.to_utc() > end.to_utc() {
                    match doc.config().time_order() {
                        TimeOrderPolicy::Reject => {
                            return Err(Error::DomainConstraint {
                                kind: kind.label(),
                                detail: format!("start time {} is after end time {}", start, end),
                            })
                        }
                        TimeOrderPolicy::Warn => {
                            tracing::warn!(start = %start, end = %end, "activity starts after it ends");
                        }
                    }
                }
            }
        }
        _ => {}
    }
    Ok(())
}
