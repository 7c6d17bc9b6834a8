//! PROV attribute declarations
//!
//! Each record kind declares, in a fixed order, which PROV attributes it
//! carries, whether they are required, and what they accept.

use super::kinds::RecordKind;
use crate::error::{Error, Result};
use std::fmt;

/// Attribute use mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttributeUse {
    /// Attribute is optional (default)
    #[default]
    Optional,
    /// Attribute is required
    Required,
}

impl AttributeUse {
    /// Get the use as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeUse::Optional => "optional",
            AttributeUse::Required => "required",
        }
    }
}

impl fmt::Display for AttributeUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identifier of a PROV attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeId {
    /// prov:entity
    Entity,
    /// prov:activity
    Activity,
    /// prov:trigger
    Trigger,
    /// prov:informed
    Informed,
    /// prov:informant
    Informant,
    /// prov:starter
    Starter,
    /// prov:ender
    Ender,
    /// prov:agent
    Agent,
    /// prov:plan
    Plan,
    /// prov:delegate
    Delegate,
    /// prov:responsible
    Responsible,
    /// prov:generatedEntity
    GeneratedEntity,
    /// prov:usedEntity
    UsedEntity,
    /// prov:generation
    Generation,
    /// prov:usage
    Usage,
    /// prov:specificEntity
    SpecificEntity,
    /// prov:generalEntity
    GeneralEntity,
    /// prov:alternate1
    Alternate1,
    /// prov:alternate2
    Alternate2,
    /// prov:bundle
    Bundle,
    /// prov:influencee
    Influencee,
    /// prov:influencer
    Influencer,
    /// prov:collection
    Collection,
    /// prov:time
    Time,
    /// prov:startTime
    StartTime,
    /// prov:endTime
    EndTime,
}

impl AttributeId {
    /// Every attribute id
    pub const ALL: [AttributeId; 26] = [
        AttributeId::Entity,
        AttributeId::Activity,
        AttributeId::Trigger,
        AttributeId::Informed,
        AttributeId::Informant,
        AttributeId::Starter,
        AttributeId::Ender,
        AttributeId::Agent,
        AttributeId::Plan,
        AttributeId::Delegate,
        AttributeId::Responsible,
        AttributeId::GeneratedEntity,
        AttributeId::UsedEntity,
        AttributeId::Generation,
        AttributeId::Usage,
        AttributeId::SpecificEntity,
        AttributeId::GeneralEntity,
        AttributeId::Alternate1,
        AttributeId::Alternate2,
        AttributeId::Bundle,
        AttributeId::Influencee,
        AttributeId::Influencer,
        AttributeId::Collection,
        AttributeId::Time,
        AttributeId::StartTime,
        AttributeId::EndTime,
    ];

    /// Qualified key used in PROV-JSON
    pub fn key(&self) -> &'static str {
        match self {
            AttributeId::Entity => "prov:entity",
            AttributeId::Activity => "prov:activity",
            AttributeId::Trigger => "prov:trigger",
            AttributeId::Informed => "prov:informed",
            AttributeId::Informant => "prov:informant",
            AttributeId::Starter => "prov:starter",
            AttributeId::Ender => "prov:ender",
            AttributeId::Agent => "prov:agent",
            AttributeId::Plan => "prov:plan",
            AttributeId::Delegate => "prov:delegate",
            AttributeId::Responsible => "prov:responsible",
            AttributeId::GeneratedEntity => "prov:generatedEntity",
            AttributeId::UsedEntity => "prov:usedEntity",
            AttributeId::Generation => "prov:generation",
            AttributeId::Usage => "prov:usage",
            AttributeId::SpecificEntity => "prov:specificEntity",
            AttributeId::GeneralEntity => "prov:generalEntity",
            AttributeId::Alternate1 => "prov:alternate1",
            AttributeId::Alternate2 => "prov:alternate2",
            AttributeId::Bundle => "prov:bundle",
            AttributeId::Influencee => "prov:influencee",
            AttributeId::Influencer => "prov:influencer",
            AttributeId::Collection => "prov:collection",
            AttributeId::Time => "prov:time",
            AttributeId::StartTime => "prov:startTime",
            AttributeId::EndTime => "prov:endTime",
        }
    }

    /// Look up an attribute by its PROV-JSON key
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|id| id.key() == key)
    }

    /// Check if this attribute holds a time value
    pub fn is_time(&self) -> bool {
        matches!(
            self,
            AttributeId::Time | AttributeId::StartTime | AttributeId::EndTime
        )
    }
}

impl fmt::Display for AttributeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// What an attribute accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    /// A reference to a record of one of these kinds
    Record(&'static [RecordKind]),
    /// Any identifier
    Identifier,
    /// An xsd:dateTime value
    DateTime,
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeType::Record(kinds) => {
                let names: Vec<_> = kinds.iter().map(|k| format!("prov:{}", k.type_name())).collect();
                write!(f, "{}", names.join(", "))
            }
            AttributeType::Identifier => write!(f, "xsd:anyURI"),
            AttributeType::DateTime => write!(f, "xsd:dateTime"),
        }
    }
}

/// Declaration of one attribute of a record kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSpec {
    /// Attribute id
    pub id: AttributeId,
    /// Required or optional
    pub use_mode: AttributeUse,
    /// Accepted type
    pub accepts: AttributeType,
}

impl AttributeSpec {
    const fn required(id: AttributeId, accepts: AttributeType) -> Self {
        Self {
            id,
            use_mode: AttributeUse::Required,
            accepts,
        }
    }

    const fn optional(id: AttributeId, accepts: AttributeType) -> Self {
        Self {
            id,
            use_mode: AttributeUse::Optional,
            accepts,
        }
    }

    /// Check if the attribute is required
    pub fn is_required(&self) -> bool {
        self.use_mode == AttributeUse::Required
    }
}

const ENTITY: AttributeType = AttributeType::Record(&[RecordKind::Entity]);
const ACTIVITY: AttributeType = AttributeType::Record(&[RecordKind::Activity]);
const AGENT: AttributeType = AttributeType::Record(&[RecordKind::Agent, RecordKind::Entity]);
const GENERATION: AttributeType = AttributeType::Record(&[RecordKind::Generation]);
const USAGE: AttributeType = AttributeType::Record(&[RecordKind::Usage]);
const TIME: AttributeType = AttributeType::DateTime;
const IDENTIFIER: AttributeType = AttributeType::Identifier;

use AttributeId as A;

static NO_ATTRIBUTES: [AttributeSpec; 0] = [];

static ACTIVITY_ATTRIBUTES: [AttributeSpec; 2] = [
    AttributeSpec::optional(A::StartTime, TIME),
    AttributeSpec::optional(A::EndTime, TIME),
];

static GENERATION_ATTRIBUTES: [AttributeSpec; 3] = [
    AttributeSpec::required(A::Entity, ENTITY),
    AttributeSpec::optional(A::Activity, ACTIVITY),
    AttributeSpec::optional(A::Time, TIME),
];

static USAGE_ATTRIBUTES: [AttributeSpec; 3] = [
    AttributeSpec::required(A::Activity, ACTIVITY),
    AttributeSpec::optional(A::Entity, ENTITY),
    AttributeSpec::optional(A::Time, TIME),
];

static COMMUNICATION_ATTRIBUTES: [AttributeSpec; 2] = [
    AttributeSpec::required(A::Informed, ACTIVITY),
    AttributeSpec::required(A::Informant, ACTIVITY),
];

static START_ATTRIBUTES: [AttributeSpec; 4] = [
    AttributeSpec::required(A::Activity, ACTIVITY),
    AttributeSpec::optional(A::Trigger, ENTITY),
    AttributeSpec::optional(A::Starter, ACTIVITY),
    AttributeSpec::optional(A::Time, TIME),
];

static END_ATTRIBUTES: [AttributeSpec; 4] = [
    AttributeSpec::required(A::Activity, ACTIVITY),
    AttributeSpec::optional(A::Trigger, ENTITY),
    AttributeSpec::optional(A::Ender, ACTIVITY),
    AttributeSpec::optional(A::Time, TIME),
];

static INVALIDATION_ATTRIBUTES: [AttributeSpec; 3] = [
    AttributeSpec::required(A::Entity, ENTITY),
    AttributeSpec::optional(A::Activity, ACTIVITY),
    AttributeSpec::optional(A::Time, TIME),
];

static DERIVATION_ATTRIBUTES: [AttributeSpec; 5] = [
    AttributeSpec::required(A::GeneratedEntity, ENTITY),
    AttributeSpec::required(A::UsedEntity, ENTITY),
    AttributeSpec::optional(A::Activity, ACTIVITY),
    AttributeSpec::optional(A::Generation, GENERATION),
    AttributeSpec::optional(A::Usage, USAGE),
];

static ATTRIBUTION_ATTRIBUTES: [AttributeSpec; 2] = [
    AttributeSpec::required(A::Entity, ENTITY),
    AttributeSpec::required(A::Agent, AGENT),
];

static ASSOCIATION_ATTRIBUTES: [AttributeSpec; 3] = [
    AttributeSpec::required(A::Activity, ACTIVITY),
    AttributeSpec::optional(A::Agent, AGENT),
    AttributeSpec::optional(A::Plan, ENTITY),
];

static DELEGATION_ATTRIBUTES: [AttributeSpec; 3] = [
    AttributeSpec::required(A::Delegate, AGENT),
    AttributeSpec::required(A::Responsible, AGENT),
    AttributeSpec::optional(A::Activity, ACTIVITY),
];

static INFLUENCE_ATTRIBUTES: [AttributeSpec; 3] = [
    AttributeSpec::required(A::Influencee, AGENT),
    AttributeSpec::required(A::Influencer, AGENT),
    AttributeSpec::optional(A::Activity, ACTIVITY),
];

static SPECIALIZATION_ATTRIBUTES: [AttributeSpec; 2] = [
    AttributeSpec::required(A::SpecificEntity, ENTITY),
    AttributeSpec::required(A::GeneralEntity, ENTITY),
];

static ALTERNATE_ATTRIBUTES: [AttributeSpec; 2] = [
    AttributeSpec::required(A::Alternate1, ENTITY),
    AttributeSpec::required(A::Alternate2, ENTITY),
];

static MENTION_ATTRIBUTES: [AttributeSpec; 3] = [
    AttributeSpec::required(A::SpecificEntity, ENTITY),
    AttributeSpec::required(A::GeneralEntity, IDENTIFIER),
    AttributeSpec::required(A::Bundle, IDENTIFIER),
];

static MEMBERSHIP_ATTRIBUTES: [AttributeSpec; 2] = [
    AttributeSpec::required(A::Collection, ENTITY),
    AttributeSpec::required(A::Entity, ENTITY),
];

/// Attribute declarations of a record kind, in their fixed order
///
/// Bundles carry no PROV attributes; their contents live in the sub-bundle.
pub fn schema(kind: RecordKind) -> &'static [AttributeSpec] {
    match kind {
        RecordKind::Entity | RecordKind::Agent | RecordKind::Bundle => &NO_ATTRIBUTES,
        RecordKind::Activity => &ACTIVITY_ATTRIBUTES,
        RecordKind::Generation => &GENERATION_ATTRIBUTES,
        RecordKind::Usage => &USAGE_ATTRIBUTES,
        RecordKind::Communication => &COMMUNICATION_ATTRIBUTES,
        RecordKind::Start => &START_ATTRIBUTES,
        RecordKind::End => &END_ATTRIBUTES,
        RecordKind::Invalidation => &INVALIDATION_ATTRIBUTES,
        RecordKind::Derivation => &DERIVATION_ATTRIBUTES,
        RecordKind::Attribution => &ATTRIBUTION_ATTRIBUTES,
        RecordKind::Association => &ASSOCIATION_ATTRIBUTES,
        RecordKind::Delegation => &DELEGATION_ATTRIBUTES,
        RecordKind::Influence => &INFLUENCE_ATTRIBUTES,
        RecordKind::Specialization => &SPECIALIZATION_ATTRIBUTES,
        RecordKind::Alternate => &ALTERNATE_ATTRIBUTES,
        RecordKind::Mention => &MENTION_ATTRIBUTES,
        RecordKind::Membership => &MEMBERSHIP_ATTRIBUTES,
    }
}

/// Find the declaration of an attribute on a kind
pub fn lookup(kind: RecordKind, id: AttributeId) -> Result<&'static AttributeSpec> {
    schema(kind)
        .iter()
        .find(|spec| spec.id == id)
        .ok_or_else(|| Error::InvalidAttributeType {
            kind: kind.label(),
            attribute: id.key(),
            value: String::new(),
            expected: "no such attribute on this kind".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_round_trip() {
        for id in AttributeId::ALL {
            assert_eq!(AttributeId::from_key(id.key()), Some(id));
        }
        assert_eq!(AttributeId::from_key("ex:foo"), None);
    }

    #[test]
    fn test_schema_order_is_fixed() {
        let ids: Vec<_> = schema(RecordKind::Start).iter().map(|s| s.id).collect();
        assert_eq!(
            ids,
            vec![
                AttributeId::Activity,
                AttributeId::Trigger,
                AttributeId::Starter,
                AttributeId::Time
            ]
        );
    }

    #[test]
    fn test_every_relation_has_a_required_attribute() {
        for kind in RecordKind::ALL.iter().filter(|k| k.is_relation()) {
            assert!(
                schema(*kind).iter().any(|spec| spec.is_required()),
                "{} has no required attribute",
                kind
            );
        }
    }

    #[test]
    fn test_agent_slots_accept_entities() {
        let spec = lookup(RecordKind::Attribution, AttributeId::Agent).unwrap();
        assert_eq!(
            spec.accepts,
            AttributeType::Record(&[RecordKind::Agent, RecordKind::Entity])
        );
        assert!(lookup(RecordKind::Attribution, AttributeId::Time).is_err());
    }

    #[test]
    fn test_attribute_type_display() {
        assert_eq!(AGENT.to_string(), "prov:Agent, prov:Entity");
        assert_eq!(TIME.to_string(), "xsd:dateTime");
    }
}
