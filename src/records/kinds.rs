//! PROV record kinds
//!
//! The closed set of record kinds, their PROV-JSON / PROV-N labels and the
//! precedence used to order records while decoding.

use crate::error::{Error, Result};
use std::fmt;

/// Category of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordCategory {
    /// Things: entities, activities, agents and bundles
    Element,
    /// Assertions connecting elements
    Relation,
}

/// Kind of a PROV record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
    /// prov:Entity
    Entity,
    /// prov:Activity
    Activity,
    /// prov:Generation
    Generation,
    /// prov:Usage
    Usage,
    /// prov:Communication
    Communication,
    /// prov:Start
    Start,
    /// prov:End
    End,
    /// prov:Invalidation
    Invalidation,
    /// prov:Derivation
    Derivation,
    /// prov:Agent
    Agent,
    /// prov:Attribution
    Attribution,
    /// prov:Association
    Association,
    /// prov:Delegation
    Delegation,
    /// prov:Influence
    Influence,
    /// prov:Specialization
    Specialization,
    /// prov:Alternate
    Alternate,
    /// prov:Mention
    Mention,
    /// prov:Membership
    Membership,
    /// prov:Bundle
    Bundle,
}

impl RecordKind {
    /// Every record kind
    pub const ALL: [RecordKind; 19] = [
        RecordKind::Entity,
        RecordKind::Activity,
        RecordKind::Generation,
        RecordKind::Usage,
        RecordKind::Communication,
        RecordKind::Start,
        RecordKind::End,
        RecordKind::Invalidation,
        RecordKind::Derivation,
        RecordKind::Agent,
        RecordKind::Attribution,
        RecordKind::Association,
        RecordKind::Delegation,
        RecordKind::Influence,
        RecordKind::Specialization,
        RecordKind::Alternate,
        RecordKind::Mention,
        RecordKind::Membership,
        RecordKind::Bundle,
    ];

    /// PROV-JSON key / PROV-N keyword for this kind
    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::Entity => "entity",
            RecordKind::Activity => "activity",
            RecordKind::Generation => "wasGeneratedBy",
            RecordKind::Usage => "used",
            RecordKind::Communication => "wasInformedBy",
            RecordKind::Start => "wasStartedBy",
            RecordKind::End => "wasEndedBy",
            RecordKind::Invalidation => "wasInvalidatedBy",
            RecordKind::Derivation => "wasDerivedFrom",
            RecordKind::Agent => "agent",
            RecordKind::Attribution => "wasAttributedTo",
            RecordKind::Association => "wasAssociatedWith",
            RecordKind::Delegation => "actedOnBehalfOf",
            RecordKind::Influence => "wasInfluencedBy",
            RecordKind::Specialization => "specializationOf",
            RecordKind::Alternate => "alternateOf",
            RecordKind::Mention => "mentionOf",
            RecordKind::Membership => "hadMember",
            RecordKind::Bundle => "bundle",
        }
    }

    /// Parse a PROV-JSON key
    pub fn from_label(label: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.label() == label)
            .ok_or_else(|| Error::UnknownRecordKind(label.to_string()))
    }

    /// Local name of the PROV type, e.g. `Generation` for `prov:Generation`
    pub fn type_name(&self) -> &'static str {
        match self {
            RecordKind::Entity => "Entity",
            RecordKind::Activity => "Activity",
            RecordKind::Generation => "Generation",
            RecordKind::Usage => "Usage",
            RecordKind::Communication => "Communication",
            RecordKind::Start => "Start",
            RecordKind::End => "End",
            RecordKind::Invalidation => "Invalidation",
            RecordKind::Derivation => "Derivation",
            RecordKind::Agent => "Agent",
            RecordKind::Attribution => "Attribution",
            RecordKind::Association => "Association",
            RecordKind::Delegation => "Delegation",
            RecordKind::Influence => "Influence",
            RecordKind::Specialization => "Specialization",
            RecordKind::Alternate => "Alternate",
            RecordKind::Mention => "Mention",
            RecordKind::Membership => "Membership",
            RecordKind::Bundle => "Bundle",
        }
    }

    /// Decode precedence: bundles, then elements, then relations
    pub fn precedence(&self) -> u8 {
        match self {
            RecordKind::Bundle => 0,
            RecordKind::Entity => 1,
            RecordKind::Activity => 2,
            RecordKind::Agent => 3,
            RecordKind::Generation => 11,
            RecordKind::Usage => 12,
            RecordKind::Communication => 13,
            RecordKind::Start => 14,
            RecordKind::End => 15,
            RecordKind::Invalidation => 16,
            RecordKind::Derivation => 21,
            RecordKind::Attribution => 31,
            RecordKind::Association => 32,
            RecordKind::Delegation => 33,
            RecordKind::Influence => 34,
            RecordKind::Alternate => 51,
            RecordKind::Specialization => 52,
            RecordKind::Mention => 53,
            RecordKind::Membership => 61,
        }
    }

    /// Element or relation
    pub fn category(&self) -> RecordCategory {
        match self {
            RecordKind::Entity | RecordKind::Activity | RecordKind::Agent | RecordKind::Bundle => {
                RecordCategory::Element
            }
            _ => RecordCategory::Relation,
        }
    }

    /// Check if this kind is an element
    pub fn is_element(&self) -> bool {
        self.category() == RecordCategory::Element
    }

    /// Check if this kind is a relation
    pub fn is_relation(&self) -> bool {
        self.category() == RecordCategory::Relation
    }

    /// Check if a record of this kind can stand where `expected` is accepted
    ///
    /// A bundle is itself an entity.
    pub fn satisfies(&self, expected: RecordKind) -> bool {
        *self == expected || (*self == RecordKind::Bundle && expected == RecordKind::Entity)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
