//! Record factories
//!
//! One method per record kind. Required attributes are plain parameters,
//! optional ones are `Option`s; every factory validates before appending.

use super::{BundleId, BundleMut, ProvDocument, RecordId};
use crate::error::{Error, Result};
use crate::namespaces::{Name, Namespace};
use crate::records::{
    raw_identifier, AttributeId, AttributeValue, ExtraValue, Extras, RawAttributes, RawValue,
    Record, RecordKind,
};

fn attrs<const N: usize>(values: [(AttributeId, Option<RawValue>); N]) -> RawAttributes {
    values
        .into_iter()
        .filter_map(|(id, value)| value.map(|value| (id, value)))
        .collect()
}

fn with_prov_type(mut extras: Extras, type_name: &str) -> Extras {
    let prov = Namespace::prov();
    extras.push((
        Name::Identifier(prov.qname("type").into()),
        ExtraValue::Identifier(prov.qname(type_name).into()),
    ));
    extras
}

impl<'a> BundleMut<'a> {
    /// Add an entity
    pub fn entity(&mut self, identifier: impl Into<Name>, extras: Extras) -> Result<RecordId> {
        self.add_record(RecordKind::Entity, Some(identifier.into()), Vec::new(), extras)
    }

    /// Add an activity
    pub fn activity(
        &mut self,
        identifier: impl Into<Name>,
        start_time: Option<RawValue>,
        end_time: Option<RawValue>,
        extras: Extras,
    ) -> Result<RecordId> {
        self.add_record(
            RecordKind::Activity,
            Some(identifier.into()),
            attrs([(AttributeId::StartTime, start_time), (AttributeId::EndTime, end_time)]),
            extras,
        )
    }

    /// Add an agent
    pub fn agent(&mut self, identifier: impl Into<Name>, extras: Extras) -> Result<RecordId> {
        self.add_record(RecordKind::Agent, Some(identifier.into()), Vec::new(), extras)
    }

    /// `wasGeneratedBy`
    pub fn generation(
        &mut self,
        entity: impl Into<RawValue>,
        activity: Option<RawValue>,
        time: Option<RawValue>,
        identifier: Option<Name>,
        extras: Extras,
    ) -> Result<RecordId> {
        self.add_record(
            RecordKind::Generation,
            identifier,
            attrs([
                (AttributeId::Entity, Some(entity.into())),
                (AttributeId::Activity, activity),
                (AttributeId::Time, time),
            ]),
            extras,
        )
    }

    /// `used`
    pub fn usage(
        &mut self,
        activity: impl Into<RawValue>,
        entity: Option<RawValue>,
        time: Option<RawValue>,
        identifier: Option<Name>,
        extras: Extras,
    ) -> Result<RecordId> {
        self.add_record(
            RecordKind::Usage,
            identifier,
            attrs([
                (AttributeId::Activity, Some(activity.into())),
                (AttributeId::Entity, entity),
                (AttributeId::Time, time),
            ]),
            extras,
        )
    }

    /// `wasInformedBy`
    pub fn communication(
        &mut self,
        informed: impl Into<RawValue>,
        informant: impl Into<RawValue>,
        identifier: Option<Name>,
        extras: Extras,
    ) -> Result<RecordId> {
        self.add_record(
            RecordKind::Communication,
            identifier,
            attrs([
                (AttributeId::Informed, Some(informed.into())),
                (AttributeId::Informant, Some(informant.into())),
            ]),
            extras,
        )
    }

    /// `wasStartedBy`
    pub fn start(
        &mut self,
        activity: impl Into<RawValue>,
        trigger: Option<RawValue>,
        starter: Option<RawValue>,
        time: Option<RawValue>,
        identifier: Option<Name>,
        extras: Extras,
    ) -> Result<RecordId> {
        self.add_record(
            RecordKind::Start,
            identifier,
            attrs([
                (AttributeId::Activity, Some(activity.into())),
                (AttributeId::Trigger, trigger),
                (AttributeId::Starter, starter),
                (AttributeId::Time, time),
            ]),
            extras,
        )
    }

    /// `wasEndedBy`
    pub fn end(
        &mut self,
        activity: impl Into<RawValue>,
        trigger: Option<RawValue>,
        ender: Option<RawValue>,
        time: Option<RawValue>,
        identifier: Option<Name>,
        extras: Extras,
    ) -> Result<RecordId> {
        self.add_record(
            RecordKind::End,
            identifier,
            attrs([
                (AttributeId::Activity, Some(activity.into())),
                (AttributeId::Trigger, trigger),
                (AttributeId::Ender, ender),
                (AttributeId::Time, time),
            ]),
            extras,
        )
    }

    /// `wasInvalidatedBy`
    ///
    /// Needs an activity, a time or at least one extra attribute.
    pub fn invalidation(
        &mut self,
        entity: impl Into<RawValue>,
        activity: Option<RawValue>,
        time: Option<RawValue>,
        identifier: Option<Name>,
        extras: Extras,
    ) -> Result<RecordId> {
        self.add_record(
            RecordKind::Invalidation,
            identifier,
            attrs([
                (AttributeId::Entity, Some(entity.into())),
                (AttributeId::Activity, activity),
                (AttributeId::Time, time),
            ]),
            extras,
        )
    }

    /// `wasDerivedFrom`
    #[allow(clippy::too_many_arguments)]
    pub fn derivation(
        &mut self,
        generated_entity: impl Into<RawValue>,
        used_entity: impl Into<RawValue>,
        activity: Option<RawValue>,
        generation: Option<RawValue>,
        usage: Option<RawValue>,
        identifier: Option<Name>,
        extras: Extras,
    ) -> Result<RecordId> {
        self.add_record(
            RecordKind::Derivation,
            identifier,
            attrs([
                (AttributeId::GeneratedEntity, Some(generated_entity.into())),
                (AttributeId::UsedEntity, Some(used_entity.into())),
                (AttributeId::Activity, activity),
                (AttributeId::Generation, generation),
                (AttributeId::Usage, usage),
            ]),
            extras,
        )
    }

    /// A derivation typed `prov:Revision`
    #[allow(clippy::too_many_arguments)]
    pub fn revision(
        &mut self,
        generated_entity: impl Into<RawValue>,
        used_entity: impl Into<RawValue>,
        activity: Option<RawValue>,
        generation: Option<RawValue>,
        usage: Option<RawValue>,
        identifier: Option<Name>,
        extras: Extras,
    ) -> Result<RecordId> {
        let extras = with_prov_type(extras, "Revision");
        self.derivation(generated_entity, used_entity, activity, generation, usage, identifier, extras)
    }

    /// A derivation typed `prov:Quotation`
    #[allow(clippy::too_many_arguments)]
    pub fn quotation(
        &mut self,
        generated_entity: impl Into<RawValue>,
        used_entity: impl Into<RawValue>,
        activity: Option<RawValue>,
        generation: Option<RawValue>,
        usage: Option<RawValue>,
        identifier: Option<Name>,
        extras: Extras,
    ) -> Result<RecordId> {
        let extras = with_prov_type(extras, "Quotation");
        self.derivation(generated_entity, used_entity, activity, generation, usage, identifier, extras)
    }

    /// A derivation typed `prov:PrimarySource`
    #[allow(clippy::too_many_arguments)]
    pub fn primary_source(
        &mut self,
        generated_entity: impl Into<RawValue>,
        used_entity: impl Into<RawValue>,
        activity: Option<RawValue>,
        generation: Option<RawValue>,
        usage: Option<RawValue>,
        identifier: Option<Name>,
        extras: Extras,
    ) -> Result<RecordId> {
        let extras = with_prov_type(extras, "PrimarySource");
        self.derivation(generated_entity, used_entity, activity, generation, usage, identifier, extras)
    }

    /// `wasAttributedTo`
    pub fn attribution(
        &mut self,
        entity: impl Into<RawValue>,
        agent: impl Into<RawValue>,
        identifier: Option<Name>,
        extras: Extras,
    ) -> Result<RecordId> {
        self.add_record(
            RecordKind::Attribution,
            identifier,
            attrs([
                (AttributeId::Entity, Some(entity.into())),
                (AttributeId::Agent, Some(agent.into())),
            ]),
            extras,
        )
    }

    /// `wasAssociatedWith`
    pub fn association(
        &mut self,
        activity: impl Into<RawValue>,
        agent: Option<RawValue>,
        plan: Option<RawValue>,
        identifier: Option<Name>,
        extras: Extras,
    ) -> Result<RecordId> {
        self.add_record(
            RecordKind::Association,
            identifier,
            attrs([
                (AttributeId::Activity, Some(activity.into())),
                (AttributeId::Agent, agent),
                (AttributeId::Plan, plan),
            ]),
            extras,
        )
    }

    /// `actedOnBehalfOf`
    pub fn delegation(
        &mut self,
        delegate: impl Into<RawValue>,
        responsible: impl Into<RawValue>,
        activity: Option<RawValue>,
        identifier: Option<Name>,
        extras: Extras,
    ) -> Result<RecordId> {
        self.add_record(
            RecordKind::Delegation,
            identifier,
            attrs([
                (AttributeId::Delegate, Some(delegate.into())),
                (AttributeId::Responsible, Some(responsible.into())),
                (AttributeId::Activity, activity),
            ]),
            extras,
        )
    }

    /// `wasInfluencedBy`
    pub fn influence(
        &mut self,
        influencee: impl Into<RawValue>,
        influencer: impl Into<RawValue>,
        activity: Option<RawValue>,
        identifier: Option<Name>,
        extras: Extras,
    ) -> Result<RecordId> {
        self.add_record(
            RecordKind::Influence,
            identifier,
            attrs([
                (AttributeId::Influencee, Some(influencee.into())),
                (AttributeId::Influencer, Some(influencer.into())),
                (AttributeId::Activity, activity),
            ]),
            extras,
        )
    }

    /// `specializationOf`
    pub fn specialization(
        &mut self,
        specific_entity: impl Into<RawValue>,
        general_entity: impl Into<RawValue>,
        extras: Extras,
    ) -> Result<RecordId> {
        self.add_record(
            RecordKind::Specialization,
            None,
            attrs([
                (AttributeId::SpecificEntity, Some(specific_entity.into())),
                (AttributeId::GeneralEntity, Some(general_entity.into())),
            ]),
            extras,
        )
    }

    /// `alternateOf`
    pub fn alternate(
        &mut self,
        alternate1: impl Into<RawValue>,
        alternate2: impl Into<RawValue>,
        extras: Extras,
    ) -> Result<RecordId> {
        self.add_record(
            RecordKind::Alternate,
            None,
            attrs([
                (AttributeId::Alternate1, Some(alternate1.into())),
                (AttributeId::Alternate2, Some(alternate2.into())),
            ]),
            extras,
        )
    }

    /// `mentionOf`
    ///
    /// The general entity is looked up here and in enclosing bundles first,
    /// then inside `bundle` when that bundle is known. If the bundle is known
    /// but does not contain the general entity, the mention is rejected; an
    /// unknown bundle leaves both as bare identifiers.
    pub fn mention(
        &mut self,
        specific_entity: impl Into<RawValue>,
        general_entity: impl Into<RawValue>,
        bundle: impl Into<RawValue>,
        extras: Extras,
    ) -> Result<RecordId> {
        let bundle = bundle.into();
        let general_entity = self.doc.resolve_mentioned(self.id, general_entity.into(), &bundle)?;
        self.add_record(
            RecordKind::Mention,
            None,
            attrs([
                (AttributeId::SpecificEntity, Some(specific_entity.into())),
                (AttributeId::GeneralEntity, Some(general_entity)),
                (AttributeId::Bundle, Some(bundle)),
            ]),
            extras,
        )
    }

    /// `hadMember`
    pub fn membership(
        &mut self,
        collection: impl Into<RawValue>,
        entity: impl Into<RawValue>,
        extras: Extras,
    ) -> Result<RecordId> {
        self.add_record(
            RecordKind::Membership,
            None,
            attrs([
                (AttributeId::Collection, Some(collection.into())),
                (AttributeId::Entity, Some(entity.into())),
            ]),
            extras,
        )
    }
}

impl ProvDocument {
    /// Resolve the general entity of a mention made in `from`
    ///
    /// The general entity is looked up in `from` and its enclosing bundles,
    /// then inside the mentioned bundle when that bundle is known.
    pub(crate) fn resolve_mentioned(
        &self,
        from: BundleId,
        general: RawValue,
        bundle: &RawValue,
    ) -> Result<RawValue> {
        let Some(general_id) = raw_identifier(self, &general) else {
            return Ok(general);
        };
        if let Some(found) = self.find_record(from, &general_id) {
            return Ok(RawValue::Record(found));
        }

        let target = match bundle {
            RawValue::Record(record) => self.get_record_by_id(*record).and_then(Record::sub_bundle),
            other => raw_identifier(self, other).and_then(|id| self.find_bundle(from, &id)),
        };
        match target {
            Some(target) => self
                .local_record(target, &general_id)
                .map(RawValue::Record)
                .ok_or_else(|| Error::UnresolvedReference {
                    kind: RecordKind::Mention.label(),
                    attribute: AttributeId::GeneralEntity.key(),
                    reference: general_id.to_string(),
                }),
            None => {
                tracing::debug!(bundle = %bundle, "mentioned bundle is not known locally");
                Ok(general)
            }
        }
    }

    /// Set the start and end times of an activity
    ///
    /// A `None` keeps the time already recorded.
    pub fn set_time(
        &mut self,
        activity: RecordId,
        start_time: Option<RawValue>,
        end_time: Option<RawValue>,
    ) -> Result<()> {
        let record = self.record(activity);
        if record.kind() != RecordKind::Activity {
            return Err(Error::DomainConstraint {
                kind: record.kind().label(),
                detail: "only activities have start and end times".to_string(),
            });
        }
        let current = |id: AttributeId| {
            record
                .attribute(id)
                .and_then(AttributeValue::as_timestamp)
                .map(|ts| RawValue::Timestamp(*ts))
        };
        let start_time = start_time.or_else(|| current(AttributeId::StartTime));
        let end_time = end_time.or_else(|| current(AttributeId::EndTime));

        self.set_attributes(
            activity,
            attrs([(AttributeId::StartTime, start_time), (AttributeId::EndTime, end_time)]),
            Vec::new(),
        )
    }
}
