//! The generation pass.
//!
//! Keys and members are built and validated before the class is touched, so
//! a colliding key or a malformed declaration leaves the class as it was.
//! Mutations then run in a fixed order: purge, registry merge, capability,
//! insertion.

mod members;
mod purge;

pub use members::MemberBuilder;

use crate::{
    ancestry::AncestryFacts,
    config::SynthConfig,
    error::SynthError,
    field::FieldDescriptor,
    keys::{KeyRegistry, MergeReport},
    strategy::{BundleStrategy, SerializationStrategy},
};
use parcelgen_model::{
    decl::Member,
    host::{Anchor, BodyItem, ClassId, ClassModel, MemberId},
};
use tracing::{debug, info};

///
/// GenerateReport
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GenerateReport {
    pub class: ClassId,
    pub ancestry: AncestryFacts,
    pub purged: Vec<MemberId>,
    pub inserted: Vec<MemberId>,
    pub registry: MergeReport,
    pub capability_added: bool,
}

///
/// CodeSynthesizer
///

#[derive(Clone, Debug, Default)]
pub struct CodeSynthesizer<S = BundleStrategy> {
    config: SynthConfig,
    strategy: S,
}

impl CodeSynthesizer<BundleStrategy> {
    #[must_use]
    pub const fn with_config(config: SynthConfig) -> Self {
        Self::new(config, BundleStrategy)
    }
}

impl<S: SerializationStrategy> CodeSynthesizer<S> {
    #[must_use]
    pub const fn new(config: SynthConfig, strategy: S) -> Self {
        Self { config, strategy }
    }

    #[must_use]
    pub const fn config(&self) -> &SynthConfig {
        &self.config
    }

    /// Install the generated member set on `class`, serializing `fields` in
    /// the given order.
    pub fn generate<M>(
        &self,
        model: &mut M,
        class: ClassId,
        fields: &[FieldDescriptor],
    ) -> Result<GenerateReport, SynthError>
    where
        M: ClassModel + ?Sized,
    {
        let info = model.class_info(class)?;
        info!(
            class = %info.qualified_name,
            fields = fields.len(),
            "generating serialization members"
        );

        let ancestry = AncestryFacts::probe(model, class, &self.config)?;
        debug!(
            class = %info.qualified_name,
            chain_constructor = ancestry.chain_constructor(),
            chain_write = ancestry.chain_write(),
            declares_capability = ancestry.declares_capability,
            "ancestry resolved"
        );

        // bind keys
        let mut registry = KeyRegistry::from_config(&self.config);
        registry.find_in(model, class)?;
        let mut keyed = Vec::with_capacity(fields.len());
        for field in fields {
            let key = registry.key_for(&field.identifier)?;
            keyed.push((field.clone(), key));
        }

        // build
        let builder = MemberBuilder::new(
            &self.config,
            &self.strategy,
            info.name.clone(),
            info.qualified_name.clone(),
        );
        let mut built = vec![
            builder.parcel_constructor(&keyed, ancestry.chain_constructor()),
            builder.write_method(&keyed, ancestry.chain_write()),
            builder.describe_contents(),
            builder.factory_field(),
        ];
        let default_ctor = builder.default_constructor();
        for member in built.iter().chain([&default_ctor]) {
            member.validate()?;
        }

        // mutate
        let purged = purge::purge(model, class, &self.config)?;

        if model.constructors(class)?.is_empty() {
            built.insert(0, default_ctor);
        }

        let merge = registry.merge_into(model, class)?;
        debug!(
            class = %info.qualified_name,
            created = merge.created,
            added = ?merge.added,
            filled = ?merge.filled,
            preserved = ?merge.preserved,
            "key registry merged"
        );

        let capability_added = !ancestry.declares_capability;
        if capability_added {
            model.add_capability(class, &self.config.capability_type())?;
        }

        let anchor = Anchor::Before(BodyItem::Type(merge.registry));
        let inserted = insert_all(model, class, built, anchor)?;

        Ok(GenerateReport {
            class,
            ancestry,
            purged,
            inserted,
            registry: merge,
            capability_added,
        })
    }
}

// members keep their relative order, all placed before `anchor`
fn insert_all<M>(
    model: &mut M,
    class: ClassId,
    members: Vec<Member>,
    anchor: Anchor,
) -> Result<Vec<MemberId>, SynthError>
where
    M: ClassModel + ?Sized,
{
    let mut inserted = Vec::with_capacity(members.len());

    for member in members {
        let id = model.insert_member(class, member, anchor)?;
        model.shorten_references(id)?;
        inserted.push(id);
    }

    Ok(inserted)
}
