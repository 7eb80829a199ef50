//! Serialization boilerplate synthesis.
//!
//! Given a class and its serializable fields, [`synth::CodeSynthesizer`]
//! installs a deserializing constructor, a serialization method, a contents
//! descriptor, a static factory and a nested key registry through any
//! [`parcelgen_model::host::ClassModel`].

pub mod ancestry;
pub mod config;
pub mod error;
pub mod field;
pub mod keys;
pub mod strategy;
pub mod synth;

use crate::{
    config::SynthConfig,
    error::SynthError,
    field::FieldDescriptor,
    synth::{CodeSynthesizer, GenerateReport},
};
use parcelgen_model::host::{ClassId, ClassModel};

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        ancestry::AncestryFacts,
        config::{KeyCase, SynthConfig},
        error::SynthError,
        field::FieldDescriptor,
        keys::{KeyRef, KeyRegistry, KeyRegistryError, MergeReport},
        strategy::{BundleStrategy, SerializationStrategy},
        synth::{CodeSynthesizer, GenerateReport},
    };
}

/// Run a generation pass with the default configuration.
pub fn generate<M>(
    model: &mut M,
    class: ClassId,
    fields: &[FieldDescriptor],
) -> Result<GenerateReport, SynthError>
where
    M: ClassModel + ?Sized,
{
    CodeSynthesizer::with_config(SynthConfig::default()).generate(model, class, fields)
}
