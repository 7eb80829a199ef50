use super::members::{DESCRIBE_METHOD, write_params};
use crate::{ancestry::WRITE_METHOD, config::SynthConfig, error::SynthError};
use parcelgen_model::{
    host::{ClassId, ClassModel, MemberId},
    types::TypeRef,
};
use tracing::debug;

///
/// Purge
///
/// Removes previously generated members declared directly on the class.
/// Matching is by name and exact parameter types, so overloads survive.
///

pub fn purge<M>(
    model: &mut M,
    class: ClassId,
    config: &SynthConfig,
) -> Result<Vec<MemberId>, SynthError>
where
    M: ClassModel + ?Sized,
{
    let payload = config.payload_type();
    let write_signature: Vec<TypeRef> = write_params(&payload)
        .into_iter()
        .map(|param| param.ty)
        .collect();

    let mut stale = Vec::new();

    stale.extend(
        model
            .constructors(class)?
            .into_iter()
            .filter(|ctor| ctor.has_signature(std::slice::from_ref(&payload)))
            .map(|ctor| ctor.id),
    );
    stale.extend(
        model
            .methods_by_name(class, DESCRIBE_METHOD)?
            .into_iter()
            .filter(|m| m.has_signature(&[]))
            .map(|m| m.id),
    );
    stale.extend(
        model
            .methods_by_name(class, WRITE_METHOD)?
            .into_iter()
            .filter(|m| m.has_signature(&write_signature))
            .map(|m| m.id),
    );
    stale.extend(
        model
            .fields(class)?
            .into_iter()
            .filter(|f| f.name == config.naming.factory_field)
            .map(|f| f.id),
    );

    for member in &stale {
        debug!(%class, %member, "removing generated member");
        model.delete_member(*member)?;
    }

    Ok(stale)
}
