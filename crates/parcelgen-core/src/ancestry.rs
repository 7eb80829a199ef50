//! Read-only ancestry queries.
//!
//! Anything the host cannot resolve counts as absent, so an unresolved
//! superclass turns off chaining instead of failing the pass.

use crate::{config::SynthConfig, error::SynthError};
use parcelgen_model::{
    host::{ClassId, ClassModel},
    types::{PrimitiveKind, TypeRef},
};
use std::collections::BTreeSet;

pub(crate) const WRITE_METHOD: &str = "writeToParcel";

///
/// AncestryFacts
///
/// Computed fresh on every pass.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[allow(clippy::struct_excessive_bools)]
pub struct AncestryFacts {
    /// The immediate superclass declares the capability, directly or through
    /// its own ancestors.
    pub has_serializable_ancestor: bool,

    /// The immediate superclass has a constructor taking exactly the payload.
    pub ancestor_has_parcel_constructor: bool,

    /// The nearest write method declared up the superclass chain is concrete.
    pub ancestor_overrides_write_method: bool,

    /// The class itself or any ancestor declares the capability.
    pub declares_capability: bool,
}

impl AncestryFacts {
    pub fn probe<M>(model: &M, class: ClassId, config: &SynthConfig) -> Result<Self, SynthError>
    where
        M: ClassModel + ?Sized,
    {
        let capability = config.capability_type();
        let payload = config.payload_type();

        let declares_capability = is_serializable(model, class, &capability)?;

        let info = model.class_info(class)?;
        let Some(parent) = info.superclass.as_ref().and_then(|ty| model.resolve(ty)) else {
            return Ok(Self {
                declares_capability,
                ..Self::default()
            });
        };

        if !is_serializable(model, parent, &capability)? {
            return Ok(Self {
                declares_capability,
                ..Self::default()
            });
        }

        let ancestor_has_parcel_constructor = model
            .constructors(parent)?
            .iter()
            .any(|ctor| ctor.has_signature(std::slice::from_ref(&payload)));

        // `super.writeToParcel` binds to the nearest declaration, which must
        // be concrete; an abstract redeclaration hides anything further up.
        let write_signature = [payload, TypeRef::Primitive(PrimitiveKind::Int)];
        let mut ancestor_overrides_write_method = false;
        for ancestor in superclass_chain(model, parent)? {
            let nearest = model
                .methods_by_name(ancestor, WRITE_METHOD)?
                .into_iter()
                .find(|m| m.has_signature(&write_signature));
            if let Some(method) = nearest {
                ancestor_overrides_write_method = method.has_body;
                break;
            }
        }

        Ok(Self {
            has_serializable_ancestor: true,
            ancestor_has_parcel_constructor,
            ancestor_overrides_write_method,
            declares_capability,
        })
    }

    /// Chain `super(in)` from the generated constructor.
    #[must_use]
    pub const fn chain_constructor(&self) -> bool {
        self.has_serializable_ancestor && self.ancestor_has_parcel_constructor
    }

    /// Call `super.writeToParcel(dest, flags)` from the generated method.
    #[must_use]
    pub const fn chain_write(&self) -> bool {
        self.has_serializable_ancestor && self.ancestor_overrides_write_method
    }
}

/// Whether `class` declares `capability` itself, through an implemented
/// interface, or through any superclass.
pub fn is_serializable<M>(
    model: &M,
    class: ClassId,
    capability: &TypeRef,
) -> Result<bool, SynthError>
where
    M: ClassModel + ?Sized,
{
    let mut seen = BTreeSet::new();
    let mut pending = vec![class];

    while let Some(current) = pending.pop() {
        if !seen.insert(current) {
            continue;
        }

        let info = model.class_info(current)?;
        for ty in info.superclass.iter().chain(&info.implements) {
            if same_class(ty, capability) {
                return Ok(true);
            }
            if let Some(id) = model.resolve(ty) {
                pending.push(id);
            }
        }
    }

    Ok(false)
}

// `start` followed by its resolvable superclasses; stops on a cycle
fn superclass_chain<M>(model: &M, start: ClassId) -> Result<Vec<ClassId>, SynthError>
where
    M: ClassModel + ?Sized,
{
    let mut chain = vec![start];
    let mut current = start;

    while let Some(next) = model
        .class_info(current)?
        .superclass
        .as_ref()
        .and_then(|ty| model.resolve(ty))
    {
        if chain.contains(&next) {
            break;
        }
        chain.push(next);
        current = next;
    }

    Ok(chain)
}

fn same_class(a: &TypeRef, b: &TypeRef) -> bool {
    a.erasure() == b.erasure()
}

///
/// TESTS
///
