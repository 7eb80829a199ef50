//! Structural class model for parcelgen: type references, member
//! declarations, the [`host::ClassModel`] capability trait and an in-process
//! host implementation.

pub mod decl;
pub mod error;
pub mod host;
pub mod memory;
pub mod render;
pub mod types;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        decl::{
            Expr, FieldDecl, Member, MethodDecl, Modifiers, Param, Stmt, TypeDecl, TypeKind,
            Visibility,
        },
        error::HostError,
        host::{
            Anchor, BodyItem, ClassId, ClassInfo, ClassModel, FieldInfo, MemberId, MethodInfo,
            NestedTypeInfo,
        },
        types::{PrimitiveKind, TypeRef},
    };
}
