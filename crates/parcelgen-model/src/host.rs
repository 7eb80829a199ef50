//! The capability surface a host structural model exposes to the generator.
//!
//! Every call is synchronous. A host may be a compiler frontend, a language
//! server workspace, or the in-process [`crate::memory::MemoryModel`].

use crate::{
    decl::{Expr, Member, TypeDecl, TypeKind},
    error::HostError,
    types::TypeRef,
};
use derive_more::Display;

///
/// ClassId
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("class#{_0}")]
pub struct ClassId(pub u32);

///
/// MemberId
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("member#{_0}")]
pub struct MemberId(pub u32);

///
/// BodyItem
///
/// Anything that occupies a slot in a class body.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BodyItem {
    Member(MemberId),
    Type(ClassId),
}

///
/// Anchor
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Anchor {
    /// Before the closing brace of the class body.
    End,
    Before(BodyItem),
}

///
/// ClassInfo
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClassInfo {
    pub id: ClassId,
    pub name: String,
    pub qualified_name: String,
    pub kind: TypeKind,
    pub superclass: Option<TypeRef>,

    /// `implements` for classes, `extends` for interfaces.
    pub implements: Vec<TypeRef>,
}

///
/// FieldInfo
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldInfo {
    pub id: MemberId,
    pub name: String,
    pub ty: TypeRef,
    pub is_static: bool,
    pub is_transient: bool,
    pub has_initializer: bool,
}

///
/// MethodInfo
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MethodInfo {
    pub id: MemberId,
    pub name: String,
    pub params: Vec<TypeRef>,
    pub has_body: bool,
    pub is_constructor: bool,
}

impl MethodInfo {
    /// Exact signature match: same arity and identical type per position.
    #[must_use]
    pub fn has_signature(&self, params: &[TypeRef]) -> bool {
        self.params.as_slice() == params
    }
}

///
/// NestedTypeInfo
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NestedTypeInfo {
    pub id: ClassId,
    pub name: String,
    pub kind: TypeKind,
}

///
/// ClassModel
///

pub trait ClassModel {
    // ---------------------------------------------------------------------
    // queries
    // ---------------------------------------------------------------------

    fn class_info(&self, class: ClassId) -> Result<ClassInfo, HostError>;

    /// Fields declared directly on `class`.
    fn fields(&self, class: ClassId) -> Result<Vec<FieldInfo>, HostError>;

    fn constructors(&self, class: ClassId) -> Result<Vec<MethodInfo>, HostError>;

    /// Methods declared directly on `class` with the given name.
    fn methods_by_name(&self, class: ClassId, name: &str) -> Result<Vec<MethodInfo>, HostError>;

    fn nested_types(&self, class: ClassId) -> Result<Vec<NestedTypeInfo>, HostError>;

    /// Resolve a type reference to the class that declares it, if known.
    fn resolve(&self, ty: &TypeRef) -> Option<ClassId>;

    // ---------------------------------------------------------------------
    // mutations
    // ---------------------------------------------------------------------

    fn delete_member(&mut self, member: MemberId) -> Result<(), HostError>;

    fn insert_member(
        &mut self,
        class: ClassId,
        member: Member,
        anchor: Anchor,
    ) -> Result<MemberId, HostError>;

    /// Append a nested type at the end of `class`'s body.
    fn add_nested_type(&mut self, class: ClassId, decl: TypeDecl) -> Result<ClassId, HostError>;

    fn set_field_initializer(&mut self, field: MemberId, init: Expr) -> Result<(), HostError>;

    /// Shorten fully qualified references inside an inserted member,
    /// adding imports as needed.
    fn shorten_references(&mut self, member: MemberId) -> Result<(), HostError>;

    /// Add `ty` to the declared capability (implements) list.
    fn add_capability(&mut self, class: ClassId, ty: &TypeRef) -> Result<(), HostError>;
}
