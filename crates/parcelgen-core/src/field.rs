use parcelgen_model::{decl::Expr, host::FieldInfo, types::TypeRef};

///
/// FieldDescriptor
///
/// Read-only view of one serializable field. Supplied by the caller; the
/// generator never decides which fields qualify.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldDescriptor {
    pub declared_type: TypeRef,
    pub identifier: String,
    pub self_expression: String,
}

impl FieldDescriptor {
    #[must_use]
    pub fn new(declared_type: TypeRef, identifier: impl Into<String>) -> Self {
        let identifier = identifier.into();
        let self_expression = format!("this.{identifier}");

        Self {
            declared_type,
            identifier,
            self_expression,
        }
    }

    /// Descriptor for a field declared on the target class.
    #[must_use]
    pub fn member(field: &FieldInfo) -> Self {
        Self::new(field.ty.clone(), field.name.clone())
    }

    /// Instance fields of a class: everything that is neither static nor
    /// transient, in declaration order.
    #[must_use]
    pub fn instance_fields(fields: &[FieldInfo]) -> Vec<Self> {
        fields
            .iter()
            .filter(|f| !f.is_static && !f.is_transient)
            .map(Self::member)
            .collect()
    }

    /// Access expression for reads and writes.
    #[must_use]
    pub fn access(&self) -> Expr {
        Expr::name(self.self_expression.clone())
    }
}

///
/// TESTS
///
