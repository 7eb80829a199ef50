use crate::{
    ancestry::WRITE_METHOD, config::SynthConfig, field::FieldDescriptor, keys::KeyRef,
    strategy::SerializationStrategy,
};
use parcelgen_model::{
    decl::{Expr, FieldDecl, Member, MethodDecl, Modifiers, Param, Stmt},
    types::{PrimitiveKind, TypeRef},
};

pub const DESCRIBE_METHOD: &str = "describeContents";
pub const CREATE_METHOD: &str = "createFromParcel";
pub const NEW_ARRAY_METHOD: &str = "newArray";

///
/// MemberBuilder
///
/// Builds the generated members of one class. Holds no host state; every
/// method returns a fresh declaration.
///

pub struct MemberBuilder<'a, S: ?Sized> {
    config: &'a SynthConfig,
    strategy: &'a S,
    class_name: String,
    class_type: TypeRef,
}

impl<'a, S> MemberBuilder<'a, S>
where
    S: SerializationStrategy + ?Sized,
{
    #[must_use]
    pub fn new(
        config: &'a SynthConfig,
        strategy: &'a S,
        class_name: impl Into<String>,
        qualified_name: impl Into<String>,
    ) -> Self {
        Self {
            config,
            strategy,
            class_name: class_name.into(),
            class_type: TypeRef::class(qualified_name),
        }
    }

    /// `protected C(Payload in)`
    #[must_use]
    pub fn parcel_constructor(
        &self,
        fields: &[(FieldDescriptor, KeyRef)],
        chain_super: bool,
    ) -> Member {
        let container = &self.config.naming.container_var;
        let mut body = Vec::new();

        if chain_super {
            body.push(Stmt::SuperCall(vec![Expr::name("in")]));
        }

        let raw = Expr::call(Expr::name("in"), "readBundle", vec![self.class_loader()]);
        body.push(Stmt::Local {
            ty: self.config.container_type(),
            name: container.clone(),
            init: Expr::new_instance(
                self.config.container_type(),
                vec![raw, self.class_loader()],
            ),
        });

        for (field, key) in fields {
            body.push(self.strategy.read_statement(field, key, container));
        }

        Member::Constructor(MethodDecl::constructor(
            Modifiers::protected(),
            self.class_name.clone(),
            vec![Param::new(self.config.payload_type(), "in")],
            body,
        ))
    }

    /// `writeToParcel(Payload dest, int flags)`; no container is built for
    /// an empty field list.
    #[must_use]
    pub fn write_method(&self, fields: &[(FieldDescriptor, KeyRef)], chain_super: bool) -> Member {
        let container = &self.config.naming.container_var;
        let mut body = Vec::new();

        if chain_super {
            body.push(Stmt::Expr(Expr::call(
                Expr::name("super"),
                WRITE_METHOD,
                vec![Expr::name("dest"), Expr::name("flags")],
            )));
        }

        if !fields.is_empty() {
            body.push(Stmt::Local {
                ty: self.config.container_type(),
                name: container.clone(),
                init: Expr::new_instance(self.config.container_type(), vec![self.class_loader()]),
            });
            for (field, key) in fields {
                body.push(self.strategy.write_statement(field, key, container));
            }
            body.push(Stmt::Expr(Expr::call(
                Expr::name("dest"),
                "writeBundle",
                vec![Expr::call(Expr::name(container.clone()), "toBundle", vec![])],
            )));
        }

        Member::Method(
            MethodDecl::method(
                Modifiers::public(),
                TypeRef::Void,
                WRITE_METHOD,
                write_params(&self.config.payload_type()),
                body,
            )
            .with_override(),
        )
    }

    #[must_use]
    pub fn describe_contents(&self) -> Member {
        Member::Method(
            MethodDecl::method(
                Modifiers::public(),
                PrimitiveKind::Int.into(),
                DESCRIBE_METHOD,
                vec![],
                vec![Stmt::Return(Expr::Int(0))],
            )
            .with_override(),
        )
    }

    /// `public C() {}`
    #[must_use]
    pub fn default_constructor(&self) -> Member {
        Member::Constructor(MethodDecl::constructor(
            Modifiers::public(),
            self.class_name.clone(),
            vec![],
            vec![],
        ))
    }

    /// Static factory field holding an anonymous factory instance.
    #[must_use]
    pub fn factory_field(&self) -> Member {
        let factory = self.config.factory_type(self.class_type.clone());

        let create = MethodDecl::method(
            Modifiers::public(),
            self.class_type.clone(),
            CREATE_METHOD,
            vec![Param::new(self.config.payload_type(), "source")],
            vec![Stmt::Return(Expr::new_instance(
                self.class_type.clone(),
                vec![Expr::name("source")],
            ))],
        )
        .with_override();

        let new_array = MethodDecl::method(
            Modifiers::public(),
            TypeRef::array(self.class_type.clone()),
            NEW_ARRAY_METHOD,
            vec![Param::new(PrimitiveKind::Int.into(), "size")],
            vec![Stmt::Return(Expr::NewArray {
                elem: self.class_type.clone(),
                len: Box::new(Expr::name("size")),
            })],
        )
        .with_override();

        Member::Field(
            FieldDecl::new(
                Modifiers::public_static_final(),
                factory.clone(),
                self.config.naming.factory_field.clone(),
            )
            .with_initializer(Expr::Anonymous {
                ty: factory,
                methods: vec![create, new_array],
            }),
        )
    }

    // C.class.getClassLoader()
    fn class_loader(&self) -> Expr {
        Expr::call(
            Expr::ClassLiteral(self.class_type.clone()),
            "getClassLoader",
            vec![],
        )
    }
}

/// Parameter list of the serialization method.
#[must_use]
pub fn write_params(payload: &TypeRef) -> Vec<Param> {
    vec![
        Param::new(payload.clone(), "dest"),
        Param::new(PrimitiveKind::Int.into(), "flags"),
    ]
}

///
/// TESTS
///
