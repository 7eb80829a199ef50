//! Structured member declarations.
//!
//! Generated code is assembled from these nodes and rendered to Java text by
//! [`crate::render`]. Validation happens before a node reaches a host, so a
//! malformed emission is caught at construction time instead of surfacing as a
//! host parse failure halfway through a pass.

use crate::types::TypeRef;
use derive_more::Display;
use thiserror::Error as ThisError;

// Reserved words that can never be used as identifiers.
const KEYWORDS: &[&str] = &[
    "abstract",
    "assert",
    "boolean",
    "break",
    "byte",
    "case",
    "catch",
    "char",
    "class",
    "const",
    "continue",
    "default",
    "do",
    "double",
    "else",
    "enum",
    "extends",
    "false",
    "final",
    "finally",
    "float",
    "for",
    "goto",
    "if",
    "implements",
    "import",
    "instanceof",
    "int",
    "interface",
    "long",
    "native",
    "new",
    "null",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "short",
    "static",
    "strictfp",
    "super",
    "switch",
    "synchronized",
    "this",
    "throw",
    "throws",
    "transient",
    "true",
    "try",
    "void",
    "volatile",
    "while",
];

/// Whether `s` is a legal Java identifier (and not a reserved word).
#[must_use]
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    (first.is_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        && !KEYWORDS.contains(&s)
}

///
/// DeclError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum DeclError {
    #[error("invalid identifier '{ident}' in {context}")]
    InvalidIdentifier { ident: String, context: String },

    #[error("empty type name in {context}")]
    EmptyTypeName { context: String },

    #[error("'{name}' has no body")]
    MissingBody { name: String },

    #[error("constructor '{name}' declares a return type")]
    ConstructorReturnType { name: String },

    #[error("duplicate parameter '{param}' in '{name}'")]
    DuplicateParam { name: String, param: String },

    #[error("empty raw fragment in {context}")]
    EmptyRaw { context: String },

    #[error("local '{local}' in '{name}' redeclares a parameter or local")]
    DuplicateLocal { name: String, local: String },
}

///
/// Visibility
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Visibility {
    #[default]
    Package,
    Private,
    Protected,
    Public,
}

///
/// Modifiers
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Modifiers {
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
    pub is_abstract: bool,
    pub is_transient: bool,
}

impl Modifiers {
    #[must_use]
    pub fn public() -> Self {
        Self {
            visibility: Visibility::Public,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn protected() -> Self {
        Self {
            visibility: Visibility::Protected,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn public_static_final() -> Self {
        Self {
            visibility: Visibility::Public,
            is_static: true,
            is_final: true,
            ..Self::default()
        }
    }

    /// Keywords in canonical source order.
    #[must_use]
    pub fn keywords(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        match self.visibility {
            Visibility::Package => {}
            Visibility::Private => out.push("private"),
            Visibility::Protected => out.push("protected"),
            Visibility::Public => out.push("public"),
        }
        if self.is_abstract {
            out.push("abstract");
        }
        if self.is_static {
            out.push("static");
        }
        if self.is_final {
            out.push("final");
        }
        if self.is_transient {
            out.push("transient");
        }

        out
    }
}

///
/// Expr
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Expr {
    /// Identifier or dotted access path (`this.x`, `BundleKey.X`).
    Name(String),
    /// String literal; the payload is unescaped.
    Str(String),
    Int(i64),
    Call {
        target: Option<Box<Self>>,
        method: String,
        args: Vec<Self>,
    },
    New {
        ty: TypeRef,
        args: Vec<Self>,
    },
    NewArray {
        elem: TypeRef,
        len: Box<Self>,
    },
    ClassLiteral(TypeRef),
    /// Anonymous class instance with method overrides.
    Anonymous {
        ty: TypeRef,
        methods: Vec<MethodDecl>,
    },
    /// Verbatim text carried over from hand-written code.
    Raw(String),
}

impl Expr {
    #[must_use]
    pub fn name(s: impl Into<String>) -> Self {
        Self::Name(s.into())
    }

    #[must_use]
    pub fn str(s: impl Into<String>) -> Self {
        Self::Str(s.into())
    }

    /// `target.method(args)`
    #[must_use]
    pub fn call(target: Self, method: impl Into<String>, args: Vec<Self>) -> Self {
        Self::Call {
            target: Some(Box::new(target)),
            method: method.into(),
            args,
        }
    }

    #[must_use]
    pub fn new_instance(ty: TypeRef, args: Vec<Self>) -> Self {
        Self::New { ty, args }
    }

    fn validate(&self, context: &str) -> Result<(), DeclError> {
        match self {
            Self::Name(path) => validate_path(path, context),
            Self::Str(_) | Self::Int(_) => Ok(()),
            Self::Call {
                target,
                method,
                args,
            } => {
                if let Some(target) = target {
                    target.validate(context)?;
                }
                validate_ident(method, context)?;
                args.iter().try_for_each(|arg| arg.validate(context))
            }
            Self::New { ty, args } => {
                validate_type(ty, context)?;
                args.iter().try_for_each(|arg| arg.validate(context))
            }
            Self::NewArray { elem, len } => {
                validate_type(elem, context)?;
                len.validate(context)
            }
            Self::ClassLiteral(ty) => validate_type(ty, context),
            Self::Anonymous { ty, methods } => {
                validate_type(ty, context)?;
                methods.iter().try_for_each(MethodDecl::validate)
            }
            Self::Raw(text) => validate_raw(text, context),
        }
    }

    /// Visit every type named by this expression.
    pub fn for_each_type(&self, f: &mut impl FnMut(&TypeRef)) {
        match self {
            Self::Name(_) | Self::Str(_) | Self::Int(_) | Self::Raw(_) => {}
            Self::Call { target, args, .. } => {
                if let Some(target) = target {
                    target.for_each_type(f);
                }
                args.iter().for_each(|arg| arg.for_each_type(f));
            }
            Self::New { ty, args } => {
                f(ty);
                args.iter().for_each(|arg| arg.for_each_type(f));
            }
            Self::NewArray { elem, len } => {
                f(elem);
                len.for_each_type(f);
            }
            Self::ClassLiteral(ty) => f(ty),
            Self::Anonymous { ty, methods } => {
                f(ty);
                methods.iter().for_each(|m| m.for_each_type(f));
            }
        }
    }
}

///
/// Stmt
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Stmt {
    Local { ty: TypeRef, name: String, init: Expr },
    Assign { target: Expr, value: Expr },
    Expr(Expr),
    Return(Expr),
    /// `super(args);` as the first statement of a constructor.
    SuperCall(Vec<Expr>),
    Raw(String),
}

impl Stmt {
    fn validate(&self, context: &str) -> Result<(), DeclError> {
        match self {
            Self::Local { ty, name, init } => {
                validate_type(ty, context)?;
                validate_ident(name, context)?;
                init.validate(context)
            }
            Self::Assign { target, value } => {
                target.validate(context)?;
                value.validate(context)
            }
            Self::Expr(expr) | Self::Return(expr) => expr.validate(context),
            Self::SuperCall(args) => args.iter().try_for_each(|arg| arg.validate(context)),
            Self::Raw(text) => validate_raw(text, context),
        }
    }

    pub fn for_each_type(&self, f: &mut impl FnMut(&TypeRef)) {
        match self {
            Self::Local { ty, init, .. } => {
                f(ty);
                init.for_each_type(f);
            }
            Self::Assign { target, value } => {
                target.for_each_type(f);
                value.for_each_type(f);
            }
            Self::Expr(expr) | Self::Return(expr) => expr.for_each_type(f),
            Self::SuperCall(args) => args.iter().for_each(|arg| arg.for_each_type(f)),
            Self::Raw(_) => {}
        }
    }
}

///
/// Param
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Param {
    pub ty: TypeRef,
    pub name: String,
}

impl Param {
    #[must_use]
    pub fn new(ty: TypeRef, name: impl Into<String>) -> Self {
        Self {
            ty,
            name: name.into(),
        }
    }
}

///
/// MethodDecl
///
/// Shared shape for methods and constructors. Constructors carry no return
/// type; `body: None` means abstract or interface method.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MethodDecl {
    pub annotations: Vec<String>,
    pub modifiers: Modifiers,
    pub return_type: Option<TypeRef>,
    pub name: String,
    pub params: Vec<Param>,
    pub body: Option<Vec<Stmt>>,
}

impl MethodDecl {
    #[must_use]
    pub fn constructor(
        modifiers: Modifiers,
        name: impl Into<String>,
        params: Vec<Param>,
        body: Vec<Stmt>,
    ) -> Self {
        Self {
            annotations: Vec::new(),
            modifiers,
            return_type: None,
            name: name.into(),
            params,
            body: Some(body),
        }
    }

    #[must_use]
    pub fn method(
        modifiers: Modifiers,
        return_type: TypeRef,
        name: impl Into<String>,
        params: Vec<Param>,
        body: Vec<Stmt>,
    ) -> Self {
        Self {
            annotations: Vec::new(),
            modifiers,
            return_type: Some(return_type),
            name: name.into(),
            params,
            body: Some(body),
        }
    }

    #[must_use]
    pub fn with_override(mut self) -> Self {
        self.annotations.push("Override".to_string());
        self
    }

    /// Parameter types in declaration order.
    #[must_use]
    pub fn param_types(&self) -> Vec<TypeRef> {
        self.params.iter().map(|p| p.ty.clone()).collect()
    }

    pub fn validate(&self) -> Result<(), DeclError> {
        let context = format!("method '{}'", self.name);

        validate_ident(&self.name, &context)?;
        for annotation in &self.annotations {
            validate_path(annotation, &context)?;
        }
        if let Some(ty) = &self.return_type {
            validate_type(ty, &context)?;
        }

        for (i, param) in self.params.iter().enumerate() {
            validate_type(&param.ty, &context)?;
            validate_ident(&param.name, &context)?;
            if self.params[..i].iter().any(|p| p.name == param.name) {
                return Err(DeclError::DuplicateParam {
                    name: self.name.clone(),
                    param: param.name.clone(),
                });
            }
        }

        match &self.body {
            Some(body) => {
                let mut scope: Vec<&str> = self.params.iter().map(|p| p.name.as_str()).collect();
                for stmt in body {
                    stmt.validate(&context)?;
                    if let Stmt::Local { name, .. } = stmt {
                        if scope.contains(&name.as_str()) {
                            return Err(DeclError::DuplicateLocal {
                                name: self.name.clone(),
                                local: name.clone(),
                            });
                        }
                        scope.push(name);
                    }
                }
                Ok(())
            }
            None if self.modifiers.is_abstract => Ok(()),
            None => Err(DeclError::MissingBody {
                name: self.name.clone(),
            }),
        }
    }

    pub fn for_each_type(&self, f: &mut impl FnMut(&TypeRef)) {
        if let Some(ty) = &self.return_type {
            f(ty);
        }
        for param in &self.params {
            f(&param.ty);
        }
        for stmt in self.body.iter().flatten() {
            stmt.for_each_type(f);
        }
    }
}

///
/// FieldDecl
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldDecl {
    pub modifiers: Modifiers,
    pub ty: TypeRef,
    pub name: String,
    pub initializer: Option<Expr>,
}

impl FieldDecl {
    #[must_use]
    pub fn new(modifiers: Modifiers, ty: TypeRef, name: impl Into<String>) -> Self {
        Self {
            modifiers,
            ty,
            name: name.into(),
            initializer: None,
        }
    }

    #[must_use]
    pub fn with_initializer(mut self, init: Expr) -> Self {
        self.initializer = Some(init);
        self
    }

    pub fn validate(&self) -> Result<(), DeclError> {
        let context = format!("field '{}'", self.name);

        validate_ident(&self.name, &context)?;
        validate_type(&self.ty, &context)?;
        if let Some(init) = &self.initializer {
            init.validate(&context)?;
        }

        Ok(())
    }

    pub fn for_each_type(&self, f: &mut impl FnMut(&TypeRef)) {
        f(&self.ty);
        if let Some(init) = &self.initializer {
            init.for_each_type(f);
        }
    }
}

///
/// TypeKind
///

#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq)]
pub enum TypeKind {
    #[default]
    #[display("class")]
    Class,
    #[display("interface")]
    Interface,
}

///
/// TypeDecl
///
/// Header of a nested type; its members are inserted separately.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TypeDecl {
    pub modifiers: Modifiers,
    pub kind: TypeKind,
    pub name: String,
}

impl TypeDecl {
    #[must_use]
    pub fn interface(modifiers: Modifiers, name: impl Into<String>) -> Self {
        Self {
            modifiers,
            kind: TypeKind::Interface,
            name: name.into(),
        }
    }

    pub fn validate(&self) -> Result<(), DeclError> {
        validate_ident(&self.name, &format!("type '{}'", self.name))
    }
}

///
/// Member
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Member {
    Constructor(MethodDecl),
    Method(MethodDecl),
    Field(FieldDecl),
}

impl Member {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Constructor(m) | Self::Method(m) => &m.name,
            Self::Field(f) => &f.name,
        }
    }

    #[must_use]
    pub const fn as_method(&self) -> Option<&MethodDecl> {
        match self {
            Self::Constructor(m) | Self::Method(m) => Some(m),
            Self::Field(_) => None,
        }
    }

    #[must_use]
    pub const fn as_field(&self) -> Option<&FieldDecl> {
        match self {
            Self::Field(f) => Some(f),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), DeclError> {
        match self {
            Self::Constructor(m) => {
                if m.return_type.is_some() {
                    return Err(DeclError::ConstructorReturnType {
                        name: m.name.clone(),
                    });
                }
                if m.body.is_none() {
                    return Err(DeclError::MissingBody {
                        name: m.name.clone(),
                    });
                }
                m.validate()
            }
            Self::Method(m) => m.validate(),
            Self::Field(f) => f.validate(),
        }
    }

    pub fn for_each_type(&self, f: &mut impl FnMut(&TypeRef)) {
        match self {
            Self::Constructor(m) | Self::Method(m) => m.for_each_type(f),
            Self::Field(field) => field.for_each_type(f),
        }
    }
}

impl From<FieldDecl> for Member {
    fn from(field: FieldDecl) -> Self {
        Self::Field(field)
    }
}

// validate_ident
fn validate_ident(ident: &str, context: &str) -> Result<(), DeclError> {
    if is_identifier(ident) {
        Ok(())
    } else {
        Err(DeclError::InvalidIdentifier {
            ident: ident.to_string(),
            context: context.to_string(),
        })
    }
}

// dotted path; `this` and `super` are allowed as the leading segment only
fn validate_path(path: &str, context: &str) -> Result<(), DeclError> {
    for (i, segment) in path.split('.').enumerate() {
        let receiver = i == 0 && matches!(segment, "this" | "super");
        if !receiver && !is_identifier(segment) {
            return Err(DeclError::InvalidIdentifier {
                ident: path.to_string(),
                context: context.to_string(),
            });
        }
    }

    Ok(())
}

fn validate_type(ty: &TypeRef, context: &str) -> Result<(), DeclError> {
    let mut result = Ok(());
    ty.for_each_class(&mut |name| {
        if result.is_err() {
            return;
        }
        if name.is_empty() {
            result = Err(DeclError::EmptyTypeName {
                context: context.to_string(),
            });
        } else if name.split('.').any(|segment| !is_identifier(segment)) {
            result = Err(DeclError::InvalidIdentifier {
                ident: name.to_string(),
                context: context.to_string(),
            });
        }
    });

    result
}

fn validate_raw(text: &str, context: &str) -> Result<(), DeclError> {
    if text.trim().is_empty() {
        Err(DeclError::EmptyRaw {
            context: context.to_string(),
        })
    } else {
        Ok(())
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PrimitiveKind;

    #[test]
    fn identifiers_reject_keywords_and_bad_starts() {
        assert!(is_identifier("count"));
        assert!(is_identifier("_x$1"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("1x"));
        assert!(!is_identifier("class"));
        assert!(!is_identifier("my-field"));
    }

    #[test]
    fn constructor_with_return_type_is_malformed() {
        let mut ctor = MethodDecl::constructor(Modifiers::public(), "Point", vec![], vec![]);
        ctor.return_type = Some(TypeRef::Void);

        assert_eq!(
            Member::Constructor(ctor).validate(),
            Err(DeclError::ConstructorReturnType {
                name: "Point".to_string()
            })
        );
    }

    #[test]
    fn duplicate_params_are_malformed() {
        let method = MethodDecl::method(
            Modifiers::public(),
            TypeRef::Void,
            "write",
            vec![
                Param::new(PrimitiveKind::Int.into(), "a"),
                Param::new(PrimitiveKind::Int.into(), "a"),
            ],
            vec![],
        );

        assert!(matches!(
            method.validate(),
            Err(DeclError::DuplicateParam { .. })
        ));
    }

    #[test]
    fn locals_may_not_redeclare_params_or_locals() {
        let local = |name: &str| Stmt::Local {
            ty: PrimitiveKind::Int.into(),
            name: name.to_string(),
            init: Expr::Int(0),
        };
        let method = |body| {
            MethodDecl::method(
                Modifiers::public(),
                TypeRef::Void,
                "write",
                vec![Param::new(PrimitiveKind::Int.into(), "dest")],
                body,
            )
        };

        assert!(method(vec![local("bundle")]).validate().is_ok());
        assert_eq!(
            method(vec![local("dest")]).validate(),
            Err(DeclError::DuplicateLocal {
                name: "write".to_string(),
                local: "dest".to_string(),
            })
        );
        assert!(matches!(
            method(vec![local("tmp"), local("tmp")]).validate(),
            Err(DeclError::DuplicateLocal { .. })
        ));
    }

    #[test]
    fn names_accept_receiver_paths_only_in_front() {
        let ok = Stmt::Assign {
            target: Expr::name("this.count"),
            value: Expr::Int(1),
        };
        let bad = Stmt::Expr(Expr::name("count.this"));

        assert!(ok.validate("test").is_ok());
        assert!(bad.validate("test").is_err());
    }

    #[test]
    fn abstract_methods_may_omit_a_body() {
        let mut method = MethodDecl::method(
            Modifiers::public(),
            TypeRef::Void,
            "writeToParcel",
            vec![],
            vec![],
        );
        method.body = None;
        assert!(method.validate().is_err());

        method.modifiers.is_abstract = true;
        assert!(method.validate().is_ok());
    }
}
