use crate::{
    decl::{
        Expr, FieldDecl, Member, MethodDecl, Modifiers, Param, Stmt, TypeDecl, TypeKind,
        Visibility,
    },
    error::HostError,
    host::{ClassId, ClassModel},
    memory::{ClassHeader, MemoryModel},
    render::QualifiedName,
    types::TypeRef,
};
use serde::Deserialize;
use std::collections::BTreeMap;

// Simple names resolved against java.lang when nothing else claims them.
const JAVA_LANG: &[&str] = &[
    "Boolean",
    "Byte",
    "CharSequence",
    "Character",
    "Cloneable",
    "Comparable",
    "Double",
    "Enum",
    "Float",
    "Integer",
    "Iterable",
    "Long",
    "Number",
    "Object",
    "Runnable",
    "Short",
    "String",
];

///
/// ModelSpec
///
/// Serializable description of one compilation unit, used to seed a
/// [`MemoryModel`] from JSON.
///

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelSpec {
    #[serde(default)]
    pub package: String,

    #[serde(default)]
    pub imports: Vec<String>,

    pub classes: Vec<ClassSpec>,
}

///
/// ClassSpec
///

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassSpec {
    pub name: String,

    #[serde(default)]
    pub interface: bool,

    #[serde(default)]
    pub modifiers: Vec<String>,

    #[serde(default)]
    pub superclass: Option<String>,

    #[serde(default)]
    pub implements: Vec<String>,

    #[serde(default)]
    pub fields: Vec<FieldSpec>,

    #[serde(default)]
    pub constructors: Vec<MethodSpec>,

    #[serde(default)]
    pub methods: Vec<MethodSpec>,

    #[serde(default)]
    pub nested: Vec<Self>,
}

///
/// FieldSpec
///

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: String,

    #[serde(default)]
    pub modifiers: Vec<String>,

    /// Initializer expression, verbatim.
    #[serde(default)]
    pub init: Option<String>,
}

///
/// MethodSpec
///
/// A method or constructor. `body: None` declares an abstract method.
///

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodSpec {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub returns: Option<String>,

    #[serde(default)]
    pub modifiers: Vec<String>,

    #[serde(default)]
    pub annotations: Vec<String>,

    #[serde(default)]
    pub params: Vec<ParamSpec>,

    /// Statements, verbatim.
    #[serde(default)]
    pub body: Option<Vec<String>>,
}

///
/// ParamSpec
///

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamSpec {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: String,
}

impl MemoryModel {
    /// Build a model from a JSON [`ModelSpec`].
    pub fn from_json(json: &str) -> Result<Self, HostError> {
        let spec: ModelSpec = serde_json::from_str(json)?;

        Self::from_spec(&spec)
    }

    pub fn from_spec(spec: &ModelSpec) -> Result<Self, HostError> {
        let mut model = Self::new();
        let qualifier = Qualifier::new(spec);

        // headers first so that members may reference any declared class
        let mut pending = Vec::new();
        for class in &spec.classes {
            let header = ClassHeader {
                package: spec.package.clone(),
                name: class.name.clone(),
                kind: kind_of(class),
                modifiers: parse_modifiers(&class.modifiers)?,
                superclass: class
                    .superclass
                    .as_deref()
                    .map(|ty| qualifier.parse(ty))
                    .transpose()?,
                implements: qualifier.parse_all(&class.implements)?,
            };
            let id = model.add_class(header);
            for import in &spec.imports {
                model.add_import(id, import)?;
            }
            pending.push((id, class));
        }

        for (id, class) in pending {
            model.load_body(id, class, &qualifier)?;
        }

        Ok(model)
    }

    fn load_body(
        &mut self,
        id: ClassId,
        class: &ClassSpec,
        qualifier: &Qualifier,
    ) -> Result<(), HostError> {
        let is_interface = class.interface;

        for field in &class.fields {
            let mut decl = FieldDecl::new(
                parse_modifiers(&field.modifiers)?,
                qualifier.parse(&field.ty)?,
                field.name.clone(),
            );
            decl.initializer = field.init.as_ref().map(|init| Expr::Raw(init.clone()));
            self.add_member(id, Member::Field(decl))?;
        }

        for ctor in &class.constructors {
            let decl = load_method(ctor, class.name.clone(), None, is_interface, qualifier)?;
            self.add_member(id, Member::Constructor(decl))?;
        }

        for method in &class.methods {
            let name = method.name.clone().ok_or_else(|| {
                HostError::rejected("load", format!("unnamed method in '{}'", class.name))
            })?;
            let returns = qualifier.parse(method.returns.as_deref().unwrap_or("void"))?;
            let decl = load_method(method, name, Some(returns), is_interface, qualifier)?;
            self.add_member(id, Member::Method(decl))?;
        }

        for nested in &class.nested {
            let nested_id = self.add_nested_type(
                id,
                TypeDecl {
                    modifiers: parse_modifiers(&nested.modifiers)?,
                    kind: kind_of(nested),
                    name: nested.name.clone(),
                },
            )?;
            self.load_body(nested_id, nested, qualifier)?;
        }

        Ok(())
    }
}

fn load_method(
    spec: &MethodSpec,
    name: String,
    return_type: Option<TypeRef>,
    is_interface: bool,
    qualifier: &Qualifier,
) -> Result<MethodDecl, HostError> {
    let mut modifiers = parse_modifiers(&spec.modifiers)?;
    if spec.body.is_none() && is_interface {
        modifiers.is_abstract = true;
    }

    let params = spec
        .params
        .iter()
        .map(|p| Ok(Param::new(qualifier.parse(&p.ty)?, p.name.clone())))
        .collect::<Result<Vec<_>, HostError>>()?;

    Ok(MethodDecl {
        annotations: spec.annotations.clone(),
        modifiers,
        return_type,
        name,
        params,
        body: spec
            .body
            .as_ref()
            .map(|stmts| stmts.iter().map(|s| Stmt::Raw(s.clone())).collect()),
    })
}

const fn kind_of(class: &ClassSpec) -> TypeKind {
    if class.interface {
        TypeKind::Interface
    } else {
        TypeKind::Class
    }
}

fn parse_modifiers(words: &[String]) -> Result<Modifiers, HostError> {
    let mut modifiers = Modifiers::default();
    for word in words {
        match word.as_str() {
            "public" => modifiers.visibility = Visibility::Public,
            "protected" => modifiers.visibility = Visibility::Protected,
            "private" => modifiers.visibility = Visibility::Private,
            "static" => modifiers.is_static = true,
            "final" => modifiers.is_final = true,
            "abstract" => modifiers.is_abstract = true,
            "transient" => modifiers.is_transient = true,
            other => {
                return Err(HostError::rejected(
                    "load",
                    format!("unknown modifier '{other}'"),
                ));
            }
        }
    }

    Ok(modifiers)
}

///
/// Qualifier
///
/// Rewrites simple names in type text to qualified names using the unit's
/// imports, its declared classes and java.lang, in that order.
///

struct Qualifier {
    known: BTreeMap<String, String>,
}

impl Qualifier {
    fn new(spec: &ModelSpec) -> Self {
        let mut known = BTreeMap::new();

        for name in JAVA_LANG {
            known.insert((*name).to_string(), format!("java.lang.{name}"));
        }
        for class in &spec.classes {
            let qualified = if spec.package.is_empty() {
                class.name.clone()
            } else {
                format!("{}.{}", spec.package, class.name)
            };
            known.insert(class.name.clone(), qualified);
        }
        for import in &spec.imports {
            let name = QualifiedName::split(import);
            known.insert(name.top_level.to_string(), name.import_path());
        }

        Self { known }
    }

    fn parse(&self, text: &str) -> Result<TypeRef, HostError> {
        let ty: TypeRef = text.parse()?;

        Ok(self.qualify(ty))
    }

    fn parse_all(&self, texts: &[String]) -> Result<Vec<TypeRef>, HostError> {
        texts.iter().map(|text| self.parse(text)).collect()
    }

    fn qualify(&self, ty: TypeRef) -> TypeRef {
        match ty {
            TypeRef::Class { name, args } => {
                let (head, tail) = name.find('.').map_or((name.as_str(), ""), |i| name.split_at(i));
                let starts_upper = head.starts_with(char::is_uppercase);
                let name = match self.known.get(head) {
                    Some(qualified) if starts_upper => format!("{qualified}{tail}"),
                    _ => name.clone(),
                };

                TypeRef::Class {
                    name,
                    args: args.into_iter().map(|arg| self.qualify(arg)).collect(),
                }
            }
            TypeRef::Array(elem) => TypeRef::array(self.qualify(*elem)),
            other => other,
        }
    }
}

///
/// TESTS
///
