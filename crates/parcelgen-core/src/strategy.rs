use crate::{field::FieldDescriptor, keys::KeyRef};
use parcelgen_model::{
    decl::{Expr, Stmt},
    types::PrimitiveKind,
};

///
/// SerializationStrategy
///
/// Emits the per-field statements of the generated constructor and
/// serialization method. The read and write statement of a field must use
/// the same key.
///

pub trait SerializationStrategy {
    fn write_statement(&self, field: &FieldDescriptor, key: &KeyRef, container: &str) -> Stmt;

    fn read_statement(&self, field: &FieldDescriptor, key: &KeyRef, container: &str) -> Stmt;
}

///
/// Accessors
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Accessors {
    pub getter: &'static str,
    pub putter: &'static str,
}

const PRIMITIVE_ACCESSORS: [(PrimitiveKind, Accessors); 8] = [
    (PrimitiveKind::Boolean, accessors("getBoolean", "putBoolean")),
    (PrimitiveKind::Byte, accessors("getByte", "putByte")),
    (PrimitiveKind::Char, accessors("getChar", "putChar")),
    (PrimitiveKind::Double, accessors("getDouble", "putDouble")),
    (PrimitiveKind::Float, accessors("getFloat", "putFloat")),
    (PrimitiveKind::Int, accessors("getInt", "putInt")),
    (PrimitiveKind::Long, accessors("getLong", "putLong")),
    (PrimitiveKind::Short, accessors("getShort", "putShort")),
];

const GENERIC_GET: &str = "get";
const GENERIC_PUT: &str = "put";

const fn accessors(getter: &'static str, putter: &'static str) -> Accessors {
    Accessors { getter, putter }
}

/// Type-specific accessor pair for a primitive kind.
#[must_use]
pub fn primitive_accessors(kind: PrimitiveKind) -> Accessors {
    PRIMITIVE_ACCESSORS
        .iter()
        .find(|(k, _)| *k == kind)
        .map_or_else(|| accessors(GENERIC_GET, GENERIC_PUT), |(_, a)| *a)
}

///
/// BundleStrategy
///
/// Primitive fields go through the typed container accessors. Every other
/// type is stored with the generic `put` and read back with `get` plus the
/// class literal of its erased type.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct BundleStrategy;

impl SerializationStrategy for BundleStrategy {
    fn write_statement(&self, field: &FieldDescriptor, key: &KeyRef, container: &str) -> Stmt {
        let putter = field
            .declared_type
            .as_primitive()
            .map_or(GENERIC_PUT, |kind| primitive_accessors(kind).putter);

        Stmt::Expr(Expr::call(
            Expr::name(container),
            putter,
            vec![key.to_expr(), field.access()],
        ))
    }

    fn read_statement(&self, field: &FieldDescriptor, key: &KeyRef, container: &str) -> Stmt {
        let value = match field.declared_type.as_primitive() {
            Some(kind) => Expr::call(
                Expr::name(container),
                primitive_accessors(kind).getter,
                vec![key.to_expr()],
            ),
            None => Expr::call(
                Expr::name(container),
                GENERIC_GET,
                vec![
                    key.to_expr(),
                    Expr::ClassLiteral(field.declared_type.erasure()),
                ],
            ),
        };

        Stmt::Assign {
            target: field.access(),
            value,
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use parcelgen_model::{
        decl::{Member, MethodDecl, Modifiers},
        render::render_member,
        types::TypeRef,
    };

    fn key(constant: &str) -> KeyRef {
        KeyRef {
            registry: "BundleKey".to_string(),
            constant: constant.to_string(),
        }
    }

    // render inside a throwaway method and keep the statement line
    fn render(stmt: Stmt) -> String {
        let method =
            MethodDecl::method(Modifiers::default(), TypeRef::Void, "m", vec![], vec![stmt]);
        let text = render_member(&Member::Method(method));

        text.lines().nth(1).unwrap_or_default().trim().to_string()
    }

    #[test]
    fn every_primitive_has_a_typed_pair() {
        let expected = [
            (PrimitiveKind::Boolean, "getBoolean", "putBoolean"),
            (PrimitiveKind::Byte, "getByte", "putByte"),
            (PrimitiveKind::Char, "getChar", "putChar"),
            (PrimitiveKind::Double, "getDouble", "putDouble"),
            (PrimitiveKind::Float, "getFloat", "putFloat"),
            (PrimitiveKind::Int, "getInt", "putInt"),
            (PrimitiveKind::Long, "getLong", "putLong"),
            (PrimitiveKind::Short, "getShort", "putShort"),
        ];

        for (kind, getter, putter) in expected {
            let field = FieldDescriptor::new(kind.into(), "value");

            assert_eq!(
                render(BundleStrategy.read_statement(&field, &key("VALUE"), "bundle")),
                format!("this.value = bundle.{getter}(BundleKey.VALUE);"),
                "read {kind}"
            );
            assert_eq!(
                render(BundleStrategy.write_statement(&field, &key("VALUE"), "bundle")),
                format!("bundle.{putter}(BundleKey.VALUE, this.value);"),
                "write {kind}"
            );
        }
    }

    #[test]
    fn reference_types_use_generic_accessors() {
        let field = FieldDescriptor::new(TypeRef::string(), "label");

        assert_eq!(
            render(BundleStrategy.read_statement(&field, &key("LABEL"), "bundle")),
            "this.label = bundle.get(BundleKey.LABEL, java.lang.String.class);"
        );
        assert_eq!(
            render(BundleStrategy.write_statement(&field, &key("LABEL"), "bundle")),
            "bundle.put(BundleKey.LABEL, this.label);"
        );
    }

    #[test]
    fn generic_types_read_with_erased_class_literal() {
        let ty = TypeRef::generic("java.util.List", vec![TypeRef::string()]);
        let field = FieldDescriptor::new(ty, "tags");

        assert_eq!(
            render(BundleStrategy.read_statement(&field, &key("TAGS"), "bundle")),
            "this.tags = bundle.get(BundleKey.TAGS, java.util.List.class);"
        );
    }

    #[test]
    fn arrays_keep_dimensions_in_class_literal() {
        let field = FieldDescriptor::new(TypeRef::array(PrimitiveKind::Int.into()), "grid");

        assert_eq!(
            render(BundleStrategy.read_statement(&field, &key("GRID"), "box")),
            "this.grid = box.get(BundleKey.GRID, int[].class);"
        );
        assert_eq!(
            render(BundleStrategy.write_statement(&field, &key("GRID"), "box")),
            "box.put(BundleKey.GRID, this.grid);"
        );
    }
}
