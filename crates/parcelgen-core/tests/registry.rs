use parcelgen_core::{
    config::KeyCase,
    keys::{KeyRegistry, KeyRegistryError},
};
use parcelgen_model::{
    decl::{Expr, FieldDecl, Member, Modifiers, TypeDecl},
    host::ClassModel,
    memory::{ClassHeader, MemoryModel},
    types::TypeRef,
};
use proptest::prelude::*;

// lowerCamel identifiers built from lowercase words
fn camel_identifier() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z]{1,6}", 1..4).prop_map(|words| {
        let mut out = words[0].clone();
        for word in &words[1..] {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
        }
        out
    })
}

// identifiers mixing digits and runs of capitals
fn mixed_identifier() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9]{0,12}"
}

// underscore before every capital past the first character, then uppercase
fn split_before_capitals(ident: &str) -> String {
    let mut out = String::new();
    for (i, c) in ident.chars().enumerate() {
        if i > 0 && c.is_ascii_uppercase() {
            out.push('_');
        }
        out.push(c.to_ascii_uppercase());
    }
    out
}

proptest! {
    #[test]
    fn constant_names_split_only_before_capitals(ident in mixed_identifier()) {
        let registry = KeyRegistry::new("BundleKey", KeyCase::Constant);

        prop_assert_eq!(registry.constant_name(&ident), split_before_capitals(&ident));
    }

    #[test]
    fn constant_names_are_deterministic(ident in camel_identifier()) {
        let a = KeyRegistry::new("BundleKey", KeyCase::Constant);
        let b = KeyRegistry::new("BundleKey", KeyCase::Constant);

        prop_assert_eq!(a.constant_name(&ident), b.constant_name(&ident));
    }

    #[test]
    fn constant_names_are_upper_snake(ident in camel_identifier()) {
        let registry = KeyRegistry::new("BundleKey", KeyCase::Constant);
        let constant = registry.constant_name(&ident);

        prop_assert!(constant.chars().all(|c| c.is_ascii_uppercase() || c == '_'));
        prop_assert_eq!(constant.replace('_', ""), ident.to_ascii_uppercase());
    }

    #[test]
    fn key_for_is_idempotent(ident in camel_identifier()) {
        let mut registry = KeyRegistry::new("BundleKey", KeyCase::Constant);

        let first = registry.key_for(&ident);
        let second = registry.key_for(&ident);

        match (first, second) {
            (Ok(a), Ok(b)) => {
                prop_assert_eq!(a, b);
                prop_assert_eq!(registry.bindings().len(), 1);
                prop_assert_eq!(&registry.bindings()[0].value, &ident);
            }
            (a, b) => prop_assert!(false, "unexpected {:?} / {:?}", a, b),
        }
    }

    #[test]
    fn merge_twice_changes_nothing(idents in prop::collection::btree_set(camel_identifier(), 1..6)) {
        let mut model = MemoryModel::new();
        let class = model.add_class(ClassHeader::class("com.example", "Sample"));

        let mut registry = KeyRegistry::new("BundleKey", KeyCase::Constant);
        let mut expected = 0;
        for ident in &idents {
            match registry.key_for(ident) {
                Ok(_) => expected += 1,
                Err(KeyRegistryError::Collision { .. }) => {}
                Err(err) => prop_assert!(false, "unexpected {}", err),
            }
        }

        let first = registry.merge_into(&mut model, class).expect("first merge");
        let rendered = model.render_class(class).expect("render");
        let second = registry.merge_into(&mut model, class).expect("second merge");

        prop_assert_eq!(first.added.len(), expected);
        prop_assert!(second.added.is_empty());
        prop_assert!(second.filled.is_empty());
        prop_assert_eq!(second.preserved, first.added);
        prop_assert_eq!(model.render_class(class).expect("render"), rendered);
    }
}

#[test]
fn merge_into_existing_interface_keeps_foreign_constants() {
    let mut model = MemoryModel::new();
    let class = model.add_class(ClassHeader::class("com.example", "Sample"));
    let keys = model
        .add_nested_type(class, TypeDecl::interface(Modifiers::public(), "BundleKey"))
        .expect("nested");
    model
        .add_member(
            keys,
            Member::Field(
                FieldDecl::new(Modifiers::default(), TypeRef::string(), "RETIRED")
                    .with_initializer(Expr::str("retired")),
            ),
        )
        .expect("constant");

    let mut registry = KeyRegistry::new("BundleKey", KeyCase::Constant);
    registry.key_for("count").expect("bind");
    let report = registry.merge_into(&mut model, class).expect("merge");

    assert!(!report.created);
    assert_eq!(report.registry, keys);
    assert_eq!(report.added, ["COUNT"]);

    let names: Vec<_> = model
        .fields(keys)
        .expect("fields")
        .into_iter()
        .map(|f| f.name)
        .collect();
    assert_eq!(names, ["RETIRED", "COUNT"]);
}
