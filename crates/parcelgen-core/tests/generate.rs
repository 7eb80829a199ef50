use parcelgen_core::{
    config::{KeyCase, SynthConfig},
    error::SynthError,
    field::FieldDescriptor,
    keys::KeyRegistryError,
    synth::{CodeSynthesizer, GenerateReport},
};
use parcelgen_model::{
    decl::DeclError,
    host::{ClassId, ClassModel},
    memory::MemoryModel,
};

const POINT: &str = r#"{
    "package": "com.example",
    "classes": [{
        "name": "Point",
        "modifiers": ["public"],
        "fields": [
            { "name": "x", "type": "int", "modifiers": ["private"] },
            { "name": "y", "type": "int", "modifiers": ["private"] }
        ]
    }]
}"#;

const POINT_RENDERED: &str = "\
package com.example;

import android.os.Parcel;
import android.os.Parcelable;
import com.booking.common.util.MarshalingBundle;

public class Point implements Parcelable {
    private int x;
    private int y;

    public Point() {}

    protected Point(Parcel in) {
        MarshalingBundle bundle = new MarshalingBundle(in.readBundle(Point.class.getClassLoader()), Point.class.getClassLoader());
        this.x = bundle.getInt(BundleKey.X);
        this.y = bundle.getInt(BundleKey.Y);
    }

    @Override
    public void writeToParcel(Parcel dest, int flags) {
        MarshalingBundle bundle = new MarshalingBundle(Point.class.getClassLoader());
        bundle.putInt(BundleKey.X, this.x);
        bundle.putInt(BundleKey.Y, this.y);
        dest.writeBundle(bundle.toBundle());
    }

    @Override
    public int describeContents() {
        return 0;
    }

    public static final Parcelable.Creator<Point> CREATOR = new Parcelable.Creator<Point>() {
        @Override
        public Point createFromParcel(Parcel source) {
            return new Point(source);
        }

        @Override
        public Point[] newArray(int size) {
            return new Point[size];
        }
    };

    public interface BundleKey {
        String X = \"x\";
        String Y = \"y\";
    }
}
";

// load a model and locate `class` by simple name
fn load(json: &str, class: &str) -> (MemoryModel, ClassId) {
    let model = MemoryModel::from_json(json).expect("model should load");
    let id = model.find_by_simple_name(class).expect("class should exist");

    (model, id)
}

fn instance_fields(model: &MemoryModel, class: ClassId) -> Vec<FieldDescriptor> {
    FieldDescriptor::instance_fields(&model.fields(class).expect("fields"))
}

fn run(model: &mut MemoryModel, class: ClassId) -> GenerateReport {
    let fields = instance_fields(model, class);

    parcelgen_core::generate(model, class, &fields).expect("generation should succeed")
}

fn render(model: &MemoryModel, class: ClassId) -> String {
    model.render_class(class).expect("render")
}

#[test]
fn point_end_to_end() {
    let (mut model, point) = load(POINT, "Point");

    let report = run(&mut model, point);

    assert_eq!(render(&model, point), POINT_RENDERED);
    assert!(report.purged.is_empty());
    assert_eq!(report.inserted.len(), 5);
    assert!(report.capability_added);
    assert!(report.registry.created);
    assert_eq!(report.registry.added, ["X", "Y"]);
}

#[test]
fn second_pass_is_idempotent() {
    let (mut model, point) = load(POINT, "Point");

    run(&mut model, point);
    let first = render(&model, point);

    let report = run(&mut model, point);
    let second = render(&model, point);

    assert_eq!(first, second);
    assert_eq!(report.purged.len(), 4);
    assert_eq!(report.inserted.len(), 4);
    assert!(!report.capability_added);
    assert!(!report.registry.created);
    assert_eq!(report.registry.preserved, ["X", "Y"]);
}

#[test]
fn renamed_field_keeps_old_constant() {
    let (mut model, class) = load(
        r#"{
            "package": "com.example",
            "classes": [{
                "name": "Counter",
                "fields": [{ "name": "total", "type": "long" }],
                "nested": [{
                    "name": "BundleKey",
                    "interface": true,
                    "modifiers": ["public"],
                    "fields": [{ "name": "COUNT", "type": "String", "init": "\"count\"" }]
                }]
            }]
        }"#,
        "Counter",
    );

    let report = run(&mut model, class);
    let text = render(&model, class);

    assert_eq!(report.registry.added, ["TOTAL"]);
    assert!(text.contains("String COUNT = \"count\";"));
    assert!(text.contains("String TOTAL = \"total\";"));
    assert!(text.contains("this.total = bundle.getLong(BundleKey.TOTAL);"));
}

#[test]
fn overridden_key_value_is_preserved() {
    let (mut model, class) = load(
        r#"{
            "package": "com.example",
            "classes": [{
                "name": "Counter",
                "fields": [{ "name": "count", "type": "int" }],
                "nested": [{
                    "name": "BundleKey",
                    "interface": true,
                    "fields": [{ "name": "COUNT", "type": "String", "init": "\"legacy_count\"" }]
                }]
            }]
        }"#,
        "Counter",
    );

    let report = run(&mut model, class);
    let text = render(&model, class);

    assert_eq!(report.registry.preserved, ["COUNT"]);
    assert!(report.registry.added.is_empty());
    assert!(text.contains("String COUNT = \"legacy_count\";"));
    assert!(!text.contains("\"count\""));
}

#[test]
fn digit_and_acronym_fields_reuse_existing_constants() {
    let (mut model, class) = load(
        r#"{
            "package": "com.example",
            "classes": [{
                "name": "Address",
                "fields": [
                    { "name": "line2", "type": "String" },
                    { "name": "zipURL", "type": "String" }
                ],
                "nested": [{
                    "name": "BundleKey",
                    "interface": true,
                    "fields": [
                        { "name": "LINE2", "type": "String", "init": "\"legacy_line\"" },
                        { "name": "ZIP_U_R_L", "type": "String", "init": "\"legacy_zip\"" }
                    ]
                }]
            }]
        }"#,
        "Address",
    );

    let report = run(&mut model, class);
    let text = render(&model, class);

    assert!(report.registry.added.is_empty());
    assert_eq!(report.registry.preserved, ["LINE2", "ZIP_U_R_L"]);
    assert!(text.contains("this.line2 = bundle.get(BundleKey.LINE2, String.class);"));
    assert!(text.contains("bundle.put(BundleKey.ZIP_U_R_L, this.zipURL);"));
    assert!(text.contains("String LINE2 = \"legacy_line\";"));
    assert!(text.contains("String ZIP_U_R_L = \"legacy_zip\";"));
    assert!(!text.contains("LINE_2"));
    assert!(!text.contains("ZIP_URL"));
}

#[test]
fn unvalued_constant_is_filled() {
    let (mut model, class) = load(
        r#"{
            "package": "com.example",
            "classes": [{
                "name": "Counter",
                "fields": [{ "name": "count", "type": "int" }],
                "nested": [{
                    "name": "BundleKey",
                    "interface": true,
                    "fields": [{ "name": "COUNT", "type": "String" }]
                }]
            }]
        }"#,
        "Counter",
    );

    let report = run(&mut model, class);

    assert_eq!(report.registry.filled, ["COUNT"]);
    assert!(render(&model, class).contains("String COUNT = \"count\";"));
}

#[test]
fn reference_fields_use_generic_accessors() {
    let (mut model, class) = load(
        r#"{
            "package": "com.example",
            "imports": ["java.util.List"],
            "classes": [{
                "name": "Profile",
                "fields": [
                    { "name": "name", "type": "String" },
                    { "name": "tags", "type": "List<String>" },
                    { "name": "active", "type": "boolean" }
                ]
            }]
        }"#,
        "Profile",
    );

    run(&mut model, class);
    let text = render(&model, class);

    assert!(text.contains("this.name = bundle.get(BundleKey.NAME, String.class);"));
    assert!(text.contains("this.tags = bundle.get(BundleKey.TAGS, List.class);"));
    assert!(text.contains("this.active = bundle.getBoolean(BundleKey.ACTIVE);"));
    assert!(text.contains("bundle.put(BundleKey.NAME, this.name);"));
    assert!(text.contains("bundle.put(BundleKey.TAGS, this.tags);"));
    assert!(text.contains("bundle.putBoolean(BundleKey.ACTIVE, this.active);"));
}

const BASE_AND_CHILD: &str = r#"{
    "package": "com.example",
    "imports": ["android.os.Parcel", "android.os.Parcelable"],
    "classes": [
        {
            "name": "Base",
            "implements": [__IMPLEMENTS__],
            "constructors": [
                { "modifiers": ["protected"], "params": [{ "name": "in", "type": "Parcel" }], "body": [] }
            ],
            "methods": [
                {
                    "name": "writeToParcel",
                    "modifiers": ["public"],
                    "params": [
                        { "name": "dest", "type": "Parcel" },
                        { "name": "flags", "type": "int" }
                    ],
                    "body": []
                }
            ]
        },
        {
            "name": "Child",
            "superclass": "Base",
            "fields": [{ "name": "label", "type": "String" }]
        }
    ]
}"#;

#[test]
fn serializable_superclass_is_chained() {
    let json = BASE_AND_CHILD.replace("__IMPLEMENTS__", "\"Parcelable\"");
    let (mut model, child) = load(&json, "Child");

    let report = run(&mut model, child);
    let text = render(&model, child);

    assert!(report.ancestry.chain_constructor());
    assert!(report.ancestry.chain_write());
    assert!(text.contains("        super(in);\n"));
    assert!(text.contains("        super.writeToParcel(dest, flags);\n"));

    // inherited capability is not declared again
    assert!(!report.capability_added);
    assert!(text.contains("class Child extends Base {"));
}

#[test]
fn plain_superclass_is_never_chained() {
    let json = BASE_AND_CHILD.replace("__IMPLEMENTS__", "");
    let (mut model, child) = load(&json, "Child");

    let report = run(&mut model, child);
    let text = render(&model, child);

    assert!(!report.ancestry.has_serializable_ancestor);
    assert!(!text.contains("super("));
    assert!(!text.contains("super.writeToParcel"));
    assert!(report.capability_added);
    assert!(text.contains("class Child extends Base implements Parcelable {"));
}

#[test]
fn unresolved_superclass_degrades_to_no_chaining() {
    let (mut model, class) = load(
        r#"{
            "package": "com.example",
            "classes": [{
                "name": "Orphan",
                "superclass": "org.elsewhere.Missing",
                "fields": [{ "name": "id", "type": "int" }]
            }]
        }"#,
        "Orphan",
    );

    let report = run(&mut model, class);
    let text = render(&model, class);

    assert!(!report.ancestry.has_serializable_ancestor);
    assert!(!text.contains("super"));
    assert!(text.contains("implements Parcelable"));
}

#[test]
fn empty_field_list_skips_container_in_write_method() {
    let (mut model, class) = load(
        r#"{ "package": "com.example", "classes": [{ "name": "Marker" }] }"#,
        "Marker",
    );

    run(&mut model, class);
    let text = render(&model, class);

    assert!(text.contains(
        "    @Override\n    public void writeToParcel(Parcel dest, int flags) {}\n"
    ));
    assert!(text.contains("    public interface BundleKey {\n    }\n"));
}

#[test]
fn purge_leaves_overloads_and_replaces_stale_members() {
    let (mut model, class) = load(
        r#"{
            "package": "com.example",
            "imports": ["android.os.Parcel"],
            "classes": [{
                "name": "Shape",
                "fields": [{ "name": "sides", "type": "int" }],
                "constructors": [
                    { "modifiers": ["public"], "params": [{ "name": "sides", "type": "int" }], "body": ["this.sides = sides"] },
                    { "params": [{ "name": "in", "type": "Parcel" }], "body": ["this.sides = 3"] }
                ],
                "methods": [
                    { "name": "describeContents", "returns": "int", "modifiers": ["public"], "body": ["return 7"] },
                    { "name": "describeContents", "returns": "int", "params": [{ "name": "mask", "type": "int" }], "body": ["return mask"] },
                    { "name": "writeToParcel", "params": [{ "name": "dest", "type": "Parcel" }], "body": [] }
                ]
            }]
        }"#,
        "Shape",
    );

    let report = run(&mut model, class);
    let text = render(&model, class);

    assert_eq!(report.purged.len(), 2);
    assert!(text.contains("public Shape(int sides) {"));
    assert!(text.contains("int describeContents(int mask) {"));
    assert!(text.contains("void writeToParcel(Parcel dest) {}"));
    assert!(!text.contains("return 7;"));
    assert!(!text.contains("this.sides = 3;"));

    // a declared constructor survives the purge, so no default one is added
    assert!(!text.contains("public Shape() {}"));
}

#[test]
fn registry_conflict_leaves_class_untouched() {
    let (mut model, class) = load(
        r#"{
            "package": "com.example",
            "classes": [{
                "name": "Clash",
                "fields": [{ "name": "a", "type": "int" }],
                "nested": [{ "name": "BundleKey", "modifiers": ["static"] }]
            }]
        }"#,
        "Clash",
    );
    let before = render(&model, class);
    let fields = instance_fields(&model, class);

    let err = parcelgen_core::generate(&mut model, class, &fields).unwrap_err();

    assert!(matches!(err, SynthError::RegistryConflict { ref name } if name == "BundleKey"));
    assert_eq!(render(&model, class), before);
}

#[test]
fn key_collision_leaves_class_untouched() {
    let (mut model, class) = load(
        r#"{
            "package": "com.example",
            "classes": [{
                "name": "User",
                "fields": [
                    { "name": "userId", "type": "long" },
                    { "name": "user_id", "type": "long" }
                ]
            }]
        }"#,
        "User",
    );
    let before = render(&model, class);
    let fields = instance_fields(&model, class);

    let err = parcelgen_core::generate(&mut model, class, &fields).unwrap_err();

    assert!(matches!(
        err,
        SynthError::Keys(KeyRegistryError::Collision { ref constant, .. }) if constant == "USER_ID"
    ));
    assert_eq!(render(&model, class), before);
}

#[test]
fn malformed_field_is_rejected_before_insertion() {
    let (mut model, class) = load(POINT, "Point");
    let before = render(&model, class);
    let fields = [FieldDescriptor::new(
        parcelgen_model::types::PrimitiveKind::Int.into(),
        "bad-name",
    )];

    let err = parcelgen_core::generate(&mut model, class, &fields).unwrap_err();

    assert!(matches!(err, SynthError::Malformed(_)));
    assert_eq!(render(&model, class), before);
}

#[test]
fn container_name_shadowing_a_parameter_is_rejected() {
    for name in ["dest", "in"] {
        let (mut model, class) = load(POINT, "Point");
        let before = render(&model, class);
        let config = SynthConfig::from_toml_str(&format!("[naming]\ncontainer_var = \"{name}\"\n"))
            .expect("config");
        let fields = instance_fields(&model, class);

        let err = CodeSynthesizer::with_config(config)
            .generate(&mut model, class, &fields)
            .unwrap_err();

        assert!(
            matches!(
                err,
                SynthError::Malformed(DeclError::DuplicateLocal { ref local, .. }) if local == name
            ),
            "unexpected error for '{name}': {err}"
        );
        assert_eq!(render(&model, class), before);
    }
}

#[test]
fn custom_naming_flows_through_generated_code() {
    let (mut model, class) = load(POINT, "Point");
    let config = SynthConfig::from_toml_str(
        r#"
        [naming]
        registry_type = "Keys"
        container_var = "box"
        key_case = "verbatim"
        factory_field = "FACTORY"
        "#,
    )
    .expect("config");
    let fields = instance_fields(&model, class);

    assert_eq!(config.naming.key_case, KeyCase::Verbatim);
    CodeSynthesizer::with_config(config)
        .generate(&mut model, class, &fields)
        .expect("generate");
    let text = render(&model, class);

    assert!(text.contains("this.x = box.getInt(Keys.x);"));
    assert!(text.contains("box.putInt(Keys.y, this.y);"));
    assert!(text.contains("public static final Parcelable.Creator<Point> FACTORY ="));
    assert!(text.contains("    public interface Keys {\n        String x = \"x\";\n"));
}
