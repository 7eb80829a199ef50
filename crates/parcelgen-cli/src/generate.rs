use anyhow::{Context, Result, anyhow, bail};
use parcelgen_core::prelude::*;
use parcelgen_model::{
    host::{ClassId, ClassModel},
    memory::MemoryModel,
};
use std::{fs, path::Path};
use tracing::info;

/// Load a model, generate members on `class` and return the rendered source.
pub fn run(model: &Path, class: &str, fields: &[String], config: Option<&Path>) -> Result<String> {
    let text = fs::read_to_string(model)
        .with_context(|| format!("failed to read model '{}'", model.display()))?;
    let mut model = MemoryModel::from_json(&text)
        .with_context(|| format!("failed to load model '{}'", model.display()))?;

    let config = match config {
        Some(path) => SynthConfig::load(path)?,
        None => SynthConfig::default(),
    };

    generate_in(&mut model, class, fields, config)
}

pub(crate) fn generate_in(
    model: &mut MemoryModel,
    class: &str,
    fields: &[String],
    config: SynthConfig,
) -> Result<String> {
    let id = find_class(model, class)?;
    let selected = select_fields(model, id, fields)?;

    let report = CodeSynthesizer::with_config(config)
        .generate(model, id, &selected)
        .with_context(|| format!("generation failed for '{class}'"))?;
    info!(
        class,
        purged = report.purged.len(),
        inserted = report.inserted.len(),
        keys_added = report.registry.added.len(),
        capability_added = report.capability_added,
        "generation complete"
    );

    Ok(model.render_class(id)?)
}

fn find_class(model: &MemoryModel, name: &str) -> Result<ClassId> {
    model
        .find_class(name)
        .or_else(|| model.find_by_simple_name(name))
        .ok_or_else(|| anyhow!("class '{name}' not found or ambiguous"))
}

// Empty selection means every instance field in declaration order.
fn select_fields(
    model: &MemoryModel,
    class: ClassId,
    names: &[String],
) -> Result<Vec<FieldDescriptor>> {
    let declared = model.fields(class)?;

    if names.is_empty() {
        return Ok(FieldDescriptor::instance_fields(&declared));
    }

    let mut selected = Vec::with_capacity(names.len());
    for name in names {
        let Some(field) = declared.iter().find(|f| &f.name == name) else {
            bail!("class has no field named '{name}'");
        };
        if field.is_static {
            bail!("field '{name}' is static and cannot be serialized");
        }
        selected.push(FieldDescriptor::member(field));
    }

    Ok(selected)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    const SHAPE: &str = r#"{
        "package": "com.example.geo",
        "classes": [{
            "name": "Shape",
            "modifiers": ["public"],
            "fields": [
                { "name": "sides", "type": "int", "modifiers": ["private"] },
                { "name": "label", "type": "String", "modifiers": ["private"] },
                { "name": "scratch", "type": "int", "modifiers": ["private", "transient"] },
                { "name": "MAX", "type": "int", "modifiers": ["static", "final"], "init": "8" }
            ]
        }]
    }"#;

    fn model() -> MemoryModel {
        MemoryModel::from_json(SHAPE).expect("model")
    }

    fn names(fields: &[FieldDescriptor]) -> Vec<&str> {
        fields.iter().map(|f| f.identifier.as_str()).collect()
    }

    #[test]
    fn default_selection_is_instance_fields() {
        let model = model();
        let class = find_class(&model, "Shape").expect("class");

        let fields = select_fields(&model, class, &[]).expect("fields");
        assert_eq!(names(&fields), ["sides", "label"]);
    }

    #[test]
    fn explicit_selection_keeps_given_order() {
        let model = model();
        let class = find_class(&model, "com.example.geo.Shape").expect("class");
        let wanted = ["scratch".to_string(), "sides".to_string()];

        let fields = select_fields(&model, class, &wanted).expect("fields");
        assert_eq!(names(&fields), ["scratch", "sides"]);
    }

    #[test]
    fn unknown_or_static_fields_are_refused() {
        let model = model();
        let class = find_class(&model, "Shape").expect("class");

        assert!(select_fields(&model, class, &["nope".to_string()]).is_err());
        assert!(select_fields(&model, class, &["MAX".to_string()]).is_err());
    }

    #[test]
    fn missing_class_is_reported() {
        let model = model();
        let err = find_class(&model, "Circle").unwrap_err();

        assert!(err.to_string().contains("Circle"));
    }

    #[test]
    fn generated_source_contains_registry() {
        let mut model = model();
        let source =
            generate_in(&mut model, "Shape", &[], SynthConfig::default()).expect("generate");

        assert!(source.contains("public class Shape implements Parcelable {"));
        assert!(source.contains("String SIDES = \"sides\";"));
        assert!(source.contains("String LABEL = \"label\";"));
        assert!(!source.contains("SCRATCH"));
    }
}
