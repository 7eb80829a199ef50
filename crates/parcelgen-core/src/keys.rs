//! Key registry: stable storage keys for serialized fields.
//!
//! A field is written under `<Registry>.<CONSTANT>`, and the constant's value
//! lives in the user's source. Once a constant carries a value it is never
//! reassigned, which lets a field be renamed while old payloads stay
//! readable.

use crate::{
    config::{KeyCase, SynthConfig},
    error::SynthError,
};
use convert_case::{Boundary, Case, Casing};
use parcelgen_model::{
    decl::{Expr, FieldDecl, Member, Modifiers, TypeDecl, TypeKind, is_identifier},
    host::{Anchor, ClassId, ClassModel, FieldInfo},
    types::TypeRef,
};
use std::{collections::BTreeMap, fmt};
use thiserror::Error as ThisError;

///
/// KeyRegistryError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum KeyRegistryError {
    #[error("fields '{first}' and '{second}' both map to key constant '{constant}'")]
    Collision {
        constant: String,
        first: String,
        second: String,
    },

    #[error("field '{field}' derives invalid key constant '{constant}'")]
    InvalidConstant { field: String, constant: String },
}

///
/// KeyRef
///
/// Symbolic reference to a key constant, e.g. `BundleKey.COUNT`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyRef {
    pub registry: String,
    pub constant: String,
}

impl KeyRef {
    #[must_use]
    pub fn to_expr(&self) -> Expr {
        Expr::name(self.to_string())
    }
}

impl fmt::Display for KeyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.registry, self.constant)
    }
}

///
/// Binding
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Binding {
    pub field: String,
    pub constant: String,
    pub value: String,
}

///
/// MergeReport
///
/// What a registry merge did to the nested type.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MergeReport {
    pub registry: ClassId,
    pub created: bool,
    pub added: Vec<String>,
    pub filled: Vec<String>,
    pub preserved: Vec<String>,
}

// A word starts at every ASCII capital after the first character, including
// each capital of a run. Digits never start a word, so `line2` stays `LINE2`
// and `zipURL` becomes `ZIP_U_R_L`, matching constants already persisted in
// user classes.
const BEFORE_CAPITAL: Boundary = Boundary::Custom {
    condition: next_is_capital,
    start: 1,
    len: 0,
};

fn next_is_capital(graphemes: &[&str]) -> bool {
    graphemes
        .get(1)
        .is_some_and(|g| g.chars().all(|c| c.is_ascii_uppercase()))
}

///
/// KeyRegistry
///

#[derive(Clone, Debug)]
pub struct KeyRegistry {
    type_name: String,
    case: KeyCase,
    bindings: Vec<Binding>,
    by_field: BTreeMap<String, usize>,
    by_constant: BTreeMap<String, usize>,
}

impl KeyRegistry {
    #[must_use]
    pub fn new(type_name: impl Into<String>, case: KeyCase) -> Self {
        Self {
            type_name: type_name.into(),
            case,
            bindings: Vec::new(),
            by_field: BTreeMap::new(),
            by_constant: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn from_config(config: &SynthConfig) -> Self {
        Self::new(config.naming.registry_type.clone(), config.naming.key_case)
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Constant name for a field identifier. Pure; depends only on the
    /// configured case transform.
    #[must_use]
    pub fn constant_name(&self, field: &str) -> String {
        match self.case {
            KeyCase::Constant => field
                .set_boundaries(&[BEFORE_CAPITAL])
                .to_case(Case::Constant),
            KeyCase::Verbatim => field.to_string(),
        }
    }

    /// Bind `field` if needed and return its key reference. Repeated calls
    /// for the same field return the same reference and change nothing.
    pub fn key_for(&mut self, field: &str) -> Result<KeyRef, KeyRegistryError> {
        if let Some(&index) = self.by_field.get(field) {
            return Ok(self.reference(&self.bindings[index].constant));
        }

        let constant = self.constant_name(field);
        if !is_identifier(&constant) {
            return Err(KeyRegistryError::InvalidConstant {
                field: field.to_string(),
                constant,
            });
        }
        if let Some(&index) = self.by_constant.get(&constant) {
            return Err(KeyRegistryError::Collision {
                constant,
                first: self.bindings[index].field.clone(),
                second: field.to_string(),
            });
        }

        let index = self.bindings.len();
        self.bindings.push(Binding {
            field: field.to_string(),
            constant: constant.clone(),
            value: field.to_string(),
        });
        self.by_field.insert(field.to_string(), index);
        self.by_constant.insert(constant.clone(), index);

        Ok(self.reference(&constant))
    }

    /// Everything bound so far, in first-bound order.
    #[must_use]
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// The registry interface already nested in `class`, if any. A nested
    /// type of the registry's name that is not an interface is a conflict.
    pub fn find_in<M>(&self, model: &M, class: ClassId) -> Result<Option<ClassId>, SynthError>
    where
        M: ClassModel + ?Sized,
    {
        let existing = model
            .nested_types(class)?
            .into_iter()
            .find(|nested| nested.name == self.type_name);

        match existing {
            Some(nested) if nested.kind == TypeKind::Interface => Ok(Some(nested.id)),
            Some(_) => Err(SynthError::RegistryConflict {
                name: self.type_name.clone(),
            }),
            None => Ok(None),
        }
    }

    /// Materialize the bindings as constants of the nested registry
    /// interface of `class`, creating it when absent.
    ///
    /// Additive only: a missing constant is appended, a declared but
    /// unvalued constant gets its value, and a valued constant is left alone.
    pub fn merge_into<M>(&self, model: &mut M, class: ClassId) -> Result<MergeReport, SynthError>
    where
        M: ClassModel + ?Sized,
    {
        let (registry, created) = match self.find_in(model, class)? {
            Some(id) => (id, false),
            None => {
                let decl = TypeDecl::interface(Modifiers::public(), self.type_name.clone());
                (model.add_nested_type(class, decl)?, true)
            }
        };

        let declared: BTreeMap<String, FieldInfo> = model
            .fields(registry)?
            .into_iter()
            .map(|field| (field.name.clone(), field))
            .collect();

        let mut report = MergeReport {
            registry,
            created,
            added: Vec::new(),
            filled: Vec::new(),
            preserved: Vec::new(),
        };

        for binding in &self.bindings {
            match declared.get(&binding.constant) {
                None => {
                    let constant = FieldDecl::new(
                        Modifiers::default(),
                        TypeRef::string(),
                        binding.constant.clone(),
                    )
                    .with_initializer(Expr::str(binding.value.clone()));

                    let id = model.insert_member(registry, Member::Field(constant), Anchor::End)?;
                    model.shorten_references(id)?;
                    report.added.push(binding.constant.clone());
                }
                Some(field) if !field.has_initializer => {
                    model.set_field_initializer(field.id, Expr::str(binding.value.clone()))?;
                    report.filled.push(binding.constant.clone());
                }
                Some(_) => report.preserved.push(binding.constant.clone()),
            }
        }

        Ok(report)
    }

    fn reference(&self, constant: &str) -> KeyRef {
        KeyRef {
            registry: self.type_name.clone(),
            constant: constant.to_string(),
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> KeyRegistry {
        KeyRegistry::new("BundleKey", KeyCase::Constant)
    }

    #[test]
    fn derives_upper_snake_constants() {
        let registry = registry();

        assert_eq!(registry.constant_name("x"), "X");
        assert_eq!(registry.constant_name("count"), "COUNT");
        assert_eq!(registry.constant_name("userId"), "USER_ID");
        assert_eq!(registry.constant_name("firstName"), "FIRST_NAME");
    }

    #[test]
    fn digits_and_capital_runs_split_like_persisted_keys() {
        let registry = registry();

        assert_eq!(registry.constant_name("value2"), "VALUE2");
        assert_eq!(registry.constant_name("x1y"), "X1Y");
        assert_eq!(registry.constant_name("line2Text"), "LINE2_TEXT");
        assert_eq!(registry.constant_name("userID"), "USER_I_D");
        assert_eq!(registry.constant_name("myURL"), "MY_U_R_L");
        assert_eq!(registry.constant_name("URL"), "U_R_L");
        assert_eq!(registry.constant_name("user_id"), "USER_ID");
    }

    #[test]
    fn verbatim_case_keeps_identifier() {
        let registry = KeyRegistry::new("Keys", KeyCase::Verbatim);

        assert_eq!(registry.constant_name("userId"), "userId");
    }

    #[test]
    fn key_for_binds_once() {
        let mut registry = registry();

        let first = registry.key_for("userId").expect("bind");
        let second = registry.key_for("userId").expect("rebind");

        assert_eq!(first, second);
        assert_eq!(first.to_string(), "BundleKey.USER_ID");
        assert_eq!(
            registry.bindings(),
            [Binding {
                field: "userId".to_string(),
                constant: "USER_ID".to_string(),
                value: "userId".to_string(),
            }]
        );
    }

    #[test]
    fn bindings_keep_first_bound_order() {
        let mut registry = registry();
        for field in ["zeta", "alpha", "mid"] {
            registry.key_for(field).expect("bind");
        }

        let constants: Vec<_> = registry
            .bindings()
            .iter()
            .map(|b| b.constant.as_str())
            .collect();
        assert_eq!(constants, ["ZETA", "ALPHA", "MID"]);
    }

    #[test]
    fn colliding_constants_are_reported() {
        let mut registry = registry();
        registry.key_for("userId").expect("bind");

        let err = registry.key_for("user_id").unwrap_err();
        assert_eq!(
            err,
            KeyRegistryError::Collision {
                constant: "USER_ID".to_string(),
                first: "userId".to_string(),
                second: "user_id".to_string(),
            }
        );
    }

    #[test]
    fn invalid_verbatim_constants_are_reported() {
        let mut registry = KeyRegistry::new("Keys", KeyCase::Verbatim);

        assert!(matches!(
            registry.key_for("class"),
            Err(KeyRegistryError::InvalidConstant { .. })
        ));
    }
}
