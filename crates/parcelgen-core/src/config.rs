//! Generator configuration.
//!
//! The registry type name and the key case transform decide the constant
//! names persisted in user classes, so changing either breaks previously
//! written payloads.

use parcelgen_model::types::TypeRef;
use serde::Deserialize;
use std::{fs, path::Path};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

///
/// SynthConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SynthConfig {
    pub naming: NamingConfig,
    pub types: TypeConfig,
}

impl SynthConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&text)
    }

    #[must_use]
    pub fn payload_type(&self) -> TypeRef {
        TypeRef::class(self.types.payload.clone())
    }

    #[must_use]
    pub fn capability_type(&self) -> TypeRef {
        TypeRef::class(self.types.capability.clone())
    }

    #[must_use]
    pub fn container_type(&self) -> TypeRef {
        TypeRef::class(self.types.container.clone())
    }

    /// `Factory<Class>` for the static factory field.
    #[must_use]
    pub fn factory_type(&self, class: TypeRef) -> TypeRef {
        TypeRef::generic(self.types.factory.clone(), vec![class])
    }
}

///
/// NamingConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct NamingConfig {
    pub registry_type: String,
    pub factory_field: String,
    pub container_var: String,
    pub key_case: KeyCase,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            registry_type: "BundleKey".to_string(),
            factory_field: "CREATOR".to_string(),
            container_var: "bundle".to_string(),
            key_case: KeyCase::default(),
        }
    }
}

///
/// KeyCase
///
/// How a field identifier becomes a key constant name.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum KeyCase {
    /// lowerCamel → UPPER_SNAKE
    #[default]
    Constant,
    /// identifier used as-is
    Verbatim,
}

///
/// TypeConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TypeConfig {
    pub payload: String,
    pub capability: String,
    pub factory: String,
    pub container: String,
}

impl Default for TypeConfig {
    fn default() -> Self {
        Self {
            payload: "android.os.Parcel".to_string(),
            capability: "android.os.Parcelable".to_string(),
            factory: "android.os.Parcelable.Creator".to_string(),
            container: "com.booking.common.util.MarshalingBundle".to_string(),
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = SynthConfig::from_toml_str("").expect("empty config");

        assert_eq!(config, SynthConfig::default());
        assert_eq!(config.naming.registry_type, "BundleKey");
        assert_eq!(config.types.payload, "android.os.Parcel");
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = SynthConfig::from_toml_str(
            r#"
            [naming]
            registry_type = "Keys"
            key_case = "verbatim"

            [types]
            container = "com.example.Bag"
            "#,
        )
        .expect("valid config");

        assert_eq!(config.naming.registry_type, "Keys");
        assert_eq!(config.naming.key_case, KeyCase::Verbatim);
        assert_eq!(config.naming.factory_field, "CREATOR");
        assert_eq!(config.types.container, "com.example.Bag");
        assert_eq!(config.types.capability, "android.os.Parcelable");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = SynthConfig::from_toml_str("[naming]\nregistry = \"Keys\"\n").unwrap_err();

        assert!(matches!(err, ConfigError::Toml(_)));
    }
}
