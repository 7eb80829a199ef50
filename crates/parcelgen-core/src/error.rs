use crate::keys::KeyRegistryError;
use parcelgen_model::{decl::DeclError, error::HostError};
use thiserror::Error as ThisError;

///
/// SynthError
///
/// Everything that can abort a generation pass. Host failures pass through
/// untouched; malformed declarations are caught before insertion.
///

#[derive(Debug, ThisError)]
pub enum SynthError {
    #[error(transparent)]
    Host(#[from] HostError),

    #[error("generated declaration is malformed: {0}")]
    Malformed(#[from] DeclError),

    #[error(transparent)]
    Keys(#[from] KeyRegistryError),

    #[error("nested type '{name}' exists but is not an interface; cannot hold key constants")]
    RegistryConflict { name: String },
}
