use crate::{
    decl::DeclError,
    host::{ClassId, MemberId},
    types::TypeParseError,
};
use thiserror::Error as ThisError;

///
/// HostError
///
/// Failures raised by a structural model. The generator never rewrites
/// these; they reach the caller as-is.
///

#[derive(Debug, ThisError)]
pub enum HostError {
    #[error("unknown class: {0}")]
    UnknownClass(ClassId),

    #[error("unknown member: {0}")]
    UnknownMember(MemberId),

    #[error("unknown class name: '{0}'")]
    UnknownClassName(String),

    #[error("{member} is not a field")]
    NotAField { member: MemberId },

    #[error("host rejected {operation}: {reason}")]
    Rejected {
        operation: &'static str,
        reason: String,
    },

    #[error(transparent)]
    TypeParse(#[from] TypeParseError),

    #[error("invalid declaration in model: {0}")]
    Decl(#[from] DeclError),

    #[error("invalid model description: {0}")]
    Spec(#[from] serde_json::Error),
}

impl HostError {
    pub(crate) fn rejected(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Rejected {
            operation,
            reason: reason.into(),
        }
    }
}
