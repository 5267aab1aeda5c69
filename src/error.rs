//! Error types for schedule generation

use thiserror::Error;

/// Errors raised while validating a loan or generating its schedule
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AmortError {
    /// A loan parameter failed its precondition
    #[error("invalid parameter `{field}`: {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    /// A repayment structure outside amortizing, bullet and interest-only
    #[error("unsupported loan structure: {0}")]
    UnsupportedStructure(String),
}

impl AmortError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        AmortError::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }

    /// Name of the offending field, if the error is tied to one
    pub fn field(&self) -> Option<&'static str> {
        match self {
            AmortError::InvalidParameter { field, .. } => Some(*field),
            AmortError::UnsupportedStructure(_) => Some("structure"),
        }
    }
}

pub type Result<T> = std::result::Result<T, AmortError>;
