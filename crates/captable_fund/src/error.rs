//! Fund distribution error types.

use captable_core::types::{ClassId, MoneyError};
use thiserror::Error;

/// Fund-level distribution errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FundError {
    /// The fund terms failed validation.
    #[error("Invalid fund terms: {reason}")]
    InvalidTerms {
        /// What was wrong.
        reason: String,
    },

    /// A holding referenced a class absent from its company's
    /// allocation.
    #[error("Company '{company}' has no share class '{id}'")]
    UnknownClass {
        /// The company whose allocation was searched.
        company: String,
        /// The missing class id.
        id: ClassId,
    },

    /// Money arithmetic left the safe integer range.
    #[error("Numeric overflow: {0}")]
    Numeric(#[from] MoneyError),
}

impl FundError {
    /// Shorthand for an [`FundError::InvalidTerms`].
    pub fn invalid_terms(reason: impl Into<String>) -> Self {
        Self::InvalidTerms {
            reason: reason.into(),
        }
    }
}
