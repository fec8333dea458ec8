//! Cap-table model error types.
//!
//! This module provides structured error handling for share-class
//! validation, snapshot construction, and round replay. Every variant
//! carries the offending class or round id so callers can point at the
//! exact input that failed.

use captable_core::types::{ClassId, MoneyError, RoundId};
use thiserror::Error;

/// Cap-table model errors.
///
/// All validation happens before any allocation arithmetic runs, so a
/// `ModelError` always means the input itself is malformed and fully
/// recoverable by correcting it.
///
/// # Examples
/// ```
/// use captable_core::types::ClassId;
/// use captable_model::error::ModelError;
///
/// let err = ModelError::InvalidClass {
///     id: ClassId::new("series-a"),
///     reason: "shares must be positive".to_string(),
/// };
/// assert!(format!("{}", err).contains("series-a"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A share class failed field-level validation.
    #[error("Invalid share class '{id}': {reason}")]
    InvalidClass {
        /// The offending class id
        id: ClassId,
        /// What was wrong with it
        reason: String,
    },

    /// Two share classes carry the same id.
    #[error("Duplicate share class id '{id}'")]
    DuplicateClass {
        /// The duplicated class id
        id: ClassId,
    },

    /// The snapshot contains no share classes.
    #[error("Cap table has no share classes")]
    EmptyCapTable,

    /// Preferred classes share a seniority rank without all of them
    /// being flagged pari passu.
    #[error("Seniority rank {rank} is shared by {ids:?} without pari passu flags")]
    SeniorityOverlap {
        /// The contested rank
        rank: u32,
        /// Ids of every class at that rank
        ids: Vec<ClassId>,
    },

    /// A financing round failed validation during replay.
    #[error("Invalid round '{id}': {reason}")]
    InvalidRound {
        /// The offending round id
        id: RoundId,
        /// What was wrong with it
        reason: String,
    },

    /// A round referenced another round that does not precede it.
    #[error("Round '{id}' references unknown round '{reference}'")]
    UnknownRound {
        /// The referencing round id
        id: RoundId,
        /// The missing reference
        reference: RoundId,
    },

    /// Money arithmetic left the safe integer range.
    #[error("Numeric overflow: {0}")]
    Numeric(#[from] MoneyError),
}

impl ModelError {
    /// Convenience constructor for [`ModelError::InvalidClass`].
    pub fn invalid_class(id: &ClassId, reason: impl Into<String>) -> Self {
        Self::InvalidClass {
            id: id.clone(),
            reason: reason.into(),
        }
    }

    /// Convenience constructor for [`ModelError::InvalidRound`].
    pub fn invalid_round(id: &RoundId, reason: impl Into<String>) -> Self {
        Self::InvalidRound {
            id: id.clone(),
            reason: reason.into(),
        }
    }
}
