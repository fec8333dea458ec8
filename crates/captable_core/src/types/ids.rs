//! Identifier types for cap-table entities.
//!
//! This module provides strongly-typed identifiers for share classes,
//! financing rounds, and exit scenarios. Using newtypes ensures type
//! safety and prevents accidental misuse of identifiers.

use std::fmt;

/// Unique identifier for a share class.
///
/// # Examples
///
/// ```
/// use captable_core::types::ClassId;
///
/// let id = ClassId::new("series-a");
/// assert_eq!(id.as_str(), "series-a");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ClassId(String);

impl ClassId {
    /// Creates a new share-class ID.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ClassId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ClassId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Unique identifier for a financing round.
///
/// # Examples
///
/// ```
/// use captable_core::types::RoundId;
///
/// let id = RoundId::new("seed");
/// assert_eq!(id.as_str(), "seed");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct RoundId(String);

impl RoundId {
    /// Creates a new round ID.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RoundId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RoundId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Unique identifier for an exit scenario.
///
/// # Examples
///
/// ```
/// use captable_core::types::ScenarioId;
///
/// let id = ScenarioId::new("ipo-2028");
/// assert_eq!(id.as_str(), "ipo-2028");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ScenarioId(String);

impl ScenarioId {
    /// Creates a new scenario ID.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ScenarioId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ScenarioId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
