//! Entity identifiers
//!
//! The remote authority is a document-collection store, so ids are opaque
//! strings rather than numeric sequences. `EntityId` wraps one and is used
//! for every record kind: users, reels, statuses, notifications,
//! conversations, reviews, and comments.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque document id
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Create an id from an existing document key
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random id (uuid v4, compact form)
    #[must_use]
    pub fn new_random() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Borrow the raw string key
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check for the empty (uninitialized) id
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse from string, rejecting empty and whitespace-only input
    pub fn parse(s: &str) -> Result<Self, EntityIdParseError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(EntityIdParseError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }
}

/// Error when parsing an `EntityId` from string
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EntityIdParseError {
    #[error("entity id must not be empty")]
    Empty,
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::str::FromStr for EntityId {
    type Err = EntityIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityId::parse(s)
    }
}

/// Kind discriminator for deep-link targets and availability probes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Reel,
    Status,
    Notification,
    Review,
    Conversation,
    Profile,
}

impl EntityKind {
    /// Stable string form used in log fields and error messages
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reel => "reel",
            Self::Status => "status",
            Self::Notification => "notification",
            Self::Review => "review",
            Self::Conversation => "conversation",
            Self::Profile => "profile",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
