//! Reel entity - a short-video feed item

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::MembershipPatch;
use crate::traits::Syncable;
use crate::value_objects::EntityId;

/// Lifecycle status of user-authored content
///
/// `Active` is the only non-terminal state; once content completes, is
/// cancelled, or is deleted it never returns to `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    #[default]
    Active,
    Completed,
    Cancelled,
    Deleted,
}

impl Lifecycle {
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }
}

/// Reel entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reel {
    pub id: EntityId,
    pub owner_id: EntityId,
    pub caption: String,
    pub created_at: DateTime<Utc>,
    /// Users who have liked this reel (membership set, not a counter)
    pub liked_by: HashSet<EntityId>,
    pub comment_count: u64,
    pub share_count: u64,
    pub view_count: u64,
    pub lifecycle: Lifecycle,
}

impl Reel {
    /// Create a new active reel
    pub fn new(id: EntityId, owner_id: EntityId, caption: impl Into<String>) -> Self {
        Self {
            id,
            owner_id,
            caption: caption.into(),
            created_at: Utc::now(),
            liked_by: HashSet::new(),
            comment_count: 0,
            share_count: 0,
            view_count: 0,
            lifecycle: Lifecycle::Active,
        }
    }

    /// Check whether a user has liked this reel
    #[inline]
    pub fn is_liked_by(&self, user_id: &EntityId) -> bool {
        self.liked_by.contains(user_id)
    }

    /// Number of likes, derived from the membership set
    #[inline]
    pub fn like_count(&self) -> usize {
        self.liked_by.len()
    }

    /// Check whether the reel has left the active state
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.lifecycle.is_terminal()
    }
}

/// Fields of a reel that accept optimistic patches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReelField {
    LikedBy,
}

impl Syncable for Reel {
    type Field = ReelField;
    type Patch = MembershipPatch;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn apply_patch(&mut self, field: Self::Field, patch: &Self::Patch) {
        match field {
            ReelField::LikedBy => {
                if patch.present {
                    self.liked_by.insert(patch.member.clone());
                } else {
                    self.liked_by.remove(&patch.member);
                }
            }
        }
    }
}
