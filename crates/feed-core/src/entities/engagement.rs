//! Engagement profile - per-user following and saved-items state
//!
//! Mutated only through the engagement coordinator so every change goes
//! through the optimistic pending/rollback machinery.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::MembershipPatch;
use crate::traits::Syncable;
use crate::value_objects::EntityId;

/// Per-user engagement state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementProfile {
    pub user_id: EntityId,
    pub following: HashSet<EntityId>,
    pub saved_reels: HashSet<EntityId>,
}

impl EngagementProfile {
    /// Create an empty profile for a user
    pub fn new(user_id: EntityId) -> Self {
        Self {
            user_id,
            following: HashSet::new(),
            saved_reels: HashSet::new(),
        }
    }

    #[inline]
    pub fn is_following(&self, target: &EntityId) -> bool {
        self.following.contains(target)
    }

    #[inline]
    pub fn has_saved(&self, reel_id: &EntityId) -> bool {
        self.saved_reels.contains(reel_id)
    }
}

/// Fields of a profile that accept optimistic patches
///
/// One profile record carries membership toggles for many targets, so each
/// variant names its target: toggles against distinct targets hold
/// independent pending slots and never supersede each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProfileField {
    Following(EntityId),
    SavedReels(EntityId),
}

impl Syncable for EngagementProfile {
    type Field = ProfileField;
    type Patch = MembershipPatch;

    fn id(&self) -> &EntityId {
        &self.user_id
    }

    fn apply_patch(&mut self, field: Self::Field, patch: &Self::Patch) {
        let set = match field {
            ProfileField::Following(_) => &mut self.following,
            ProfileField::SavedReels(_) => &mut self.saved_reels,
        };
        if patch.present {
            set.insert(patch.member.clone());
        } else {
            set.remove(&patch.member);
        }
    }
}
