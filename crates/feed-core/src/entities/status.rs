//! Status entity - an ephemeral story
//!
//! A status expires 24 hours after creation. Expiry is logical and
//! time-based; physical purge of the record is a separate best-effort
//! operation and readers must never depend on it having run.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::MembershipPatch;
use crate::traits::Syncable;
use crate::value_objects::EntityId;

/// Default time-to-live for a status
pub const STATUS_TTL_HOURS: i64 = 24;

/// Media kind carried by a status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

/// Status entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub id: EntityId,
    pub owner_id: EntityId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub media_kind: MediaKind,
    pub media_url: String,
    pub caption: Option<String>,
    /// Users who have viewed this status (append-only)
    pub viewed_by: HashSet<EntityId>,
}

impl Status {
    /// Create a new status with the default 24h TTL
    pub fn new(
        id: EntityId,
        owner_id: EntityId,
        media_kind: MediaKind,
        media_url: impl Into<String>,
    ) -> Self {
        let created_at = Utc::now();
        Self {
            id,
            owner_id,
            created_at,
            expires_at: created_at + Duration::hours(STATUS_TTL_HOURS),
            media_kind,
            media_url: media_url.into(),
            caption: None,
            viewed_by: HashSet::new(),
        }
    }

    /// Check logical expiry at the given instant
    #[inline]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    /// Check whether a viewer has seen this status
    #[inline]
    pub fn is_viewed_by(&self, viewer_id: &EntityId) -> bool {
        self.viewed_by.contains(viewer_id)
    }

    /// Record a view. Idempotent; returns true if the view was new.
    pub fn record_view(&mut self, viewer_id: EntityId) -> bool {
        self.viewed_by.insert(viewer_id)
    }
}

/// Fields of a status that accept optimistic patches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusField {
    ViewedBy,
}

impl Syncable for Status {
    type Field = StatusField;
    type Patch = MembershipPatch;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn apply_patch(&mut self, field: Self::Field, patch: &Self::Patch) {
        match field {
            StatusField::ViewedBy => {
                // viewed_by is append-only; a remove patch is ignored
                if patch.present {
                    self.viewed_by.insert(patch.member.clone());
                }
            }
        }
    }
}
