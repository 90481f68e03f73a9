//! Domain entities

mod engagement;
mod notification;
mod reel;
mod status;

pub use engagement::{EngagementProfile, ProfileField};
pub use notification::{
    Channel, Notification, NotificationField, NotificationKind, NotificationPatch,
    NotificationPayload,
};
pub use reel::{Lifecycle, Reel, ReelField};
pub use status::{MediaKind, Status, StatusField, STATUS_TTL_HOURS};

use crate::value_objects::EntityId;
use serde::{Deserialize, Serialize};

/// Patch for a set-membership field
///
/// Like/save/follow/view are membership operations, never counters, so that
/// concurrent optimistic writes cannot double-count. Applying the same patch
/// twice is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipPatch {
    pub member: EntityId,
    pub present: bool,
}

impl MembershipPatch {
    /// Patch that inserts `member` into the set
    pub fn insert(member: EntityId) -> Self {
        Self {
            member,
            present: true,
        }
    }

    /// Patch that removes `member` from the set
    pub fn remove(member: EntityId) -> Self {
        Self {
            member,
            present: false,
        }
    }
}
