//! Notification entity
//!
//! Each notification belongs to exactly one kind from a closed taxonomy, and
//! each kind maps to exactly one channel (bell or message), never both. The
//! payload is a denormalized snapshot taken at ingestion time: it is enough
//! to render the row without a secondary fetch, and it may go stale relative
//! to the current target state. Staleness is accepted, not a defect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::traits::Syncable;
use crate::value_objects::{EntityId, EntityKind};

/// Closed taxonomy of notification kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NewReview,
    ReviewReply,
    ReviewEdit,
    HelpfulVote,
    ReelLike,
    ReelComment,
    CommentLike,
    CommentReply,
    NewMessage,
    MessageRequest,
}

/// Notification sub-stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Social/review engagement events
    Bell,
    /// Direct conversation events
    Message,
}

impl NotificationKind {
    /// Static kind-to-channel table. Total; every kind has exactly one channel.
    #[must_use]
    pub fn channel(&self) -> Channel {
        match self {
            Self::NewReview
            | Self::ReviewReply
            | Self::ReviewEdit
            | Self::HelpfulVote
            | Self::ReelLike
            | Self::ReelComment
            | Self::CommentLike
            | Self::CommentReply => Channel::Bell,
            Self::NewMessage | Self::MessageRequest => Channel::Message,
        }
    }

    /// Stable string form used in log fields
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewReview => "new_review",
            Self::ReviewReply => "review_reply",
            Self::ReviewEdit => "review_edit",
            Self::HelpfulVote => "helpful_vote",
            Self::ReelLike => "reel_like",
            Self::ReelComment => "reel_comment",
            Self::CommentLike => "comment_like",
            Self::CommentReply => "comment_reply",
            Self::NewMessage => "new_message",
            Self::MessageRequest => "message_request",
        }
    }

    /// All kinds, for table-driven tests
    pub const ALL: [Self; 10] = [
        Self::NewReview,
        Self::ReviewReply,
        Self::ReviewEdit,
        Self::HelpfulVote,
        Self::ReelLike,
        Self::ReelComment,
        Self::CommentLike,
        Self::CommentReply,
        Self::NewMessage,
        Self::MessageRequest,
    ];
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Denormalized payload snapshot
///
/// Which optional fields are required depends on the kind; the action
/// resolver enforces that per kind. Plain ids only, never a live object
/// graph, so a notification can never form a reference cycle with its
/// target content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct NotificationPayload {
    pub actor_id: Option<EntityId>,
    pub actor_name: Option<String>,
    pub actor_avatar_url: Option<String>,
    pub target_id: Option<EntityId>,
    pub target_kind: Option<EntityKind>,
    pub target_title: Option<String>,
    pub target_image_url: Option<String>,
    pub comment_id: Option<EntityId>,
    pub conversation_id: Option<EntityId>,
    pub review_user_id: Option<EntityId>,
}

/// Notification entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: EntityId,
    pub recipient_id: EntityId,
    pub kind: NotificationKind,
    pub payload: NotificationPayload,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

impl Notification {
    /// Create an unread notification
    pub fn new(
        id: EntityId,
        recipient_id: EntityId,
        kind: NotificationKind,
        payload: NotificationPayload,
    ) -> Self {
        Self {
            id,
            recipient_id,
            kind,
            payload,
            created_at: Utc::now(),
            read: false,
        }
    }

    /// Channel this notification is counted under
    #[inline]
    pub fn channel(&self) -> Channel {
        self.kind.channel()
    }
}

/// Fields of a notification that accept optimistic patches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationField {
    Read,
}

/// Optimistic patch for a notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationPatch {
    Read(bool),
}

impl Syncable for Notification {
    type Field = NotificationField;
    type Patch = NotificationPatch;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn apply_patch(&mut self, field: Self::Field, patch: &Self::Patch) {
        match (field, patch) {
            (NotificationField::Read, NotificationPatch::Read(read)) => self.read = *read,
        }
    }
}
