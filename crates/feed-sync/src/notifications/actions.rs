//! Notification action resolution
//!
//! Maps a `(kind, payload)` pair to the screen a tap should open. Pure and
//! total over the declared kind set: a well-formed payload always yields a
//! target, and a payload missing a field its kind requires always yields
//! `MalformedNotification`, never a panic. Callers degrade through
//! [`fallback_action`] or discard silently.

use feed_core::entities::{Notification, NotificationKind};
use feed_core::{EntityId, SyncError, SyncResult};

/// Screen a notification tap navigates to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationTarget {
    OpenReel {
        id: EntityId,
        comment_id: Option<EntityId>,
    },
    OpenConversation {
        id: EntityId,
    },
    OpenReview {
        id: EntityId,
        user_id: EntityId,
    },
    OpenProfile {
        user_id: EntityId,
    },
}

/// Resolve the navigation target for a notification
pub fn resolve_action(notification: &Notification) -> SyncResult<NavigationTarget> {
    let payload = &notification.payload;
    let kind = notification.kind;
    let require = |field: Option<&EntityId>, name: &'static str| {
        field
            .cloned()
            .ok_or(SyncError::MalformedNotification { kind, missing: name })
    };

    match kind {
        NotificationKind::ReelLike => Ok(NavigationTarget::OpenReel {
            id: require(payload.target_id.as_ref(), "target_id")?,
            comment_id: None,
        }),
        NotificationKind::ReelComment
        | NotificationKind::CommentLike
        | NotificationKind::CommentReply => Ok(NavigationTarget::OpenReel {
            id: require(payload.target_id.as_ref(), "target_id")?,
            comment_id: Some(require(payload.comment_id.as_ref(), "comment_id")?),
        }),
        NotificationKind::NewReview
        | NotificationKind::ReviewReply
        | NotificationKind::ReviewEdit
        | NotificationKind::HelpfulVote => Ok(NavigationTarget::OpenReview {
            id: require(payload.target_id.as_ref(), "target_id")?,
            user_id: require(payload.review_user_id.as_ref(), "review_user_id")?,
        }),
        NotificationKind::NewMessage | NotificationKind::MessageRequest => {
            Ok(NavigationTarget::OpenConversation {
                id: require(payload.conversation_id.as_ref(), "conversation_id")?,
            })
        }
    }
}

/// Degraded navigation for a malformed payload: the actor's profile,
/// when the snapshot at least names an actor
#[must_use]
pub fn fallback_action(notification: &Notification) -> Option<NavigationTarget> {
    notification
        .payload
        .actor_id
        .clone()
        .map(|user_id| NavigationTarget::OpenProfile { user_id })
}
