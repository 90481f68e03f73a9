//! Remote gateway traits
//!
//! The remote authority is a document-collection service offering CRUD,
//! ordered range queries, and live subscriptions. It is out of scope for
//! this core, so it appears only as these traits; tests inject an in-memory
//! implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::entities::{EngagementProfile, Notification, Reel, Status};
use crate::value_objects::{EntityId, EntityKind};

/// Transport-level failure from the remote
///
/// These never cross into the presentation layer; callers classify them into
/// `SyncError` variants. `Missing` and `Rejected` are deliberately *not*
/// covered by a blanket conversion - only call sites that know the target
/// `(kind, id)` may decide between tombstone and rollback semantics.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RemoteError {
    #[error("remote unavailable: {0}")]
    Unavailable(String),

    #[error("remote request timed out")]
    Timeout,

    #[error("record does not exist")]
    Missing,

    #[error("remote rejected the mutation: {0}")]
    Rejected(String),

    #[error("failed to decode remote payload: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Whether this failure is a transport fault worth retrying
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout)
    }
}

/// Result type for remote operations
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Keyset anchor for ordered range queries
///
/// Feeds order by `created_at` descending with id as tiebreak; the anchor
/// names the last item a previous page returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageAnchor {
    pub created_at: DateTime<Utc>,
    pub id: EntityId,
}

/// Filter for the reel feed
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReelFilter {
    /// Restrict the feed to one owner's reels
    pub owner: Option<EntityId>,
}

impl ReelFilter {
    /// All active reels
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Reels authored by one user
    pub fn by_owner(owner: EntityId) -> Self {
        Self { owner: Some(owner) }
    }

    /// Stable key identifying this feed for cursor and in-flight bookkeeping
    #[must_use]
    pub fn feed_key(&self) -> String {
        match &self.owner {
            Some(owner) => format!("reels:owner:{owner}"),
            None => "reels:all".to_string(),
        }
    }
}

/// Live subscription topic
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    /// One reel's document
    Reel(EntityId),
    /// Active statuses visible to the current user
    StatusFeed,
    /// Notification stream for a recipient
    Notifications(EntityId),
    /// One user's engagement profile
    Profile(EntityId),
}

impl Topic {
    /// Stable key for reference counting; one underlying listener per key
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            Self::Reel(id) => format!("reel:{id}"),
            Self::StatusFeed => "statuses".to_string(),
            Self::Notifications(recipient) => format!("notifications:{recipient}"),
            Self::Profile(user) => format!("profile:{user}"),
        }
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key())
    }
}

/// Authoritative push event from a live subscription
#[derive(Debug, Clone)]
pub enum LiveEvent {
    ReelChanged(Reel),
    ReelRemoved(EntityId),
    StatusChanged(Status),
    StatusRemoved(EntityId),
    NotificationArrived(Notification),
    NotificationRemoved(EntityId),
    ProfileChanged(EngagementProfile),
}

/// Reel collection operations
#[async_trait]
pub trait ReelRemote: Send + Sync {
    /// Fetch one reel; `Ok(None)` means the record does not exist
    async fn fetch(&self, id: &EntityId) -> RemoteResult<Option<Reel>>;

    /// Ordered range query: `created_at` descending, id descending tiebreak,
    /// strictly after the anchor when one is given
    async fn list(
        &self,
        filter: &ReelFilter,
        anchor: Option<&PageAnchor>,
        limit: usize,
    ) -> RemoteResult<Vec<Reel>>;

    /// Set like membership for a user on a reel (idempotent)
    async fn set_like(&self, reel_id: &EntityId, user_id: &EntityId, liked: bool)
        -> RemoteResult<()>;

    /// Increment the view counter (authoritative-only, never optimistic)
    async fn register_view(&self, reel_id: &EntityId) -> RemoteResult<()>;
}

/// Status collection operations
#[async_trait]
pub trait StatusRemote: Send + Sync {
    async fn fetch(&self, id: &EntityId) -> RemoteResult<Option<Status>>;

    /// All statuses not yet logically expired at `now`
    async fn list_active(&self, now: DateTime<Utc>) -> RemoteResult<Vec<Status>>;

    /// Record a view (idempotent on the remote as well)
    async fn record_view(&self, status_id: &EntityId, viewer_id: &EntityId) -> RemoteResult<()>;

    /// Physically delete an expired status. Best-effort; logical expiry
    /// never waits for this.
    async fn purge(&self, status_id: &EntityId) -> RemoteResult<()>;
}

/// Notification collection operations
#[async_trait]
pub trait NotificationRemote: Send + Sync {
    async fn fetch(&self, id: &EntityId) -> RemoteResult<Option<Notification>>;

    /// Most recent notifications for a recipient, newest first
    async fn list_recent(
        &self,
        recipient_id: &EntityId,
        limit: usize,
    ) -> RemoteResult<Vec<Notification>>;

    async fn mark_read(&self, id: &EntityId) -> RemoteResult<()>;

    async fn mark_all_read(
        &self,
        recipient_id: &EntityId,
        channel: crate::entities::Channel,
    ) -> RemoteResult<()>;

    async fn delete(&self, id: &EntityId) -> RemoteResult<()>;
}

/// Engagement (follow/save) operations
#[async_trait]
pub trait EngagementRemote: Send + Sync {
    async fn fetch_profile(&self, user_id: &EntityId) -> RemoteResult<Option<EngagementProfile>>;

    async fn set_follow(
        &self,
        user_id: &EntityId,
        target_id: &EntityId,
        following: bool,
    ) -> RemoteResult<()>;

    async fn set_saved(
        &self,
        user_id: &EntityId,
        reel_id: &EntityId,
        saved: bool,
    ) -> RemoteResult<()>;
}

/// Live push subscriptions
#[async_trait]
pub trait LiveRemote: Send + Sync {
    /// Open one underlying listener for a topic. The receiver yields
    /// authoritative events until dropped; dropping it tears the listener
    /// down on the remote side.
    async fn subscribe(&self, topic: Topic) -> RemoteResult<mpsc::Receiver<LiveEvent>>;
}

/// Existence probe for deep-linked content
#[async_trait]
pub trait AvailabilityRemote: Send + Sync {
    /// `Ok(true)` - the record resolves; `Ok(false)` - the fetch succeeded
    /// but the record is gone (tombstone); `Err` - the fetch itself failed.
    async fn probe(&self, id: &EntityId, kind: EntityKind) -> RemoteResult<bool>;
}
