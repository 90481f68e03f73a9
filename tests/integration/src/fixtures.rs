//! In-memory remote and test data generators
//!
//! The remote implements every gateway trait over plain collections and
//! exposes fault injection: full outages, mutation rejection, held
//! mutations, and tombstoned ids.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use tokio::sync::{mpsc, Notify};

use feed_core::entities::{
    Channel, EngagementProfile, MediaKind, Notification, NotificationKind, NotificationPayload,
    Reel, Status,
};
use feed_core::traits::{
    AvailabilityRemote, EngagementRemote, LiveEvent, LiveRemote, NotificationRemote, PageAnchor,
    ReelFilter, ReelRemote, RemoteError, RemoteResult, StatusRemote, Topic,
};
use feed_core::{EntityId, EntityKind};

/// Build a reel with a distinct creation time
pub fn reel_at(id: &str, owner: &str, created_at: DateTime<Utc>) -> Reel {
    let mut reel = Reel::new(EntityId::new(id), EntityId::new(owner), format!("reel {id}"));
    reel.created_at = created_at;
    reel
}

/// Build a status created at the given instant with the standard TTL
pub fn status_at(id: &str, owner: &str, created_at: DateTime<Utc>) -> Status {
    let mut status = Status::new(
        EntityId::new(id),
        EntityId::new(owner),
        MediaKind::Image,
        format!("https://cdn.example/{id}.jpg"),
    );
    status.created_at = created_at;
    status.expires_at = created_at + Duration::hours(24);
    status
}

/// Build a notification addressed to the given recipient
pub fn notification_for(id: &str, recipient: &EntityId, kind: NotificationKind) -> Notification {
    Notification::new(
        EntityId::new(id),
        recipient.clone(),
        kind,
        NotificationPayload {
            actor_id: Some(EntityId::new("actor")),
            actor_name: Some("Actor".to_string()),
            target_id: Some(EntityId::new("target")),
            comment_id: Some(EntityId::new("comment")),
            conversation_id: Some(EntityId::new("conversation")),
            review_user_id: Some(EntityId::new("reviewer")),
            ..NotificationPayload::default()
        },
    )
}

/// Controllable in-memory remote backing every gateway trait
#[derive(Default)]
pub struct InMemoryRemote {
    reels: Mutex<Vec<Reel>>,
    statuses: Mutex<Vec<Status>>,
    notifications: Mutex<Vec<Notification>>,
    profiles: Mutex<HashMap<EntityId, EngagementProfile>>,
    gone: Mutex<HashSet<EntityId>>,
    offline: AtomicBool,
    reject_mutations: AtomicBool,
    hold: Mutex<Option<Arc<Notify>>>,
    live_senders: Mutex<Vec<mpsc::Sender<LiveEvent>>>,
    mutation_log: Mutex<Vec<String>>,
}

impl InMemoryRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seed_reel(&self, reel: Reel) {
        self.reels.lock().push(reel);
    }

    pub fn seed_status(&self, status: Status) {
        self.statuses.lock().push(status);
    }

    pub fn seed_notification(&self, notification: Notification) {
        self.notifications.lock().push(notification);
    }

    /// Mark a record as hard-deleted for availability probes
    pub fn tombstone(&self, id: EntityId) {
        self.gone.lock().insert(id);
    }

    /// Fail every call with a transport error while set
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Reject every mutation while set
    pub fn set_reject_mutations(&self, reject: bool) {
        self.reject_mutations.store(reject, Ordering::SeqCst);
    }

    /// Hold mutations in flight until [`release_mutations`](Self::release_mutations)
    pub fn hold_mutations(&self) {
        *self.hold.lock() = Some(Arc::new(Notify::new()));
    }

    pub fn release_mutations(&self) {
        if let Some(notify) = self.hold.lock().take() {
            notify.notify_waiters();
        }
    }

    /// Mutations applied so far, in arrival order
    pub fn mutations(&self) -> Vec<String> {
        self.mutation_log.lock().clone()
    }

    /// Push an authoritative event to every live listener
    pub async fn push_live(&self, event: LiveEvent) {
        let senders = self.live_senders.lock().clone();
        for tx in senders {
            let _ = tx.send(event.clone()).await;
        }
    }

    pub fn stored_reel(&self, id: &EntityId) -> Option<Reel> {
        self.reels.lock().iter().find(|r| &r.id == id).cloned()
    }

    pub fn stored_status(&self, id: &EntityId) -> Option<Status> {
        self.statuses.lock().iter().find(|s| &s.id == id).cloned()
    }

    /// Hard-delete a reel, as a moderation takedown would
    pub fn remove_reel(&self, id: &EntityId) {
        self.reels.lock().retain(|r| &r.id != id);
    }

    fn check_online(&self) -> RemoteResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable("remote offline".into()));
        }
        Ok(())
    }

    async fn gate(&self) {
        let notify = self.hold.lock().clone();
        if let Some(notify) = notify {
            notify.notified().await;
        }
    }

    fn check_mutation(&self, description: String) -> RemoteResult<()> {
        if self.reject_mutations.load(Ordering::SeqCst) {
            return Err(RemoteError::Rejected("mutation rejected".into()));
        }
        self.mutation_log.lock().push(description);
        Ok(())
    }
}

#[async_trait]
impl ReelRemote for InMemoryRemote {
    async fn fetch(&self, id: &EntityId) -> RemoteResult<Option<Reel>> {
        self.check_online()?;
        Ok(self.stored_reel(id))
    }

    async fn list(
        &self,
        filter: &ReelFilter,
        anchor: Option<&PageAnchor>,
        limit: usize,
    ) -> RemoteResult<Vec<Reel>> {
        self.gate().await;
        self.check_online()?;
        let mut matching: Vec<Reel> = self
            .reels
            .lock()
            .iter()
            .filter(|reel| filter.owner.as_ref().is_none_or(|o| &reel.owner_id == o))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        if let Some(anchor) = anchor {
            matching.retain(|reel| {
                reel.created_at < anchor.created_at
                    || (reel.created_at == anchor.created_at && reel.id < anchor.id)
            });
        }
        matching.truncate(limit);
        Ok(matching)
    }

    async fn set_like(
        &self,
        reel_id: &EntityId,
        user_id: &EntityId,
        liked: bool,
    ) -> RemoteResult<()> {
        self.gate().await;
        self.check_online()?;
        self.check_mutation(format!("like:{reel_id}:{user_id}:{liked}"))?;
        let mut reels = self.reels.lock();
        let reel = reels
            .iter_mut()
            .find(|r| &r.id == reel_id)
            .ok_or(RemoteError::Missing)?;
        if liked {
            reel.liked_by.insert(user_id.clone());
        } else {
            reel.liked_by.remove(user_id);
        }
        Ok(())
    }

    async fn register_view(&self, reel_id: &EntityId) -> RemoteResult<()> {
        self.check_online()?;
        let mut reels = self.reels.lock();
        let reel = reels
            .iter_mut()
            .find(|r| &r.id == reel_id)
            .ok_or(RemoteError::Missing)?;
        reel.view_count += 1;
        Ok(())
    }
}

#[async_trait]
impl StatusRemote for InMemoryRemote {
    async fn fetch(&self, id: &EntityId) -> RemoteResult<Option<Status>> {
        self.check_online()?;
        Ok(self.stored_status(id))
    }

    async fn list_active(&self, now: DateTime<Utc>) -> RemoteResult<Vec<Status>> {
        self.check_online()?;
        Ok(self
            .statuses
            .lock()
            .iter()
            .filter(|s| !s.is_expired(now))
            .cloned()
            .collect())
    }

    async fn record_view(&self, status_id: &EntityId, viewer_id: &EntityId) -> RemoteResult<()> {
        self.gate().await;
        self.check_online()?;
        self.check_mutation(format!("view:{status_id}:{viewer_id}"))?;
        let mut statuses = self.statuses.lock();
        let status = statuses
            .iter_mut()
            .find(|s| &s.id == status_id)
            .ok_or(RemoteError::Missing)?;
        status.viewed_by.insert(viewer_id.clone());
        Ok(())
    }

    async fn purge(&self, status_id: &EntityId) -> RemoteResult<()> {
        self.check_online()?;
        self.mutation_log.lock().push(format!("purge:{status_id}"));
        self.statuses.lock().retain(|s| &s.id != status_id);
        Ok(())
    }
}

#[async_trait]
impl NotificationRemote for InMemoryRemote {
    async fn fetch(&self, id: &EntityId) -> RemoteResult<Option<Notification>> {
        self.check_online()?;
        Ok(self
            .notifications
            .lock()
            .iter()
            .find(|n| &n.id == id)
            .cloned())
    }

    async fn list_recent(
        &self,
        recipient_id: &EntityId,
        limit: usize,
    ) -> RemoteResult<Vec<Notification>> {
        self.check_online()?;
        let mut matching: Vec<Notification> = self
            .notifications
            .lock()
            .iter()
            .filter(|n| &n.recipient_id == recipient_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching.truncate(limit);
        Ok(matching)
    }

    async fn mark_read(&self, id: &EntityId) -> RemoteResult<()> {
        self.gate().await;
        self.check_online()?;
        self.check_mutation(format!("mark_read:{id}"))?;
        let mut notifications = self.notifications.lock();
        let notification = notifications
            .iter_mut()
            .find(|n| &n.id == id)
            .ok_or(RemoteError::Missing)?;
        notification.read = true;
        Ok(())
    }

    async fn mark_all_read(&self, recipient_id: &EntityId, channel: Channel) -> RemoteResult<()> {
        self.gate().await;
        self.check_online()?;
        self.check_mutation(format!("mark_all_read:{recipient_id}:{channel:?}"))?;
        for notification in self.notifications.lock().iter_mut() {
            if &notification.recipient_id == recipient_id && notification.channel() == channel {
                notification.read = true;
            }
        }
        Ok(())
    }

    async fn delete(&self, id: &EntityId) -> RemoteResult<()> {
        self.gate().await;
        self.check_online()?;
        self.check_mutation(format!("delete:{id}"))?;
        self.notifications.lock().retain(|n| &n.id != id);
        Ok(())
    }
}

#[async_trait]
impl EngagementRemote for InMemoryRemote {
    async fn fetch_profile(&self, user_id: &EntityId) -> RemoteResult<Option<EngagementProfile>> {
        self.check_online()?;
        Ok(self.profiles.lock().get(user_id).cloned())
    }

    async fn set_follow(
        &self,
        user_id: &EntityId,
        target_id: &EntityId,
        following: bool,
    ) -> RemoteResult<()> {
        self.gate().await;
        self.check_online()?;
        self.check_mutation(format!("follow:{user_id}:{target_id}:{following}"))?;
        let mut profiles = self.profiles.lock();
        let profile = profiles
            .entry(user_id.clone())
            .or_insert_with(|| EngagementProfile::new(user_id.clone()));
        if following {
            profile.following.insert(target_id.clone());
        } else {
            profile.following.remove(target_id);
        }
        Ok(())
    }

    async fn set_saved(
        &self,
        user_id: &EntityId,
        reel_id: &EntityId,
        saved: bool,
    ) -> RemoteResult<()> {
        self.gate().await;
        self.check_online()?;
        self.check_mutation(format!("save:{user_id}:{reel_id}:{saved}"))?;
        let mut profiles = self.profiles.lock();
        let profile = profiles
            .entry(user_id.clone())
            .or_insert_with(|| EngagementProfile::new(user_id.clone()));
        if saved {
            profile.saved_reels.insert(reel_id.clone());
        } else {
            profile.saved_reels.remove(reel_id);
        }
        Ok(())
    }
}

#[async_trait]
impl LiveRemote for InMemoryRemote {
    async fn subscribe(&self, _topic: Topic) -> RemoteResult<mpsc::Receiver<LiveEvent>> {
        self.check_online()?;
        let (tx, rx) = mpsc::channel(64);
        self.live_senders.lock().push(tx);
        Ok(rx)
    }
}

#[async_trait]
impl AvailabilityRemote for InMemoryRemote {
    async fn probe(&self, id: &EntityId, kind: EntityKind) -> RemoteResult<bool> {
        self.check_online()?;
        if self.gone.lock().contains(id) {
            return Ok(false);
        }
        let exists = match kind {
            EntityKind::Reel => self.stored_reel(id).is_some_and(|r| !r.is_terminal()),
            EntityKind::Status => self.stored_status(id).is_some(),
            EntityKind::Notification => self.notifications.lock().iter().any(|n| &n.id == id),
            EntityKind::Review | EntityKind::Conversation | EntityKind::Profile => true,
        };
        Ok(exists)
    }
}
