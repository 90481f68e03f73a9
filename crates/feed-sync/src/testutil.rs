//! Shared unit-test fixture: an in-memory remote with fault injection
//!
//! Implements every gateway trait over plain collections so component tests
//! can run against a controllable remote: go offline, reject mutations, hold
//! mutations in flight, or tombstone a record.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::{mpsc, Notify};

use feed_common::SyncConfig;
use feed_core::entities::{Channel, EngagementProfile, Notification, Reel, Status};
use feed_core::traits::{
    AvailabilityRemote, EngagementRemote, LiveEvent, LiveRemote, NotificationRemote, PageAnchor,
    ReelFilter, ReelRemote, RemoteError, RemoteResult, StatusRemote, Topic,
};
use feed_core::{EntityId, EntityKind};

use crate::context::SyncContext;

/// Controllable in-memory remote
#[derive(Default)]
pub struct FakeRemote {
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

impl FakeRemote {
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

    /// Number of live listeners currently attached
    pub fn live_subscriptions(&self) -> usize {
        self.live_senders
            .lock()
            .iter()
            .filter(|tx| !tx.is_closed())
            .count()
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

    /// Hard-delete a reel from the backing collection
    pub fn remove_reel(&self, id: &EntityId) {
        self.reels.lock().retain(|r| &r.id != id);
    }

    /// Rewrite a reel's ordering key, invalidating any cursor anchored on it
    pub fn set_reel_created_at(&self, id: &EntityId, created_at: DateTime<Utc>) {
        if let Some(reel) = self.reels.lock().iter_mut().find(|r| &r.id == id) {
            reel.created_at = created_at;
        }
    }

    fn check_online(&self) -> RemoteResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable("fake remote offline".into()));
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
impl ReelRemote for FakeRemote {
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
            // strictly after the anchor in (created_at desc, id desc) order
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
impl StatusRemote for FakeRemote {
    async fn fetch(&self, id: &EntityId) -> RemoteResult<Option<Status>> {
        self.check_online()?;
        Ok(self.statuses.lock().iter().find(|s| &s.id == id).cloned())
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
impl NotificationRemote for FakeRemote {
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

    async fn mark_all_read(
        &self,
        recipient_id: &EntityId,
        channel: Channel,
    ) -> RemoteResult<()> {
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
impl EngagementRemote for FakeRemote {
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
impl LiveRemote for FakeRemote {
    async fn subscribe(&self, _topic: Topic) -> RemoteResult<mpsc::Receiver<LiveEvent>> {
        self.check_online()?;
        let (tx, rx) = mpsc::channel(64);
        self.live_senders.lock().push(tx);
        Ok(rx)
    }
}

#[async_trait]
impl AvailabilityRemote for FakeRemote {
    async fn probe(&self, id: &EntityId, kind: EntityKind) -> RemoteResult<bool> {
        self.check_online()?;
        if self.gone.lock().contains(id) {
            return Ok(false);
        }
        let exists = match kind {
            EntityKind::Reel => self.stored_reel(id).is_some_and(|r| !r.is_terminal()),
            EntityKind::Status => self.statuses.lock().iter().any(|s| &s.id == id),
            EntityKind::Notification => self.notifications.lock().iter().any(|n| &n.id == id),
            // Reviews, conversations, and profiles are not modeled in the
            // fake; anything not tombstoned resolves.
            EntityKind::Review | EntityKind::Conversation | EntityKind::Profile => true,
        };
        Ok(exists)
    }
}

/// The current user every test context signs in as
pub fn me() -> EntityId {
    EntityId::new("me")
}

/// Build an isolated context over a fresh fake remote
pub fn test_context() -> (SyncContext, Arc<FakeRemote>) {
    let remote = FakeRemote::new();
    let ctx = SyncContext::builder()
        .config(SyncConfig::default())
        .current_user(me())
        .reel_remote(remote.clone())
        .status_remote(remote.clone())
        .notification_remote(remote.clone())
        .engagement_remote(remote.clone())
        .live_remote(remote.clone())
        .availability_remote(remote.clone())
        .build()
        .expect("test context");
    (ctx, remote)
}
