//! Subscription manager
//!
//! Binds live-listener lifecycle to observer reference counts. One
//! underlying remote listener exists per topic key no matter how many
//! observers attach; the listener is torn down when the last observer
//! detaches. Every authoritative event is routed into the matching content
//! store before fanout, so the stores stay the single source of truth even
//! with zero observers.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use feed_core::traits::{LiveEvent, Topic};
use feed_core::{SyncError, SyncResult};

use crate::context::SyncContext;

struct TopicEntry {
    refcount: usize,
    tx: broadcast::Sender<LiveEvent>,
    task: JoinHandle<()>,
}

/// Reference-counted lifecycle binding for live listeners
pub struct SubscriptionManager {
    ctx: SyncContext,
    entries: DashMap<String, TopicEntry>,
}

impl SubscriptionManager {
    #[must_use]
    pub fn new(ctx: SyncContext) -> Self {
        Self {
            ctx,
            entries: DashMap::new(),
        }
    }

    /// Attach an observer to a topic
    ///
    /// Increments the topic's reference count, opening the shared underlying
    /// listener if this is the first observer. Delivery to the returned
    /// receiver is at-least-once for observers that keep up; handlers must
    /// be idempotent.
    pub async fn start(&self, topic: Topic) -> SyncResult<broadcast::Receiver<LiveEvent>> {
        let key = topic.key();

        if let Some(mut entry) = self.entries.get_mut(&key) {
            entry.refcount += 1;
            debug!(topic = %key, refcount = entry.refcount, "observer attached");
            return Ok(entry.tx.subscribe());
        }

        let remote_rx = self
            .ctx
            .live_remote()
            .subscribe(topic)
            .await
            .map_err(|err| {
                if err.is_transport() {
                    SyncError::Transient(err.to_string())
                } else {
                    SyncError::Internal(format!("subscribe failed: {err}"))
                }
            })?;

        match self.entries.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                // Another observer opened the listener while we were
                // subscribing; ours is redundant and dropping the receiver
                // tears it down remotely.
                drop(remote_rx);
                let entry = occupied.get_mut();
                entry.refcount += 1;
                debug!(topic = %key, refcount = entry.refcount, "observer attached");
                Ok(entry.tx.subscribe())
            }
            Entry::Vacant(vacant) => {
                let (tx, rx) = broadcast::channel(self.ctx.config().subscription_buffer);
                let task = tokio::spawn(run_listener(
                    self.ctx.clone(),
                    key.clone(),
                    remote_rx,
                    tx.clone(),
                ));
                vacant.insert(TopicEntry {
                    refcount: 1,
                    tx,
                    task,
                });
                debug!(topic = %key, "listener opened");
                Ok(rx)
            }
        }
    }

    /// Detach one observer from a topic
    ///
    /// Synchronous so screens can call it on teardown. The underlying
    /// listener is closed only when the count reaches zero.
    pub fn stop(&self, topic: &Topic) {
        let key = topic.key();
        match self.entries.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                occupied.get_mut().refcount -= 1;
                if occupied.get().refcount == 0 {
                    let (_, entry) = occupied.remove_entry();
                    entry.task.abort();
                    debug!(topic = %key, "listener closed");
                } else {
                    debug!(topic = %key, refcount = occupied.get().refcount, "observer detached");
                }
            }
            Entry::Vacant(_) => {
                warn!(topic = %key, "stop called for a topic with no observers");
            }
        }
    }

    /// Current observer count for a topic (zero when no listener exists)
    pub fn observer_count(&self, topic: &Topic) -> usize {
        self.entries
            .get(&topic.key())
            .map_or(0, |entry| entry.refcount)
    }

    /// Number of open underlying listeners
    pub fn listener_count(&self) -> usize {
        self.entries.len()
    }
}

impl std::fmt::Debug for SubscriptionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionManager")
            .field("listeners", &self.entries.len())
            .finish()
    }
}

/// Pump one remote listener: apply every authoritative event to its store,
/// then fan out to observers.
async fn run_listener(
    ctx: SyncContext,
    key: String,
    mut remote_rx: mpsc::Receiver<LiveEvent>,
    tx: broadcast::Sender<LiveEvent>,
) {
    while let Some(event) = remote_rx.recv().await {
        apply_to_store(&ctx, &event);
        // No observers is fine; the store already holds the update.
        let _ = tx.send(event);
    }
    debug!(topic = %key, "remote stream ended");
}

fn apply_to_store(ctx: &SyncContext, event: &LiveEvent) {
    match event {
        LiveEvent::ReelChanged(reel) => ctx.reels().upsert_authoritative(reel.clone()),
        LiveEvent::ReelRemoved(id) => {
            ctx.reels().remove(id);
        }
        LiveEvent::StatusChanged(status) => ctx.statuses().upsert_authoritative(status.clone()),
        LiveEvent::StatusRemoved(id) => {
            ctx.statuses().remove(id);
        }
        LiveEvent::NotificationArrived(notification) => {
            ctx.notifications().upsert_authoritative(notification.clone());
        }
        LiveEvent::NotificationRemoved(id) => {
            ctx.notifications().remove(id);
        }
        LiveEvent::ProfileChanged(profile) => ctx.profiles().upsert_authoritative(profile.clone()),
    }
}
