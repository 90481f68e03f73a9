//! Notification center
//!
//! Ingests the current user's notification stream into the notification
//! store, derives per-channel unread counts from effective store state, and
//! drives read/delete mutations optimistically. Counts are computed over
//! store views (confirmed state plus pending patches), so an in-flight
//! mark-read already reads as zero and a rollback restores it without
//! separate counter bookkeeping.

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use feed_core::entities::{
    Channel, Notification, NotificationField, NotificationPatch,
};
use feed_core::traits::{RemoteError, Topic};
use feed_core::{EntityId, EntityKind, SyncError, SyncResult};

use super::grouping::{day_sections, DaySection};
use crate::context::SyncContext;
use crate::subscription::SubscriptionManager;

/// Per-channel unread counts for badge rendering
///
/// Internal counts are uncapped; only the display form saturates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnreadSummary {
    pub bell: u64,
    pub message: u64,
    cap: u64,
}

impl UnreadSummary {
    /// Bell badge text, `99+`-style above the cap
    #[must_use]
    pub fn bell_display(&self) -> String {
        render(self.bell, self.cap)
    }

    /// Message badge text
    #[must_use]
    pub fn message_display(&self) -> String {
        render(self.message, self.cap)
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.bell + self.message
    }
}

fn render(count: u64, cap: u64) -> String {
    if count > cap {
        format!("{cap}+")
    } else {
        count.to_string()
    }
}

/// Ingestion, classification, unread counting, and read-state mutations
/// for the current user's notifications
pub struct NotificationCenter {
    ctx: SyncContext,
}

impl NotificationCenter {
    #[must_use]
    pub fn new(ctx: SyncContext) -> Self {
        Self { ctx }
    }

    /// Backfill recent notifications and open the live topic
    ///
    /// Live arrivals flow through the subscription manager into the
    /// notification store; this center reads everything from the store, so
    /// attaching once is enough for counts, sections, and rows to stay live.
    #[instrument(skip(self, subscriptions))]
    pub async fn attach(&self, subscriptions: &SubscriptionManager) -> SyncResult<()> {
        let me = self.ctx.current_user().clone();
        let backfill = self.ctx.config().notification_backfill;

        let recent = self
            .ctx
            .notification_remote()
            .list_recent(&me, backfill)
            .await
            .map_err(|err| {
                if err.is_transport() {
                    SyncError::Transient(err.to_string())
                } else {
                    SyncError::Internal(err.to_string())
                }
            })?;
        let count = recent.len();
        for notification in recent {
            self.ingest(notification);
        }

        // The receiver is dropped; store-applied delivery is what matters.
        let _rx = subscriptions.start(Topic::Notifications(me)).await?;
        info!(backfilled = count, "notification center attached");
        Ok(())
    }

    /// Detach the live topic opened by [`attach`](Self::attach)
    pub fn detach(&self, subscriptions: &SubscriptionManager) {
        subscriptions.stop(&Topic::Notifications(self.ctx.current_user().clone()));
    }

    /// Ingest one notification into the store
    ///
    /// Idempotent per id; re-delivery of the same notification replaces it
    /// in place. Notifications addressed to another user are dropped.
    pub fn ingest(&self, notification: Notification) {
        if &notification.recipient_id != self.ctx.current_user() {
            debug!(
                id = %notification.id,
                recipient = %notification.recipient_id,
                "dropped notification for another recipient"
            );
            return;
        }
        self.ctx.notifications().upsert_authoritative(notification);
    }

    /// Unread counts per channel over effective store state
    #[must_use]
    pub fn unread(&self) -> UnreadSummary {
        let mut bell = 0;
        let mut message = 0;
        for notification in self.ctx.notifications().snapshot() {
            if notification.read {
                continue;
            }
            match notification.channel() {
                Channel::Bell => bell += 1,
                Channel::Message => message += 1,
            }
        }
        UnreadSummary {
            bell,
            message,
            cap: self.ctx.config().unread_display_cap,
        }
    }

    /// Bell-channel notifications grouped into descending day sections
    #[must_use]
    pub fn bell_sections_at(&self, now: DateTime<Utc>) -> Vec<DaySection> {
        let bell: Vec<Notification> = self
            .ctx
            .notifications()
            .snapshot()
            .into_iter()
            .filter(|n| n.channel() == Channel::Bell)
            .collect();
        day_sections(&bell, now)
    }

    /// Message-channel notifications, newest first
    #[must_use]
    pub fn message_list(&self) -> Vec<Notification> {
        let mut list: Vec<Notification> = self
            .ctx
            .notifications()
            .snapshot()
            .into_iter()
            .filter(|n| n.channel() == Channel::Message)
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        list
    }

    /// Mark one notification read, optimistically
    #[instrument(skip(self))]
    pub async fn mark_read(&self, id: &EntityId) -> SyncResult<()> {
        let generation = self
            .ctx
            .notifications()
            .upsert_optimistic(id, NotificationField::Read, NotificationPatch::Read(true))
            .ok_or_else(|| SyncError::NotFound {
                kind: EntityKind::Notification,
                id: id.clone(),
            })?;

        match self.ctx.notification_remote().mark_read(id).await {
            Ok(()) => {
                self.ctx
                    .notifications()
                    .confirm(id, NotificationField::Read, generation);
                Ok(())
            }
            Err(err) => {
                self.ctx
                    .notifications()
                    .rollback(id, NotificationField::Read, generation);
                Err(classify(err, id))
            }
        }
    }

    /// Mark every notification of one channel read, optimistically
    #[instrument(skip(self))]
    pub async fn mark_all_read(&self, channel: Channel) -> SyncResult<()> {
        let me = self.ctx.current_user().clone();
        let unread: Vec<EntityId> = self
            .ctx
            .notifications()
            .snapshot()
            .into_iter()
            .filter(|n| n.channel() == channel && !n.read)
            .map(|n| n.id)
            .collect();

        let mut pending = Vec::with_capacity(unread.len());
        for id in unread {
            if let Some(generation) = self.ctx.notifications().upsert_optimistic(
                &id,
                NotificationField::Read,
                NotificationPatch::Read(true),
            ) {
                pending.push((id, generation));
            }
        }

        match self
            .ctx
            .notification_remote()
            .mark_all_read(&me, channel)
            .await
        {
            Ok(()) => {
                for (id, generation) in &pending {
                    self.ctx
                        .notifications()
                        .confirm(id, NotificationField::Read, *generation);
                }
                info!(?channel, count = pending.len(), "channel marked read");
                Ok(())
            }
            Err(err) => {
                for (id, generation) in &pending {
                    self.ctx
                        .notifications()
                        .rollback(id, NotificationField::Read, *generation);
                }
                warn!(?channel, "mark-all-read failed, unread state restored");
                Err(if err.is_transport() {
                    SyncError::Transient(err.to_string())
                } else if let RemoteError::Rejected(reason) = err {
                    SyncError::Rollback {
                        field: "read".into(),
                        reason,
                    }
                } else {
                    SyncError::Internal(err.to_string())
                })
            }
        }
    }

    /// Delete one notification, optimistically removing it from the store
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &EntityId) -> SyncResult<()> {
        let removed = self.ctx.notifications().remove(id);

        match self.ctx.notification_remote().delete(id).await {
            // Already gone remotely counts as deleted.
            Ok(()) | Err(RemoteError::Missing) => Ok(()),
            Err(err) => {
                if let Some(notification) = removed {
                    self.ctx.notifications().upsert_authoritative(notification);
                }
                Err(classify(err, id))
            }
        }
    }
}

fn classify(err: RemoteError, id: &EntityId) -> SyncError {
    match err {
        RemoteError::Rejected(reason) => SyncError::Rollback {
            field: "read".into(),
            reason,
        },
        RemoteError::Missing => SyncError::NotFound {
            kind: EntityKind::Notification,
            id: id.clone(),
        },
        err if err.is_transport() => SyncError::Transient(err.to_string()),
        err => SyncError::Internal(err.to_string()),
    }
}
