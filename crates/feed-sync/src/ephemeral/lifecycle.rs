//! Ephemeral lifecycle manager
//!
//! Tracks status views, derives owner-grouped ring state, and filters
//! logically-expired statuses out of every read. Physical purge is a
//! separate best-effort operation; no reader may depend on it having run.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

use feed_core::entities::{MembershipPatch, Status, StatusField};
use feed_core::traits::RemoteError;
use feed_core::{EntityId, EntityKind, SyncError, SyncResult};

use crate::context::SyncContext;

/// One owner's active statuses, ordered oldest first for playback
#[derive(Debug, Clone)]
pub struct StatusGroup {
    pub owner_id: EntityId,
    pub statuses: Vec<Status>,
}

/// Viewed/unviewed ring rendering state for one owner group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingState {
    /// One ring segment per active status in the group
    pub segment_count: usize,
    /// True while at least one status in the group is unviewed.
    /// Partial viewing does not dim the ring.
    pub unviewed: bool,
}

/// TTL expiry, view tracking, and ring-state derivation for statuses
pub struct EphemeralLifecycleManager {
    ctx: SyncContext,
}

impl EphemeralLifecycleManager {
    #[must_use]
    pub fn new(ctx: SyncContext) -> Self {
        Self { ctx }
    }

    /// Reload the active status set from the remote into the store
    #[instrument(skip(self))]
    pub async fn refresh(&self, now: DateTime<Utc>) -> SyncResult<Vec<Status>> {
        let statuses = self
            .ctx
            .status_remote()
            .list_active(now)
            .await
            .map_err(|err| {
                if err.is_transport() {
                    SyncError::Transient(err.to_string())
                } else {
                    SyncError::Internal(err.to_string())
                }
            })?;
        for status in &statuses {
            self.ctx.statuses().upsert_authoritative(status.clone());
        }
        debug!(count = statuses.len(), "active statuses refreshed");
        Ok(statuses)
    }

    /// Record that the current user viewed a status
    ///
    /// Idempotent: when the effective state already shows the view, the
    /// remote write is skipped. Returns whether the view was new.
    #[instrument(skip(self))]
    pub async fn record_view(&self, status_id: &EntityId) -> SyncResult<bool> {
        self.ensure_cached(status_id).await?;

        let me = self.ctx.current_user().clone();
        let status = self
            .ctx
            .statuses()
            .get(status_id)
            .ok_or_else(|| SyncError::NotFound {
                kind: EntityKind::Status,
                id: status_id.clone(),
            })?;
        if status.is_viewed_by(&me) {
            return Ok(false);
        }

        let generation = self
            .ctx
            .statuses()
            .upsert_optimistic(
                status_id,
                StatusField::ViewedBy,
                MembershipPatch::insert(me.clone()),
            )
            .ok_or_else(|| SyncError::Internal("status vanished during view".into()))?;

        match self.ctx.status_remote().record_view(status_id, &me).await {
            Ok(()) => {
                self.ctx
                    .statuses()
                    .confirm(status_id, StatusField::ViewedBy, generation);
                debug!(status_id = %status_id, "view recorded");
                Ok(true)
            }
            Err(err) => {
                self.ctx
                    .statuses()
                    .rollback(status_id, StatusField::ViewedBy, generation);
                Err(match err {
                    RemoteError::Rejected(reason) => SyncError::Rollback {
                        field: "viewed_by".into(),
                        reason,
                    },
                    RemoteError::Missing => SyncError::NotFound {
                        kind: EntityKind::Status,
                        id: status_id.clone(),
                    },
                    err if err.is_transport() => SyncError::Transient(err.to_string()),
                    err => SyncError::Internal(err.to_string()),
                })
            }
        }
    }

    /// Group statuses by owner for the ring tray
    ///
    /// Expired statuses are dropped on every read, independent of physical
    /// purge. The viewer's own group is pinned first; the rest are ordered
    /// by their most recent unviewed status, fully-viewed groups last.
    #[must_use]
    pub fn group_by_owner(
        &self,
        statuses: &[Status],
        viewer: &EntityId,
        now: DateTime<Utc>,
    ) -> Vec<StatusGroup> {
        group_statuses(statuses, viewer, now)
    }

    /// Ring state for one owner group
    #[must_use]
    pub fn ring_state(&self, group: &StatusGroup, viewer: &EntityId) -> RingState {
        RingState {
            segment_count: group.statuses.len(),
            unviewed: group.statuses.iter().any(|s| !s.is_viewed_by(viewer)),
        }
    }

    /// Physically purge expired statuses, best-effort
    ///
    /// Logical expiry already hides them from every read; a failed purge is
    /// logged and retried on the next sweep, never surfaced. Returns how
    /// many records were purged.
    #[instrument(skip(self, statuses))]
    pub async fn purge_expired(&self, statuses: &[Status], now: DateTime<Utc>) -> usize {
        let mut purged = 0;
        for status in statuses.iter().filter(|s| s.is_expired(now)) {
            match self.ctx.status_remote().purge(&status.id).await {
                Ok(()) => {
                    self.ctx.statuses().remove(&status.id);
                    purged += 1;
                }
                Err(err) => {
                    warn!(status_id = %status.id, error = %err, "purge failed, will retry next sweep");
                }
            }
        }
        if purged > 0 {
            info!(purged, "expired statuses purged");
        }
        purged
    }

    async fn ensure_cached(&self, status_id: &EntityId) -> SyncResult<()> {
        if self.ctx.statuses().contains(status_id) {
            return Ok(());
        }
        match self.ctx.status_remote().fetch(status_id).await {
            Ok(Some(status)) => {
                self.ctx.statuses().upsert_authoritative(status);
                Ok(())
            }
            Ok(None) | Err(RemoteError::Missing) => Err(SyncError::NotFound {
                kind: EntityKind::Status,
                id: status_id.clone(),
            }),
            Err(err) if err.is_transport() => Err(SyncError::Transient(err.to_string())),
            Err(err) => Err(SyncError::Internal(err.to_string())),
        }
    }
}

/// Pure owner-grouping over an arbitrary status slice
#[must_use]
pub(crate) fn group_statuses(
    statuses: &[Status],
    viewer: &EntityId,
    now: DateTime<Utc>,
) -> Vec<StatusGroup> {
    let mut by_owner: HashMap<EntityId, Vec<Status>> = HashMap::new();
    for status in statuses {
        if status.is_expired(now) {
            continue;
        }
        by_owner
            .entry(status.owner_id.clone())
            .or_default()
            .push(status.clone());
    }

    let mut groups: Vec<StatusGroup> = by_owner
        .into_iter()
        .map(|(owner_id, mut statuses)| {
            statuses.sort_by(|a, b| a.created_at.cmp(&b.created_at));
            StatusGroup { owner_id, statuses }
        })
        .collect();

    // Sort key per group: newest unviewed status when one exists, else
    // newest status; fully-viewed groups sink below partially-viewed ones.
    let recency = |group: &StatusGroup| -> (bool, DateTime<Utc>) {
        let newest_unviewed = group
            .statuses
            .iter()
            .filter(|s| !s.is_viewed_by(viewer))
            .map(|s| s.created_at)
            .max();
        match newest_unviewed {
            Some(at) => (true, at),
            None => (
                false,
                group
                    .statuses
                    .iter()
                    .map(|s| s.created_at)
                    .max()
                    .unwrap_or(now),
            ),
        }
    };

    groups.sort_by(|a, b| {
        let own_a = &a.owner_id == viewer;
        let own_b = &b.owner_id == viewer;
        // Viewer's own group pins first regardless of recency.
        own_b.cmp(&own_a).then_with(|| {
            let (unviewed_a, at_a) = recency(a);
            let (unviewed_b, at_b) = recency(b);
            unviewed_b.cmp(&unviewed_a).then(at_b.cmp(&at_a))
        })
    });

    groups
}
