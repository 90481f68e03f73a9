//! Availability resolver
//!
//! Answers whether a deep-linked target still resolves. The outcome is
//! tri-state: found, gone, or the probe itself failed. Gone is terminal and
//! must never be retried; a failed probe is transient and retryable. The two
//! are structurally distinct so callers cannot conflate them.

use tracing::{debug, instrument};

use feed_core::{EntityId, EntityKind, SyncError, SyncResult};

use crate::context::SyncContext;

/// Outcome of a successful availability probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// The target exists and is reachable
    Found,
    /// The probe succeeded but the record is gone (hard-deleted or
    /// unauthorized). Terminal; the UI shows a permanent unavailable state.
    NotFound,
}

impl Availability {
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found)
    }
}

/// Existence check for deep-linked content with tombstone detection
pub struct AvailabilityResolver {
    ctx: SyncContext,
}

impl AvailabilityResolver {
    #[must_use]
    pub fn new(ctx: SyncContext) -> Self {
        Self { ctx }
    }

    /// Probe whether a target still resolves
    ///
    /// `Ok(NotFound)` is the tombstone answer; a transport fault surfaces as
    /// `Err(Transient)` so the caller can offer retry.
    #[instrument(skip(self))]
    pub async fn resolve(&self, id: &EntityId, kind: EntityKind) -> SyncResult<Availability> {
        match self.ctx.availability_remote().probe(id, kind).await {
            Ok(true) => Ok(Availability::Found),
            Ok(false) => {
                debug!(id = %id, ?kind, "target is tombstoned");
                Ok(Availability::NotFound)
            }
            Err(err) if err.is_transport() => Err(SyncError::Transient(err.to_string())),
            Err(err) => Err(SyncError::Internal(err.to_string())),
        }
    }
}
