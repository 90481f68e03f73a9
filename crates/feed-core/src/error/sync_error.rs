//! Sync error taxonomy
//!
//! Every remote failure is classified into one of these variants before it
//! reaches the presentation layer; raw transport errors never leak upward.
//! No variant is process-fatal - each degrades a single operation or screen.

use thiserror::Error;

use crate::entities::NotificationKind;
use crate::value_objects::{EntityId, EntityKind};

/// Classified sync failure
#[derive(Debug, Error)]
pub enum SyncError {
    /// Network/timeout fault. Retryable; the UI offers an inline retry.
    #[error("transient remote failure: {0}")]
    Transient(String),

    /// The ordering key of an already-returned item changed under a cursor.
    /// The caller must restart from the first page; silent retry risks
    /// duplicate or out-of-order delivery.
    #[error("stale cursor for feed {feed}")]
    StaleCursor { feed: String },

    /// A concurrent operation is already running for the same key.
    #[error("operation already in flight for {key}")]
    InFlight { key: String },

    /// A notification payload is missing a field its kind requires.
    /// Callers degrade (fallback navigation or silent discard), never crash.
    #[error("malformed {kind} notification: missing {missing}")]
    MalformedNotification {
        kind: NotificationKind,
        missing: &'static str,
    },

    /// The fetch succeeded but the record is gone (hard-deleted or
    /// unauthorized). Terminal; retrying is a correctness bug.
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: EntityId },

    /// The remote rejected an optimistic mutation; local state was reverted.
    #[error("optimistic {field} mutation rolled back: {reason}")]
    Rollback { field: String, reason: String },

    /// Invariant violation inside the sync core itself.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SyncError {
    /// Whether a retry (with backoff) is a sound response to this error
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// Whether this error is terminal for its target (tombstone)
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Stable error code for presentation-layer mapping
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Transient(_) => "TRANSIENT",
            Self::StaleCursor { .. } => "STALE_CURSOR",
            Self::InFlight { .. } => "IN_FLIGHT",
            Self::MalformedNotification { .. } => "MALFORMED_NOTIFICATION",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Rollback { .. } => "ROLLBACK",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;
