//! # feed-sync
//!
//! The real-time content-synchronization core: canonical in-memory stores,
//! reference-counted live subscriptions, cursor pagination, optimistic
//! engagement toggles with rollback, ephemeral story lifecycle, the
//! notification center, and the availability resolver for deep links.
//!
//! These components are the only surface the presentation layer calls;
//! nothing above this crate talks to the remote directly.

pub mod availability;
pub mod context;
pub mod engagement;
pub mod ephemeral;
pub mod notifications;
pub mod pagination;
pub mod store;
pub mod subscription;

#[cfg(test)]
mod testutil;

pub use availability::{Availability, AvailabilityResolver};
pub use context::{SyncContext, SyncContextBuilder};
pub use engagement::{EngagementCoordinator, EngagementKind};
pub use ephemeral::{EphemeralLifecycleManager, RingState, StatusGroup};
pub use notifications::{
    fallback_action, resolve_action, DaySection, NavigationTarget, NotificationCenter,
    UnreadSummary,
};
pub use pagination::{FeedCursor, FeedPage, FeedPaginator};
pub use store::ContentStore;
pub use subscription::SubscriptionManager;
