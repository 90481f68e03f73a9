//! # feed-core
//!
//! Domain layer containing entities, value objects, the sync error taxonomy,
//! change events, and the remote gateway traits. This crate has zero
//! dependencies on infrastructure (transport, storage, presentation).

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Channel, EngagementProfile, Lifecycle, MediaKind, MembershipPatch, Notification,
    NotificationField, NotificationKind, NotificationPatch, NotificationPayload, ProfileField,
    Reel, ReelField, Status, StatusField,
};
pub use error::{SyncError, SyncResult};
pub use events::ChangeEvent;
pub use traits::{
    AvailabilityRemote, EngagementRemote, LiveEvent, LiveRemote, NotificationRemote, PageAnchor,
    ReelFilter, ReelRemote, RemoteError, RemoteResult, StatusRemote, Syncable, Topic,
};
pub use value_objects::{EntityId, EntityIdParseError, EntityKind};
