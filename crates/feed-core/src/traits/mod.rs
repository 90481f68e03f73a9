//! Domain traits - the seams between the sync core and its collaborators

mod remote;
mod syncable;

pub use remote::{
    AvailabilityRemote, EngagementRemote, LiveEvent, LiveRemote, NotificationRemote, PageAnchor,
    ReelFilter, ReelRemote, RemoteError, RemoteResult, StatusRemote, Topic,
};
pub use syncable::Syncable;
