//! Optimistic engagement toggles

mod coordinator;

pub use coordinator::{EngagementCoordinator, EngagementKind};
