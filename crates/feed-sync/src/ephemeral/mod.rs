//! Ephemeral story lifecycle

mod lifecycle;

pub use lifecycle::{EphemeralLifecycleManager, RingState, StatusGroup};
