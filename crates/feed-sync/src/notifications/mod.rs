//! Notification ingestion, grouping, counters, and action resolution

mod actions;
mod center;
mod grouping;

pub use actions::{fallback_action, resolve_action, NavigationTarget};
pub use center::{NotificationCenter, UnreadSummary};
pub use grouping::{day_sections, DaySection};
