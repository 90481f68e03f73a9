//! # feed-common
//!
//! Cross-cutting concerns shared by the sync crates: configuration loading,
//! tracing setup, and the retry backoff policy.

pub mod backoff;
pub mod config;
pub mod telemetry;

pub use backoff::{Backoff, BackoffConfig};
pub use config::{ConfigError, SyncConfig};
pub use telemetry::{init_telemetry, TelemetryConfig};
