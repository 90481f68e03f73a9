//! Canonical in-memory content stores

mod content_store;
mod record;

pub use content_store::ContentStore;
