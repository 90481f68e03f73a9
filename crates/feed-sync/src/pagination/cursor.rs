//! Feed cursor
//!
//! Opaque pagination token encoding the last-seen sort position of a feed
//! query. Valid only while the ordering key of already-returned items is
//! immutable; the paginator re-verifies the anchor before every extension.

use serde::{Deserialize, Serialize};

use feed_core::traits::{PageAnchor, ReelFilter};
use feed_core::{SyncError, SyncResult};

/// Opaque cursor for one feed query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedCursor {
    filter: ReelFilter,
    anchor: PageAnchor,
    page_size: usize,
}

impl FeedCursor {
    pub(crate) fn new(filter: ReelFilter, anchor: PageAnchor, page_size: usize) -> Self {
        Self {
            filter,
            anchor,
            page_size,
        }
    }

    /// Key of the feed this cursor belongs to
    #[must_use]
    pub fn feed_key(&self) -> String {
        self.filter.feed_key()
    }

    /// Serialize to an opaque token callers can persist
    #[must_use]
    pub fn token(&self) -> String {
        // Serialization of these plain fields cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Rebuild a cursor from a persisted token
    pub fn from_token(token: &str) -> SyncResult<Self> {
        serde_json::from_str(token)
            .map_err(|err| SyncError::Internal(format!("invalid cursor token: {err}")))
    }

    pub(crate) fn filter(&self) -> &ReelFilter {
        &self.filter
    }

    pub(crate) fn anchor(&self) -> &PageAnchor {
        &self.anchor
    }

    pub(crate) fn page_size(&self) -> usize {
        self.page_size
    }
}
