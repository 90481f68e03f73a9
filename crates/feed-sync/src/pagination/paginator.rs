//! Feed paginator
//!
//! Loads ordered reel pages through keyset cursors. Before extending a
//! cursor it verifies the anchor item's ordering key is unchanged; a
//! mismatch means the caller must restart from the first page - silent
//! retry risks duplicate or out-of-order delivery. Concurrent loads for the
//! same feed key are rejected rather than raced.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, instrument};

use feed_core::entities::Reel;
use feed_core::traits::{PageAnchor, ReelFilter, RemoteError};
use feed_core::{SyncError, SyncResult};

use super::cursor::FeedCursor;
use crate::context::SyncContext;

/// One page of a feed
#[derive(Debug, Clone)]
pub struct FeedPage {
    /// Items in feed order (newest first)
    pub items: Vec<Reel>,
    /// Cursor extending this page, when the page was non-empty
    pub cursor: Option<FeedCursor>,
    /// Whether the feed continues past this page
    pub has_more: bool,
}

/// Cursor-based incremental loader for reel feeds
pub struct FeedPaginator {
    ctx: SyncContext,
    in_flight: DashMap<String, ()>,
}

impl FeedPaginator {
    #[must_use]
    pub fn new(ctx: SyncContext) -> Self {
        Self {
            ctx,
            in_flight: DashMap::new(),
        }
    }

    /// Load the first page of a feed
    #[instrument(skip(self))]
    pub async fn load_first_page(
        &self,
        filter: ReelFilter,
        page_size: Option<usize>,
    ) -> SyncResult<FeedPage> {
        let size = self.ctx.config().clamp_page_size(page_size);
        let _guard = self.acquire(filter.feed_key())?;
        self.fetch_page(&filter, None, size).await
    }

    /// Extend a previously-returned cursor by one page
    #[instrument(skip(self, cursor), fields(feed = %cursor.feed_key()))]
    pub async fn load_next_page(&self, cursor: &FeedCursor) -> SyncResult<FeedPage> {
        let _guard = self.acquire(cursor.feed_key())?;

        self.verify_anchor(cursor).await?;
        self.fetch_page(cursor.filter(), Some(cursor.anchor()), cursor.page_size())
            .await
    }

    /// Check the anchor item's ordering key still matches the cursor
    async fn verify_anchor(&self, cursor: &FeedCursor) -> SyncResult<()> {
        let anchor = cursor.anchor();
        let current = match self.ctx.reel_remote().fetch(&anchor.id).await {
            Ok(reel) => reel,
            Err(err) if err.is_transport() => {
                return Err(SyncError::Transient(err.to_string()));
            }
            Err(RemoteError::Missing) => None,
            Err(err) => return Err(SyncError::Internal(err.to_string())),
        };

        match current {
            Some(reel) if reel.created_at == anchor.created_at => Ok(()),
            Some(reel) => {
                debug!(
                    anchor = %anchor.id,
                    was = %anchor.created_at,
                    now = %reel.created_at,
                    "anchor ordering key changed"
                );
                Err(SyncError::StaleCursor {
                    feed: cursor.feed_key(),
                })
            }
            // Anchor deleted: its sort position no longer exists.
            None => Err(SyncError::StaleCursor {
                feed: cursor.feed_key(),
            }),
        }
    }

    async fn fetch_page(
        &self,
        filter: &ReelFilter,
        anchor: Option<&PageAnchor>,
        size: usize,
    ) -> SyncResult<FeedPage> {
        // Over-fetch by one to learn whether the feed continues.
        let mut items = self
            .ctx
            .reel_remote()
            .list(filter, anchor, size + 1)
            .await
            .map_err(|err| {
                if err.is_transport() {
                    SyncError::Transient(err.to_string())
                } else {
                    SyncError::Internal(err.to_string())
                }
            })?;

        let has_more = items.len() > size;
        items.truncate(size);

        for item in &items {
            self.ctx.reels().upsert_authoritative(item.clone());
        }

        let cursor = items.last().map(|last| {
            FeedCursor::new(
                filter.clone(),
                PageAnchor {
                    created_at: last.created_at,
                    id: last.id.clone(),
                },
                size,
            )
        });

        debug!(feed = %filter.feed_key(), count = items.len(), has_more, "page loaded");

        Ok(FeedPage {
            items,
            cursor,
            has_more,
        })
    }

    fn acquire(&self, key: String) -> SyncResult<InFlightGuard<'_>> {
        match self.in_flight.entry(key.clone()) {
            Entry::Occupied(_) => Err(SyncError::InFlight { key }),
            Entry::Vacant(vacant) => {
                vacant.insert(());
                Ok(InFlightGuard {
                    map: &self.in_flight,
                    key,
                })
            }
        }
    }
}

/// Releases the feed's in-flight slot on every exit path
struct InFlightGuard<'a> {
    map: &'a DashMap<String, ()>,
    key: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.map.remove(&self.key);
    }
}
