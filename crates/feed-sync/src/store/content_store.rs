//! Content store - canonical keyed cache per entity type
//!
//! Single source of truth for consumers. Two upsert modes: authoritative
//! (remote-confirmed, replaces all fields) and optimistic (overlays one
//! mutated field and marks it pending). An authoritative update arriving
//! while any field is pending is buffered and applied only once the pending
//! mutations resolve, so reordered confirmations never flicker through the
//! UI.
//!
//! All mutations for a given id are serialized through its map entry; no two
//! updates apply out of arrival order for that id.

use dashmap::DashMap;
use tokio::sync::broadcast;

use feed_core::traits::Syncable;
use feed_core::{ChangeEvent, EntityId};

use super::record::Record;

/// Keyed in-memory cache with change-event fanout
pub struct ContentStore<T: Syncable> {
    records: DashMap<EntityId, Record<T>>,
    events: broadcast::Sender<ChangeEvent<T>>,
}

impl<T: Syncable> ContentStore<T> {
    /// Create a store with the given event buffer size
    #[must_use]
    pub fn new(event_buffer: usize) -> Self {
        let (events, _) = broadcast::channel(event_buffer.max(1));
        Self {
            records: DashMap::new(),
            events,
        }
    }

    /// Subscribe to change events
    ///
    /// Delivery is at-least-once for attached, keeping-up receivers;
    /// handlers must be idempotent.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent<T>> {
        self.events.subscribe()
    }

    /// Read one entity as consumers should see it: confirmed state plus any
    /// pending optimistic patches
    pub fn get(&self, id: &EntityId) -> Option<T> {
        self.records.get(id).map(|record| record.view())
    }

    /// Whether an entity is cached
    pub fn contains(&self, id: &EntityId) -> bool {
        self.records.contains_key(id)
    }

    /// Number of cached entities
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Views of every cached entity, in no particular order
    pub fn snapshot(&self) -> Vec<T> {
        self.records.iter().map(|record| record.view()).collect()
    }

    /// Apply a remote-confirmed update
    ///
    /// Replaces all fields, unless a field of this entity has an unsettled
    /// optimistic patch - then the update is buffered until that patch
    /// resolves (success or rollback).
    pub fn upsert_authoritative(&self, entity: T) {
        let id = entity.id().clone();
        let mut buffered = false;

        {
            let mut record = self
                .records
                .entry(id.clone())
                .or_insert_with(|| Record::new(entity.clone()));

            if record.has_pending() {
                record.buffered = Some(entity);
                buffered = true;
            } else {
                record.confirmed = entity;
            }
        }

        if buffered {
            tracing::trace!(id = %id, "authoritative update buffered behind pending mutation");
        } else if let Some(view) = self.get(&id) {
            self.publish(ChangeEvent::Upserted(view));
        }
    }

    /// Apply a local optimistic patch to one field
    ///
    /// Returns the generation the caller must later pass to [`confirm`] or
    /// [`rollback`], or `None` when the entity is not cached (optimistic
    /// patches never create records).
    ///
    /// [`confirm`]: Self::confirm
    /// [`rollback`]: Self::rollback
    pub fn upsert_optimistic(&self, id: &EntityId, field: T::Field, patch: T::Patch) -> Option<u64> {
        let generation = {
            let mut record = self.records.get_mut(id)?;
            record.begin_patch(field, patch)
        };

        if let Some(view) = self.get(id) {
            self.publish(ChangeEvent::Upserted(view));
        }
        Some(generation)
    }

    /// Settle a pending patch as confirmed by the remote
    ///
    /// A stale generation (superseded by a newer toggle) is discarded
    /// silently. Returns whether the confirmation applied.
    pub fn confirm(&self, id: &EntityId, field: T::Field, generation: u64) -> bool {
        self.settle(id, field, generation, true)
    }

    /// Revert a pending patch the remote rejected
    ///
    /// Stale generations are discarded, same as [`confirm`](Self::confirm).
    pub fn rollback(&self, id: &EntityId, field: T::Field, generation: u64) -> bool {
        self.settle(id, field, generation, false)
    }

    fn settle(&self, id: &EntityId, field: T::Field, generation: u64, fold: bool) -> bool {
        let settled = match self.records.get_mut(id) {
            Some(mut record) => record.settle(field, generation, fold),
            None => false,
        };

        if settled {
            if let Some(view) = self.get(id) {
                self.publish(ChangeEvent::Upserted(view));
            }
        } else {
            tracing::trace!(id = %id, generation, "stale settlement discarded");
        }
        settled
    }

    /// Remove an entity
    pub fn remove(&self, id: &EntityId) -> Option<T> {
        let (_, record) = self.records.remove(id)?;
        self.publish(ChangeEvent::Removed(id.clone()));
        Some(record.view())
    }

    fn publish(&self, event: ChangeEvent<T>) {
        // No receivers attached is fine; completions must be safe to apply
        // with zero current observers.
        let _ = self.events.send(event);
    }
}

impl<T: Syncable> std::fmt::Debug for ContentStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentStore")
            .field("records", &self.records.len())
            .finish()
    }
}
