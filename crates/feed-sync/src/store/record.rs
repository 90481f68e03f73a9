//! Per-entity record state
//!
//! Each cached entity tracks a confirmed snapshot, the set of fields with an
//! unsettled optimistic patch, and at most one buffered authoritative update
//! waiting for those patches to resolve. The per-field state machine is
//! confirmed -> pending(patch, generation) -> confirmed, with a monotonic
//! generation so stale in-flight responses can be discarded without true
//! cancellation support.

use std::collections::HashMap;

use feed_core::traits::Syncable;

/// One unsettled optimistic patch
#[derive(Debug)]
pub(crate) struct PendingField<P> {
    pub generation: u64,
    pub patch: P,
}

/// Cached state for one entity id
#[derive(Debug)]
pub(crate) struct Record<T: Syncable> {
    /// Last remote-confirmed snapshot (with settled patches folded in)
    pub confirmed: T,
    /// Fields with an in-flight optimistic mutation
    pub pending: HashMap<T::Field, PendingField<T::Patch>>,
    /// Authoritative update held back while any field is pending
    pub buffered: Option<T>,
    /// Generation source; monotonic per record
    next_generation: u64,
}

impl<T: Syncable> Record<T> {
    pub fn new(confirmed: T) -> Self {
        Self {
            confirmed,
            pending: HashMap::new(),
            buffered: None,
            next_generation: 0,
        }
    }

    /// The state consumers see: confirmed plus every pending patch
    pub fn view(&self) -> T {
        let mut view = self.confirmed.clone();
        for (field, pending) in &self.pending {
            view.apply_patch(field.clone(), &pending.patch);
        }
        view
    }

    /// Register a new optimistic patch, superseding any in-flight one for
    /// the same field. Returns the generation the caller must settle with.
    pub fn begin_patch(&mut self, field: T::Field, patch: T::Patch) -> u64 {
        let generation = self.next_generation;
        self.next_generation += 1;
        self.pending.insert(field, PendingField { generation, patch });
        generation
    }

    /// Settle a pending patch. `fold` keeps the patch's effect (confirm);
    /// otherwise it is discarded (rollback). Returns false for a stale or
    /// unknown generation, which must be a no-op.
    pub fn settle(&mut self, field: T::Field, generation: u64, fold: bool) -> bool {
        let pending = match self.pending.remove(&field) {
            Some(pending) if pending.generation == generation => pending,
            Some(superseded) => {
                // A newer toggle owns this field now; put it back untouched.
                self.pending.insert(field, superseded);
                return false;
            }
            None => return false,
        };

        // A buffered authoritative update applies as soon as the last
        // pending field resolves.
        if self.pending.is_empty() {
            if let Some(buffered) = self.buffered.take() {
                self.confirmed = buffered;
            }
        }

        if fold {
            self.confirmed.apply_patch(field, &pending.patch);
        }

        true
    }

    /// Whether any field still has an unsettled patch
    #[inline]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
