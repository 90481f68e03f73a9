//! Syncable trait - what an entity needs for store-level reconciliation

use std::fmt::Debug;
use std::hash::Hash;

use crate::value_objects::EntityId;

/// An entity the content store can cache and patch optimistically
///
/// `Field` enumerates the patchable slots of the entity; `Patch` is the
/// value applied to one of them. A field variant may carry data (such as the
/// member of a membership set) so that independent targets hold independent
/// pending slots. Patches must be idempotent so replaying one onto a
/// buffered authoritative snapshot is safe.
pub trait Syncable: Clone + Send + Sync + 'static {
    /// Patchable field discriminator
    type Field: Clone + Eq + Hash + Debug + Send + Sync + 'static;
    /// Optimistic patch value
    type Patch: Clone + Debug + Send + Sync + 'static;

    /// Document id of this entity
    fn id(&self) -> &EntityId;

    /// Apply an optimistic patch to one field
    fn apply_patch(&mut self, field: Self::Field, patch: &Self::Patch);
}
