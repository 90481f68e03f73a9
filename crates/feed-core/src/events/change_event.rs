//! Store change events
//!
//! Delivery is at-least-once and fans out to every attached observer, so
//! handlers must be idempotent.

use crate::value_objects::EntityId;

/// A change to one entity in a content store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent<T> {
    /// The entity was inserted or its visible state changed
    Upserted(T),
    /// The entity was removed from the store
    Removed(EntityId),
}

impl<T> ChangeEvent<T> {
    /// Id of the affected entity
    pub fn entity_id(&self) -> &EntityId
    where
        T: crate::traits::Syncable,
    {
        match self {
            Self::Upserted(entity) => entity.id(),
            Self::Removed(id) => id,
        }
    }
}
