//! Specialized collection types

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Stable arena key for an entity slot inside a scene
    pub struct EntityKey;
}

/// Arena with stable keys, used for per-scene entity storage
pub type EntityArena<T> = SlotMap<EntityKey, T>;
