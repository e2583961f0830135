//! Typed shared-state bag
//!
//! Game code keeps session state (health, score, UI flags) here, one value per
//! Rust type, so any entity holding the scene can read or change it.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

/// Map from a Rust type to one value of that type
#[derive(Default)]
pub struct DataBag {
    values: HashMap<TypeId, Box<dyn Any>>,
}

impl DataBag {
    /// Create an empty bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value`, returning the previous value of the same type
    pub fn insert<T: 'static>(&mut self, value: T) -> Option<T> {
        self.values
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|old| old.downcast::<T>().ok())
            .map(|old| *old)
    }

    /// Borrow the value of type `T`
    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.values.get(&TypeId::of::<T>())?.downcast_ref()
    }

    /// Mutably borrow the value of type `T`
    pub fn get_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.values.get_mut(&TypeId::of::<T>())?.downcast_mut()
    }

    /// Take the value of type `T` out of the bag
    pub fn remove<T: 'static>(&mut self) -> Option<T> {
        self.values
            .remove(&TypeId::of::<T>())
            .and_then(|value| value.downcast::<T>().ok())
            .map(|value| *value)
    }

    /// Whether a value of type `T` is stored
    pub fn contains<T: 'static>(&self) -> bool {
        self.values.contains_key(&TypeId::of::<T>())
    }

    /// Number of stored values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the bag is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for DataBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataBag").field("len", &self.values.len()).finish()
    }
}
