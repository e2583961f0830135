//! Pointer region events
//!
//! Entities subscribe callbacks to a closed set of pointer events. A callback
//! only fires while the pointer lies inside the subscribing entity's radius;
//! that test runs when the event is dispatched, not when the callback is
//! registered.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::scene::{EntityId, Scene};

/// Event kinds an entity can listen for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionEvent {
    /// Pointer button is held down over the entity
    PointerDown,
    /// Pointer button was pressed over the entity
    PointerPressed,
    /// Pointer hovers over the entity
    PointerOver,
}

impl RegionEvent {
    /// All event kinds
    pub const ALL: [Self; 3] = [Self::PointerDown, Self::PointerPressed, Self::PointerOver];

    /// Canonical event name
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PointerDown => "pointerdown",
            Self::PointerPressed => "pointerpressed",
            Self::PointerOver => "pointerover",
        }
    }
}

impl fmt::Display for RegionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegionEvent {
    type Err = EventError;

    /// Accepts the canonical names and the `mouse*` spellings
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "pointerdown" | "mousedown" => Ok(Self::PointerDown),
            "pointerpressed" | "mousepressed" => Ok(Self::PointerPressed),
            "pointerover" | "mouseover" => Ok(Self::PointerOver),
            other => Err(EventError::UnknownEvent(other.to_owned())),
        }
    }
}

/// Event subscription errors
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    /// Event name outside the supported set
    #[error("Unknown event type {0}")]
    UnknownEvent(String),
}

/// Listener callback
///
/// Receives the scene and the id of the entity that registered it. Callbacks
/// mutate game state through the scene, so they capture only plain data.
pub type ListenerFn = Rc<dyn Fn(&mut Scene, EntityId)>;

/// Per-entity listener table: event kind to ordered callbacks
#[derive(Clone, Default)]
pub struct Listeners {
    table: HashMap<RegionEvent, Vec<ListenerFn>>,
}

impl Listeners {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a callback for `event`
    pub fn add(&mut self, event: RegionEvent, callback: ListenerFn) {
        self.table.entry(event).or_default().push(callback);
    }

    /// Drop every callback registered for `event`
    pub fn clear(&mut self, event: RegionEvent) {
        self.table.remove(&event);
    }

    /// Callbacks for `event` in registration order
    pub fn handlers(&self, event: RegionEvent) -> &[ListenerFn] {
        self.table.get(&event).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of callbacks registered for `event`
    pub fn count(&self, event: RegionEvent) -> usize {
        self.handlers(event).len()
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for event in RegionEvent::ALL {
            let count = self.count(event);
            if count > 0 {
                map.entry(&event.as_str(), &count);
            }
        }
        map.finish()
    }
}
