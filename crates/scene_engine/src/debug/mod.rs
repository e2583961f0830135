//! Debug readouts drawn on top of a scene
//!
//! The overlay is owned by the scene and painted after both entity passes, so
//! it is never covered by game objects.

pub mod overlay;

pub use overlay::{DebugFlags, DebugOverlay};
