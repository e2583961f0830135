//! Proximity queries
//!
//! Scenes in this engine hold a few hundred entities at most, so proximity is
//! answered with a linear scan over one kind bucket. The scan lives here, free
//! of scene storage, so a partitioned structure can replace it later without
//! touching callers.

mod nearest;

pub use nearest::{nearest, Nearest};
