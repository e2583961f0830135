//! Scene and entity framework
//!
//! A [`Scene`] owns entities grouped by [`TypeTag`], runs their update and
//! draw hooks in z order, answers nearest-neighbour queries, attaches and
//! removes dependent entities, and dispatches pointer region events.

mod data;
mod entity;
mod scene_manager;

pub use data::DataBag;
pub use entity::{
    AsAny, Entity, EntityCore, EntityId, TurnDirection, TypeTag, DEFAULT_MAX_TURN_SPEED,
    DEFAULT_START_SLOWING,
};
pub use scene_manager::{ClosestInfo, FrameInfo, Scene, SceneConfig, SceneError, SceneId};
