//! # Scene Engine
//!
//! A small frame-driven 2D scene runtime.
//!
//! ## Features
//!
//! - **Typed buckets**: entities grouped by kind tag, in insertion order
//! - **Frame passes**: update, predraw and draw hooks run in z order
//! - **Proximity queries**: nearest entity of a kind within a range
//! - **Dependencies**: child entities attached and removed with their parent
//! - **Region events**: pointer callbacks gated on the entity's radius
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! struct Dot {
//!     core: EntityCore,
//! }
//!
//! impl Entity for Dot {
//!     fn core(&self) -> &EntityCore {
//!         &self.core
//!     }
//!
//!     fn core_mut(&mut self) -> &mut EntityCore {
//!         &mut self.core
//!     }
//!
//!     fn update(&mut self, _scene: &mut Scene) {
//!         self.core.pos.x += 1.0;
//!     }
//! }
//!
//! fn main() -> Result<(), SceneError> {
//!     let mut scene = Scene::new();
//!     scene.add(Dot { core: EntityCore::new(TypeTag::new("dot"), Vec2::new(0.0, 0.0)) })?;
//!     scene.update();
//!     scene.draw(&mut NullRenderer);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod debug;
pub mod events;
pub mod foundation;
pub mod input;
pub mod render;
pub mod scene;
pub mod spatial;

mod application;
mod engine;

pub use application::{AppError, Application};
pub use engine::{Engine, EngineConfig, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError},
        events::{EventError, RegionEvent},
        foundation::{
            math::{constants::*, utils::*, Vec2},
            time::{FrameClock, Stopwatch},
        },
        input::{InputEvent, KeyCode, PointerState},
        render::{Color, NullRenderer, RecordingRenderer, Renderer},
        scene::{
            ClosestInfo, Entity, EntityCore, EntityId, FrameInfo, Scene, SceneConfig, SceneError,
            TurnDirection, TypeTag,
        },
        AppError, Application, Engine, EngineConfig, EngineError,
    };
}
