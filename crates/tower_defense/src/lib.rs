//! # Tower Defense
//!
//! Enemies march from the left edge to the right. Turrets placed with the
//! pointer track and shoot them; every enemy that gets through costs its
//! remaining health. Built on [`scene_engine`].
//!
//! ## Layout
//!
//! - [`entities`]: enemies, turrets, bullets and upgrade menu items
//! - [`session`]: spawning, scaling, placement, restart and game over rules
//! - [`hud`]: health bar, score and banner drawing
//! - [`app`]: the [`scene_engine::Application`] driving a session

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::cast_precision_loss)]

pub mod app;
pub mod config;
pub mod entities;
pub mod error;
pub mod hud;
pub mod session;
pub mod state;

pub use app::{RunStats, TowerDefenseApp};
pub use config::GameConfig;
pub use error::GameError;
pub use session::GameSession;
pub use state::GameState;
