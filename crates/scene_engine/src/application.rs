//! Application trait and lifecycle management

use crate::config::ConfigError;
use crate::engine::{Engine, EngineError};
use crate::input::{InputEvent, KeyCode};
use crate::scene::SceneError;
use thiserror::Error;

/// Application lifecycle trait
///
/// Implement this trait to drive a game with the [`Engine`] frame loop.
pub trait Application {
    /// Initialize the application
    ///
    /// Called once before the first frame. Build the initial scene here.
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError>;

    /// Update the application
    ///
    /// Called every frame after input has been delivered.
    ///
    /// # Arguments
    /// * `engine` - Mutable reference to the engine
    /// * `delta_time` - Time since last frame in seconds
    fn update(&mut self, engine: &mut Engine, delta_time: f32) -> Result<(), AppError>;

    /// Render the application
    ///
    /// Called after update.
    fn render(&mut self, _engine: &mut Engine) -> Result<(), AppError> {
        Ok(())
    }

    /// Handle an input event
    ///
    /// The engine has already folded the event into its pointer state. The
    /// default implementation quits on Escape.
    fn handle_event(&mut self, engine: &mut Engine, event: InputEvent) -> Result<(), AppError> {
        if event == InputEvent::KeyPressed(KeyCode::Escape) {
            engine.quit();
        }
        Ok(())
    }

    /// Cleanup the application
    ///
    /// Called once when the loop ends.
    fn cleanup(&mut self, engine: &mut Engine);
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Engine error propagated to application level
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Scene misuse (double attachment, unknown event)
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Custom application error
    #[error("Application error: {0}")]
    Custom(String),
}
