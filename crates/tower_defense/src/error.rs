//! Game errors

use scene_engine::config::ConfigError;
use scene_engine::scene::SceneError;
use scene_engine::AppError;
use thiserror::Error;

/// Game-level errors
#[derive(Error, Debug)]
pub enum GameError {
    /// Upgrade name outside the known set
    #[error("Unknown upgrade type {0}")]
    UnknownUpgrade(String),

    /// Enemy kind name outside the known set
    #[error("Unknown enemy kind {0}")]
    UnknownEnemyKind(String),

    /// Session data missing from the scene
    #[error("Scene is missing session data: {0}")]
    MissingState(&'static str),

    /// Scene misuse
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Configuration could not be loaded or is invalid
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl From<GameError> for AppError {
    fn from(err: GameError) -> Self {
        match err {
            GameError::Scene(err) => Self::Scene(err),
            GameError::Config(err) => Self::Config(err),
            other => Self::Custom(other.to_string()),
        }
    }
}
