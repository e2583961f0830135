//! Core engine implementation
//!
//! The engine owns the frame clock and pointer state, delivers queued and
//! scheduled input, and drives an [`Application`] one frame at a time. It
//! has no window: hosts push [`InputEvent`]s and render through whatever
//! [`Renderer`](crate::render::Renderer) the application holds.

use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

use crate::{
    application::{AppError, Application},
    config::{Config, Deserialize, Serialize},
    foundation::math::Vec2,
    foundation::time::{FrameClock, Stopwatch},
    input::{InputEvent, PointerState},
    scene::{FrameInfo, SceneConfig},
};
use thiserror::Error;

/// Main engine struct
pub struct Engine {
    clock: FrameClock,
    pointer: PointerState,
    queued: VecDeque<InputEvent>,
    scheduled: BTreeMap<u64, Vec<InputEvent>>,
    config: EngineConfig,
    running: bool,
}

impl Engine {
    /// Create a new engine instance
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        log::info!("Initializing engine for '{}'...", config.title);
        config.validate()?;

        Ok(Self {
            clock: FrameClock::new(),
            pointer: PointerState::new(),
            queued: VecDeque::new(),
            scheduled: BTreeMap::new(),
            config,
            running: true,
        })
    }

    /// Run the frame loop with the given application until it quits
    pub fn run<T: Application>(config: EngineConfig, app: &mut T) -> Result<(), EngineError> {
        let mut engine = Self::new(config)?;
        engine.run_app(app)
    }

    /// Run the frame loop on an existing engine
    ///
    /// Useful when input was scheduled before the loop starts.
    pub fn run_app<T: Application>(&mut self, app: &mut T) -> Result<(), EngineError> {
        app.initialize(self)
            .map_err(|e| EngineError::ApplicationError(format!("App initialization: {e}")))?;

        log::info!("Starting main loop...");
        let stopwatch = Stopwatch::start_new();

        while self.running {
            self.step(app)?;
        }

        app.cleanup(self);

        log::info!(
            "Engine shutdown complete after {} frames ({:.1} ms)",
            self.clock.frame_count(),
            stopwatch.elapsed_millis()
        );
        Ok(())
    }

    /// Advance exactly one frame
    pub fn step<T: Application>(&mut self, app: &mut T) -> Result<(), EngineError> {
        if self.config.fixed_step_seconds > 0.0 {
            self.clock
                .tick_fixed(Duration::from_secs_f32(self.config.fixed_step_seconds));
        } else {
            self.clock.tick();
        }
        self.pointer.begin_frame();

        let frame = self.clock.frame_count();
        if let Some(events) = self.scheduled.remove(&frame) {
            self.queued.extend(events);
        }
        while let Some(event) = self.queued.pop_front() {
            self.pointer.apply(&event);
            app.handle_event(self, event)
                .map_err(|e| EngineError::ApplicationError(format!("App event: {e}")))?;
        }

        let delta_time = self.clock.delta_time();
        app.update(self, delta_time)
            .map_err(|e| EngineError::ApplicationError(format!("App update: {e}")))?;
        app.render(self)
            .map_err(|e| EngineError::ApplicationError(format!("App render: {e}")))?;

        if self.config.frame_limit.is_some_and(|limit| frame >= limit) {
            log::debug!("Frame limit {frame} reached");
            self.running = false;
        }
        Ok(())
    }

    /// Queue an input event for the next frame
    pub fn push_event(&mut self, event: InputEvent) {
        self.queued.push_back(event);
    }

    /// Deliver an input event at the start of a specific frame
    pub fn schedule_event(&mut self, frame: u64, event: InputEvent) {
        self.scheduled.entry(frame).or_default().push(event);
    }

    /// Frame counter, pointer and frame rate for the current frame
    pub fn frame_info(&self) -> FrameInfo {
        FrameInfo {
            frame: self.clock.frame_count(),
            pointer: self.pointer.position(),
            frame_rate: self.clock.current_fps(),
        }
    }

    /// Pointer state
    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    /// Frame clock
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Field size in world units
    pub fn field_size(&self) -> Vec2 {
        Vec2::new(self.config.width, self.config.height)
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Whether the loop will run another frame
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Request engine shutdown
    pub fn quit(&mut self) {
        log::info!("Engine shutdown requested");
        self.running = false;
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Application title, used in logs
    pub title: String,

    /// Field width
    pub width: f32,

    /// Field height
    pub height: f32,

    /// Seconds per frame; zero or less uses the wall clock
    pub fixed_step_seconds: f32,

    /// Stop after this many frames
    pub frame_limit: Option<u64>,

    /// Log filter used when `RUST_LOG` is unset
    pub log_filter: String,

    /// Scene settings
    pub scene: SceneConfig,
}

impl EngineConfig {
    fn validate(&self) -> Result<(), EngineError> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(EngineError::InitializationFailed(format!(
                "field size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if !self.fixed_step_seconds.is_finite() {
            return Err(EngineError::InitializationFailed(
                "fixed_step_seconds must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: "Scene Engine Application".to_string(),
            width: 1280.0,
            height: 720.0,
            fixed_step_seconds: 1.0 / 60.0,
            frame_limit: None,
            log_filter: "info".to_string(),
            scene: SceneConfig::default(),
        }
    }
}

impl Config for EngineConfig {}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Initialization error
    #[error("Engine initialization failed: {0}")]
    InitializationFailed(String),

    /// Application error
    #[error("Application error: {0}")]
    ApplicationError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<crate::config::ConfigError> for EngineError {
    fn from(err: crate::config::ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}
