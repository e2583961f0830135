//! Engine glue for the game

use scene_engine::input::{InputEvent, KeyCode};
use scene_engine::render::RecordingRenderer;
use scene_engine::{AppError, Application, Engine};

use crate::config::GameConfig;
use crate::session::GameSession;

/// Counters collected over a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Frames updated
    pub frames: u64,
    /// Draw commands issued by the last frame
    pub last_frame_commands: usize,
    /// Sessions started with `r`
    pub restarts: u32,
}

/// Tower defense as an engine [`Application`]
///
/// Draws into a [`RecordingRenderer`] so the game runs headless.
pub struct TowerDefenseApp {
    config: GameConfig,
    session: Option<GameSession>,
    renderer: RecordingRenderer,
    stats: RunStats,
}

impl TowerDefenseApp {
    /// Create the app; the session is built on initialize
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            session: None,
            renderer: RecordingRenderer::new(),
            stats: RunStats::default(),
        }
    }

    /// Current session, once initialized
    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    /// Run counters
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Commands recorded for the last frame
    pub fn renderer(&self) -> &RecordingRenderer {
        &self.renderer
    }

    fn session_mut(&mut self) -> Result<&mut GameSession, AppError> {
        self.session
            .as_mut()
            .ok_or_else(|| AppError::Custom("session used before initialize".to_owned()))
    }
}

impl Application for TowerDefenseApp {
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        let scene_config = engine.config().scene.clone();
        self.session = Some(GameSession::new(self.config.clone(), scene_config)?);
        log::info!("Tower defense initialized");
        Ok(())
    }

    fn update(&mut self, engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
        let frame = engine.frame_info();
        let held = engine.pointer().is_down();
        let session = self.session_mut()?;
        session.set_pointer_down(held);
        session.tick(frame)?;
        self.stats.frames += 1;
        Ok(())
    }

    fn render(&mut self, _engine: &mut Engine) -> Result<(), AppError> {
        self.renderer.clear();
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| AppError::Custom("session used before initialize".to_owned()))?;
        session.draw(&mut self.renderer);
        self.stats.last_frame_commands = self.renderer.commands().len();
        Ok(())
    }

    fn handle_event(&mut self, engine: &mut Engine, event: InputEvent) -> Result<(), AppError> {
        match event {
            InputEvent::PointerPressed => {
                let pointer = engine.pointer().position();
                self.session_mut()?.pointer_pressed(pointer)?;
            }
            InputEvent::KeyPressed(KeyCode::Char(key)) => {
                if key.eq_ignore_ascii_case(&'r') {
                    self.stats.restarts += 1;
                }
                self.session_mut()?.key_pressed(key)?;
            }
            InputEvent::KeyPressed(KeyCode::Escape) => engine.quit(),
            InputEvent::PointerMoved { .. } | InputEvent::PointerReleased => {}
        }
        Ok(())
    }

    fn cleanup(&mut self, _engine: &mut Engine) {
        if let Some(state) = self.session.as_ref().and_then(GameSession::state) {
            log::info!(
                "Final score {} with {:.0} health left after {} frames",
                state.score,
                state.health,
                self.stats.frames
            );
        }
    }
}
