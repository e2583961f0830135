//! One game session: the scene plus the rules that run around it
//!
//! The session owns the [`Scene`] and drives it a frame at a time. Enemies
//! spawn on a fixed cadence, grow on a slower one, and the session ends when
//! the shared health runs out. Pressing `r` throws the scene away and builds a
//! fresh one.

use rand::seq::SliceRandom;
use scene_engine::events::RegionEvent;
use scene_engine::foundation::math::constants::QUARTER_PI;
use scene_engine::foundation::math::Vec2;
use scene_engine::render::Renderer;
use scene_engine::scene::{Entity, EntityId, FrameInfo, Scene, SceneConfig};

use crate::config::GameConfig;
use crate::entities::{Enemy, EnemyKind, Turret, ENEMY, TURRET};
use crate::error::GameError;
use crate::hud;
use crate::state::{random_range, state_mut, GameRng, GameState};

/// Gap kept between spawned enemies and the top and bottom edges
const SPAWN_EDGE_GAP: f32 = 10.0;

/// A running game
pub struct GameSession {
    config: GameConfig,
    scene_config: SceneConfig,
    scene: Scene,
    pointer_down: bool,
}

impl GameSession {
    /// Validate `config` and build the first scene
    pub fn new(config: GameConfig, scene_config: SceneConfig) -> Result<Self, GameError> {
        config.validate()?;
        let rng = GameRng::new(config.session.seed);
        let scene = Self::build_scene(&config, &scene_config, rng, FrameInfo::default())?;
        log::info!(
            "New session on a {}x{} field",
            config.field.width,
            config.field.height
        );

        Ok(Self {
            config,
            scene_config,
            scene,
            pointer_down: false,
        })
    }

    fn build_scene(
        config: &GameConfig,
        scene_config: &SceneConfig,
        rng: GameRng,
        frame: FrameInfo,
    ) -> Result<Scene, GameError> {
        let mut scene = Scene::with_config(scene_config.clone())
            .with_data(GameState::new(config.session.starting_health))
            .with_data(rng);
        scene.begin_frame(frame);

        let field = config.field;
        let pos = Vec2::new(field.width * 2.0 / 3.0, field.height * 0.5);
        scene.add(Turret::new(pos, config, frame.frame))?;
        Ok(scene)
    }

    /// Replace the scene with a fresh one; the random stream carries on
    pub fn restart(&mut self) -> Result<(), GameError> {
        let rng = self
            .scene
            .data_mut()
            .remove::<GameRng>()
            .unwrap_or_else(|| GameRng::new(self.config.session.seed));
        let frame = self.scene.frame_info();
        self.scene = Self::build_scene(&self.config, &self.scene_config, rng, frame)?;
        log::info!("Session restarted at frame {}", frame.frame);
        Ok(())
    }

    /// Advance the session by one frame
    ///
    /// After the update pass, hover listeners fire for the pointer's position,
    /// then held-button listeners if the button is down. Once the game is over
    /// the scene stays frozen until [`restart`](Self::restart).
    pub fn tick(&mut self, frame: FrameInfo) -> Result<(), GameError> {
        self.scene.begin_frame(frame);
        if self.check_game_over()? {
            return Ok(());
        }

        self.scene.update();
        self.scene.execute_listeners(RegionEvent::PointerOver);
        if self.pointer_down {
            self.scene.execute_listeners(RegionEvent::PointerDown);
        }

        let session = self.config.session.clone();
        if frame.frame % session.scale_interval == 0 {
            self.scale_enemies();
        }
        if frame.frame % session.spawn_interval == 0 {
            self.spawn_enemy(session.spawn_only)?;
        }
        self.refresh_placement();
        Ok(())
    }

    fn check_game_over(&mut self) -> Result<bool, GameError> {
        let state = state_mut(&mut self.scene).ok_or(GameError::MissingState("GameState"))?;
        let was_over = state.game_over;
        let over = state.check_game_over();
        if over && !was_over {
            log::info!("Game over with score {}", state.score);
        }
        Ok(over)
    }

    /// Handle a pointer press at `pointer`: place a turret if allowed, then
    /// dispatch the press to entity listeners
    pub fn pointer_pressed(&mut self, pointer: Vec2) -> Result<(), GameError> {
        self.scene.set_pointer(pointer);
        self.refresh_placement();

        let state = self.state().ok_or(GameError::MissingState("GameState"))?;
        if !state.game_over && state.can_add_turret_at_pointer {
            let turret = Turret::new(pointer, &self.config, self.scene.frame());
            let id = self.scene.add(turret)?;
            log::info!("Placed turret {id} at ({:.0}, {:.0})", pointer.x, pointer.y);
            self.refresh_placement();
        }

        self.scene.execute_listeners(RegionEvent::PointerPressed);
        Ok(())
    }

    /// Record whether the pointer button is held
    pub fn set_pointer_down(&mut self, down: bool) {
        self.pointer_down = down;
    }

    /// Whether the pointer button is held
    pub fn pointer_down(&self) -> bool {
        self.pointer_down
    }

    /// Handle a key press; `r` restarts
    pub fn key_pressed(&mut self, key: char) -> Result<(), GameError> {
        if key.eq_ignore_ascii_case(&'r') {
            self.restart()?;
        }
        Ok(())
    }

    /// Whether a turret could go at `pos`: on the field and clear of other turrets
    pub fn can_place_turret(&self, pos: Vec2) -> bool {
        self.config.field.contains(&pos)
            && self
                .scene
                .closest(pos, TURRET, self.config.session.turret_clearance, &[])
                .is_none()
    }

    fn refresh_placement(&mut self) {
        let allowed = self.can_place_turret(self.scene.pointer());
        if let Some(state) = state_mut(&mut self.scene) {
            state.can_add_turret_at_pointer = allowed;
        }
    }

    /// Spawn an enemy at the left edge, of `kind` or a random spawnable kind
    pub fn spawn_enemy(&mut self, kind: Option<EnemyKind>) -> Result<EntityId, GameError> {
        let kind = match kind {
            Some(kind) => kind,
            None => {
                let kinds = self.config.spawnable_kinds();
                let GameRng(rng) = self
                    .scene
                    .data_mut()
                    .get_mut::<GameRng>()
                    .ok_or(GameError::MissingState("GameRng"))?;
                *kinds
                    .choose(rng)
                    .ok_or_else(|| GameError::UnknownEnemyKind("<none>".to_owned()))?
            }
        };

        let archetype = self.config.archetype(kind);
        let height = self.config.field.height;
        let y = random_range(&mut self.scene, SPAWN_EDGE_GAP, height - SPAWN_EDGE_GAP);
        let angle = random_range(&mut self.scene, -QUARTER_PI, QUARTER_PI);
        let pos = Vec2::new(-archetype.base_radius, y);

        let enemy = Enemy::spawn(&self.config, kind, pos, angle, self.scene.frame());
        let id = self.scene.add(enemy)?;
        log::debug!("Spawned {kind} {id} at y={y:.0}");
        Ok(id)
    }

    /// Grow every enemy one scaling step
    pub fn scale_enemies(&mut self) {
        let enemies = self.scene.objs_by_type(ENEMY);
        log::debug!("Scaling {} enemies", enemies.len());
        for id in enemies {
            if let Some(enemy) = self.scene.get_mut::<Enemy>(id) {
                enemy.scale();
            }
        }
    }

    /// Session state
    pub fn state(&self) -> Option<&GameState> {
        self.scene.data().get::<GameState>()
    }

    /// Whether the session has ended
    pub fn is_game_over(&self) -> bool {
        self.state().is_some_and(|state| state.game_over)
    }

    /// The scene
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The scene, mutably
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Game configuration
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Draw the scene and the HUD
    pub fn draw(&mut self, renderer: &mut dyn Renderer) {
        let field = self.config.field;
        let pointer = self.scene.pointer();

        if self.is_game_over() {
            self.scene.draw(renderer);
            hud::draw_game_over(renderer, &field, pointer);
            return;
        }

        let preview = self
            .state()
            .is_some_and(|state| state.can_add_turret_at_pointer)
            .then(|| Turret::new(pointer, &self.config, self.scene.frame()));

        if let Some(turret) = &preview {
            turret.predraw(&self.scene, renderer);
        }
        self.scene.draw(renderer);
        if let Some(turret) = &preview {
            turret.draw(&self.scene, renderer);
        }

        if let Some(state) = self.state() {
            hud::draw_health_bar(renderer, &field, state, self.config.session.starting_health);
            hud::draw_score(renderer, state);
        }
    }
}
