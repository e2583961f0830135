//! Enemies walking across the field

use std::fmt;
use std::str::FromStr;

use scene_engine::config::{Deserialize, Serialize};
use scene_engine::foundation::math::constants::QUARTER_PI;
use scene_engine::foundation::math::utils::{from_angle, map_range, map_range_clamped};
use scene_engine::foundation::math::Vec2;
use scene_engine::render::{Color, Renderer};
use scene_engine::scene::{Entity, EntityCore, Scene};

use super::{hull_half, place_shape, Bullet, BULLET, ENEMY};
use crate::config::{ArchetypeConfig, EnemyConfig, FieldConfig, GameConfig};
use crate::error::GameError;
use crate::state::{random_range, state_mut};

const Z_INDEX: i32 = 5;
const HEALTH_BAR_HALF_WIDTH: f32 = 8.0;

/// Enemy archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Large and fragile, zig-zags
    RedGoblin,
    /// Small, keeps accelerating
    BlueOrc,
    /// Tough, drifts up and down in a sine wave
    GreenTroll,
}

impl EnemyKind {
    /// All kinds
    pub const ALL: [Self; 3] = [Self::RedGoblin, Self::BlueOrc, Self::GreenTroll];

    /// Display name
    pub const fn name(self) -> &'static str {
        match self {
            Self::RedGoblin => "Red Goblin",
            Self::BlueOrc => "Blue Orc",
            Self::GreenTroll => "Green Troll",
        }
    }
}

impl fmt::Display for EnemyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EnemyKind {
    type Err = GameError;

    /// Accepts display names and snake_case, ignoring case
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let squashed: String = name
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match squashed.as_str() {
            "redgoblin" => Ok(Self::RedGoblin),
            "blueorc" => Ok(Self::BlueOrc),
            "greentroll" => Ok(Self::GreenTroll),
            _ => Err(GameError::UnknownEnemyKind(name.to_owned())),
        }
    }
}

/// An enemy heading for the right edge of the field
pub struct Enemy {
    core: EntityCore,
    kind: EnemyKind,
    archetype: ArchetypeConfig,
    behaviour: EnemyConfig,
    field: FieldConfig,
    speed: f32,
    health: f32,
    max_health: f32,
}

impl Enemy {
    /// Create an enemy from explicit tuning
    pub fn new(
        archetype: ArchetypeConfig,
        behaviour: EnemyConfig,
        field: FieldConfig,
        pos: Vec2,
        angle: f32,
        frame: u64,
    ) -> Self {
        let core = EntityCore::new(ENEMY, pos)
            .with_angle(angle)
            .with_radius(archetype.base_radius)
            .with_z_index(Z_INDEX)
            .created_at(frame);

        Self {
            core,
            kind: archetype.kind,
            archetype,
            behaviour,
            field,
            speed: behaviour.speed,
            health: archetype.base_health,
            max_health: archetype.base_health,
        }
    }

    /// Create an enemy of `kind` using the game configuration
    pub fn spawn(config: &GameConfig, kind: EnemyKind, pos: Vec2, angle: f32, frame: u64) -> Self {
        Self::new(config.archetype(kind), config.enemy, config.field, pos, angle, frame)
    }

    /// Archetype
    pub fn kind(&self) -> EnemyKind {
        self.kind
    }

    /// Remaining health
    pub fn health(&self) -> f32 {
        self.health
    }

    /// Health at full strength
    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    /// Current speed per frame
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Subtract `damage` from health
    pub fn take_damage(&mut self, damage: f32) {
        self.health -= damage;
    }

    /// Grow one scaling step: larger radius, more health
    pub fn scale(&mut self) {
        self.core.radius *= self.archetype.scale_factor;
        self.max_health += self.archetype.health_scale_step;
        self.health += self.archetype.health_scale_step;
    }

    /// Point `dist` ahead along the current heading
    pub fn lead_by_pos(&self, dist: f32) -> Vec2 {
        self.core.pos + from_angle(self.core.angle) * dist
    }

    fn advance(&mut self) {
        self.core.pos += from_angle(self.core.angle) * self.speed;
    }

    fn apply_kind_movement(&mut self, frame: u64) {
        let phase = (frame as f32 * 0.05).sin();
        match self.kind {
            EnemyKind::RedGoblin => self.core.angle += phase * 0.01,
            EnemyKind::BlueOrc => self.speed += 0.001,
            EnemyKind::GreenTroll => self.core.pos.y += phase * 0.5,
        }
    }

    fn steer(&mut self, scene: &mut Scene) {
        let margin = self.behaviour.wall_margin;
        let wobble = self.behaviour.wobble;
        let turn = if self.core.pos.y > self.field.height - margin {
            random_range(scene, -2.0 * wobble, 0.0)
        } else if self.core.pos.y < margin {
            random_range(scene, 0.0, 2.0 * wobble)
        } else {
            random_range(scene, -wobble, wobble)
        };
        // Never turn back towards the spawn edge
        self.core.angle = (self.core.angle + turn).clamp(-QUARTER_PI, QUARTER_PI);
    }

    fn color(&self, lightness: f32) -> Color {
        Color::hsl(self.archetype.hue, 80.0, lightness)
    }

    fn draw_health_bar(&self, renderer: &mut dyn Renderer) {
        if self.health >= self.max_health {
            return;
        }
        let y = self.core.pos.y - self.core.diameter() * 1.2;
        let start = Vec2::new(self.core.pos.x - HEALTH_BAR_HALF_WIDTH, y);
        let end = Vec2::new(self.core.pos.x + HEALTH_BAR_HALF_WIDTH, y);
        renderer.line(start, end, 2.0, Color::WHITE.with_alpha(0.5));

        let fraction = self.health / self.max_health;
        let hue = map_range(fraction, 0.0, 1.0, 0.0, 120.0);
        let fill_x = map_range_clamped(
            self.health,
            0.0,
            self.max_health,
            -HEALTH_BAR_HALF_WIDTH,
            HEALTH_BAR_HALF_WIDTH,
        );
        let fill_end = Vec2::new(self.core.pos.x + fill_x, y);
        renderer.line(start, fill_end, 2.0, Color::hsl(hue, 80.0, 40.0).with_alpha(0.8));
    }

    fn kind_marker(&self) -> Vec<Vec2> {
        match self.kind {
            EnemyKind::RedGoblin => hull_half(QUARTER_PI * 5.0, 0.5).to_vec(),
            EnemyKind::BlueOrc => vec![
                Vec2::new(-0.75, -0.75),
                Vec2::new(0.75, -0.75),
                Vec2::new(0.75, 0.75),
                Vec2::new(-0.75, 0.75),
            ],
            EnemyKind::GreenTroll => vec![
                Vec2::new(0.0, -1.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(-1.0, 1.0),
            ],
        }
    }
}

impl Entity for Enemy {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn draw(&self, _scene: &Scene, renderer: &mut dyn Renderer) {
        self.draw_health_bar(renderer);

        let (pos, angle, radius) = (self.core.pos, self.core.angle, self.core.radius);
        let left = place_shape(pos, angle, radius, &hull_half(QUARTER_PI * 5.0, 0.5));
        let right = place_shape(pos, angle, radius, &hull_half(QUARTER_PI * 3.0, 0.5));
        renderer.fill_polygon(&left, self.color(40.0));
        renderer.fill_polygon(&right, self.color(50.0));

        let marker = place_shape(pos, angle, radius * 0.4, &self.kind_marker());
        renderer.fill_polygon(&marker, self.color(30.0));
    }

    fn update(&mut self, scene: &mut Scene) {
        self.apply_kind_movement(scene.frame());
        // Drift along the old heading, then steer and step again
        self.advance();
        self.steer(scene);
        self.advance();

        if let Some(bullet_id) = self.core.collides(scene, BULLET) {
            let damage = scene.get::<Bullet>(bullet_id).map_or(0.0, Bullet::damage);
            self.take_damage(damage);
            scene.remove(BULLET, bullet_id);
        }

        if self.health <= 0.0 {
            if let Some(state) = state_mut(scene) {
                state.score += self.behaviour.kill_score;
            }
            log::debug!("{} {} destroyed", self.kind, self.core.id());
            self.core.remove(scene);
            return;
        }

        if self.core.pos.x >= self.field.width + self.core.radius {
            if let Some(state) = state_mut(scene) {
                state.health -= self.health;
            }
            log::debug!("{} {} leaked with {:.0} health", self.kind, self.core.id(), self.health);
            self.core.remove(scene);
        }
    }
}
