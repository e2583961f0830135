//! Turret projectiles

use scene_engine::foundation::math::utils::{from_angle, map_range};
use scene_engine::foundation::math::Vec2;
use scene_engine::render::{Color, Renderer};
use scene_engine::scene::{Entity, EntityCore, Scene};

use super::BULLET;
use crate::config::FieldConfig;

const Z_INDEX: i32 = 2;
const SPAWN_RADIUS: f32 = 2.0;

/// A bullet flying in a straight line until it hits something or leaves the field
pub struct Bullet {
    core: EntityCore,
    damage: f32,
    speed: f32,
    field: FieldConfig,
}

impl Bullet {
    /// Create a bullet at `pos` heading along `angle`
    pub fn new(pos: Vec2, angle: f32, damage: f32, speed: f32, field: FieldConfig, frame: u64) -> Self {
        let core = EntityCore::new(BULLET, pos)
            .with_angle(angle)
            .with_radius(SPAWN_RADIUS)
            .with_z_index(Z_INDEX)
            .created_at(frame);

        Self {
            core,
            damage,
            speed,
            field,
        }
    }

    /// Damage dealt on impact
    pub fn damage(&self) -> f32 {
        self.damage
    }

    /// Distance travelled per frame
    pub fn speed(&self) -> f32 {
        self.speed
    }

    fn off_field(&self) -> bool {
        let (pos, radius) = (self.core.pos, self.core.radius);
        pos.x <= -radius
            || pos.x >= self.field.width + radius
            || pos.y <= -radius
            || pos.y >= self.field.height + radius
    }
}

impl Entity for Bullet {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn draw(&self, _scene: &Scene, renderer: &mut dyn Renderer) {
        renderer.fill_circle(self.core.pos, self.core.radius, Color::WHITE);
    }

    fn update(&mut self, scene: &mut Scene) {
        self.core.radius = map_range(self.damage, 1.0, 20.0, 1.0, 10.0);
        self.core.pos += from_angle(self.core.angle) * self.speed;

        if self.off_field() {
            self.core.remove(scene);
        }
    }
}
