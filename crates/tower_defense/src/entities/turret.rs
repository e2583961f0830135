//! Player turrets

use scene_engine::foundation::math::constants::{PI, QUARTER_PI};
use scene_engine::foundation::math::utils::{from_angle, map_range, map_range_clamped};
use scene_engine::foundation::math::Vec2;
use scene_engine::render::{Color, Renderer};
use scene_engine::scene::{Entity, EntityCore, Scene};

use super::{hull_half, place_shape, Bullet, Enemy, MenuItem, Upgrade, ENEMY, TURRET};
use crate::config::{FieldConfig, GameConfig, TurretConfig, UpgradeLimits};

const Z_INDEX: i32 = 1;
const BASE_RADIUS: f32 = 10.0;

/// A rotating turret that shoots the nearest enemy in range
pub struct Turret {
    core: EntityCore,
    show_menu: bool,
    turn_speed: f32,
    fire_every: u64,
    damage: f32,
    range: f32,
    settings: TurretConfig,
    field: FieldConfig,
}

impl Turret {
    /// Create a turret at `pos` with its upgrade menu queued as dependencies
    pub fn new(pos: Vec2, config: &GameConfig, frame: u64) -> Self {
        let settings = config.turret;
        let mut core = EntityCore::new(TURRET, pos)
            .with_angle(PI)
            .with_radius(BASE_RADIUS)
            .with_z_index(Z_INDEX)
            .created_at(frame);

        let id = core.id();
        let slots = Upgrade::ALL.len() as f32;
        for (i, upgrade) in Upgrade::ALL.into_iter().enumerate() {
            let a = map_range(i as f32, -1.0, slots, -PI - QUARTER_PI, QUARTER_PI);
            let item_pos = pos + from_angle(a) * settings.menu_distance;
            core.add_dependency(MenuItem::new(item_pos, id, upgrade, config.upgrades, frame));
        }

        Self {
            core,
            show_menu: false,
            turn_speed: settings.turn_speed,
            fire_every: settings.fire_every,
            damage: settings.damage,
            range: settings.range,
            settings,
            field: config.field,
        }
    }

    /// Whether the upgrade menu is open
    pub fn show_menu(&self) -> bool {
        self.show_menu
    }

    /// Turn speed cap in radians per frame
    pub fn turn_speed(&self) -> f32 {
        self.turn_speed
    }

    /// Frames between shots
    pub fn fire_every(&self) -> u64 {
        self.fire_every
    }

    /// Damage per bullet
    pub fn damage(&self) -> f32 {
        self.damage
    }

    /// Targeting range
    pub fn range(&self) -> f32 {
        self.range
    }

    /// Attached to `scene` and old enough to offer upgrades
    pub fn can_upgrade(&self, scene: &Scene) -> bool {
        self.core.scene() == Some(scene.id())
            && self.core.age(scene.frame()) >= self.settings.upgrade_delay
    }

    /// Apply one upgrade step, clamped to `limits`
    pub fn apply_upgrade(&mut self, upgrade: Upgrade, limits: &UpgradeLimits) {
        match upgrade {
            Upgrade::FireRate => {
                self.fire_every = self
                    .fire_every
                    .saturating_sub(1)
                    .clamp(limits.fire_every_min, limits.fire_every_max);
            }
            Upgrade::TurnSpeed => {
                self.turn_speed = (self.turn_speed + limits.turn_speed_step)
                    .clamp(limits.turn_speed_min, limits.turn_speed_max);
            }
            Upgrade::Range => {
                self.range = (self.range + limits.range_step).clamp(limits.range_min, limits.range_max);
            }
            Upgrade::Damage => {
                self.damage =
                    (self.damage + limits.damage_step).clamp(limits.damage_min, limits.damage_max);
            }
        }
    }

    /// Point on the hull where bullets leave
    pub fn tip_pos(&self) -> Vec2 {
        self.core.pos + from_angle(self.core.angle) * self.core.radius
    }

    fn shoot(&self, scene: &mut Scene) {
        let bullet = Bullet::new(
            self.tip_pos(),
            self.core.angle,
            self.damage,
            self.settings.bullet_speed,
            self.field,
            scene.frame(),
        );
        if let Err(err) = scene.add(bullet) {
            log::error!("Turret {} failed to fire: {err}", self.core.id());
        }
    }
}

impl Entity for Turret {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn predraw(&self, _scene: &Scene, renderer: &mut dyn Renderer) {
        renderer.fill_circle(self.core.pos, self.range, Color::gray(14.0));
    }

    fn draw(&self, _scene: &Scene, renderer: &mut dyn Renderer) {
        let (pos, angle, radius) = (self.core.pos, self.core.angle, self.core.radius);
        let notch = map_range_clamped(self.fire_every as f32, 3.0, 20.0, 0.25, 1.0);

        let left_shade = map_range_clamped(self.turn_speed, 0.01, 0.1, 80.0, 30.0);
        let left = place_shape(pos, angle, radius, &hull_half(QUARTER_PI * 5.0, notch));
        renderer.fill_polygon(&left, Color::gray(left_shade));

        let right = place_shape(pos, angle, radius, &hull_half(QUARTER_PI * 3.0, notch));
        renderer.fill_polygon(&right, Color::gray(80.0));
    }

    fn update(&mut self, scene: &mut Scene) {
        self.core.radius = map_range(self.damage, 1.0, 20.0, 10.0, 40.0);

        let target = self
            .core
            .closest(scene, ENEMY, self.range)
            .and_then(|id| scene.get::<Enemy>(id))
            .map(|enemy| enemy.lead_by_pos(self.settings.lead));
        if let Some(target) = target {
            self.core.turn_towards(&target, self.turn_speed);
            if scene.frame() % self.fire_every == 0 {
                self.shoot(scene);
            }
        }

        let can_upgrade = self.can_upgrade(scene);
        if can_upgrade && self.core.mouse_over(scene, 0.0) {
            self.show_menu = true;
        } else if !can_upgrade || !self.core.mouse_over(scene, self.settings.menu_padding) {
            self.show_menu = false;
        }
    }
}
