//! Game configuration
//!
//! Every tuning value the game uses lives here. The defaults reproduce the
//! classic field; a `td.toml` or `td.ron` file can override any subset.

use scene_engine::config::{Config, ConfigError, Deserialize, Serialize};
use scene_engine::foundation::math::Vec2;

use crate::entities::EnemyKind;

/// Game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GameConfig {
    /// Playing field
    pub field: FieldConfig,

    /// Session rules
    pub session: SessionConfig,

    /// Enemy behaviour shared by all kinds
    pub enemy: EnemyConfig,

    /// Enemy archetype table
    pub archetypes: Vec<ArchetypeConfig>,

    /// Turret defaults
    pub turret: TurretConfig,

    /// Upgrade steps and limits
    pub upgrades: UpgradeLimits,
}

/// Playing field size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Field width
    pub width: f32,

    /// Field height
    pub height: f32,
}

/// Session rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Health at the start of a session
    pub starting_health: f32,

    /// Frames between enemy spawns
    pub spawn_interval: u64,

    /// Frames between enemy scaling steps
    pub scale_interval: u64,

    /// Minimum distance between a new turret and existing ones
    pub turret_clearance: f32,

    /// Spawn only this kind instead of a random one
    pub spawn_only: Option<EnemyKind>,

    /// RNG seed; random when absent
    pub seed: Option<u64>,
}

/// Enemy behaviour shared by all kinds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Starting speed per frame
    pub speed: f32,

    /// Distance from top or bottom where enemies steer away
    pub wall_margin: f32,

    /// Largest random heading change per frame
    pub wobble: f32,

    /// Score awarded per kill
    pub kill_score: u32,
}

/// One enemy archetype
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeConfig {
    /// Which kind this row describes
    pub kind: EnemyKind,

    /// Body hue in degrees
    pub hue: f32,

    /// Radius at spawn
    pub base_radius: f32,

    /// Health at spawn
    pub base_health: f32,

    /// Radius multiplier per scaling step
    pub scale_factor: f32,

    /// Health added per scaling step
    pub health_scale_step: f32,
}

/// Turret defaults
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurretConfig {
    /// Targeting range
    pub range: f32,

    /// Turn speed cap (radians per frame)
    pub turn_speed: f32,

    /// Frames between shots
    pub fire_every: u64,

    /// Damage per bullet
    pub damage: f32,

    /// Distance ahead of a target to aim at
    pub lead: f32,

    /// Bullet speed per frame
    pub bullet_speed: f32,

    /// Frames after placement before upgrades are offered
    pub upgrade_delay: u64,

    /// Extra radius the pointer may stray before the menu closes
    pub menu_padding: f32,

    /// Distance of menu items from the turret
    pub menu_distance: f32,
}

/// Upgrade steps and clamps
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeLimits {
    /// Shortest allowed fire interval
    pub fire_every_min: u64,
    /// Longest allowed fire interval
    pub fire_every_max: u64,
    /// Turn speed added per upgrade
    pub turn_speed_step: f32,
    /// Lowest turn speed
    pub turn_speed_min: f32,
    /// Highest turn speed
    pub turn_speed_max: f32,
    /// Range added per upgrade
    pub range_step: f32,
    /// Lowest range
    pub range_min: f32,
    /// Highest range
    pub range_max: f32,
    /// Damage added per upgrade
    pub damage_step: f32,
    /// Lowest damage
    pub damage_min: f32,
    /// Highest damage
    pub damage_max: f32,
    /// Menu presses only upgrade while the turret's menu is showing
    pub require_open_menu: bool,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 600.0,
        }
    }
}

impl FieldConfig {
    /// Field size as a vector
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Whether `pos` lies on the field, edges included
    pub fn contains(&self, pos: &Vec2) -> bool {
        (0.0..=self.width).contains(&pos.x) && (0.0..=self.height).contains(&pos.y)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            starting_health: 100.0,
            spawn_interval: 30,
            scale_interval: 1000,
            turret_clearance: 100.0,
            spawn_only: None,
            seed: None,
        }
    }
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            speed: 0.05,
            wall_margin: 30.0,
            wobble: 0.01,
            kill_score: 10,
        }
    }
}

impl Default for TurretConfig {
    fn default() -> Self {
        Self {
            range: 100.0,
            turn_speed: 0.01,
            fire_every: 5,
            damage: 1.0,
            lead: 14.0,
            bullet_speed: 4.0,
            upgrade_delay: 50,
            menu_padding: 80.0,
            menu_distance: 50.0,
        }
    }
}

impl Default for UpgradeLimits {
    fn default() -> Self {
        Self {
            fire_every_min: 1,
            fire_every_max: 10,
            turn_speed_step: 0.01,
            turn_speed_min: 0.01,
            turn_speed_max: 0.1,
            range_step: 10.0,
            range_min: 50.0,
            range_max: 2000.0,
            damage_step: 1.0,
            damage_min: 1.0,
            damage_max: 2000.0,
            require_open_menu: true,
        }
    }
}

impl ArchetypeConfig {
    /// Built-in archetype for `kind`
    pub const fn builtin(kind: EnemyKind) -> Self {
        match kind {
            EnemyKind::RedGoblin => Self {
                kind,
                hue: 0.0,
                base_radius: 70.0,
                base_health: 300.0,
                scale_factor: 1.05,
                health_scale_step: 50.0,
            },
            EnemyKind::BlueOrc => Self {
                kind,
                hue: 240.0,
                base_radius: 30.0,
                base_health: 400.0,
                scale_factor: 1.25,
                health_scale_step: 60.0,
            },
            EnemyKind::GreenTroll => Self {
                kind,
                hue: 120.0,
                base_radius: 50.0,
                base_health: 550.0,
                scale_factor: 1.5,
                health_scale_step: 75.0,
            },
        }
    }
}

impl GameConfig {
    /// Archetype row for `kind`, falling back to the built-in one
    pub fn archetype(&self, kind: EnemyKind) -> ArchetypeConfig {
        self.archetypes
            .iter()
            .find(|archetype| archetype.kind == kind)
            .copied()
            .unwrap_or_else(|| ArchetypeConfig::builtin(kind))
    }

    /// Kinds eligible for spawning: every kind unless `spawn_only` narrows it
    ///
    /// `archetypes` only retunes kinds; it never removes one from the pool.
    pub fn spawnable_kinds(&self) -> Vec<EnemyKind> {
        match self.session.spawn_only {
            Some(kind) => vec![kind],
            None => EnemyKind::ALL.to_vec(),
        }
    }

    /// Reject values the game cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: &str| Err(ConfigError::Invalid(message.to_string()));

        if !(self.field.width > 0.0 && self.field.height > 0.0) {
            return invalid("field size must be positive");
        }
        if self.session.spawn_interval == 0 || self.session.scale_interval == 0 {
            return invalid("spawn and scale intervals must be at least one frame");
        }
        if self.turret.fire_every == 0 {
            return invalid("turret fire_every must be at least one frame");
        }
        let limits = &self.upgrades;
        if limits.fire_every_min == 0 || limits.fire_every_min > limits.fire_every_max {
            return invalid("fire_every limits are out of order");
        }
        if limits.turn_speed_min > limits.turn_speed_max
            || limits.range_min > limits.range_max
            || limits.damage_min > limits.damage_max
        {
            return invalid("upgrade limits are out of order");
        }
        if self
            .archetypes
            .iter()
            .any(|archetype| archetype.base_radius <= 0.0 || archetype.base_health <= 0.0)
        {
            return invalid("archetype radius and health must be positive");
        }
        Ok(())
    }
}

impl Config for GameConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.spawnable_kinds(), EnemyKind::ALL.to_vec());
        assert_eq!(config.archetype(EnemyKind::BlueOrc).base_radius, 30.0);
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let config: GameConfig = ron::from_str(
            "(session: (spawn_interval: 10, spawn_only: Some(GreenTroll)), turret: (range: 150.0))",
        )
        .unwrap();

        assert_eq!(config.session.spawn_interval, 10);
        assert_eq!(config.session.starting_health, 100.0);
        assert_eq!(config.turret.range, 150.0);
        assert_eq!(config.turret.fire_every, 5);
        assert_eq!(config.spawnable_kinds(), vec![EnemyKind::GreenTroll]);
        assert!(config.upgrades.require_open_menu);
    }

    #[test]
    fn test_menu_gate_can_be_switched_off() {
        let config: GameConfig = ron::from_str("(upgrades: (require_open_menu: false))").unwrap();
        assert!(!config.upgrades.require_open_menu);
        assert_eq!(config.upgrades.damage_step, 1.0);
    }

    #[test]
    fn test_archetype_table_overrides_builtin() {
        let mut config = GameConfig::default();
        config.archetypes.push(ArchetypeConfig {
            base_health: 10.0,
            ..ArchetypeConfig::builtin(EnemyKind::RedGoblin)
        });

        assert_eq!(config.archetype(EnemyKind::RedGoblin).base_health, 10.0);
        assert_eq!(config.archetype(EnemyKind::BlueOrc).base_health, 400.0);
        assert_eq!(config.spawnable_kinds(), EnemyKind::ALL.to_vec());
    }

    #[test]
    fn test_bad_values_are_rejected() {
        let mut config = GameConfig::default();
        config.turret.fire_every = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = GameConfig::default();
        config.upgrades.range_min = 5000.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_field_bounds_include_edges() {
        let field = FieldConfig::default();
        assert!(field.contains(&Vec2::new(0.0, 600.0)));
        assert!(!field.contains(&Vec2::new(-0.1, 10.0)));
        assert!(!field.contains(&Vec2::new(10.0, 600.1)));
    }
}
