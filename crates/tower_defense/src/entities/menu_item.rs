//! Turret upgrade menu

use std::fmt;
use std::str::FromStr;

use scene_engine::events::RegionEvent;
use scene_engine::foundation::math::Vec2;
use scene_engine::render::{Color, Renderer};
use scene_engine::scene::{Entity, EntityCore, EntityId, Scene};

use super::{Turret, MENU_ITEM};
use crate::config::UpgradeLimits;
use crate::error::GameError;

const RADIUS: f32 = 20.0;
const Z_INDEX: i32 = 10;
const LABEL_SIZE: f32 = 16.0;

/// Turret upgrades offered by the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Upgrade {
    /// Fire one frame sooner
    FireRate,
    /// Turn faster
    TurnSpeed,
    /// Reach farther
    Range,
    /// Hit harder
    Damage,
}

impl Upgrade {
    /// Menu order
    pub const ALL: [Self; 4] = [Self::FireRate, Self::TurnSpeed, Self::Range, Self::Damage];

    /// Icon drawn on the menu item
    pub const fn label(self) -> &'static str {
        match self {
            Self::FireRate => "\u{1f45f}",
            Self::TurnSpeed => "\u{1f6de}",
            Self::Range => "\u{1f3f9}",
            Self::Damage => "\u{2694}\u{fe0f}",
        }
    }

    /// Short name
    pub const fn name(self) -> &'static str {
        match self {
            Self::FireRate => "speed",
            Self::TurnSpeed => "turnspeed",
            Self::Range => "range",
            Self::Damage => "damage",
        }
    }
}

impl fmt::Display for Upgrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Upgrade {
    type Err = GameError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|upgrade| upgrade.name() == name)
            .ok_or_else(|| GameError::UnknownUpgrade(name.to_owned()))
    }
}

/// One button of a turret's upgrade menu
///
/// Owned by its turret as a scene dependency, so it leaves the scene with it.
pub struct MenuItem {
    core: EntityCore,
    turret: EntityId,
    upgrade: Upgrade,
}

impl MenuItem {
    /// Create a menu item for `turret` that applies `upgrade` when pressed
    pub fn new(pos: Vec2, turret: EntityId, upgrade: Upgrade, limits: UpgradeLimits, frame: u64) -> Self {
        let mut core = EntityCore::new(MENU_ITEM, pos)
            .with_radius(RADIUS)
            .with_z_index(Z_INDEX)
            .created_at(frame);

        core.on(RegionEvent::PointerPressed, move |scene, _| {
            let Some(owner) = scene.get_mut::<Turret>(turret) else {
                return;
            };
            // Hidden items still sit under the pointer
            if limits.require_open_menu && !owner.show_menu() {
                return;
            }
            owner.apply_upgrade(upgrade, &limits);
            log::info!("Upgraded {upgrade} on turret {turret}");
        });

        Self {
            core,
            turret,
            upgrade,
        }
    }

    /// Upgrade applied on press
    pub fn upgrade(&self) -> Upgrade {
        self.upgrade
    }

    /// Owning turret
    pub fn turret(&self) -> EntityId {
        self.turret
    }

    fn menu_open(&self, scene: &Scene) -> bool {
        scene.get::<Turret>(self.turret).is_some_and(Turret::show_menu)
    }
}

impl Entity for MenuItem {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn draw(&self, scene: &Scene, renderer: &mut dyn Renderer) {
        if !self.menu_open(scene) {
            return;
        }
        let shade = if self.core.mouse_over(scene, 0.0) { 80.0 } else { 40.0 };
        renderer.fill_circle(self.core.pos, self.core.radius, Color::gray(shade).with_alpha(0.5));

        let anchor = self.core.pos - Vec2::new(LABEL_SIZE, LABEL_SIZE) * 0.5;
        renderer.text(anchor, LABEL_SIZE, self.upgrade.label(), Color::WHITE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upgrade_names_parse() {
        assert_eq!("turnspeed".parse::<Upgrade>().unwrap(), Upgrade::TurnSpeed);
        assert_eq!("speed".parse::<Upgrade>().unwrap(), Upgrade::FireRate);
        assert!(matches!(
            "armor".parse::<Upgrade>(),
            Err(GameError::UnknownUpgrade(name)) if name == "armor"
        ));
    }

    #[test]
    fn test_menu_item_listens_for_presses() {
        let item = MenuItem::new(
            Vec2::zeros(),
            EntityCore::new(crate::entities::TURRET, Vec2::zeros()).id(),
            Upgrade::Range,
            UpgradeLimits::default(),
            0,
        );
        assert_eq!(item.core().type_tag(), MENU_ITEM);
        assert_eq!(item.core().listeners().count(RegionEvent::PointerPressed), 1);
        assert_eq!(item.core().z_index, 10);
    }
}
