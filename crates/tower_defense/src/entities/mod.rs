//! Game entities
//!
//! Every game object embeds an [`EntityCore`](scene_engine::scene::EntityCore)
//! and lives in the scene bucket named by one of the tags below.

mod bullet;
mod enemy;
mod menu_item;
mod turret;

pub use bullet::Bullet;
pub use enemy::{Enemy, EnemyKind};
pub use menu_item::{MenuItem, Upgrade};
pub use turret::Turret;

use nalgebra::Rotation2;
use scene_engine::foundation::math::Vec2;
use scene_engine::scene::TypeTag;

/// Bucket for enemies
pub const ENEMY: TypeTag = TypeTag::new("enemy");
/// Bucket for turrets
pub const TURRET: TypeTag = TypeTag::new("turret");
/// Bucket for bullets
pub const BULLET: TypeTag = TypeTag::new("bullet");
/// Bucket for upgrade menu items
pub const MENU_ITEM: TypeTag = TypeTag::new("menuitem");

/// Map a unit-space outline onto the field
fn place_shape(pos: Vec2, angle: f32, scale: f32, outline: &[Vec2]) -> Vec<Vec2> {
    let rotation = Rotation2::new(angle);
    outline.iter().map(|point| pos + rotation * (point * scale)).collect()
}

/// Dart-shaped hull half: nose, rear corner at `corner_angle`, and a notch
fn hull_half(corner_angle: f32, notch: f32) -> [Vec2; 3] {
    [
        Vec2::new(1.0, 0.0),
        Vec2::new(corner_angle.cos(), corner_angle.sin()),
        Vec2::new(-notch, 0.0),
    ]
}
