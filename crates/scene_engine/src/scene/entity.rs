//! Entity trait and the framework state every entity carries
//!
//! Game objects are whole polymorphic values: a struct that embeds an
//! [`EntityCore`] and implements [`Entity`] for the hooks it cares about.
//! The core holds identity, placement, listeners and the scene back-link;
//! the scene only ever talks to entities through this trait.

use std::any::Any;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::events::{EventError, ListenerFn, Listeners, RegionEvent};
use crate::foundation::math::constants::PI;
use crate::foundation::math::utils::{angle_between, map_range_clamped, normalize_angle};
use crate::foundation::math::Vec2;
use crate::render::Renderer;

use super::scene_manager::{ClosestInfo, Scene, SceneError, SceneId};

static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(1);

/// Default turn rate cap (radians per frame)
pub const DEFAULT_MAX_TURN_SPEED: f32 = 0.1;

/// Default slow-down window, as a fraction of PI
pub const DEFAULT_START_SLOWING: f32 = 0.1;

/// Process-unique entity identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    fn next() -> Self {
        Self(NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ID-{}", self.0)
    }
}

/// Kind tag selecting the scene bucket an entity lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeTag(&'static str);

impl TypeTag {
    /// Tag for entities that never picked a kind
    pub const GENERIC: Self = Self::new("generic");

    /// Create a tag from a static name
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Tag name
    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Which way a heading has to rotate to face a point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnDirection {
    /// Counter-clockwise in screen space (negative angle)
    Left,
    /// Clockwise in screen space (positive angle)
    Right,
}

/// Downcasting support for entity trait objects
pub trait AsAny: Any {
    /// Borrow as `Any`
    fn as_any(&self) -> &dyn Any;
    /// Mutably borrow as `Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Anything that can be placed in a [`Scene`]
///
/// All hooks default to no-ops. Each frame the scene calls `update` on every
/// entity in z order, then `predraw` on every entity, then `draw` on every
/// entity, so underlays from low-z entities are never painted over by a
/// higher-z entity's underlay.
pub trait Entity: AsAny {
    /// Framework state
    fn core(&self) -> &EntityCore;

    /// Mutable framework state
    fn core_mut(&mut self) -> &mut EntityCore;

    /// Background pass (range rings, shadows)
    fn predraw(&self, _scene: &Scene, _renderer: &mut dyn Renderer) {}

    /// Main draw pass
    fn draw(&self, _scene: &Scene, _renderer: &mut dyn Renderer) {}

    /// Per-frame logic: movement, combat, spawning, removal decisions
    ///
    /// While this runs the entity is checked out of the scene, so queries
    /// never return it.
    fn update(&mut self, _scene: &mut Scene) {}
}

/// Identity, placement and bookkeeping shared by every entity
pub struct EntityCore {
    id: EntityId,
    type_tag: TypeTag,
    /// Position in field coordinates
    pub pos: Vec2,
    /// Heading in radians
    pub angle: f32,
    /// Region and collision radius
    pub radius: f32,
    /// Draw and update order (ascending)
    pub z_index: i32,
    created_at: u64,
    scene: Option<SceneId>,
    pending_dependencies: Vec<Box<dyn Entity>>,
    listeners: Listeners,
}

impl EntityCore {
    /// Create a detached core with a fresh id
    pub fn new(type_tag: TypeTag, pos: Vec2) -> Self {
        Self {
            id: EntityId::next(),
            type_tag,
            pos,
            angle: 0.0,
            radius: 10.0,
            z_index: 0,
            created_at: 0,
            scene: None,
            pending_dependencies: Vec::new(),
            listeners: Listeners::new(),
        }
    }

    /// Set the initial heading
    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    /// Set the initial radius
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    /// Set the z index
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Stamp the frame the entity was built on
    pub fn created_at(mut self, frame: u64) -> Self {
        self.created_at = frame;
        self
    }

    /// Entity id
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Kind tag
    pub fn type_tag(&self) -> TypeTag {
        self.type_tag
    }

    /// Frame counter value at construction
    pub fn created_frame(&self) -> u64 {
        self.created_at
    }

    /// Frames elapsed since construction
    pub fn age(&self, current_frame: u64) -> u64 {
        current_frame.saturating_sub(self.created_at)
    }

    /// Twice the radius
    pub fn diameter(&self) -> f32 {
        self.radius * 2.0
    }

    /// Owning scene, if attached
    pub fn scene(&self) -> Option<SceneId> {
        self.scene
    }

    /// Whether the entity currently belongs to a scene
    pub fn is_attached(&self) -> bool {
        self.scene.is_some()
    }

    pub(crate) fn attach(&mut self, scene: SceneId) -> Result<(), SceneError> {
        match self.scene {
            Some(current) if current == scene => Err(SceneError::AlreadyAttached { id: self.id }),
            Some(_) => Err(SceneError::AttachedElsewhere { id: self.id }),
            None => {
                self.scene = Some(scene);
                Ok(())
            }
        }
    }

    pub(crate) fn detach(&mut self) {
        self.scene = None;
    }

    fn attached_to(&self, scene: &Scene) -> bool {
        self.scene == Some(scene.id())
    }

    // ---- Dependencies ----

    /// Queue a child entity
    ///
    /// Queued children are attached when this entity joins a scene. On an
    /// attached core they join when the entity's running `update` hook
    /// returns, or on [`Scene::flush_dependencies`]; [`Scene::add_dependency`]
    /// attaches at once. Returns whether the core is attached.
    pub fn add_dependency(&mut self, child: impl Entity) -> bool {
        self.pending_dependencies.push(Box::new(child));
        self.is_attached()
    }

    /// Drop a queued child without attaching it
    pub fn detach_dependency(&mut self, child: EntityId) {
        self.pending_dependencies.retain(|dep| dep.core().id() != child);
    }

    /// Children waiting to be attached
    pub fn pending_dependencies(&self) -> impl Iterator<Item = &dyn Entity> {
        self.pending_dependencies.iter().map(AsRef::as_ref)
    }

    pub(crate) fn take_pending_dependencies(&mut self) -> Vec<Box<dyn Entity>> {
        std::mem::take(&mut self.pending_dependencies)
    }

    // ---- Events ----

    /// Subscribe to a region event
    pub fn on(&mut self, event: RegionEvent, callback: impl Fn(&mut Scene, EntityId) + 'static) {
        let callback: ListenerFn = Rc::new(callback);
        self.listeners.add(event, callback);
    }

    /// Subscribe by event name
    pub fn on_named(
        &mut self,
        event: &str,
        callback: impl Fn(&mut Scene, EntityId) + 'static,
    ) -> Result<(), EventError> {
        let event = event.parse()?;
        self.on(event, callback);
        Ok(())
    }

    /// Remove every callback for `event`
    pub fn off(&mut self, event: RegionEvent) {
        self.listeners.clear(event);
    }

    /// Remove every callback for an event name
    pub fn off_named(&mut self, event: &str) -> Result<(), EventError> {
        self.off(event.parse()?);
        Ok(())
    }

    /// Registered listeners
    pub fn listeners(&self) -> &Listeners {
        &self.listeners
    }

    // ---- Spatial helpers ----

    /// Whether `pointer` lies strictly inside `radius + padding`
    pub fn pointer_over(&self, pointer: Vec2, padding: f32) -> bool {
        (pointer - self.pos).norm() < self.radius + padding
    }

    /// [`pointer_over`](Self::pointer_over) against the scene's current pointer
    pub fn mouse_over(&self, scene: &Scene, padding: f32) -> bool {
        self.pointer_over(scene.pointer(), padding)
    }

    /// Nearest entity of `type_tag` within `range`, excluding this one
    pub fn closest_info(&self, scene: &Scene, type_tag: TypeTag, range: f32) -> ClosestInfo {
        if !self.attached_to(scene) {
            log::warn!("{} queried a scene it does not belong to", self.id);
            return ClosestInfo::NOT_FOUND;
        }
        scene.closest_info(self.pos, type_tag, range, &[self.id])
    }

    /// Id of the nearest entity of `type_tag` within `range`
    pub fn closest(&self, scene: &Scene, type_tag: TypeTag, range: f32) -> Option<EntityId> {
        self.closest_info(scene, type_tag, range).closest
    }

    /// Nearest entity of `type_tag` if it overlaps this one
    ///
    /// Only the single nearest candidate is tested against the radius sum.
    /// A farther entity with a larger radius that does overlap is not found
    /// when a nearer, non-overlapping one exists.
    pub fn collides(&self, scene: &Scene, type_tag: TypeTag) -> Option<EntityId> {
        let info = self.closest_info(scene, type_tag, f32::INFINITY);
        let other = info.closest?;
        let other_radius = scene.entity(other)?.core().radius;
        (info.distance <= self.radius + other_radius).then_some(other)
    }

    /// Remove this entity from `scene`; no-op when detached
    pub fn remove(&self, scene: &mut Scene) -> bool {
        if !self.attached_to(scene) {
            return false;
        }
        scene.remove(self.type_tag, self.id)
    }

    // ---- Turning ----

    /// Shortest signed angle from the heading to the bearing of `target`
    ///
    /// Result lies in `(-PI, PI]`; a target directly behind yields `+PI`.
    pub fn turn_towards_diff(&self, target: &Vec2) -> f32 {
        let desired = angle_between(&self.pos, target);
        normalize_angle(desired - normalize_angle(self.angle))
    }

    /// Rotation direction towards `target`
    pub fn turn_towards_direction(&self, target: &Vec2) -> TurnDirection {
        if self.turn_towards_diff(target) > 0.0 {
            TurnDirection::Right
        } else {
            TurnDirection::Left
        }
    }

    /// Turn step towards `target`, proportional near alignment
    ///
    /// Inside `start_slowing * PI` of the target bearing the step shrinks
    /// linearly; outside it is capped at `max_turn_speed`.
    pub fn turn_towards_amount(&self, target: &Vec2, max_turn_speed: f32, start_slowing: f32) -> f32 {
        let diff = self.turn_towards_diff(target);
        let angle_range = start_slowing * PI;
        if angle_range <= 0.0 {
            return if diff == 0.0 { 0.0 } else { max_turn_speed.copysign(diff) };
        }
        map_range_clamped(diff, -angle_range, angle_range, -max_turn_speed, max_turn_speed)
    }

    /// Rotate the heading one step towards `target`
    pub fn turn_towards(&mut self, target: &Vec2, max_turn_speed: f32) {
        self.angle += self.turn_towards_amount(target, max_turn_speed, DEFAULT_START_SLOWING);
    }
}

/// Cloning copies identity but not membership: the copy starts detached and
/// queued children stay with the source core
impl Clone for EntityCore {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            type_tag: self.type_tag,
            pos: self.pos,
            angle: self.angle,
            radius: self.radius,
            z_index: self.z_index,
            created_at: self.created_at,
            scene: None,
            pending_dependencies: Vec::new(),
            listeners: self.listeners.clone(),
        }
    }
}

impl fmt::Debug for EntityCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityCore")
            .field("id", &self.id)
            .field("type_tag", &self.type_tag)
            .field("pos", &self.pos)
            .field("angle", &self.angle)
            .field("radius", &self.radius)
            .field("z_index", &self.z_index)
            .field("created_at", &self.created_at)
            .field("scene", &self.scene)
            .field("pending_dependencies", &self.pending_dependencies.len())
            .field("listeners", &self.listeners)
            .finish()
    }
}
