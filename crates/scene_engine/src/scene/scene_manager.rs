//! Scene: entity registry and frame driver
//!
//! A scene owns every live entity in a slotmap arena. Kind buckets keep arena
//! keys in insertion order, which is the order nearest-neighbour ties are
//! resolved in. Removal marks a slot as a tombstone and unlinks its id at once;
//! the arena and buckets are compacted at the start of the next update.
//!
//! During the update pass each entity is checked out of its slot while its
//! hook runs, which lets the hook take `&mut Scene` and add, remove or query
//! other entities freely.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::{Config, Deserialize, Serialize};
use crate::debug::overlay::DEFAULT_FRAME_RATE_SAMPLES;
use crate::debug::{DebugFlags, DebugOverlay};
use crate::events::{EventError, RegionEvent};
use crate::foundation::collections::{EntityArena, EntityKey};
use crate::foundation::math::Vec2;
use crate::render::Renderer;
use crate::spatial;

use super::data::DataBag;
use super::entity::{Entity, EntityId, TypeTag};

static NEXT_SCENE_ID: AtomicU64 = AtomicU64::new(1);

/// Handle identifying a scene, stored by attached entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneId(u64);

impl SceneId {
    fn next() -> Self {
        Self(NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Scene errors
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The entity is already attached to this scene
    #[error("Entity {id} was already added to the scene")]
    AlreadyAttached {
        /// Offending entity
        id: EntityId,
    },

    /// The entity is attached to a different scene
    #[error("Entity {id} belongs to another scene")]
    AttachedElsewhere {
        /// Offending entity
        id: EntityId,
    },

    /// No live entity with this id
    #[error("Unknown entity {0}")]
    UnknownEntity(EntityId),

    /// Event subscription failed
    #[error(transparent)]
    Event(#[from] EventError),
}

/// Result of a nearest-neighbour query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestInfo {
    /// Nearest entity, if one was found within range
    pub closest: Option<EntityId>,
    /// Distance to it, or infinity when nothing was found
    pub distance: f32,
}

impl ClosestInfo {
    /// Nothing found
    pub const NOT_FOUND: Self = Self {
        closest: None,
        distance: f32::INFINITY,
    };

    /// Whether an entity was found
    pub fn is_found(&self) -> bool {
        self.closest.is_some()
    }
}

/// Per-frame input supplied by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    /// Monotonic frame counter
    pub frame: u64,
    /// Pointer position in field coordinates
    pub pointer: Vec2,
    /// Instantaneous frame rate sample
    pub frame_rate: f32,
}

impl Default for FrameInfo {
    fn default() -> Self {
        Self {
            frame: 0,
            pointer: Vec2::zeros(),
            frame_rate: 0.0,
        }
    }
}

/// Scene configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Draw the rolling average frame rate
    pub show_frame_rate: bool,

    /// Draw the live entity count
    pub show_entity_count: bool,

    /// Number of frame-rate samples averaged
    pub frame_rate_samples: usize,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            show_frame_rate: false,
            show_entity_count: false,
            frame_rate_samples: DEFAULT_FRAME_RATE_SAMPLES,
        }
    }
}

impl Config for SceneConfig {}

struct Slot {
    /// `None` while checked out for its update hook
    entity: Option<Box<dyn Entity>>,
    id: EntityId,
    type_tag: TypeTag,
    seq: u64,
    dependencies: Vec<EntityId>,
    removed: bool,
}

/// Registry of live entities grouped by kind
pub struct Scene {
    id: SceneId,
    config: SceneConfig,
    arena: EntityArena<Slot>,
    index: HashMap<EntityId, EntityKey>,
    buckets: HashMap<TypeTag, Vec<EntityKey>>,
    type_tags: Vec<TypeTag>,
    next_seq: u64,
    tombstones: usize,
    updating: bool,
    frame: FrameInfo,
    data: DataBag,
    debug: DebugOverlay,
}

impl Scene {
    /// Create an empty scene with default configuration
    pub fn new() -> Self {
        Self::with_config(SceneConfig::default())
    }

    /// Create an empty scene
    pub fn with_config(config: SceneConfig) -> Self {
        let mut flags = DebugFlags::empty();
        flags.set(DebugFlags::FRAME_RATE, config.show_frame_rate);
        flags.set(DebugFlags::ENTITY_COUNT, config.show_entity_count);
        let debug = DebugOverlay::new(flags, config.frame_rate_samples);

        let id = SceneId::next();
        log::debug!("Created scene {id:?}");

        Self {
            id,
            config,
            arena: EntityArena::with_key(),
            index: HashMap::new(),
            buckets: HashMap::new(),
            type_tags: Vec::new(),
            next_seq: 0,
            tombstones: 0,
            updating: false,
            frame: FrameInfo::default(),
            data: DataBag::new(),
            debug,
        }
    }

    /// Seed the data bag with a value
    pub fn with_data<T: 'static>(mut self, value: T) -> Self {
        self.data.insert(value);
        self
    }

    /// Scene handle
    pub fn id(&self) -> SceneId {
        self.id
    }

    /// Active configuration
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    // ---- Frame input ----

    /// Record the host's input for the coming frame
    pub fn begin_frame(&mut self, frame: FrameInfo) {
        self.frame = frame;
    }

    /// Current frame counter
    pub fn frame(&self) -> u64 {
        self.frame.frame
    }

    /// Current pointer position
    pub fn pointer(&self) -> Vec2 {
        self.frame.pointer
    }

    /// Move the pointer without starting a new frame
    pub fn set_pointer(&mut self, pointer: Vec2) {
        self.frame.pointer = pointer;
    }

    /// Input recorded by the last [`begin_frame`](Self::begin_frame)
    pub fn frame_info(&self) -> FrameInfo {
        self.frame
    }

    // ---- Shared data ----

    /// Shared state bag
    pub fn data(&self) -> &DataBag {
        &self.data
    }

    /// Mutable shared state bag
    pub fn data_mut(&mut self) -> &mut DataBag {
        &mut self.data
    }

    // ---- Debug toggles ----

    /// Show or hide the frame-rate readout
    pub fn set_debug_show_frame_rate(&mut self, enabled: bool) {
        self.debug.set(DebugFlags::FRAME_RATE, enabled);
    }

    /// Show or hide the entity-count readout
    pub fn set_debug_show_entity_count(&mut self, enabled: bool) {
        self.debug.set(DebugFlags::ENTITY_COUNT, enabled);
    }

    /// Enabled debug readouts
    pub fn debug_flags(&self) -> DebugFlags {
        self.debug.flags()
    }

    // ---- Membership ----

    /// Attach an entity and its queued dependencies
    pub fn add<E: Entity>(&mut self, entity: E) -> Result<EntityId, SceneError> {
        self.add_boxed(Box::new(entity))
    }

    /// Attach a boxed entity and its queued dependencies
    ///
    /// Fails if the entity already belongs to this or another scene. The
    /// entity is appended to the bucket of its type tag, creating the bucket
    /// on first use.
    pub fn add_boxed(&mut self, mut entity: Box<dyn Entity>) -> Result<EntityId, SceneError> {
        let id = entity.core().id();
        if self.index.contains_key(&id) {
            return Err(SceneError::AlreadyAttached { id });
        }
        entity.core_mut().attach(self.id)?;

        let children = entity.core_mut().take_pending_dependencies();
        let type_tag = entity.core().type_tag();
        let seq = self.next_seq;
        self.next_seq += 1;

        let key = self.arena.insert(Slot {
            entity: Some(entity),
            id,
            type_tag,
            seq,
            dependencies: Vec::new(),
            removed: false,
        });
        self.index.insert(id, key);
        self.bucket_mut(type_tag).push(key);
        log::debug!("Added {type_tag} {id}");

        self.attach_children(key, children)?;
        Ok(id)
    }

    /// Detach an entity and, transitively, its dependencies
    ///
    /// Returns `false` without doing anything when no live entity of
    /// `type_tag` has this id. Safe to call from inside update hooks and
    /// listener callbacks: the entity is skipped for the rest of the frame.
    pub fn remove(&mut self, type_tag: TypeTag, id: EntityId) -> bool {
        match self.unlink(type_tag, id) {
            Some(Some(entity)) => {
                let queued = entity.core().pending_dependencies().count();
                if queued > 0 {
                    log::warn!("Dropped {queued} queued dependencies of removed {type_tag} {id}");
                }
                true
            }
            Some(None) => true,
            None => false,
        }
    }

    /// Remove an entity like [`remove`](Self::remove) and hand it back detached
    ///
    /// The returned entity can be added to this or another scene again, along
    /// with any children still queued on its core. Its attached dependencies
    /// are removed, not returned. Yields `None` when nothing matches, and for
    /// an entity whose update hook is running (it is still removed).
    pub fn take(&mut self, type_tag: TypeTag, id: EntityId) -> Option<Box<dyn Entity>> {
        self.unlink(type_tag, id).flatten()
    }

    fn unlink(&mut self, type_tag: TypeTag, id: EntityId) -> Option<Option<Box<dyn Entity>>> {
        let &key = self.index.get(&id)?;
        let slot = self.arena.get_mut(key)?;
        if slot.removed || slot.type_tag != type_tag {
            return None;
        }

        slot.removed = true;
        let dependencies = std::mem::take(&mut slot.dependencies);
        let entity = slot.entity.take().map(|mut entity| {
            entity.core_mut().detach();
            entity
        });
        self.index.remove(&id);
        self.tombstones += 1;
        log::debug!("Removed {type_tag} {id} ({} dependencies)", dependencies.len());

        for dependency in dependencies {
            if let Some(dependency_tag) = self.type_tag_of(dependency) {
                self.remove(dependency_tag, dependency);
            }
        }
        Some(entity)
    }

    /// Detach an entity by id alone
    pub fn remove_entity(&mut self, id: EntityId) -> bool {
        self.type_tag_of(id)
            .is_some_and(|type_tag| self.remove(type_tag, id))
    }

    /// Whether a live entity has this id
    pub fn contains(&self, id: EntityId) -> bool {
        self.index.contains_key(&id)
    }

    // ---- Dependencies ----

    /// Attach `child` right away and register it as a dependency of `parent`
    ///
    /// This is the immediate counterpart of [`EntityCore::add_dependency`],
    /// which only queues the child on the parent's core.
    pub fn add_dependency<E: Entity>(&mut self, parent: EntityId, child: E) -> Result<EntityId, SceneError> {
        self.add_dependency_boxed(parent, Box::new(child))
    }

    /// Boxed form of [`add_dependency`](Self::add_dependency)
    pub fn add_dependency_boxed(&mut self, parent: EntityId, child: Box<dyn Entity>) -> Result<EntityId, SceneError> {
        let key = *self.index.get(&parent).ok_or(SceneError::UnknownEntity(parent))?;
        let child_id = self.add_boxed(child)?;
        if let Some(slot) = self.arena.get_mut(key) {
            slot.dependencies.push(child_id);
        }
        Ok(child_id)
    }

    /// Attach the children queued on the core of a live entity
    ///
    /// Children queued from inside an entity's own update hook are attached
    /// when the hook returns. Call this after queueing through
    /// [`entity_mut`](Self::entity_mut) or [`get_mut`](Self::get_mut) to have
    /// them join the scene immediately. Returns how many were attached.
    pub fn flush_dependencies(&mut self, parent: EntityId) -> Result<usize, SceneError> {
        let key = *self.index.get(&parent).ok_or(SceneError::UnknownEntity(parent))?;
        let children = match self.arena.get_mut(key).and_then(|slot| slot.entity.as_mut()) {
            Some(entity) => entity.core_mut().take_pending_dependencies(),
            // Checked out; its check-in attaches them
            None => return Ok(0),
        };
        let count = children.len();
        self.attach_children(key, children)?;
        Ok(count)
    }

    /// Forget that `child` depends on `parent`; the child stays attached
    pub fn detach_dependency(&mut self, parent: EntityId, child: EntityId) -> bool {
        let Some(slot) = self.slot_mut(parent) else {
            return false;
        };
        let before = slot.dependencies.len();
        slot.dependencies.retain(|&dependency| dependency != child);
        slot.dependencies.len() != before
    }

    /// Remove every dependency of `parent` from the scene
    pub fn remove_dependencies(&mut self, parent: EntityId) {
        let Some(slot) = self.slot_mut(parent) else {
            return;
        };
        for dependency in std::mem::take(&mut slot.dependencies) {
            self.remove_entity(dependency);
        }
    }

    /// Ids of the dependencies of `parent`, in registration order
    pub fn dependencies(&self, parent: EntityId) -> &[EntityId] {
        self.index
            .get(&parent)
            .and_then(|&key| self.arena.get(key))
            .map(|slot| slot.dependencies.as_slice())
            .unwrap_or_default()
    }

    // ---- Lookup ----

    /// Borrow a live entity
    ///
    /// Returns `None` for the entity whose update hook is running.
    pub fn entity(&self, id: EntityId) -> Option<&dyn Entity> {
        let &key = self.index.get(&id)?;
        self.arena.get(key)?.entity.as_deref()
    }

    /// Mutably borrow a live entity
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut dyn Entity> {
        let entity = self.slot_mut(id)?.entity.as_mut()?;
        Some(&mut **entity)
    }

    /// Borrow a live entity as its concrete type
    pub fn get<T: Entity>(&self, id: EntityId) -> Option<&T> {
        self.entity(id)?.as_any().downcast_ref()
    }

    /// Mutably borrow a live entity as its concrete type
    pub fn get_mut<T: Entity>(&mut self, id: EntityId) -> Option<&mut T> {
        self.entity_mut(id)?.as_any_mut().downcast_mut()
    }

    /// Ids of the live entities of one kind, in insertion order
    pub fn objs_by_type(&self, type_tag: TypeTag) -> Vec<EntityId> {
        self.live_keys(type_tag)
            .filter_map(|key| self.arena.get(key).map(|slot| slot.id))
            .collect()
    }

    /// Live entities of one kind, in insertion order
    pub fn entities_by_type(&self, type_tag: TypeTag) -> impl Iterator<Item = &dyn Entity> {
        self.live_keys(type_tag)
            .filter_map(|key| self.live_entity(key))
    }

    /// Every type tag seen by this scene, in first-use order
    pub fn type_tags(&self) -> &[TypeTag] {
        &self.type_tags
    }

    /// Ids of all live entities sorted by z index, ties in insertion order
    pub fn all_entities(&self) -> Vec<EntityId> {
        self.z_ordered_keys()
            .into_iter()
            .filter_map(|key| self.arena.get(key).map(|slot| slot.id))
            .collect()
    }

    /// Number of live entities
    pub fn entity_count(&self) -> usize {
        self.index.len()
    }

    // ---- Queries ----

    /// Nearest live entity of `type_tag` to `pos`, within `range`
    ///
    /// Entities listed in `exclude` are ignored. Ties resolve to the entity
    /// added first. Nothing is found if the bucket is empty or the nearest
    /// entity is farther than `range`.
    pub fn closest_info(&self, pos: Vec2, type_tag: TypeTag, range: f32, exclude: &[EntityId]) -> ClosestInfo {
        let candidates = self
            .entities_by_type(type_tag)
            .map(|entity| entity.core())
            .filter(|core| !exclude.contains(&core.id()))
            .map(|core| (core.id(), core.pos));

        spatial::nearest(&pos, candidates, range).map_or(ClosestInfo::NOT_FOUND, |found| ClosestInfo {
            closest: Some(found.key),
            distance: found.distance,
        })
    }

    /// Id of the nearest live entity of `type_tag` within `range`
    pub fn closest(&self, pos: Vec2, type_tag: TypeTag, range: f32, exclude: &[EntityId]) -> Option<EntityId> {
        self.closest_info(pos, type_tag, range, exclude).closest
    }

    // ---- Frame passes ----

    /// Run every live entity's update hook once, in z order
    ///
    /// Entities added during the pass are first updated next frame. Entities
    /// removed during the pass are not updated again.
    pub fn update(&mut self) {
        if self.updating {
            log::warn!("Scene {:?} update re-entered from an update hook; ignored", self.id);
            return;
        }
        self.compact();
        self.attach_stray_dependencies();

        let order = self.z_ordered_keys();
        self.updating = true;
        for key in order {
            let Some(mut entity) = self.check_out(key) else {
                continue;
            };
            entity.update(self);
            self.check_in(key, entity);
        }
        self.updating = false;
    }

    /// Run every predraw hook, then every draw hook, then the debug overlay
    pub fn draw(&mut self, renderer: &mut dyn Renderer) {
        let order = self.z_ordered_keys();
        let scene: &Self = self;
        for &key in &order {
            if let Some(entity) = scene.live_entity(key) {
                entity.predraw(scene, renderer);
            }
        }
        for &key in &order {
            if let Some(entity) = scene.live_entity(key) {
                entity.draw(scene, renderer);
            }
        }

        if self.debug.flags().contains(DebugFlags::FRAME_RATE) {
            self.debug.record_frame_rate(self.frame.frame_rate);
        }
        self.debug.draw(renderer, self.entity_count());
    }

    /// Fire every callback registered for `event`, in z order
    ///
    /// A callback only runs while the pointer lies inside its entity's
    /// radius, checked right before that callback is invoked.
    pub fn execute_listeners(&mut self, event: RegionEvent) {
        for key in self.z_ordered_keys() {
            let Some((id, handlers)) = self.live_entity(key).map(|entity| {
                let core = entity.core();
                (core.id(), core.listeners().handlers(event).to_vec())
            }) else {
                continue;
            };

            for handler in handlers {
                let inside = self
                    .live_entity(key)
                    .is_some_and(|entity| entity.core().mouse_over(self, 0.0));
                if inside {
                    handler(self, id);
                }
            }
        }
    }

    /// [`execute_listeners`](Self::execute_listeners) by event name
    pub fn execute_listeners_named(&mut self, event: &str) -> Result<(), EventError> {
        self.execute_listeners(event.parse()?);
        Ok(())
    }

    // ---- Internals ----

    fn bucket_mut(&mut self, type_tag: TypeTag) -> &mut Vec<EntityKey> {
        if !self.buckets.contains_key(&type_tag) {
            self.type_tags.push(type_tag);
        }
        self.buckets.entry(type_tag).or_default()
    }

    fn slot_mut(&mut self, id: EntityId) -> Option<&mut Slot> {
        let &key = self.index.get(&id)?;
        self.arena.get_mut(key)
    }

    fn type_tag_of(&self, id: EntityId) -> Option<TypeTag> {
        let &key = self.index.get(&id)?;
        self.arena.get(key).map(|slot| slot.type_tag)
    }

    fn live_keys(&self, type_tag: TypeTag) -> impl Iterator<Item = EntityKey> + '_ {
        self.buckets
            .get(&type_tag)
            .into_iter()
            .flatten()
            .copied()
            .filter(|&key| self.arena.get(key).is_some_and(|slot| !slot.removed))
    }

    fn live_entity(&self, key: EntityKey) -> Option<&dyn Entity> {
        let slot = self.arena.get(key)?;
        if slot.removed {
            return None;
        }
        slot.entity.as_deref()
    }

    fn z_ordered_keys(&self) -> Vec<EntityKey> {
        let mut ordered: Vec<(i32, u64, EntityKey)> = self
            .arena
            .iter()
            .filter(|(_, slot)| !slot.removed)
            .filter_map(|(key, slot)| {
                let entity = slot.entity.as_ref()?;
                Some((entity.core().z_index, slot.seq, key))
            })
            .collect();
        ordered.sort_unstable_by_key(|&(z_index, seq, _)| (z_index, seq));
        ordered.into_iter().map(|(_, _, key)| key).collect()
    }

    fn attach_children(&mut self, parent: EntityKey, children: Vec<Box<dyn Entity>>) -> Result<(), SceneError> {
        for child in children {
            let child_id = match self.add_boxed(child) {
                Ok(id) | Err(SceneError::AlreadyAttached { id }) => id,
                Err(err) => return Err(err),
            };
            if let Some(slot) = self.arena.get_mut(parent) {
                slot.dependencies.push(child_id);
            }
        }
        Ok(())
    }

    /// Attach children that were queued on live cores between frames
    fn attach_stray_dependencies(&mut self) {
        let stray: Vec<EntityId> = self
            .arena
            .values()
            .filter(|slot| !slot.removed)
            .filter(|slot| {
                slot.entity
                    .as_ref()
                    .is_some_and(|entity| entity.core().pending_dependencies().next().is_some())
            })
            .map(|slot| slot.id)
            .collect();

        for id in stray {
            log::warn!("Dependencies of {id} were queued outside its update hook; attaching them now");
            if let Err(err) = self.flush_dependencies(id) {
                log::error!("Failed to attach queued dependencies: {err}");
            }
        }
    }

    fn check_out(&mut self, key: EntityKey) -> Option<Box<dyn Entity>> {
        let slot = self.arena.get_mut(key)?;
        if slot.removed {
            return None;
        }
        slot.entity.take()
    }

    fn check_in(&mut self, key: EntityKey, mut entity: Box<dyn Entity>) {
        let children = entity.core_mut().take_pending_dependencies();
        match self.arena.get_mut(key) {
            Some(slot) if !slot.removed => slot.entity = Some(entity),
            _ => {
                // Removed during its own update
                entity.core_mut().detach();
                if !children.is_empty() {
                    log::debug!(
                        "Dropped {} queued dependencies of removed {}",
                        children.len(),
                        entity.core().id()
                    );
                }
                return;
            }
        }

        if let Err(err) = self.attach_children(key, children) {
            log::error!("Failed to attach queued dependencies: {err}");
        }
    }

    fn compact(&mut self) {
        if self.tombstones == 0 {
            return;
        }
        for bucket in self.buckets.values_mut() {
            bucket.retain(|&key| self.arena.get(key).is_some_and(|slot| !slot.removed));
        }
        self.arena.retain(|_, slot| !slot.removed);
        log::trace!("Compacted {} tombstones in scene {:?}", self.tombstones, self.id);
        self.tombstones = 0;
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("id", &self.id)
            .field("entities", &self.entity_count())
            .field("type_tags", &self.type_tags)
            .field("frame", &self.frame.frame)
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Color, RecordingRenderer};
    use crate::scene::EntityCore;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    const DUMMY: TypeTag = TypeTag::new("dummy");
    const OTHER: TypeTag = TypeTag::new("other");

    #[derive(Default)]
    struct Log(Vec<String>);

    fn log_line(scene: &mut Scene, line: String) {
        if let Some(log) = scene.data_mut().get_mut::<Log>() {
            log.0.push(line);
        }
    }

    fn lines(scene: &Scene) -> Vec<String> {
        scene.data().get::<Log>().map(|log| log.0.clone()).unwrap_or_default()
    }

    #[derive(Clone)]
    struct Dummy {
        core: EntityCore,
        label: &'static str,
        updates: u32,
    }

    impl Dummy {
        fn new(type_tag: TypeTag, label: &'static str, x: f32, y: f32) -> Self {
            Self {
                core: EntityCore::new(type_tag, Vec2::new(x, y)),
                label,
                updates: 0,
            }
        }

        fn z(mut self, z_index: i32) -> Self {
            self.core.z_index = z_index;
            self
        }
    }

    impl Entity for Dummy {
        fn core(&self) -> &EntityCore {
            &self.core
        }

        fn core_mut(&mut self) -> &mut EntityCore {
            &mut self.core
        }

        fn predraw(&self, _scene: &Scene, renderer: &mut dyn Renderer) {
            renderer.text(self.core.pos, 1.0, &format!("pre {}", self.label), Color::WHITE);
        }

        fn draw(&self, _scene: &Scene, renderer: &mut dyn Renderer) {
            renderer.text(self.core.pos, 1.0, &format!("draw {}", self.label), Color::WHITE);
        }

        fn update(&mut self, scene: &mut Scene) {
            self.updates += 1;
            log_line(scene, format!("update {}", self.label));
        }
    }

    /// Removes `target` during its update, once
    struct Remover {
        core: EntityCore,
        target: Option<EntityId>,
    }

    impl Entity for Remover {
        fn core(&self) -> &EntityCore {
            &self.core
        }

        fn core_mut(&mut self) -> &mut EntityCore {
            &mut self.core
        }

        fn update(&mut self, scene: &mut Scene) {
            if let Some(target) = self.target.take() {
                scene.remove_entity(target);
            }
        }
    }

    /// Spawns one dummy and queues one dependency on its first update
    struct Spawner {
        core: EntityCore,
        spawned: bool,
    }

    impl Entity for Spawner {
        fn core(&self) -> &EntityCore {
            &self.core
        }

        fn core_mut(&mut self) -> &mut EntityCore {
            &mut self.core
        }

        fn update(&mut self, scene: &mut Scene) {
            if !self.spawned {
                self.spawned = true;
                scene.add(Dummy::new(DUMMY, "spawned", 0.0, 0.0).z(10)).unwrap();
                self.core.add_dependency(Dummy::new(OTHER, "child", 0.0, 0.0));
            }
        }
    }

    fn logged_scene() -> Scene {
        Scene::new().with_data(Log::default())
    }

    #[test]
    fn test_add_attaches_once_into_bucket() {
        let mut scene = Scene::new();
        let id = scene.add(Dummy::new(DUMMY, "a", 0.0, 0.0)).unwrap();

        assert_eq!(scene.entity(id).unwrap().core().scene(), Some(scene.id()));
        assert_eq!(scene.objs_by_type(DUMMY), vec![id]);
        assert_eq!(scene.type_tags(), &[DUMMY]);
        assert_eq!(scene.entity_count(), 1);
    }

    #[test]
    fn test_re_add_fails_and_leaves_bucket_unchanged() {
        let mut scene = Scene::new();
        let dummy = Dummy::new(DUMMY, "a", 0.0, 0.0);
        let id = scene.add(dummy.clone()).unwrap();

        assert_eq!(scene.add(dummy), Err(SceneError::AlreadyAttached { id }));

        let attached_copy = scene.get::<Dummy>(id).unwrap().clone();
        assert_eq!(scene.add(attached_copy), Err(SceneError::AlreadyAttached { id }));
        assert_eq!(scene.objs_by_type(DUMMY), vec![id]);
    }

    #[test]
    fn test_entity_from_another_scene_is_rejected() {
        let first = Scene::new();
        let mut second = Scene::new();
        let mut stray = Dummy::new(DUMMY, "a", 0.0, 0.0);
        stray.core.attach(first.id()).unwrap();
        let id = stray.core.id();

        assert_eq!(second.add(stray), Err(SceneError::AttachedElsewhere { id }));
        assert_eq!(second.entity_count(), 0);
    }

    #[test]
    fn test_copy_of_removed_entity_can_be_added_again() {
        let mut scene = Scene::new();
        let id = scene.add(Dummy::new(DUMMY, "a", 0.0, 0.0)).unwrap();
        let copy = scene.get::<Dummy>(id).unwrap().clone();
        assert!(!copy.core.is_attached());

        assert!(scene.remove(DUMMY, id));
        assert_eq!(scene.add(copy), Ok(id));
        assert_eq!(scene.objs_by_type(DUMMY), vec![id]);
    }

    #[test]
    fn test_taken_entity_is_detached_and_reusable() {
        let mut scene = Scene::new();
        let mut parent = Dummy::new(DUMMY, "parent", 0.0, 0.0);
        parent.core.add_dependency(Dummy::new(OTHER, "child", 0.0, 0.0));
        let id = scene.add(parent).unwrap();
        assert_eq!(scene.entity_count(), 2);

        let taken = scene.take(DUMMY, id).unwrap();
        assert_eq!(taken.core().id(), id);
        assert!(!taken.core().is_attached());
        assert_eq!(scene.entity_count(), 0);
        assert!(scene.take(DUMMY, id).is_none());

        let mut other = Scene::new();
        assert_eq!(other.add_boxed(taken), Ok(id));
        assert_eq!(other.get::<Dummy>(id).unwrap().label, "parent");
    }

    #[test]
    fn test_scene_add_dependency_attaches_at_once() {
        let mut scene = Scene::new();
        let parent_id = scene.add(Dummy::new(DUMMY, "parent", 0.0, 0.0)).unwrap();
        let child_id = scene
            .add_dependency_boxed(parent_id, Box::new(Dummy::new(OTHER, "child", 0.0, 0.0)))
            .unwrap();

        assert_eq!(scene.entity_count(), 2);
        assert_eq!(scene.dependencies(parent_id), &[child_id]);
    }

    #[test]
    fn test_child_queued_on_attached_core_joins_on_flush() {
        let mut scene = Scene::new();
        let parent_id = scene.add(Dummy::new(DUMMY, "parent", 0.0, 0.0)).unwrap();

        let queued = scene
            .entity_mut(parent_id)
            .unwrap()
            .core_mut()
            .add_dependency(Dummy::new(OTHER, "child", 0.0, 0.0));
        assert!(queued);
        assert_eq!(scene.entity_count(), 1);

        assert_eq!(scene.flush_dependencies(parent_id), Ok(1));
        assert_eq!(scene.entity_count(), 2);
        assert_eq!(scene.dependencies(parent_id).len(), 1);
        assert_eq!(scene.flush_dependencies(parent_id), Ok(0));
    }

    #[test]
    fn test_child_queued_between_frames_joins_before_updates() {
        let mut scene = logged_scene();
        let parent_id = scene.add(Dummy::new(DUMMY, "parent", 0.0, 0.0)).unwrap();
        scene
            .get_mut::<Dummy>(parent_id)
            .unwrap()
            .core
            .add_dependency(Dummy::new(OTHER, "child", 0.0, 0.0));

        scene.update();

        assert_eq!(scene.objs_by_type(OTHER).len(), 1);
        assert_eq!(lines(&scene), vec!["update parent", "update child"]);

        scene.remove(DUMMY, parent_id);
        assert_eq!(scene.entity_count(), 0);
    }

    #[test]
    fn test_remove_missing_id_is_noop() {
        let mut scene = Scene::new();
        let id = scene.add(Dummy::new(DUMMY, "a", 0.0, 0.0)).unwrap();
        let stranger = Dummy::new(DUMMY, "b", 0.0, 0.0).core.id();

        assert!(!scene.remove(DUMMY, stranger));
        assert!(!scene.remove(OTHER, id));
        assert_eq!(scene.objs_by_type(DUMMY), vec![id]);
    }

    #[test]
    fn test_remove_cascades_to_dependencies() {
        let mut scene = Scene::new();
        let mut parent = Dummy::new(DUMMY, "parent", 0.0, 0.0);
        for _ in 0..3 {
            parent.core.add_dependency(Dummy::new(OTHER, "child", 1.0, 1.0));
        }
        let parent_id = scene.add(parent).unwrap();
        let children = scene.dependencies(parent_id).to_vec();
        assert_eq!(children.len(), 3);
        assert_eq!(scene.objs_by_type(OTHER), children);

        assert!(scene.remove(DUMMY, parent_id));

        assert!(scene.dependencies(parent_id).is_empty());
        assert!(scene.objs_by_type(OTHER).is_empty());
        assert_eq!(scene.entity_count(), 0);
        assert!(children.iter().all(|&child| !scene.contains(child)));
    }

    #[test]
    fn test_nested_dependencies_attach_and_cascade() {
        let mut scene = Scene::new();
        let mut child = Dummy::new(OTHER, "child", 0.0, 0.0);
        child.core.add_dependency(Dummy::new(OTHER, "grandchild", 0.0, 0.0));
        let mut parent = Dummy::new(DUMMY, "parent", 0.0, 0.0);
        parent.core.add_dependency(child);

        let parent_id = scene.add(parent).unwrap();
        assert_eq!(scene.entity_count(), 3);

        scene.remove(DUMMY, parent_id);
        assert_eq!(scene.entity_count(), 0);
    }

    #[test]
    fn test_detached_dependency_survives_parent() {
        let mut scene = Scene::new();
        let parent_id = scene.add(Dummy::new(DUMMY, "parent", 0.0, 0.0)).unwrap();
        let child_id = scene
            .add_dependency(parent_id, Dummy::new(OTHER, "child", 0.0, 0.0))
            .unwrap();

        assert!(scene.detach_dependency(parent_id, child_id));
        scene.remove(DUMMY, parent_id);

        assert!(scene.contains(child_id));
    }

    #[test]
    fn test_remove_dependencies_keeps_parent() {
        let mut scene = Scene::new();
        let parent_id = scene.add(Dummy::new(DUMMY, "parent", 0.0, 0.0)).unwrap();
        scene.add_dependency(parent_id, Dummy::new(OTHER, "a", 0.0, 0.0)).unwrap();
        scene.add_dependency(parent_id, Dummy::new(OTHER, "b", 0.0, 0.0)).unwrap();

        scene.remove_dependencies(parent_id);

        assert!(scene.contains(parent_id));
        assert!(scene.dependencies(parent_id).is_empty());
        assert!(scene.objs_by_type(OTHER).is_empty());
    }

    #[test]
    fn test_dependency_on_unknown_parent_fails() {
        let mut scene = Scene::new();
        let ghost = Dummy::new(DUMMY, "ghost", 0.0, 0.0).core.id();
        assert_eq!(
            scene.add_dependency(ghost, Dummy::new(OTHER, "child", 0.0, 0.0)),
            Err(SceneError::UnknownEntity(ghost))
        );
    }

    #[test]
    fn test_closest_on_empty_bucket_is_not_found() {
        let scene = Scene::new();
        let info = scene.closest_info(Vec2::zeros(), DUMMY, f32::INFINITY, &[]);
        assert_eq!(info.closest, None);
        assert!(info.distance.is_infinite());
    }

    #[test]
    fn test_closest_respects_range() {
        let mut scene = Scene::new();
        let near = scene.add(Dummy::new(DUMMY, "5", 5.0, 0.0)).unwrap();
        scene.add(Dummy::new(DUMMY, "10", 0.0, 10.0)).unwrap();
        scene.add(Dummy::new(DUMMY, "20", -20.0, 0.0)).unwrap();

        let info = scene.closest_info(Vec2::zeros(), DUMMY, 12.0, &[]);
        assert_eq!(info.closest, Some(near));
        assert_relative_eq!(info.distance, 5.0);

        assert_eq!(scene.closest_info(Vec2::zeros(), DUMMY, 3.0, &[]), ClosestInfo::NOT_FOUND);
        assert_ne!(scene.closest(Vec2::zeros(), DUMMY, 12.0, &[near]), Some(near));
    }

    #[test]
    fn test_closest_ties_go_to_first_added() {
        let mut scene = Scene::new();
        let first = scene.add(Dummy::new(DUMMY, "a", 0.0, 5.0)).unwrap();
        scene.add(Dummy::new(DUMMY, "b", 5.0, 0.0)).unwrap();

        assert_eq!(scene.closest(Vec2::zeros(), DUMMY, f32::INFINITY, &[]), Some(first));
    }

    #[test]
    fn test_entity_queries_exclude_self_and_check_collisions() {
        let mut scene = Scene::new();
        let a = scene.add(Dummy::new(DUMMY, "a", 0.0, 0.0)).unwrap();
        let b = scene.add(Dummy::new(DUMMY, "b", 15.0, 0.0)).unwrap();

        let core = scene.entity(a).unwrap().core().clone();
        assert_eq!(core.closest(&scene, DUMMY, f32::INFINITY), Some(b));
        // radius 10 + 10 >= 15
        assert_eq!(core.collides(&scene, DUMMY), Some(b));

        scene.get_mut::<Dummy>(b).unwrap().core.pos.x = 25.0;
        assert_eq!(core.collides(&scene, DUMMY), None);
    }

    #[test]
    fn test_detached_entity_queries_find_nothing() {
        let mut scene = Scene::new();
        scene.add(Dummy::new(DUMMY, "a", 1.0, 0.0)).unwrap();
        let loose = Dummy::new(DUMMY, "loose", 0.0, 0.0);

        assert!(!loose.core.closest_info(&scene, DUMMY, f32::INFINITY).is_found());
        assert!(!loose.core.remove(&mut scene));
    }

    #[test]
    fn test_all_entities_sorted_by_z() {
        let mut scene = Scene::new();
        let z5 = scene.add(Dummy::new(DUMMY, "a", 0.0, 0.0).z(5)).unwrap();
        let z1 = scene.add(Dummy::new(OTHER, "b", 0.0, 0.0).z(1)).unwrap();
        let z2 = scene.add(Dummy::new(DUMMY, "c", 0.0, 0.0).z(2)).unwrap();

        assert_eq!(scene.all_entities(), vec![z1, z2, z5]);
    }

    #[test]
    fn test_equal_z_keeps_insertion_order() {
        let mut scene = Scene::new();
        let ids: Vec<_> = ["a", "b", "c"]
            .into_iter()
            .map(|label| scene.add(Dummy::new(OTHER, label, 0.0, 0.0)).unwrap())
            .collect();

        assert_eq!(scene.all_entities(), ids);
    }

    #[test]
    fn test_update_visits_in_z_order() {
        let mut scene = logged_scene();
        scene.add(Dummy::new(DUMMY, "high", 0.0, 0.0).z(3)).unwrap();
        scene.add(Dummy::new(DUMMY, "low", 0.0, 0.0).z(-1)).unwrap();

        scene.update();

        assert_eq!(lines(&scene), vec!["update low", "update high"]);
    }

    #[test]
    fn test_entity_removed_mid_update_is_skipped() {
        let mut scene = logged_scene();
        let victim = Dummy::new(DUMMY, "victim", 0.0, 0.0).z(1);
        let remover = Remover {
            core: EntityCore::new(OTHER, Vec2::zeros()),
            target: Some(victim.core.id()),
        };
        scene.add(victim).unwrap();
        scene.add(remover).unwrap();

        scene.update();
        scene.update();

        assert!(lines(&scene).is_empty());
        assert_eq!(scene.entity_count(), 1);
    }

    #[test]
    fn test_entity_removing_itself_is_detached() {
        struct Quitter {
            core: EntityCore,
        }

        impl Entity for Quitter {
            fn core(&self) -> &EntityCore {
                &self.core
            }

            fn core_mut(&mut self) -> &mut EntityCore {
                &mut self.core
            }

            fn update(&mut self, scene: &mut Scene) {
                assert!(self.core.remove(scene));
            }
        }

        let mut scene = Scene::new();
        let id = scene
            .add(Quitter { core: EntityCore::new(DUMMY, Vec2::zeros()) })
            .unwrap();

        scene.update();

        assert!(!scene.contains(id));
        assert!(scene.objs_by_type(DUMMY).is_empty());
    }

    #[test]
    fn test_entities_added_mid_update_wait_a_frame() {
        let mut scene = logged_scene();
        let spawner_id = scene
            .add(Spawner {
                core: EntityCore::new(OTHER, Vec2::zeros()),
                spawned: false,
            })
            .unwrap();

        scene.update();
        assert!(lines(&scene).is_empty());
        assert_eq!(scene.entity_count(), 3);
        assert_eq!(scene.dependencies(spawner_id).len(), 1);

        scene.update();
        assert_eq!(lines(&scene), vec!["update child", "update spawned"]);
    }

    #[test]
    fn test_draw_runs_all_predraws_before_draws() {
        let mut scene = Scene::new();
        scene.add(Dummy::new(DUMMY, "b", 0.0, 0.0).z(2)).unwrap();
        scene.add(Dummy::new(DUMMY, "a", 0.0, 0.0).z(1)).unwrap();
        let mut recorder = RecordingRenderer::new();

        scene.draw(&mut recorder);

        assert_eq!(
            recorder.texts().collect::<Vec<_>>(),
            vec!["pre a", "pre b", "draw a", "draw b"]
        );
    }

    #[test]
    fn test_debug_overlay_follows_toggles() {
        let mut scene = Scene::new();
        scene.add(Dummy::new(DUMMY, "a", 0.0, 0.0)).unwrap();
        scene.set_debug_show_entity_count(true);
        scene.begin_frame(FrameInfo {
            frame: 1,
            pointer: Vec2::zeros(),
            frame_rate: 30.0,
        });
        let mut recorder = RecordingRenderer::new();

        scene.draw(&mut recorder);

        assert_eq!(recorder.texts().last(), Some("[Objs: 1]"));
        assert_eq!(scene.debug_flags(), DebugFlags::ENTITY_COUNT);
    }

    #[test]
    fn test_listeners_fire_only_inside_region() {
        let mut scene = logged_scene();
        let mut inside = Dummy::new(DUMMY, "inside", 0.0, 0.0);
        inside
            .core
            .on(RegionEvent::PointerPressed, |scene, _| log_line(scene, "inside".into()));
        let mut outside = Dummy::new(DUMMY, "outside", 100.0, 0.0);
        outside
            .core
            .on(RegionEvent::PointerPressed, |scene, _| log_line(scene, "outside".into()));
        scene.add(inside).unwrap();
        scene.add(outside).unwrap();
        scene.set_pointer(Vec2::new(3.0, 4.0));

        scene.execute_listeners(RegionEvent::PointerPressed);
        scene.execute_listeners(RegionEvent::PointerOver);

        assert_eq!(lines(&scene), vec!["inside"]);
    }

    #[test]
    fn test_region_is_checked_at_dispatch_time() {
        let mut scene = logged_scene();
        let mut dummy = Dummy::new(DUMMY, "a", 0.0, 0.0);
        dummy.core.on(RegionEvent::PointerDown, |scene, id| {
            log_line(scene, "first".into());
            if let Some(entity) = scene.entity_mut(id) {
                entity.core_mut().pos.x = 50.0;
            }
        });
        dummy
            .core
            .on(RegionEvent::PointerDown, |scene, _| log_line(scene, "second".into()));
        scene.add(dummy).unwrap();

        scene.execute_listeners(RegionEvent::PointerDown);

        assert_eq!(lines(&scene), vec!["first"]);
    }

    #[test]
    fn test_listener_can_remove_its_entity() {
        let mut scene = logged_scene();
        let mut dummy = Dummy::new(DUMMY, "a", 0.0, 0.0);
        dummy.core.on(RegionEvent::PointerPressed, |scene, id| {
            scene.remove_entity(id);
        });
        dummy
            .core
            .on(RegionEvent::PointerPressed, |scene, _| log_line(scene, "late".into()));
        let id = scene.add(dummy).unwrap();

        scene.execute_listeners(RegionEvent::PointerPressed);

        assert!(!scene.contains(id));
        assert!(lines(&scene).is_empty());
    }

    #[test]
    fn test_unknown_event_name_is_an_error() {
        let mut scene = Scene::new();
        assert!(scene.execute_listeners_named("pointerpressed").is_ok());
        assert_eq!(
            scene.execute_listeners_named("doubleclick"),
            Err(EventError::UnknownEvent("doubleclick".into()))
        );
    }

    #[test]
    fn test_typed_lookup_and_turning_through_scene() {
        let mut scene = Scene::new();
        let id = scene.add(Dummy::new(DUMMY, "a", 0.0, 0.0)).unwrap();

        let dummy = scene.get_mut::<Dummy>(id).unwrap();
        let diff = dummy.core.turn_towards_diff(&Vec2::new(-1.0, 0.0));
        assert_relative_eq!(diff, PI);

        assert!(scene.get::<Remover>(id).is_none());
        assert_eq!(scene.get::<Dummy>(id).map(|dummy| dummy.updates), Some(0));
    }

    #[test]
    fn test_scene_config_loads_with_defaults() {
        let config: SceneConfig = toml::from_str("show_entity_count = true").unwrap();
        assert!(config.show_entity_count);
        assert!(!config.show_frame_rate);
        assert_eq!(config.frame_rate_samples, DEFAULT_FRAME_RATE_SAMPLES);
    }
}
