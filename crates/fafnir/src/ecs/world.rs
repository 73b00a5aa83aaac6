//! The [`World`]: entity allocator, component stores, resources, and hooks.
//!
//! ## Design
//!
//! - Entities are generational handles ([`Entity`]); dead handles are safe to
//!   hold and every operation on one is a no-op or `None`.
//! - Components live in per-type sparse sets
//!   ([`ComponentStore`](super::component::ComponentStore)), looked up by
//!   `TypeId`. Any `'static + Send + Sync` type is a component, no
//!   registration step.
//! - Resources are world-global singletons keyed by type, used for shared
//!   state like input, time, and the frame draw list.
//! - Component hooks (`on_insert` / `on_remove`) let subsystems keep derived
//!   state consistent no matter which code path touched the component. The
//!   hierarchy maintains its child lists this way.
//!
//! Iteration goes through [`World::view`], which returns a snapshot
//! `Vec<Entity>`. The snapshot stays valid while you mutate the world
//! mid-loop; entities despawned after the snapshot was taken simply return
//! `None` from accessors.

use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};

use super::component::ComponentStore;
use super::entity::{Entity, EntityAllocator};
use super::hierarchy::Children;
use super::view::ComponentSet;

/// Display name for an entity, shown by the editor and searchable with
/// [`World::find_by_name`]. Not required to be unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// Free-form grouping label, searchable with [`World::find_by_tag`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag(pub String);

impl Tag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }
}

/// Callbacks fired when a component of one type appears or disappears.
///
/// Stored as plain `fn` pointers so they can be copied out of the world
/// before being handed `&mut World`.
#[derive(Default, Clone, Copy)]
struct ComponentHooks {
    on_insert: Option<fn(&mut World, Entity)>,
    on_remove: Option<fn(&mut World, Entity)>,
}

/// A group of components inserted together by [`World::spawn`].
///
/// Implemented for tuples up to eight components. Each element goes through
/// [`World::insert`], so insertion hooks fire per component.
pub trait Bundle {
    fn insert_into(self, world: &mut World, entity: Entity);
}

macro_rules! impl_bundle {
    ($($name:ident),+) => {
        impl<$($name: 'static + Send + Sync),+> Bundle for ($($name,)+) {
            #[allow(non_snake_case)]
            fn insert_into(self, world: &mut World, entity: Entity) {
                let ($($name,)+) = self;
                $(world.insert(entity, $name);)+
            }
        }
    };
}

impl_bundle!(A);
impl_bundle!(A, B);
impl_bundle!(A, B, C);
impl_bundle!(A, B, C, D);
impl_bundle!(A, B, C, D, E);
impl_bundle!(A, B, C, D, E, F);
impl_bundle!(A, B, C, D, E, F, G);
impl_bundle!(A, B, C, D, E, F, G, H);

pub struct World {
    allocator: EntityAllocator,
    stores: HashMap<TypeId, ComponentStore>,
    hooks: HashMap<TypeId, ComponentHooks>,
    resources: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl World {
    pub fn new() -> Self {
        Self {
            allocator: EntityAllocator::new(),
            stores: HashMap::new(),
            hooks: HashMap::new(),
            resources: HashMap::new(),
        }
    }

    // ── Entities ────────────────────────────────────────────────────────

    /// Creates an entity with no components.
    pub fn spawn_empty(&mut self) -> Entity {
        self.allocator.allocate()
    }

    /// Creates an entity with a bundle of components:
    ///
    /// ```ignore
    /// let e = world.spawn((Transform::from_xyz(0.0, 1.0, 0.0), Name::new("player")));
    /// ```
    pub fn spawn(&mut self, bundle: impl Bundle) -> Entity {
        let entity = self.allocator.allocate();
        bundle.insert_into(self, entity);
        entity
    }

    /// Destroys an entity and all its components. Removal hooks fire while
    /// the components are still attached. Returns false for dead handles.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        if !self.allocator.is_alive(entity) {
            return false;
        }
        let held: Vec<TypeId> = self
            .stores
            .iter()
            .filter(|(_, store)| store.contains(entity))
            .map(|(&type_id, _)| type_id)
            .collect();
        for type_id in &held {
            let hook = self.hooks.get(type_id).and_then(|h| h.on_remove);
            if let Some(hook) = hook {
                hook(self, entity);
            }
        }
        for type_id in &held {
            if let Some(store) = self.stores.get_mut(type_id) {
                store.remove(entity);
            }
        }
        self.allocator.deallocate(entity)
    }

    /// Despawns an entity together with every descendant reachable through
    /// [`Children`] lists. The subtree is collected before anything dies, so
    /// the list mutation done by removal hooks cannot skip nodes. A visited
    /// set bounds the walk even if raw component edits corrupted the links
    /// into a cycle.
    pub fn despawn_recursive(&mut self, entity: Entity) -> bool {
        if !self.allocator.is_alive(entity) {
            return false;
        }
        let mut seen: HashSet<Entity> = HashSet::from([entity]);
        let mut subtree = vec![entity];
        let mut cursor = 0;
        while cursor < subtree.len() {
            let current = subtree[cursor];
            cursor += 1;
            if let Some(children) = self.get::<Children>(current) {
                for &child in &children.0 {
                    if seen.insert(child) {
                        subtree.push(child);
                    }
                }
            }
        }
        for member in subtree {
            self.despawn(member);
        }
        true
    }

    pub fn despawn_all(&mut self) {
        for entity in self.entities() {
            self.despawn(entity);
        }
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.allocator.is_alive(entity)
    }

    pub fn entity_count(&self) -> usize {
        self.allocator.alive_count()
    }

    /// Every live entity, in slot order. Allocates; meant for tooling and
    /// editor panels rather than hot loops.
    pub fn entities(&self) -> Vec<Entity> {
        self.allocator.live_entities()
    }

    // ── Components ──────────────────────────────────────────────────────

    /// Attaches a component, replacing any existing value of the same type.
    /// A replace fires the removal hook for the old value, then the
    /// insertion hook for the new one. Inserting on a dead entity is
    /// ignored.
    pub fn insert<T: 'static + Send + Sync>(&mut self, entity: Entity, value: T) {
        if !self.allocator.is_alive(entity) {
            log::debug!(
                "insert::<{}> on dead entity {entity:?} ignored",
                std::any::type_name::<T>()
            );
            return;
        }
        let type_id = TypeId::of::<T>();
        let replacing = self
            .stores
            .get(&type_id)
            .is_some_and(|store| store.contains(entity));
        if replacing {
            let hook = self.hooks.get(&type_id).and_then(|h| h.on_remove);
            if let Some(hook) = hook {
                hook(self, entity);
            }
        }
        self.stores
            .entry(type_id)
            .or_insert_with(ComponentStore::new::<T>)
            .insert(entity, Box::new(value));
        let hook = self.hooks.get(&type_id).and_then(|h| h.on_insert);
        if let Some(hook) = hook {
            hook(self, entity);
        }
    }

    /// Detaches a component. The removal hook fires while the value is still
    /// attached. Returns whether anything was removed.
    pub fn remove<T: 'static + Send + Sync>(&mut self, entity: Entity) -> bool {
        if !self.allocator.is_alive(entity) {
            return false;
        }
        let type_id = TypeId::of::<T>();
        let present = self
            .stores
            .get(&type_id)
            .is_some_and(|store| store.contains(entity));
        if !present {
            return false;
        }
        let hook = self.hooks.get(&type_id).and_then(|h| h.on_remove);
        if let Some(hook) = hook {
            hook(self, entity);
        }
        self.stores
            .get_mut(&type_id)
            .is_some_and(|store| store.remove(entity).is_some())
    }

    pub fn has<T: 'static + Send + Sync>(&self, entity: Entity) -> bool {
        self.allocator.is_alive(entity)
            && self
                .stores
                .get(&TypeId::of::<T>())
                .is_some_and(|store| store.contains(entity))
    }

    pub fn get<T: 'static + Send + Sync>(&self, entity: Entity) -> Option<&T> {
        if !self.allocator.is_alive(entity) {
            return None;
        }
        self.stores.get(&TypeId::of::<T>())?.get::<T>(entity)
    }

    pub fn get_mut<T: 'static + Send + Sync>(&mut self, entity: Entity) -> Option<&mut T> {
        if !self.allocator.is_alive(entity) {
            return None;
        }
        self.stores.get_mut(&TypeId::of::<T>())?.get_mut::<T>(entity)
    }

    /// Type names of every component attached to `entity`, sorted. Used by
    /// the editor inspector for components it has no dedicated UI for.
    pub fn component_names(&self, entity: Entity) -> Vec<&'static str> {
        if !self.allocator.is_alive(entity) {
            return Vec::new();
        }
        let mut names: Vec<&'static str> = self
            .stores
            .values()
            .filter(|store| store.contains(entity))
            .map(|store| store.type_name())
            .collect();
        names.sort_unstable();
        names
    }

    // ── Views ───────────────────────────────────────────────────────────

    /// Entities that currently hold every component in `S`, as a snapshot.
    ///
    /// The set iterates from the smallest matching store, so a narrow view
    /// over a large world stays cheap. The returned vec does not borrow the
    /// world; despawning or restructuring entities while walking it is fine,
    /// accessors on stale entries just return `None`.
    pub fn view<S: ComponentSet>(&self) -> Vec<Entity> {
        self.view_without::<S, ()>()
    }

    /// Like [`World::view`] but skips entities holding any component in `X`:
    ///
    /// ```ignore
    /// // All transforms that are hierarchy roots.
    /// let roots = world.view_without::<(Transform,), (Parent,)>();
    /// ```
    pub fn view_without<S: ComponentSet, X: ComponentSet>(&self) -> Vec<Entity> {
        let include = S::type_ids();
        if include.is_empty() {
            return Vec::new();
        }
        let mut stores = Vec::with_capacity(include.len());
        for type_id in &include {
            match self.stores.get(type_id) {
                Some(store) => stores.push(store),
                None => return Vec::new(),
            }
        }
        let mut driver = 0;
        for (i, store) in stores.iter().enumerate() {
            if store.len() < stores[driver].len() {
                driver = i;
            }
        }
        let exclude: Vec<&ComponentStore> = X::type_ids()
            .iter()
            .filter_map(|type_id| self.stores.get(type_id))
            .collect();
        stores[driver]
            .entities()
            .iter()
            .copied()
            .filter(|&entity| {
                stores
                    .iter()
                    .enumerate()
                    .all(|(i, store)| i == driver || store.contains(entity))
                    && exclude.iter().all(|store| !store.contains(entity))
            })
            .collect()
    }

    // ── Hooks ───────────────────────────────────────────────────────────

    /// Registers the insertion hook for component type `T`, replacing any
    /// previous one. The hook runs after the value is attached.
    pub fn on_insert<T: 'static + Send + Sync>(&mut self, hook: fn(&mut World, Entity)) {
        self.hooks.entry(TypeId::of::<T>()).or_default().on_insert = Some(hook);
    }

    /// Registers the removal hook for component type `T`. The hook runs
    /// before the value is detached, on remove, replace, and despawn alike.
    pub fn on_remove<T: 'static + Send + Sync>(&mut self, hook: fn(&mut World, Entity)) {
        self.hooks.entry(TypeId::of::<T>()).or_default().on_remove = Some(hook);
    }

    // ── Resources ───────────────────────────────────────────────────────

    pub fn insert_resource<T: 'static + Send + Sync>(&mut self, value: T) {
        self.resources.insert(TypeId::of::<T>(), Box::new(value));
    }

    pub fn get_resource<T: 'static + Send + Sync>(&self) -> Option<&T> {
        self.resources.get(&TypeId::of::<T>())?.downcast_ref()
    }

    pub fn get_resource_mut<T: 'static + Send + Sync>(&mut self) -> Option<&mut T> {
        self.resources.get_mut(&TypeId::of::<T>())?.downcast_mut()
    }

    /// # Panics
    ///
    /// Panics if the resource was never inserted. Use
    /// [`World::get_resource`] when absence is an expected state.
    pub fn resource<T: 'static + Send + Sync>(&self) -> &T {
        self.get_resource().unwrap_or_else(|| {
            panic!(
                "Resource `{}` not found. Did you forget to insert it?",
                std::any::type_name::<T>()
            )
        })
    }

    /// # Panics
    ///
    /// Panics if the resource was never inserted.
    pub fn resource_mut<T: 'static + Send + Sync>(&mut self) -> &mut T {
        self.get_resource_mut().unwrap_or_else(|| {
            panic!(
                "Resource `{}` not found. Did you forget to insert it?",
                std::any::type_name::<T>()
            )
        })
    }

    /// Takes a resource out of the world, handing ownership to the caller.
    /// The render pass uses this to hold the GPU context across a frame
    /// while systems keep `&mut World`.
    pub fn resource_remove<T: 'static + Send + Sync>(&mut self) -> Option<T> {
        self.resources
            .remove(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast::<T>().ok())
            .map(|boxed| *boxed)
    }

    pub fn has_resource<T: 'static + Send + Sync>(&self) -> bool {
        self.resources.contains_key(&TypeId::of::<T>())
    }

    // ── Lookup by label ─────────────────────────────────────────────────

    /// First entity whose [`Name`] matches exactly. Order among duplicates
    /// is unspecified.
    pub fn find_by_name(&self, name: &str) -> Option<Entity> {
        let store = self.stores.get(&TypeId::of::<Name>())?;
        store
            .entities()
            .iter()
            .copied()
            .find(|&entity| store.get::<Name>(entity).is_some_and(|n| n.0 == name))
    }

    /// All entities whose [`Tag`] matches exactly.
    pub fn find_by_tag(&self, tag: &str) -> Vec<Entity> {
        let Some(store) = self.stores.get(&TypeId::of::<Tag>()) else {
            return Vec::new();
        };
        store
            .entities()
            .iter()
            .copied()
            .filter(|&entity| store.get::<Tag>(entity).is_some_and(|t| t.0 == tag))
            .collect()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
