//! Parent/child relationships between entities.
//!
//! Structure is stored from both ends: a child holds [`Parent`], a parent
//! holds [`Children`]. The two sides are kept consistent by component hooks
//! registered in [`HierarchySystem::init`], so the invariant holds no matter
//! how the [`Parent`] component got there: [`set_parent`], a raw
//! `world.insert(child, Parent(p))`, a spawn bundle, or a despawn.
//!
//! [`set_parent`] additionally rewrites the child's local transform so its
//! world pose does not jump when it changes parents:
//!
//! ```ignore
//! let sun = world.spawn((Transform::default(), Name::new("sun")));
//! let planet = world.spawn((Transform::from_xyz(4.0, 0.0, 0.0),));
//! set_parent(&mut world, planet, sun)?;
//! // planet now orbits with sun, same world position as before
//! ```
//!
//! Despawning a parent does not touch its children. They keep a dangling
//! [`Parent`] and the transform pass treats them as roots; the per-frame
//! audit in [`HierarchySystem`] logs each such entity once. Use
//! [`World::despawn_recursive`] to take a whole subtree down.

use std::collections::HashSet;

use crate::error::EcsError;

use super::entity::Entity;
use super::system::System;
use super::transform::Transform;
use super::world::World;

/// Link to the entity's parent. At most one per entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parent(pub Entity);

/// Ordered child list, maintained by the hierarchy hooks. Never present
/// while empty. Treat as read-only; edit structure through [`set_parent`]
/// and [`remove_parent`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Children(pub Vec<Entity>);

// ── Structural operations ───────────────────────────────────────────────

/// Makes `child` a child of `parent`, preserving the child's world pose.
///
/// Re-expresses the child's transform in the new parent's space (when both
/// carry a [`Transform`]), so the object stays put on screen and only its
/// local values change.
///
/// Setting an entity as its own parent is a silent no-op. A dead `child`
/// returns [`EcsError::InvalidHandle`]; a request that would make `child`
/// an ancestor of itself returns [`EcsError::CycleDetected`] and leaves the
/// hierarchy untouched. A dead `parent` is accepted, the child just dangles
/// until the handle is replaced or removed.
pub fn set_parent(world: &mut World, child: Entity, parent: Entity) -> Result<(), EcsError> {
    if child == parent {
        return Ok(());
    }
    if !world.is_alive(child) {
        return Err(EcsError::InvalidHandle);
    }
    if is_ancestor(world, child, parent) {
        log::error!(
            "Cannot set parent: would create a cycle in the hierarchy ({child} -> {parent})"
        );
        return Err(EcsError::CycleDetected);
    }
    world.insert(child, Parent(parent));
    preserve_world_pose(world, child, parent);
    Ok(())
}

/// Detaches `child` from its parent, keeping its world pose by promoting
/// the resolved world transform to the new local transform. No-op when the
/// entity has no parent or is dead.
pub fn remove_parent(world: &mut World, child: Entity) {
    if !world.has::<Parent>(child) {
        return;
    }
    if let Some(transform) = world.get_mut::<Transform>(child) {
        transform.local_position = transform.position;
        transform.local_rotation = transform.rotation;
        transform.local_scale = transform.scale;
        transform.matrix_dirty = true;
    }
    world.remove::<Parent>(child);
}

/// Whether `ancestor` appears on the parent chain of `entity`. An entity is
/// considered its own ancestor. The walk is bounded by the live entity
/// count, so it terminates even on a corrupted chain.
pub fn is_ancestor(world: &World, ancestor: Entity, entity: Entity) -> bool {
    if ancestor == entity {
        return true;
    }
    let mut current = entity;
    let mut remaining = world.entity_count();
    while remaining > 0 {
        match world.get::<Parent>(current) {
            Some(&Parent(next)) => {
                if next == ancestor {
                    return true;
                }
                current = next;
                remaining -= 1;
            }
            None => return false,
        }
    }
    false
}

/// The entity's parent, if it has one.
pub fn parent(world: &World, entity: Entity) -> Option<Entity> {
    world.get::<Parent>(entity).map(|p| p.0)
}

/// The entity's children, in attach order. Empty when it has none.
pub fn children(world: &World, entity: Entity) -> Vec<Entity> {
    world
        .get::<Children>(entity)
        .map(|c| c.0.clone())
        .unwrap_or_default()
}

/// Rewrites `child`'s local transform so that, composed with `parent`'s
/// current world transform, it reproduces the child's current world pose.
/// Skipped when either side has no [`Transform`].
fn preserve_world_pose(world: &mut World, child: Entity, parent: Entity) {
    let Some(parent_transform) = world.get::<Transform>(parent) else {
        return;
    };
    let parent_position = parent_transform.position;
    let parent_rotation = parent_transform.rotation;
    let parent_scale = parent_transform.scale;

    let Some(transform) = world.get_mut::<Transform>(child) else {
        return;
    };
    let inverse_rotation = parent_rotation.inverse();
    transform.local_position =
        (inverse_rotation * (transform.position - parent_position)) / parent_scale;
    transform.local_rotation = inverse_rotation * transform.rotation;
    transform.local_scale = transform.scale / parent_scale;
    transform.matrix_dirty = true;
}

// ── Hooks ───────────────────────────────────────────────────────────────

fn on_parent_inserted(world: &mut World, child: Entity) {
    let Some(&Parent(parent)) = world.get::<Parent>(child) else {
        return;
    };
    if !world.is_alive(parent) {
        return;
    }
    if let Some(siblings) = world.get_mut::<Children>(parent) {
        if !siblings.0.contains(&child) {
            siblings.0.push(child);
        }
    } else {
        world.insert(parent, Children(vec![child]));
    }
}

fn on_parent_removed(world: &mut World, child: Entity) {
    let Some(&Parent(parent)) = world.get::<Parent>(child) else {
        return;
    };
    if !world.is_alive(parent) {
        return;
    }
    let now_empty = match world.get_mut::<Children>(parent) {
        Some(siblings) => {
            siblings.0.retain(|&c| c != child);
            siblings.0.is_empty()
        }
        None => false,
    };
    if now_empty {
        world.remove::<Children>(parent);
    }
}

// ── System ──────────────────────────────────────────────────────────────

/// Registers the hierarchy hooks and audits parent links once per frame.
///
/// The audit flags entities whose parent has been despawned. Each is logged
/// once; the entry clears if the link becomes valid again (the stale parent
/// handle was replaced).
pub struct HierarchySystem {
    warned_dangling: HashSet<Entity>,
}

impl HierarchySystem {
    pub fn new() -> Self {
        Self {
            warned_dangling: HashSet::new(),
        }
    }
}

impl Default for HierarchySystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for HierarchySystem {
    fn name(&self) -> &'static str {
        "hierarchy"
    }

    fn init(&mut self, world: &mut World) {
        world.on_insert::<Parent>(on_parent_inserted);
        world.on_remove::<Parent>(on_parent_removed);
        log::debug!("hierarchy hooks registered");
    }

    fn update(&mut self, world: &mut World, _dt: f32) {
        for entity in world.view::<(Parent,)>() {
            let Some(&Parent(parent)) = world.get::<Parent>(entity) else {
                continue;
            };
            if world.is_alive(parent) {
                self.warned_dangling.remove(&entity);
            } else if self.warned_dangling.insert(entity) {
                log::warn!("{entity} points at dead parent {parent}; treating it as a root");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::{Quat, Vec3};

    use super::super::transform::resolve_world_transforms;
    use super::*;

    fn hierarchy_world() -> World {
        let mut world = World::new();
        let mut system = HierarchySystem::new();
        system.init(&mut world);
        world
    }

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn set_parent_links_both_sides() {
        let mut world = hierarchy_world();
        let parent_entity = world.spawn_empty();
        let child = world.spawn_empty();

        set_parent(&mut world, child, parent_entity).unwrap();
        assert_eq!(parent(&world, child), Some(parent_entity));
        assert_eq!(children(&world, parent_entity), vec![child]);
    }

    #[test]
    fn children_keep_attach_order() {
        let mut world = hierarchy_world();
        let root = world.spawn_empty();
        let a = world.spawn_empty();
        let b = world.spawn_empty();
        let c = world.spawn_empty();
        set_parent(&mut world, a, root).unwrap();
        set_parent(&mut world, b, root).unwrap();
        set_parent(&mut world, c, root).unwrap();
        assert_eq!(children(&world, root), vec![a, b, c]);
    }

    #[test]
    fn reparent_moves_between_child_lists() {
        let mut world = hierarchy_world();
        let first = world.spawn_empty();
        let second = world.spawn_empty();
        let child = world.spawn_empty();

        set_parent(&mut world, child, first).unwrap();
        set_parent(&mut world, child, second).unwrap();

        assert_eq!(parent(&world, child), Some(second));
        assert_eq!(children(&world, second), vec![child]);
        // Old list emptied out, so the component itself is gone.
        assert!(!world.has::<Children>(first));
    }

    #[test]
    fn remove_parent_detaches_and_prunes() {
        let mut world = hierarchy_world();
        let parent_entity = world.spawn_empty();
        let child = world.spawn_empty();
        set_parent(&mut world, child, parent_entity).unwrap();

        remove_parent(&mut world, child);
        assert_eq!(parent(&world, child), None);
        assert!(!world.has::<Children>(parent_entity));

        // Detaching again is harmless.
        remove_parent(&mut world, child);
    }

    #[test]
    fn raw_parent_insert_goes_through_hooks() {
        let mut world = hierarchy_world();
        let first = world.spawn_empty();
        let second = world.spawn_empty();
        let child = world.spawn_empty();

        world.insert(child, Parent(first));
        assert_eq!(children(&world, first), vec![child]);

        // Replacing the component reroutes the child list too.
        world.insert(child, Parent(second));
        assert!(!world.has::<Children>(first));
        assert_eq!(children(&world, second), vec![child]);
    }

    #[test]
    fn spawn_bundle_with_parent_registers_child() {
        let mut world = hierarchy_world();
        let root = world.spawn_empty();
        let child = world.spawn((Parent(root),));
        assert_eq!(children(&world, root), vec![child]);
    }

    #[test]
    fn self_parent_is_silent_noop() {
        let mut world = hierarchy_world();
        let e = world.spawn_empty();
        assert_eq!(set_parent(&mut world, e, e), Ok(()));
        assert!(!world.has::<Parent>(e));
    }

    #[test]
    fn dead_child_is_rejected() {
        let mut world = hierarchy_world();
        let parent_entity = world.spawn_empty();
        let child = world.spawn_empty();
        world.despawn(child);
        assert_eq!(
            set_parent(&mut world, child, parent_entity),
            Err(EcsError::InvalidHandle)
        );
    }

    #[test]
    fn dead_parent_is_accepted_as_dangling() {
        let mut world = hierarchy_world();
        let parent_entity = world.spawn_empty();
        let child = world.spawn_empty();
        world.despawn(parent_entity);

        assert_eq!(set_parent(&mut world, child, parent_entity), Ok(()));
        assert_eq!(parent(&world, child), Some(parent_entity));
    }

    #[test]
    fn two_node_cycle_is_rejected() {
        let mut world = hierarchy_world();
        let a = world.spawn_empty();
        let b = world.spawn_empty();
        set_parent(&mut world, a, b).unwrap();

        assert_eq!(set_parent(&mut world, b, a), Err(EcsError::CycleDetected));
        assert_eq!(parent(&world, a), Some(b));
        assert_eq!(parent(&world, b), None);
        assert_eq!(children(&world, b), vec![a]);
    }

    #[test]
    fn deep_cycle_leaves_chain_intact() {
        let mut world = hierarchy_world();
        let root = world.spawn_empty();
        let mid = world.spawn_empty();
        let leaf = world.spawn_empty();
        set_parent(&mut world, mid, root).unwrap();
        set_parent(&mut world, leaf, mid).unwrap();

        assert_eq!(
            set_parent(&mut world, root, leaf),
            Err(EcsError::CycleDetected)
        );
        assert_eq!(parent(&world, root), None);
        assert_eq!(parent(&world, mid), Some(root));
        assert_eq!(parent(&world, leaf), Some(mid));
        assert!(!world.has::<Children>(leaf));
    }

    #[test]
    fn is_ancestor_walks_the_chain() {
        let mut world = hierarchy_world();
        let root = world.spawn_empty();
        let mid = world.spawn_empty();
        let leaf = world.spawn_empty();
        let stranger = world.spawn_empty();
        set_parent(&mut world, mid, root).unwrap();
        set_parent(&mut world, leaf, mid).unwrap();

        assert!(is_ancestor(&world, root, leaf));
        assert!(is_ancestor(&world, mid, leaf));
        assert!(is_ancestor(&world, leaf, leaf));
        assert!(!is_ancestor(&world, leaf, root));
        assert!(!is_ancestor(&world, stranger, leaf));
    }

    #[test]
    fn despawn_detaches_from_parent_list() {
        let mut world = hierarchy_world();
        let parent_entity = world.spawn_empty();
        let a = world.spawn_empty();
        let b = world.spawn_empty();
        set_parent(&mut world, a, parent_entity).unwrap();
        set_parent(&mut world, b, parent_entity).unwrap();

        world.despawn(a);
        assert_eq!(children(&world, parent_entity), vec![b]);
        world.despawn(b);
        assert!(!world.has::<Children>(parent_entity));
    }

    #[test]
    fn despawn_parent_leaves_children_dangling() {
        let mut world = hierarchy_world();
        let parent_entity = world.spawn_empty();
        let child = world.spawn_empty();
        set_parent(&mut world, child, parent_entity).unwrap();

        world.despawn(parent_entity);
        assert!(world.is_alive(child));
        assert_eq!(parent(&world, child), Some(parent_entity));
        assert!(!world.is_alive(parent_entity));
    }

    #[test]
    fn despawn_recursive_takes_whole_subtree() {
        let mut world = hierarchy_world();
        let root = world.spawn_empty();
        let mid = world.spawn_empty();
        let leaf = world.spawn_empty();
        let sibling = world.spawn_empty();
        let outsider = world.spawn_empty();
        set_parent(&mut world, mid, root).unwrap();
        set_parent(&mut world, leaf, mid).unwrap();
        set_parent(&mut world, sibling, root).unwrap();

        assert!(world.despawn_recursive(root));
        assert!(!world.is_alive(root));
        assert!(!world.is_alive(mid));
        assert!(!world.is_alive(leaf));
        assert!(!world.is_alive(sibling));
        assert!(world.is_alive(outsider));
        assert!(!world.despawn_recursive(root));
    }

    #[test]
    fn audit_tracks_dangling_parents() {
        let mut world = World::new();
        let mut system = HierarchySystem::new();
        system.init(&mut world);

        let parent_entity = world.spawn_empty();
        let child = world.spawn_empty();
        set_parent(&mut world, child, parent_entity).unwrap();
        world.despawn(parent_entity);

        system.update(&mut world, 0.0);
        assert!(system.warned_dangling.contains(&child));
        // A second pass does not re-flag it.
        system.update(&mut world, 0.0);
        assert_eq!(system.warned_dangling.len(), 1);

        // Fixing the link clears the entry.
        let replacement = world.spawn_empty();
        set_parent(&mut world, child, replacement).unwrap();
        system.update(&mut world, 0.0);
        assert!(system.warned_dangling.is_empty());
    }

    #[test]
    fn reparent_preserves_world_pose() {
        let mut world = hierarchy_world();
        let parent_entity = world.spawn((Transform {
            local_position: Vec3::new(5.0, 0.0, 0.0),
            local_rotation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            local_scale: Vec3::splat(2.0),
            ..Transform::IDENTITY
        },));
        let child = world.spawn((Transform::from_xyz(7.0, 1.0, -3.0),));
        resolve_world_transforms(&mut world);

        let before = world.get::<Transform>(child).unwrap().position;
        set_parent(&mut world, child, parent_entity).unwrap();
        resolve_world_transforms(&mut world);
        let after = world.get::<Transform>(child).unwrap().position;

        assert!(approx(before, after), "{before:?} vs {after:?}");
        // The local values did change to compensate.
        let local = world.get::<Transform>(child).unwrap().local_position;
        assert!(!approx(local, before));
    }

    #[test]
    fn remove_parent_keeps_world_pose() {
        let mut world = hierarchy_world();
        let parent_entity = world.spawn((Transform {
            local_position: Vec3::new(1.0, 2.0, 3.0),
            local_rotation: Quat::from_rotation_z(0.7),
            ..Transform::IDENTITY
        },));
        let child = world.spawn((Transform::from_xyz(0.5, 0.0, 0.0),));
        set_parent(&mut world, child, parent_entity).unwrap();
        resolve_world_transforms(&mut world);

        let before = world.get::<Transform>(child).unwrap().position;
        remove_parent(&mut world, child);
        resolve_world_transforms(&mut world);
        let transform = world.get::<Transform>(child).unwrap();

        assert!(approx(transform.position, before));
        assert!(approx(transform.local_position, before));
    }
}
