//! The [`Transform`] component and the world-transform resolver.
//!
//! Every posed entity carries local values (relative to its parent) and the
//! world values the resolver derived from them last pass. Game code writes
//! the local fields and reads the world fields; [`TransformSystem`] runs
//! once per frame, walking the hierarchy parents-first, and composes
//!
//! ```text
//! world_position = parent_position + parent_rotation * (local_position * parent_scale)
//! world_rotation = parent_rotation * local_rotation
//! world_scale    = parent_scale    * local_scale     (component-wise)
//! ```
//!
//! Entities without a parent, with a despawned parent, or with a parent that
//! has no [`Transform`] are treated as roots: world values are copied from
//! local values.
//!
//! The cached matrices are not rebuilt here. Resolution only flips
//! `matrix_dirty` when a world value actually changed; whoever needs the
//! matrix (the mesh pass, mostly) calls [`Transform::refresh_matrices`]
//! lazily, so a static scene costs no matrix math per frame.

use std::collections::{HashSet, VecDeque};

use glam::{Mat4, Quat, Vec3};

use super::entity::Entity;
use super::hierarchy::{Children, Parent};
use super::system::System;
use super::world::World;

/// Position, rotation, and scale, in parent space and in world space.
///
/// Constructors set the world fields to the same values as the local ones,
/// so a freshly built entity reads sensibly before the first resolver pass
/// and [`set_parent`](super::hierarchy::set_parent) sees the intended pose.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    pub local_position: Vec3,
    pub local_rotation: Quat,
    pub local_scale: Vec3,
    /// World-space position, written by the resolver.
    pub position: Vec3,
    /// World-space rotation, written by the resolver.
    pub rotation: Quat,
    /// World-space scale, written by the resolver.
    pub scale: Vec3,
    /// Set when a world value changed since the matrices were last rebuilt.
    pub matrix_dirty: bool,
    pub local_matrix: Mat4,
    pub world_matrix: Mat4,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        local_position: Vec3::ZERO,
        local_rotation: Quat::IDENTITY,
        local_scale: Vec3::ONE,
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
        matrix_dirty: true,
        local_matrix: Mat4::IDENTITY,
        world_matrix: Mat4::IDENTITY,
    };

    pub fn from_xyz(x: f32, y: f32, z: f32) -> Self {
        Self::from_position(Vec3::new(x, y, z))
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            local_position: position,
            position,
            ..Self::IDENTITY
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.local_rotation = rotation;
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.local_scale = scale;
        self.scale = scale;
        self
    }

    /// Unit vector the entity faces, world space. -Z convention.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Rebuilds both cached matrices from the current values and clears the
    /// dirty flag.
    pub fn refresh_matrices(&mut self) {
        self.local_matrix = Mat4::from_scale_rotation_translation(
            self.local_scale,
            self.local_rotation,
            self.local_position,
        );
        self.world_matrix =
            Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position);
        self.matrix_dirty = false;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Per-frame pass that resolves world transforms for the whole hierarchy.
pub struct TransformSystem;

impl System for TransformSystem {
    fn name(&self) -> &'static str {
        "transform"
    }

    fn update(&mut self, world: &mut World, _dt: f32) {
        resolve_world_transforms(world);
    }
}

/// Resolves world transforms parents-before-children in a single breadth
/// first walk. Each entity is visited at most once; the visited set keeps
/// the walk terminating even if child lists were corrupted from outside.
pub fn resolve_world_transforms(world: &mut World) {
    let mut queue: VecDeque<(Entity, Vec3, Quat, Vec3)> = VecDeque::new();

    for entity in world.view::<(Transform,)>() {
        let is_root = match world.get::<Parent>(entity) {
            None => true,
            Some(&Parent(parent)) => !world.is_alive(parent) || !world.has::<Transform>(parent),
        };
        if !is_root {
            continue;
        }
        let Some((position, rotation, scale)) =
            compose(world, entity, Vec3::ZERO, Quat::IDENTITY, Vec3::ONE)
        else {
            continue;
        };
        enqueue_children(world, entity, position, rotation, scale, &mut queue);
    }

    let mut visited: HashSet<Entity> = HashSet::new();
    while let Some((entity, parent_position, parent_rotation, parent_scale)) = queue.pop_front() {
        if !visited.insert(entity) {
            continue;
        }
        let Some((position, rotation, scale)) =
            compose(world, entity, parent_position, parent_rotation, parent_scale)
        else {
            continue;
        };
        enqueue_children(world, entity, position, rotation, scale, &mut queue);
    }
}

/// Applies the composition rule to one entity, writing back only on change.
/// Returns the resolved world triple, or `None` when the entity is gone or
/// has no transform.
fn compose(
    world: &mut World,
    entity: Entity,
    parent_position: Vec3,
    parent_rotation: Quat,
    parent_scale: Vec3,
) -> Option<(Vec3, Quat, Vec3)> {
    let transform = world.get_mut::<Transform>(entity)?;
    let position = parent_position + parent_rotation * (transform.local_position * parent_scale);
    let rotation = parent_rotation * transform.local_rotation;
    let scale = parent_scale * transform.local_scale;
    if transform.position != position
        || transform.rotation != rotation
        || transform.scale != scale
    {
        transform.position = position;
        transform.rotation = rotation;
        transform.scale = scale;
        transform.matrix_dirty = true;
    }
    Some((position, rotation, scale))
}

fn enqueue_children(
    world: &World,
    entity: Entity,
    position: Vec3,
    rotation: Quat,
    scale: Vec3,
    queue: &mut VecDeque<(Entity, Vec3, Quat, Vec3)>,
) {
    if let Some(children) = world.get::<Children>(entity) {
        for &child in &children.0 {
            queue.push_back((child, position, rotation, scale));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::super::hierarchy::{HierarchySystem, set_parent};
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
    fn default_is_identity_and_dirty() {
        let transform = Transform::default();
        assert_eq!(transform.local_position, Vec3::ZERO);
        assert_eq!(transform.local_rotation, Quat::IDENTITY);
        assert_eq!(transform.local_scale, Vec3::ONE);
        assert!(transform.matrix_dirty);
    }

    #[test]
    fn root_world_equals_local() {
        let mut world = hierarchy_world();
        let e = world.spawn((Transform::from_xyz(3.0, -1.0, 2.0),));
        resolve_world_transforms(&mut world);
        let transform = world.get::<Transform>(e).unwrap();
        assert!(approx(transform.position, Vec3::new(3.0, -1.0, 2.0)));
        assert_eq!(transform.rotation, Quat::IDENTITY);
        assert_eq!(transform.scale, Vec3::ONE);
    }

    #[test]
    fn translation_chain_composes() {
        let mut world = hierarchy_world();
        let root = world.spawn((Transform::from_xyz(0.0, 0.0, 0.0),));
        let mid = world.spawn((Transform::from_xyz(1.0, 0.0, 0.0),));
        let leaf = world.spawn((Transform::from_xyz(2.0, 0.0, 0.0),));
        set_parent(&mut world, mid, root).unwrap();
        set_parent(&mut world, leaf, mid).unwrap();
        resolve_world_transforms(&mut world);

        let leaf_world = world.get::<Transform>(leaf).unwrap().position;
        assert!(approx(leaf_world, Vec3::new(2.0, 0.0, 0.0)));

        // Moving the root drags the whole chain along.
        world.get_mut::<Transform>(root).unwrap().local_position = Vec3::new(5.0, 0.0, 0.0);
        resolve_world_transforms(&mut world);
        let leaf_world = world.get::<Transform>(leaf).unwrap().position;
        assert!(approx(leaf_world, Vec3::new(7.0, 0.0, 0.0)));
    }

    #[test]
    fn parent_rotation_swings_children() {
        let mut world = hierarchy_world();
        let pivot = world.spawn((
            Transform::default().with_rotation(Quat::from_rotation_y(FRAC_PI_2)),
        ));
        let arm = world.spawn((Transform::from_xyz(1.0, 0.0, 0.0),));
        set_parent(&mut world, arm, pivot).unwrap();
        // Reparenting preserved the pose; point the local offset down +X again.
        world.get_mut::<Transform>(arm).unwrap().local_position = Vec3::X;
        resolve_world_transforms(&mut world);

        let arm_world = world.get::<Transform>(arm).unwrap().position;
        assert!(approx(arm_world, Vec3::new(0.0, 0.0, -1.0)), "{arm_world:?}");
    }

    #[test]
    fn nonuniform_parent_scale_applies_per_axis() {
        let mut world = hierarchy_world();
        let root = world.spawn((
            Transform::default().with_scale(Vec3::new(2.0, 1.0, 3.0)),
        ));
        let child = world.spawn((Transform::default(),));
        set_parent(&mut world, child, root).unwrap();
        world.get_mut::<Transform>(child).unwrap().local_position = Vec3::ONE;
        resolve_world_transforms(&mut world);

        let transform = world.get::<Transform>(child).unwrap();
        assert!(approx(transform.position, Vec3::new(2.0, 1.0, 3.0)));
        assert!(approx(transform.scale, Vec3::new(2.0, 1.0, 3.0)));
    }

    #[test]
    fn dangling_parent_resolves_as_root() {
        let mut world = hierarchy_world();
        let parent_entity = world.spawn((Transform::from_xyz(10.0, 0.0, 0.0),));
        let child = world.spawn((Transform::from_xyz(12.0, 0.0, 0.0),));
        set_parent(&mut world, child, parent_entity).unwrap();
        resolve_world_transforms(&mut world);
        world.despawn(parent_entity);

        world.get_mut::<Transform>(child).unwrap().local_position = Vec3::new(1.0, 0.0, 0.0);
        resolve_world_transforms(&mut world);
        let transform = world.get::<Transform>(child).unwrap();
        assert!(approx(transform.position, Vec3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn parent_without_transform_resolves_as_root() {
        let mut world = hierarchy_world();
        let bare = world.spawn_empty();
        let child = world.spawn((Transform::from_xyz(4.0, 0.0, 0.0),));
        set_parent(&mut world, child, bare).unwrap();
        resolve_world_transforms(&mut world);
        let transform = world.get::<Transform>(child).unwrap();
        assert!(approx(transform.position, Vec3::new(4.0, 0.0, 0.0)));
    }

    #[test]
    fn deep_chain_accumulates() {
        let mut world = hierarchy_world();
        let mut previous = world.spawn((Transform::from_xyz(1.0, 0.0, 0.0),));
        for depth in 2..=10 {
            // Raw Parent insert keeps the constructed local offsets.
            let next = world.spawn((
                Transform::from_xyz(depth as f32, 0.0, 0.0),
                Parent(previous),
            ));
            previous = next;
        }
        resolve_world_transforms(&mut world);
        let tip = world.get::<Transform>(previous).unwrap().position;
        // 1 + 2 + ... + 10
        assert!(approx(tip, Vec3::new(55.0, 0.0, 0.0)), "{tip:?}");
    }

    #[test]
    fn dirty_flag_follows_actual_change() {
        let mut world = hierarchy_world();
        let e = world.spawn((Transform::from_xyz(1.0, 0.0, 0.0),));
        resolve_world_transforms(&mut world);
        {
            let transform = world.get_mut::<Transform>(e).unwrap();
            assert!(transform.matrix_dirty);
            transform.refresh_matrices();
            assert!(!transform.matrix_dirty);
        }

        // Nothing moved, so the flag stays clear.
        resolve_world_transforms(&mut world);
        assert!(!world.get::<Transform>(e).unwrap().matrix_dirty);

        world.get_mut::<Transform>(e).unwrap().local_position = Vec3::new(2.0, 0.0, 0.0);
        resolve_world_transforms(&mut world);
        assert!(world.get::<Transform>(e).unwrap().matrix_dirty);
    }

    #[test]
    fn refreshed_matrix_matches_components() {
        let mut transform = Transform::from_xyz(1.0, 2.0, 3.0)
            .with_rotation(Quat::from_rotation_y(0.5))
            .with_scale(Vec3::splat(2.0));
        transform.refresh_matrices();
        let expected = Mat4::from_scale_rotation_translation(
            transform.scale,
            transform.rotation,
            transform.position,
        );
        assert_eq!(transform.world_matrix, expected);
    }

    #[test]
    fn facing_vectors_use_world_rotation() {
        let mut world = hierarchy_world();
        let e = world.spawn((
            Transform::default().with_rotation(Quat::from_rotation_y(FRAC_PI_2)),
        ));
        resolve_world_transforms(&mut world);
        let transform = world.get::<Transform>(e).unwrap();
        // Yawed 90 degrees left: forward is now -X.
        assert!(approx(transform.forward(), Vec3::NEG_X));
        assert!(approx(transform.right(), Vec3::NEG_Z));
        assert!(approx(transform.up(), Vec3::Y));
    }
}
