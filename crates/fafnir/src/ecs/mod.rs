//! Entity-component-system core.
//!
//! - [`entity`]: generational handles and the slot allocator.
//! - [`world`]: component storage, resources, hooks, and views.
//! - [`hierarchy`]: parent/child links kept consistent by hooks.
//! - [`transform`]: local/world pose and the per-frame resolver.
//! - [`system`]: the `System` trait and the fixed-order schedule.

pub(crate) mod component;
pub mod entity;
pub mod hierarchy;
pub mod system;
pub mod transform;
pub mod view;
pub mod world;

pub use entity::Entity;
pub use hierarchy::{
    Children, HierarchySystem, Parent, children, is_ancestor, parent, remove_parent, set_parent,
};
pub use system::{FnSystem, Schedule, System};
pub use transform::{Transform, TransformSystem, resolve_world_transforms};
pub use view::ComponentSet;
pub use world::{Bundle, Name, Tag, World};
