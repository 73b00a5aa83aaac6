//! Convenience re-exports. `use fafnir::prelude::*` pulls in the common
//! engine types plus the hierarchy and camera helpers.

pub use crate::app::App;
pub use crate::camera::{
    ActiveCamera, Camera, CameraController, CameraSystem, create_main_camera,
};
pub use crate::ecs::{
    Bundle, Children, ComponentSet, Entity, FnSystem, HierarchySystem, Name, Parent, Schedule,
    System, Tag, Transform, TransformSystem, World, children, is_ancestor, parent, remove_parent,
    resolve_world_transforms, set_parent,
};
pub use crate::error::EcsError;
pub use crate::input::{CursorPosition, Input, InputState, KeyCode, MouseButton};
pub use crate::math::{EulerRot, Mat4, Quat, Vec2, Vec3, Vec4};
pub use crate::render::{
    ClearColor, GpuContext, MeshHandle, MeshRenderer, MeshStore, MeshSubmitSystem, MeshVertex,
    TextureHandle, TextureStore, cube_geometry, plane_geometry,
};
pub use crate::scene::{Scene, SceneManager};
pub use crate::time::Time;
