//! # fafnir
//!
//! A small 3D engine core: a sparse-set ECS with generational entity
//! handles, a hook-maintained transform hierarchy, free-fly cameras, and a
//! wgpu mesh renderer, all driven by a fixed-order schedule.
//!
//! Build an [`app::App`], spawn entities in a setup closure, and run:
//!
//! ```ignore
//! use fafnir::prelude::*;
//!
//! fn main() {
//!     App::new("spinning cube")
//!         .setup(|world| {
//!             create_main_camera(world, Vec3::new(0.0, 2.0, 6.0));
//!             world.spawn((
//!                 Transform::from_xyz(0.0, 0.5, 0.0),
//!                 MeshRenderer::cube().with_color([0.8, 0.2, 0.2, 1.0]),
//!             ));
//!         })
//!         .run();
//! }
//! ```
//!
//! The `editor` feature (on by default) compiles an egui overlay with a
//! scene tree, component inspector, and toolbar. Toggle it with F12.

pub mod app;
pub mod camera;
pub mod ecs;
#[cfg(feature = "editor")]
mod editor;
pub mod error;
pub mod input;
pub mod math;
pub mod prelude;
pub mod render;
pub mod scene;
pub mod time;
mod window;
