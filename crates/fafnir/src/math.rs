//! Math re-exports.
//!
//! The engine uses [glam](https://docs.rs/glam) for all vector and matrix
//! math. The common types are re-exported here so user code does not need a
//! direct glam dependency.

pub use glam::{EulerRot, Mat3, Mat4, Quat, Vec2, Vec3, Vec4};
