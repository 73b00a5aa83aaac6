//! Cameras, the active-camera resource, and a free-fly controller.
//!
//! [`CameraSystem`] runs after the transform pass. It drives any
//! [`CameraController`]s from input, rebuilds each camera's view and
//! projection matrices from its resolved [`Transform`], keeps projection
//! aspect in sync with the surface, and maintains the [`ActiveCamera`]
//! resource the renderer draws with.

use glam::{Mat4, Quat, Vec3};

use crate::ecs::{Entity, System, Transform, World};
use crate::input::{CursorPosition, InputState, KeyCode, MouseButton};
use crate::render::GpuContext;

/// Projection settings plus the matrices derived each frame.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Vertical field of view in degrees. Ignored for orthographic cameras.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Width over height. Overwritten from the surface size every frame
    /// while a window exists.
    pub aspect: f32,
    /// Marks the camera [`CameraSystem`] should fall back to when the
    /// active one disappears.
    pub is_main: bool,
    pub orthographic: bool,
    /// Vertical world-space extent visible to an orthographic camera.
    pub ortho_size: f32,
    pub view: Mat4,
    pub projection: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov: 60.0,
            near: 0.1,
            far: 1000.0,
            aspect: 16.0 / 9.0,
            is_main: false,
            orthographic: false,
            ortho_size: 10.0,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        }
    }
}

impl Camera {
    pub fn main() -> Self {
        Self {
            is_main: true,
            ..Default::default()
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// Rebuilds the view matrix from the transform's world pose and the
    /// projection matrix from the current settings.
    pub fn refresh(&mut self, transform: &Transform) {
        self.view = Mat4::look_to_rh(transform.position, transform.forward(), transform.up());
        self.projection = if self.orthographic {
            let half_height = self.ortho_size * 0.5;
            let half_width = half_height * self.aspect;
            Mat4::orthographic_rh(
                -half_width,
                half_width,
                -half_height,
                half_height,
                self.near,
                self.far,
            )
        } else {
            Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far)
        };
    }
}

/// The camera the renderer draws with. `None` renders a cleared frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActiveCamera(pub Option<Entity>);

/// Free-fly movement: WASD planar, E/Q vertical, hold right mouse to look,
/// scroll to dolly. All movement is applied to the local transform.
#[derive(Debug, Clone, Copy)]
pub struct CameraController {
    /// Units per second.
    pub movement_speed: f32,
    /// Radians per cursor pixel.
    pub rotation_speed: f32,
    /// Units per scroll line.
    pub zoom_speed: f32,
    pub active: bool,
    last_cursor: Option<(f32, f32)>,
}

impl Default for CameraController {
    fn default() -> Self {
        Self {
            movement_speed: 5.0,
            rotation_speed: 0.002,
            zoom_speed: 2.0,
            active: true,
            last_cursor: None,
        }
    }
}

pub struct CameraSystem;

impl System for CameraSystem {
    fn name(&self) -> &'static str {
        "camera"
    }

    fn init(&mut self, world: &mut World) {
        world.on_insert::<Camera>(on_camera_added);
    }

    fn update(&mut self, world: &mut World, dt: f32) {
        drive_controllers(world, dt);
        refresh_aspect(world);
        refresh_view_projections(world);
        ensure_active_camera(world);
    }
}

fn on_camera_added(_world: &mut World, entity: Entity) {
    log::debug!("camera component added to {entity}");
}

/// Spawns a main camera at `position`, demoting any previous main camera,
/// and makes it the active one.
pub fn create_main_camera(world: &mut World, position: Vec3) -> Entity {
    for entity in world.view::<(Camera,)>() {
        let Some(camera) = world.get_mut::<Camera>(entity) else {
            continue;
        };
        if camera.is_main {
            camera.is_main = false;
            log::warn!("entity {entity} was the main camera; demoting it");
        }
    }
    let camera = world.spawn((Transform::from_position(position), Camera::main()));
    world.insert_resource(ActiveCamera(Some(camera)));
    camera
}

/// Alive, and carries both pieces the renderer needs.
pub(crate) fn camera_renderable(world: &World, entity: Entity) -> bool {
    world.is_alive(entity) && world.has::<Camera>(entity) && world.has::<Transform>(entity)
}

fn drive_controllers(world: &mut World, dt: f32) {
    let Some(input) = world.get_resource::<InputState>() else {
        return;
    };
    let movement = Vec3::new(
        (input.pressed(KeyCode::KeyD) as i32 - input.pressed(KeyCode::KeyA) as i32) as f32,
        (input.pressed(KeyCode::KeyE) as i32 - input.pressed(KeyCode::KeyQ) as i32) as f32,
        (input.pressed(KeyCode::KeyS) as i32 - input.pressed(KeyCode::KeyW) as i32) as f32,
    );
    let looking = input.mouse_pressed(MouseButton::Right);
    let scroll = input.scroll();
    let cursor = world
        .get_resource::<CursorPosition>()
        .copied()
        .unwrap_or_default();

    for entity in world.view::<(CameraController, Transform)>() {
        let Some(controller) = world.get::<CameraController>(entity).copied() else {
            continue;
        };
        if !controller.active {
            continue;
        }
        if let Some(transform) = world.get_mut::<Transform>(entity) {
            let rotation = transform.local_rotation;
            if movement != Vec3::ZERO {
                transform.local_position +=
                    rotation * (movement.normalize_or_zero() * controller.movement_speed * dt);
            }
            if scroll != 0.0 {
                transform.local_position +=
                    rotation * Vec3::NEG_Z * (scroll * controller.zoom_speed);
            }
            if looking {
                if let Some((last_x, last_y)) = controller.last_cursor {
                    let dx = cursor.x - last_x;
                    let dy = cursor.y - last_y;
                    if dx != 0.0 || dy != 0.0 {
                        // Yaw about world Y, pitch about the camera's own X.
                        let yaw = Quat::from_rotation_y(-dx * controller.rotation_speed);
                        let pitch = Quat::from_rotation_x(-dy * controller.rotation_speed);
                        transform.local_rotation = (yaw * rotation * pitch).normalize();
                    }
                }
            }
        }
        if let Some(controller) = world.get_mut::<CameraController>(entity) {
            controller.last_cursor = looking.then_some((cursor.x, cursor.y));
        }
    }
}

fn refresh_aspect(world: &mut World) {
    let Some((width, height)) = world
        .get_resource::<GpuContext>()
        .map(|gpu| gpu.surface_size())
    else {
        return;
    };
    if height == 0 {
        return;
    }
    let aspect = width as f32 / height as f32;
    for entity in world.view::<(Camera,)>() {
        if let Some(camera) = world.get_mut::<Camera>(entity) {
            camera.aspect = aspect;
        }
    }
}

fn refresh_view_projections(world: &mut World) {
    for entity in world.view::<(Camera, Transform)>() {
        let Some(transform) = world.get::<Transform>(entity).cloned() else {
            continue;
        };
        if let Some(camera) = world.get_mut::<Camera>(entity) {
            camera.refresh(&transform);
        }
    }
}

fn ensure_active_camera(world: &mut World) {
    let current = world.get_resource::<ActiveCamera>().copied().unwrap_or_default();
    if let Some(entity) = current.0 {
        if camera_renderable(world, entity) {
            return;
        }
        log::warn!("active camera {entity} is gone or incomplete; picking a new one");
    }
    let fallback = world
        .view::<(Camera, Transform)>()
        .into_iter()
        .find(|&entity| world.get::<Camera>(entity).is_some_and(|camera| camera.is_main));
    match fallback {
        Some(entity) => {
            log::info!("main camera is now {entity}");
            world.insert_resource(ActiveCamera(Some(entity)));
        }
        None => {
            if current.0.is_some() {
                world.insert_resource(ActiveCamera(None));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_mat(a: Mat4, b: Mat4) -> bool {
        a.to_cols_array()
            .iter()
            .zip(b.to_cols_array().iter())
            .all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn default_projection_settings() {
        let camera = Camera::default();
        assert_eq!(camera.fov, 60.0);
        assert_eq!(camera.near, 0.1);
        assert_eq!(camera.far, 1000.0);
        assert!(!camera.is_main);
        assert!(!camera.orthographic);
        assert!(Camera::main().is_main);
    }

    #[test]
    fn view_is_identity_at_origin() {
        let mut camera = Camera::default();
        camera.refresh(&Transform::default());
        assert!(approx_mat(camera.view, Mat4::IDENTITY));
        assert!(camera.projection != Mat4::IDENTITY);
    }

    #[test]
    fn orthographic_and_perspective_differ() {
        let transform = Transform::default();
        let mut perspective = Camera::default();
        perspective.refresh(&transform);
        let mut ortho = Camera {
            orthographic: true,
            ..Default::default()
        };
        ortho.refresh(&transform);
        assert!(!approx_mat(perspective.projection, ortho.projection));
        // Orthographic projection has no perspective divide term.
        assert_eq!(ortho.projection.col(3).w, 1.0);
    }

    #[test]
    fn system_prefers_main_camera() {
        let mut world = World::new();
        let _extra = world.spawn((Transform::default(), Camera::default()));
        let main = world.spawn((Transform::default(), Camera::main()));
        CameraSystem.update(&mut world, 0.016);
        assert_eq!(world.resource::<ActiveCamera>().0, Some(main));
    }

    #[test]
    fn invalid_active_camera_falls_back() {
        let mut world = World::new();
        let main = world.spawn((Transform::default(), Camera::main()));
        let dead = world.spawn((Transform::default(), Camera::default()));
        world.despawn(dead);
        world.insert_resource(ActiveCamera(Some(dead)));
        CameraSystem.update(&mut world, 0.016);
        assert_eq!(world.resource::<ActiveCamera>().0, Some(main));
    }

    #[test]
    fn no_cameras_clears_active() {
        let mut world = World::new();
        let gone = world.spawn((Transform::default(), Camera::main()));
        world.insert_resource(ActiveCamera(Some(gone)));
        world.despawn(gone);
        CameraSystem.update(&mut world, 0.016);
        assert_eq!(world.resource::<ActiveCamera>().0, None);
    }

    #[test]
    fn create_main_camera_demotes_previous() {
        let mut world = World::new();
        let first = create_main_camera(&mut world, Vec3::ZERO);
        let second = create_main_camera(&mut world, Vec3::new(0.0, 5.0, 5.0));
        assert!(!world.get::<Camera>(first).unwrap().is_main);
        assert!(world.get::<Camera>(second).unwrap().is_main);
        assert_eq!(world.resource::<ActiveCamera>().0, Some(second));
    }

    #[test]
    fn controller_flies_forward() {
        let mut world = World::new();
        let mut input = InputState::new();
        input.keys.press(KeyCode::KeyW);
        world.insert_resource(input);
        world.insert_resource(CursorPosition::default());
        let e = world.spawn((Transform::default(), CameraController::default()));

        CameraSystem.update(&mut world, 1.0);
        let position = world.get::<Transform>(e).unwrap().local_position;
        assert!(position.z < -4.9, "{position:?}");
        assert_eq!(position.x, 0.0);
    }

    #[test]
    fn inactive_controller_holds_still() {
        let mut world = World::new();
        let mut input = InputState::new();
        input.keys.press(KeyCode::KeyW);
        world.insert_resource(input);
        world.insert_resource(CursorPosition::default());
        let e = world.spawn((
            Transform::default(),
            CameraController {
                active: false,
                ..Default::default()
            },
        ));
        CameraSystem.update(&mut world, 1.0);
        assert_eq!(world.get::<Transform>(e).unwrap().local_position, Vec3::ZERO);
    }

    #[test]
    fn scroll_dollies_along_view_axis() {
        let mut world = World::new();
        let mut input = InputState::new();
        input.scroll = 2.0;
        world.insert_resource(input);
        world.insert_resource(CursorPosition::default());
        let e = world.spawn((Transform::default(), CameraController::default()));
        CameraSystem.update(&mut world, 0.016);
        let position = world.get::<Transform>(e).unwrap().local_position;
        assert!(position.z < 0.0);
    }

    #[test]
    fn right_drag_yaws_the_camera() {
        let mut world = World::new();
        let mut input = InputState::new();
        input.mouse.press(MouseButton::Right);
        world.insert_resource(input);
        world.insert_resource(CursorPosition { x: 100.0, y: 100.0 });
        let e = world.spawn((Transform::default(), CameraController::default()));

        // First frame only latches the cursor.
        CameraSystem.update(&mut world, 0.016);
        assert_eq!(
            world.get::<Transform>(e).unwrap().local_rotation,
            Quat::IDENTITY
        );

        world.insert_resource(CursorPosition { x: 150.0, y: 100.0 });
        CameraSystem.update(&mut world, 0.016);
        let rotation = world.get::<Transform>(e).unwrap().local_rotation;
        assert!(rotation != Quat::IDENTITY);
        // Dragging right turns right: forward gains a +X component.
        let forward = rotation * Vec3::NEG_Z;
        assert!(forward.x > 0.0, "{forward:?}");
    }
}
