//! Solar system demo: nested orbits via the transform hierarchy.
//!
//! A sun spins at the origin, a planet orbits it, and a moon orbits the
//! planet. Each body is a child of the one it orbits, so the transform pass
//! does all the work. Hold the right mouse button and drag to look around,
//! WASD/E/Q to fly, scroll to dolly.
//!
//! Run with: `cargo run -p fafnir --example solar_system`

use fafnir::prelude::*;

/// Spin rate in radians per second, applied to the local rotation.
struct Spin(f32);

fn main() {
    env_logger::init();

    App::new("fafnir solar system")
        .resource(ClearColor([0.02, 0.02, 0.06, 1.0]))
        .setup(setup)
        .add_system(FnSystem::new("orbits", orbit_system))
        .run();
}

fn setup(world: &mut World) {
    let camera = create_main_camera(world, Vec3::new(0.0, 6.0, 14.0));
    world.insert(camera, CameraController::default());

    let sun = world.spawn((
        Transform::from_xyz(0.0, 0.0, 0.0).with_scale(Vec3::splat(2.0)),
        MeshRenderer::cube().with_color([1.0, 0.85, 0.2, 1.0]),
        Name::new("Sun"),
        Spin(0.2),
    ));

    // Constructed at its world-space pose; set_parent keeps it there and
    // derives the local offset the orbit happens around.
    let planet = world.spawn((
        Transform::from_xyz(4.0, 0.0, 0.0).with_scale(Vec3::splat(0.5)),
        MeshRenderer::cube().with_color([0.25, 0.5, 1.0, 1.0]),
        Name::new("Planet"),
        Spin(1.0),
    ));
    set_parent(world, planet, sun).unwrap();

    let moon = world.spawn((
        Transform::from_xyz(6.5, 0.0, 0.0).with_scale(Vec3::splat(0.4)),
        MeshRenderer::cube().with_color([0.7, 0.7, 0.75, 1.0]),
        Name::new("Moon"),
    ));
    set_parent(world, moon, planet).unwrap();

    world.spawn((
        Transform::from_xyz(0.0, -3.0, 0.0).with_scale(Vec3::new(20.0, 1.0, 20.0)),
        MeshRenderer::plane().with_color([0.15, 0.15, 0.2, 1.0]),
        Name::new("Ground"),
    ));
}

fn orbit_system(world: &mut World, dt: f32) {
    for entity in world.view::<(Spin, Transform)>() {
        let speed = world.get::<Spin>(entity).map(|s| s.0);
        if let Some(speed) = speed {
            if let Some(transform) = world.get_mut::<Transform>(entity) {
                transform.local_rotation =
                    (Quat::from_rotation_y(speed * dt) * transform.local_rotation).normalize();
                transform.matrix_dirty = true;
            }
        }
    }
}
