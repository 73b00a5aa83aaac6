//! Editor playground: a small parented scene to poke at with the F12 panels.
//!
//! Select entities in the hierarchy tree, drag their local transforms in
//! the inspector, reparent with the toolbar buttons. Dragging the "Rig"
//! entity moves all three cubes at once.
//!
//! Run with: `cargo run -p fafnir --example editor`

use fafnir::prelude::*;

fn main() {
    env_logger::init();

    App::new("fafnir editor").setup(setup).run();
}

fn setup(world: &mut World) {
    let camera = create_main_camera(world, Vec3::new(0.0, 3.0, 8.0));
    world.insert(camera, CameraController::default());

    let rig = world.spawn((Transform::from_xyz(0.0, 1.0, 0.0), Name::new("Rig")));
    for (offset, color, name) in [
        (Vec3::new(-1.5, 0.0, 0.0), [0.9, 0.2, 0.2, 1.0], "Red"),
        (Vec3::ZERO, [0.2, 0.9, 0.2, 1.0], "Green"),
        (Vec3::new(1.5, 0.0, 0.0), [0.2, 0.4, 0.9, 1.0], "Blue"),
    ] {
        let cube = world.spawn((
            Transform::from_position(Vec3::new(0.0, 1.0, 0.0) + offset),
            MeshRenderer::cube().with_color(color),
            Name::new(name),
        ));
        set_parent(world, cube, rig).unwrap();
    }

    world.spawn((
        Transform::from_xyz(0.0, 0.0, 0.0).with_scale(Vec3::new(12.0, 1.0, 12.0)),
        MeshRenderer::plane().with_color([0.3, 0.3, 0.35, 1.0]),
        Name::new("Ground"),
    ));
}
