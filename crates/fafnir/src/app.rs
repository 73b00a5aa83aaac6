//! Application builder and entry point.
//!
//! [`App`] is the main entry point for a fafnir application. Configure
//! resources, scenes, and systems, then call [`run`](App::run) to start the
//! event loop.
//!
//! # Example
//!
//! ```ignore
//! use fafnir::prelude::*;
//!
//! fn main() {
//!     App::new("My Game")
//!         .setup(|world| {
//!             create_main_camera(world, Vec3::new(0.0, 2.0, 8.0));
//!             world.spawn((Transform::default(), MeshRenderer::cube()));
//!         })
//!         .run();
//! }
//! ```

use crate::camera::{ActiveCamera, CameraSystem};
use crate::ecs::{HierarchySystem, Schedule, System, TransformSystem, World};
use crate::input::{CursorPosition, InputState};
use crate::render::{ClearColor, DrawList, MeshSubmitSystem};
use crate::scene::{Scene, SceneManager};
use crate::time::Time;

/// Builder for a fafnir application. Owns the world and schedule until
/// [`run`](App::run) hands them to the event loop.
pub struct App {
    title: String,
    world: World,
    schedule: Schedule,
    startup: Vec<Box<dyn FnOnce(&mut World)>>,
}

impl App {
    /// Creates an app with the engine resources and the core pipeline in
    /// place: hierarchy upkeep, transform resolution, cameras, then mesh
    /// submission, in that order.
    pub fn new(title: &str) -> Self {
        let mut world = World::new();
        world.insert_resource(Time::new());
        world.insert_resource(ClearColor::default());
        world.insert_resource(ActiveCamera::default());
        world.insert_resource(DrawList::default());
        world.insert_resource(SceneManager::new());
        world.insert_resource(InputState::new());
        world.insert_resource(CursorPosition::default());

        let mut schedule = Schedule::new();
        schedule.add_system(HierarchySystem::new());
        schedule.add_system(TransformSystem);
        schedule.add_system(CameraSystem);
        schedule.add_system(MeshSubmitSystem);
        // Init now so hierarchy hooks already run for spawns made during
        // the builder phase.
        schedule.init(&mut world);

        Self {
            title: title.to_string(),
            world,
            schedule,
            startup: Vec::new(),
        }
    }

    /// Inserts a resource into the world.
    pub fn resource<T: 'static + Send + Sync>(mut self, value: T) -> Self {
        self.world.insert_resource(value);
        self
    }

    /// Registers a closure that runs once after window and GPU creation,
    /// before the first frame.
    pub fn setup(mut self, setup: impl FnOnce(&mut World) + 'static) -> Self {
        self.startup.push(Box::new(setup));
        self
    }

    /// Appends a system behind the core pipeline. It runs every frame, in
    /// registration order; world changes it makes are drawn next frame.
    pub fn add_system(mut self, system: impl System + 'static) -> Self {
        self.schedule.add_system(system);
        self
    }

    /// Registers a scene. The first one added becomes active immediately.
    pub fn add_scene(mut self, name: impl Into<String>, scene: impl Scene + 'static) -> Self {
        let mut scenes = self
            .world
            .resource_remove::<SceneManager>()
            .unwrap_or_default();
        scenes.add(&mut self.world, name, scene);
        self.world.insert_resource(scenes);
        self
    }

    /// Enables or disables a system by name. Core names are `"hierarchy"`,
    /// `"transform"`, `"camera"`, and `"mesh"`.
    pub fn system_enabled(mut self, name: &str, enabled: bool) -> Self {
        self.schedule.set_enabled(name, enabled);
        self
    }

    /// Direct world access during the builder phase.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Starts the event loop. This function does not return.
    pub fn run(self) {
        let event_loop = winit::event_loop::EventLoop::new()
            .expect("Failed to create event loop");

        let mut app = crate::window::WinitApp::new(
            self.world,
            self.schedule,
            self.startup,
            self.title,
        );

        event_loop.run_app(&mut app).expect("Event loop error");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{Name, Parent, Transform, set_parent};

    #[test]
    fn core_pipeline_order() {
        let app = App::new("test");
        assert_eq!(
            app.schedule.names(),
            vec!["hierarchy", "transform", "camera", "mesh"]
        );
    }

    #[test]
    fn builder_phase_spawns_get_hierarchy_upkeep() {
        // Schedule init ran inside App::new, so the insert hooks are live.
        let mut app = App::new("test");
        let world = app.world_mut();
        let parent = world.spawn((Transform::default(), Name::new("parent")));
        let child = world.spawn((Transform::default(), Name::new("child")));
        set_parent(world, child, parent).unwrap();
        assert_eq!(crate::ecs::children(world, parent), vec![child]);
        assert_eq!(world.get::<Parent>(child).map(|p| p.0), Some(parent));
    }

    #[test]
    fn engine_resources_are_present() {
        let mut app = App::new("test");
        let world = app.world_mut();
        assert!(world.has_resource::<Time>());
        assert!(world.has_resource::<ActiveCamera>());
        assert!(world.has_resource::<DrawList>());
        assert!(world.has_resource::<SceneManager>());
        assert!(world.has_resource::<InputState>());
    }

    #[test]
    fn system_enabled_toggles_by_name() {
        let app = App::new("test").system_enabled("camera", false);
        assert_eq!(app.schedule.is_enabled("camera"), Some(false));
        assert_eq!(app.schedule.is_enabled("transform"), Some(true));
    }
}
