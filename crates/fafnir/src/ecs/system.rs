//! The [`System`] trait and the [`Schedule`] that runs systems in order.
//!
//! Scheduling is deliberately simple: systems run single-threaded, in the
//! exact order they were added, once per frame. The engine registers its
//! core pipeline (hierarchy, transform, camera, mesh submission) before any
//! user systems, so user code always sees resolved world transforms from the
//! previous pass.

use super::world::World;

pub trait System {
    /// Stable name used for enable/disable lookups and log lines.
    fn name(&self) -> &'static str;

    /// One-time setup before the first frame, e.g. hook registration.
    fn init(&mut self, _world: &mut World) {}

    /// Per-frame work. `dt` is the previous frame's duration in seconds.
    fn update(&mut self, world: &mut World, dt: f32);
}

/// Wraps a closure as a named system:
///
/// ```ignore
/// schedule.add_system(FnSystem::new("spin", |world, dt| {
///     for entity in world.view::<(Transform, Spinner)>() { /* ... */ }
/// }));
/// ```
pub struct FnSystem<F: FnMut(&mut World, f32)> {
    name: &'static str,
    func: F,
}

impl<F: FnMut(&mut World, f32)> FnSystem<F> {
    pub fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F: FnMut(&mut World, f32)> System for FnSystem<F> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn update(&mut self, world: &mut World, dt: f32) {
        (self.func)(world, dt)
    }
}

struct ScheduleEntry {
    enabled: bool,
    initialized: bool,
    system: Box<dyn System>,
}

/// Ordered list of systems. Insertion order is execution order.
#[derive(Default)]
pub struct Schedule {
    entries: Vec<ScheduleEntry>,
}

impl Schedule {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn add_system(&mut self, system: impl System + 'static) {
        self.entries.push(ScheduleEntry {
            enabled: true,
            initialized: false,
            system: Box::new(system),
        });
    }

    /// Initializes systems that have not been initialized yet. Idempotent,
    /// and runs for disabled systems too so they can be enabled later
    /// without missing their setup.
    pub fn init(&mut self, world: &mut World) {
        for entry in &mut self.entries {
            if !entry.initialized {
                entry.system.init(world);
                entry.initialized = true;
            }
        }
    }

    /// Runs every enabled system once, in insertion order.
    pub fn run(&mut self, world: &mut World, dt: f32) {
        for entry in &mut self.entries {
            if entry.enabled {
                entry.system.update(world, dt);
            }
        }
    }

    /// Returns false (and logs) when no system has that name.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        for entry in &mut self.entries {
            if entry.system.name() == name {
                entry.enabled = enabled;
                return true;
            }
        }
        log::warn!("set_enabled: no system named `{name}`");
        false
    }

    pub fn is_enabled(&self, name: &str) -> Option<bool> {
        self.entries
            .iter()
            .find(|entry| entry.system.name() == name)
            .map(|entry| entry.enabled)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|entry| entry.system.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
