//! Scene lifecycle management.
//!
//! A [`Scene`] owns a slice of game content: it populates the world in
//! `on_load`, activates in `on_enter`, and gets its `update` called every
//! frame while active. The [`SceneManager`] resource holds the registered
//! scenes; transitions requested mid-frame are deferred to the next manager
//! update so a scene never tears itself down from inside its own update.

use crate::ecs::World;

/// Lifecycle callbacks for one scene. All methods default to no-ops, so a
/// scene only implements the stages it cares about.
pub trait Scene: Send + Sync {
    /// One-time setup, called before the first `on_enter`.
    fn on_load(&mut self, _world: &mut World) {}

    /// The scene became active.
    fn on_enter(&mut self, _world: &mut World) {}

    /// The scene stopped being active.
    fn on_leave(&mut self, _world: &mut World) {}

    /// Teardown, called when the scene is removed from the manager.
    fn on_unload(&mut self, _world: &mut World) {}

    /// Per-frame work while active.
    fn update(&mut self, _world: &mut World, _dt: f32) {}
}

struct SceneSlot {
    name: String,
    scene: Box<dyn Scene>,
    loaded: bool,
}

/// Registry of scenes with at most one active at a time.
#[derive(Default)]
pub struct SceneManager {
    scenes: Vec<SceneSlot>,
    active: Option<usize>,
    pending: Option<usize>,
}

impl SceneManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a scene. The first scene added becomes active right away
    /// (`on_load` + `on_enter`). A duplicate name is rejected with a log.
    pub fn add(&mut self, world: &mut World, name: impl Into<String>, scene: impl Scene + 'static) {
        let name = name.into();
        if self.scenes.iter().any(|slot| slot.name == name) {
            log::error!("scene `{name}` is already registered; ignoring");
            return;
        }
        self.scenes.push(SceneSlot {
            name,
            scene: Box::new(scene),
            loaded: false,
        });
        if self.active.is_none() && self.pending.is_none() {
            self.activate(world, self.scenes.len() - 1);
        }
    }

    /// Queues a transition, applied at the start of the next manager
    /// update. Returns false when no scene has that name.
    pub fn switch_to(&mut self, name: &str) -> bool {
        let Some(index) = self.scenes.iter().position(|slot| slot.name == name) else {
            log::error!("switch_to: no scene named `{name}`");
            return false;
        };
        self.pending = Some(index);
        true
    }

    /// Unregisters a scene, running `on_unload` if it was ever loaded. The
    /// active or queued scene cannot be removed.
    pub fn remove(&mut self, world: &mut World, name: &str) -> bool {
        let Some(index) = self.scenes.iter().position(|slot| slot.name == name) else {
            return false;
        };
        if self.active == Some(index) || self.pending == Some(index) {
            log::error!("cannot remove scene `{name}` while it is active or queued");
            return false;
        }
        let mut slot = self.scenes.remove(index);
        if slot.loaded {
            slot.scene.on_unload(world);
        }
        if let Some(active) = self.active {
            if active > index {
                self.active = Some(active - 1);
            }
        }
        if let Some(pending) = self.pending {
            if pending > index {
                self.pending = Some(pending - 1);
            }
        }
        true
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active.map(|index| self.scenes[index].name.as_str())
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Applies a pending transition, then updates the active scene.
    pub fn update(&mut self, world: &mut World, dt: f32) {
        if let Some(next) = self.pending.take() {
            if self.active != Some(next) {
                if let Some(current) = self.active {
                    self.scenes[current].scene.on_leave(world);
                }
                self.activate(world, next);
            }
        }
        if let Some(active) = self.active {
            self.scenes[active].scene.update(world, dt);
        }
    }

    fn activate(&mut self, world: &mut World, index: usize) {
        let slot = &mut self.scenes[index];
        if !slot.loaded {
            slot.scene.on_load(world);
            slot.loaded = true;
        }
        slot.scene.on_enter(world);
        log::info!("scene `{}` is now active", slot.name);
        self.active = Some(index);
    }
}
