//! Entity handles and the generational slot allocator.
//!
//! An [`Entity`] is a plain copyable handle: a slot index plus the generation
//! that slot had when the entity was created. Despawning bumps the slot's
//! generation, so any handle captured before the despawn stops matching and
//! can never reach data owned by a later entity that reuses the slot:
//!
//! ```text
//! spawn  -> Entity(3v0)
//! despawn(3v0), spawn -> Entity(3v1)
//! get(3v0) -> None        // stale handle, harmless
//! ```

use std::collections::HashSet;
use std::fmt;

/// Handle to an entity. Cheap to copy, safe to hold across despawns.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entity {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl Entity {
    /// Slot index. Only unique among currently live entities.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot at creation time.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Hands out entity slots and tracks which handles are still live.
pub(crate) struct EntityAllocator {
    /// Current generation per slot. A handle is live when its generation
    /// matches and its slot is not on the free list.
    generations: Vec<u32>,
    free_list: Vec<u32>,
    len: u32,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self {
            generations: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    pub fn allocate(&mut self) -> Entity {
        if let Some(index) = self.free_list.pop() {
            Entity {
                index,
                generation: self.generations[index as usize],
            }
        } else {
            let index = self.len;
            self.len += 1;
            self.generations.push(0);
            Entity {
                index,
                generation: 0,
            }
        }
    }

    /// Returns false if the handle was already dead.
    pub fn deallocate(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        self.generations[entity.index as usize] += 1;
        self.free_list.push(entity.index);
        true
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.generations
            .get(entity.index as usize)
            .is_some_and(|&generation| generation == entity.generation)
            && !self.free_list.contains(&entity.index)
    }

    pub fn alive_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    /// Every live handle, in slot order.
    pub fn live_entities(&self) -> Vec<Entity> {
        let free: HashSet<u32> = self.free_list.iter().copied().collect();
        (0..self.len)
            .filter(|index| !free.contains(index))
            .map(|index| Entity {
                index,
                generation: self.generations[index as usize],
            })
            .collect()
    }
}
