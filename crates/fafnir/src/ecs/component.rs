//! Type-erased component storage.
//!
//! Each component type gets one [`ComponentStore`], a sparse set:
//!
//! ```text
//! sparse:  entity index -> dense index  (u32::MAX = absent)
//! dense:   dense index  -> Entity       (owner, for iteration + stale check)
//! data:    dense index  -> Box<dyn Any> (the component value)
//! ```
//!
//! Insert and remove are O(1); removal swap-removes the tail and patches the
//! sparse entry of whichever entity got moved. Iteration walks `dense`, which
//! stays packed, so a store never visits absent slots.
//!
//! ## Design
//!
//! - Values are boxed `dyn Any` rather than raw bytes. That costs a pointer
//!   hop per access but keeps the whole store free of `unsafe`, and `Drop`
//!   runs naturally when a value is removed or replaced.
//! - `dense` stores full [`Entity`] handles, generation included. A stale
//!   handle whose slot was recycled fails the ownership check in `slot()`
//!   even before the world-level liveness check runs.

use std::any::Any;

use super::entity::Entity;

const ABSENT: u32 = u32::MAX;

pub(crate) struct ComponentStore {
    type_name: &'static str,
    sparse: Vec<u32>,
    dense: Vec<Entity>,
    data: Vec<Box<dyn Any + Send + Sync>>,
}

impl ComponentStore {
    pub fn new<T: 'static + Send + Sync>() -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            sparse: Vec::new(),
            dense: Vec::new(),
            data: Vec::new(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Dense index of `entity`'s value, if this exact handle owns one.
    fn slot(&self, entity: Entity) -> Option<usize> {
        let dense = *self.sparse.get(entity.index as usize)?;
        if dense == ABSENT {
            return None;
        }
        let dense = dense as usize;
        (self.dense[dense] == entity).then_some(dense)
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.slot(entity).is_some()
    }

    /// Inserts or replaces. Replacing drops the old value in place and does
    /// not disturb dense order.
    pub fn insert(&mut self, entity: Entity, value: Box<dyn Any + Send + Sync>) {
        if let Some(dense) = self.slot(entity) {
            self.data[dense] = value;
            return;
        }
        let index = entity.index as usize;
        if self.sparse.len() <= index {
            self.sparse.resize(index + 1, ABSENT);
        }
        self.sparse[index] = self.dense.len() as u32;
        self.dense.push(entity);
        self.data.push(value);
    }

    pub fn remove(&mut self, entity: Entity) -> Option<Box<dyn Any + Send + Sync>> {
        let dense = self.slot(entity)?;
        self.sparse[entity.index as usize] = ABSENT;
        self.dense.swap_remove(dense);
        let value = self.data.swap_remove(dense);
        if dense < self.dense.len() {
            // The former tail entity now lives at `dense`.
            let moved = self.dense[dense];
            self.sparse[moved.index as usize] = dense as u32;
        }
        Some(value)
    }

    /// # Panics
    ///
    /// Panics if the stored value is not a `T`. Stores are keyed by `TypeId`
    /// at the world level, so a mismatch is a bug in the engine itself.
    pub fn get<T: 'static>(&self, entity: Entity) -> Option<&T> {
        self.slot(entity).map(|dense| {
            self.data[dense]
                .downcast_ref()
                .unwrap_or_else(|| panic!("component store `{}` holds a foreign type", self.type_name))
        })
    }

    pub fn get_mut<T: 'static>(&mut self, entity: Entity) -> Option<&mut T> {
        let type_name = self.type_name;
        self.slot(entity).map(|dense| {
            self.data[dense]
                .downcast_mut()
                .unwrap_or_else(|| panic!("component store `{type_name}` holds a foreign type"))
        })
    }

    /// Owners of every stored value, packed, in insertion-then-swap order.
    pub fn entities(&self) -> &[Entity] {
        &self.dense
    }

    pub fn len(&self) -> usize {
        self.dense.len()
    }
}
