//! Error types for structural world operations.

use std::error::Error;
use std::fmt;

/// Errors returned by operations that mutate entity structure.
///
/// Most component accessors return `Option` and most mutations on dead
/// entities are silently ignored; only operations where the caller needs to
/// distinguish failure modes (reparenting, primarily) return this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcsError {
    /// The entity handle is dead or stale (its slot was recycled).
    InvalidHandle,
    /// The requested parent change would make an entity its own ancestor.
    CycleDetected,
}

impl fmt::Display for EcsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EcsError::InvalidHandle => write!(f, "entity handle is dead or stale"),
            EcsError::CycleDetected => {
                write!(f, "parent change would create a cycle in the hierarchy")
            }
        }
    }
}

impl Error for EcsError {}
