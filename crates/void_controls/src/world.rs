//! External collaborators
//!
//! The control core never moves the actor itself. It reads the actor
//! transform, writes the heading, and otherwise talks to the movement
//! simulation through the signal registry.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::signal::SignalRegistry;

/// Identifier of an entity in the external world
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(String);

impl EntityId {
    /// Create a new entity ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Snapshot of the controlled actor's transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorState {
    pub position: Vec3,
    pub orientation: Quat,
}

/// World access used by the control loops
pub trait AgentWorld {
    /// Current actor transform, `None` while the actor is unavailable
    fn actor(&self) -> Option<ActorState>;

    /// Overwrite the actor orientation
    fn set_actor_orientation(&mut self, orientation: Quat);

    /// Synchronise the camera yaw with the actor heading
    fn set_camera_yaw(&mut self, yaw: f32);

    /// Relocate the actor instantly and snap its heading
    fn teleport(&mut self, position: Vec3, heading_yaw: f32);

    /// Current position of a live entity
    fn entity_position(&self, id: &EntityId) -> Option<Vec3>;
}

/// Movement simulation that consumes the signals once per tick
pub trait MovementSimulation {
    fn simulate(&mut self, signals: &SignalRegistry, dt: Duration);
}
