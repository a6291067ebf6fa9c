//! Kinematic reference world
//!
//! A flat-plane world with a single actor that moves along its heading
//! while the movement signals are held. Good enough for headless runs and
//! tests; real hosts implement [`AgentWorld`] over their own simulation.

use glam::{Quat, Vec3};
use std::collections::HashMap;
use std::time::Duration;

use crate::geometry::{flatten, FORWARD};
use crate::signal::{Signal, SignalRegistry};
use crate::world::{ActorState, AgentWorld, EntityId, MovementSimulation};

/// Actor body in the kinematic world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorBody {
    pub position: Vec3,
    pub orientation: Quat,
    pub camera_yaw: f32,
}

#[derive(Debug, Clone)]
pub struct KinematicWorld {
    actor: Option<ActorBody>,
    entities: HashMap<EntityId, Vec3>,
    /// Units per second while walking
    pub walk_speed: f32,
    /// Units per second while sprinting
    pub sprint_speed: f32,
    blocked: bool,
    teleports: usize,
    orientation_writes: usize,
}

impl Default for KinematicWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl KinematicWorld {
    /// Create a world with the actor at the origin facing -Z
    pub fn new() -> Self {
        Self::with_actor_at(Vec3::ZERO)
    }

    /// Create a world with the actor at `position`
    pub fn with_actor_at(position: Vec3) -> Self {
        Self {
            actor: Some(ActorBody {
                position,
                orientation: Quat::IDENTITY,
                camera_yaw: 0.0,
            }),
            entities: HashMap::new(),
            walk_speed: 4.0,
            sprint_speed: 8.0,
            blocked: false,
            teleports: 0,
            orientation_writes: 0,
        }
    }

    pub fn body(&self) -> Option<&ActorBody> {
        self.actor.as_ref()
    }

    pub fn actor_position(&self) -> Option<Vec3> {
        self.actor.map(|a| a.position)
    }

    pub fn set_actor_orientation_direct(&mut self, orientation: Quat) {
        if let Some(actor) = self.actor.as_mut() {
            actor.orientation = orientation;
        }
    }

    /// Take the actor out of the world
    pub fn remove_actor(&mut self) {
        self.actor = None;
    }

    /// Freeze actor movement, as if walking into a wall
    pub fn set_blocked(&mut self, blocked: bool) {
        self.blocked = blocked;
    }

    pub fn insert_entity(&mut self, id: impl Into<EntityId>, position: Vec3) {
        self.entities.insert(id.into(), position);
    }

    pub fn remove_entity(&mut self, id: &EntityId) -> Option<Vec3> {
        self.entities.remove(id)
    }

    pub fn teleport_count(&self) -> usize {
        self.teleports
    }

    pub fn orientation_writes(&self) -> usize {
        self.orientation_writes
    }
}

impl AgentWorld for KinematicWorld {
    fn actor(&self) -> Option<ActorState> {
        self.actor.map(|a| ActorState {
            position: a.position,
            orientation: a.orientation,
        })
    }

    fn set_actor_orientation(&mut self, orientation: Quat) {
        if let Some(actor) = self.actor.as_mut() {
            actor.orientation = orientation;
            self.orientation_writes += 1;
        }
    }

    fn set_camera_yaw(&mut self, yaw: f32) {
        if let Some(actor) = self.actor.as_mut() {
            actor.camera_yaw = yaw;
        }
    }

    fn teleport(&mut self, position: Vec3, heading_yaw: f32) {
        if let Some(actor) = self.actor.as_mut() {
            actor.position = position;
            actor.orientation = Quat::from_rotation_y(heading_yaw);
            actor.camera_yaw = heading_yaw;
            self.teleports += 1;
        }
    }

    fn entity_position(&self, id: &EntityId) -> Option<Vec3> {
        self.entities.get(id).copied()
    }
}

impl MovementSimulation for KinematicWorld {
    fn simulate(&mut self, signals: &SignalRegistry, dt: Duration) {
        if self.blocked {
            return;
        }
        let Some(actor) = self.actor.as_mut() else {
            return;
        };

        let forward = flatten(actor.orientation * FORWARD).normalize_or_zero();
        let right = Vec3::new(-forward.z, 0.0, forward.x);

        let mut wish = Vec3::ZERO;
        if signals.is_down(Signal::Forward) {
            wish += forward;
        }
        if signals.is_down(Signal::Backward) {
            wish -= forward;
        }
        if signals.is_down(Signal::Right) {
            wish += right;
        }
        if signals.is_down(Signal::Left) {
            wish -= right;
        }

        let speed = if signals.is_down(Signal::Sprint) {
            self.sprint_speed
        } else {
            self.walk_speed
        };
        actor.position += wish.normalize_or_zero() * speed * dt.as_secs_f32();
    }
}
