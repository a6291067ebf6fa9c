//! Control events
//!
//! Queued by the control loops and drained by the host with
//! [`AgentControls::drain_events`](crate::AgentControls::drain_events).

use glam::Vec3;

use crate::rotation::RotateDirection;

/// Which behavior started a navigation session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    Goto,
    Follow,
    RandomWalkLeg,
    Custom,
}

/// How a navigation session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    /// Within stop distance of the target
    Reached,
    /// Target resolver returned nothing
    TargetLost,
    /// Actor disappeared mid-session
    ActorUnavailable,
    /// Stuck recovery exhausted, actor placed next to the target
    Teleported,
    /// Stopped or superseded from outside
    Cancelled,
}

/// How a rotation session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationOutcome {
    Completed,
    Cancelled,
    ActorUnavailable,
}

/// Something observable happened in the control core
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    NavigationStarted {
        kind: NavigationKind,
        target: Option<Vec3>,
    },
    NavigationFinished {
        kind: NavigationKind,
        outcome: NavOutcome,
    },
    StuckDetected {
        attempt: u32,
        direction: RotateDirection,
    },
    Teleported {
        position: Vec3,
        heading_yaw: f32,
    },
    RotationStarted {
        direction: RotateDirection,
        steps: u32,
    },
    RotationFinished {
        outcome: RotationOutcome,
    },
    RandomWalkStarted,
    RandomWalkLeg {
        at_ms: u64,
        origin: Vec3,
        target: Vec3,
    },
    RandomWalkStopped {
        reason: String,
    },
}

impl ControlEvent {
    /// Outcome if this is a navigation end event
    pub fn nav_outcome(&self) -> Option<NavOutcome> {
        match self {
            ControlEvent::NavigationFinished { outcome, .. } => Some(*outcome),
            _ => None,
        }
    }
}
