//! Turn-to-face rotation
//!
//! A rotation session slerps the actor from its current orientation to the
//! same orientation composed with a fixed yaw offset, one step per tick.

use glam::Quat;
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI};
use std::fmt;
use std::str::FromStr;

use crate::coordinator::ControlContext;
use crate::error::ControlsError;
use crate::events::{ControlEvent, RotationOutcome};
use crate::geometry::yaw_of;
use crate::scheduler::{ControlTask, TaskPoll};
use crate::token::CancelToken;
use crate::world::AgentWorld;

/// Direction relative to the current heading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotateDirection {
    Front,
    Back,
    Left,
    Right,
}

impl RotateDirection {
    /// Yaw offset in radians, positive turns left
    pub fn yaw_offset(self) -> f32 {
        match self {
            RotateDirection::Front => 0.0,
            RotateDirection::Right => -FRAC_PI_2,
            RotateDirection::Back => PI,
            RotateDirection::Left => FRAC_PI_2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RotateDirection::Front => "front",
            RotateDirection::Back => "back",
            RotateDirection::Left => "left",
            RotateDirection::Right => "right",
        }
    }
}

impl fmt::Display for RotateDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RotateDirection {
    type Err = ControlsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "front" => Ok(RotateDirection::Front),
            "back" => Ok(RotateDirection::Back),
            "left" => Ok(RotateDirection::Left),
            "right" => Ok(RotateDirection::Right),
            _ => Err(ControlsError::UnknownDirection(s.to_string())),
        }
    }
}

/// Number of interpolation steps for a rotation of `duration_ms`
pub fn rotation_steps(duration_ms: u64, tick_ms: u64) -> u32 {
    let steps = duration_ms.div_ceil(tick_ms.max(1)).max(1);
    u32::try_from(steps).unwrap_or(u32::MAX)
}

struct Sweep {
    start: Quat,
    target: Quat,
}

/// One rotation session
pub(crate) struct RotationTask {
    token: CancelToken,
    direction: RotateDirection,
    total_steps: u32,
    current_step: u32,
    /// Captured from the actor on the first step
    sweep: Option<Sweep>,
}

impl RotationTask {
    pub fn new(token: CancelToken, direction: RotateDirection, total_steps: u32) -> Self {
        Self {
            token,
            direction,
            total_steps: total_steps.max(1),
            current_step: 0,
            sweep: None,
        }
    }
}

/// Start a rotation session on `ctx`, cancelling the one in flight
pub(crate) fn start_rotation(
    ctx: &mut ControlContext,
    direction: RotateDirection,
    duration_ms: u64,
) -> CancelToken {
    let token = ctx.begin_rotation();
    let steps = rotation_steps(duration_ms, ctx.config.tick_interval_ms);

    log::debug!("[Controls] Rotating {} over {} steps", direction, steps);
    ctx.emit(ControlEvent::RotationStarted { direction, steps });
    ctx.spawn(Box::new(RotationTask::new(token.clone(), direction, steps)));
    token
}

impl ControlTask for RotationTask {
    fn name(&self) -> &'static str {
        "rotation"
    }

    fn poll(&mut self, ctx: &mut ControlContext, world: &mut dyn AgentWorld) -> TaskPoll {
        if self.token.is_aborted() || !ctx.is_current_rotation(&self.token) {
            return TaskPoll::Done;
        }

        let Some(actor) = world.actor() else {
            log::warn!("[Controls] Actor not available for rotation");
            ctx.finish_rotation(&self.token, RotationOutcome::ActorUnavailable);
            return TaskPoll::Done;
        };

        let direction = self.direction;
        let sweep = self.sweep.get_or_insert_with(|| Sweep {
            start: actor.orientation,
            target: actor.orientation * Quat::from_rotation_y(direction.yaw_offset()),
        });

        self.current_step += 1;
        let t = self.current_step as f32 / self.total_steps as f32;
        let orientation = if self.current_step >= self.total_steps {
            sweep.target
        } else {
            sweep.start.slerp(sweep.target, t)
        };

        world.set_actor_orientation(orientation);
        world.set_camera_yaw(yaw_of(orientation));

        if self.current_step >= self.total_steps {
            ctx.finish_rotation(&self.token, RotationOutcome::Completed);
            return TaskPoll::Done;
        }
        TaskPoll::Sleep(ctx.config.tick_interval_ms)
    }
}
