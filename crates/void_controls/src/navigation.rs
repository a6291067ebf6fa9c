//! Walk-toward-target navigation
//!
//! A navigation session steers the actor in a straight line towards a
//! target that may move between ticks. Each tick it faces the target and
//! holds the forward signal; the external simulation does the moving.
//!
//! When horizontal progress stalls the session escalates: a random
//! left/right recovery rotation plus a jump pulse, a bounded number of
//! times, then a teleport next to the target as a last resort.

use glam::Vec3;
use rand::Rng;

use crate::coordinator::ControlContext;
use crate::events::{ControlEvent, NavOutcome};
use crate::geometry::{facing, heading_yaw, horizontal_direction, horizontal_distance, yaw_of};
use crate::rotation::{start_rotation, RotateDirection};
use crate::scheduler::{ControlTask, TaskPoll};
use crate::signal::Signal;
use crate::token::CancelToken;
use crate::world::{AgentWorld, EntityId};

/// Resolves the position a navigation session walks towards.
///
/// Called once per tick; returning `None` ends the session as target lost.
pub trait TargetResolver: Send {
    fn resolve(&self, world: &dyn AgentWorld) -> Option<Vec3>;
}

impl<F> TargetResolver for F
where
    F: Fn(&dyn AgentWorld) -> Option<Vec3> + Send,
{
    fn resolve(&self, world: &dyn AgentWorld) -> Option<Vec3> {
        self(world)
    }
}

/// A fixed point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedTarget(pub Vec3);

impl TargetResolver for FixedTarget {
    fn resolve(&self, _world: &dyn AgentWorld) -> Option<Vec3> {
        Some(self.0)
    }
}

/// The live position of an entity, looked up every tick
#[derive(Debug, Clone, PartialEq)]
pub struct EntityTarget(pub EntityId);

impl TargetResolver for EntityTarget {
    fn resolve(&self, world: &dyn AgentWorld) -> Option<Vec3> {
        world.entity_position(&self.0)
    }
}

/// Per-session navigation policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavPolicy {
    pub stop_distance: f32,
    pub allow_sprint: bool,
}

enum Phase {
    Walking,
    /// Waiting for the recovery rotation, or the deadline, whichever is first
    Recovering {
        rotation: CancelToken,
        deadline_ms: u64,
    },
}

/// One navigation session
pub(crate) struct NavigationTask {
    token: CancelToken,
    resolver: Box<dyn TargetResolver>,
    policy: NavPolicy,
    phase: Phase,
    previous_position: Option<Vec3>,
    no_progress_ticks: u32,
    recovery_attempts: u32,
}

impl NavigationTask {
    pub fn new(token: CancelToken, resolver: Box<dyn TargetResolver>, policy: NavPolicy) -> Self {
        Self {
            token,
            resolver,
            policy,
            phase: Phase::Walking,
            previous_position: None,
            no_progress_ticks: 0,
            recovery_attempts: 0,
        }
    }

    fn hold_forward(&self, ctx: &mut ControlContext, distance: f32) {
        let sprint =
            self.policy.allow_sprint && distance > ctx.config.sprint_distance_threshold;
        let signals = &mut ctx.signals;
        signals.set(Signal::Forward, true);
        signals.set(Signal::Backward, false);
        signals.set(Signal::Left, false);
        signals.set(Signal::Right, false);
        signals.set(Signal::Sprint, sprint);
    }

    /// Place the actor `stop_distance` short of the target, facing it
    fn teleport_to(
        &self,
        ctx: &mut ControlContext,
        world: &mut dyn AgentWorld,
        position: Vec3,
    ) -> bool {
        let Some(target) = self.resolver.resolve(world) else {
            return false;
        };
        let Some(direction) = horizontal_direction(position, target) else {
            return false;
        };

        let destination = target - direction * self.policy.stop_distance;
        let yaw = heading_yaw(direction);
        world.teleport(destination, yaw);
        ctx.emit(ControlEvent::Teleported {
            position: destination,
            heading_yaw: yaw,
        });
        true
    }

    fn walk(&mut self, ctx: &mut ControlContext, world: &mut dyn AgentWorld) -> TaskPoll {
        let tick = ctx.config.tick_interval_ms;

        let Some(actor) = world.actor() else {
            log::warn!("[Controls] Actor not available for navigation");
            ctx.finish_navigation(&self.token, NavOutcome::ActorUnavailable, "actor not available");
            return TaskPoll::Done;
        };

        let Some(target) = self.resolver.resolve(world) else {
            log::warn!("[Controls] Navigation target lost");
            ctx.finish_navigation(&self.token, NavOutcome::TargetLost, "target lost");
            return TaskPoll::Done;
        };

        let position = actor.position;
        let distance = horizontal_distance(position, target);
        if distance <= self.policy.stop_distance {
            log::info!("[Controls] Reached target within {}m", self.policy.stop_distance);
            ctx.finish_navigation(&self.token, NavOutcome::Reached, "target reached");
            return TaskPoll::Done;
        }

        let previous = self.previous_position.replace(position).unwrap_or(position);
        if horizontal_distance(previous, position) < ctx.config.stuck_threshold {
            self.no_progress_ticks += 1;
        } else {
            self.no_progress_ticks = 0;
        }

        if self.no_progress_ticks >= ctx.config.max_no_progress_ticks {
            self.recovery_attempts += 1;
            if self.recovery_attempts > ctx.config.max_recovery_attempts {
                log::error!("[Controls] Max recovery attempts reached, teleporting to target");
                if self.teleport_to(ctx, world, position) {
                    ctx.finish_navigation(
                        &self.token,
                        NavOutcome::Teleported,
                        "teleported after max recovery",
                    );
                } else {
                    ctx.finish_navigation(&self.token, NavOutcome::TargetLost, "target lost");
                }
                return TaskPoll::Done;
            }

            let direction = if ctx.rng.gen_bool(0.5) {
                RotateDirection::Left
            } else {
                RotateDirection::Right
            };
            log::warn!(
                "[Controls] Stuck detected, recovery attempt {} ({})",
                self.recovery_attempts,
                direction
            );
            ctx.emit(ControlEvent::StuckDetected {
                attempt: self.recovery_attempts,
                direction,
            });

            let duration_ms = ctx.config.recovery_rotation_ms;
            let deadline_ms = ctx.now_ms + ctx.config.recovery_timeout_ms;
            let rotation = start_rotation(ctx, direction, duration_ms);
            ctx.begin_recovery(rotation.clone());
            self.phase = Phase::Recovering {
                rotation,
                deadline_ms,
            };
            return TaskPoll::Sleep(tick);
        }

        // Normal progress, face the target and keep walking
        if let Some(direction) = horizontal_direction(position, target) {
            let orientation = facing(direction);
            world.set_actor_orientation(orientation);
            world.set_camera_yaw(yaw_of(orientation));
        }
        ctx.signals.set(Signal::Jump, false);
        self.hold_forward(ctx, distance);

        TaskPoll::Sleep(tick)
    }

    fn recover(
        &mut self,
        ctx: &mut ControlContext,
        world: &mut dyn AgentWorld,
        rotation: CancelToken,
        deadline_ms: u64,
    ) -> TaskPoll {
        let tick = ctx.config.tick_interval_ms;
        if ctx.is_current_rotation(&rotation) && ctx.now_ms < deadline_ms {
            self.phase = Phase::Recovering {
                rotation,
                deadline_ms,
            };
            return TaskPoll::Sleep(tick.min(deadline_ms - ctx.now_ms));
        }

        ctx.end_recovery();
        ctx.signals.set(Signal::Jump, true);
        self.no_progress_ticks = 0;

        let distance = match (world.actor(), self.resolver.resolve(world)) {
            (Some(actor), Some(target)) => horizontal_distance(actor.position, target),
            _ => 0.0,
        };
        self.hold_forward(ctx, distance);
        TaskPoll::Sleep(tick)
    }
}

impl ControlTask for NavigationTask {
    fn name(&self) -> &'static str {
        "navigation"
    }

    fn poll(&mut self, ctx: &mut ControlContext, world: &mut dyn AgentWorld) -> TaskPoll {
        // Superseded sessions leave shared state alone
        if self.token.is_aborted() || !ctx.is_current_navigation(&self.token) {
            return TaskPoll::Done;
        }

        match std::mem::replace(&mut self.phase, Phase::Walking) {
            Phase::Walking => self.walk(ctx, world),
            Phase::Recovering {
                rotation,
                deadline_ms,
            } => self.recover(ctx, world, rotation, deadline_ms),
        }
    }
}
