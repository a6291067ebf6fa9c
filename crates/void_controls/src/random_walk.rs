//! Random walk
//!
//! Repeatedly walks to a random point near the actor, pausing a random
//! time between legs, until the duration runs out or the walk is stopped.
//! The walk has its own token; every leg additionally mints a navigation
//! token, so stopping the walk cancels the whole sequence.

use glam::Vec3;
use rand::Rng;
use std::f32::consts::TAU;

use crate::coordinator::ControlContext;
use crate::events::{ControlEvent, NavigationKind};
use crate::geometry::point_on_circle;
use crate::navigation::{FixedTarget, NavPolicy, NavigationTask};
use crate::scheduler::{ControlTask, TaskPoll};
use crate::token::CancelToken;
use crate::world::AgentWorld;

/// Random walk parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomWalkParams {
    /// Upper bound of the pause between legs (ms)
    pub interval_ms: u64,
    /// Radius around the actor in which targets are picked
    pub max_distance: f32,
    /// Total duration (ms)
    pub duration_ms: u64,
}

/// Pick a uniformly random angle and radius around `origin`
pub fn pick_target<R: Rng>(rng: &mut R, origin: Vec3, max_distance: f32) -> Vec3 {
    let angle = rng.gen_range(0.0..TAU);
    // Unit sample scaled by the radius, finite for any finite radius
    let radius = if max_distance > 0.0 {
        rng.gen_range(0.0..=1.0f32) * max_distance
    } else {
        0.0
    };
    point_on_circle(origin, angle, radius)
}

enum Phase {
    Choosing,
    Leg(NavigationTask),
}

pub(crate) struct RandomWalkTask {
    token: CancelToken,
    params: RandomWalkParams,
    started_at_ms: u64,
    phase: Phase,
}

impl RandomWalkTask {
    pub fn new(token: CancelToken, params: RandomWalkParams, started_at_ms: u64) -> Self {
        Self {
            token,
            params,
            started_at_ms,
            phase: Phase::Choosing,
        }
    }

    fn is_live(&self, ctx: &ControlContext) -> bool {
        !self.token.is_aborted() && ctx.is_current_walk(&self.token)
    }

    /// Start the next leg, or finish the walk
    fn choose(&mut self, ctx: &mut ControlContext, world: &mut dyn AgentWorld) -> Option<NavigationTask> {
        if ctx.now_ms.saturating_sub(self.started_at_ms) >= self.params.duration_ms {
            log::info!("[Controls] Random walk duration reached");
            ctx.stop_random_walk("duration reached");
            return None;
        }

        let Some(actor) = world.actor() else {
            log::warn!("[Controls] Actor not available for random walk");
            ctx.stop_random_walk("actor not available");
            return None;
        };

        let origin = actor.position;
        let target = pick_target(&mut ctx.rng, origin, self.params.max_distance);
        ctx.emit(ControlEvent::RandomWalkLeg {
            at_ms: ctx.now_ms,
            origin,
            target,
        });

        ctx.stop_navigation("starting new navigation");
        let token = ctx.begin_navigation(NavigationKind::RandomWalkLeg, Some(target));
        let policy = NavPolicy {
            stop_distance: ctx.config.navigation_stop_distance,
            allow_sprint: false,
        };
        Some(NavigationTask::new(token, Box::new(FixedTarget(target)), policy))
    }
}

impl ControlTask for RandomWalkTask {
    fn name(&self) -> &'static str {
        "random_walk"
    }

    fn poll(&mut self, ctx: &mut ControlContext, world: &mut dyn AgentWorld) -> TaskPoll {
        if !self.is_live(ctx) {
            return TaskPoll::Done;
        }

        let mut leg = match std::mem::replace(&mut self.phase, Phase::Choosing) {
            Phase::Leg(leg) => leg,
            Phase::Choosing => match self.choose(ctx, world) {
                Some(leg) => leg,
                None => return TaskPoll::Done,
            },
        };

        match leg.poll(ctx, world) {
            TaskPoll::Sleep(ms) => {
                self.phase = Phase::Leg(leg);
                TaskPoll::Sleep(ms)
            }
            TaskPoll::Done => {
                if !self.is_live(ctx) {
                    return TaskPoll::Done;
                }
                let pause = ctx.rng.gen::<f64>() * self.params.interval_ms as f64;
                TaskPoll::Sleep(pause as u64)
            }
        }
    }
}
