//! Agent controls facade
//!
//! [`AgentControls`] owns the signal registry and every control session of
//! one actor. Behaviors are started through the entry points below and
//! advanced by [`AgentControls::update`]; after the movement simulation has
//! read the signals, the host calls [`AgentControls::end_tick`].

use glam::Vec3;
use std::time::Duration;

use crate::config::ControlsConfig;
use crate::coordinator::{ControlContext, NavigationState};
use crate::error::ControlsResult;
use crate::events::{ControlEvent, NavigationKind};
use crate::navigation::{EntityTarget, FixedTarget, NavPolicy, NavigationTask, TargetResolver};
use crate::random_walk::{RandomWalkParams, RandomWalkTask};
use crate::rotation::{start_rotation, RotateDirection};
use crate::scheduler::Scheduler;
use crate::signal::SignalRegistry;
use crate::token::CancelToken;
use crate::world::{AgentWorld, EntityId};

/// Navigation and control core for a single actor
pub struct AgentControls {
    ctx: ControlContext,
    scheduler: Scheduler,
    elapsed_us: u64,
}

impl AgentControls {
    /// Create controls with a validated configuration
    pub fn new(config: ControlsConfig) -> ControlsResult<Self> {
        config.validate()?;
        Ok(Self {
            ctx: ControlContext::new(config),
            scheduler: Scheduler::new(),
            elapsed_us: 0,
        })
    }

    pub fn config(&self) -> &ControlsConfig {
        &self.ctx.config
    }

    // --- Behaviors ---

    /// Walk to `(x, z)`, cancelling every other action
    pub fn goto(&mut self, x: f32, z: f32) -> CancelToken {
        self.ctx.stop_all_actions("starting new navigation");

        let target = Vec3::new(x, 0.0, z);
        let policy = NavPolicy {
            stop_distance: self.ctx.config.navigation_stop_distance,
            allow_sprint: true,
        };
        self.start_navigation(NavigationKind::Goto, Some(target), Box::new(FixedTarget(target)), policy)
    }

    /// Follow an entity until within `stop_distance` of it. Ends when the
    /// entity disappears. A rotation in flight is left alone.
    pub fn follow_entity(&mut self, id: impl Into<EntityId>, stop_distance: Option<f32>) -> CancelToken {
        let id = id.into();
        self.ctx.stop_random_walk("starting followEntity");
        self.ctx.stop_navigation("starting followEntity");

        log::info!("[Controls] Following entity {}", id);
        let fallback = self.ctx.config.follow_stop_distance;
        let policy = NavPolicy {
            stop_distance: stop_distance
                .map_or(fallback, |d| checked_distance(d, fallback, "stop distance")),
            allow_sprint: true,
        };
        self.start_navigation(NavigationKind::Follow, None, Box::new(EntityTarget(id)), policy)
    }

    /// Walk towards whatever `resolver` returns each tick
    pub fn navigate_towards<R>(&mut self, resolver: R, stop_distance: f32, allow_sprint: bool) -> CancelToken
    where
        R: TargetResolver + 'static,
    {
        self.ctx.stop_random_walk("starting custom navigation");
        self.ctx.stop_navigation("starting custom navigation");

        let policy = NavPolicy {
            stop_distance: checked_distance(
                stop_distance,
                self.ctx.config.navigation_stop_distance,
                "stop distance",
            ),
            allow_sprint,
        };
        self.start_navigation(NavigationKind::Custom, None, Box::new(resolver), policy)
    }

    fn start_navigation(
        &mut self,
        kind: NavigationKind,
        target: Option<Vec3>,
        resolver: Box<dyn TargetResolver>,
        policy: NavPolicy,
    ) -> CancelToken {
        let token = self.ctx.begin_navigation(kind, target);
        self.ctx
            .spawn(Box::new(NavigationTask::new(token.clone(), resolver, policy)));
        token
    }

    /// Walk to random nearby points. Missing parameters take the
    /// configured defaults.
    pub fn start_random_walk(
        &mut self,
        interval_ms: Option<u64>,
        max_distance: Option<f32>,
        duration_ms: Option<u64>,
    ) -> CancelToken {
        self.ctx.stop_random_walk("restarting random walk");

        let config = &self.ctx.config;
        let params = RandomWalkParams {
            interval_ms: interval_ms.unwrap_or(config.random_walk_interval_ms),
            max_distance: max_distance.map_or(config.random_walk_max_distance, |d| {
                checked_distance(d, config.random_walk_max_distance, "random walk distance")
            }),
            duration_ms: duration_ms.unwrap_or(config.random_walk_duration_ms),
        };

        let token = self.ctx.begin_random_walk();
        let started_at = self.ctx.now_ms;
        self.ctx
            .spawn(Box::new(RandomWalkTask::new(token.clone(), params, started_at)));
        token
    }

    /// Turn relative to the current heading over `duration_ms`
    pub fn rotate_to(&mut self, direction: RotateDirection, duration_ms: Option<u64>) -> CancelToken {
        let duration = duration_ms.unwrap_or(self.ctx.config.rotation_duration_ms);
        start_rotation(&mut self.ctx, direction, duration)
    }

    // --- Coordination ---

    pub fn stop_navigation(&mut self, reason: &str) {
        self.ctx.stop_navigation(reason);
    }

    pub fn stop_rotation(&mut self) {
        self.ctx.stop_rotation();
    }

    pub fn stop_random_walk(&mut self) {
        self.ctx.stop_random_walk("random walk stopped");
    }

    /// Stop random walk, navigation and rotation
    pub fn stop_all_actions(&mut self, reason: &str) {
        self.ctx.stop_all_actions(reason);
    }

    // --- State ---

    pub fn is_navigating(&self) -> bool {
        self.ctx.is_navigating()
    }

    pub fn is_walking_randomly(&self) -> bool {
        self.ctx.is_walking_randomly()
    }

    pub fn is_rotating(&self) -> bool {
        self.ctx.is_rotating()
    }

    pub fn navigation_state(&self) -> NavigationState {
        self.ctx.navigation_state()
    }

    pub fn navigation_kind(&self) -> Option<NavigationKind> {
        self.ctx.navigation_kind()
    }

    /// Fixed target of the active session, if it has one
    pub fn navigation_target(&self) -> Option<Vec3> {
        self.ctx.navigation_target()
    }

    // --- Signals ---

    pub fn signals(&self) -> &SignalRegistry {
        &self.ctx.signals
    }

    pub fn signals_mut(&mut self) -> &mut SignalRegistry {
        &mut self.ctx.signals
    }

    /// Set a signal by name, unknown names are created on the fly
    pub fn set_signal(&mut self, name: &str, down: bool) {
        self.ctx.signals.set_by_name(name, down);
    }

    // --- Ticking ---

    /// Advance simulated time by `dt`, running every loop that falls due
    pub fn update(&mut self, world: &mut dyn AgentWorld, dt: Duration) {
        self.elapsed_us += dt.as_micros() as u64;
        let until_ms = self.elapsed_us / 1000;
        self.scheduler.run_until(&mut self.ctx, world, until_ms);
    }

    /// Clear signal edges, once the simulation has consumed this tick
    pub fn end_tick(&mut self) {
        self.ctx.signals.tick_reset();
    }

    /// Simulated clock (ms)
    pub fn now_ms(&self) -> u64 {
        self.ctx.now_ms
    }

    /// Sessions still queued, including superseded ones that have not
    /// woken up yet
    pub fn task_count(&self) -> usize {
        self.scheduler.len()
    }

    pub fn drain_events(&mut self) -> Vec<ControlEvent> {
        std::mem::take(&mut self.ctx.events)
    }
}

/// Caller-supplied distances must be finite and non-negative
fn checked_distance(value: f32, fallback: f32, what: &str) -> f32 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        log::warn!("[Controls] Invalid {} {}, using {}", what, value, fallback);
        fallback
    }
}

impl std::fmt::Debug for AgentControls {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentControls")
            .field("now_ms", &self.ctx.now_ms)
            .field("state", &self.navigation_state())
            .field("walking_randomly", &self.is_walking_randomly())
            .field("rotating", &self.is_rotating())
            .field("tasks", &self.scheduler.len())
            .finish()
    }
}
