//! Action coordination
//!
//! [`ControlContext`] is the state every control loop shares: the signal
//! registry, the simulated clock, and the "current session" slots. The
//! stop operations here keep at most one navigation session and at most one
//! rotation session alive.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::ControlsConfig;
use crate::events::{ControlEvent, NavOutcome, NavigationKind, RotationOutcome};
use crate::scheduler::ControlTask;
use crate::signal::SignalRegistry;
use crate::token::{is_current, CancelToken};

/// Coarse navigation state of the actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationState {
    Idle,
    Navigating,
    /// Waiting on a stuck-recovery rotation
    Recovering,
}

pub(crate) struct ControlContext {
    pub config: ControlsConfig,
    pub now_ms: u64,
    pub signals: SignalRegistry,
    pub rng: StdRng,
    pub events: Vec<ControlEvent>,

    nav_token: Option<CancelToken>,
    nav_kind: NavigationKind,
    navigation_target: Option<Vec3>,
    is_navigating: bool,
    /// Recovery rotation started by the current session
    recovery_rotation: Option<CancelToken>,

    walk_token: Option<CancelToken>,
    is_walking_randomly: bool,

    rotation_token: Option<CancelToken>,
    is_rotating: bool,

    spawned: Vec<Box<dyn ControlTask>>,
}

impl ControlContext {
    pub fn new(config: ControlsConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            now_ms: 0,
            signals: SignalRegistry::new(),
            rng,
            events: Vec::new(),
            nav_token: None,
            nav_kind: NavigationKind::Goto,
            navigation_target: None,
            is_navigating: false,
            recovery_rotation: None,
            walk_token: None,
            is_walking_randomly: false,
            rotation_token: None,
            is_rotating: false,
            spawned: Vec::new(),
        }
    }

    pub fn spawn(&mut self, task: Box<dyn ControlTask>) {
        self.spawned.push(task);
    }

    pub fn take_spawned(&mut self) -> Vec<Box<dyn ControlTask>> {
        std::mem::take(&mut self.spawned)
    }

    pub fn emit(&mut self, event: ControlEvent) {
        self.events.push(event);
    }

    // --- Navigation ---

    /// Mint the token of a new navigation session and make it current
    pub fn begin_navigation(&mut self, kind: NavigationKind, target: Option<Vec3>) -> CancelToken {
        let token = CancelToken::new();
        self.nav_token = Some(token.clone());
        self.nav_kind = kind;
        self.navigation_target = target;
        self.is_navigating = true;
        self.cancel_recovery();

        log::info!("[Controls] Navigation started ({:?})", kind);
        self.emit(ControlEvent::NavigationStarted { kind, target });
        token
    }

    pub fn is_current_navigation(&self, token: &CancelToken) -> bool {
        is_current(&self.nav_token, token)
    }

    /// Mark the current session as waiting on `rotation`
    pub fn begin_recovery(&mut self, rotation: CancelToken) {
        self.recovery_rotation = Some(rotation);
    }

    /// Leave the recovering state. A rotation still in flight keeps turning.
    pub fn end_recovery(&mut self) {
        self.recovery_rotation = None;
    }

    /// Stop the recovery rotation of the session being torn down
    fn cancel_recovery(&mut self) {
        if let Some(rotation) = self.recovery_rotation.take() {
            if self.is_current_rotation(&rotation) {
                log::debug!("[Controls] Cancelling recovery rotation");
                self.stop_rotation();
            }
        }
    }

    /// End the session owned by `token`, if it is still the current one
    pub fn finish_navigation(&mut self, token: &CancelToken, outcome: NavOutcome, reason: &str) {
        if self.is_current_navigation(token) {
            self.end_navigation(outcome, reason);
        }
    }

    /// Stop the active navigation session, if any. Idempotent.
    pub fn stop_navigation(&mut self, reason: &str) {
        self.end_navigation(NavOutcome::Cancelled, reason);
    }

    fn end_navigation(&mut self, outcome: NavOutcome, reason: &str) {
        if let Some(token) = self.nav_token.take() {
            token.abort();
        }
        if !self.is_navigating {
            return;
        }

        log::info!("[Controls] Stopping navigation ({})", reason);
        self.is_navigating = false;
        self.cancel_recovery();
        self.navigation_target = None;
        self.signals.release_movement();

        let kind = self.nav_kind;
        self.emit(ControlEvent::NavigationFinished { kind, outcome });
    }

    pub fn is_navigating(&self) -> bool {
        self.is_navigating
    }

    pub fn navigation_target(&self) -> Option<Vec3> {
        self.navigation_target
    }

    pub fn navigation_kind(&self) -> Option<NavigationKind> {
        self.is_navigating.then_some(self.nav_kind)
    }

    pub fn navigation_state(&self) -> NavigationState {
        match (self.is_navigating, self.recovery_rotation.is_some()) {
            (false, _) => NavigationState::Idle,
            (true, false) => NavigationState::Navigating,
            (true, true) => NavigationState::Recovering,
        }
    }

    // --- Random walk ---

    pub fn begin_random_walk(&mut self) -> CancelToken {
        let token = CancelToken::new();
        self.walk_token = Some(token.clone());
        self.is_walking_randomly = true;

        log::info!("[Controls] Random walk started");
        self.emit(ControlEvent::RandomWalkStarted);
        token
    }

    pub fn is_current_walk(&self, token: &CancelToken) -> bool {
        is_current(&self.walk_token, token)
    }

    /// Abort the whole walk sequence and the leg in flight. Idempotent.
    pub fn stop_random_walk(&mut self, reason: &str) {
        if let Some(token) = self.walk_token.take() {
            token.abort();
        }
        if self.is_walking_randomly {
            log::info!("[Controls] Random walk stopped ({})", reason);
            self.is_walking_randomly = false;
            self.emit(ControlEvent::RandomWalkStopped {
                reason: reason.to_string(),
            });
        }
        self.stop_navigation("random walk stopped");
    }

    pub fn is_walking_randomly(&self) -> bool {
        self.is_walking_randomly
    }

    // --- Rotation ---

    pub fn begin_rotation(&mut self) -> CancelToken {
        self.stop_rotation();
        let token = CancelToken::new();
        self.rotation_token = Some(token.clone());
        self.is_rotating = true;
        token
    }

    pub fn is_current_rotation(&self, token: &CancelToken) -> bool {
        self.is_rotating && is_current(&self.rotation_token, token)
    }

    pub fn finish_rotation(&mut self, token: &CancelToken, outcome: RotationOutcome) {
        if !self.is_current_rotation(token) {
            return;
        }
        self.rotation_token = None;
        self.is_rotating = false;
        self.emit(ControlEvent::RotationFinished { outcome });
    }

    /// Abort the in-flight rotation, if any. Idempotent.
    pub fn stop_rotation(&mut self) {
        if let Some(token) = self.rotation_token.take() {
            token.abort();
        }
        if self.is_rotating {
            log::info!("[Controls] Rotation cancelled");
            self.is_rotating = false;
            self.emit(ControlEvent::RotationFinished {
                outcome: RotationOutcome::Cancelled,
            });
        }
    }

    pub fn is_rotating(&self) -> bool {
        self.is_rotating
    }

    /// Stop random walk, navigation and rotation
    pub fn stop_all_actions(&mut self, reason: &str) {
        log::info!("[Controls] Stopping all actions ({})", reason);
        self.stop_random_walk(reason);
        self.stop_navigation(reason);
        self.stop_rotation();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Signal;

    fn context() -> ControlContext {
        ControlContext::new(ControlsConfig::default().with_seed(1))
    }

    #[test]
    fn test_new_navigation_replaces_current() {
        let mut ctx = context();
        let first = ctx.begin_navigation(NavigationKind::Goto, None);
        let second = ctx.begin_navigation(NavigationKind::Follow, None);

        assert!(!ctx.is_current_navigation(&first));
        assert!(!first.is_aborted());
        assert!(ctx.is_current_navigation(&second));
        assert_eq!(ctx.navigation_kind(), Some(NavigationKind::Follow));
    }

    #[test]
    fn test_stop_navigation_releases_and_aborts() {
        let mut ctx = context();
        let token = ctx.begin_navigation(NavigationKind::Goto, Some(Vec3::X));
        ctx.signals.set(Signal::Forward, true);
        ctx.signals.set(Signal::Sprint, true);

        ctx.stop_navigation("test");

        assert!(token.is_aborted());
        assert!(!ctx.is_navigating());
        assert!(ctx.navigation_target().is_none());
        assert!(!ctx.signals.any_movement_down());
        assert_eq!(ctx.events.last().and_then(|e| e.nav_outcome()), Some(NavOutcome::Cancelled));

        let count = ctx.events.len();
        ctx.stop_navigation("again");
        assert_eq!(ctx.events.len(), count);
    }

    #[test]
    fn test_finish_ignores_stale_token() {
        let mut ctx = context();
        let stale = ctx.begin_navigation(NavigationKind::Goto, None);
        let _current = ctx.begin_navigation(NavigationKind::Goto, None);

        ctx.finish_navigation(&stale, NavOutcome::Reached, "stale");
        assert!(ctx.is_navigating());
    }

    #[test]
    fn test_rotation_slot() {
        let mut ctx = context();
        let first = ctx.begin_rotation();
        let second = ctx.begin_rotation();

        assert!(first.is_aborted());
        assert!(ctx.is_current_rotation(&second));

        ctx.finish_rotation(&second, RotationOutcome::Completed);
        assert!(!ctx.is_rotating());
        ctx.stop_rotation();
        assert!(!second.is_aborted());
    }

    #[test]
    fn test_stop_navigation_cancels_recovery_rotation() {
        let mut ctx = context();
        ctx.begin_navigation(NavigationKind::Follow, None);
        let recovery = ctx.begin_rotation();
        ctx.begin_recovery(recovery.clone());
        assert_eq!(ctx.navigation_state(), NavigationState::Recovering);

        ctx.stop_navigation("test");

        assert!(recovery.is_aborted());
        assert!(!ctx.is_rotating());
        assert_eq!(ctx.navigation_state(), NavigationState::Idle);
    }

    #[test]
    fn test_unrelated_rotation_survives_navigation_stop() {
        let mut ctx = context();
        ctx.begin_navigation(NavigationKind::Follow, None);
        let recovery = ctx.begin_rotation();
        ctx.begin_recovery(recovery.clone());
        let user = ctx.begin_rotation();

        ctx.stop_navigation("test");

        assert!(!user.is_aborted());
        assert!(ctx.is_current_rotation(&user));
    }

    #[test]
    fn test_stop_all_actions() {
        let mut ctx = context();
        let walk = ctx.begin_random_walk();
        let nav = ctx.begin_navigation(NavigationKind::RandomWalkLeg, None);
        let rotation = ctx.begin_rotation();

        ctx.stop_all_actions("test");

        assert!(walk.is_aborted() && nav.is_aborted() && rotation.is_aborted());
        assert_eq!(ctx.navigation_state(), NavigationState::Idle);
        assert!(!ctx.is_walking_randomly());
        assert!(!ctx.is_rotating());
    }
}
