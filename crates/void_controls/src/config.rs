//! Controls configuration

use serde::{Deserialize, Serialize};

use crate::error::{ControlsError, ControlsResult};

/// Tuning for the navigation, rotation and random-walk loops
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Period of every control loop (ms)
    pub tick_interval_ms: u64,

    /// Arrival distance for `goto` and random-walk legs
    pub navigation_stop_distance: f32,

    /// Default arrival distance for `follow_entity`
    pub follow_stop_distance: f32,

    /// Upper bound of the pause between random-walk legs (ms)
    pub random_walk_interval_ms: u64,

    /// Radius around the actor in which random-walk targets are picked
    pub random_walk_max_distance: f32,

    /// Total random-walk duration (ms)
    pub random_walk_duration_ms: u64,

    /// Horizontal movement per tick below which the tick counts as stalled
    pub stuck_threshold: f32,

    /// Consecutive stalled ticks before a recovery is attempted
    pub max_no_progress_ticks: u32,

    /// Recovery attempts before the teleport fallback
    pub max_recovery_attempts: u32,

    /// Distance above which sprinting is allowed
    pub sprint_distance_threshold: f32,

    /// Duration of the recovery rotation (ms)
    pub recovery_rotation_ms: u64,

    /// Upper bound on waiting for the recovery rotation (ms)
    pub recovery_timeout_ms: u64,

    /// Default duration for `rotate_to` (ms)
    pub rotation_duration_ms: u64,

    /// Fixed RNG seed, entropy-seeded when absent
    pub rng_seed: Option<u64>,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            navigation_stop_distance: 0.5,
            follow_stop_distance: 2.5,
            random_walk_interval_ms: 5000,
            random_walk_max_distance: 7.0,
            random_walk_duration_ms: 30_000,
            stuck_threshold: 0.05,
            max_no_progress_ticks: 10,
            max_recovery_attempts: 3,
            sprint_distance_threshold: 15.0,
            recovery_rotation_ms: 500,
            recovery_timeout_ms: 1000,
            rotation_duration_ms: 500,
            rng_seed: None,
        }
    }
}

impl ControlsConfig {
    /// Parse a configuration from JSON, missing fields take their defaults
    pub fn from_json(json: &str) -> ControlsResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the tick period
    pub fn with_tick_interval(mut self, ms: u64) -> Self {
        self.tick_interval_ms = ms;
        self
    }

    /// Set the goto arrival distance
    pub fn with_stop_distance(mut self, distance: f32) -> Self {
        self.navigation_stop_distance = distance;
        self
    }

    /// Set stuck detection parameters
    pub fn with_stuck_detection(mut self, threshold: f32, ticks: u32, attempts: u32) -> Self {
        self.stuck_threshold = threshold;
        self.max_no_progress_ticks = ticks;
        self.max_recovery_attempts = attempts;
        self
    }

    /// Set the recovery rotation length and the time recovery may wait for it
    pub fn with_recovery_timing(mut self, rotation_ms: u64, timeout_ms: u64) -> Self {
        self.recovery_rotation_ms = rotation_ms;
        self.recovery_timeout_ms = timeout_ms;
        self
    }

    /// Set the RNG seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Check the configuration for values the loops cannot work with
    pub fn validate(&self) -> ControlsResult<()> {
        if self.tick_interval_ms == 0 {
            return Err(ControlsError::InvalidConfig(
                "tick_interval_ms must be greater than zero".into(),
            ));
        }
        if self.max_no_progress_ticks == 0 {
            return Err(ControlsError::InvalidConfig(
                "max_no_progress_ticks must be greater than zero".into(),
            ));
        }

        let distances = [
            ("navigation_stop_distance", self.navigation_stop_distance),
            ("follow_stop_distance", self.follow_stop_distance),
            ("random_walk_max_distance", self.random_walk_max_distance),
            ("stuck_threshold", self.stuck_threshold),
            ("sprint_distance_threshold", self.sprint_distance_threshold),
        ];
        for (name, value) in distances {
            if !value.is_finite() || value < 0.0 {
                return Err(ControlsError::InvalidConfig(format!(
                    "{name} must be a finite, non-negative number (got {value})"
                )));
            }
        }

        Ok(())
    }
}
