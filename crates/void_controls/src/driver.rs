//! Real-time driver
//!
//! Runs the control loops against wall-clock time on a tokio interval. Each
//! tick advances the controls, lets the movement simulation consume the
//! signals, then clears the signal edges.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::controls::AgentControls;
use crate::error::{ControlsError, ControlsResult};
use crate::token::CancelToken;
use crate::world::{AgentWorld, MovementSimulation};

/// Handle to a running driver task
pub struct ControlsDriver {
    stop: CancelToken,
    handle: JoinHandle<()>,
}

impl ControlsDriver {
    /// Spawn the driver on the current tokio runtime.
    ///
    /// Every tick locks `world` first, then `controls`. Callers that hold
    /// both locks must take them in the same order.
    pub fn spawn<W>(
        controls: Arc<Mutex<AgentControls>>,
        world: Arc<Mutex<W>>,
        period: Duration,
    ) -> ControlsResult<Self>
    where
        W: AgentWorld + MovementSimulation + Send + 'static,
    {
        if period.is_zero() {
            return Err(ControlsError::InvalidConfig(
                "driver period must be greater than zero".into(),
            ));
        }

        let stop = CancelToken::new();
        let task_stop = stop.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut last = Instant::now();

            log::debug!("[Controls] Driver started ({:?} period)", period);
            loop {
                interval.tick().await;
                if task_stop.is_aborted() {
                    break;
                }

                let now = Instant::now();
                let dt = now - last;
                last = now;

                {
                    let mut world = world.lock();
                    let mut controls = controls.lock();
                    controls.update(&mut *world, dt);
                    world.simulate(controls.signals(), dt);
                    controls.end_tick();
                }
            }
            log::debug!("[Controls] Driver stopped");
        });

        Ok(Self { stop, handle })
    }

    /// Whether the driver task is still running
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop the driver and wait for it to exit
    pub async fn shutdown(self) {
        self.stop.abort();
        if let Err(e) = self.handle.await {
            log::error!("[Controls] Driver task failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControlsConfig;
    use crate::geometry::horizontal_distance;
    use crate::sim::KinematicWorld;
    use glam::Vec3;

    #[tokio::test(start_paused = true)]
    async fn test_driver_walks_to_goal() {
        let controls = Arc::new(Mutex::new(
            AgentControls::new(ControlsConfig::default().with_seed(5)).unwrap(),
        ));
        let world = Arc::new(Mutex::new(KinematicWorld::new()));

        controls.lock().goto(6.0, -2.0);
        let driver =
            ControlsDriver::spawn(controls.clone(), world.clone(), Duration::from_millis(50)).unwrap();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(driver.is_running());
        driver.shutdown().await;

        assert!(!controls.lock().is_navigating());
        assert!(!controls.lock().signals().any_movement_down());
        let position = world.lock().actor_position().unwrap();
        assert!(horizontal_distance(position, Vec3::new(6.0, 0.0, -2.0)) <= 0.5 + 1e-3);
    }

    #[tokio::test]
    async fn test_zero_period_rejected() {
        let controls = Arc::new(Mutex::new(AgentControls::new(ControlsConfig::default()).unwrap()));
        let world = Arc::new(Mutex::new(KinematicWorld::new()));

        let result = ControlsDriver::spawn(controls, world, Duration::ZERO);
        assert!(matches!(result, Err(ControlsError::InvalidConfig(_))));
    }
}
