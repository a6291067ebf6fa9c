//! Void Controls - Autonomous Agent Navigation and Control
//!
//! This crate turns high-level movement intents into a stream of input
//! signals that an external movement simulation consumes every tick.
//!
//! # Features
//!
//! - Signal registry with one-tick press/release edges
//! - Straight-line navigation towards fixed points or moving entities
//! - Stuck detection with rotate-and-jump recovery and a teleport fallback
//! - Random walk around the actor
//! - Slerp-based turn-to-face rotation
//! - Cooperative cancellation: at most one navigation and one rotation
//!   session per actor
//!
//! # Architecture
//!
//! ```text
//!   goto / follow_entity / start_random_walk / rotate_to
//!                        │
//!                        ▼
//!   ┌────────────────────────────────────────────┐
//!   │               AgentControls                │
//!   │  ┌───────────┐  ┌────────────────────────┐ │
//!   │  │ Scheduler │─▶│ Navigation / Rotation / │ │
//!   │  │ (sim ms)  │  │ RandomWalk tasks        │ │
//!   │  └───────────┘  └───────────┬────────────┘ │
//!   │                  ┌──────────▼──────────┐   │
//!   │                  │   SignalRegistry    │   │
//!   │                  └──────────┬──────────┘   │
//!   └─────────────────────────────┼──────────────┘
//!                                 ▼
//!                     external movement simulation
//! ```
//!
//! # Example
//!
//! ```ignore
//! use void_controls::prelude::*;
//!
//! let mut controls = AgentControls::new(ControlsConfig::default())?;
//! let mut world = KinematicWorld::new();
//!
//! controls.goto(10.0, 10.0);
//! while controls.is_navigating() {
//!     let dt = Duration::from_millis(100);
//!     controls.update(&mut world, dt);
//!     world.simulate(controls.signals(), dt);
//!     controls.end_tick();
//! }
//! ```

pub mod config;
pub mod controls;
pub mod coordinator;
pub mod driver;
pub mod error;
pub mod events;
pub mod geometry;
pub mod navigation;
pub mod random_walk;
pub mod rotation;
mod scheduler;
pub mod signal;
pub mod sim;
pub mod token;
pub mod world;

pub mod prelude {
    //! Common imports for agent controls
    pub use crate::config::ControlsConfig;
    pub use crate::controls::AgentControls;
    pub use crate::coordinator::NavigationState;
    pub use crate::driver::ControlsDriver;
    pub use crate::error::{ControlsError, ControlsResult};
    pub use crate::events::{ControlEvent, NavOutcome, NavigationKind, RotationOutcome};
    pub use crate::navigation::{EntityTarget, FixedTarget, TargetResolver};
    pub use crate::rotation::RotateDirection;
    pub use crate::signal::{Signal, SignalRegistry, SignalState};
    pub use crate::sim::KinematicWorld;
    pub use crate::token::CancelToken;
    pub use crate::world::{ActorState, AgentWorld, EntityId, MovementSimulation};
}

pub use prelude::*;
