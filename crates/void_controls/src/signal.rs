//! Input signal registry
//!
//! Named boolean inputs with one-tick edge flags. The control loops write
//! them, the external movement simulation reads them once per tick, and
//! [`SignalRegistry::tick_reset`] clears the edges afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ControlsError;

/// Known input signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    Forward,
    Backward,
    Left,
    Right,
    Jump,
    Sprint,
    Crouch,
    Interact,
}

impl Signal {
    /// Number of known signals
    pub const COUNT: usize = 8;

    /// All known signals, in index order
    pub const ALL: [Signal; Self::COUNT] = [
        Signal::Forward,
        Signal::Backward,
        Signal::Left,
        Signal::Right,
        Signal::Jump,
        Signal::Sprint,
        Signal::Crouch,
        Signal::Interact,
    ];

    /// Signals released whenever a navigation session ends
    pub const MOVEMENT: [Signal; 6] = [
        Signal::Forward,
        Signal::Backward,
        Signal::Left,
        Signal::Right,
        Signal::Jump,
        Signal::Sprint,
    ];

    /// Canonical signal name
    pub fn name(self) -> &'static str {
        match self {
            Signal::Forward => "moveForward",
            Signal::Backward => "moveBackward",
            Signal::Left => "moveLeft",
            Signal::Right => "moveRight",
            Signal::Jump => "jump",
            Signal::Sprint => "sprint",
            Signal::Crouch => "crouch",
            Signal::Interact => "interact",
        }
    }

    /// Resolve a canonical name or a keyboard alias
    pub fn from_name(name: &str) -> Option<Self> {
        let signal = match name {
            "moveForward" | "keyW" => Signal::Forward,
            "moveBackward" | "keyS" => Signal::Backward,
            "moveLeft" | "keyA" => Signal::Left,
            "moveRight" | "keyD" => Signal::Right,
            "jump" | "space" => Signal::Jump,
            "sprint" | "shiftLeft" => Signal::Sprint,
            "crouch" | "controlLeft" => Signal::Crouch,
            "interact" | "keyE" => Signal::Interact,
            _ => return None,
        };
        Some(signal)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Signal {
    type Err = ControlsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Signal::from_name(s).ok_or_else(|| ControlsError::UnknownSignal(s.to_string()))
    }
}

/// State of a single signal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalState {
    /// Currently held
    pub down: bool,
    /// Went down since the last tick reset
    pub pressed: bool,
    /// Went up since the last tick reset
    pub released: bool,
}

impl SignalState {
    /// Apply a new level, returns true if it was an edge
    fn set(&mut self, down: bool) -> bool {
        if down == self.down {
            return false;
        }
        if down {
            self.pressed = true;
            self.released = false;
        } else {
            self.released = true;
            self.pressed = false;
        }
        self.down = down;
        true
    }

    fn clear_edges(&mut self) {
        self.pressed = false;
        self.released = false;
    }
}

/// Registry of all input signals for one actor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalRegistry {
    states: [SignalState; Signal::COUNT],
    /// Signals created on demand for names outside [`Signal`]
    extra: HashMap<String, SignalState>,
}

impl SignalRegistry {
    /// Create a registry with every known signal up
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a known signal
    pub fn set(&mut self, signal: Signal, down: bool) {
        if self.states[signal.index()].set(down) {
            log::trace!("[Controls] {} = {}", signal, down);
        }
    }

    /// Set a signal by name, creating it if the name is unknown
    pub fn set_by_name(&mut self, name: &str, down: bool) {
        if let Some(signal) = Signal::from_name(name) {
            self.set(signal, down);
            return;
        }
        let state = self.extra.entry(name.to_string()).or_insert_with(|| {
            log::warn!("[Controls] Unknown signal '{}', creating it", name);
            SignalState::default()
        });
        state.set(down);
    }

    /// State of a known signal
    pub fn get(&self, signal: Signal) -> SignalState {
        self.states[signal.index()]
    }

    /// State of a signal by name
    pub fn get_by_name(&self, name: &str) -> Option<SignalState> {
        match Signal::from_name(name) {
            Some(signal) => Some(self.get(signal)),
            None => self.extra.get(name).copied(),
        }
    }

    /// Whether a signal is held
    pub fn is_down(&self, signal: Signal) -> bool {
        self.get(signal).down
    }

    /// Whether a signal went down this tick
    pub fn just_pressed(&self, signal: Signal) -> bool {
        self.get(signal).pressed
    }

    /// Whether a signal went up this tick
    pub fn just_released(&self, signal: Signal) -> bool {
        self.get(signal).released
    }

    /// Release every movement signal
    pub fn release_movement(&mut self) {
        for signal in Signal::MOVEMENT {
            self.set(signal, false);
        }
    }

    /// Whether any movement signal is held
    pub fn any_movement_down(&self) -> bool {
        Signal::MOVEMENT.iter().any(|&s| self.is_down(s))
    }

    /// Clear all edge flags. Run once per tick, after the simulation has
    /// read the signals.
    pub fn tick_reset(&mut self) {
        for state in &mut self.states {
            state.clear_edges();
        }
        for state in self.extra.values_mut() {
            state.clear_edges();
        }
    }

    /// Iterate over the known signals and their state
    pub fn iter(&self) -> impl Iterator<Item = (Signal, SignalState)> + '_ {
        Signal::ALL.iter().map(move |&s| (s, self.get(s)))
    }

    /// Names of lazily created signals
    pub fn extra_names(&self) -> impl Iterator<Item = &str> {
        self.extra.keys().map(|k| k.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_sets_edge_until_reset() {
        let mut signals = SignalRegistry::new();
        signals.set(Signal::Forward, true);

        assert!(signals.is_down(Signal::Forward));
        assert!(signals.just_pressed(Signal::Forward));
        assert!(!signals.just_released(Signal::Forward));

        signals.tick_reset();
        assert!(signals.is_down(Signal::Forward));
        assert!(!signals.just_pressed(Signal::Forward));
    }

    #[test]
    fn test_release_edge() {
        let mut signals = SignalRegistry::new();
        signals.set(Signal::Jump, true);
        signals.tick_reset();
        signals.set(Signal::Jump, false);

        let state = signals.get(Signal::Jump);
        assert!(!state.down);
        assert!(state.released);
        assert!(!state.pressed);

        signals.tick_reset();
        assert_eq!(signals.get(Signal::Jump), SignalState::default());
    }

    #[test]
    fn test_repeated_level_has_no_effect() {
        let mut signals = SignalRegistry::new();
        signals.set(Signal::Sprint, true);
        signals.tick_reset();
        signals.set(Signal::Sprint, true);

        assert!(!signals.just_pressed(Signal::Sprint));

        signals.set(Signal::Crouch, false);
        assert_eq!(signals.get(Signal::Crouch), SignalState::default());
    }

    #[test]
    fn test_press_then_release_same_tick() {
        let mut signals = SignalRegistry::new();
        signals.set(Signal::Left, true);
        signals.set(Signal::Left, false);

        let state = signals.get(Signal::Left);
        assert!(state.released);
        assert!(!state.pressed);
    }

    #[test]
    fn test_aliases_resolve() {
        assert_eq!(Signal::from_name("keyW"), Some(Signal::Forward));
        assert_eq!(Signal::from_name("shiftLeft"), Some(Signal::Sprint));
        assert_eq!("jump".parse::<Signal>().unwrap(), Signal::Jump);
        assert!(matches!(
            "warp".parse::<Signal>(),
            Err(ControlsError::UnknownSignal(_))
        ));
    }

    #[test]
    fn test_unknown_name_created_lazily() {
        let mut signals = SignalRegistry::new();
        assert!(signals.get_by_name("emote").is_none());

        signals.set_by_name("emote", true);
        let state = signals.get_by_name("emote").unwrap();
        assert!(state.down && state.pressed);

        signals.tick_reset();
        assert!(!signals.get_by_name("emote").unwrap().pressed);
        assert_eq!(signals.extra_names().collect::<Vec<_>>(), vec!["emote"]);
    }

    #[test]
    fn test_release_movement() {
        let mut signals = SignalRegistry::new();
        signals.set(Signal::Forward, true);
        signals.set(Signal::Sprint, true);
        signals.set(Signal::Interact, true);
        assert!(signals.any_movement_down());

        signals.release_movement();
        assert!(!signals.any_movement_down());
        assert!(signals.is_down(Signal::Interact));
    }
}
