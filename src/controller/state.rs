//! # Controller State Module
//!
//! A normalized snapshot of one GameCube controller: connection flag, the 12
//! logical buttons and the 6 logical axes, plus derived stick geometry.
//!
//! ## Value Ranges
//!
//! | Axis | Range | Neutral |
//! |------|-------|---------|
//! | Main / C stick X, Y | -1.0 to 1.0 | 0.0 |
//! | L / R trigger | 0.0 to 1.0 | 0.0 |
//!
//! Stick Y follows the raw adapter convention: positive Y points down, which
//! is why `(0, 1)` reads as [`Direction::Down`].
//!
//! ## Usage
//!
//! ```
//! use gc_input::controller::buttons::{LogicalAxis, LogicalButton};
//! use gc_input::controller::state::{ControllerState, Direction};
//!
//! let mut state = ControllerState::new();
//! state.set_axis(LogicalAxis::MainX, 1.0);
//! state.set_button(LogicalButton::A, true);
//!
//! assert!(state.is_pressed(LogicalButton::A));
//! assert_eq!(state.main_stick_direction(0.5), Direction::Right);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f32::consts::PI;
use std::fmt;

use super::buttons::{LogicalAxis, LogicalButton, AXIS_COUNT, BUTTON_COUNT};

/// Default deadzone used by the octant direction helpers.
pub const DEFAULT_DIRECTION_DEADZONE: f32 = 0.5;

/// Normalized state of a single controller.
///
/// Buttons and axes are fixed-size arrays indexed by
/// [`LogicalButton::index`] and [`LogicalAxis::index`], so every logical
/// input is always present. The type is `Copy`: handing a state to a consumer
/// always hands over an independent value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "StateRepr", from = "StateRepr")]
pub struct ControllerState {
    connected: bool,
    buttons: [bool; BUTTON_COUNT],
    axes: [f32; AXIS_COUNT],
}

impl Default for ControllerState {
    /// Disconnected, all buttons released, all axes neutral.
    fn default() -> Self {
        Self {
            connected: false,
            buttons: [false; BUTTON_COUNT],
            axes: [0.0; AXIS_COUNT],
        }
    }
}

impl ControllerState {
    /// Creates a released, neutral, disconnected state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a released, neutral state with the given connection flag.
    #[must_use]
    pub fn with_connected(connected: bool) -> Self {
        Self {
            connected,
            ..Self::default()
        }
    }

    /// Whether the controller was connected when this state was taken.
    #[must_use]
    pub fn connected(&self) -> bool {
        self.connected
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    /// Returns whether `button` is pressed.
    #[must_use]
    pub fn is_pressed(&self, button: LogicalButton) -> bool {
        self.buttons[button.index()]
    }

    pub fn set_button(&mut self, button: LogicalButton, pressed: bool) {
        self.buttons[button.index()] = pressed;
    }

    /// Returns the normalized value of `axis`.
    #[must_use]
    pub fn axis(&self, axis: LogicalAxis) -> f32 {
        self.axes[axis.index()]
    }

    pub fn set_axis(&mut self, axis: LogicalAxis, value: f32) {
        self.axes[axis.index()] = value;
    }

    /// Iterates over `(button, pressed)` pairs in index order.
    pub fn buttons(&self) -> impl Iterator<Item = (LogicalButton, bool)> + '_ {
        LogicalButton::ALL.iter().map(move |&b| (b, self.buttons[b.index()]))
    }

    /// Iterates over `(axis, value)` pairs in index order.
    pub fn axes(&self) -> impl Iterator<Item = (LogicalAxis, f32)> + '_ {
        LogicalAxis::ALL.iter().map(move |&a| (a, self.axes[a.index()]))
    }

    /// Checks if any button is currently pressed.
    #[must_use]
    pub fn any_button_pressed(&self) -> bool {
        self.buttons.iter().any(|&pressed| pressed)
    }

    /// Returns an independent copy of this state.
    #[must_use]
    pub fn snapshot(&self) -> Self {
        *self
    }

    #[must_use]
    pub fn main_stick(&self) -> Stick {
        Stick::new(self.axis(LogicalAxis::MainX), self.axis(LogicalAxis::MainY))
    }

    #[must_use]
    pub fn c_stick(&self) -> Stick {
        Stick::new(self.axis(LogicalAxis::CX), self.axis(LogicalAxis::CY))
    }

    #[must_use]
    pub fn left_trigger(&self) -> f32 {
        self.axis(LogicalAxis::LAnalog)
    }

    #[must_use]
    pub fn right_trigger(&self) -> f32 {
        self.axis(LogicalAxis::RAnalog)
    }

    /// Main stick angle in radians, `atan2(y, x)`.
    #[must_use]
    pub fn main_stick_angle(&self) -> f32 {
        self.main_stick().angle()
    }

    /// Main stick deflection, capped at 1.0.
    #[must_use]
    pub fn main_stick_magnitude(&self) -> f32 {
        self.main_stick().magnitude()
    }

    #[must_use]
    pub fn c_stick_angle(&self) -> f32 {
        self.c_stick().angle()
    }

    #[must_use]
    pub fn c_stick_magnitude(&self) -> f32 {
        self.c_stick().magnitude()
    }

    /// Octant the main stick points into, or [`Direction::None`] while both
    /// axes are inside `deadzone`.
    #[must_use]
    pub fn main_stick_direction(&self, deadzone: f32) -> Direction {
        self.main_stick().direction(deadzone)
    }

    #[must_use]
    pub fn c_stick_direction(&self, deadzone: f32) -> Direction {
        self.c_stick().direction(deadzone)
    }
}

/// Position of an analog stick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Stick {
    pub x: f32,
    pub y: f32,
}

impl Stick {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Angle in radians, `atan2(y, x)`.
    #[must_use]
    pub fn angle(&self) -> f32 {
        self.y.atan2(self.x)
    }

    /// Euclidean deflection, capped at 1.0 (corners of a square gate
    /// would otherwise exceed it).
    #[must_use]
    pub fn magnitude(&self) -> f32 {
        self.x.hypot(self.y).min(1.0)
    }

    /// Buckets the stick into one of eight 45° sectors centered on the
    /// compass points.
    ///
    /// The gate is square: the stick reads [`Direction::None`] only while
    /// both `|x|` and `|y|` are below `deadzone`.
    #[must_use]
    pub fn direction(&self, deadzone: f32) -> Direction {
        if self.x.abs() < deadzone && self.y.abs() < deadzone {
            return Direction::None;
        }

        let degrees = self.angle() * (180.0 / PI);
        if (-22.5..22.5).contains(&degrees) {
            Direction::Right
        } else if (22.5..67.5).contains(&degrees) {
            Direction::DownRight
        } else if (67.5..112.5).contains(&degrees) {
            Direction::Down
        } else if (112.5..157.5).contains(&degrees) {
            Direction::DownLeft
        } else if degrees >= 157.5 || degrees < -157.5 {
            Direction::Left
        } else if (-157.5..-112.5).contains(&degrees) {
            Direction::UpLeft
        } else if (-112.5..-67.5).contains(&degrees) {
            Direction::Up
        } else if (-67.5..-22.5).contains(&degrees) {
            Direction::UpRight
        } else {
            Direction::None
        }
    }
}

/// 8-way stick direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    None,
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    UpLeft,
    Up,
    UpRight,
}

impl Direction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::None => "none",
            Direction::Right => "right",
            Direction::DownRight => "down-right",
            Direction::Down => "down",
            Direction::DownLeft => "down-left",
            Direction::Left => "left",
            Direction::UpLeft => "up-left",
            Direction::Up => "up",
            Direction::UpRight => "up-right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plain key/value shape of [`ControllerState`] on the wire:
/// `{"connected": .., "buttons": {"A": ..}, "axes": {"MAIN_X": ..}}`.
#[derive(Serialize, Deserialize)]
struct StateRepr {
    #[serde(default)]
    connected: bool,
    #[serde(default)]
    buttons: BTreeMap<LogicalButton, bool>,
    #[serde(default)]
    axes: BTreeMap<LogicalAxis, f32>,
}

impl From<ControllerState> for StateRepr {
    fn from(state: ControllerState) -> Self {
        Self {
            connected: state.connected,
            buttons: state.buttons().collect(),
            axes: state.axes().collect(),
        }
    }
}

impl From<StateRepr> for ControllerState {
    fn from(repr: StateRepr) -> Self {
        let mut state = ControllerState::with_connected(repr.connected);
        for (button, pressed) in repr.buttons {
            state.set_button(button, pressed);
        }
        for (axis, value) in repr.axes {
            state.set_axis(axis, value);
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-6;

    // ==================== ControllerState Tests ====================

    #[test]
    fn test_controller_state_default() {
        let state = ControllerState::default();

        assert!(!state.connected());
        for button in LogicalButton::ALL {
            assert!(!state.is_pressed(button), "{} should be released", button);
        }
        for axis in LogicalAxis::ALL {
            assert_eq!(state.axis(axis), 0.0, "{} should be neutral", axis);
        }
        assert!(!state.any_button_pressed());
    }

    #[test]
    fn test_set_and_read_inputs() {
        let mut state = ControllerState::with_connected(true);
        state.set_button(LogicalButton::Z, true);
        state.set_axis(LogicalAxis::LAnalog, 0.75);

        assert!(state.connected());
        assert!(state.is_pressed(LogicalButton::Z));
        assert!(!state.is_pressed(LogicalButton::R));
        assert_eq!(state.left_trigger(), 0.75);
        assert_eq!(state.right_trigger(), 0.0);
        assert!(state.any_button_pressed());
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut state = ControllerState::with_connected(true);
        let snapshot = state.snapshot();

        state.set_button(LogicalButton::A, true);
        state.set_axis(LogicalAxis::MainX, 0.5);

        assert!(!snapshot.is_pressed(LogicalButton::A));
        assert_eq!(snapshot.axis(LogicalAxis::MainX), 0.0);
    }

    // ==================== Geometry Tests ====================

    #[test]
    fn test_stick_magnitude_is_capped() {
        let mut state = ControllerState::new();
        state.set_axis(LogicalAxis::MainX, 1.0);
        state.set_axis(LogicalAxis::MainY, 1.0);
        assert_eq!(state.main_stick_magnitude(), 1.0);

        state.set_axis(LogicalAxis::MainX, 0.3);
        state.set_axis(LogicalAxis::MainY, 0.4);
        assert!((state.main_stick_magnitude() - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_stick_angle() {
        let mut state = ControllerState::new();
        state.set_axis(LogicalAxis::CX, 0.0);
        state.set_axis(LogicalAxis::CY, 1.0);
        assert!((state.c_stick_angle() - PI / 2.0).abs() < EPSILON);
        assert_eq!(state.c_stick_magnitude(), 1.0);
    }

    #[test]
    fn test_cardinal_directions() {
        assert_eq!(Stick::new(1.0, 0.0).direction(0.5), Direction::Right);
        assert_eq!(Stick::new(0.0, 1.0).direction(0.5), Direction::Down);
        assert_eq!(Stick::new(-1.0, 0.0).direction(0.5), Direction::Left);
        assert_eq!(Stick::new(0.0, -1.0).direction(0.5), Direction::Up);
    }

    #[test]
    fn test_diagonal_directions() {
        assert_eq!(Stick::new(0.7, 0.7).direction(0.5), Direction::DownRight);
        assert_eq!(Stick::new(-0.7, 0.7).direction(0.5), Direction::DownLeft);
        assert_eq!(Stick::new(-0.7, -0.7).direction(0.5), Direction::UpLeft);
        assert_eq!(Stick::new(0.7, -0.7).direction(0.5), Direction::UpRight);
    }

    #[test]
    fn test_direction_inside_deadzone() {
        assert_eq!(Stick::new(0.1, 0.1).direction(0.5), Direction::None);
        assert_eq!(Stick::new(0.0, 0.0).direction(0.0), Direction::Right);
    }

    #[test]
    fn test_direction_gate_is_square() {
        // x alone is outside the gate, so the stick counts as deflected
        assert_eq!(Stick::new(0.6, 0.1).direction(0.5), Direction::Right);
    }

    #[test]
    fn test_direction_sector_boundaries() {
        let at = |deg: f32| {
            let rad = deg * PI / 180.0;
            Stick::new(rad.cos(), rad.sin()).direction(0.5)
        };
        assert_eq!(at(20.0), Direction::Right);
        assert_eq!(at(25.0), Direction::DownRight);
        assert_eq!(at(110.0), Direction::Down);
        assert_eq!(at(115.0), Direction::DownLeft);
        assert_eq!(at(160.0), Direction::Left);
        assert_eq!(at(-160.0), Direction::Left);
        assert_eq!(at(-150.0), Direction::UpLeft);
        assert_eq!(at(-70.0), Direction::Up);
        assert_eq!(at(-60.0), Direction::UpRight);
    }

    #[test]
    fn test_direction_labels() {
        assert_eq!(Direction::None.to_string(), "none");
        assert_eq!(Direction::DownLeft.to_string(), "down-left");
        assert_eq!(serde_json::to_string(&Direction::UpRight).unwrap(), "\"up-right\"");
    }

    // ==================== Serialization Tests ====================

    #[test]
    fn test_serializes_as_plain_maps() {
        let mut state = ControllerState::with_connected(true);
        state.set_button(LogicalButton::DpadUp, true);
        state.set_axis(LogicalAxis::RAnalog, 0.25);

        let value = serde_json::to_value(state).unwrap();
        assert_eq!(value["connected"], true);
        assert_eq!(value["buttons"]["DPAD_UP"], true);
        assert_eq!(value["buttons"]["A"], false);
        assert_eq!(value["axes"]["R_ANALOG"], 0.25);
        assert_eq!(value["buttons"].as_object().unwrap().len(), BUTTON_COUNT);
        assert_eq!(value["axes"].as_object().unwrap().len(), AXIS_COUNT);
    }

    #[test]
    fn test_json_round_trip() {
        let mut state = ControllerState::with_connected(true);
        state.set_button(LogicalButton::Start, true);
        state.set_axis(LogicalAxis::MainY, -0.5);

        let json = serde_json::to_string(&state).unwrap();
        let back: ControllerState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_deserialize_fills_missing_keys() {
        let state: ControllerState =
            serde_json::from_str(r#"{"connected": true, "buttons": {"B": true}}"#).unwrap();
        assert!(state.connected());
        assert!(state.is_pressed(LogicalButton::B));
        assert!(!state.is_pressed(LogicalButton::A));
        assert_eq!(state.axis(LogicalAxis::CX), 0.0);
    }
}
