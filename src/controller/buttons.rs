//! # Logical Vocabulary
//!
//! The fixed set of GameCube buttons and analog axes every adapter is
//! normalized into.
//!
//! | Button | Label | | Axis | Label |
//! |--------|-------|-|------|-------|
//! | `A` | A | | `MAIN_X` | Main Stick X |
//! | `B` | B | | `MAIN_Y` | Main Stick Y |
//! | `X` | X | | `C_X` | C-Stick X |
//! | `Y` | Y | | `C_Y` | C-Stick Y |
//! | `Z` | Z | | `L_ANALOG` | L Trigger |
//! | `L` | L | | `R_ANALOG` | R Trigger |
//! | `R` | R | | | |
//! | `START` | Start | | | |
//! | `DPAD_UP` | D-Up | | | |
//! | `DPAD_DOWN` | D-Down | | | |
//! | `DPAD_LEFT` | D-Left | | | |
//! | `DPAD_RIGHT` | D-Right | | | |
//!
//! Both enums carry a stable index so per-button and per-axis data can live
//! in fixed-size arrays.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of logical buttons.
pub const BUTTON_COUNT: usize = 12;

/// Number of logical axes.
pub const AXIS_COUNT: usize = 6;

/// A logical GameCube button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogicalButton {
    A,
    B,
    X,
    Y,
    Z,
    L,
    R,
    Start,
    DpadUp,
    DpadDown,
    DpadLeft,
    DpadRight,
}

impl LogicalButton {
    /// Every button, in index order.
    pub const ALL: [LogicalButton; BUTTON_COUNT] = [
        LogicalButton::A,
        LogicalButton::B,
        LogicalButton::X,
        LogicalButton::Y,
        LogicalButton::Z,
        LogicalButton::L,
        LogicalButton::R,
        LogicalButton::Start,
        LogicalButton::DpadUp,
        LogicalButton::DpadDown,
        LogicalButton::DpadLeft,
        LogicalButton::DpadRight,
    ];

    /// Position of this button in [`LogicalButton::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Symbolic identifier, e.g. `DPAD_UP`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            LogicalButton::A => "A",
            LogicalButton::B => "B",
            LogicalButton::X => "X",
            LogicalButton::Y => "Y",
            LogicalButton::Z => "Z",
            LogicalButton::L => "L",
            LogicalButton::R => "R",
            LogicalButton::Start => "START",
            LogicalButton::DpadUp => "DPAD_UP",
            LogicalButton::DpadDown => "DPAD_DOWN",
            LogicalButton::DpadLeft => "DPAD_LEFT",
            LogicalButton::DpadRight => "DPAD_RIGHT",
        }
    }

    /// Human-readable label, e.g. `D-Up`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            LogicalButton::A => "A",
            LogicalButton::B => "B",
            LogicalButton::X => "X",
            LogicalButton::Y => "Y",
            LogicalButton::Z => "Z",
            LogicalButton::L => "L",
            LogicalButton::R => "R",
            LogicalButton::Start => "Start",
            LogicalButton::DpadUp => "D-Up",
            LogicalButton::DpadDown => "D-Down",
            LogicalButton::DpadLeft => "D-Left",
            LogicalButton::DpadRight => "D-Right",
        }
    }
}

impl fmt::Display for LogicalButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A logical GameCube analog axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogicalAxis {
    MainX,
    MainY,
    CX,
    CY,
    LAnalog,
    RAnalog,
}

impl LogicalAxis {
    /// Every axis, in index order.
    pub const ALL: [LogicalAxis; AXIS_COUNT] = [
        LogicalAxis::MainX,
        LogicalAxis::MainY,
        LogicalAxis::CX,
        LogicalAxis::CY,
        LogicalAxis::LAnalog,
        LogicalAxis::RAnalog,
    ];

    /// Position of this axis in [`LogicalAxis::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Symbolic identifier, e.g. `L_ANALOG`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            LogicalAxis::MainX => "MAIN_X",
            LogicalAxis::MainY => "MAIN_Y",
            LogicalAxis::CX => "C_X",
            LogicalAxis::CY => "C_Y",
            LogicalAxis::LAnalog => "L_ANALOG",
            LogicalAxis::RAnalog => "R_ANALOG",
        }
    }

    /// Human-readable label, e.g. `L Trigger`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            LogicalAxis::MainX => "Main Stick X",
            LogicalAxis::MainY => "Main Stick Y",
            LogicalAxis::CX => "C-Stick X",
            LogicalAxis::CY => "C-Stick Y",
            LogicalAxis::LAnalog => "L Trigger",
            LogicalAxis::RAnalog => "R Trigger",
        }
    }
}

impl fmt::Display for LogicalAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_indices_match_all_order() {
        for (i, button) in LogicalButton::ALL.iter().enumerate() {
            assert_eq!(button.index(), i, "{} out of order", button);
        }
    }

    #[test]
    fn test_axis_indices_match_all_order() {
        for (i, axis) in LogicalAxis::ALL.iter().enumerate() {
            assert_eq!(axis.index(), i, "{} out of order", axis);
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(LogicalButton::Start.label(), "Start");
        assert_eq!(LogicalButton::DpadLeft.label(), "D-Left");
        assert_eq!(LogicalAxis::CY.label(), "C-Stick Y");
        assert_eq!(LogicalAxis::RAnalog.label(), "R Trigger");
    }

    #[test]
    fn test_serde_names_match_symbols() {
        for button in LogicalButton::ALL {
            let json = serde_json::to_string(&button).unwrap();
            assert_eq!(json, format!("\"{}\"", button.as_str()));
        }
        for axis in LogicalAxis::ALL {
            let json = serde_json::to_string(&axis).unwrap();
            assert_eq!(json, format!("\"{}\"", axis.as_str()));
        }
    }
}
