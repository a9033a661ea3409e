//! # Calibration Module
//!
//! Turns raw adapter axis readings into normalized logical axis values.
//!
//! ## Deadzone
//!
//! A deadzone eliminates small stick movements near center to prevent drift.
//! Values within the deadzone are mapped to center (0.0), while values outside
//! are rescaled so the remaining travel still spans the full -1.0 to 1.0
//! range. There is no jump at the deadzone edge: an input of exactly
//! `deadzone` already maps to 0.0.
//!
//! The formula used is: `output = sign(input) * (|input| - dz) / (1 - dz)`
//!
//! ## Trigger Remap
//!
//! Adapters report analog triggers on -1.0 to 1.0. Triggers are remapped to
//! 0.0 to 1.0 with `(input + 1) / 2` and clamped.
//!
//! ## Smoothing
//!
//! Optional exponential smoothing blends each new reading into the previous
//! one: `output = prev + (input - prev) * factor`.
//!
//! ## Usage
//!
//! ```
//! use gc_input::controller::calibration::Calibration;
//! use gc_input::controller::mapping::AxisRule;
//!
//! let cal = Calibration::new(0.15);
//! let stick = AxisRule::full(0);
//!
//! // Input near center (within deadzone)
//! assert_eq!(cal.apply(&stick, 0.1, 0.0), 0.0);
//!
//! // Input at full deflection
//! assert!((cal.apply(&stick, 1.0, 0.0) - 1.0).abs() < 0.001);
//! ```

use super::mapping::{AxisRange, AxisRule};

/// Lower bound for the smoothing factor; 0.0 would freeze the axis.
pub const MIN_SMOOTH_FACTOR: f32 = 0.01;

/// Per-axis normalization settings shared by every axis of a controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    /// Deadzone as a fraction (0.0 to 1.0).
    deadzone: f32,
    /// Smoothing factor, `None` when smoothing is off.
    smoothing: Option<f32>,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            deadzone: 0.15,
            smoothing: None,
        }
    }
}

impl Calibration {
    /// Creates a calibration with the given deadzone and no smoothing.
    ///
    /// # Arguments
    ///
    /// * `deadzone` - Deadzone fraction (0.0 to 1.0). Values outside this range are clamped.
    #[must_use]
    pub fn new(deadzone: f32) -> Self {
        Self {
            deadzone: deadzone.clamp(0.0, 1.0),
            smoothing: None,
        }
    }

    /// Enables exponential smoothing with `factor` (clamped to 0.01..=1.0).
    #[must_use]
    pub fn with_smoothing(mut self, factor: f32) -> Self {
        self.smoothing = Some(factor.clamp(MIN_SMOOTH_FACTOR, 1.0));
        self
    }

    /// Returns the configured deadzone value.
    #[must_use]
    pub fn deadzone(&self) -> f32 {
        self.deadzone
    }

    /// Returns the smoothing factor, if smoothing is on.
    #[must_use]
    pub fn smoothing(&self) -> Option<f32> {
        self.smoothing
    }

    /// Normalizes one raw axis reading according to `rule`.
    ///
    /// Applies inversion, then the trigger remap or the deadzone depending on
    /// the rule's range, then smoothing toward `previous`. A non-finite `raw`
    /// reading leaves the axis at `previous`.
    ///
    /// # Arguments
    ///
    /// * `rule` - Mapping rule for this axis
    /// * `raw` - Raw value reported by the adapter
    /// * `previous` - Value this axis had on the previous tick
    #[must_use]
    pub fn apply(&self, rule: &AxisRule, raw: f32, previous: f32) -> f32 {
        if !raw.is_finite() {
            return previous;
        }

        let value = if rule.invert { -raw } else { raw };

        let value = match rule.range {
            AxisRange::Trigger => remap_trigger(value),
            AxisRange::Full => apply_deadzone(value, self.deadzone),
        };

        match self.smoothing {
            Some(factor) => smooth(previous, value, factor),
            None => value,
        }
    }
}

/// Applies a rescaling deadzone to a full-range value.
///
/// Values with `|input| < deadzone` become 0.0; the rest is rescaled to
/// span the full range and clamped to -1.0..=1.0.
///
/// # Examples
///
/// ```
/// use gc_input::controller::calibration::apply_deadzone;
///
/// assert_eq!(apply_deadzone(0.1, 0.15), 0.0);
/// assert_eq!(apply_deadzone(0.15, 0.15), 0.0);
/// assert_eq!(apply_deadzone(1.0, 0.15), 1.0);
/// assert_eq!(apply_deadzone(-1.0, 0.15), -1.0);
/// ```
#[must_use]
pub fn apply_deadzone(input: f32, deadzone: f32) -> f32 {
    let magnitude = input.abs();
    if magnitude < deadzone || deadzone >= 1.0 {
        return 0.0;
    }

    let scaled = (magnitude - deadzone) / (1.0 - deadzone);
    (input.signum() * scaled).clamp(-1.0, 1.0)
}

/// Remaps a trigger reading from -1.0..=1.0 onto 0.0..=1.0.
///
/// # Examples
///
/// ```
/// use gc_input::controller::calibration::remap_trigger;
///
/// assert_eq!(remap_trigger(-1.0), 0.0);
/// assert_eq!(remap_trigger(0.0), 0.5);
/// assert_eq!(remap_trigger(1.0), 1.0);
/// assert_eq!(remap_trigger(1.5), 1.0);
/// ```
#[must_use]
pub fn remap_trigger(input: f32) -> f32 {
    ((input + 1.0) / 2.0).clamp(0.0, 1.0)
}

/// Exponential smoothing step from `previous` toward `target`.
#[inline]
#[must_use]
pub fn smooth(previous: f32, target: f32, factor: f32) -> f32 {
    previous + (target - previous) * factor
}
