//! # Engine Options
//!
//! Construction-time settings of the normalization engine. Every field can
//! also be changed later through the engine's setters.

use serde::{Deserialize, Serialize};

use crate::controller::calibration::{Calibration, MIN_SMOOTH_FACTOR};

/// Normalization and polling settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Stick deadzone (0.0 to 1.0).
    #[serde(default = "default_deadzone")]
    pub deadzone: f32,

    /// Analog trigger value at which L/R read as pressed (0.0 to 1.0).
    #[serde(default = "default_trigger_threshold")]
    pub trigger_threshold: f32,

    /// Exponential smoothing of every axis.
    #[serde(default)]
    pub smoothing: bool,

    /// Smoothing factor (0.0 exclusive to 1.0).
    #[serde(default = "default_smooth_factor")]
    pub smooth_factor: f32,

    /// Start polling as soon as the engine is constructed.
    #[serde(default = "default_auto_start")]
    pub auto_start: bool,
}

fn default_deadzone() -> f32 { 0.15 }
fn default_trigger_threshold() -> f32 { 0.5 }
fn default_smooth_factor() -> f32 { 0.5 }
fn default_auto_start() -> bool { true }

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() { value } else { fallback }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            deadzone: default_deadzone(),
            trigger_threshold: default_trigger_threshold(),
            smoothing: false,
            smooth_factor: default_smooth_factor(),
            auto_start: default_auto_start(),
        }
    }
}

impl EngineOptions {
    /// Brings every value into its valid range.
    ///
    /// Non-finite values fall back to their defaults.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            deadzone: finite_or(self.deadzone, default_deadzone()).clamp(0.0, 1.0),
            trigger_threshold: finite_or(self.trigger_threshold, default_trigger_threshold()).clamp(0.0, 1.0),
            smooth_factor: finite_or(self.smooth_factor, default_smooth_factor()).clamp(MIN_SMOOTH_FACTOR, 1.0),
            ..self
        }
    }

    /// Axis calibration described by these options.
    #[must_use]
    pub fn calibration(&self) -> Calibration {
        let calibration = Calibration::new(self.deadzone);
        if self.smoothing {
            calibration.with_smoothing(self.smooth_factor)
        } else {
            calibration
        }
    }
}
