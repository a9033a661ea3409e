//! # Input Source Module
//!
//! Boundary between the engine and the host platform's raw input facility.
//!
//! The engine never talks to hardware itself. Once per tick it drains
//! connect/disconnect notifications and then pulls one [`RawFrame`] per
//! connected device from an [`InputSource`].
//!
//! This module handles:
//! - The [`InputSource`] trait the engine consumes
//! - Raw frame and device notification types
//! - Linux evdev implementation ([`linux::EvdevSource`])

pub mod linux;

use crate::error::Result;

/// Identity of a newly connected device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Stable per-device index; becomes the engine port.
    pub index: usize,
    /// Opaque device id used for adapter identification.
    pub id: String,
    /// The device reports the platform's standard gamepad layout.
    pub standard_layout: bool,
    /// The device has a rumble actuator.
    pub rumble: bool,
}

/// Connect or disconnect notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    Connected(DeviceInfo),
    Disconnected { index: usize },
}

/// One polled reading of a device's raw inputs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawFrame {
    pub index: usize,
    pub id: String,
    /// Pressed flag per raw button index.
    pub buttons: Vec<bool>,
    /// Value per raw axis index, nominally -1.0 to 1.0.
    pub axes: Vec<f32>,
    /// The device has a rumble actuator.
    pub rumble: bool,
}

/// Dual-motor rumble request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RumbleEffect {
    pub duration_ms: u32,
    /// High-frequency motor, 0.0 to 1.0.
    pub weak_magnitude: f32,
    /// Low-frequency motor, 0.0 to 1.0.
    pub strong_magnitude: f32,
}

impl Default for RumbleEffect {
    fn default() -> Self {
        Self {
            duration_ms: 200,
            weak_magnitude: 0.5,
            strong_magnitude: 0.8,
        }
    }
}

/// Host facility that supplies raw device input.
#[cfg_attr(test, mockall::automock)]
pub trait InputSource {
    /// Drains connect/disconnect notifications since the last call.
    fn poll_connections(&mut self) -> Vec<ConnectionEvent>;

    /// Reads the current raw frame of every connected device.
    fn enumerate(&mut self) -> Vec<RawFrame>;

    /// Plays a rumble effect on the device at `index`.
    fn vibrate(&mut self, index: usize, effect: RumbleEffect) -> Result<()>;
}
