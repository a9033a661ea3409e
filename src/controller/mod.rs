//! # Controller Module
//!
//! Adapter-independent GameCube controller model.
//!
//! This module handles:
//! - The fixed logical vocabulary of 12 buttons and 6 axes
//! - Identifying adapters from their device id
//! - Per-family raw index tables
//! - Axis calibration (deadzone, trigger remap, smoothing)
//! - Normalized controller state and stick geometry

pub mod adapters;
pub mod buttons;
pub mod calibration;
pub mod mapping;
pub mod state;
