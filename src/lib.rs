//! # GC Input Library
//!
//! Normalizes heterogeneous GameCube controller adapters into one logical
//! controller model.
//!
//! Adapters from different vendors report the same physical controller with
//! different raw button and axis layouts. This library identifies the adapter,
//! translates its raw frames into logical GameCube inputs, calibrates the
//! analog axes and publishes connect, disconnect, press, release and poll
//! events to subscribers.

pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod source;
pub mod telemetry;
