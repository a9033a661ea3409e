//! # Telemetry Module
//!
//! Records engine events to JSONL (JSON Lines) files.
//!
//! This module handles:
//! - Formatting events as one JSON object per line
//! - Stamping each record with an RFC 3339 timestamp
//! - Skipping high-rate `poll` events unless asked for
//!
//! ## Record Format
//!
//! ```text
//! {"button":"A","event":"press","port":0,"timestamp":"2024-05-01T12:00:00.000Z"}
//! ```

pub mod recorder;

pub use recorder::EventRecorder;
