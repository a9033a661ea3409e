//! # Error Types
//!
//! Custom error types for GC Input using `thiserror`.
//!
//! The normalization core itself never fails: unknown adapters, short raw
//! frames and missing rumble support all degrade instead. These errors come
//! from the edges (configuration, device I/O, telemetry output).

use thiserror::Error;

/// Main error type for GC Input
#[derive(Debug, Error)]
pub enum GcInputError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input device errors (open, read, force feedback upload)
    #[error("Device error: {0}")]
    Device(String),

    /// The device at this index has no rumble actuator
    #[error("Device {0} does not support rumble")]
    RumbleUnsupported(usize),

    /// Event telemetry serialization errors
    #[error("Telemetry error: {0}")]
    Telemetry(#[from] serde_json::Error),
}

/// Result type alias for GC Input
pub type Result<T> = std::result::Result<T, GcInputError>;
