//! # Linux evdev Input Source
//!
//! Reads GameCube adapters (and any other joystick-class device) through the
//! Linux evdev interface.
//!
//! ## Device Detection
//!
//! `/dev/input/event*` nodes are rescanned at most once per rescan interval.
//! A node is treated as a controller when it exposes at least one key in the
//! joystick/gamepad range (`BTN_JOYSTICK` to `BTN_THUMBR`) and at least one
//! absolute axis. Every other node is remembered and skipped until it
//! disappears.
//!
//! ## Raw Layout
//!
//! - Device id: `"{vendor:04x}-{product:04x} {name}"`, e.g.
//!   `0079-1844 Mayflash GameCube`
//! - Raw buttons: every supported key from `BTN_MISC` up, in key code order
//! - Raw axes: every supported absolute axis in axis code order, scaled to
//!   -1.0..=1.0 from the kernel's reported min/max
//! - Standard layout: the device exposes `BTN_SOUTH`
//!
//! A device that fails to read is dropped and reported as disconnected on
//! the next [`InputSource::poll_connections`] call.

use evdev::{
    AbsoluteAxisType, Device, FFEffect, FFEffectData, FFEffectKind, FFEffectType, FFReplay,
    FFTrigger, Key,
};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{ConnectionEvent, DeviceInfo, InputSource, RawFrame, RumbleEffect};
use crate::config::SourceConfig;
use crate::error::{GcInputError, Result};

/// First key code reported as a raw button.
const BTN_MISC: u16 = 0x100;

/// Key codes that mark a device as a joystick or gamepad.
const JOYSTICK_KEYS: std::ops::RangeInclusive<u16> = 0x120..=0x13e;

/// An opened controller node.
struct OpenDevice {
    path: PathBuf,
    device: Device,
    id: String,
    standard_layout: bool,
    keys: Vec<Key>,
    axes: Vec<AbsoluteAxisType>,
    rumble: bool,
    /// Last uploaded rumble effect; dropping it erases it from the device.
    effect: Option<FFEffect>,
}

impl OpenDevice {
    /// Returns `None` when the node is not a controller.
    fn probe(path: PathBuf, device: Device) -> Option<Self> {
        let keys: Vec<Key> = device
            .supported_keys()?
            .iter()
            .filter(|key| key.code() >= BTN_MISC)
            .collect();
        if !keys.iter().any(|key| JOYSTICK_KEYS.contains(&key.code())) {
            return None;
        }

        let axes: Vec<AbsoluteAxisType> = device.supported_absolute_axes()?.iter().collect();
        if axes.is_empty() {
            return None;
        }

        let input_id = device.input_id();
        let id = format!(
            "{:04x}-{:04x} {}",
            input_id.vendor(),
            input_id.product(),
            device.name().unwrap_or("Unknown Device")
        );
        let standard_layout = keys.contains(&Key::BTN_SOUTH);
        let rumble = device
            .supported_ff()
            .map_or(false, |ff| ff.contains(FFEffectType::FF_RUMBLE));

        Some(Self {
            path,
            device,
            id,
            standard_layout,
            keys,
            axes,
            rumble,
            effect: None,
        })
    }

    fn read_frame(&self, index: usize) -> io::Result<RawFrame> {
        let key_state = self.device.get_key_state()?;
        let abs_state = self.device.get_abs_state()?;

        let buttons = self.keys.iter().map(|key| key_state.contains(*key)).collect();
        let axes = self
            .axes
            .iter()
            .map(|axis| {
                let info = &abs_state[axis.0 as usize];
                scale_axis(info.value, info.minimum, info.maximum)
            })
            .collect();

        Ok(RawFrame {
            index,
            id: self.id.clone(),
            buttons,
            axes,
            rumble: self.rumble,
        })
    }
}

/// evdev-backed [`InputSource`].
pub struct EvdevSource {
    input_dir: PathBuf,
    rescan_interval: Duration,
    last_scan: Option<Instant>,
    devices: BTreeMap<usize, OpenDevice>,
    /// Nodes probed and found not to be controllers.
    ignored: HashSet<PathBuf>,
    pending: Vec<ConnectionEvent>,
}

impl std::fmt::Debug for EvdevSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvdevSource")
            .field("input_dir", &self.input_dir)
            .field("devices", &self.devices.len())
            .finish_non_exhaustive()
    }
}

impl EvdevSource {
    /// Creates a source scanning `input_dir` at most once per `rescan_interval`.
    ///
    /// No device is opened until the first [`InputSource::poll_connections`]
    /// call.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use gc_input::source::linux::EvdevSource;
    /// use gc_input::source::InputSource;
    /// use std::time::Duration;
    ///
    /// let mut source = EvdevSource::new("/dev/input", Duration::from_secs(1));
    /// for notice in source.poll_connections() {
    ///     println!("{:?}", notice);
    /// }
    /// ```
    pub fn new(input_dir: impl Into<PathBuf>, rescan_interval: Duration) -> Self {
        Self {
            input_dir: input_dir.into(),
            rescan_interval,
            last_scan: None,
            devices: BTreeMap::new(),
            ignored: HashSet::new(),
            pending: Vec::new(),
        }
    }

    pub fn from_config(config: &SourceConfig) -> Self {
        Self::new(
            &config.input_dir,
            Duration::from_millis(config.rescan_interval_ms),
        )
    }

    /// Number of controllers currently open.
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    fn rescan_due(&self) -> bool {
        self.last_scan
            .map_or(true, |at| at.elapsed() >= self.rescan_interval)
    }

    fn rescan(&mut self) {
        self.last_scan = Some(Instant::now());

        let entries = match fs::read_dir(&self.input_dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to read {}: {}", self.input_dir.display(), e);
                return;
            }
        };

        let mut present: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| is_event_node(path))
            .collect();
        // Deterministic index assignment when several adapters appear at once
        present.sort();

        let gone: Vec<usize> = self
            .devices
            .iter()
            .filter(|(_, open)| !present.contains(&open.path))
            .map(|(&index, _)| index)
            .collect();
        for index in gone {
            self.remove(index);
        }
        self.ignored.retain(|path| present.contains(path));

        for path in present {
            if self.ignored.contains(&path) || self.devices.values().any(|open| open.path == path) {
                continue;
            }

            match Device::open(&path) {
                Ok(device) => match OpenDevice::probe(path.clone(), device) {
                    Some(open) => self.add(open),
                    None => {
                        debug!("Skipping non-controller input device {}", path.display());
                        self.ignored.insert(path);
                    }
                },
                Err(e) => {
                    // Permission denied or node vanished - retry on next scan
                    debug!("Could not open {}: {}", path.display(), e);
                }
            }
        }
    }

    fn add(&mut self, open: OpenDevice) {
        let index = lowest_free_index(&self.devices);
        info!(
            "Found controller {} at {} (index {}, {} buttons, {} axes)",
            open.id,
            open.path.display(),
            index,
            open.keys.len(),
            open.axes.len()
        );
        self.pending.push(ConnectionEvent::Connected(DeviceInfo {
            index,
            id: open.id.clone(),
            standard_layout: open.standard_layout,
            rumble: open.rumble,
        }));
        self.devices.insert(index, open);
    }

    fn remove(&mut self, index: usize) {
        if let Some(open) = self.devices.remove(&index) {
            info!("Controller {} at {} removed", open.id, open.path.display());
            self.pending.push(ConnectionEvent::Disconnected { index });
        }
    }
}

impl InputSource for EvdevSource {
    fn poll_connections(&mut self) -> Vec<ConnectionEvent> {
        if self.rescan_due() {
            self.rescan();
        }
        std::mem::take(&mut self.pending)
    }

    fn enumerate(&mut self) -> Vec<RawFrame> {
        let mut frames = Vec::with_capacity(self.devices.len());
        let mut failed = Vec::new();

        for (&index, open) in &self.devices {
            match open.read_frame(index) {
                Ok(frame) => frames.push(frame),
                Err(e) => {
                    warn!("Failed to read {}: {}", open.path.display(), e);
                    failed.push(index);
                }
            }
        }

        for index in failed {
            self.remove(index);
        }
        frames
    }

    fn vibrate(&mut self, index: usize, effect: RumbleEffect) -> Result<()> {
        let open = self
            .devices
            .get_mut(&index)
            .ok_or_else(|| GcInputError::Device(format!("no controller at index {}", index)))?;
        if !open.rumble {
            return Err(GcInputError::RumbleUnsupported(index));
        }

        let data = FFEffectData {
            direction: 0,
            trigger: FFTrigger {
                button: 0,
                interval: 0,
            },
            replay: FFReplay {
                length: effect.duration_ms.min(u16::MAX as u32) as u16,
                delay: 0,
            },
            kind: FFEffectKind::Rumble {
                strong_magnitude: motor_magnitude(effect.strong_magnitude),
                weak_magnitude: motor_magnitude(effect.weak_magnitude),
            },
        };

        let mut uploaded = open.device.upload_ff_effect(data)?;
        uploaded.play(1)?;
        open.effect = Some(uploaded);
        Ok(())
    }
}

fn is_event_node(path: &Path) -> bool {
    path.file_name()
        .map_or(false, |name| name.to_string_lossy().starts_with("event"))
}

fn lowest_free_index<T>(devices: &BTreeMap<usize, T>) -> usize {
    (0..).find(|index| !devices.contains_key(index)).unwrap_or_default()
}

/// Scales a raw absolute axis value onto -1.0..=1.0.
///
/// Degenerate ranges (`max <= min`) read as centered.
fn scale_axis(value: i32, min: i32, max: i32) -> f32 {
    if max <= min {
        return 0.0;
    }
    let span = (max as f64) - (min as f64);
    let scaled = 2.0 * ((value as f64) - (min as f64)) / span - 1.0;
    scaled.clamp(-1.0, 1.0) as f32
}

/// Converts a 0.0..=1.0 motor strength to the kernel's 16-bit magnitude.
fn motor_magnitude(strength: f32) -> u16 {
    (strength.clamp(0.0, 1.0) * u16::MAX as f32).round() as u16
}
