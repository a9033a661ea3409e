//! # Engine Module
//!
//! The normalization and polling engine.
//!
//! The engine owns one [`Slot`] per connected port. On every tick it:
//!
//! 1. Drains connect/disconnect notifications from the [`InputSource`]
//! 2. Reads one raw frame per connected device
//! 3. Translates raw buttons and axes through the adapter's mapping family
//! 4. Calibrates axes and synthesizes digital L/R from the analog triggers
//! 5. Emits `press`/`release` on button edges, then one `poll` per port
//!
//! ## Ticks
//!
//! The engine does not own a timer. [`Engine::start_polling`] requests a
//! tick, the host fires it with [`Engine::on_tick`], and every tick requests
//! the next one before doing its work. [`Engine::stop_polling`] cancels the
//! pending request. [`driver::run_until`] is a ready-made tokio host loop.
//!
//! ## Usage
//!
//! ```no_run
//! use gc_input::controller::buttons::LogicalButton;
//! use gc_input::engine::{Engine, EngineOptions};
//! use gc_input::engine::events::EventKind;
//! use gc_input::source::linux::EvdevSource;
//! use std::time::Duration;
//!
//! let source = EvdevSource::new("/dev/input", Duration::from_secs(1));
//! let mut engine = Engine::new(source, EngineOptions::default());
//!
//! engine.on(EventKind::Press, |event| {
//!     println!("{:?}", event);
//!     Ok(())
//! });
//!
//! while let Some(tick) = engine.pending_tick() {
//!     engine.on_tick(tick);
//!     if engine.just_pressed(LogicalButton::Start, None) {
//!         break;
//!     }
//! }
//! ```

pub mod driver;
pub mod events;
mod options;
mod tick;

pub use options::EngineOptions;
pub use tick::TickHandle;

use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::controller::adapters::{identify_or_fallback, AdapterSignature};
use crate::controller::buttons::{LogicalAxis, LogicalButton};
use crate::controller::calibration::Calibration;
use crate::controller::mapping::{resolve, MappingFamily};
use crate::controller::state::ControllerState;
use crate::source::{ConnectionEvent, DeviceInfo, InputSource, RawFrame, RumbleEffect};
use events::{Event, EventBus, EventKind, Subscription, SubscriptionId};
use tick::TickScheduler;

/// Analog axis that drives each digital shoulder button.
const TRIGGER_PAIRS: [(LogicalButton, LogicalAxis); 2] = [
    (LogicalButton::L, LogicalAxis::LAnalog),
    (LogicalButton::R, LogicalAxis::RAnalog),
];

/// Per-port record of an identified device.
#[derive(Debug, Clone)]
pub struct Slot {
    adapter: &'static AdapterSignature,
    mapping: &'static MappingFamily,
    current: ControllerState,
    previous: ControllerState,
    raw_id: String,
    rumble: bool,
}

impl Slot {
    fn new(adapter: &'static AdapterSignature, mapping: &'static MappingFamily, raw_id: String, rumble: bool) -> Self {
        Self {
            adapter,
            mapping,
            current: ControllerState::with_connected(true),
            previous: ControllerState::with_connected(true),
            raw_id,
            rumble,
        }
    }

    #[must_use]
    pub fn adapter(&self) -> &'static AdapterSignature {
        self.adapter
    }

    #[must_use]
    pub fn mapping(&self) -> &'static MappingFamily {
        self.mapping
    }

    #[must_use]
    pub fn current(&self) -> &ControllerState {
        &self.current
    }

    #[must_use]
    pub fn previous(&self) -> &ControllerState {
        &self.previous
    }

    #[must_use]
    pub fn raw_id(&self) -> &str {
        &self.raw_id
    }

    /// Refreshes `current` from one raw frame.
    ///
    /// Raw indices the frame does not have leave the logical input unchanged.
    fn read(&mut self, frame: &RawFrame, calibration: &Calibration, trigger_threshold: f32) {
        self.previous = self.current;
        self.rumble = frame.rumble;

        for button in LogicalButton::ALL {
            if let Some(&pressed) = frame.buttons.get(self.mapping.button_index(button)) {
                self.current.set_button(button, pressed);
            }
        }

        for axis in LogicalAxis::ALL {
            let rule = self.mapping.axis_rule(axis);
            if let Some(&raw) = frame.axes.get(rule.raw_index) {
                let value = calibration.apply(rule, raw, self.previous.axis(axis));
                self.current.set_axis(axis, value);
            }
        }

        for (button, axis) in TRIGGER_PAIRS {
            if !self.current.is_pressed(button) && self.current.axis(axis) >= trigger_threshold {
                self.current.set_button(button, true);
            }
        }
    }

    /// Press and release events for every button that changed this tick.
    fn edges(&self, port: usize) -> Vec<Event> {
        LogicalButton::ALL
            .into_iter()
            .filter_map(|button| {
                match (self.previous.is_pressed(button), self.current.is_pressed(button)) {
                    (false, true) => Some(Event::Press { port, button }),
                    (true, false) => Some(Event::Release { port, button }),
                    _ => None,
                }
            })
            .collect()
    }
}

/// State of one connected port, as returned by [`Engine::all_states`].
#[derive(Debug, Clone, PartialEq)]
pub struct PortState {
    pub port: usize,
    pub adapter_name: &'static str,
    pub state: ControllerState,
}

/// Identity of one connected port, as returned by [`Engine::controllers`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerInfo {
    pub port: usize,
    pub adapter_name: &'static str,
    pub raw_id: String,
}

/// Normalization and polling engine over an [`InputSource`].
pub struct Engine<S: InputSource> {
    source: S,
    options: EngineOptions,
    calibration: Calibration,
    slots: BTreeMap<usize, Slot>,
    bus: EventBus,
    scheduler: TickScheduler,
    polling: bool,
    destroyed: bool,
}

impl<S: InputSource> Engine<S> {
    /// Creates an engine and picks up devices that are already connected.
    ///
    /// Options are clamped into their valid ranges. Polling starts right
    /// away when `options.auto_start` is set.
    pub fn new(source: S, options: EngineOptions) -> Self {
        let options = options.clamped();
        let mut engine = Self {
            source,
            options,
            calibration: options.calibration(),
            slots: BTreeMap::new(),
            bus: EventBus::new(),
            scheduler: TickScheduler::default(),
            polling: false,
            destroyed: false,
        };

        engine.drain_connections();
        if options.auto_start {
            engine.start_polling();
        }
        engine
    }

    // ==================== Connections ====================

    fn drain_connections(&mut self) {
        for notice in self.source.poll_connections() {
            match notice {
                ConnectionEvent::Connected(info) => self.handle_connect(&info),
                ConnectionEvent::Disconnected { index } => self.handle_disconnect(index),
            }
        }
    }

    fn handle_connect(&mut self, info: &DeviceInfo) {
        let adapter = identify_or_fallback(&info.id, info.standard_layout);
        let mapping = resolve(adapter.mapping);

        info!(
            "Controller connected on port {}: {} ({} mapping, id \"{}\")",
            info.index, adapter.name, mapping.kind, info.id
        );

        self.slots
            .insert(info.index, Slot::new(adapter, mapping, info.id.clone(), info.rumble));
        self.bus.emit(&Event::Connect {
            port: info.index,
            adapter_name: adapter.name,
            raw_id: info.id.clone(),
        });
    }

    fn handle_disconnect(&mut self, port: usize) {
        let Some(mut slot) = self.slots.remove(&port) else {
            debug!("Disconnect for empty port {} ignored", port);
            return;
        };
        slot.current.set_connected(false);

        info!("Controller disconnected from port {}: {}", port, slot.adapter.name);
        self.bus.emit(&Event::Disconnect {
            port,
            adapter_name: slot.adapter.name,
            state: slot.current,
        });
    }

    // ==================== Polling ====================

    /// Starts polling. Does nothing if already polling or destroyed.
    pub fn start_polling(&mut self) {
        if self.destroyed || self.polling {
            return;
        }
        self.polling = true;
        self.scheduler.request();
        debug!("Polling started");
    }

    /// Stops polling and cancels the pending tick. Repeated calls are no-ops.
    pub fn stop_polling(&mut self) {
        if !self.polling {
            return;
        }
        self.polling = false;
        self.scheduler.cancel();
        debug!("Polling stopped");
    }

    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.polling
    }

    /// The tick the engine is waiting for, if any.
    #[must_use]
    pub fn pending_tick(&self) -> Option<TickHandle> {
        self.scheduler.pending()
    }

    /// Runs one tick if `handle` is the pending request.
    ///
    /// Stale or cancelled handles are ignored. Returns whether the tick ran.
    pub fn on_tick(&mut self, handle: TickHandle) -> bool {
        if self.destroyed || !self.scheduler.take(handle) {
            return false;
        }
        self.scheduler.request();
        self.tick();
        true
    }

    fn tick(&mut self) {
        self.drain_connections();

        for frame in self.source.enumerate() {
            let Some(slot) = self.slots.get_mut(&frame.index) else {
                continue;
            };
            slot.read(&frame, &self.calibration, self.options.trigger_threshold);

            let edges = slot.edges(frame.index);
            let state = slot.current;

            for edge in &edges {
                debug!("Port {}: {:?}", frame.index, edge);
                self.bus.emit(edge);
            }
            self.bus.emit(&Event::Poll {
                port: frame.index,
                state,
            });
        }
    }

    // ==================== State Queries ====================

    /// `port` itself, or the lowest connected port when `None`.
    fn resolve_port(&self, port: Option<usize>) -> Option<usize> {
        port.or_else(|| self.slots.keys().next().copied())
    }

    fn slot(&self, port: Option<usize>) -> Option<&Slot> {
        self.resolve_port(port).and_then(|port| self.slots.get(&port))
    }

    /// Current state of `port`, or of the lowest connected port when `None`.
    #[must_use]
    pub fn state(&self, port: Option<usize>) -> Option<&ControllerState> {
        self.slot(port).map(|slot| &slot.current)
    }

    /// Slot of `port`, or of the lowest connected port when `None`.
    #[must_use]
    pub fn slot_info(&self, port: Option<usize>) -> Option<&Slot> {
        self.slot(port)
    }

    /// Copies of every connected port's state, in port order.
    #[must_use]
    pub fn all_states(&self) -> Vec<PortState> {
        self.slots
            .iter()
            .map(|(&port, slot)| PortState {
                port,
                adapter_name: slot.adapter.name,
                state: slot.current,
            })
            .collect()
    }

    /// Whether `button` went down on the last tick.
    #[must_use]
    pub fn just_pressed(&self, button: LogicalButton, port: Option<usize>) -> bool {
        self.slot(port)
            .is_some_and(|slot| slot.current.is_pressed(button) && !slot.previous.is_pressed(button))
    }

    /// Whether `button` went up on the last tick.
    #[must_use]
    pub fn just_released(&self, button: LogicalButton, port: Option<usize>) -> bool {
        self.slot(port)
            .is_some_and(|slot| !slot.current.is_pressed(button) && slot.previous.is_pressed(button))
    }

    #[must_use]
    pub fn is_held(&self, button: LogicalButton, port: Option<usize>) -> bool {
        self.slot(port).is_some_and(|slot| slot.current.is_pressed(button))
    }

    #[must_use]
    pub fn connected_count(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn controllers(&self) -> Vec<ControllerInfo> {
        self.slots
            .iter()
            .map(|(&port, slot)| ControllerInfo {
                port,
                adapter_name: slot.adapter.name,
                raw_id: slot.raw_id.clone(),
            })
            .collect()
    }

    // ==================== Settings ====================

    /// Sets the stick deadzone, clamped to 0.0..=1.0. Non-finite values are ignored.
    pub fn set_deadzone(&mut self, deadzone: f32) {
        if !deadzone.is_finite() {
            warn!("Ignoring non-finite deadzone {}", deadzone);
            return;
        }
        self.options.deadzone = deadzone.clamp(0.0, 1.0);
        self.calibration = self.options.calibration();
    }

    /// Sets the analog level at which L/R read as pressed, clamped to 0.0..=1.0.
    /// Non-finite values are ignored.
    pub fn set_trigger_threshold(&mut self, threshold: f32) {
        if !threshold.is_finite() {
            warn!("Ignoring non-finite trigger threshold {}", threshold);
            return;
        }
        self.options.trigger_threshold = threshold.clamp(0.0, 1.0);
    }

    /// Turns smoothing on or off, optionally changing the factor.
    /// A non-finite factor is ignored.
    pub fn set_smoothing(&mut self, enabled: bool, factor: Option<f32>) {
        self.options.smoothing = enabled;
        match factor {
            Some(factor) if factor.is_finite() => self.options.smooth_factor = factor,
            Some(factor) => warn!("Ignoring non-finite smoothing factor {}", factor),
            None => {}
        }
        self.options = self.options.clamped();
        self.calibration = self.options.calibration();
    }

    /// Copy of the live options.
    #[must_use]
    pub fn options(&self) -> EngineOptions {
        self.options
    }

    // ==================== Events ====================

    /// Subscribes `handler` to events of `kind`.
    pub fn on<F>(&self, kind: EventKind, handler: F) -> Subscription
    where
        F: FnMut(&Event) -> anyhow::Result<()> + 'static,
    {
        self.bus.subscribe(kind, handler)
    }

    /// Removes a subscription made with [`on`](Self::on) or [`once`](Self::once).
    pub fn off(&self, kind: EventKind, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(kind, id)
    }

    /// Subscribes `handler` to the next event of `kind` only.
    pub fn once<F>(&self, kind: EventKind, handler: F) -> Subscription
    where
        F: FnMut(&Event) -> anyhow::Result<()> + 'static,
    {
        self.bus.once(kind, handler)
    }

    /// Handle to the engine's event bus.
    #[must_use]
    pub fn events(&self) -> EventBus {
        self.bus.clone()
    }

    // ==================== Rumble ====================

    /// Plays `effect` on `port` (lowest connected port when `None`).
    ///
    /// Best effort: ports without a rumble actuator and rejected requests
    /// are skipped. Returns whether the request was accepted.
    pub fn vibrate(&mut self, port: Option<usize>, effect: RumbleEffect) -> bool {
        if self.destroyed {
            return false;
        }
        let Some(port) = self.resolve_port(port) else {
            return false;
        };
        let Some(slot) = self.slots.get(&port) else {
            return false;
        };

        if !slot.rumble {
            debug!("Port {} has no rumble support", port);
            return false;
        }

        match self.source.vibrate(port, effect) {
            Ok(()) => true,
            Err(e) => {
                debug!("Rumble on port {} rejected: {}", port, e);
                false
            }
        }
    }

    // ==================== Lifecycle ====================

    /// Stops polling and releases every subscription and slot.
    ///
    /// Afterwards ticks are ignored and no events are emitted.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.stop_polling();
        self.bus.clear();
        self.slots.clear();
        self.destroyed = true;
        info!("Engine destroyed");
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}
