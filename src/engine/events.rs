//! # Event Bus
//!
//! Synchronous publish/subscribe for engine events.
//!
//! Handlers run on the caller's stack, in subscription order. A handler that
//! returns an error or panics is logged and skipped; the remaining handlers
//! still receive the event.
//!
//! ## Usage
//!
//! ```
//! use gc_input::controller::buttons::LogicalButton;
//! use gc_input::engine::events::{Event, EventBus, EventKind};
//!
//! let bus = EventBus::new();
//! let subscription = bus.subscribe(EventKind::Press, |event| {
//!     println!("{:?}", event);
//!     Ok(())
//! });
//!
//! bus.emit(&Event::Press { port: 0, button: LogicalButton::A });
//! subscription.unsubscribe();
//! assert_eq!(bus.listener_count(EventKind::Press), 0);
//! ```

use serde::Serialize;
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};
use tracing::{debug, error};

use crate::controller::buttons::LogicalButton;
use crate::controller::state::ControllerState;

/// Something the engine reports to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum Event {
    /// A device was identified and a slot created for it.
    Connect {
        port: usize,
        adapter_name: &'static str,
        raw_id: String,
    },
    /// A slot was removed. `state` is its final state, already disconnected.
    Disconnect {
        port: usize,
        adapter_name: &'static str,
        state: ControllerState,
    },
    Press {
        port: usize,
        button: LogicalButton,
    },
    Release {
        port: usize,
        button: LogicalButton,
    },
    /// Full state of one port, once per tick.
    Poll {
        port: usize,
        state: ControllerState,
    },
}

impl Event {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Connect { .. } => EventKind::Connect,
            Event::Disconnect { .. } => EventKind::Disconnect,
            Event::Press { .. } => EventKind::Press,
            Event::Release { .. } => EventKind::Release,
            Event::Poll { .. } => EventKind::Poll,
        }
    }

    /// Port the event refers to.
    #[must_use]
    pub fn port(&self) -> usize {
        match self {
            Event::Connect { port, .. }
            | Event::Disconnect { port, .. }
            | Event::Press { port, .. }
            | Event::Release { port, .. }
            | Event::Poll { port, .. } => *port,
        }
    }
}

/// Event name used for subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Connect,
    Disconnect,
    Press,
    Release,
    Poll,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::Connect,
        EventKind::Disconnect,
        EventKind::Press,
        EventKind::Release,
        EventKind::Poll,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            EventKind::Connect => "connect",
            EventKind::Disconnect => "disconnect",
            EventKind::Press => "press",
            EventKind::Release => "release",
            EventKind::Poll => "poll",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one subscription on a bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Rc<RefCell<dyn FnMut(&Event) -> anyhow::Result<()>>>;

struct Entry {
    id: SubscriptionId,
    once: bool,
    handler: Handler,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: HashMap<EventKind, Vec<Entry>>,
}

impl Registry {
    fn add(&mut self, kind: EventKind, once: bool, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.entry(kind).or_default().push(Entry { id, once, handler });
        id
    }

    fn remove(&mut self, kind: EventKind, id: SubscriptionId) -> bool {
        let Some(entries) = self.handlers.get_mut(&kind) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        before != entries.len()
    }

    fn contains(&self, kind: EventKind, id: SubscriptionId) -> bool {
        self.handlers
            .get(&kind)
            .is_some_and(|entries| entries.iter().any(|entry| entry.id == id))
    }
}

/// Single-threaded event bus.
///
/// Clones share the same subscriptions, so a handler can hold a clone and
/// subscribe or unsubscribe while an event is being delivered.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Rc<RefCell<Registry>>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for every event of `kind`.
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> Subscription
    where
        F: FnMut(&Event) -> anyhow::Result<()> + 'static,
    {
        self.register(kind, false, handler)
    }

    /// Registers `handler` for the next event of `kind` only.
    ///
    /// The subscription is removed before the handler runs.
    pub fn once<F>(&self, kind: EventKind, handler: F) -> Subscription
    where
        F: FnMut(&Event) -> anyhow::Result<()> + 'static,
    {
        self.register(kind, true, handler)
    }

    fn register<F>(&self, kind: EventKind, once: bool, handler: F) -> Subscription
    where
        F: FnMut(&Event) -> anyhow::Result<()> + 'static,
    {
        let handler: Handler = Rc::new(RefCell::new(handler));
        let id = self.registry.borrow_mut().add(kind, once, handler);
        Subscription {
            registry: Rc::downgrade(&self.registry),
            kind,
            id,
        }
    }

    /// Removes a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, kind: EventKind, id: SubscriptionId) -> bool {
        self.registry.borrow_mut().remove(kind, id)
    }

    /// Delivers `event` to the handlers subscribed to its kind.
    ///
    /// The handler list is captured when delivery starts. Handlers added
    /// during delivery wait for the next event; handlers removed during
    /// delivery are skipped.
    pub fn emit(&self, event: &Event) {
        let kind = event.kind();
        let targets: Vec<(SubscriptionId, bool, Handler)> = match self.registry.borrow().handlers.get(&kind) {
            Some(entries) => entries
                .iter()
                .map(|entry| (entry.id, entry.once, Rc::clone(&entry.handler)))
                .collect(),
            None => return,
        };

        for (id, once, handler) in targets {
            if !self.registry.borrow().contains(kind, id) {
                continue;
            }
            if once {
                self.unsubscribe(kind, id);
            }

            // A handler that emits on this bus cannot receive its own event
            let Ok(mut handler) = handler.try_borrow_mut() else {
                debug!("Skipping re-entrant {} delivery to {:?}", kind, id);
                continue;
            };

            match panic::catch_unwind(AssertUnwindSafe(|| (&mut *handler)(event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!("{} handler failed: {:#}", kind, e),
                Err(payload) => error!("{} handler panicked: {}", kind, panic_message(payload.as_ref())),
            }
        }
    }

    /// Number of handlers currently subscribed to `kind`.
    #[must_use]
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.registry.borrow().handlers.get(&kind).map_or(0, Vec::len)
    }

    /// Drops every subscription.
    pub fn clear(&self) {
        self.registry.borrow_mut().handlers.clear();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

/// Handle returned by [`EventBus::subscribe`] and [`EventBus::once`].
///
/// Dropping it keeps the subscription alive; call
/// [`unsubscribe`](Subscription::unsubscribe) to remove it.
#[derive(Debug, Clone)]
pub struct Subscription {
    registry: Weak<RefCell<Registry>>,
    kind: EventKind,
    id: SubscriptionId,
}

impl Subscription {
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Removes the subscription. Returns `false` if it was already gone or
    /// the bus no longer exists.
    pub fn unsubscribe(self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => registry.borrow_mut().remove(self.kind, self.id),
            None => false,
        }
    }
}
