//! Cancellable tick requests.
//!
//! The engine never owns a timer. It asks for "the next tick" and the host
//! loop fires whatever request is pending. Cancelling drops the request, and
//! a handle that is no longer pending is ignored when fired.

/// One requested tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(u64);

#[derive(Debug, Default)]
pub(crate) struct TickScheduler {
    next: u64,
    pending: Option<TickHandle>,
}

impl TickScheduler {
    /// Replaces any pending request with a fresh one.
    pub(crate) fn request(&mut self) -> TickHandle {
        let handle = TickHandle(self.next);
        self.next = self.next.wrapping_add(1);
        self.pending = Some(handle);
        handle
    }

    pub(crate) fn cancel(&mut self) {
        self.pending = None;
    }

    pub(crate) fn pending(&self) -> Option<TickHandle> {
        self.pending
    }

    /// Consumes `handle` if it is the pending request.
    pub(crate) fn take(&mut self, handle: TickHandle) -> bool {
        if self.pending == Some(handle) {
            self.pending = None;
            true
        } else {
            false
        }
    }
}
