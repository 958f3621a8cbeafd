//! Frame scheduling for coalesced flushes.
//!
//! Synchronizers never flush on their own.  A mutation asks the
//! [`FrameScheduler`] for one frame; the host answers on its next frame
//! (animation callback, timer, explicit tick) by calling `flush`.
//!
//! ```text
//!  set_state ─┐
//!  set_state ─┼──▶ request_flush ──▶ schedule_frame()  (at most once
//!  replace   ─┘        │                                until flushed)
//!                      ▼
//!               host frame tick ──▶ StateSynchronizer::flush(sink)
//! ```

use core::cell::Cell;

/// Single-shot frame request.  Implementations must tolerate being
/// asked again before the previous frame ran.
pub trait FrameScheduler {
    fn schedule_frame(&self);
}

/// Explicit-tick scheduler: records requests, the host polls
/// [`take_frame`](Self::take_frame) once per tick.
#[derive(Debug, Default)]
pub struct ManualFrameScheduler {
    pending: Cell<bool>,
    requests: Cell<usize>,
}

impl ManualFrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the outstanding frame request, if any.
    pub fn take_frame(&self) -> bool {
        self.pending.replace(false)
    }

    /// Total requests received since creation.
    pub fn requests(&self) -> usize {
        self.requests.get()
    }
}

impl FrameScheduler for ManualFrameScheduler {
    fn schedule_frame(&self) {
        self.pending.set(true);
        self.requests.set(self.requests.get() + 1);
    }
}
