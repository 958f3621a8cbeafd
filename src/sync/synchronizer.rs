//! Minimal-delta synchronizer over a [`StateTracker`].
//!
//! Mutations update the tracker immediately and record what the remote
//! side must hear about.  [`StateSynchronizer::flush`] then sends:
//!
//! 1. at most one "set default" call, if the default changed, and
//! 2. one "set these indices" call per distinct current state among the
//!    pending indices.
//!
//! An index whose state returned to where it started this frame is not
//! sent.  After a default change, indices now at the default are covered
//! by the default call itself.

use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use log::debug;

use super::scheduler::FrameScheduler;
use super::tracker::StateTracker;

/// Destination of flushed deltas, usually one scene on the safe client.
#[allow(async_fn_in_trait)]
pub trait StateSink<S> {
    fn is_connected(&self) -> bool;

    /// Called once per flush with every state about to be sent, before
    /// any send.  Sinks that need remote resources per state create them
    /// here in one go.
    async fn prepare(&mut self, _states: &[S]) {}

    /// Apply `state` to every element.
    async fn send_default(&mut self, state: S);

    /// Apply `state` to the given elements.
    async fn send_states(&mut self, indices: &[u32], state: S);
}

/// What one flush transmitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlushReport {
    pub default_sent: bool,
    /// Number of per-index calls.
    pub groups: usize,
    /// Indices covered by per-index calls.
    pub indices: usize,
    /// Set when the sink was disconnected and everything was dropped.
    pub dropped: bool,
}

pub struct StateSynchronizer<S> {
    tracker: StateTracker<S>,
    /// Default at creation; what a freshly connected server assumes.
    initial: S,
    /// Pending index → effective state when first touched this frame.
    pending: BTreeMap<u32, S>,
    default_changed: bool,
    flush_requested: bool,
    scheduler: Rc<dyn FrameScheduler>,
}

impl<S: Copy + PartialEq> StateSynchronizer<S> {
    pub fn new(initial: S, scheduler: Rc<dyn FrameScheduler>) -> Self {
        Self {
            tracker: StateTracker::new(initial),
            initial,
            pending: BTreeMap::new(),
            default_changed: false,
            flush_requested: false,
            scheduler,
        }
    }

    pub fn tracker(&self) -> &StateTracker<S> {
        &self.tracker
    }

    pub fn state(&self, index: u32) -> S {
        self.tracker.state(index)
    }

    pub fn default_state(&self) -> S {
        self.tracker.default_state()
    }

    /// Whether a flush would send anything.
    pub fn needs_flush(&self) -> bool {
        self.default_changed || !self.pending.is_empty()
    }

    fn request_flush(&mut self) {
        if !self.flush_requested {
            self.flush_requested = true;
            self.scheduler.schedule_frame();
        }
    }

    fn touch(&mut self, index: u32, before: S) {
        self.pending.entry(index).or_insert(before);
    }

    pub fn set_state(&mut self, index: u32, state: S) {
        let before = self.tracker.set(index, state);
        self.touch(index, before);
        self.request_flush();
    }

    pub fn set_states(&mut self, indices: &[u32], state: S) {
        for &index in indices {
            let before = self.tracker.set(index, state);
            self.touch(index, before);
        }
        if !indices.is_empty() {
            self.request_flush();
        }
    }

    /// Replace the default and discard every override.  Pending
    /// per-element updates are superseded.
    pub fn set_state_for_all(&mut self, state: S) {
        self.tracker.set_all(state);
        self.pending.clear();
        self.default_changed = true;
        self.request_flush();
    }

    /// Rewrite everything in one of `from` to `to`.
    pub fn replace_state(&mut self, from: &[S], to: S) {
        let previous_default = self.tracker.default_state();
        let before: HashMap<u32, S> = self.tracker.overrides().collect();
        let replaced = self.tracker.replace(from, to);

        if replaced.default_replaced {
            self.default_changed = true;
            // The remote default call resets every element, so surviving
            // overrides must be re-sent.
            for (index, state) in before {
                self.touch(index, state);
            }
        } else {
            for index in replaced.touched {
                let state = before.get(&index).copied().unwrap_or(previous_default);
                self.touch(index, state);
            }
        }

        if self.needs_flush() {
            self.request_flush();
        }
    }

    /// Queue everything that differs from a freshly initialised tracker.
    /// Used after a reconnect, when the server has forgotten all state.
    pub fn reapply_states(&mut self) {
        self.pending = self
            .tracker
            .overrides()
            .map(|(index, _)| (index, self.initial))
            .collect();
        self.default_changed = self.tracker.default_state() != self.initial;
        if self.needs_flush() {
            self.request_flush();
        }
    }

    /// Send the pending delta.  Dropped entirely when the sink is not
    /// connected; [`reapply_states`](Self::reapply_states) recovers.
    pub async fn flush(&mut self, sink: &mut impl StateSink<S>) -> FlushReport {
        self.flush_requested = false;
        let pending = core::mem::take(&mut self.pending);
        let default_changed = core::mem::replace(&mut self.default_changed, false);

        let mut report = FlushReport::default();
        if pending.is_empty() && !default_changed {
            return report;
        }
        if !sink.is_connected() {
            debug!(
                "flush dropped: not connected ({} pending, default changed: {default_changed})",
                pending.len()
            );
            report.dropped = true;
            return report;
        }

        let default = self.tracker.default_state();
        let mut groups: Vec<(S, Vec<u32>)> = Vec::new();
        for (index, first_touch) in pending {
            let now = self.tracker.state(index);
            let unchanged = if default_changed {
                now == default
            } else {
                now == first_touch
            };
            if unchanged {
                continue;
            }
            match groups.iter_mut().find(|(s, _)| *s == now) {
                Some((_, indices)) => indices.push(index),
                None => groups.push((now, vec![index])),
            }
        }

        let mut states: Vec<S> = groups.iter().map(|(s, _)| *s).collect();
        if default_changed && !states.contains(&default) {
            states.insert(0, default);
        }
        if !states.is_empty() {
            sink.prepare(&states).await;
        }

        if default_changed {
            sink.send_default(default).await;
            report.default_sent = true;
        }
        for (state, indices) in &groups {
            sink.send_states(indices, *state).await;
            report.indices += indices.len();
        }
        report.groups = groups.len();

        debug!(
            "flush: default {}, {} groups, {} indices",
            report.default_sent, report.groups, report.indices
        );
        report
    }
}

// ── Tests ────────────────────────────────────────────────────
