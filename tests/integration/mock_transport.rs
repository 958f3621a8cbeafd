//! Scripted in-memory transport for integration tests.
//!
//! Records every outbound frame and answers requests from per-operation
//! reply queues, so tests can assert on the exact wire traffic without a
//! real server.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};

use ultra_client::rpc::marshal::{Marshal, ReadCursor, WireEncode};
use ultra_client::rpc::transport::Transport;

/// Encode a single reply value.
pub fn encode<T: WireEncode + ?Sized>(value: &T) -> Vec<u8> {
    let mut m = Marshal::new();
    m.write(value);
    m.into_bytes()
}

// ── Call record ───────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Call {
    pub op: String,
    pub frame: Vec<u8>,
}

impl Call {
    /// Cursor positioned at the first argument.
    pub fn args(&self) -> ReadCursor<'_> {
        let mut c = ReadCursor::new(&self.frame);
        c.read_string().unwrap();
        c
    }
}

// ── MockTransport ─────────────────────────────────────────────

pub struct MockTransport {
    connected: Cell<bool>,
    calls: RefCell<Vec<Call>>,
    queued: RefCell<HashMap<String, VecDeque<Vec<u8>>>>,
    sticky: RefCell<HashMap<String, Vec<u8>>>,
    yielding: Cell<bool>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Self {
        Self {
            connected: Cell::new(true),
            calls: RefCell::new(Vec::new()),
            queued: RefCell::new(HashMap::new()),
            sticky: RefCell::new(HashMap::new()),
            yielding: Cell::new(false),
        }
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.set(connected);
    }

    /// Yield once inside every request so other futures on the same
    /// executor run while the reply is "in flight".
    pub fn set_yielding(&self, yielding: bool) {
        self.yielding.set(yielding);
    }

    /// Queue one reply for the next request to `op`.
    pub fn reply<T: WireEncode + ?Sized>(&self, op: &str, value: &T) {
        self.queued
            .borrow_mut()
            .entry(op.to_owned())
            .or_default()
            .push_back(encode(value));
    }

    /// Answer every request to `op` with `value` once its queue is empty.
    pub fn reply_always<T: WireEncode + ?Sized>(&self, op: &str, value: &T) {
        self.sticky.borrow_mut().insert(op.to_owned(), encode(value));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn calls_to(&self, op: &str) -> Vec<Call> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.op == op)
            .cloned()
            .collect()
    }

    pub fn ops(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|c| c.op.clone()).collect()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    fn record(&self, frame: Vec<u8>) -> String {
        let op = ReadCursor::new(&frame).read_string().unwrap();
        self.calls.borrow_mut().push(Call {
            op: op.clone(),
            frame,
        });
        op
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MockTransport {
    fn is_connected(&self) -> bool {
        self.connected.get()
    }

    fn send(&self, frame: Vec<u8>) -> anyhow::Result<()> {
        if !self.connected.get() {
            anyhow::bail!("mock: not connected");
        }
        self.record(frame);
        Ok(())
    }

    async fn request(&self, frame: Vec<u8>) -> anyhow::Result<Vec<u8>> {
        if !self.connected.get() {
            anyhow::bail!("mock: not connected");
        }
        let op = self.record(frame);
        if self.yielding.get() {
            futures_lite::future::yield_now().await;
        }
        if let Some(reply) = self
            .queued
            .borrow_mut()
            .get_mut(&op)
            .and_then(VecDeque::pop_front)
        {
            return Ok(reply);
        }
        match self.sticky.borrow().get(&op) {
            Some(reply) => Ok(reply.clone()),
            None => anyhow::bail!("mock: no reply scripted for {op}"),
        }
    }
}
