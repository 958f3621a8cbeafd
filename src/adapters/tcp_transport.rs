//! TCP transport adapter.
//!
//! Implements [`Transport`](crate::rpc::transport::Transport) over a
//! non-blocking `std::net::TcpStream` registered with the
//! `async-io-mini` reactor, framing every RPC with the length-prefix
//! codec.
//!
//! ## Connection model
//!
//! 1. `connect()` opens a TCP connection to the render server and hands
//!    the socket to the reactor.
//! 2. `send()` queues one frame and writes as much as the socket accepts
//!    right now.  The remainder goes out ahead of the next request.
//! 3. `request()` writes one frame, then awaits readiness until the next
//!    complete frame arrives.  Other futures on the executor keep running
//!    while the reply is outstanding.  Replies are correlated in FIFO
//!    order, so only one request may be outstanding at a time.
//! 4. Any I/O failure, EOF or abandoned request drops the connection;
//!    `reconnect()` opens a fresh one.  Callers then reapply scene state.
//!
//! ```text
//!   send ──▶ outbox ──▶ socket (non-blocking write, rest on writable())
//!   request ─┘            │
//!            ◀── inbox ◀── decoder ◀── socket (read on readable())
//! ```

use std::cell::{Cell, RefCell, RefMut};
use std::collections::VecDeque;
use std::fmt;
use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::rc::Rc;

use anyhow::{Context, anyhow, bail};
use async_io_mini::Async;
use log::{debug, info, warn};

use crate::rpc::codec::{FrameDecoder, encode_frame};
use crate::rpc::transport::Transport;

/// Read buffer size per `read()` call.
const READ_CHUNK: usize = 8 * 1024;

type Stream = Rc<Async<TcpStream>>;

struct Connection {
    stream: Stream,
    decoder: FrameDecoder,
    inbox: VecDeque<Vec<u8>>,
    /// Framed bytes the socket has not accepted yet.
    outbox: Vec<u8>,
}

impl Connection {
    /// Write queued bytes until the socket would block.
    fn pump(&mut self) -> io::Result<()> {
        let mut socket: &TcpStream = self.stream.get_ref();
        while !self.outbox.is_empty() {
            match socket.write(&self.outbox) {
                Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
                Ok(n) => {
                    self.outbox.drain(..n);
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

pub struct TcpTransport {
    address: String,
    conn: RefCell<Option<Connection>>,
    in_flight: Cell<bool>,
}

impl TcpTransport {
    /// Connect to `address` (`host:port`).
    pub fn connect(address: &str) -> anyhow::Result<Self> {
        let transport = Self {
            address: address.to_owned(),
            conn: RefCell::new(None),
            in_flight: Cell::new(false),
        };
        transport.reconnect()?;
        Ok(transport)
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Drop any current connection and open a new one.
    pub fn reconnect(&self) -> anyhow::Result<()> {
        self.disconnect();
        let stream = TcpStream::connect(&self.address)
            .with_context(|| format!("connecting to {}", self.address))?;
        stream.set_nodelay(true).context("setting TCP_NODELAY")?;
        let stream = Async::new(stream).context("registering socket with reactor")?;
        info!("TCP: connected to {}", self.address);
        *self.conn.borrow_mut() = Some(Connection {
            stream: Rc::new(stream),
            decoder: FrameDecoder::new(),
            inbox: VecDeque::new(),
            outbox: Vec::new(),
        });
        Ok(())
    }

    pub fn disconnect(&self) {
        if let Some(conn) = self.conn.borrow_mut().take() {
            let _ = conn.stream.get_ref().shutdown(Shutdown::Both);
            info!("TCP: disconnected from {}", self.address);
        }
    }

    fn current_stream(&self) -> anyhow::Result<Stream> {
        self.conn
            .borrow()
            .as_ref()
            .map(|conn| conn.stream.clone())
            .ok_or_else(|| anyhow!("not connected"))
    }

    /// The connection `stream` belongs to, if it is still the live one.
    fn live(&self, stream: &Stream) -> anyhow::Result<RefMut<'_, Connection>> {
        RefMut::filter_map(self.conn.borrow_mut(), |slot| {
            slot.as_mut().filter(|conn| Rc::ptr_eq(&conn.stream, stream))
        })
        .map_err(|_| anyhow!("connection closed during request"))
    }

    /// Drop the connection `stream` belongs to, unless it was already
    /// replaced.
    fn drop_stream(&self, stream: &Stream, reason: &dyn fmt::Display) {
        let mut slot = self.conn.borrow_mut();
        if slot.as_ref().is_some_and(|conn| Rc::ptr_eq(&conn.stream, stream)) {
            warn!("TCP: {reason}, dropping connection");
            if let Some(conn) = slot.take() {
                let _ = conn.stream.get_ref().shutdown(Shutdown::Both);
            }
        }
    }

    /// Flush the outbox, then wait for the next reply frame.
    async fn exchange(&self, stream: &Stream) -> anyhow::Result<Vec<u8>> {
        loop {
            let flushed = {
                let mut conn = self.live(stream)?;
                conn.pump().context("writing frame")?;
                conn.outbox.is_empty()
            };
            if flushed {
                break;
            }
            stream.writable().await.context("waiting to write")?;
        }

        let mut buf = [0u8; READ_CHUNK];
        loop {
            if let Some(frame) = self.live(stream)?.inbox.pop_front() {
                return Ok(frame);
            }
            let n = stream
                .read_with(|mut socket| socket.read(&mut buf))
                .await
                .context("reading reply")?;
            if n == 0 {
                bail!("connection closed by server");
            }
            let mut conn = self.live(stream)?;
            let frames = conn.decoder.feed(&buf[..n]);
            conn.inbox.extend(frames);
        }
    }
}

fn frame(payload: &[u8]) -> anyhow::Result<Vec<u8>> {
    match encode_frame(payload) {
        Some(frame) => Ok(frame),
        None => bail!("payload of {} bytes cannot be framed", payload.len()),
    }
}

/// Marks a request as outstanding.  A request dropped before its reply
/// arrived leaves that reply unread, so the connection is dropped too.
struct InFlight<'a> {
    transport: &'a TcpTransport,
    stream: Stream,
    settled: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.transport.in_flight.set(false);
        if !self.settled {
            self.transport.drop_stream(&self.stream, &"request abandoned before its reply");
        }
    }
}

impl Transport for TcpTransport {
    fn is_connected(&self) -> bool {
        self.conn.borrow().is_some()
    }

    fn send(&self, payload: Vec<u8>) -> anyhow::Result<()> {
        let bytes = frame(&payload)?;
        let stream = self.current_stream()?;
        let result = self.live(&stream).and_then(|mut conn| {
            conn.outbox.extend_from_slice(&bytes);
            conn.pump().context("writing frame")?;
            if !conn.outbox.is_empty() {
                debug!("TCP: {} bytes queued behind a full socket", conn.outbox.len());
            }
            Ok(())
        });
        if let Err(e) = &result {
            self.drop_stream(&stream, &format!("{e:#}"));
        }
        result
    }

    async fn request(&self, payload: Vec<u8>) -> anyhow::Result<Vec<u8>> {
        let bytes = frame(&payload)?;
        if self.in_flight.get() {
            bail!("another request is already in flight");
        }
        let stream = self.current_stream()?;
        self.live(&stream)?.outbox.extend_from_slice(&bytes);

        self.in_flight.set(true);
        let mut guard = InFlight {
            transport: self,
            stream,
            settled: false,
        };
        let result = self.exchange(&guard.stream).await;
        if let Err(e) = &result {
            self.drop_stream(&guard.stream, &format!("{e:#}"));
        }
        guard.settled = true;
        result
    }
}

// ── Tests ────────────────────────────────────────────────────
