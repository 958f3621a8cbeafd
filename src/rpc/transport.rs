//! Transport abstraction over any frame-oriented duplex channel.
//!
//! Concrete implementations:
//! - WebSocket (browser host, outside this crate)
//! - TCP socket with length-prefix framing ([`TcpTransport`](crate::adapters::tcp_transport::TcpTransport))
//! - Scripted in-memory transports in tests
//!
//! The RPC layer is generic over `Transport`, so adding a new transport
//! requires zero changes to the call catalogue.  Correlating a reply with
//! its request is the transport's job; replies carry no envelope.

/// Frame-oriented transport channel with correlated replies.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Whether a live connection exists right now.
    fn is_connected(&self) -> bool;

    /// Write one frame without waiting for a reply.
    fn send(&self, frame: Vec<u8>) -> anyhow::Result<()>;

    /// Write one frame and wait for the reply correlated with it.
    ///
    /// No timeout is applied; a dropped request never resolves.
    async fn request(&self, frame: Vec<u8>) -> anyhow::Result<Vec<u8>>;
}

/// A null transport that is never connected and rejects every frame.
/// Useful as a default before a server has been chosen.
pub struct NullTransport;

impl Transport for NullTransport {
    fn is_connected(&self) -> bool {
        false
    }

    fn send(&self, _frame: Vec<u8>) -> anyhow::Result<()> {
        anyhow::bail!("no transport configured")
    }

    async fn request(&self, _frame: Vec<u8>) -> anyhow::Result<Vec<u8>> {
        anyhow::bail!("no transport configured")
    }
}
