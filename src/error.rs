//! Unified error types for the client core.
//!
//! Every fallible operation below the [`SafeClient`](crate::rpc::safe_client::SafeClient)
//! boundary funnels into [`Error`].  The safe client logs these and
//! substitutes a documented default, so they only reach callers through
//! the `try_*` layer and through tests.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level client error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Arguments were rejected before anything was written to the wire.
    Validation(&'static str),
    /// A reply could not be decoded with the requested signature.
    Marshal(MarshalError),
    /// The transport refused or failed the call.
    Transport(String),
    /// The transport has no live connection.
    NotConnected,
    /// The server answered with a sentinel instead of a usable value.
    Rejected(&'static str),
}

impl Error {
    /// Wrap a transport-level failure, keeping the full context chain.
    pub fn transport(err: &anyhow::Error) -> Self {
        Self::Transport(format!("{err:#}"))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "validation: {msg}"),
            Self::Marshal(e) => write!(f, "marshal: {e}"),
            Self::Transport(msg) => write!(f, "transport: {msg}"),
            Self::NotConnected => write!(f, "transport not connected"),
            Self::Rejected(msg) => write!(f, "rejected by server: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Marshal errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarshalError {
    /// A read needed more bytes than the buffer holds.
    UnexpectedEof { needed: usize, remaining: usize },
    /// A string length prefix of zero (the terminator is always counted).
    EmptyStringPrefix,
    /// A string was not followed by its NUL terminator.
    MissingTerminator,
    /// String bytes were not valid UTF-8.
    InvalidUtf8,
    /// A reply held more bytes than its declared type consumed.
    TrailingBytes(usize),
    /// An enum discriminant outside the known set.
    UnknownDiscriminant(u32),
}

impl fmt::Display for MarshalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof { needed, remaining } => {
                write!(f, "needed {needed} bytes, {remaining} remaining")
            }
            Self::EmptyStringPrefix => write!(f, "string length prefix is zero"),
            Self::MissingTerminator => write!(f, "string terminator missing"),
            Self::InvalidUtf8 => write!(f, "string is not valid UTF-8"),
            Self::TrailingBytes(n) => write!(f, "{n} trailing bytes after reply value"),
            Self::UnknownDiscriminant(v) => write!(f, "unknown discriminant {v}"),
        }
    }
}

impl From<MarshalError> for Error {
    fn from(e: MarshalError) -> Self {
        Self::Marshal(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
