//! Connection status and the API version handshake.
//!
//! Failures are reported as a tagged [`ConnectionStatus`], never as an
//! error return, so a UI can render whatever state it is handed.

use core::fmt;

use log::{info, warn};

use crate::rpc::safe_client::SafeClient;
use crate::rpc::transport::Transport;

/// Protocol version this client speaks.
pub const API_VERSION: &str = "6.0.0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// Client and server protocol versions differ.
    Compatibility { client: String, server: String },
    /// The stream could not be established or was lost.
    Stream(String),
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compatibility { client, server } => {
                write!(f, "incompatible API: client {client}, server {server}")
            }
            Self::Stream(msg) => write!(f, "stream error: {msg}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    Error(ConnectionError),
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// Ask the server for its API version and compare with [`API_VERSION`].
pub async fn check_compatibility<T: Transport>(client: &SafeClient<T>) -> ConnectionStatus {
    if !client.connected() {
        return ConnectionStatus::Disconnected;
    }
    match client.try_get_api_version().await {
        Ok(server) if server == API_VERSION => {
            info!("connected, API {server}");
            ConnectionStatus::Connected
        }
        Ok(server) => {
            let err = ConnectionError::Compatibility {
                client: API_VERSION.into(),
                server,
            };
            warn!("{err}");
            ConnectionStatus::Error(err)
        }
        Err(e) => {
            warn!("version check failed: {e}");
            ConnectionStatus::Error(ConnectionError::Stream(e.to_string()))
        }
    }
}
