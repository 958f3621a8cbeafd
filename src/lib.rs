//! Ultra client core.
//!
//! Drives a remote rendering server over a persistent socket: binary
//! RPC marshalling, per-element state synchronisation and scene load
//! lifecycle.  Rendering, geometry and UI live elsewhere.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Selection ──▶ Vim (visibility + colour synchronizers)       │
//! │                 │  flush once per frame                      │
//! │  LoadRequest ───┤                                            │
//! │                 ▼                                            │
//! │            SafeClient  (validate · batch · contain errors)   │
//! │                 ▼                                            │
//! │            RpcClient   (call catalogue)                      │
//! │                 ▼                                            │
//! │            Marshal     (wire bytes)                          │
//! │                 ▼                                            │
//! │            Transport   (TCP adapter, or host-provided)       │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![deny(unused_must_use)]

pub mod adapters;
pub mod color;
pub mod config;
pub mod connection;
pub mod error;
pub mod load;
pub mod rpc;
pub mod selection;
pub mod sync;
pub mod visibility;
pub mod vim;

pub use error::{Error, Result};
