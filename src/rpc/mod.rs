//! Transport-agnostic RPC subsystem.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         RPC Stack                            │
//! │                                                              │
//! │  ┌────────────┐   ┌───────────┐   ┌─────────┐   ┌─────────┐  │
//! │  │ SafeClient │──▶│ RpcClient │──▶│ Marshal │──▶│Transport│  │
//! │  │ (validate, │   │ (catalogue│   │ (bytes) │   │ (trait) │  │
//! │  │  batch)    │   │  of ops)  │   └─────────┘   └────┬────┘  │
//! │  └────────────┘   └─────▲─────┘                      │       │
//! │                         │        ReadCursor          │       │
//! │                         └──────── (reply) ◀──────────┘       │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod batch;
pub mod client;
pub mod codec;
pub mod marshal;
pub mod safe_client;
pub mod transport;
pub mod types;
