//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter         | Implements | Connects to                      |
//! |-----------------|------------|----------------------------------|
//! | `tcp_transport` | Transport  | Render server, length-prefix TCP |

pub mod tcp_transport;
