//! Desired-state synchronization against the remote renderer.
//!
//! ```text
//! ┌──────────────┐ mutate ┌──────────────────┐ flush ┌───────────┐
//! │ UI / Vim     │───────▶│ StateSynchronizer│──────▶│ StateSink │──▶ SafeClient
//! └──────────────┘        │  StateTracker    │       └───────────┘
//!                         │  pending set     │
//!                         └────────┬─────────┘
//!                                  │ schedule_frame
//!                                  ▼
//!                           FrameScheduler
//! ```
//!
//! The tracker is the local source of truth.  The synchronizer turns
//! mutations into the minimal set of remote calls, once per frame.

pub mod scheduler;
pub mod synchronizer;
pub mod tracker;

pub use scheduler::{FrameScheduler, ManualFrameScheduler};
pub use synchronizer::{FlushReport, StateSink, StateSynchronizer};
pub use tracker::StateTracker;
