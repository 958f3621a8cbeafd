//! Client configuration parameters
//!
//! All tunable parameters for a client session.
//! Loaded from JSON; missing fields fall back to their defaults.

use std::time::Duration;

use core::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::color::ColorPalette;
use crate::rpc::batch::DEFAULT_BATCH_SIZE;
use crate::selection::Selection;

/// Core client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    // --- Connection ---
    /// Render server address (`host:port`)
    pub server_address: String,

    // --- RPC ---
    /// Maximum entries per array argument before a call is split
    pub batch_size: usize,

    // --- Loading ---
    /// Load-status poll interval (milliseconds)
    pub load_poll_interval_ms: u64,

    // --- Materials ---
    /// Smoothness of colour override materials (0-1)
    pub material_smoothness: f32,

    // --- Selection ---
    /// Selecting the sole selected object again deselects it
    pub toggle_selection_on_repeat: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_address: "127.0.0.1:8123".into(),
            batch_size: DEFAULT_BATCH_SIZE,
            load_poll_interval_ms: 100, // 10 Hz
            material_smoothness: 0.5,
            toggle_selection_on_repeat: true,
        }
    }
}

impl ClientConfig {
    /// Parse from JSON and sanitise.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<Self>(json).map(Self::sanitized)
    }

    /// Clamp values into their accepted ranges.
    pub fn sanitized(mut self) -> Self {
        self.batch_size = self.batch_size.max(1);
        self.material_smoothness = if self.material_smoothness.is_finite() {
            self.material_smoothness.clamp(0.0, 1.0)
        } else {
            Self::default().material_smoothness
        };
        self
    }

    pub fn load_poll_interval(&self) -> Duration {
        Duration::from_millis(self.load_poll_interval_ms)
    }

    /// Empty palette creating materials with the configured smoothness.
    pub fn palette(&self) -> ColorPalette {
        ColorPalette::new(self.material_smoothness)
    }

    pub fn selection<T: Eq + Hash + Clone>(&self) -> Selection<T> {
        Selection::new().with_toggle_on_repeat(self.toggle_selection_on_repeat)
    }
}
