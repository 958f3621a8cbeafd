//! Per-element visibility: a base category plus an orthogonal
//! highlight flag.
//!
//! ```text
//!              highlighted = false     highlighted = true
//!   Visible    0  VISIBLE              16 HIGHLIGHTED
//!   Hidden     1  HIDDEN               17 HIDDEN_HIGHLIGHTED
//!   Ghosted    2  GHOSTED              18 GHOSTED_HIGHLIGHTED
//! ```
//!
//! Toggling the highlight never touches the category, so clearing a
//! highlight always restores exactly the category it was applied over.

use serde::{Deserialize, Serialize};

use crate::rpc::safe_client::SafeClient;
use crate::rpc::transport::Transport;
use crate::rpc::types::Handle;
use crate::sync::{StateSink, StateSynchronizer};

/// Wire bit marking a highlighted element.
const HIGHLIGHT_BIT: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VisibilityCategory {
    #[default]
    Visible,
    Hidden,
    Ghosted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct VisibilityState {
    pub category: VisibilityCategory,
    pub highlighted: bool,
}

impl VisibilityState {
    pub const VISIBLE: Self = Self::new(VisibilityCategory::Visible, false);
    pub const HIDDEN: Self = Self::new(VisibilityCategory::Hidden, false);
    pub const GHOSTED: Self = Self::new(VisibilityCategory::Ghosted, false);
    pub const HIGHLIGHTED: Self = Self::new(VisibilityCategory::Visible, true);
    pub const HIDDEN_HIGHLIGHTED: Self = Self::new(VisibilityCategory::Hidden, true);
    pub const GHOSTED_HIGHLIGHTED: Self = Self::new(VisibilityCategory::Ghosted, true);

    /// Every state, in wire order.
    pub const ALL: [Self; 6] = [
        Self::VISIBLE,
        Self::HIDDEN,
        Self::GHOSTED,
        Self::HIGHLIGHTED,
        Self::HIDDEN_HIGHLIGHTED,
        Self::GHOSTED_HIGHLIGHTED,
    ];

    pub const fn new(category: VisibilityCategory, highlighted: bool) -> Self {
        Self {
            category,
            highlighted,
        }
    }

    /// Same category with the highlight flag set to `on`.
    pub const fn with_highlight(self, on: bool) -> Self {
        Self::new(self.category, on)
    }

    pub const fn to_wire(self) -> u32 {
        let base = match self.category {
            VisibilityCategory::Visible => 0,
            VisibilityCategory::Hidden => 1,
            VisibilityCategory::Ghosted => 2,
        };
        if self.highlighted {
            base | HIGHLIGHT_BIT
        } else {
            base
        }
    }

    pub const fn from_wire(raw: u32) -> Option<Self> {
        let category = match raw & !HIGHLIGHT_BIT {
            0 => VisibilityCategory::Visible,
            1 => VisibilityCategory::Hidden,
            2 => VisibilityCategory::Ghosted,
            _ => return None,
        };
        Some(Self::new(category, raw & HIGHLIGHT_BIT != 0))
    }
}

/// Visibility synchronizer for one loaded scene.
pub type VisibilitySynchronizer = StateSynchronizer<VisibilityState>;

/// Pushes visibility deltas for one scene through the safe client.
pub struct VisibilitySink<'a, T> {
    client: &'a SafeClient<T>,
    vim: Handle,
}

impl<'a, T: Transport> VisibilitySink<'a, T> {
    pub fn new(client: &'a SafeClient<T>, vim: Handle) -> Self {
        Self { client, vim }
    }
}

impl<T: Transport> StateSink<VisibilityState> for VisibilitySink<'_, T> {
    fn is_connected(&self) -> bool {
        self.client.connected()
    }

    async fn send_default(&mut self, state: VisibilityState) {
        self.client.set_visibility_vim(self.vim, state);
    }

    async fn send_states(&mut self, indices: &[u32], state: VisibilityState) {
        self.client
            .set_visibility_elements(self.vim, indices, state);
    }
}

// ── Tests ────────────────────────────────────────────────────
