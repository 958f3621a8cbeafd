//! Per-element colour overrides backed by remote material instances.
//!
//! The server colours elements by material handle, not by value.  The
//! [`ColorPalette`] caches one material instance per distinct colour and
//! creates all missing ones in a single batched call at flush time.
//!
//! ```text
//! Option<Rgba32>  ──▶ palette lookup ──▶ material Handle ──▶ RPCSetMaterialOverrides
//!   None (default) ──────────────────────────────────────▶ RPCClearMaterialOverrides
//!   None (element) ──▶ INVALID_HANDLE (remove override)
//! ```

use std::collections::HashMap;

use log::{debug, warn};

use crate::rpc::safe_client::SafeClient;
use crate::rpc::transport::Transport;
use crate::rpc::types::{Handle, INVALID_HANDLE, Rgba32};
use crate::sync::{StateSink, StateSynchronizer};

/// `None` means "no colour override".
pub type ColorState = Option<Rgba32>;

pub type ColorSynchronizer = StateSynchronizer<ColorState>;

/// Colour → material instance cache for one server session.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    smoothness: f32,
    handles: HashMap<Rgba32, Handle>,
}

impl ColorPalette {
    pub fn new(smoothness: f32) -> Self {
        Self {
            smoothness,
            handles: HashMap::new(),
        }
    }

    pub fn handle(&self, color: Rgba32) -> Option<Handle> {
        self.handles.get(&color).copied()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Make sure every colour has a material instance.  Missing colours
    /// are created in one batched call.  Returns how many were created.
    pub async fn ensure<T: Transport>(&mut self, client: &SafeClient<T>, colors: &[Rgba32]) -> usize {
        let mut missing: Vec<Rgba32> = colors
            .iter()
            .copied()
            .filter(|c| !self.handles.contains_key(c))
            .collect();
        missing.sort_unstable();
        missing.dedup();
        if missing.is_empty() {
            return 0;
        }

        let handles = client
            .create_material_instances(self.smoothness, &missing)
            .await;
        if handles.len() != missing.len() {
            warn!("palette: could not create {} material instances", missing.len());
            return 0;
        }
        let created = missing.len();
        self.handles.extend(missing.into_iter().zip(handles));
        debug!("palette: created {created}, {} cached", self.handles.len());
        created
    }

    /// Forget every handle.  Required after a reconnect: the new server
    /// session has none of them.
    pub fn invalidate(&mut self) {
        self.handles.clear();
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::new(0.5)
    }
}

/// Pushes colour deltas for one scene.
pub struct ColorSink<'a, T> {
    client: &'a SafeClient<T>,
    palette: &'a mut ColorPalette,
    vim: Handle,
    element_count: u32,
}

impl<'a, T: Transport> ColorSink<'a, T> {
    pub fn new(
        client: &'a SafeClient<T>,
        palette: &'a mut ColorPalette,
        vim: Handle,
        element_count: u32,
    ) -> Self {
        Self {
            client,
            palette,
            vim,
            element_count,
        }
    }

    fn material(&self, state: ColorState) -> Option<Handle> {
        match state {
            None => Some(INVALID_HANDLE),
            Some(color) => {
                let handle = self.palette.handle(color);
                if handle.is_none() {
                    warn!("colour {:#010x} has no material instance, skipped", color.0);
                }
                handle
            }
        }
    }
}

impl<T: Transport> StateSink<ColorState> for ColorSink<'_, T> {
    fn is_connected(&self) -> bool {
        self.client.connected()
    }

    async fn prepare(&mut self, states: &[ColorState]) {
        let colors: Vec<Rgba32> = states.iter().flatten().copied().collect();
        self.palette.ensure(self.client, &colors).await;
    }

    async fn send_default(&mut self, state: ColorState) {
        match state {
            None => self.client.clear_material_overrides(self.vim),
            Some(_) => {
                let Some(material) = self.material(state) else {
                    return;
                };
                let indices: Vec<u32> = (0..self.element_count).collect();
                let materials = vec![material; indices.len()];
                self.client
                    .set_material_overrides(self.vim, &indices, &materials);
            }
        }
    }

    async fn send_states(&mut self, indices: &[u32], state: ColorState) {
        if let Some(material) = self.material(state) {
            let materials = vec![material; indices.len()];
            self.client
                .set_material_overrides(self.vim, indices, &materials);
        }
    }
}
