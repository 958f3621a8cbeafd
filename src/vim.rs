//! A loaded remote scene and its desired per-element state.
//!
//! ```text
//! ┌────────────────────────── Vim ──────────────────────────┐
//! │ handle, element_count, source                            │
//! │                                                          │
//! │  VisibilitySynchronizer ──flush──▶ VisibilitySink ─┐     │
//! │  ColorSynchronizer      ──flush──▶ ColorSink ──────┼──▶ SafeClient
//! │                                     (ColorPalette) │     │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The remote process keeps no memory across a reconnect.  [`Vim::reload`]
//! loads the scene again and re-sends everything that differs from a
//! fresh scene.

use std::rc::Rc;

use log::{debug, info};

use crate::color::{ColorPalette, ColorSink, ColorState, ColorSynchronizer};
use crate::load::{Delay, LoadError, LoadRequest, LoadedScene, VimSource};
use crate::rpc::safe_client::SafeClient;
use crate::rpc::transport::Transport;
use crate::rpc::types::{Box3, Handle};
use crate::selection::SelectionAdapter;
use crate::sync::{FlushReport, FrameScheduler};
use crate::visibility::{VisibilitySink, VisibilityState, VisibilitySynchronizer};

pub struct Vim {
    source: VimSource,
    handle: Handle,
    element_count: u32,
    visibility: VisibilitySynchronizer,
    colors: ColorSynchronizer,
}

impl Vim {
    pub fn new(source: VimSource, scene: LoadedScene, scheduler: Rc<dyn FrameScheduler>) -> Self {
        Self {
            source,
            handle: scene.handle,
            element_count: scene.element_count,
            visibility: VisibilitySynchronizer::new(VisibilityState::VISIBLE, scheduler.clone()),
            colors: ColorSynchronizer::new(None, scheduler),
        }
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn element_count(&self) -> u32 {
        self.element_count
    }

    pub fn source(&self) -> &VimSource {
        &self.source
    }

    fn in_range(&self, indices: &[u32]) -> Vec<u32> {
        let valid: Vec<u32> = indices
            .iter()
            .copied()
            .filter(|&i| i < self.element_count)
            .collect();
        if valid.len() != indices.len() {
            debug!(
                "vim {}: {} out-of-range indices ignored",
                self.handle,
                indices.len() - valid.len()
            );
        }
        valid
    }

    // ── Visibility ────────────────────────────────────────────

    pub fn visibility(&self, index: u32) -> VisibilityState {
        self.visibility.state(index)
    }

    pub fn default_visibility(&self) -> VisibilityState {
        self.visibility.default_state()
    }

    /// Apply `state` to `indices`.  Elements that are highlighted stay
    /// highlighted; only [`set_highlighted`](Self::set_highlighted) clears
    /// the flag.
    pub fn set_visibility(&mut self, indices: &[u32], state: VisibilityState) {
        let (highlighted, plain): (Vec<u32>, Vec<u32>) = self
            .in_range(indices)
            .into_iter()
            .partition(|&i| self.visibility.state(i).highlighted);
        self.visibility.set_states(&highlighted, state.with_highlight(true));
        self.visibility.set_states(&plain, state);
    }

    pub fn set_visibility_all(&mut self, state: VisibilityState) {
        self.visibility.set_state_for_all(state);
    }

    pub fn replace_visibility(&mut self, from: &[VisibilityState], to: VisibilityState) {
        self.visibility.replace_state(from, to);
    }

    /// Set or clear the highlight flag, keeping each element's category.
    pub fn set_highlighted(&mut self, indices: &[u32], on: bool) {
        for index in self.in_range(indices) {
            let state = self.visibility.state(index).with_highlight(on);
            self.visibility.set_state(index, state);
        }
    }

    // ── Colour ────────────────────────────────────────────────

    pub fn color(&self, index: u32) -> ColorState {
        self.colors.state(index)
    }

    pub fn set_color(&mut self, indices: &[u32], color: ColorState) {
        let indices = self.in_range(indices);
        self.colors.set_states(&indices, color);
    }

    pub fn set_color_all(&mut self, color: ColorState) {
        self.colors.set_state_for_all(color);
    }

    // ── Synchronisation ───────────────────────────────────────

    pub fn needs_flush(&self) -> bool {
        self.visibility.needs_flush() || self.colors.needs_flush()
    }

    /// Send pending visibility then colour deltas.
    pub async fn flush<T: Transport>(
        &mut self,
        client: &SafeClient<T>,
        palette: &mut ColorPalette,
    ) -> (FlushReport, FlushReport) {
        let mut vis_sink = VisibilitySink::new(client, self.handle);
        let vis = self.visibility.flush(&mut vis_sink).await;
        let mut color_sink = ColorSink::new(client, palette, self.handle, self.element_count);
        let col = self.colors.flush(&mut color_sink).await;
        (vis, col)
    }

    /// Queue a full resend, for a server that has forgotten this scene's
    /// state.
    pub fn reapply_states(&mut self) {
        self.visibility.reapply_states();
        self.colors.reapply_states();
    }

    /// Load the scene again on a (re)connected server, adopt the new
    /// handle and queue a full resend.  The caller invalidates the
    /// palette it shares across scenes.
    pub async fn reload<T: Transport>(
        &mut self,
        client: &SafeClient<T>,
        request: LoadRequest,
        delay: &impl Delay,
    ) -> Result<(), LoadError> {
        let scene = request.run(client, delay).await?;
        info!(
            "vim {}: reloaded as handle {} ({} elements)",
            self.source.url, scene.handle, scene.element_count
        );
        self.handle = scene.handle;
        self.element_count = scene.element_count;
        self.reapply_states();
        Ok(())
    }

    pub fn unload<T: Transport>(&self, client: &SafeClient<T>) {
        client.unload_vim(self.handle);
    }
}

/// Selection adapter outlining elements of one scene through the
/// highlight flag.
pub struct ElementOutliner<'a, T> {
    vim: &'a mut Vim,
    client: &'a SafeClient<T>,
}

impl<'a, T: Transport> ElementOutliner<'a, T> {
    pub fn new(vim: &'a mut Vim, client: &'a SafeClient<T>) -> Self {
        Self { vim, client }
    }
}

impl<T: Transport> SelectionAdapter<u32> for ElementOutliner<'_, T> {
    fn outline(&mut self, index: &u32, on: bool) {
        self.vim.set_highlighted(&[*index], on);
    }

    async fn bounding_box(&self, index: &u32) -> Option<Box3> {
        self.client
            .get_aabb_for_elements(self.vim.handle(), &[*index])
            .await
    }
}

// ── Tests ────────────────────────────────────────────────────
