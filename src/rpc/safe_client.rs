//! Safe RPC client: validation, batching and error containment.
//!
//! ```text
//! caller ──▶ public method ──▶ try_* ──▶ validate ──▶ batch ──▶ RpcClient
//!               │                 │
//!               │   Result<T, Error> (tests assert here)
//!               ▼
//!        warn! + documented default   (never panics, never propagates)
//! ```
//!
//! Every public method has a documented fallback: void calls are
//! skipped, handles fall back to [`INVALID_HANDLE`], queries fall back
//! to `None`, an empty collection or the type's default.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::batch;
use super::client::{RpcClient, op};
use super::transport::Transport;
use super::types::{
    Box3, Handle, HitCheckResult, INVALID_HANDLE, Rgba32, RgbaColor, SectionBoxState, Segment,
    Vector2, Vector3, VimLoadingStatus,
};
use crate::error::{Error, Result};
use crate::load::VimSource;
use crate::visibility::VisibilityState;

/// Scene lighting parameters.  Out-of-range values are clamped, not
/// rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingSettings {
    pub tone_mapping_white_point: f32,
    pub hdr_scale: f32,
    pub hdr_background_scale: f32,
    pub hdr_background_saturation: f32,
    pub background_blur: f32,
    pub background_color: RgbaColor,
}

impl Default for LightingSettings {
    fn default() -> Self {
        Self {
            tone_mapping_white_point: 0.1009,
            hdr_scale: 1.37,
            hdr_background_scale: 1.0,
            hdr_background_saturation: 1.0,
            background_blur: 1.0,
            background_color: RgbaColor::new(0.9, 0.9, 0.9, 1.0),
        }
    }
}

impl LightingSettings {
    /// Clamp every field into its accepted range.  Non-finite values
    /// fall back to the defaults.
    pub fn clamped(&self) -> Self {
        let d = Self::default();
        let unit = |v: f32, fallback: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { fallback };
        Self {
            tone_mapping_white_point: unit(self.tone_mapping_white_point, d.tone_mapping_white_point),
            hdr_scale: if self.hdr_scale.is_finite() {
                self.hdr_scale.max(0.0)
            } else {
                d.hdr_scale
            },
            hdr_background_scale: unit(self.hdr_background_scale, d.hdr_background_scale),
            hdr_background_saturation: unit(
                self.hdr_background_saturation,
                d.hdr_background_saturation,
            ),
            background_blur: unit(self.background_blur, d.background_blur),
            background_color: if self.background_color.is_finite() {
                self.background_color.clamped()
            } else {
                d.background_color
            },
        }
    }
}

pub struct SafeClient<T> {
    rpc: RpcClient<T>,
    batch_size: usize,
}

// ── Validation helpers ────────────────────────────────────────

fn ensure(ok: bool, msg: &'static str) -> Result<()> {
    if ok { Ok(()) } else { Err(Error::Validation(msg)) }
}

fn valid_handle(handle: Handle) -> Result<()> {
    ensure(handle != INVALID_HANDLE, "invalid handle")
}

fn non_empty<X>(items: &[X]) -> Result<()> {
    ensure(!items.is_empty(), "empty array")
}

fn blend(blend_time: f32) -> f32 {
    if blend_time.is_finite() { blend_time.max(0.0) } else { 0.0 }
}

/// Log a contained failure and substitute `fallback`.
fn contain<R>(name: &str, result: Result<R>, fallback: R) -> R {
    match result {
        Ok(value) => value,
        Err(Error::Validation(msg)) => {
            debug!("{name}: skipped ({msg})");
            fallback
        }
        Err(e) => {
            warn!("{name} failed: {e}");
            fallback
        }
    }
}

impl<T: Transport> SafeClient<T> {
    pub fn new(transport: T) -> Self {
        Self::with_batch_size(transport, batch::DEFAULT_BATCH_SIZE)
    }

    pub fn with_batch_size(transport: T, batch_size: usize) -> Self {
        Self {
            rpc: RpcClient::new(transport),
            batch_size: batch_size.max(1),
        }
    }

    /// The unchecked call layer underneath.
    pub fn rpc(&self) -> &RpcClient<T> {
        &self.rpc
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn connected(&self) -> bool {
        self.rpc.connected()
    }

    fn live(&self) -> Result<&RpcClient<T>> {
        if self.rpc.connected() {
            Ok(&self.rpc)
        } else {
            Err(Error::NotConnected)
        }
    }

    // ═══════════════════════════════════════════════════════════
    //  Scene & loading
    // ═══════════════════════════════════════════════════════════

    pub async fn try_load_vim(&self, file_name: &str) -> Result<Handle> {
        ensure(!file_name.is_empty(), "empty file name")?;
        let handle = self.live()?.load_vim(file_name).await?;
        valid_handle(handle).map_err(|_| Error::Rejected("load returned invalid handle"))?;
        Ok(handle)
    }

    /// Path-based load.  [`INVALID_HANDLE`] on any failure.
    pub async fn load_vim(&self, file_name: &str) -> Handle {
        contain(op::LOAD_VIM, self.try_load_vim(file_name).await, INVALID_HANDLE)
    }

    pub async fn try_load_vim_url(&self, url: &str, auth_token: &str) -> Result<Handle> {
        ensure(!url.is_empty(), "empty url")?;
        let handle = self.live()?.load_vim_url(url, auth_token).await?;
        valid_handle(handle).map_err(|_| Error::Rejected("load returned invalid handle"))?;
        Ok(handle)
    }

    /// URL-based load.  [`INVALID_HANDLE`] on any failure.
    pub async fn load_vim_url(&self, url: &str, auth_token: &str) -> Handle {
        contain(
            op::LOAD_VIM_URL,
            self.try_load_vim_url(url, auth_token).await,
            INVALID_HANDLE,
        )
    }

    /// Route a source descriptor to the path or URL load call.
    pub async fn try_load_source(&self, source: &VimSource) -> Result<Handle> {
        match source.local_path() {
            Some(path) => self.try_load_vim(&path).await,
            None => {
                self.try_load_vim_url(&source.url, source.auth_token.as_deref().unwrap_or(""))
                    .await
            }
        }
    }

    pub async fn load_source(&self, source: &VimSource) -> Handle {
        contain("load_source", self.try_load_source(source).await, INVALID_HANDLE)
    }

    pub async fn try_get_vim_loading_state(&self, vim: Handle) -> Result<VimLoadingStatus> {
        valid_handle(vim)?;
        self.live()?.get_vim_loading_state(vim).await
    }

    /// `Unknown` with zero progress on failure.
    pub async fn get_vim_loading_state(&self, vim: Handle) -> VimLoadingStatus {
        contain(
            op::GET_VIM_LOADING_STATE,
            self.try_get_vim_loading_state(vim).await,
            VimLoadingStatus::default(),
        )
    }

    pub async fn try_get_element_count(&self, vim: Handle) -> Result<u32> {
        valid_handle(vim)?;
        self.live()?.get_element_count_for_vim(vim).await
    }

    /// Zero on failure.
    pub async fn get_element_count(&self, vim: Handle) -> u32 {
        contain(
            op::GET_ELEMENT_COUNT_FOR_VIM,
            self.try_get_element_count(vim).await,
            0,
        )
    }

    pub async fn try_get_element_ids(&self, vim: Handle) -> Result<Vec<u64>> {
        valid_handle(vim)?;
        self.live()?.get_element_ids(vim).await
    }

    pub async fn get_element_ids(&self, vim: Handle) -> Vec<u64> {
        contain(op::GET_ELEMENT_IDS, self.try_get_element_ids(vim).await, Vec::new())
    }

    pub async fn try_get_last_error(&self) -> Result<String> {
        self.live()?.get_last_error().await
    }

    pub async fn get_last_error(&self) -> String {
        contain(op::GET_LAST_ERROR, self.try_get_last_error().await, String::new())
    }

    pub async fn try_get_api_version(&self) -> Result<String> {
        self.live()?.get_api_version().await
    }

    pub async fn get_api_version(&self) -> String {
        contain(op::GET_API_VERSION, self.try_get_api_version().await, String::new())
    }

    pub fn try_unload_vim(&self, vim: Handle) -> Result<()> {
        valid_handle(vim)?;
        self.live()?.unload_vim(vim)
    }

    pub fn unload_vim(&self, vim: Handle) {
        contain(op::UNLOAD_VIM, self.try_unload_vim(vim), ());
    }

    pub fn try_clear_scene(&self) -> Result<()> {
        self.live()?.clear_scene()
    }

    pub fn clear_scene(&self) {
        contain(op::CLEAR_SCENE, self.try_clear_scene(), ());
    }

    // ═══════════════════════════════════════════════════════════
    //  Visibility
    // ═══════════════════════════════════════════════════════════

    pub fn try_set_visibility_vim(&self, vim: Handle, state: VisibilityState) -> Result<()> {
        valid_handle(vim)?;
        self.live()?.set_state_vim(vim, state.to_wire())
    }

    /// Set the default visibility of every element of a scene.
    pub fn set_visibility_vim(&self, vim: Handle, state: VisibilityState) {
        contain(op::SET_STATE_VIM, self.try_set_visibility_vim(vim, state), ());
    }

    pub fn try_set_visibility_elements(
        &self,
        vim: Handle,
        indices: &[u32],
        state: VisibilityState,
    ) -> Result<()> {
        valid_handle(vim)?;
        non_empty(indices)?;
        let rpc = self.live()?;
        for part in batch::chunks(indices, self.batch_size) {
            rpc.set_state_elements(vim, part, state.to_wire())?;
        }
        Ok(())
    }

    /// Set the visibility of specific elements, batched.
    pub fn set_visibility_elements(&self, vim: Handle, indices: &[u32], state: VisibilityState) {
        contain(
            op::SET_STATE_ELEMENTS,
            self.try_set_visibility_elements(vim, indices, state),
            (),
        );
    }

    pub fn try_set_ghost_color(&self, color: RgbaColor) -> Result<()> {
        ensure(color.is_finite(), "non-finite colour")?;
        self.live()?.set_ghost_color(color.clamped())
    }

    pub fn set_ghost_color(&self, color: RgbaColor) {
        contain(op::SET_GHOST_COLOR, self.try_set_ghost_color(color), ());
    }

    // ═══════════════════════════════════════════════════════════
    //  Materials
    // ═══════════════════════════════════════════════════════════

    /// Create one material instance per colour.  Returns one handle per
    /// input position.
    pub async fn try_create_material_instances(
        &self,
        smoothness: f32,
        colors: &[Rgba32],
    ) -> Result<Vec<Handle>> {
        non_empty(colors)?;
        ensure(smoothness.is_finite(), "non-finite smoothness")?;
        let smoothness = smoothness.clamp(0.0, 1.0);
        let rpc = self.live()?;

        let mut handles = Vec::with_capacity(colors.len());
        for part in batch::chunks(colors, self.batch_size) {
            let first = rpc.create_material_instances(smoothness, part).await?;
            if first == INVALID_HANDLE {
                return Err(Error::Rejected("material creation returned invalid handle"));
            }
            handles.extend(batch::handle_range(first, part.len()));
        }
        Ok(handles)
    }

    /// Empty on failure.
    pub async fn create_material_instances(&self, smoothness: f32, colors: &[Rgba32]) -> Vec<Handle> {
        contain(
            op::CREATE_MATERIAL_INSTANCES,
            self.try_create_material_instances(smoothness, colors).await,
            Vec::new(),
        )
    }

    pub fn try_set_material_overrides(
        &self,
        vim: Handle,
        indices: &[u32],
        materials: &[Handle],
    ) -> Result<()> {
        valid_handle(vim)?;
        non_empty(indices)?;
        ensure(indices.len() == materials.len(), "array length mismatch")?;
        let rpc = self.live()?;
        for (idx, mats) in batch::paired_chunks(indices, materials, self.batch_size) {
            rpc.set_material_overrides(vim, idx, mats)?;
        }
        Ok(())
    }

    /// Assign materials per element.  [`INVALID_HANDLE`] as a material
    /// removes that element's override.
    pub fn set_material_overrides(&self, vim: Handle, indices: &[u32], materials: &[Handle]) {
        contain(
            op::SET_MATERIAL_OVERRIDES,
            self.try_set_material_overrides(vim, indices, materials),
            (),
        );
    }

    pub fn try_clear_material_overrides(&self, vim: Handle) -> Result<()> {
        valid_handle(vim)?;
        self.live()?.clear_material_overrides(vim)
    }

    pub fn clear_material_overrides(&self, vim: Handle) {
        contain(
            op::CLEAR_MATERIAL_OVERRIDES,
            self.try_clear_material_overrides(vim),
            (),
        );
    }

    // ═══════════════════════════════════════════════════════════
    //  Bounds & framing
    // ═══════════════════════════════════════════════════════════

    pub async fn try_get_aabb_for_all(&self) -> Result<Box3> {
        self.live()?.get_aabb_for_all().await
    }

    pub async fn get_aabb_for_all(&self) -> Option<Box3> {
        contain(op::GET_AABB_FOR_ALL, self.try_get_aabb_for_all().await.map(Some), None)
    }

    pub async fn try_get_aabb_for_vim(&self, vim: Handle) -> Result<Box3> {
        valid_handle(vim)?;
        self.live()?.get_aabb_for_vim(vim).await
    }

    pub async fn get_aabb_for_vim(&self, vim: Handle) -> Option<Box3> {
        contain(
            op::GET_AABB_FOR_VIM,
            self.try_get_aabb_for_vim(vim).await.map(Some),
            None,
        )
    }

    /// Bounding box of specific elements; batches are unioned.
    pub async fn try_get_aabb_for_elements(&self, vim: Handle, indices: &[u32]) -> Result<Box3> {
        valid_handle(vim)?;
        non_empty(indices)?;
        let rpc = self.live()?;
        let mut boxes = Vec::new();
        for part in batch::chunks(indices, self.batch_size) {
            boxes.push(rpc.get_aabb_for_elements(vim, part).await?);
        }
        batch::union_all(boxes).ok_or(Error::Validation("empty array"))
    }

    pub async fn get_aabb_for_elements(&self, vim: Handle, indices: &[u32]) -> Option<Box3> {
        contain(
            op::GET_AABB_FOR_ELEMENTS,
            self.try_get_aabb_for_elements(vim, indices).await.map(Some),
            None,
        )
    }

    pub async fn try_frame_all(&self, blend_time: f32) -> Result<Segment> {
        self.live()?.frame_all(blend(blend_time)).await
    }

    pub async fn frame_all(&self, blend_time: f32) -> Option<Segment> {
        contain(op::FRAME_ALL, self.try_frame_all(blend_time).await.map(Some), None)
    }

    pub async fn try_frame_box(&self, bounds: Box3, blend_time: f32) -> Result<Segment> {
        ensure(bounds.is_valid(), "invalid box")?;
        self.live()?.frame_box(bounds, blend(blend_time)).await
    }

    pub async fn frame_box(&self, bounds: Box3, blend_time: f32) -> Option<Segment> {
        contain(
            op::FRAME_BOX,
            self.try_frame_box(bounds, blend_time).await.map(Some),
            None,
        )
    }

    pub async fn try_frame_vim(&self, vim: Handle, blend_time: f32) -> Result<Segment> {
        valid_handle(vim)?;
        self.live()?.frame_vim(vim, blend(blend_time)).await
    }

    pub async fn frame_vim(&self, vim: Handle, blend_time: f32) -> Option<Segment> {
        contain(
            op::FRAME_VIM,
            self.try_frame_vim(vim, blend_time).await.map(Some),
            None,
        )
    }

    /// Frame specific elements.  Above the batch size the union of the
    /// batched bounding boxes is framed instead.
    pub async fn try_frame_elements(
        &self,
        vim: Handle,
        indices: &[u32],
        blend_time: f32,
    ) -> Result<Segment> {
        valid_handle(vim)?;
        non_empty(indices)?;
        if indices.len() > self.batch_size {
            let bounds = self.try_get_aabb_for_elements(vim, indices).await?;
            return self.try_frame_box(bounds, blend_time).await;
        }
        self.live()?
            .frame_elements(vim, indices, blend(blend_time))
            .await
    }

    pub async fn frame_elements(&self, vim: Handle, indices: &[u32], blend_time: f32) -> Option<Segment> {
        contain(
            op::FRAME_ELEMENTS,
            self.try_frame_elements(vim, indices, blend_time).await.map(Some),
            None,
        )
    }

    // ═══════════════════════════════════════════════════════════
    //  Camera
    // ═══════════════════════════════════════════════════════════

    pub async fn try_get_camera_position(&self) -> Result<Segment> {
        self.live()?.get_camera_position().await
    }

    pub async fn get_camera_position(&self) -> Option<Segment> {
        contain(
            op::GET_CAMERA_POSITION,
            self.try_get_camera_position().await.map(Some),
            None,
        )
    }

    pub fn try_set_camera_position(&self, segment: Segment, blend_time: f32) -> Result<()> {
        ensure(segment.is_finite(), "non-finite segment")?;
        self.live()?.set_camera_position(segment, blend(blend_time))
    }

    pub fn set_camera_position(&self, segment: Segment, blend_time: f32) {
        contain(
            op::SET_CAMERA_POSITION,
            self.try_set_camera_position(segment, blend_time),
            (),
        );
    }

    /// Move the camera position, its target, or both.  At least one
    /// must be given.
    pub fn try_move_camera_to(
        &self,
        position: Option<Vector3>,
        target: Option<Vector3>,
        blend_time: f32,
    ) -> Result<()> {
        ensure(position.is_some() || target.is_some(), "nothing to move")?;
        ensure(
            position.is_none_or(|p| p.is_finite()) && target.is_none_or(|t| t.is_finite()),
            "non-finite camera vector",
        )?;
        self.live()?.move_camera_to(
            position.is_some(),
            target.is_some(),
            position.unwrap_or_default(),
            target.unwrap_or_default(),
            blend(blend_time),
        )
    }

    pub fn move_camera_to(&self, position: Option<Vector3>, target: Option<Vector3>, blend_time: f32) {
        contain(
            op::MOVE_CAMERA_TO,
            self.try_move_camera_to(position, target, blend_time),
            (),
        );
    }

    pub fn try_set_camera_mode(&self, orbit: bool) -> Result<()> {
        self.live()?.set_camera_mode(orbit)
    }

    pub fn set_camera_mode(&self, orbit: bool) {
        contain(op::SET_CAMERA_MODE, self.try_set_camera_mode(orbit), ());
    }

    pub fn try_set_camera_speed(&self, speed: f32) -> Result<()> {
        ensure(speed.is_finite(), "non-finite speed")?;
        self.live()?.set_camera_speed(speed.max(0.0))
    }

    pub fn set_camera_speed(&self, speed: f32) {
        contain(op::SET_CAMERA_SPEED, self.try_set_camera_speed(speed), ());
    }

    pub fn try_set_aspect_ratio(&self, width: u32, height: u32) -> Result<()> {
        ensure(width > 0 && height > 0, "zero dimension")?;
        self.live()?.set_aspect_ratio(width, height)
    }

    pub fn set_aspect_ratio(&self, width: u32, height: u32) {
        contain(op::SET_ASPECT_RATIO, self.try_set_aspect_ratio(width, height), ());
    }

    // ═══════════════════════════════════════════════════════════
    //  Hit testing & section box
    // ═══════════════════════════════════════════════════════════

    pub async fn try_perform_hit_test(&self, position: Vector2) -> Result<HitCheckResult> {
        ensure(position.is_finite(), "non-finite position")?;
        self.live()?.perform_hit_test(position).await
    }

    /// `None` on a miss as well as on failure.
    pub async fn perform_hit_test(&self, position: Vector2) -> Option<HitCheckResult> {
        contain(
            op::PERFORM_HIT_TEST,
            self.try_perform_hit_test(position).await.map(Some),
            None,
        )
        .filter(HitCheckResult::is_hit)
    }

    pub fn try_enable_section_box(&self, enable: bool) -> Result<()> {
        self.live()?.enable_section_box(enable)
    }

    pub fn enable_section_box(&self, enable: bool) {
        contain(op::ENABLE_SECTION_BOX, self.try_enable_section_box(enable), ());
    }

    pub fn try_set_section_box(&self, state: SectionBoxState) -> Result<()> {
        ensure(state.bounds.is_valid(), "invalid section box")?;
        self.live()?.set_section_box(state)
    }

    pub fn set_section_box(&self, state: SectionBoxState) {
        contain(op::SET_SECTION_BOX, self.try_set_section_box(state), ());
    }

    pub async fn try_get_section_box(&self) -> Result<SectionBoxState> {
        self.live()?.get_section_box().await
    }

    pub async fn get_section_box(&self) -> Option<SectionBoxState> {
        contain(
            op::GET_SECTION_BOX,
            self.try_get_section_box().await.map(Some),
            None,
        )
    }

    // ═══════════════════════════════════════════════════════════
    //  Text labels
    // ═══════════════════════════════════════════════════════════

    pub async fn try_create_text(&self, position: Vector3, color: Rgba32, text: &str) -> Result<Handle> {
        ensure(position.is_finite(), "non-finite position")?;
        ensure(!text.is_empty(), "empty text")?;
        self.live()?.create_text(position, color, text).await
    }

    pub async fn create_text(&self, position: Vector3, color: Rgba32, text: &str) -> Handle {
        contain(
            op::CREATE_TEXT,
            self.try_create_text(position, color, text).await,
            INVALID_HANDLE,
        )
    }

    pub fn try_destroy_text(&self, text: Handle) -> Result<()> {
        valid_handle(text)?;
        self.live()?.destroy_text(text)
    }

    pub fn destroy_text(&self, text: Handle) {
        contain(op::DESTROY_TEXT, self.try_destroy_text(text), ());
    }

    // ═══════════════════════════════════════════════════════════
    //  Rendering & lighting
    // ═══════════════════════════════════════════════════════════

    pub fn try_set_lighting(&self, settings: &LightingSettings) -> Result<()> {
        let s = settings.clamped();
        self.live()?.set_lighting(
            s.tone_mapping_white_point,
            s.hdr_scale,
            s.hdr_background_scale,
            s.hdr_background_saturation,
            s.background_blur,
            s.background_color,
        )
    }

    pub fn set_lighting(&self, settings: &LightingSettings) {
        contain(op::SET_LIGHTING, self.try_set_lighting(settings), ());
    }

    pub fn try_lock_ibl_rotation(&self, lock: bool) -> Result<()> {
        self.live()?.lock_ibl_rotation(lock)
    }

    pub fn lock_ibl_rotation(&self, lock: bool) {
        contain(op::LOCK_IBL_ROTATION, self.try_lock_ibl_rotation(lock), ());
    }

    pub fn try_pause_rendering(&self, pause: bool) -> Result<()> {
        self.live()?.pause_rendering(pause)
    }

    pub fn pause_rendering(&self, pause: bool) {
        contain(op::PAUSE_RENDERING, self.try_pause_rendering(pause), ());
    }

    pub fn try_trigger_renderdoc_capture(&self) -> Result<()> {
        self.live()?.trigger_renderdoc_capture()
    }

    pub fn trigger_renderdoc_capture(&self) {
        contain(
            op::TRIGGER_RENDERDOC_CAPTURE,
            self.try_trigger_renderdoc_capture(),
            (),
        );
    }

    // ═══════════════════════════════════════════════════════════
    //  Input forwarding
    // ═══════════════════════════════════════════════════════════

    pub fn try_key_event(&self, key_code: i32, down: bool) -> Result<()> {
        self.live()?.key_event(key_code, down)
    }

    pub fn key_event(&self, key_code: i32, down: bool) {
        contain(op::KEY_EVENT, self.try_key_event(key_code, down), ());
    }

    pub fn try_mouse_button_event(&self, position: Vector2, button: i32, down: bool) -> Result<()> {
        ensure(position.is_finite(), "non-finite position")?;
        self.live()?.mouse_button_event(position, button, down)
    }

    pub fn mouse_button_event(&self, position: Vector2, button: i32, down: bool) {
        contain(
            op::MOUSE_BUTTON_EVENT,
            self.try_mouse_button_event(position, button, down),
            (),
        );
    }

    pub fn try_mouse_double_click_event(&self, position: Vector2, button: i32) -> Result<()> {
        ensure(position.is_finite(), "non-finite position")?;
        self.live()?.mouse_double_click_event(position, button)
    }

    pub fn mouse_double_click_event(&self, position: Vector2, button: i32) {
        contain(
            op::MOUSE_DOUBLE_CLICK_EVENT,
            self.try_mouse_double_click_event(position, button),
            (),
        );
    }

    pub fn try_mouse_move_event(&self, position: Vector2) -> Result<()> {
        ensure(position.is_finite(), "non-finite position")?;
        self.live()?.mouse_move_event(position)
    }

    pub fn mouse_move_event(&self, position: Vector2) {
        contain(op::MOUSE_MOVE_EVENT, self.try_mouse_move_event(position), ());
    }

    pub fn try_mouse_scroll_event(&self, delta: i32) -> Result<()> {
        self.live()?.mouse_scroll_event(delta)
    }

    pub fn mouse_scroll_event(&self, delta: i32) {
        contain(op::MOUSE_SCROLL_EVENT, self.try_mouse_scroll_event(delta), ());
    }
}

// ── Tests ────────────────────────────────────────────────────
