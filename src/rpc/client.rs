//! RPC call layer: the fixed catalogue of remote procedures.
//!
//! Every call writes its operation name (the server's dispatch key)
//! followed by its arguments in declared order.  Void calls are
//! fire-and-forget; value calls await the correlated reply and decode
//! exactly one value of the declared type.
//!
//! This layer is a mechanical mapping from signatures to bytes: no
//! validation, no retry, no defaults.  Names and argument order must
//! stay byte-compatible with the server.

use super::marshal::{Marshal, WireDecode, decode_reply};
use super::transport::Transport;
use super::types::{
    Box3, Handle, HitCheckResult, Rgba32, RgbaColor, SectionBoxState, Segment, Vector2, Vector3,
    VimLoadingStatus,
};
use crate::error::{Error, Result};

/// Wire operation names.  This is the complete catalogue.
pub mod op {
    pub const CLEAR_MATERIAL_OVERRIDES: &str = "RPCClearMaterialOverrides";
    pub const CLEAR_SCENE: &str = "RPCClearScene";
    pub const CREATE_MATERIAL_INSTANCES: &str = "RPCCreateMaterialInstances";
    pub const CREATE_TEXT: &str = "RPCCreateText";
    pub const DESTROY_TEXT: &str = "RPCDestroyText";
    pub const ENABLE_SECTION_BOX: &str = "RPCEnableSectionBox";
    pub const FRAME_ALL: &str = "RPCFrameAll";
    pub const FRAME_BOX: &str = "RPCFrameBox";
    pub const FRAME_ELEMENTS: &str = "RPCFrameElements";
    pub const FRAME_VIM: &str = "RPCFrameVim";
    pub const GET_AABB_FOR_ALL: &str = "RPCGetAABBForAll";
    pub const GET_AABB_FOR_ELEMENTS: &str = "RPCGetAABBForElements";
    pub const GET_AABB_FOR_VIM: &str = "RPCGetAABBForVim";
    pub const GET_API_VERSION: &str = "RPCGetAPIVersion";
    pub const GET_CAMERA_POSITION: &str = "RPCGetCameraPosition";
    pub const GET_ELEMENT_COUNT_FOR_VIM: &str = "RPCGetElementCountForVim";
    pub const GET_ELEMENT_IDS: &str = "RPCGetElementIds";
    pub const GET_LAST_ERROR: &str = "RPCGetLastError";
    pub const GET_SECTION_BOX: &str = "RPCGetSectionBox";
    pub const GET_VIM_LOADING_STATE: &str = "RPCGetVimLoadingState";
    pub const KEY_EVENT: &str = "RPCKeyEvent";
    pub const LOAD_VIM: &str = "RPCLoadVim";
    pub const LOAD_VIM_URL: &str = "RPCLoadVimURL";
    pub const LOCK_IBL_ROTATION: &str = "RPCLockIblRotation";
    pub const MOUSE_BUTTON_EVENT: &str = "RPCMouseButtonEvent";
    pub const MOUSE_DOUBLE_CLICK_EVENT: &str = "RPCMouseDoubleClickEvent";
    pub const MOUSE_MOVE_EVENT: &str = "RPCMouseMoveEvent";
    pub const MOUSE_SCROLL_EVENT: &str = "RPCMouseScrollEvent";
    pub const MOVE_CAMERA_TO: &str = "RPCMoveCameraTo";
    pub const PAUSE_RENDERING: &str = "RPCPauseRendering";
    pub const PERFORM_HIT_TEST: &str = "RPCPerformHitTest";
    pub const SET_ASPECT_RATIO: &str = "RPCSetAspectRatio";
    pub const SET_CAMERA_MODE: &str = "RPCSetCameraMode";
    pub const SET_CAMERA_POSITION: &str = "RPCSetCameraPosition";
    pub const SET_CAMERA_SPEED: &str = "RPCSetCameraSpeed";
    pub const SET_GHOST_COLOR: &str = "RPCSetGhostColor";
    pub const SET_LIGHTING: &str = "RPCSetLighting";
    pub const SET_MATERIAL_OVERRIDES: &str = "RPCSetMaterialOverrides";
    pub const SET_SECTION_BOX: &str = "RPCSetSectionBox";
    pub const SET_STATE_ELEMENTS: &str = "RPCSetStateElements";
    pub const SET_STATE_VIM: &str = "RPCSetStateVim";
    pub const TRIGGER_RENDERDOC_CAPTURE: &str = "RPCTriggerRenderDocCapture";
    pub const UNLOAD_VIM: &str = "RPCUnloadVim";
}

/// Raw RPC client over a [`Transport`].
pub struct RpcClient<T> {
    transport: T,
}

impl<T: Transport> RpcClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Reflects the transport's connection state.
    pub fn connected(&self) -> bool {
        self.transport.is_connected()
    }

    fn begin(name: &str) -> Marshal {
        let mut m = Marshal::new();
        m.write_string(name);
        m
    }

    fn fire(&self, m: Marshal) -> Result<()> {
        self.transport
            .send(m.into_bytes())
            .map_err(|e| Error::transport(&e))
    }

    async fn call<R: WireDecode>(&self, m: Marshal) -> Result<R> {
        let reply = self
            .transport
            .request(m.into_bytes())
            .await
            .map_err(|e| Error::transport(&e))?;
        Ok(decode_reply(&reply)?)
    }

    // ── Scene & loading ───────────────────────────────────────

    pub async fn load_vim(&self, file_name: &str) -> Result<Handle> {
        let mut m = Self::begin(op::LOAD_VIM);
        m.write_string(file_name);
        self.call(m).await
    }

    pub async fn load_vim_url(&self, url: &str, auth_token: &str) -> Result<Handle> {
        let mut m = Self::begin(op::LOAD_VIM_URL);
        m.write_string(url);
        m.write_string(auth_token);
        self.call(m).await
    }

    pub async fn get_vim_loading_state(&self, vim: Handle) -> Result<VimLoadingStatus> {
        let mut m = Self::begin(op::GET_VIM_LOADING_STATE);
        m.write_u32(vim);
        self.call(m).await
    }

    pub async fn get_element_count_for_vim(&self, vim: Handle) -> Result<u32> {
        let mut m = Self::begin(op::GET_ELEMENT_COUNT_FOR_VIM);
        m.write_u32(vim);
        self.call(m).await
    }

    pub async fn get_element_ids(&self, vim: Handle) -> Result<Vec<u64>> {
        let mut m = Self::begin(op::GET_ELEMENT_IDS);
        m.write_u32(vim);
        self.call(m).await
    }

    pub async fn get_last_error(&self) -> Result<String> {
        self.call(Self::begin(op::GET_LAST_ERROR)).await
    }

    pub async fn get_api_version(&self) -> Result<String> {
        self.call(Self::begin(op::GET_API_VERSION)).await
    }

    pub fn unload_vim(&self, vim: Handle) -> Result<()> {
        let mut m = Self::begin(op::UNLOAD_VIM);
        m.write_u32(vim);
        self.fire(m)
    }

    pub fn clear_scene(&self) -> Result<()> {
        self.fire(Self::begin(op::CLEAR_SCENE))
    }

    // ── Visibility ────────────────────────────────────────────

    pub fn set_state_vim(&self, vim: Handle, state: u32) -> Result<()> {
        let mut m = Self::begin(op::SET_STATE_VIM);
        m.write_u32(vim);
        m.write_u32(state);
        self.fire(m)
    }

    pub fn set_state_elements(&self, vim: Handle, element_indices: &[u32], state: u32) -> Result<()> {
        let mut m = Self::begin(op::SET_STATE_ELEMENTS);
        m.write_u32(vim);
        m.write_array(element_indices);
        m.write_u32(state);
        self.fire(m)
    }

    pub fn set_ghost_color(&self, color: RgbaColor) -> Result<()> {
        let mut m = Self::begin(op::SET_GHOST_COLOR);
        m.write(&color);
        self.fire(m)
    }

    // ── Materials ─────────────────────────────────────────────

    /// Returns the handle of the first instance; the rest follow sequentially.
    pub async fn create_material_instances(&self, smoothness: f32, colors: &[Rgba32]) -> Result<Handle> {
        let mut m = Self::begin(op::CREATE_MATERIAL_INSTANCES);
        m.write_f32(smoothness);
        m.write_array(colors);
        self.call(m).await
    }

    pub fn set_material_overrides(
        &self,
        vim: Handle,
        element_indices: &[u32],
        material_handles: &[Handle],
    ) -> Result<()> {
        let mut m = Self::begin(op::SET_MATERIAL_OVERRIDES);
        m.write_u32(vim);
        m.write_array(element_indices);
        m.write_array(material_handles);
        self.fire(m)
    }

    pub fn clear_material_overrides(&self, vim: Handle) -> Result<()> {
        let mut m = Self::begin(op::CLEAR_MATERIAL_OVERRIDES);
        m.write_u32(vim);
        self.fire(m)
    }

    // ── Bounds & framing ──────────────────────────────────────

    pub async fn get_aabb_for_all(&self) -> Result<Box3> {
        self.call(Self::begin(op::GET_AABB_FOR_ALL)).await
    }

    pub async fn get_aabb_for_vim(&self, vim: Handle) -> Result<Box3> {
        let mut m = Self::begin(op::GET_AABB_FOR_VIM);
        m.write_u32(vim);
        self.call(m).await
    }

    pub async fn get_aabb_for_elements(&self, vim: Handle, element_indices: &[u32]) -> Result<Box3> {
        let mut m = Self::begin(op::GET_AABB_FOR_ELEMENTS);
        m.write_u32(vim);
        m.write_array(element_indices);
        self.call(m).await
    }

    pub async fn frame_all(&self, blend_time: f32) -> Result<Segment> {
        let mut m = Self::begin(op::FRAME_ALL);
        m.write_f32(blend_time);
        self.call(m).await
    }

    pub async fn frame_box(&self, bounds: Box3, blend_time: f32) -> Result<Segment> {
        let mut m = Self::begin(op::FRAME_BOX);
        m.write(&bounds);
        m.write_f32(blend_time);
        self.call(m).await
    }

    pub async fn frame_vim(&self, vim: Handle, blend_time: f32) -> Result<Segment> {
        let mut m = Self::begin(op::FRAME_VIM);
        m.write_u32(vim);
        m.write_f32(blend_time);
        self.call(m).await
    }

    pub async fn frame_elements(
        &self,
        vim: Handle,
        element_indices: &[u32],
        blend_time: f32,
    ) -> Result<Segment> {
        let mut m = Self::begin(op::FRAME_ELEMENTS);
        m.write_u32(vim);
        m.write_array(element_indices);
        m.write_f32(blend_time);
        self.call(m).await
    }

    // ── Camera ────────────────────────────────────────────────

    pub async fn get_camera_position(&self) -> Result<Segment> {
        self.call(Self::begin(op::GET_CAMERA_POSITION)).await
    }

    pub fn set_camera_position(&self, segment: Segment, blend_time: f32) -> Result<()> {
        let mut m = Self::begin(op::SET_CAMERA_POSITION);
        m.write(&segment);
        m.write_f32(blend_time);
        self.fire(m)
    }

    pub fn move_camera_to(
        &self,
        use_position: bool,
        use_target: bool,
        position: Vector3,
        target: Vector3,
        blend_time: f32,
    ) -> Result<()> {
        let mut m = Self::begin(op::MOVE_CAMERA_TO);
        m.write_bool(use_position);
        m.write_bool(use_target);
        m.write(&position);
        m.write(&target);
        m.write_f32(blend_time);
        self.fire(m)
    }

    pub fn set_camera_mode(&self, orbit: bool) -> Result<()> {
        let mut m = Self::begin(op::SET_CAMERA_MODE);
        m.write_bool(orbit);
        self.fire(m)
    }

    pub fn set_camera_speed(&self, speed: f32) -> Result<()> {
        let mut m = Self::begin(op::SET_CAMERA_SPEED);
        m.write_f32(speed);
        self.fire(m)
    }

    pub fn set_aspect_ratio(&self, width: u32, height: u32) -> Result<()> {
        let mut m = Self::begin(op::SET_ASPECT_RATIO);
        m.write_u32(width);
        m.write_u32(height);
        self.fire(m)
    }

    // ── Hit testing ───────────────────────────────────────────

    pub async fn perform_hit_test(&self, position: Vector2) -> Result<HitCheckResult> {
        let mut m = Self::begin(op::PERFORM_HIT_TEST);
        m.write(&position);
        self.call(m).await
    }

    // ── Section box ───────────────────────────────────────────

    pub fn enable_section_box(&self, enable: bool) -> Result<()> {
        let mut m = Self::begin(op::ENABLE_SECTION_BOX);
        m.write_bool(enable);
        self.fire(m)
    }

    pub fn set_section_box(&self, state: SectionBoxState) -> Result<()> {
        let mut m = Self::begin(op::SET_SECTION_BOX);
        m.write(&state);
        self.fire(m)
    }

    pub async fn get_section_box(&self) -> Result<SectionBoxState> {
        self.call(Self::begin(op::GET_SECTION_BOX)).await
    }

    // ── Text labels ───────────────────────────────────────────

    pub async fn create_text(&self, position: Vector3, color: Rgba32, text: &str) -> Result<Handle> {
        let mut m = Self::begin(op::CREATE_TEXT);
        m.write(&position);
        m.write(&color);
        m.write_string(text);
        self.call(m).await
    }

    pub fn destroy_text(&self, text: Handle) -> Result<()> {
        let mut m = Self::begin(op::DESTROY_TEXT);
        m.write_u32(text);
        self.fire(m)
    }

    // ── Rendering & lighting ──────────────────────────────────

    pub fn set_lighting(
        &self,
        tone_mapping_white_point: f32,
        hdr_scale: f32,
        hdr_background_scale: f32,
        hdr_background_saturation: f32,
        background_blur: f32,
        background_color: RgbaColor,
    ) -> Result<()> {
        let mut m = Self::begin(op::SET_LIGHTING);
        m.write_f32(tone_mapping_white_point);
        m.write_f32(hdr_scale);
        m.write_f32(hdr_background_scale);
        m.write_f32(hdr_background_saturation);
        m.write_f32(background_blur);
        m.write(&background_color);
        self.fire(m)
    }

    pub fn lock_ibl_rotation(&self, lock: bool) -> Result<()> {
        let mut m = Self::begin(op::LOCK_IBL_ROTATION);
        m.write_bool(lock);
        self.fire(m)
    }

    pub fn pause_rendering(&self, pause: bool) -> Result<()> {
        let mut m = Self::begin(op::PAUSE_RENDERING);
        m.write_bool(pause);
        self.fire(m)
    }

    pub fn trigger_renderdoc_capture(&self) -> Result<()> {
        self.fire(Self::begin(op::TRIGGER_RENDERDOC_CAPTURE))
    }

    // ── Input forwarding ──────────────────────────────────────

    pub fn key_event(&self, key_code: i32, down: bool) -> Result<()> {
        let mut m = Self::begin(op::KEY_EVENT);
        m.write_i32(key_code);
        m.write_bool(down);
        self.fire(m)
    }

    pub fn mouse_button_event(&self, position: Vector2, button: i32, down: bool) -> Result<()> {
        let mut m = Self::begin(op::MOUSE_BUTTON_EVENT);
        m.write(&position);
        m.write_i32(button);
        m.write_bool(down);
        self.fire(m)
    }

    pub fn mouse_double_click_event(&self, position: Vector2, button: i32) -> Result<()> {
        let mut m = Self::begin(op::MOUSE_DOUBLE_CLICK_EVENT);
        m.write(&position);
        m.write_i32(button);
        self.fire(m)
    }

    pub fn mouse_move_event(&self, position: Vector2) -> Result<()> {
        let mut m = Self::begin(op::MOUSE_MOVE_EVENT);
        m.write(&position);
        self.fire(m)
    }

    pub fn mouse_scroll_event(&self, delta: i32) -> Result<()> {
        let mut m = Self::begin(op::MOUSE_SCROLL_EVENT);
        m.write_i32(delta);
        self.fire(m)
    }
}

// ── Tests ────────────────────────────────────────────────────
