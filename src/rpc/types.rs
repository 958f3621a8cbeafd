//! Fixed-size value types carried by the RPC catalogue.
//!
//! Each type encodes as the concatenation of its fields in declaration
//! order.  Field order here IS the wire order; do not reorder.

use serde::{Deserialize, Serialize};

use super::marshal::{Marshal, ReadCursor, WireDecode, WireEncode};
use crate::error::MarshalError;

/// Opaque remote-side object id.
pub type Handle = u32;

/// Sentinel for "no object".
pub const INVALID_HANDLE: Handle = u32::MAX;

// ---------------------------------------------------------------------------
// Vectors, boxes, segments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn min(self, other: Self) -> Self {
        Self::new(
            self.x.min(other.x),
            self.y.min(other.y),
            self.z.min(other.z),
        )
    }

    pub fn max(self, other: Self) -> Self {
        Self::new(
            self.x.max(other.x),
            self.y.max(other.y),
            self.z.max(other.z),
        )
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Box3 {
    pub min: Vector3,
    pub max: Vector3,
}

impl Box3 {
    pub const fn new(min: Vector3, max: Vector3) -> Self {
        Self { min, max }
    }

    /// Finite corners with `min <= max` on every axis.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite()
            && self.max.is_finite()
            && self.min.x <= self.max.x
            && self.min.y <= self.max.y
            && self.min.z <= self.max.z
    }

    pub fn union(&self, other: &Self) -> Self {
        Self::new(self.min.min(other.min), self.max.max(other.max))
    }
}

/// Camera placement: eye position and look-at target.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Segment {
    pub origin: Vector3,
    pub target: Vector3,
}

impl Segment {
    pub const fn new(origin: Vector3, target: Vector3) -> Self {
        Self { origin, target }
    }

    pub fn is_finite(&self) -> bool {
        self.origin.is_finite() && self.target.is_finite()
    }
}

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

/// Linear-space color, channels in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RgbaColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl RgbaColor {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn is_finite(&self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }

    pub fn clamped(&self) -> Self {
        Self::new(
            self.r.clamp(0.0, 1.0),
            self.g.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
            self.a.clamp(0.0, 1.0),
        )
    }
}

impl Default for RgbaColor {
    fn default() -> Self {
        Self::new(1.0, 1.0, 1.0, 1.0)
    }
}

/// Packed 8-bit-per-channel color, `0xRRGGBBAA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Rgba32(pub u32);

impl Rgba32 {
    pub const fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self((r as u32) << 24 | (g as u32) << 16 | (b as u32) << 8 | a as u32)
    }

    pub const fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn a(self) -> u8 {
        self.0 as u8
    }

    /// Parse `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let value = u32::from_str_radix(digits, 16).ok()?;
        match digits.len() {
            6 => Some(Self(value << 8 | 0xFF)),
            8 => Some(Self(value)),
            _ => None,
        }
    }

    pub fn to_linear(self) -> RgbaColor {
        let f = |c: u8| f32::from(c) / 255.0;
        RgbaColor::new(f(self.r()), f(self.g()), f(self.b()), f(self.a()))
    }
}

impl From<RgbaColor> for Rgba32 {
    fn from(c: RgbaColor) -> Self {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::from_rgba(q(c.r), q(c.g), q(c.b), q(c.a))
    }
}

// ---------------------------------------------------------------------------
// Query results
// ---------------------------------------------------------------------------

/// Result of a screen-space pick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitCheckResult {
    pub vim_handle: Handle,
    pub element_index: u32,
    pub scene_element_index: u32,
    pub world_position: Vector3,
    pub world_normal: Vector3,
}

impl HitCheckResult {
    pub fn is_hit(&self) -> bool {
        self.vim_handle != INVALID_HANDLE
    }
}

/// Remote loading phase of a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum VimLoadingState {
    Unknown = 0,
    Loading = 1,
    Downloading = 2,
    Done = 3,
    FailedToDownload = 4,
    FailedToLoad = 5,
}

impl VimLoadingState {
    pub fn from_u32(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Unknown),
            1 => Some(Self::Loading),
            2 => Some(Self::Downloading),
            3 => Some(Self::Done),
            4 => Some(Self::FailedToDownload),
            5 => Some(Self::FailedToLoad),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VimLoadingStatus {
    pub state: VimLoadingState,
    pub progress: f32,
}

impl Default for VimLoadingStatus {
    fn default() -> Self {
        Self {
            state: VimLoadingState::Unknown,
            progress: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SectionBoxState {
    pub visible: bool,
    pub interactive: bool,
    pub clip: bool,
    pub bounds: Box3,
}

// ═══════════════════════════════════════════════════════════════
//  Wire impls
// ═══════════════════════════════════════════════════════════════

macro_rules! wire_struct {
    ($ty:ident { $($field:ident),+ $(,)? }) => {
        impl WireEncode for $ty {
            fn encode(&self, m: &mut Marshal) {
                $( m.write(&self.$field); )+
            }
        }

        impl WireDecode for $ty {
            fn decode(c: &mut ReadCursor<'_>) -> Result<Self, MarshalError> {
                Ok(Self { $( $field: c.read()?, )+ })
            }
        }
    };
}

wire_struct!(Vector2 { x, y });
wire_struct!(Vector3 { x, y, z });
wire_struct!(Box3 { min, max });
wire_struct!(Segment { origin, target });
wire_struct!(RgbaColor { r, g, b, a });
wire_struct!(HitCheckResult {
    vim_handle,
    element_index,
    scene_element_index,
    world_position,
    world_normal,
});
wire_struct!(VimLoadingStatus { state, progress });
wire_struct!(SectionBoxState {
    visible,
    interactive,
    clip,
    bounds,
});

impl WireEncode for Rgba32 {
    fn encode(&self, m: &mut Marshal) {
        m.write_u32(self.0);
    }
}

impl WireDecode for Rgba32 {
    fn decode(c: &mut ReadCursor<'_>) -> Result<Self, MarshalError> {
        c.read_u32().map(Self)
    }
}

impl WireEncode for VimLoadingState {
    fn encode(&self, m: &mut Marshal) {
        m.write_u32(*self as u32);
    }
}

impl WireDecode for VimLoadingState {
    fn decode(c: &mut ReadCursor<'_>) -> Result<Self, MarshalError> {
        let raw = c.read_u32()?;
        Self::from_u32(raw).ok_or(MarshalError::UnknownDiscriminant(raw))
    }
}

// ── Tests ────────────────────────────────────────────────────
