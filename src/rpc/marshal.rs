//! Binary marshalling for RPC payloads.
//!
//! Wire layout (all numerics little-endian):
//! ```text
//! bool    ┌──────────────┐        string ┌────────────┬───────────┬────┐
//!         │ u32 (0 / 1)  │               │ len+1 (4B) │ UTF-8 (N) │ \0 │
//!         └──────────────┘               └────────────┴───────────┴────┘
//! u64     ┌──────────┬──────────┐        array  ┌───────────┬──────────────┐
//!         │ low u32  │ high u32 │               │ count (4B)│ elements ... │
//!         └──────────┴──────────┘               └───────────┴──────────────┘
//! ```
//!
//! Structs are the concatenation of their fields in declaration order with
//! no type tag; the call signature is the only description of a reply.
//! Writes go through [`Marshal`], reads through [`ReadCursor`], which
//! bounds-checks every access.

use crate::error::MarshalError;

/// Initial encode buffer size.
const INITIAL_CAPACITY: usize = 64;

// ═══════════════════════════════════════════════════════════════
//  Encoding
// ═══════════════════════════════════════════════════════════════

/// Growable encode buffer.
#[derive(Debug, Clone)]
pub struct Marshal {
    buf: Vec<u8>,
}

impl Marshal {
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity.max(1)),
        }
    }

    /// Guarantee room for `additional` bytes, doubling capacity as needed.
    fn ensure(&mut self, additional: usize) {
        let required = self.buf.len() + additional;
        let mut capacity = self.buf.capacity().max(1);
        if required <= capacity {
            return;
        }
        while capacity < required {
            capacity *= 2;
        }
        self.buf.reserve_exact(capacity - self.buf.len());
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.ensure(bytes.len());
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.write_u32(u32::from(value));
    }

    pub fn write_i32(&mut self, value: i32) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Two 32-bit words, low word first.
    pub fn write_u64(&mut self, value: u64) {
        self.write_u32(value as u32);
        self.write_u32((value >> 32) as u32);
    }

    pub fn write_string(&mut self, value: &str) {
        let bytes = value.as_bytes();
        self.write_u32(bytes.len() as u32 + 1);
        self.ensure(bytes.len() + 1);
        self.buf.extend_from_slice(bytes);
        self.buf.push(0);
    }

    pub fn write_array<T: WireEncode>(&mut self, items: &[T]) {
        self.write_u32(items.len() as u32);
        for item in items {
            item.encode(self);
        }
    }

    pub fn write<T: WireEncode + ?Sized>(&mut self, value: &T) {
        value.encode(self);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

impl Default for Marshal {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Decoding
// ═══════════════════════════════════════════════════════════════

/// Bounds-checked read cursor over a reply buffer.
#[derive(Debug, Clone)]
pub struct ReadCursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ReadCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn position(&self) -> usize {
        self.offset
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], MarshalError> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(MarshalError::UnexpectedEof {
                needed: n,
                remaining,
            });
        }
        let slice = &self.data[self.offset..self.offset + n];
        self.offset += n;
        Ok(slice)
    }

    fn take_word(&mut self) -> Result<[u8; 4], MarshalError> {
        let mut word = [0u8; 4];
        word.copy_from_slice(self.take(4)?);
        Ok(word)
    }

    pub fn read_bool(&mut self) -> Result<bool, MarshalError> {
        Ok(self.read_u32()? != 0)
    }

    pub fn read_i32(&mut self) -> Result<i32, MarshalError> {
        Ok(i32::from_le_bytes(self.take_word()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, MarshalError> {
        Ok(u32::from_le_bytes(self.take_word()?))
    }

    pub fn read_f32(&mut self) -> Result<f32, MarshalError> {
        Ok(f32::from_le_bytes(self.take_word()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, MarshalError> {
        let low = u64::from(self.read_u32()?);
        let high = u64::from(self.read_u32()?);
        Ok(low | (high << 32))
    }

    pub fn read_string(&mut self) -> Result<String, MarshalError> {
        let len = self.read_u32()? as usize;
        if len == 0 {
            return Err(MarshalError::EmptyStringPrefix);
        }
        let bytes = self.take(len)?;
        let (text, terminator) = bytes.split_at(len - 1);
        if terminator != [0u8] {
            return Err(MarshalError::MissingTerminator);
        }
        core::str::from_utf8(text)
            .map(str::to_owned)
            .map_err(|_| MarshalError::InvalidUtf8)
    }

    pub fn read_array<T: WireDecode>(&mut self) -> Result<Vec<T>, MarshalError> {
        let count = self.read_u32()? as usize;
        // Every element is at least one word; refuse counts the buffer cannot hold.
        if count > self.remaining() / 4 {
            return Err(MarshalError::UnexpectedEof {
                needed: count.saturating_mul(4),
                remaining: self.remaining(),
            });
        }
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(T::decode(self)?);
        }
        Ok(items)
    }

    pub fn read<T: WireDecode>(&mut self) -> Result<T, MarshalError> {
        T::decode(self)
    }

    /// Succeeds only if the whole buffer was consumed.
    pub fn finish(self) -> Result<(), MarshalError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(MarshalError::TrailingBytes(n)),
        }
    }
}

/// Decode exactly one `T` from `data`.
pub fn decode_reply<T: WireDecode>(data: &[u8]) -> Result<T, MarshalError> {
    let mut cursor = ReadCursor::new(data);
    let value = T::decode(&mut cursor)?;
    cursor.finish()?;
    Ok(value)
}

// ═══════════════════════════════════════════════════════════════
//  Wire traits
// ═══════════════════════════════════════════════════════════════

pub trait WireEncode {
    fn encode(&self, m: &mut Marshal);
}

pub trait WireDecode: Sized {
    fn decode(c: &mut ReadCursor<'_>) -> Result<Self, MarshalError>;
}

macro_rules! wire_primitive {
    ($ty:ty, $write:ident, $read:ident) => {
        impl WireEncode for $ty {
            fn encode(&self, m: &mut Marshal) {
                m.$write(*self);
            }
        }

        impl WireDecode for $ty {
            fn decode(c: &mut ReadCursor<'_>) -> Result<Self, MarshalError> {
                c.$read()
            }
        }
    };
}

wire_primitive!(bool, write_bool, read_bool);
wire_primitive!(i32, write_i32, read_i32);
wire_primitive!(u32, write_u32, read_u32);
wire_primitive!(f32, write_f32, read_f32);
wire_primitive!(u64, write_u64, read_u64);

impl WireEncode for str {
    fn encode(&self, m: &mut Marshal) {
        m.write_string(self);
    }
}

impl WireEncode for String {
    fn encode(&self, m: &mut Marshal) {
        m.write_string(self);
    }
}

impl WireDecode for String {
    fn decode(c: &mut ReadCursor<'_>) -> Result<Self, MarshalError> {
        c.read_string()
    }
}

impl<T: WireEncode> WireEncode for [T] {
    fn encode(&self, m: &mut Marshal) {
        m.write_array(self);
    }
}

impl<T: WireEncode> WireEncode for Vec<T> {
    fn encode(&self, m: &mut Marshal) {
        m.write_array(self);
    }
}

impl<T: WireDecode> WireDecode for Vec<T> {
    fn decode(c: &mut ReadCursor<'_>) -> Result<Self, MarshalError> {
        c.read_array()
    }
}

// ── Tests ────────────────────────────────────────────────────
