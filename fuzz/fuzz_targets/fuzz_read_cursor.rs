//! Fuzz target: reply decoding
//!
//! Arbitrary reply bytes must decode to a value or a typed
//! `MarshalError`, never a panic or an oversized allocation.
//!
//! cargo fuzz run fuzz_read_cursor

#![no_main]

use libfuzzer_sys::fuzz_target;
use ultra_client::error::MarshalError;
use ultra_client::rpc::marshal::{ReadCursor, decode_reply};
use ultra_client::rpc::types::{Box3, HitCheckResult, Segment, VimLoadingStatus};

/// Mixed sequential reads stop at the first error.
fn read_sequence(data: &[u8]) -> Result<(), MarshalError> {
    let mut c = ReadCursor::new(data);
    c.read_string()?;
    c.read_array::<Box3>()?;
    c.read_u64()?;
    c.finish()
}

fuzz_target!(|data: &[u8]| {
    let _ = decode_reply::<String>(data);
    let _ = decode_reply::<Vec<u32>>(data);
    let _ = decode_reply::<Box3>(data);
    let _ = decode_reply::<Segment>(data);
    let _ = decode_reply::<HitCheckResult>(data);
    let _ = decode_reply::<VimLoadingStatus>(data);
    let _ = read_sequence(data);
});
