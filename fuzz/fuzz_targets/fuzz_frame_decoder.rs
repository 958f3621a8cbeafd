//! Fuzz target: `FrameDecoder::feed`
//!
//! Drives arbitrary byte sequences into the streaming frame decoder and
//! asserts that it never panics, never yields an empty or oversized
//! payload, and behaves the same after a reset.
//!
//! cargo fuzz run fuzz_frame_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use ultra_client::rpc::codec::FrameDecoder;

/// Keeps allocations small while still exercising the oversize path.
const FUZZ_MAX_FRAME: usize = 4096;

fuzz_target!(|data: &[u8]| {
    let mut decoder = FrameDecoder::with_max_frame(FUZZ_MAX_FRAME);

    let whole = decoder.feed(data);
    for payload in &whole {
        assert!(!payload.is_empty(), "decoder must not yield empty payload");
        assert!(payload.len() <= FUZZ_MAX_FRAME, "payload exceeds max frame");
    }

    // Byte-at-a-time feeding must yield the same frames.
    decoder.reset();
    let mut trickled = Vec::new();
    for b in data {
        trickled.extend(decoder.feed(core::slice::from_ref(b)));
    }
    assert_eq!(whole, trickled);
});
