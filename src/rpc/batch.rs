//! Batching helpers for array-valued RPCs.
//!
//! Large element/index/colour arrays are split into sequential
//! sub-calls of at most `batch_size` entries.  Aggregating calls are
//! recombined client-side:
//!
//! ```text
//! indices [0 ........................ 2N)
//!          └── chunk 0 [0, N) ──┘└── chunk 1 [N, 2N) ──┘
//!                 │                        │
//!           Box3 / first handle      Box3 / first handle
//!                 └──────── union / offsets ──────┘
//! ```

use super::types::{Box3, Handle};

/// Default maximum entries per sub-call.
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Split `items` into chunks of at most `batch_size` (minimum 1).
///
/// An empty slice yields no chunks.
pub fn chunks<T>(items: &[T], batch_size: usize) -> core::slice::Chunks<'_, T> {
    items.chunks(batch_size.max(1))
}

/// Split two parallel slices in lock-step.  Callers must have checked
/// that the lengths match.
pub fn paired_chunks<'a, A, B>(
    left: &'a [A],
    right: &'a [B],
    batch_size: usize,
) -> impl Iterator<Item = (&'a [A], &'a [B])> {
    chunks(left, batch_size).zip(chunks(right, batch_size))
}

/// Union of all boxes, `None` when there are none.
pub fn union_all<I: IntoIterator<Item = Box3>>(boxes: I) -> Option<Box3> {
    boxes.into_iter().reduce(|acc, b| acc.union(&b))
}

/// Reconstruct per-position handles for a chunk whose instances were
/// created sequentially starting at `first`.
pub fn handle_range(first: Handle, len: usize) -> impl Iterator<Item = Handle> {
    (0..len as u32).map(move |offset| first.wrapping_add(offset))
}

// ── Tests ────────────────────────────────────────────────────
