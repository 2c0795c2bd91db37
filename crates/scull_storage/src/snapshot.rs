//! Structural snapshots of a store's chain, for diagnostics.

use crate::geometry::Geometry;
use crate::segment::Segment;
use serde::Serialize;

/// Read-only picture of a store taken under its lock.
///
/// Carries counts and presence flags only; nothing in it refers back
/// into the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreSnapshot {
    /// Geometry in effect when the snapshot was taken.
    pub geometry: Geometry,
    /// Logical size in bytes.
    pub size: u64,
    /// Bytes held by blocks, slot arrays and segment nodes.
    pub allocated_bytes: usize,
    /// One entry per segment, head first.
    pub segments: Vec<SegmentSnapshot>,
}

/// Shape of one segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentSnapshot {
    /// Position in the chain.
    pub index: usize,
    /// Byte offset where this segment's stripe starts.
    pub start: u64,
    /// Length of the slot array, or `None` if it was never allocated.
    pub slot_count: Option<usize>,
    /// Slots holding a block.
    pub blocks: Vec<usize>,
}

impl StoreSnapshot {
    pub(crate) fn capture<'a>(
        geometry: Geometry,
        size: u64,
        allocated_bytes: usize,
        segments: impl Iterator<Item = &'a Segment>,
    ) -> Self {
        let stripe = geometry.stripe_len();
        let segments = segments
            .enumerate()
            .map(|(index, segment)| SegmentSnapshot {
                index,
                start: index as u64 * stripe,
                slot_count: segment.slot_count(),
                blocks: segment.block_slots().collect(),
            })
            .collect();

        Self {
            geometry,
            size,
            allocated_bytes,
            segments,
        }
    }

    /// Number of segments in the chain.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Number of blocks across all segments.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.segments.iter().map(|s| s.blocks.len()).sum()
    }

    /// Returns true if the chain holds no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
