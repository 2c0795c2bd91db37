//! Property-based test generators using proptest.
//!
//! Geometries are kept small so that random offsets routinely cross
//! block and segment edges.

use proptest::prelude::*;
use scull_storage::{Geometry, StoreConfig};

/// A single write to replay against a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOp {
    /// Starting byte offset.
    pub offset: u64,
    /// Bytes to write.
    pub data: Vec<u8>,
}

impl WriteOp {
    /// One past the last byte written.
    pub fn end(&self) -> u64 {
        self.offset + self.data.len() as u64
    }
}

/// Strategy for small valid geometries.
pub fn geometry_strategy() -> impl Strategy<Value = Geometry> {
    (1usize..=32, 1usize..=8).prop_map(|(quantum, qset)| Geometry::new(quantum, qset))
}

/// Strategy for store configurations over [`geometry_strategy`].
pub fn store_config_strategy() -> impl Strategy<Value = StoreConfig> {
    geometry_strategy().prop_map(|geometry| StoreConfig::new().geometry(geometry))
}

/// Strategy for offsets below `max`.
pub fn offset_strategy(max: u64) -> impl Strategy<Value = u64> {
    0..max
}

/// Strategy for arbitrary write payloads, possibly empty.
pub fn data_strategy(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Strategy for one non-empty write landing below `max_offset`.
pub fn write_op_strategy(max_offset: u64, max_len: usize) -> impl Strategy<Value = WriteOp> {
    (
        offset_strategy(max_offset),
        prop::collection::vec(any::<u8>(), 1..=max_len.max(1)),
    )
        .prop_map(|(offset, data)| WriteOp { offset, data })
}

/// Strategy for a sequence of writes.
pub fn write_ops_strategy(
    max_offset: u64,
    max_len: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<WriteOp>> {
    prop::collection::vec(write_op_strategy(max_offset, max_len), 1..=max_ops.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::strategy::ValueTree;
    use proptest::test_runner::TestRunner;

    #[test]
    fn generated_geometries_are_valid() {
        let mut runner = TestRunner::default();
        for _ in 0..50 {
            let geometry = geometry_strategy()
                .new_tree(&mut runner)
                .unwrap()
                .current();
            assert!(geometry.validate().is_ok());
        }
    }

    #[test]
    fn write_ops_are_bounded() {
        let mut runner = TestRunner::default();
        for _ in 0..50 {
            let op = write_op_strategy(100, 10)
                .new_tree(&mut runner)
                .unwrap()
                .current();
            assert!(op.offset < 100);
            assert!(!op.data.is_empty() && op.data.len() <= 10);
        }
    }
}
