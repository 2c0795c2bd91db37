//! Property tests for store growth, holes and block-edge clamping.

use proptest::prelude::*;
use scull_storage::{Geometry, ReadOutcome, Store, StoreConfig};
use scull_testkit::prelude::*;
use std::collections::BTreeSet;

/// Reference model: the bytes written plus the set of allocated blocks,
/// numbered across the whole address space.
struct Model {
    bytes: Vec<u8>,
    blocks: BTreeSet<u64>,
    quantum: u64,
}

impl Model {
    fn new(geometry: Geometry) -> Self {
        Self {
            bytes: Vec::new(),
            blocks: BTreeSet::new(),
            quantum: geometry.quantum_size as u64,
        }
    }

    fn apply(&mut self, op: &WriteOp) {
        let end = op.end() as usize;
        if self.bytes.len() < end {
            self.bytes.resize(end, 0);
        }
        self.bytes[op.offset as usize..end].copy_from_slice(&op.data);
        for block in op.offset / self.quantum..=(op.end() - 1) / self.quantum {
            self.blocks.insert(block);
        }
    }
}

fn store_for(geometry: Geometry) -> Store {
    Store::new(StoreConfig::new().geometry(geometry)).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_size_is_max_end_and_monotonic(
        geometry in geometry_strategy(),
        ops in write_ops_strategy(300, 40, 12),
    ) {
        let store = store_for(geometry);
        let mut expected = 0u64;
        for op in &ops {
            let before = store.size();
            write_fully(&store, op.offset, &op.data).unwrap();
            expected = expected.max(op.end());
            prop_assert!(store.size() >= before);
            prop_assert_eq!(store.size(), expected);
        }
    }

    #[test]
    fn prop_reads_match_model(
        geometry in geometry_strategy(),
        ops in write_ops_strategy(300, 40, 12),
    ) {
        let store = store_for(geometry);
        let mut model = Model::new(geometry);
        for op in &ops {
            write_fully(&store, op.offset, &op.data).unwrap();
            model.apply(op);
        }

        let size = store.size();
        let mut pos = 0u64;
        while pos < size {
            let mut out = Vec::new();
            let outcome = store.read(pos, &mut out, usize::MAX).unwrap();
            let block = pos / model.quantum;
            let room = model.quantum - pos % model.quantum;
            if model.blocks.contains(&block) {
                let expect = room.min(size - pos) as usize;
                prop_assert_eq!(outcome, ReadOutcome::Transferred(expect));
                prop_assert_eq!(&out[..], &model.bytes[pos as usize..pos as usize + expect]);
            } else {
                prop_assert_eq!(outcome, ReadOutcome::Hole);
                prop_assert!(out.is_empty());
            }
            pos += room;
        }
        prop_assert_eq!(store.read(size, &mut Vec::new(), 1).unwrap(), ReadOutcome::EndOfData);
        prop_assert_eq!(store.snapshot().block_count(), model.blocks.len());
    }

    #[test]
    fn prop_single_transfer_never_crosses_block_edge(
        geometry in geometry_strategy(),
        offset in offset_strategy(500),
        data in data_strategy(100),
    ) {
        let store = store_for(geometry);
        let quantum = geometry.quantum_size;
        let room = quantum - (offset % quantum as u64) as usize;

        let written = store.write(offset, data.as_slice(), data.len()).unwrap();
        prop_assert_eq!(written, data.len().min(room));

        let mut out = Vec::new();
        let outcome = store.read(offset, &mut out, data.len()).unwrap();
        if written == 0 {
            prop_assert_eq!(outcome, ReadOutcome::EndOfData);
        } else {
            prop_assert_eq!(outcome, ReadOutcome::Transferred(written));
            prop_assert_eq!(&out[..], &data[..written]);
        }
    }

    #[test]
    fn prop_trim_resets_everything(
        config in store_config_strategy(),
        ops in write_ops_strategy(300, 40, 8),
    ) {
        let store = Store::new(config).unwrap();
        for op in &ops {
            write_fully(&store, op.offset, &op.data).unwrap();
        }
        store.trim();
        let snapshot = store.snapshot();
        prop_assert_eq!(store.size(), 0);
        prop_assert!(snapshot.is_empty());
        prop_assert_eq!(snapshot.allocated_bytes, 0);
        prop_assert_eq!(store.read(0, &mut Vec::new(), 10).unwrap(), ReadOutcome::EndOfData);

        store.trim();
        prop_assert_eq!(store.snapshot(), snapshot);
    }

    #[test]
    fn prop_read_clamps_to_size(
        geometry in geometry_strategy(),
        data in prop::collection::vec(any::<u8>(), 1..200),
        offset in offset_strategy(250),
        want in 0usize..300,
    ) {
        let store = store_for(geometry);
        write_fully(&store, 0, &data).unwrap();

        let mut out = Vec::new();
        let outcome = store.read(offset, &mut out, want).unwrap();
        if offset >= data.len() as u64 {
            prop_assert_eq!(outcome, ReadOutcome::EndOfData);
        } else {
            prop_assert!(outcome.len() <= want);
            prop_assert!(offset + outcome.len() as u64 <= data.len() as u64);
            prop_assert_eq!(&out[..], &data[offset as usize..offset as usize + outcome.len()]);
        }
    }
}
