//! # Scull Storage
//!
//! A sparse, growable, in-memory byte store.
//!
//! The linear address space of a [`Store`] is a chain of segments
//! (quantum sets). Each segment holds a fixed array of optional blocks
//! (quanta) of a fixed size. Segments and blocks are allocated on first
//! write; reading a range that was never written reports a hole rather
//! than inventing data.
//!
//! ## Design Principles
//!
//! - One mutex per store serializes every chain walk and transfer
//! - A single read or write never crosses a block edge; callers loop
//! - The logical size only grows, until [`StoreGuard::trim`]
//! - Caller memory is reached only through [`ByteSink`] / [`ByteSource`]
//! - Blocks, slot arrays and segment nodes are reserved fallibly; a
//!   refusal surfaces as [`StoreError::AllocationFailure`]
//!
//! ## Example
//!
//! ```rust
//! use scull_storage::{ReadOutcome, Store, StoreConfig};
//!
//! let store = Store::new(StoreConfig::new().quantum_size(4).qset_size(2)).unwrap();
//!
//! // A write stops at the block edge.
//! assert_eq!(store.write(2, b"abcdef".as_slice(), 6).unwrap(), 2);
//! assert_eq!(store.size(), 4);
//!
//! let mut out = Vec::new();
//! assert_eq!(store.read(2, &mut out, 8).unwrap(), ReadOutcome::Transferred(2));
//! assert_eq!(out, b"ab");
//! assert_eq!(store.read(4, &mut out, 8).unwrap(), ReadOutcome::EndOfData);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod alloc;
mod block;
mod buffer;
mod config;
mod error;
mod geometry;
mod lock;
mod seek;
mod segment;
mod snapshot;
mod store;

pub use buffer::{ByteSink, ByteSource};
pub use config::StoreConfig;
pub use error::{CopyFault, StoreError, StoreResult};
pub use geometry::{Geometry, Position, DEFAULT_QSET_SIZE, DEFAULT_QUANTUM_SIZE};
pub use lock::{Interrupt, LOCK_POLL_INTERVAL};
pub use seek::{split_seek, SeekBase};
pub use segment::Segment;
pub use snapshot::{SegmentSnapshot, StoreSnapshot};
pub use store::{ReadOutcome, Store, StoreGuard};
