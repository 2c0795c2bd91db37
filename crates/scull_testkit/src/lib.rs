//! # Scull Testkit
//!
//! Test utilities for scull stores and devices.
//!
//! This crate provides:
//! - Small-geometry stores and whole-range read/write helpers
//! - Copy buffers that fault after a chosen number of bytes
//! - Property-based test generators using proptest
//! - Stress testing utilities
//!
//! ## Usage
//!
//! ```rust
//! use scull_testkit::prelude::*;
//!
//! let store = small_store();
//! write_fully(&store, 0, &pattern(100)).unwrap();
//! assert_eq!(store.size(), 100);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
}

pub use fixtures::*;
pub use generators::*;
pub use stress::*;
