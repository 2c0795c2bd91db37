//! Block geometry and linear address translation.

use crate::error::{StoreError, StoreResult};
use serde::Serialize;

/// Default size of a single block (quantum), in bytes.
pub const DEFAULT_QUANTUM_SIZE: usize = 4000;

/// Default number of block slots per segment (qset).
pub const DEFAULT_QSET_SIZE: usize = 1000;

/// Shape of a store's address space.
///
/// The linear space is cut into segment stripes of
/// `quantum_size * qset_size` bytes; each stripe is cut into `qset_size`
/// blocks of `quantum_size` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Geometry {
    /// Bytes per block.
    pub quantum_size: usize,
    /// Block slots per segment.
    pub qset_size: usize,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            quantum_size: DEFAULT_QUANTUM_SIZE,
            qset_size: DEFAULT_QSET_SIZE,
        }
    }
}

impl Geometry {
    /// Creates a geometry from explicit sizes.
    ///
    /// The result is not validated; see [`Geometry::validate`].
    #[must_use]
    pub const fn new(quantum_size: usize, qset_size: usize) -> Self {
        Self {
            quantum_size,
            qset_size,
        }
    }

    /// Checks that both sizes are non-zero and a stripe fits in `u64`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidGeometry`] otherwise.
    pub fn validate(&self) -> StoreResult<()> {
        if self.quantum_size == 0 {
            return Err(StoreError::invalid_geometry("quantum size must be non-zero"));
        }
        if self.qset_size == 0 {
            return Err(StoreError::invalid_geometry("qset size must be non-zero"));
        }
        (self.quantum_size as u64)
            .checked_mul(self.qset_size as u64)
            .ok_or_else(|| {
                StoreError::invalid_geometry(format!(
                    "stripe of {} x {} bytes overflows",
                    self.quantum_size, self.qset_size
                ))
            })?;
        Ok(())
    }

    /// Bytes covered by one segment.
    #[must_use]
    pub fn stripe_len(&self) -> u64 {
        self.quantum_size as u64 * self.qset_size as u64
    }

    /// Maps a linear byte offset onto (segment, slot, offset-in-block).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidArgument`] if the segment index does
    /// not fit in `usize` on this platform.
    pub fn locate(&self, pos: u64) -> StoreResult<Position> {
        let stripe = self.stripe_len();
        let segment = usize::try_from(pos / stripe).map_err(|_| {
            StoreError::invalid_argument(format!("offset {pos} is beyond addressable range"))
        })?;
        // rest < stripe, and stripe / quantum == qset_size fits in usize
        let rest = pos % stripe;
        let quantum = self.quantum_size as u64;

        Ok(Position {
            segment,
            slot: (rest / quantum) as usize,
            offset: (rest % quantum) as usize,
        })
    }
}

/// A linear offset translated into chain coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Index of the segment in the chain.
    pub segment: usize,
    /// Block slot within the segment.
    pub slot: usize,
    /// Byte offset inside the block.
    pub offset: usize,
}

impl Position {
    /// Bytes left in the block from this position to its edge.
    #[must_use]
    pub fn room(&self, geometry: &Geometry) -> usize {
        geometry.quantum_size - self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_defaults() {
        let geometry = Geometry::default();
        assert_eq!(geometry.quantum_size, 4000);
        assert_eq!(geometry.qset_size, 1000);
        assert_eq!(geometry.stripe_len(), 4_000_000);
    }

    #[test]
    fn geometry_rejects_zero_sizes() {
        assert!(matches!(
            Geometry::new(0, 10).validate(),
            Err(StoreError::InvalidGeometry { .. })
        ));
        assert!(matches!(
            Geometry::new(10, 0).validate(),
            Err(StoreError::InvalidGeometry { .. })
        ));
        assert!(Geometry::new(1, 1).validate().is_ok());
    }

    #[test]
    fn locate_origin() {
        let pos = Geometry::default().locate(0).unwrap();
        assert_eq!(
            pos,
            Position {
                segment: 0,
                slot: 0,
                offset: 0
            }
        );
    }

    #[test]
    fn locate_within_first_segment() {
        let pos = Geometry::default().locate(4000 * 7 + 123).unwrap();
        assert_eq!(pos.segment, 0);
        assert_eq!(pos.slot, 7);
        assert_eq!(pos.offset, 123);
    }

    #[test]
    fn locate_crosses_segments() {
        let geometry = Geometry::default();
        let pos = geometry.locate(3 * geometry.stripe_len() + 4017).unwrap();
        assert_eq!(pos.segment, 3);
        assert_eq!(pos.slot, 1);
        assert_eq!(pos.offset, 17);
    }

    #[test]
    fn locate_last_byte_of_stripe() {
        let geometry = Geometry::new(8, 4);
        let pos = geometry.locate(31).unwrap();
        assert_eq!(pos.segment, 0);
        assert_eq!(pos.slot, 3);
        assert_eq!(pos.offset, 7);
        assert_eq!(pos.room(&geometry), 1);

        let next = geometry.locate(32).unwrap();
        assert_eq!(next.segment, 1);
        assert_eq!(next.slot, 0);
        assert_eq!(next.offset, 0);
        assert_eq!(next.room(&geometry), 8);
    }
}
