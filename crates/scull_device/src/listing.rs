//! Human- and machine-readable listings of device chains.

use scull_storage::StoreSnapshot;
use serde::Serialize;
use std::fmt;

/// Structure of every device in a registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
    /// One entry per device, in index order.
    pub devices: Vec<DeviceListing>,
}

/// Structure of one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceListing {
    /// Device index.
    pub index: usize,
    /// Chain shape, taken under the device's lock.
    #[serde(flatten)]
    pub snapshot: StoreSnapshot,
}

impl Listing {
    /// Total blocks held across all devices.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.devices.iter().map(|d| d.snapshot.block_count()).sum()
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for device in &self.devices {
            write!(f, "{device}")?;
        }
        Ok(())
    }
}

impl fmt::Display for DeviceListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = &self.snapshot;
        writeln!(
            f,
            "Device {}, qset {}, quantum {}, size {}",
            self.index, snapshot.geometry.qset_size, snapshot.geometry.quantum_size, snapshot.size
        )?;
        for segment in &snapshot.segments {
            match segment.slot_count {
                Some(slots) => writeln!(
                    f,
                    "\tsegment {} at {}, {} slots",
                    segment.index, segment.start, slots
                )?,
                None => writeln!(
                    f,
                    "\tsegment {} at {}, no slots",
                    segment.index, segment.start
                )?,
            }
            for slot in &segment.blocks {
                writeln!(f, "\t\t{slot}: block")?;
            }
        }
        Ok(())
    }
}
