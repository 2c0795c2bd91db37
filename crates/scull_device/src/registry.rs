//! A fixed set of devices sharing one configuration.

use crate::config::RegistryConfig;
use crate::error::{DeviceError, DeviceResult};
use crate::file::{AccessMode, DeviceFile};
use crate::listing::{DeviceListing, Listing};
use scull_storage::{Interrupt, Store, StoreResult};
use std::sync::Arc;
use tracing::{debug, info};

/// The devices of one registry, each backed by its own [`Store`].
///
/// Devices share nothing but their initial configuration; work on one
/// never waits on another.
///
/// # Example
///
/// ```rust
/// use scull_device::{AccessMode, DeviceRegistry, RegistryConfig};
/// use std::io::{Read, Write};
///
/// let registry = DeviceRegistry::new(RegistryConfig::default()).unwrap();
/// let mut writer = registry.open(0, AccessMode::WriteOnly).unwrap();
/// writer.write_all(b"hello").unwrap();
///
/// let mut out = String::new();
/// registry.open(0, AccessMode::ReadOnly).unwrap().read_to_string(&mut out).unwrap();
/// assert_eq!(out, "hello");
/// ```
#[derive(Debug)]
pub struct DeviceRegistry {
    devices: Vec<Arc<Store>>,
}

impl DeviceRegistry {
    /// Creates `device_count` empty devices.
    ///
    /// # Errors
    ///
    /// Returns an error if the store configuration is invalid.
    pub fn new(config: RegistryConfig) -> DeviceResult<Self> {
        let devices = (0..config.device_count)
            .map(|_| Store::new(config.store.clone()).map(Arc::new))
            .collect::<StoreResult<Vec<_>>>()?;

        info!(
            devices = devices.len(),
            quantum_size = config.store.geometry.quantum_size,
            qset_size = config.store.geometry.qset_size,
            "registered devices"
        );
        Ok(Self { devices })
    }

    /// Number of devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Returns true if the registry holds no devices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// The store behind device `index`.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::NoSuchDevice`] for an unknown index.
    pub fn device(&self, index: usize) -> DeviceResult<&Arc<Store>> {
        self.devices.get(index).ok_or(DeviceError::NoSuchDevice {
            index,
            count: self.devices.len(),
        })
    }

    /// Opens device `index` with a fresh interrupt.
    ///
    /// Opening write-only trims the device first.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::NoSuchDevice`] for an unknown index.
    pub fn open(&self, index: usize, mode: AccessMode) -> DeviceResult<DeviceFile> {
        self.open_with_interrupt(index, mode, Interrupt::new())
    }

    /// Opens device `index`, waiting for its lock with `interrupt`.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::NoSuchDevice`] for an unknown index, or an
    /// interrupted error if a write-only open gave up waiting to trim.
    pub fn open_with_interrupt(
        &self,
        index: usize,
        mode: AccessMode,
        interrupt: Interrupt,
    ) -> DeviceResult<DeviceFile> {
        let store = Arc::clone(self.device(index)?);
        debug!(device = index, %mode, "open");
        DeviceFile::open(index, store, mode, interrupt)
    }

    /// Lists every device, taking each device's lock in turn.
    #[must_use]
    pub fn listing(&self) -> Listing {
        let devices = self
            .devices
            .iter()
            .enumerate()
            .map(|(index, store)| DeviceListing {
                index,
                snapshot: store.snapshot(),
            })
            .collect();
        Listing { devices }
    }

    /// Lists every device, giving up once `interrupt` is raised.
    ///
    /// # Errors
    ///
    /// Returns an interrupted error if a device lock could not be taken.
    pub fn listing_interruptible(&self, interrupt: &Interrupt) -> DeviceResult<Listing> {
        let devices = self
            .devices
            .iter()
            .enumerate()
            .map(|(index, store)| {
                let snapshot = store.lock_interruptible(interrupt)?.snapshot();
                Ok(DeviceListing { index, snapshot })
            })
            .collect::<DeviceResult<Vec<_>>>()?;
        Ok(Listing { devices })
    }

    /// Trims every device and drops the registry.
    pub fn shutdown(self) {
        for (index, store) in self.devices.iter().enumerate() {
            let mut guard = store.lock();
            let size = guard.size();
            let bytes = guard.allocated_bytes();
            guard.trim();
            debug!(device = index, size, bytes, "released device");
        }
        info!(devices = self.devices.len(), "registry shut down");
    }
}
