//! Registry configuration.

use scull_storage::{Geometry, StoreConfig};

/// Default number of devices in a registry.
pub const DEFAULT_DEVICE_COUNT: usize = 4;

/// Configuration for a [`crate::DeviceRegistry`].
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Number of devices to create.
    pub device_count: usize,

    /// Configuration shared by every device's store.
    pub store: StoreConfig,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            device_count: DEFAULT_DEVICE_COUNT,
            store: StoreConfig::default(),
        }
    }
}

impl RegistryConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of devices.
    #[must_use]
    pub const fn device_count(mut self, count: usize) -> Self {
        self.device_count = count;
        self
    }

    /// Sets the block size of every device.
    #[must_use]
    pub const fn quantum_size(mut self, size: usize) -> Self {
        self.store.geometry.quantum_size = size;
        self
    }

    /// Sets the slots per segment of every device.
    #[must_use]
    pub const fn qset_size(mut self, size: usize) -> Self {
        self.store.geometry.qset_size = size;
        self
    }

    /// Sets the geometry of every device.
    #[must_use]
    pub const fn geometry(mut self, geometry: Geometry) -> Self {
        self.store.geometry = geometry;
        self
    }

    /// Caps the memory each device may hold.
    #[must_use]
    pub const fn memory_limit(mut self, limit: Option<usize>) -> Self {
        self.store.memory_limit = limit;
        self
    }
}
