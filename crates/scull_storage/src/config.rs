//! Store configuration.

use crate::error::StoreResult;
use crate::geometry::Geometry;

/// Configuration for creating a [`crate::Store`].
///
/// The geometry here is the store's default: it is used for the first
/// write and restored by every trim.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    /// Block and segment sizes.
    pub geometry: Geometry,

    /// Upper bound on bytes held by blocks, slot arrays and segment
    /// nodes (`None` = unbounded).
    pub memory_limit: Option<usize>,
}

impl StoreConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the block size.
    #[must_use]
    pub const fn quantum_size(mut self, size: usize) -> Self {
        self.geometry.quantum_size = size;
        self
    }

    /// Sets the number of block slots per segment.
    #[must_use]
    pub const fn qset_size(mut self, size: usize) -> Self {
        self.geometry.qset_size = size;
        self
    }

    /// Sets the whole geometry.
    #[must_use]
    pub const fn geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Caps the memory the store may hold.
    #[must_use]
    pub const fn memory_limit(mut self, limit: Option<usize>) -> Self {
        self.memory_limit = limit;
        self
    }

    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the geometry is unusable.
    pub fn validate(&self) -> StoreResult<()> {
        self.geometry.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.geometry, Geometry::default());
        assert!(config.memory_limit.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_pattern() {
        let config = StoreConfig::new()
            .quantum_size(16)
            .qset_size(4)
            .memory_limit(Some(1024));

        assert_eq!(config.geometry, Geometry::new(16, 4));
        assert_eq!(config.memory_limit, Some(1024));
    }

    #[test]
    fn builder_invalid_geometry() {
        let config = StoreConfig::new().quantum_size(0);
        assert!(config.validate().is_err());
    }
}
