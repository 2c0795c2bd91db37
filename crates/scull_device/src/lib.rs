//! # Scull Device
//!
//! Character-device style access to [`scull_storage`] stores.
//!
//! A [`DeviceRegistry`] owns a fixed number of independent devices.
//! Opening one yields a [`DeviceFile`] with its own cursor; the file
//! implements `std::io::{Read, Write, Seek}`. Opening a device
//! write-only empties it first. [`Listing`] reports the chain structure
//! of every device without exposing anything but counts and indices.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod file;
mod listing;
mod registry;

pub use config::{RegistryConfig, DEFAULT_DEVICE_COUNT};
pub use error::{DeviceError, DeviceResult};
pub use file::{AccessMode, DeviceFile};
pub use listing::{DeviceListing, Listing};
pub use registry::DeviceRegistry;

pub use scull_storage::{Interrupt, ReadOutcome, SeekBase};
