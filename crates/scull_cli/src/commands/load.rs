//! Load command implementation.

use scull_device::{AccessMode, DeviceListing, DeviceRegistry};
use serde::Serialize;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use tracing::info;

/// Result of loading a file through a device.
#[derive(Debug, Serialize)]
pub struct LoadReport {
    /// Source file path.
    pub path: String,
    /// Device the file was loaded into.
    pub device: usize,
    /// Bytes copied into the device.
    pub bytes: u64,
    /// Chain structure of the device after the load.
    pub listing: DeviceListing,
}

/// Runs the load command.
pub fn run(
    registry: &DeviceRegistry,
    path: &Path,
    device: usize,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Loading {:?} into device {}", path, device);
    let report = load(registry, path, device)?;

    let stdout = io::stdout();
    print_report(&report, format, &mut stdout.lock())
}

/// Copies `path` into `device`, reads it back and checks it matches.
pub fn load(
    registry: &DeviceRegistry,
    path: &Path,
    device: usize,
) -> Result<LoadReport, Box<dyn std::error::Error>> {
    let mut input = File::open(path)?;
    let mut writer = registry.open(device, AccessMode::WriteOnly)?;
    let bytes = io::copy(&mut input, &mut writer)?;
    drop(writer);

    let expected = std::fs::read(path)?;
    let mut actual = Vec::with_capacity(expected.len());
    registry
        .open(device, AccessMode::ReadOnly)?
        .read_to_end(&mut actual)?;
    if actual != expected {
        return Err(format!(
            "read-back of device {device} differs from {:?} ({} of {} bytes)",
            path,
            actual.len(),
            expected.len()
        )
        .into());
    }

    let snapshot = registry.device(device)?.snapshot();
    Ok(LoadReport {
        path: path.display().to_string(),
        device,
        bytes,
        listing: DeviceListing {
            index: device,
            snapshot,
        },
    })
}

fn print_report(
    report: &LoadReport,
    format: &str,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        "json" => {
            writeln!(out, "{}", serde_json::to_string_pretty(report)?)?;
        }
        _ => {
            writeln!(
                out,
                "Loaded {} bytes from {} into device {} (verified)",
                report.bytes, report.path, report.device
            )?;
            writeln!(
                out,
                "{} segments, {} blocks, {} bytes allocated",
                report.listing.snapshot.segment_count(),
                report.listing.snapshot.block_count(),
                report.listing.snapshot.allocated_bytes
            )?;
            write!(out, "{}", report.listing)?;
        }
    }
    Ok(())
}
