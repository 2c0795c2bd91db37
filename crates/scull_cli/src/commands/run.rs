//! Run command implementation.

use super::script::{self, Step};
use scull_device::{AccessMode, DeviceRegistry, ReadOutcome, SeekBase};
use std::io::{self, Read, Write};
use std::path::Path;
use tracing::info;

/// Runs the script at `path`, or from stdin when no path is given.
pub fn run(
    registry: &DeviceRegistry,
    path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = match path {
        Some(path) => {
            info!("Running script {:?}", path);
            std::fs::read_to_string(path)?
        }
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            text
        }
    };

    let stdout = io::stdout();
    execute(registry, &text, &mut stdout.lock())
}

/// Parses and executes `text`, reporting each step to `out`.
pub fn execute(
    registry: &DeviceRegistry,
    text: &str,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    for (line, step) in script::parse(text)? {
        execute_step(registry, &step, out).map_err(|e| format!("line {line}: {e}"))?;
    }
    Ok(())
}

fn execute_step(
    registry: &DeviceRegistry,
    step: &Step,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    match step {
        Step::Write {
            device,
            offset,
            data,
        } => {
            let mut file = registry.open(*device, AccessMode::ReadWrite)?;
            file.seek_to(SeekBase::Start, i64::try_from(*offset)?)?;
            let mut written = 0;
            while written < data.len() {
                written += file.write_chunk(&data[written..])?;
            }
            writeln!(out, "wrote {written} bytes to device {device} at {offset}")?;
        }
        Step::Read {
            device,
            offset,
            len,
        } => {
            let mut file = registry.open(*device, AccessMode::ReadOnly)?;
            file.seek_to(SeekBase::Start, i64::try_from(*offset)?)?;
            let mut buf = vec![0u8; *len];
            let mut filled = 0;
            let mut stop = "";
            while filled < buf.len() {
                match file.read_chunk(&mut buf[filled..])? {
                    ReadOutcome::Transferred(n) => filled += n,
                    ReadOutcome::Hole => {
                        stop = " (hole)";
                        break;
                    }
                    ReadOutcome::EndOfData => {
                        stop = " (end of data)";
                        break;
                    }
                }
            }
            writeln!(
                out,
                "read {filled} bytes from device {device} at {offset}{stop}: {:?}",
                String::from_utf8_lossy(&buf[..filled])
            )?;
        }
        Step::Trim { device } => {
            registry.open(*device, AccessMode::WriteOnly)?;
            writeln!(out, "trimmed device {device}")?;
        }
        Step::Size { device } => {
            let size = registry.device(*device)?.size();
            writeln!(out, "device {device} size {size}")?;
        }
        Step::List => {
            write!(out, "{}", registry.listing())?;
        }
    }
    Ok(())
}
