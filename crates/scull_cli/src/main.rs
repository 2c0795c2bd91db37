//! Scull CLI
//!
//! Drives an in-process set of scull devices.
//!
//! # Commands
//!
//! - `run` - Execute a device script (file or stdin)
//! - `load` - Copy a file through a device and verify it reads back
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand};
use scull_device::{DeviceRegistry, RegistryConfig, DEFAULT_DEVICE_COUNT};
use scull_storage::{DEFAULT_QSET_SIZE, DEFAULT_QUANTUM_SIZE};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Scull in-memory device tools.
#[derive(Parser)]
#[command(name = "scull")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Number of devices to create
    #[arg(global = true, long, default_value_t = DEFAULT_DEVICE_COUNT)]
    devices: usize,

    /// Bytes per block
    #[arg(global = true, long, default_value_t = DEFAULT_QUANTUM_SIZE)]
    quantum: usize,

    /// Blocks per segment
    #[arg(global = true, long, default_value_t = DEFAULT_QSET_SIZE)]
    qset: usize,

    /// Per-device memory limit in bytes
    #[arg(global = true, long)]
    memory_limit: Option<usize>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a device script
    Run {
        /// Script file (reads stdin if omitted)
        script: Option<PathBuf>,
    },

    /// Copy a file through a device and verify the read-back
    Load {
        /// File to load
        file: PathBuf,

        /// Device to load into
        #[arg(short, long, default_value = "0")]
        device: usize,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = RegistryConfig::new()
        .device_count(cli.devices)
        .quantum_size(cli.quantum)
        .qset_size(cli.qset)
        .memory_limit(cli.memory_limit);

    match cli.command {
        Commands::Run { script } => {
            let registry = DeviceRegistry::new(config)?;
            commands::run::run(&registry, script.as_deref())?;
            registry.shutdown();
        }
        Commands::Load {
            file,
            device,
            format,
        } => {
            let registry = DeviceRegistry::new(config)?;
            commands::load::run(&registry, &file, device, &format)?;
            registry.shutdown();
        }
        Commands::Version => {
            println!("Scull CLI v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
