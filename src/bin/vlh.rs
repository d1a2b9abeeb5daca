//! `vlh` runs protocol files through the virtual liquid handler and reports what went wrong.
//!
//! - `vlh run <FILE>...` simulates each protocol on its own device
//! - `vlh catalog` prints the built-in labware catalog as JSON

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{info, warn};
use vlh_sim::device_map::{DeviceId, DeviceMap};
use vlh_sim::diagnostic::Diagnostic;
use vlh_sim::labware::LabwareCatalog;
use vlh_sim::protocol::ProtocolFile;

#[derive(Parser)]
#[command(name = "vlh")]
#[command(version, about = "Virtual liquid handler", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "VLH_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate one or more protocol files
    Run {
        /// Protocol files in JSON
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,

        /// Report format
        #[arg(long, env = "VLH_FORMAT", value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Print the built-in labware catalog
    Catalog,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Serialize)]
struct DeviceReport {
    device: DeviceId,
    errors: usize,
    warnings: usize,
    diagnostics: Vec<Diagnostic>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Run { files, format } => {
            let reports = run(&files)?;
            let failed = reports.iter().any(|r| r.errors > 0);
            print_reports(&reports, format)?;
            if failed {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Catalog => {
            let catalog = serde_json::to_string_pretty(&LabwareCatalog::standard())?;
            println!("{catalog}");
            Ok(())
        }
    }
}

/// Register one simulated device per file, replay the protocols side by side and report in the
/// order the files were given.
fn run(files: &[PathBuf]) -> Result<Vec<DeviceReport>> {
    let devices = DeviceMap::new();
    let mut queued = Vec::with_capacity(files.len());

    for path in files {
        let device_id = DeviceId::from(path.as_path());
        if devices.contains(&device_id) {
            warn!(device = %device_id, "protocol given more than once, running it once");
            continue;
        }
        let protocol = ProtocolFile::load(path)
            .and_then(|file| file.into_protocol())
            .with_context(|| format!("failed to load protocol {device_id}"))?;
        let simulator = protocol
            .simulator()
            .with_context(|| format!("failed to build device for {device_id}"))?;

        let device = devices.register(device_id, simulator)?;
        queued.push((device, protocol.instructions));
    }

    let order: Vec<DeviceId> = queued.iter().map(|(d, _)| d.device_id().clone()).collect();
    std::thread::scope(|scope| -> Result<()> {
        let running: Vec<_> = queued
            .into_iter()
            .map(|(device, instructions)| {
                scope.spawn(move || {
                    info!(
                        device = %device.device_id(),
                        instructions = instructions.len(),
                        "running protocol"
                    );
                    device.run(instructions)
                })
            })
            .collect();
        for handle in running {
            handle
                .join()
                .map_err(|_| anyhow!("simulation thread panicked"))??;
        }
        Ok(())
    })?;

    let mut reports = Vec::with_capacity(order.len());
    for device_id in order {
        let simulator = devices.retire(&device_id)?;
        let diagnostics = simulator.diagnostics().to_vec();
        let errors = simulator.errors().count();
        reports.push(DeviceReport {
            device: device_id,
            errors,
            warnings: diagnostics.len() - errors,
            diagnostics,
        });
    }
    Ok(reports)
}

fn print_reports(reports: &[DeviceReport], format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(reports)?),
        Format::Text => {
            for report in reports {
                println!("== {} ==", report.device);
                for diagnostic in &report.diagnostics {
                    println!("{diagnostic}");
                }
                println!(
                    "{}: {} error(s), {} warning(s)",
                    report.device, report.errors, report.warnings
                );
            }
        }
    }
    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    Ok(())
}
