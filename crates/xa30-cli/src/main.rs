#![forbid(unsafe_code)]

//! dcmdat2niix
//!
//! Drop-in replacement for `dcm2niix` that restores XA30 multi-echo data
//! from `.dat` files placed next to the DICOMs.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use xa30_core::convert::DEFAULT_PROGRAM;
use xa30_core::{Dcm2niix, ImageOutcome, RunOutcome};

/// dcm2niix wrapper that converts .dat files to NIfTI
#[derive(Parser, Debug)]
#[command(name = "dcmdat2niix")]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct Args {
    /// dcm2niix executable to run. Must come before the relayed arguments;
    /// a later `--dcm2niix` is rejected as a usage error.
    #[arg(long = "dcm2niix", env = "DCM2NIIX_PATH", default_value = DEFAULT_PROGRAM)]
    dcm2niix: PathBuf,

    /// Arguments passed through to dcm2niix
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so dcm2niix's help text stays clean on stdout
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let converter = Dcm2niix::new(args.dcm2niix);
    match xa30_core::run(&converter, args.args)? {
        RunOutcome::Help => {}
        RunOutcome::Converted(reports) => {
            let skipped = reports
                .iter()
                .filter(|r| matches!(r.outcome, ImageOutcome::Skipped { .. }))
                .count();
            tracing::info!(
                series = reports.len(),
                patched = reports.len() - skipped,
                skipped,
                "dcmdat2niix completed"
            );
        }
    }

    Ok(())
}
