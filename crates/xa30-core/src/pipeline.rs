//! The end-to-end run: relay, convert, then patch every converted series.

use std::path::{Path, PathBuf};

use crate::check;
use crate::convert::Converter;
use crate::dat;
use crate::echo_times;
use crate::error::Result;
use crate::image::OfficialImage;
use crate::materialize::{self, JSON_SUFFIX, Materialized, Series};
use crate::metadata::Sidecar;
use crate::naming::append_suffix;
use crate::relay::{self, HELP_BANNER, Relay};

/// What happened to one converted series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutcome {
    /// No `.dat` files sat next to the DICOM; the converter's output stands.
    Skipped {
        /// DICOM the series was converted from
        dicom: PathBuf,
    },
    /// Echo files were written or renamed.
    Patched(Materialized),
}

/// Outcome of one series, keyed by the converter's output base path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReport {
    /// Output base path reported by the converter
    pub base: PathBuf,
    /// What happened to it
    pub outcome: ImageOutcome,
}

/// Outcome of a whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Help was printed.
    Help,
    /// The converter ran and every series was handled.
    Converted(Vec<ImageReport>),
}

/// Runs the converter with `args` (program name excluded) and patches its output.
pub fn run(converter: &dyn Converter, args: Vec<String>) -> Result<RunOutcome> {
    let (args, output_dir) = match relay::prepare(args)? {
        Relay::Help => {
            println!("{HELP_BANNER}");
            converter.print_help()?;
            return Ok(RunOutcome::Help);
        }
        Relay::Convert { args, output_dir } => (args, output_dir),
    };

    if let Some(dir) = output_dir {
        relay::ensure_output_dir(&dir)?;
    }

    let conversions = converter.convert(&args)?;
    tracing::info!(series = conversions.len(), "Conversion finished");

    let mut reports = Vec::with_capacity(conversions.len());
    for (base, dicom) in &conversions {
        let outcome = process_image(base, dicom)?;
        reports.push(ImageReport {
            base: base.clone(),
            outcome,
        });
    }

    tracing::info!("Done.");
    Ok(RunOutcome::Converted(reports))
}

/// Patches one converted series from the `.dat` files beside its DICOM.
pub fn process_image(base: &Path, dicom: &Path) -> Result<ImageOutcome> {
    let json_path = append_suffix(base, JSON_SUFFIX);
    let metadata = Sidecar::load(&json_path)?;
    let image = OfficialImage::open(base)?;
    let padded = dat::padded_shape(image.shape())?;

    let dat_files = dat::find_dat_files(dicom)?;
    if dat_files.is_empty() {
        tracing::warn!(dicom = %dicom.display(), "Could not find any .dat files; skipping");
        return Ok(ImageOutcome::Skipped {
            dicom: dicom.to_path_buf(),
        });
    }

    let echo_times = echo_times::extract_from_file(dicom)?;
    tracing::info!(
        dicom = %dicom.display(),
        files = dat_files.len(),
        echoes = echo_times.len(),
        "Converting .dat files"
    );

    let decoded = dat::decode(&dat_files, dat::target_shape(padded, echo_times.len()))?;
    check::check_frame_count(&decoded, padded[3])?;
    check::check_first_frame(&decoded, &image)?;

    let series = Series {
        base,
        image: &image,
        metadata: &metadata,
        decoded: &decoded,
    };
    let done = materialize::materialize_echoes(&series, &echo_times)?;
    Ok(ImageOutcome::Patched(done))
}
