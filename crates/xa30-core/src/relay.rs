//! Argument relay for the wrapped converter.
//!
//! Everything the caller passes is forwarded to `dcm2niix` untouched, except
//! that verbose output is forced on: the verbose log is the only place the
//! converter reports which DICOM file each output came from.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Flags that request help.
pub const HELP_FLAGS: [&str; 2] = ["-h", "--help"];

/// The converter's verbose flag, reserved for internal use.
pub const VERBOSE_FLAG: &str = "-v";

/// Verbosity level injected after [`VERBOSE_FLAG`].
pub const VERBOSE_LEVEL: &str = "1";

/// The wrapper's own converter-path flag; only valid before relayed arguments.
pub const CONVERTER_FLAG: &str = "--dcm2niix";

/// The converter's output-directory flag.
pub const OUTPUT_DIR_FLAG: &str = "-o";

/// Banner printed ahead of the converter's own help text.
pub const HELP_BANNER: &str = "Modified version of dcm2niix that can convert .dat files to NIFTI.\n\
You should put the .dat files next to the associated DICOM files.\n\
Below is the original dcm2niix help:\n";

/// What to do with a caller's argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relay {
    /// Print the banner and the converter's help, then exit successfully.
    Help,
    /// Run the converter with these arguments.
    Convert {
        /// Arguments with the verbose flag injected
        args: Vec<String>,
        /// Value of `-o`, if given
        output_dir: Option<PathBuf>,
    },
}

/// Decides how to relay `args` (program name excluded) to the converter.
///
/// The verbose flag and its level are inserted just before the last
/// argument, which the converter treats as the input directory.
pub fn prepare(args: Vec<String>) -> Result<Relay> {
    if args.iter().any(|a| HELP_FLAGS.contains(&a.as_str())) {
        return Ok(Relay::Help);
    }

    if args.iter().any(|a| is_converter_flag(a)) {
        return Err(Error::usage(format!(
            "{CONVERTER_FLAG} must come before the arguments relayed to dcm2niix"
        )));
    }

    if args.iter().any(|a| a == VERBOSE_FLAG) {
        return Err(Error::usage(
            "Turn off verbose output (-v) as this conflicts with dcmdat2niix.",
        ));
    }

    if args.is_empty() {
        return Err(Error::usage("Missing input directory"));
    }

    let output_dir = output_dir(&args)?;

    let mut args = args;
    let idx = args.len() - 1;
    args.insert(idx, VERBOSE_LEVEL.to_string());
    args.insert(idx, VERBOSE_FLAG.to_string());

    Ok(Relay::Convert { args, output_dir })
}

fn is_converter_flag(arg: &str) -> bool {
    arg == CONVERTER_FLAG
        || arg
            .strip_prefix(CONVERTER_FLAG)
            .is_some_and(|rest| rest.starts_with('='))
}

fn output_dir(args: &[String]) -> Result<Option<PathBuf>> {
    let Some(idx) = args.iter().position(|a| a == OUTPUT_DIR_FLAG) else {
        return Ok(None);
    };
    args.get(idx + 1)
        .map(|dir| Some(PathBuf::from(dir)))
        .ok_or_else(|| Error::usage("-o requires an output directory"))
}

/// Creates the output directory and its parents; an existing directory is fine.
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| Error::io_with_path(e, dir))
}
