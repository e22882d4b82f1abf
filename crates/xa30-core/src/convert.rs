//! Invocation of the wrapped DICOM-to-NIfTI converter.
//!
//! The converter is a black box. With `-v 1` it logs the DICOM files it
//! reads and a `Convert <n> DICOM as <base> (<dims>)` line per output, which
//! is enough to pair every output base path with a source DICOM.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

/// Default converter executable, looked up on `PATH`.
pub const DEFAULT_PROGRAM: &str = "dcm2niix";

/// Number of stderr lines kept in a converter failure message.
const STDERR_TAIL_LINES: usize = 10;

static CONVERT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Convert\s+\d+\s+DICOM\s+as\s+(.+?)\s+\(").expect("convert line pattern is valid")
});

/// Output base path (no extension) mapped to the DICOM it was converted from.
pub type ConversionResult = BTreeMap<PathBuf, PathBuf>;

/// A DICOM-to-NIfTI converter.
pub trait Converter {
    /// Runs a conversion and reports which DICOM each output came from.
    fn convert(&self, args: &[String]) -> Result<ConversionResult>;

    /// Prints the converter's own help text.
    fn print_help(&self) -> Result<()>;
}

/// Process-backed [`Converter`] running the `dcm2niix` executable.
#[derive(Debug, Clone)]
pub struct Dcm2niix {
    program: PathBuf,
}

impl Dcm2niix {
    /// Creates a converter that runs `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Path of the executable.
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self, args: &[String]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(args.iter().map(OsString::from));
        cmd
    }

    fn spawn_error(&self, e: std::io::Error) -> Error {
        Error::converter_with_source(format!("could not run {}", self.program.display()), e)
    }
}

impl Default for Dcm2niix {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl Converter for Dcm2niix {
    fn convert(&self, args: &[String]) -> Result<ConversionResult> {
        tracing::info!(program = %self.program.display(), ?args, "Running converter");

        let output = self
            .command(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| self.spawn_error(e))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines() {
            tracing::debug!(target: "dcm2niix", "{line}");
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let lines: Vec<&str> = stderr.lines().collect();
            let tail = lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join("\n");
            return Err(Error::converter(format!(
                "{} exited with {}: {tail}",
                self.program.display(),
                output.status
            )));
        }

        parse_verbose_output(&stdout)
    }

    fn print_help(&self) -> Result<()> {
        // dcm2niix does not exit 0 on -h for every release; the text is all we need.
        let status = self
            .command(&["-h".to_string()])
            .status()
            .map_err(|e| self.spawn_error(e))?;
        tracing::debug!(%status, "Converter help finished");
        Ok(())
    }
}

/// Builds the conversion result from the converter's verbose log.
///
/// The most recent line naming an existing DICOM-like file is taken as the
/// source of the next `Convert ... as <base>` line. Each reference is used
/// by one output only.
pub fn parse_verbose_output(log: &str) -> Result<ConversionResult> {
    let mut result = ConversionResult::new();
    let mut current_dicom: Option<PathBuf> = None;

    for line in log.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(caps) = CONVERT_LINE.captures(line) {
            let base = PathBuf::from(&caps[1]);
            let dicom = current_dicom.take().ok_or_else(|| {
                Error::converter(format!(
                    "no DICOM file reported before output {}",
                    base.display()
                ))
            })?;
            tracing::debug!(base = %base.display(), dicom = %dicom.display(), "Mapped output");
            result.insert(base, dicom);
            continue;
        }

        if let Some(dicom) = dicom_reference(line) {
            current_dicom = Some(dicom);
        }
    }

    Ok(result)
}

/// Finds a DICOM path in a log line.
///
/// Whitespace-delimited tails of the line are tried longest first so that
/// paths containing spaces resolve; single tokens are the fallback.
fn dicom_reference(line: &str) -> Option<PathBuf> {
    let tail_starts = std::iter::once(0).chain(
        line.char_indices()
            .filter(|(_, c)| c.is_whitespace())
            .map(|(i, c)| i + c.len_utf8()),
    );
    tail_starts
        .filter_map(|start| line.get(start..))
        .find_map(dicom_token)
        .or_else(|| line.split_whitespace().rev().find_map(dicom_token))
}

fn dicom_token(token: &str) -> Option<PathBuf> {
    let token = token.trim().trim_matches(|c: char| matches!(c, '"' | '\'' | ',' | ';' | ':'));
    if token.is_empty() || is_converter_output(token) {
        return None;
    }
    let path = Path::new(token);
    path.is_file().then(|| path.to_path_buf())
}

fn is_converter_output(token: &str) -> bool {
    [".nii", ".nii.gz", ".json", ".bval", ".bvec"]
        .iter()
        .any(|ext| token.ends_with(ext))
}
