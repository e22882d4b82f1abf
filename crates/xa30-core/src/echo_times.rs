//! Echo-time extraction from the proprietary protocol text in a DICOM file.
//!
//! XA30 exports keep the echo times in an `alTE` block of the embedded
//! protocol, not in a standard DICOM tag, so the file is scanned as text.

use std::path::Path;

use crate::error::{Error, Result};

/// Substring that opens the echo-time block.
pub const ECHO_TIME_TAG: &str = "alTE";

/// Maximum number of `name = value` lines read after the tag.
pub const MAX_ECHOES: usize = 8;

const MICROSECONDS_PER_SECOND: f64 = 1e6;

/// Reads `path` and extracts its echo times in seconds.
pub fn extract_from_file(path: &Path) -> Result<Vec<f64>> {
    let bytes = std::fs::read(path).map_err(|e| Error::io_with_path(e, path))?;
    let times = extract(&bytes).ok_or_else(|| Error::EchoTimesNotFound {
        path: path.to_path_buf(),
    })?;
    tracing::debug!(dicom = %path.display(), ?times, "Extracted echo times");
    Ok(times)
}

/// Extracts echo times in seconds from raw DICOM bytes.
///
/// Returns `None` when the tag is absent or no value follows it.
pub fn extract(bytes: &[u8]) -> Option<Vec<f64>> {
    let lines: Vec<&[u8]> = bytes.split_inclusive(|&b| b == b'\n').collect();

    let start = lines.iter().position(|line| {
        std::str::from_utf8(line).is_ok_and(|text| text.contains(ECHO_TIME_TAG))
    })?;

    let raw: Vec<f64> = lines[start + 1..]
        .iter()
        .take(MAX_ECHOES)
        .map_while(|line| parse_value(line))
        .map(|us| us / MICROSECONDS_PER_SECOND)
        .collect();

    (!raw.is_empty()).then(|| keep_increasing(&raw))
}

/// Parses the value of a `name = value` line.
fn parse_value(line: &[u8]) -> Option<f64> {
    let text = std::str::from_utf8(line).ok()?;
    let (_, value) = text.split_once('=')?;
    value.trim().parse().ok()
}

/// Keeps the first value and every value greater than its raw predecessor.
///
/// Each value is compared against the one before it in `raw`, not against
/// the last value kept: `[10, 10, 20, 15, 30]` keeps `[10, 20, 30]`.
pub fn keep_increasing(raw: &[f64]) -> Vec<f64> {
    let Some(&first) = raw.first() else {
        return Vec::new();
    };
    std::iter::once(first)
        .chain(
            raw.windows(2)
                .filter(|pair| pair[1] - pair[0] > 0.0)
                .map(|pair| pair[1]),
        )
        .collect()
}
