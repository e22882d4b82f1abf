//! Discovery and decoding of raw `.dat` sidecar files.
//!
//! Each `.dat` file beside a DICOM holds one frame: a headerless,
//! little-endian `u16` volume in C order with shape `[echoes, z, y, x]`.
//! Decoded frames are stacked into an array with axes
//! `(x, y, z, echo, frame)`, matching NIfTI's axis order.

use std::path::{Path, PathBuf};

use ndarray::{Array4, Array5, ArrayView4, Axis};

use crate::error::{Error, Result};

/// Extension of raw sidecar files.
pub const DAT_EXTENSION: &str = "dat";

const SAMPLE_BYTES: usize = std::mem::size_of::<u16>();

/// Finds every `.dat` file in the directory holding `dicom`, sorted by path.
pub fn find_dat_files(dicom: &Path) -> Result<Vec<PathBuf>> {
    let dir = dicom
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    let pattern = Path::new(&escaped).join(format!("*.{DAT_EXTENSION}"));
    let pattern = pattern.to_string_lossy();

    let mut files = Vec::new();
    for entry in glob::glob(&pattern)? {
        let path = entry.map_err(|e| {
            let path = e.path().to_path_buf();
            Error::io_with_path(e.into_error(), &path)
        })?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Pads a 3-D image shape with a singleton frame axis.
pub fn padded_shape(shape: &[usize]) -> Result<[usize; 4]> {
    match *shape {
        [x, y, z] => Ok([x, y, z, 1]),
        [x, y, z, t] => Ok([x, y, z, t]),
        _ => Err(Error::shape_mismatch(format!(
            "expected a 3-D or 4-D image, got shape {shape:?}"
        ))),
    }
}

/// On-disk shape of one `.dat` frame: the padded image shape reversed, with
/// the leading axis replaced by the echo count.
pub fn target_shape(padded: [usize; 4], echoes: usize) -> [usize; 4] {
    let [x, y, z, _] = padded;
    [echoes, z, y, x]
}

/// Decodes `files` (one frame each) into an `(x, y, z, echo, frame)` array.
pub fn decode(files: &[PathBuf], shape: [usize; 4]) -> Result<Array5<u16>> {
    if files.is_empty() {
        return Err(Error::shape_mismatch("no .dat files to decode"));
    }

    let frames = files
        .iter()
        .map(|file| decode_frame(file, shape))
        .collect::<Result<Vec<_>>>()?;
    let views: Vec<ArrayView4<'_, u16>> = frames.iter().map(Array4::view).collect();

    Ok(ndarray::stack(Axis(4), &views)?)
}

/// Decodes one file into an `(x, y, z, echo)` array.
fn decode_frame(file: &Path, shape: [usize; 4]) -> Result<Array4<u16>> {
    let bytes = std::fs::read(file).map_err(|e| Error::io_with_path(e, file))?;

    let voxels: usize = shape.iter().product();
    if bytes.len() != voxels * SAMPLE_BYTES {
        return Err(Error::shape_mismatch(format!(
            "{} holds {} bytes, expected {} for shape {shape:?}",
            file.display(),
            bytes.len(),
            voxels * SAMPLE_BYTES
        )));
    }

    let samples: Vec<u16> = bytes
        .chunks_exact(SAMPLE_BYTES)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .collect();

    let [echoes, z, y, x] = shape;
    let volume = Array4::from_shape_vec((echoes, z, y, x), samples)?;
    Ok(volume.reversed_axes())
}
