//! The converter's own NIfTI output for a series.

use std::path::{Path, PathBuf};

use ndarray::{ArrayD, ArrayViewD, Axis};
use nifti::writer::WriterOptions;
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};

use crate::error::{Error, Result};
use crate::naming::append_suffix;

/// Container format of a NIfTI image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// Uncompressed single file
    Nii,
    /// Gzip-compressed single file
    NiiGz,
}

impl ImageFormat {
    /// File suffix including the leading dot.
    pub fn suffix(self) -> &'static str {
        match self {
            ImageFormat::Nii => ".nii",
            ImageFormat::NiiGz => ".nii.gz",
        }
    }

    /// Image path for an output base path.
    pub fn path_for(self, base: &Path) -> PathBuf {
        append_suffix(base, self.suffix())
    }
}

/// Finds the image for `base`, preferring `.nii` over `.nii.gz`.
pub fn locate(base: &Path) -> Result<(PathBuf, ImageFormat)> {
    for format in [ImageFormat::Nii, ImageFormat::NiiGz] {
        let path = format.path_for(base);
        if path.is_file() {
            return Ok((path, format));
        }
    }
    Err(Error::missing_file("nifti", ImageFormat::NiiGz.path_for(base)))
}

/// A converted image loaded with its header.
#[derive(Debug, Clone)]
pub struct OfficialImage {
    /// Where the image was read from
    pub path: PathBuf,
    /// Container format, reused for every echo written next to it
    pub format: ImageFormat,
    /// Header used as the reference for written echoes
    pub header: NiftiHeader,
    /// Voxel values with scaling applied, axes `(x, y, z[, t])`
    pub data: ArrayD<f64>,
}

impl OfficialImage {
    /// Locates and reads the image for an output base path.
    pub fn open(base: &Path) -> Result<Self> {
        let (path, format) = locate(base)?;
        let obj = ReaderOptions::new().read_file(&path)?;
        let header = obj.header().clone();
        let data = obj.into_volume().into_ndarray::<f64>()?;
        tracing::debug!(image = %path.display(), shape = ?data.shape(), "Loaded image");
        Ok(Self {
            path,
            format,
            header,
            data,
        })
    }

    /// Image shape, `(x, y, z)` or `(x, y, z, t)`.
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Whether the image has no frame axis.
    pub fn is_single_frame(&self) -> bool {
        self.data.ndim() == 3
    }

    /// The first frame, or the whole volume for 3-D images.
    pub fn first_frame(&self) -> ArrayViewD<'_, f64> {
        if self.is_single_frame() {
            self.data.view()
        } else {
            self.data.index_axis(Axis(3), 0)
        }
    }

    /// Writes `data` to `path` with this image's header and affine.
    ///
    /// Samples are stored as-is, so the reference scaling is reset.
    pub fn write_like(&self, path: &Path, data: &ArrayD<u16>) -> Result<()> {
        let mut header = self.header.clone();
        header.scl_slope = 1.0;
        header.scl_inter = 0.0;
        WriterOptions::new(path)
            .reference_header(&header)
            .write_nifti(data)?;
        tracing::debug!(image = %path.display(), shape = ?data.shape(), "Wrote image");
        Ok(())
    }
}
