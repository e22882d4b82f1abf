//! Error types for the XA30 workaround pipeline.

use std::path::{Path, PathBuf};

/// Errors that can occur while patching converter output.
///
/// Every variant is fatal for the run. Images without `.dat` sidecars are
/// not errors; they are reported as [`ImageOutcome::Skipped`](crate::ImageOutcome).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The caller passed arguments that cannot be relayed.
    #[error("Usage error: {message}")]
    Usage {
        /// What is wrong with the arguments
        message: String,
    },

    /// The wrapped converter could not be run or its output not understood.
    #[error("Converter error: {message}")]
    Converter {
        /// Human-readable error message
        message: String,
        /// Source error if available
        #[source]
        source: Option<std::io::Error>,
    },

    /// A file the pipeline expects next to a converted image is absent.
    #[error("Could not find {kind} file {}", .path.display())]
    MissingFile {
        /// Kind of file ("json", "nifti")
        kind: &'static str,
        /// Path that was looked up
        path: PathBuf,
    },

    /// The DICOM file carries no `alTE` echo-time block.
    #[error("No echo times found in {}", .path.display())]
    EchoTimesNotFound {
        /// DICOM file that was scanned
        path: PathBuf,
    },

    /// Decoded sidecar data disagrees with the converted image's shape.
    #[error("Shape mismatch: {message}")]
    ShapeMismatch {
        /// What did not line up
        message: String,
    },

    /// The first echo, first frame of the sidecars does not match the image.
    #[error(
        "Sanity check failed. The first echo, first frame of the .dat files does not match {}",
        .path.display()
    )]
    SanityCheck {
        /// Converted image that was compared
        path: PathBuf,
    },

    /// I/O error tied to a specific path.
    #[error("I/O error on {}: {source}", .path.display())]
    IoPath {
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
        /// Path being accessed
        path: PathBuf,
    },

    /// I/O error without path context.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// NIfTI read/write error
    #[error("NIfTI error: {0}")]
    Nifti(#[from] nifti::NiftiError),

    /// Invalid sidecar search pattern
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    /// Array reshaping error
    #[error("Array shape error: {0}")]
    Array(#[from] ndarray::ShapeError),
}

/// Convenience `Result` type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns whether the error was caused by the caller's arguments.
    pub fn is_usage(&self) -> bool {
        matches!(self, Error::Usage { .. })
    }

    /// Creates a new usage error.
    pub fn usage<S: Into<String>>(message: S) -> Self {
        Error::Usage {
            message: message.into(),
        }
    }

    /// Creates a new converter error.
    pub fn converter<S: Into<String>>(message: S) -> Self {
        Error::Converter {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new converter error with the I/O error that caused it.
    pub fn converter_with_source<S: Into<String>>(message: S, source: std::io::Error) -> Self {
        Error::Converter {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Creates a new missing-file error.
    pub fn missing_file(kind: &'static str, path: impl Into<PathBuf>) -> Self {
        Error::MissingFile {
            kind,
            path: path.into(),
        }
    }

    /// Creates a new shape-mismatch error.
    pub fn shape_mismatch<S: Into<String>>(message: S) -> Self {
        Error::ShapeMismatch {
            message: message.into(),
        }
    }

    /// Wraps an I/O error with the path that was being accessed.
    pub fn io_with_path(source: std::io::Error, path: &Path) -> Self {
        Error::IoPath {
            source,
            path: path.to_path_buf(),
        }
    }
}
