//! XA30 Core: multi-echo recovery for dcm2niix output.
//!
//! Siemens XA30 exports carry only the first echo of a multi-echo series as
//! DICOM pixel data; the remaining echoes sit in raw `.dat` files next to
//! the DICOMs. This crate wraps `dcm2niix`, decodes those sidecars and
//! writes one NIfTI image and JSON sidecar per echo.
//!
//! # Modules
//!
//! - [`relay`]: Argument forwarding to the converter
//! - [`convert`]: Converter invocation and verbose-log parsing
//! - [`echo_times`]: Echo times from the embedded protocol text
//! - [`dat`]: `.dat` discovery and decoding
//! - [`image`]: The converter's NIfTI output
//! - [`check`]: Frame-count and first-frame consistency checks
//! - [`metadata`]: JSON sidecars
//! - [`naming`]: Multi-echo file names
//! - [`materialize`]: Per-echo output files
//! - [`pipeline`]: The end-to-end run
//! - [`error`]: Error types and Result alias

pub mod check;
pub mod convert;
pub mod dat;
pub mod echo_times;
pub mod error;
pub mod image;
pub mod materialize;
pub mod metadata;
pub mod naming;
pub mod pipeline;
pub mod relay;

// Re-export key types at crate root for convenience
pub use convert::{ConversionResult, Converter, Dcm2niix};
pub use error::{Error, Result};
pub use materialize::Materialized;
pub use metadata::Sidecar;
pub use pipeline::{ImageOutcome, ImageReport, RunOutcome, process_image, run};
