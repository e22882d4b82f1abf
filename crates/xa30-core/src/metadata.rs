//! JSON metadata sidecars written by the converter.

use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;

use crate::error::{Error, Result};

/// Value written to `ConversionSoftware` for every derived echo.
pub const CONVERSION_SOFTWARE: &str = "dcmdat2niix";

/// Substring identifying the echo entry of `ImageTypeText`.
const ECHO_TYPE_MARKER: &str = "TE";

/// Metadata sidecar of one image.
///
/// Only the fields rewritten per echo are typed; everything else is kept
/// verbatim in `extra`, in its original order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sidecar {
    /// Echo time in seconds.
    #[serde(rename = "EchoTime", default, skip_serializing_if = "Option::is_none")]
    pub echo_time: Option<f64>,

    /// Name of the tool that produced the image.
    #[serde(
        rename = "ConversionSoftware",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub conversion_software: Option<String>,

    /// Free-text image type labels, one of which names the echo (`TE1`, ...).
    #[serde(
        rename = "ImageTypeText",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub image_type_text: Option<Vec<String>>,

    /// All other fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Sidecar {
    /// Loads a sidecar; a missing file is a [`Error::MissingFile`].
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::missing_file("json", path));
        }
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Writes the sidecar as JSON indented by four spaces.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path).map_err(|e| Error::io_with_path(e, path))?;
        let mut writer = BufWriter::new(file);
        let mut ser =
            serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
        self.serialize(&mut ser)?;
        writer.flush().map_err(|e| Error::io_with_path(e, path))?;
        Ok(())
    }

    /// Metadata for echo `index` (zero-based) with the given echo time.
    pub fn for_echo(&self, index: usize, echo_time: f64) -> Self {
        let mut copy = self.clone();
        copy.echo_time = Some(echo_time);
        copy.conversion_software = Some(CONVERSION_SOFTWARE.to_string());
        copy.relabel_echo(index + 1);
        copy
    }

    /// Renames the first `ImageTypeText` entry containing `TE` to `TE<number>`.
    ///
    /// Returns whether an entry was relabeled.
    fn relabel_echo(&mut self, number: usize) -> bool {
        let Some(entry) = self
            .image_type_text
            .as_mut()
            .and_then(|types| types.iter_mut().find(|t| t.contains(ECHO_TYPE_MARKER)))
        else {
            return false;
        };
        *entry = format!("{ECHO_TYPE_MARKER}{number}");
        true
    }
}
