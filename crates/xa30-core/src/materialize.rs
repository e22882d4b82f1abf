//! Per-echo output files.
//!
//! Echo 0 keeps the converter's files, renamed to carry the first-echo
//! marker when needed. Every later echo gets a new image and sidecar pair
//! built from the decoded `.dat` data.

use std::path::{Path, PathBuf};

use ndarray::{Array5, ArrayD, Axis};

use crate::error::{Error, Result};
use crate::image::OfficialImage;
use crate::metadata::Sidecar;
use crate::naming::{self, EchoPrefix, FirstEcho, append_suffix};

/// Suffix of metadata sidecars.
pub const JSON_SUFFIX: &str = ".json";

/// Files touched while materializing one series.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Materialized {
    /// `(from, to)` pairs of renamed first-echo files
    pub renamed: Vec<(PathBuf, PathBuf)>,
    /// Images and sidecars written, in order
    pub written: Vec<PathBuf>,
}

/// Inputs shared by every echo of one series.
#[derive(Debug)]
pub struct Series<'a> {
    /// Output base path reported by the converter
    pub base: &'a Path,
    /// The converter's image for `base`
    pub image: &'a OfficialImage,
    /// The converter's sidecar for `base`
    pub metadata: &'a Sidecar,
    /// Decoded sidecars, axes `(x, y, z, echo, frame)`
    pub decoded: &'a Array5<u16>,
}

/// Writes the files of every echo in `echo_times`.
pub fn materialize_echoes(series: &Series<'_>, echo_times: &[f64]) -> Result<Materialized> {
    let mut done = Materialized::default();
    let mut first = series.base.to_path_buf();
    let mut prefix = EchoPrefix::E;

    for (index, &echo_time) in echo_times.iter().enumerate() {
        if index == 0 {
            match naming::first_echo(&first) {
                FirstEcho::Synonym => {
                    prefix = EchoPrefix::Echo;
                    continue;
                }
                FirstEcho::Rename(marked) => {
                    rename_pair(series, &first, &marked, &mut done)?;
                    first = marked;
                }
                FirstEcho::Marked => {}
            }

            // Phase images take their first echo from the .dat data as well.
            if naming::is_phase(&first) {
                let path = series.image.format.path_for(&first);
                series.image.write_like(&path, &echo_volume(series, 0))?;
                tracing::info!(image = %path.display(), "Rewrote first-echo phase image");
                done.written.push(path);
            }
            continue;
        }

        let base = naming::echo_base(&first, prefix, index);
        let image_path = series.image.format.path_for(&base);
        let json_path = append_suffix(&base, JSON_SUFFIX);

        series
            .image
            .write_like(&image_path, &echo_volume(series, index))?;
        series
            .metadata
            .for_echo(index, echo_time)
            .save(&json_path)?;

        tracing::info!(image = %image_path.display(), echo = index + 1, echo_time, "Wrote echo");
        done.written.push(image_path);
        done.written.push(json_path);
    }

    Ok(done)
}

fn rename_pair(
    series: &Series<'_>,
    from: &Path,
    to: &Path,
    done: &mut Materialized,
) -> Result<()> {
    let moves = [
        (series.image.path.clone(), series.image.format.path_for(to)),
        (append_suffix(from, JSON_SUFFIX), append_suffix(to, JSON_SUFFIX)),
    ];
    for (src, dst) in moves {
        std::fs::rename(&src, &dst).map_err(|e| Error::io_with_path(e, &src))?;
        tracing::info!(from = %src.display(), to = %dst.display(), "Renamed first echo");
        done.renamed.push((src, dst));
    }
    Ok(())
}

/// Decoded volume of one echo, shaped like the converter's image.
fn echo_volume(series: &Series<'_>, index: usize) -> ArrayD<u16> {
    let echo = series.decoded.index_axis(Axis(3), index);
    if series.image.is_single_frame() {
        echo.index_axis_move(Axis(3), 0).to_owned().into_dyn()
    } else {
        echo.to_owned().into_dyn()
    }
}
