//! Consistency checks between decoded sidecars and the converted image.

use ndarray::{Array5, ArrayD, ArrayViewD, Axis};

use crate::error::{Error, Result};
use crate::image::OfficialImage;

/// Relative tolerance of [`all_close`].
pub const RTOL: f64 = 1e-5;

/// Absolute tolerance of [`all_close`].
pub const ATOL: f64 = 1e-8;

/// Min-max scales `data` to `[0, 1]`. A constant array maps to zeros.
pub fn normalize(data: ArrayViewD<'_, f64>) -> ArrayD<f64> {
    let (min, max) = data
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = max - min;
    if !range.is_finite() || range == 0.0 {
        return ArrayD::zeros(data.raw_dim());
    }
    data.mapv(|v| (v - min) / range)
}

/// Elementwise `|a - b| <= ATOL + RTOL * |b|`; different shapes never match.
pub fn all_close(a: ArrayViewD<'_, f64>, b: ArrayViewD<'_, f64>) -> bool {
    a.shape() == b.shape()
        && a
            .iter()
            .zip(b.iter())
            .all(|(&x, &y)| (x - y).abs() <= ATOL + RTOL * y.abs())
}

/// Fails unless the decoded array has `frames` frames.
pub fn check_frame_count(decoded: &Array5<u16>, frames: usize) -> Result<()> {
    let decoded_frames = decoded.len_of(Axis(4));
    if decoded_frames != frames {
        return Err(Error::shape_mismatch(format!(
            "The number of frames in the .dat files ({decoded_frames}) does not match \
             the number of frames in the nifti ({frames})."
        )));
    }
    Ok(())
}

/// Compares the first echo, first frame of `decoded` with the image's first frame.
pub fn check_first_frame(decoded: &Array5<u16>, image: &OfficialImage) -> Result<()> {
    let first = decoded
        .index_axis(Axis(4), 0)
        .index_axis_move(Axis(3), 0)
        .mapv(f64::from)
        .into_dyn();

    if all_close(normalize(first.view()).view(), normalize(image.first_frame()).view()) {
        tracing::debug!(image = %image.path.display(), "Sanity check passed");
        Ok(())
    } else {
        Err(Error::SanityCheck {
            path: image.path.clone(),
        })
    }
}
