//! Scale sweep over adaptive-threshold window sizes.

use quadscan_core::{GrayImage, GrayImageView};
use serde::Serialize;

use crate::backend::{BackendError, GeometryBackend};
use crate::QuadDetectorParams;

/// One threshold scale of the sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ScaleWindow {
    /// Position in the sweep, ascending.
    pub index: usize,
    /// Window size as configured (`min + index * step`).
    pub nominal: u32,
    /// Window size handed to the threshold, forced odd.
    pub effective: u32,
}

/// Window sizes `min, min + step, ..., <= max`, each forced odd.
pub fn scale_windows(params: &QuadDetectorParams) -> Vec<ScaleWindow> {
    (0..params.num_scales())
        .map(|index| {
            let nominal = params.adaptive_thresh_win_size_min
                + index as u32 * params.adaptive_thresh_win_size_step;
            ScaleWindow {
                index,
                nominal,
                effective: force_odd(nominal),
            }
        })
        .collect()
}

#[inline]
fn force_odd(window: u32) -> u32 {
    if window % 2 == 0 {
        window + 1
    } else {
        window
    }
}

/// Binarize `image` at one scale.
pub fn binarize_scale<B: GeometryBackend + ?Sized>(
    backend: &B,
    image: &GrayImageView<'_>,
    window: ScaleWindow,
    params: &QuadDetectorParams,
) -> Result<GrayImage, BackendError> {
    backend.adaptive_binarize(
        image,
        window.effective,
        params.adaptive_thresh_constant,
        params.adaptive_method,
    )
}

/// Binarize `image` at every scale of the sweep.
///
/// The detector itself binarizes one scale at a time and drops each binary
/// image as soon as its contours are traced; this is the all-at-once form.
pub fn sweep_binarize<B: GeometryBackend + ?Sized>(
    backend: &B,
    image: &GrayImageView<'_>,
    params: &QuadDetectorParams,
) -> Vec<(ScaleWindow, Result<GrayImage, BackendError>)> {
    scale_windows(params)
        .into_iter()
        .map(|w| (w, binarize_scale(backend, image, w, params)))
        .collect()
}
