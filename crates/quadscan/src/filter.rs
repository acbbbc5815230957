//! Contour-to-quad filtering for one binary image.
//!
//! Gates run cheapest first and a contour is dropped at the first gate it
//! fails:
//! 1. contour length within the configured perimeter band,
//! 2. polygon approximation yields a convex 4-gon,
//! 3. adjacent corners not closer than `min_contour_size`,
//! 4. no corner within `min_distance_to_border` of the image edge.

use std::sync::Arc;

use log::{debug, trace};
use nalgebra::Point2;
use quadscan_core::{min_adjacent_dist_sq, Contour, GrayImageView};
use serde::Serialize;

use crate::backend::{BackendError, GeometryBackend};
use crate::{Candidate, QuadDetectError, QuadDetectorParams};

/// Per-scale gate counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    pub contours: usize,
    pub rejected_perimeter: usize,
    pub rejected_shape: usize,
    pub rejected_corner_spacing: usize,
    pub rejected_border: usize,
    pub accepted: usize,
}

/// Quads found at one threshold scale.
#[derive(Clone, Debug, Default)]
pub struct ScaleCandidates {
    pub window_size: u32,
    pub candidates: Vec<Candidate>,
    pub stats: FilterStats,
}

/// Why a scale produced no candidate list.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ScaleError {
    #[error(transparent)]
    Config(#[from] QuadDetectError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Trace contours in `binary` and keep the ones that look like marker quads.
///
/// Refuses to run on an invalid configuration so that a misconfigured
/// detector cannot be mistaken for an image without markers.
pub fn filter_quads<B: GeometryBackend + ?Sized>(
    backend: &B,
    binary: &GrayImageView<'_>,
    window_size: u32,
    params: &QuadDetectorParams,
) -> Result<ScaleCandidates, ScaleError> {
    params.validate_contour_filter()?;
    let contours = backend.find_contours(binary)?;
    Ok(filter_contours(
        backend,
        contours,
        binary.width,
        binary.height,
        window_size,
        params,
    ))
}

/// Gate already traced contours of a `width x height` image.
pub(crate) fn filter_contours<B: GeometryBackend + ?Sized>(
    backend: &B,
    contours: Vec<Contour>,
    width: usize,
    height: usize,
    window_size: u32,
    params: &QuadDetectorParams,
) -> ScaleCandidates {
    let max_dim = width.max(height);
    let min_perimeter_px = (params.min_marker_perimeter_rate * max_dim as f64) as usize;
    let max_perimeter_px = (params.max_marker_perimeter_rate * max_dim as f64) as usize;
    let min_corner_dist = params.min_contour_size as f64;
    let init_dist_sq = (max_dim as f64) * (max_dim as f64);

    let mut out = ScaleCandidates {
        window_size,
        ..ScaleCandidates::default()
    };

    for contour in contours {
        out.stats.contours += 1;

        let len = contour.len();
        if len < min_perimeter_px || len > max_perimeter_px {
            out.stats.rejected_perimeter += 1;
            continue;
        }

        let Some(corners) = approx_convex_quad(backend, &contour, params) else {
            out.stats.rejected_shape += 1;
            continue;
        };

        if min_adjacent_dist_sq(&corners, init_dist_sq) < min_corner_dist * min_corner_dist {
            out.stats.rejected_corner_spacing += 1;
            continue;
        }

        if too_near_border(&corners, width, height, params.min_distance_to_border) {
            out.stats.rejected_border += 1;
            continue;
        }

        out.stats.accepted += 1;
        out.candidates.push(Candidate {
            corners,
            contour: Arc::new(contour),
            window_size,
        });
    }

    debug!(
        "window {}: {} contours, {} accepted (perimeter {}, shape {}, spacing {}, border {})",
        window_size,
        out.stats.contours,
        out.stats.accepted,
        out.stats.rejected_perimeter,
        out.stats.rejected_shape,
        out.stats.rejected_corner_spacing,
        out.stats.rejected_border,
    );
    out
}

fn approx_convex_quad<B: GeometryBackend + ?Sized>(
    backend: &B,
    contour: &Contour,
    params: &QuadDetectorParams,
) -> Option<[Point2<f32>; 4]> {
    let epsilon = params.polygonal_approx_accuracy_rate * backend.arc_length(contour);
    let poly = match backend.approx_polygon(contour, epsilon) {
        Ok(poly) => poly,
        Err(err) => {
            trace!("approximation skipped: {err}");
            return None;
        }
    };
    if poly.len() != 4 {
        return None;
    }
    let corners = [0, 1, 2, 3].map(|i| Point2::new(poly[i].x as f32, poly[i].y as f32));
    backend.is_convex(&corners).then_some(corners)
}

fn too_near_border(corners: &[Point2<f32>; 4], width: usize, height: usize, min_dist: i32) -> bool {
    let d = min_dist as f32;
    let max_x = (width as f32 - 1.0) - d;
    let max_y = (height as f32 - 1.0) - d;
    corners
        .iter()
        .any(|p| p.x < d || p.y < d || p.x > max_x || p.y > max_y)
}
