//! Canonical corner winding.

use nalgebra::Point2;
use quadscan_core::cross2;

use crate::Candidate;

/// Corners reordered so that `cross(c1 - c0, c2 - c0) >= 0`.
///
/// Corner 0 stays in place; when the quad runs the other way, corners 1 and 3
/// swap.
#[inline]
pub fn clockwise_corners(corners: &[Point2<f32>; 4]) -> [Point2<f32>; 4] {
    let mut out = *corners;
    if cross2(out[0], out[1], out[2]) < 0.0 {
        out.swap(1, 3);
    }
    out
}

/// Rewrite every candidate's corners into clockwise order, in place.
pub fn normalize_winding(candidates: &mut [Candidate]) {
    for c in candidates {
        c.corners = clockwise_corners(&c.corners);
    }
}
