use std::sync::Arc;

use nalgebra::Point2;
use quadscan_core::{cross2, Contour};

/// A convex quadrilateral that may contain a marker.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    /// Quad corners in image pixels. Clockwise on screen once the detector
    /// returns.
    pub corners: [Point2<f32>; 4],
    /// Contour the quad was approximated from.
    pub contour: Arc<Contour>,
    /// Effective (odd) threshold window of the scale that produced it.
    pub window_size: u32,
}

impl Candidate {
    /// Contour point count, the perimeter measure used by every size check.
    #[inline]
    pub fn perimeter(&self) -> usize {
        self.contour.len()
    }

    /// Cross product of `(c1 - c0)` and `(c2 - c0)`.
    #[inline]
    pub fn winding(&self) -> f64 {
        cross2(self.corners[0], self.corners[1], self.corners[2])
    }

    pub fn center(&self) -> Point2<f32> {
        let sum = self
            .corners
            .iter()
            .fold((0.0f32, 0.0f32), |acc, p| (acc.0 + p.x, acc.1 + p.y));
        Point2::new(sum.0 / 4.0, sum.1 / 4.0)
    }
}
