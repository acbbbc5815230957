#![allow(dead_code)]

use quadscan::{Candidate, GrayImage};

/// White canvas with black axis-aligned squares, given as `(x, y, side)`.
pub fn squares_on_white(width: usize, height: usize, squares: &[(usize, usize, usize)]) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        let inside = squares
            .iter()
            .any(|&(sx, sy, side)| (sx..sx + side).contains(&x) && (sy..sy + side).contains(&y));
        if inside {
            0
        } else {
            255
        }
    })
}

/// Corners of the square `(x, y, side)` as pixel centers.
pub fn square_corners(x: usize, y: usize, side: usize) -> [(f32, f32); 4] {
    let (x0, y0) = (x as f32, y as f32);
    let x1 = (x + side - 1) as f32;
    let y1 = (y + side - 1) as f32;
    [(x0, y0), (x1, y0), (x1, y1), (x0, y1)]
}

/// Every expected corner lies within `tol` pixels of some candidate corner.
pub fn assert_corners_near(c: &Candidate, expected: [(f32, f32); 4], tol: f32) {
    for (ex, ey) in expected {
        let hit = c
            .corners
            .iter()
            .any(|p| (p.x - ex).abs() <= tol && (p.y - ey).abs() <= tol);
        assert!(hit, "corner ({ex}, {ey}) not within {tol}px of {:?}", c.corners);
    }
}

pub fn assert_clockwise(candidates: &[Candidate]) {
    for c in candidates {
        assert!(c.winding() >= 0.0, "counter-clockwise corners {:?}", c.corners);
    }
}
