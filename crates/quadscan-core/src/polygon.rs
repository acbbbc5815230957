//! Small polygon predicates used by the quad filter and the winding fix.

use nalgebra::Point2;

/// 2D cross product of `(a - o)` and `(b - o)`.
///
/// In image coordinates (y pointing down) a positive value means `o -> a -> b`
/// turns clockwise on screen.
#[inline]
pub fn cross2(o: Point2<f32>, a: Point2<f32>, b: Point2<f32>) -> f64 {
    let dx1 = (a.x - o.x) as f64;
    let dy1 = (a.y - o.y) as f64;
    let dx2 = (b.x - o.x) as f64;
    let dy2 = (b.y - o.y) as f64;
    dx1 * dy2 - dy1 * dx2
}

/// `true` when every turn of the closed polygon has the same orientation.
///
/// Collinear vertices are tolerated; a polygon with no turn at all is not
/// convex.
pub fn is_convex_polygon(poly: &[Point2<f32>]) -> bool {
    let n = poly.len();
    if n < 3 {
        return false;
    }
    let mut orientation = 0i8;
    for i in 0..n {
        let c = cross2(poly[i], poly[(i + 1) % n], poly[(i + 2) % n]);
        let sign = if c > 0.0 {
            1
        } else if c < 0.0 {
            -1
        } else {
            continue;
        };
        if orientation == 0 {
            orientation = sign;
        } else if orientation != sign {
            return false;
        }
    }
    orientation != 0
}

/// Minimum squared distance between consecutive corners of a closed polygon,
/// starting from `init`.
pub fn min_adjacent_dist_sq(poly: &[Point2<f32>], init: f64) -> f64 {
    let n = poly.len();
    let mut best = init;
    for i in 0..n {
        let a = poly[i];
        let b = poly[(i + 1) % n];
        let dx = (a.x - b.x) as f64;
        let dy = (a.y - b.y) as f64;
        best = best.min(dx * dx + dy * dy);
    }
    best
}
