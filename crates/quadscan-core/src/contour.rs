use nalgebra::Point2;

/// A traced pixel boundary of a connected region in a binary image.
///
/// Points are integer pixel coordinates in tracing order. The number of
/// points doubles as the contour "perimeter" in all size comparisons.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contour {
    pub points: Vec<Point2<i32>>,
}

impl Contour {
    pub fn new(points: Vec<Point2<i32>>) -> Self {
        Self { points }
    }

    /// Number of traced points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_is_point_count() {
        let c = Contour::new(vec![
            Point2::new(0, 0),
            Point2::new(1, 0),
            Point2::new(1, 1),
            Point2::new(0, 1),
        ]);
        assert_eq!(c.len(), 4);
        assert!(!c.is_empty());
        assert!(Contour::new(Vec::new()).is_empty());
    }
}
