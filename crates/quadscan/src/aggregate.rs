use std::sync::Arc;

use quadscan_core::Contour;

use crate::filter::ScaleCandidates;
use crate::Candidate;

/// All candidates of one detection call, scale-ascending then in detection
/// order within a scale.
///
/// Every candidate carries its own contour, so `candidates()[i]` and
/// `contours()[i]` always describe the same detection.
#[derive(Clone, Debug, Default)]
pub struct CandidatePool {
    candidates: Vec<Candidate>,
}

impl CandidatePool {
    #[inline]
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Source contours, index-aligned with [`candidates`](Self::candidates).
    pub fn contours(&self) -> Vec<&Arc<Contour>> {
        self.candidates.iter().map(|c| &c.contour).collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn into_candidates(self) -> Vec<Candidate> {
        self.candidates
    }
}

impl From<Vec<Candidate>> for CandidatePool {
    fn from(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }
}

/// Concatenate per-scale results in the order given. No filtering.
pub fn aggregate(per_scale: impl IntoIterator<Item = ScaleCandidates>) -> CandidatePool {
    let mut candidates = Vec::new();
    for scale in per_scale {
        candidates.extend(scale.candidates);
    }
    CandidatePool { candidates }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;

    fn candidate(window_size: u32, offset: f32) -> Candidate {
        Candidate {
            corners: [
                Point2::new(offset, offset),
                Point2::new(offset + 10.0, offset),
                Point2::new(offset + 10.0, offset + 10.0),
                Point2::new(offset, offset + 10.0),
            ],
            contour: Arc::new(Contour::new(vec![Point2::new(window_size as i32, 0)])),
            window_size,
        }
    }

    #[test]
    fn keeps_scale_then_detection_order() {
        let scales = vec![
            ScaleCandidates {
                window_size: 3,
                candidates: vec![candidate(3, 0.0), candidate(3, 50.0)],
                ..ScaleCandidates::default()
            },
            ScaleCandidates {
                window_size: 13,
                ..ScaleCandidates::default()
            },
            ScaleCandidates {
                window_size: 23,
                candidates: vec![candidate(23, 5.0)],
                ..ScaleCandidates::default()
            },
        ];
        let pool = aggregate(scales);
        let order: Vec<(u32, f32)> = pool
            .candidates()
            .iter()
            .map(|c| (c.window_size, c.corners[0].x))
            .collect();
        assert_eq!(order, vec![(3, 0.0), (3, 50.0), (23, 5.0)]);

        let contours = pool.contours();
        assert_eq!(contours.len(), pool.len());
        for (c, contour) in pool.candidates().iter().zip(contours) {
            assert!(Arc::ptr_eq(&c.contour, contour));
        }
    }

    #[test]
    fn empty_input_gives_empty_pool() {
        assert!(aggregate(Vec::new()).is_empty());
    }
}
