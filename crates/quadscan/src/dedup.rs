//! Cross-scale deduplication of quad candidates.
//!
//! The same marker is usually found at several threshold scales, and once as
//! the outer border and once as the hole border of its dark frame. Pairs whose
//! corners nearly coincide under some cyclic alignment are grouped, and each
//! group is reduced to its largest quad.
//!
//! Grouping is pairwise and greedy: a close pair whose members already sit in
//! two different groups does not merge those groups.

use log::debug;
use nalgebra::Point2;
use serde::Serialize;

use crate::aggregate::CandidatePool;
use crate::backend::GeometryBackend;
use crate::winding::clockwise_corners;
use crate::{Candidate, QuadDetectError, QuadDetectorParams};

/// One group of pooled candidates judged to be the same marker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    /// Pool indices, in the order they joined.
    pub members: Vec<usize>,
    /// Largest-area member; the one forwarded to the output.
    pub representative: usize,
    /// Smallest-area member, tracked only with `detect_inverted_marker`.
    pub inverted_representative: Option<usize>,
}

/// Result of [`dedup_candidates`].
#[derive(Clone, Debug, Default)]
pub struct DedupOutcome {
    /// One candidate per group plus every ungrouped candidate, ordered by the
    /// lowest pool index they stand for.
    pub candidates: Vec<Candidate>,
    pub groups: Vec<GroupSummary>,
}

/// Collapse near-duplicate candidates of `pool` into one representative each.
pub fn dedup_candidates<B: GeometryBackend + ?Sized>(
    backend: &B,
    pool: CandidatePool,
    params: &QuadDetectorParams,
) -> Result<DedupOutcome, QuadDetectError> {
    if !(params.min_marker_distance_rate >= 0.0) {
        return Err(QuadDetectError::InvalidConfiguration {
            field: "min_marker_distance_rate",
            reason: "must be >= 0",
        });
    }

    let candidates = pool.into_candidates();
    let pooled = candidates.len();
    let views: Vec<[Point2<f32>; 4]> = candidates
        .iter()
        .map(|c| clockwise_corners(&c.corners))
        .collect();
    let perimeters: Vec<usize> = candidates.iter().map(Candidate::perimeter).collect();

    let (group_of, members) = group_pairs(&views, &perimeters, params.min_marker_distance_rate);

    let groups: Vec<GroupSummary> = members
        .into_iter()
        .map(|members| summarize_group(backend, &candidates, members, params))
        .collect();

    let mut slots: Vec<Option<Candidate>> = candidates.into_iter().map(Some).collect();
    let mut kept = Vec::new();
    for i in 0..slots.len() {
        let pick = match group_of[i] {
            None => Some(i),
            Some(g) if groups[g].members[0] == i => Some(groups[g].representative),
            Some(_) => None,
        };
        if let Some(c) = pick.and_then(|idx| slots[idx].take()) {
            kept.push(c);
        }
    }

    debug!(
        "dedup: {} pooled, {} groups, {} kept",
        pooled,
        groups.len(),
        kept.len()
    );

    Ok(DedupOutcome {
        candidates: kept,
        groups,
    })
}

/// Greedy pairwise grouping. Returns the group id per candidate and the
/// member lists per group.
fn group_pairs(
    views: &[[Point2<f32>; 4]],
    perimeters: &[usize],
    rate: f64,
) -> (Vec<Option<usize>>, Vec<Vec<usize>>) {
    let n = views.len();
    let mut group_of: Vec<Option<usize>> = vec![None; n];
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for i in 0..n {
        for j in (i + 1)..n {
            let min_perimeter = perimeters[i].min(perimeters[j]) as f64;
            let limit = min_perimeter * rate;
            if !corners_coincide(&views[i], &views[j], limit * limit) {
                continue;
            }
            match (group_of[i], group_of[j]) {
                (None, None) => {
                    let g = groups.len();
                    group_of[i] = Some(g);
                    group_of[j] = Some(g);
                    groups.push(vec![i, j]);
                }
                (Some(g), None) => {
                    group_of[j] = Some(g);
                    groups[g].push(j);
                }
                (None, Some(g)) => {
                    group_of[i] = Some(g);
                    groups[g].push(i);
                }
                (Some(_), Some(_)) => {}
            }
        }
    }

    (group_of, groups)
}

/// `true` if for some cyclic offset the mean squared distance between
/// aligned corners is below `limit_sq`.
fn corners_coincide(a: &[Point2<f32>; 4], b: &[Point2<f32>; 4], limit_sq: f64) -> bool {
    (0..4).any(|fc| mean_sq_corner_distance(a, b, fc) < limit_sq)
}

/// Mean squared distance between `a[(c + fc) % 4]` and `b[c]`.
fn mean_sq_corner_distance(a: &[Point2<f32>; 4], b: &[Point2<f32>; 4], fc: usize) -> f64 {
    let sum: f64 = (0..4)
        .map(|c| {
            let p = a[(c + fc) % 4];
            let q = b[c];
            let dx = (p.x - q.x) as f64;
            let dy = (p.y - q.y) as f64;
            dx * dx + dy * dy
        })
        .sum();
    sum / 4.0
}

fn summarize_group<B: GeometryBackend + ?Sized>(
    backend: &B,
    candidates: &[Candidate],
    members: Vec<usize>,
    params: &QuadDetectorParams,
) -> GroupSummary {
    let first = members[0];
    let mut bigger = first;
    let mut bigger_area = backend.area(&candidates[first].corners);
    let mut smaller = first;
    let mut smaller_area = bigger_area;

    for &idx in &members[1..] {
        let area = backend.area(&candidates[idx].corners);
        if area >= bigger_area {
            bigger = idx;
            bigger_area = area;
        }
        if params.detect_inverted_marker && area < smaller_area {
            smaller = idx;
            smaller_area = area;
        }
    }

    GroupSummary {
        members,
        representative: bigger,
        inverted_representative: params.detect_inverted_marker.then_some(smaller),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ImageprocBackend;
    use quadscan_core::Contour;
    use std::sync::Arc;

    /// Axis-aligned square candidate with a contour of `perimeter` points.
    fn square(x: f32, y: f32, side: f32, perimeter: usize) -> Candidate {
        Candidate {
            corners: [
                Point2::new(x, y),
                Point2::new(x + side, y),
                Point2::new(x + side, y + side),
                Point2::new(x, y + side),
            ],
            contour: Arc::new(Contour::new(vec![Point2::new(0, 0); perimeter])),
            window_size: 3,
        }
    }

    fn dedup(cands: Vec<Candidate>, params: &QuadDetectorParams) -> DedupOutcome {
        dedup_candidates(&ImageprocBackend, CandidatePool::from(cands), params).expect("dedup")
    }

    #[test]
    fn nested_detections_collapse_to_the_largest() {
        // Outer border, inner border, and a slightly shifted copy.
        let cands = vec![
            square(52.0, 52.0, 96.0, 380),
            square(49.0, 49.0, 102.0, 404),
            square(50.0, 51.0, 100.0, 396),
        ];
        let out = dedup(cands, &QuadDetectorParams::default());
        assert_eq!(out.candidates.len(), 1);
        assert_eq!(out.groups.len(), 1);
        assert_eq!(out.groups[0].members, vec![0, 1, 2]);
        assert_eq!(out.groups[0].representative, 1);
        assert_eq!(out.groups[0].inverted_representative, None);
        assert_eq!(out.candidates[0].corners[0], Point2::new(49.0, 49.0));
    }

    #[test]
    fn rotation_and_winding_do_not_hide_duplicates() {
        let a = square(50.0, 50.0, 100.0, 400);
        let mut b = square(51.0, 50.0, 100.0, 400);
        // Same quad, started at another corner and listed counter-clockwise.
        b.corners = [b.corners[2], b.corners[1], b.corners[0], b.corners[3]];
        let out = dedup(vec![a, b], &QuadDetectorParams::default());
        assert_eq!(out.candidates.len(), 1);
    }

    #[test]
    fn distant_markers_stay_separate() {
        let cands = vec![
            square(20.0, 20.0, 60.0, 240),
            square(200.0, 20.0, 60.0, 240),
        ];
        let out = dedup(cands, &QuadDetectorParams::default());
        assert_eq!(out.candidates.len(), 2);
        assert!(out.groups.is_empty());
    }

    #[test]
    fn threshold_uses_smaller_perimeter() {
        // Offset of 5 px: mean squared distance 25.
        let a = square(50.0, 50.0, 100.0, 400);
        let b = square(55.0, 50.0, 100.0, 90);
        // 0.05 * 90 = 4.5 -> 20.25 < 25, no merge.
        let out = dedup(vec![a.clone(), b], &QuadDetectorParams::default());
        assert_eq!(out.candidates.len(), 2);

        let b = square(55.0, 50.0, 100.0, 120);
        // 0.05 * 120 = 6 -> 36 > 25, merge.
        let out = dedup(vec![a, b], &QuadDetectorParams::default());
        assert_eq!(out.candidates.len(), 1);
    }

    #[test]
    fn separate_groups_are_not_bridged() {
        // Pairs closer than 0.05 * 400 = 20 px match. 4 joins {0, 1} through
        // 1, then {2, 3} forms; 2 ~ 4 matches but both are grouped already.
        let cands = vec![
            square(0.0, 0.0, 100.0, 400),
            square(10.0, 0.0, 100.0, 400),
            square(40.0, 0.0, 100.0, 400),
            square(50.0, 0.0, 100.0, 400),
            square(25.0, 0.0, 100.0, 400),
        ];
        let out = dedup(cands, &QuadDetectorParams::default());
        assert_eq!(out.groups.len(), 2);
        assert_eq!(out.groups[0].members, vec![0, 1, 4]);
        assert_eq!(out.groups[1].members, vec![2, 3]);
        assert_eq!(out.candidates.len(), 2);
    }

    #[test]
    fn ungrouped_candidates_pass_through_in_order() {
        let cands = vec![
            square(300.0, 300.0, 50.0, 200),
            square(0.0, 0.0, 100.0, 400),
            square(1.0, 1.0, 98.0, 392),
            square(600.0, 600.0, 50.0, 200),
        ];
        let out = dedup(cands, &QuadDetectorParams::default());
        let firsts: Vec<f32> = out.candidates.iter().map(|c| c.corners[0].x).collect();
        assert_eq!(firsts, vec![300.0, 0.0, 600.0]);
    }

    #[test]
    fn inverted_mode_tracks_smallest_member() {
        let params = QuadDetectorParams {
            detect_inverted_marker: true,
            ..QuadDetectorParams::default()
        };
        let cands = vec![
            square(50.0, 50.0, 100.0, 400),
            square(53.0, 53.0, 94.0, 376),
            square(48.0, 48.0, 104.0, 416),
        ];
        let out = dedup(cands, &params);
        assert_eq!(out.groups[0].representative, 2);
        assert_eq!(out.groups[0].inverted_representative, Some(1));
        assert_eq!(out.candidates.len(), 1);
        assert_eq!(out.candidates[0].corners[0], Point2::new(48.0, 48.0));
    }

    #[test]
    fn equal_areas_prefer_the_later_member() {
        let cands = vec![
            square(50.0, 50.0, 100.0, 400),
            square(51.0, 50.0, 100.0, 400),
        ];
        let out = dedup(cands, &QuadDetectorParams::default());
        assert_eq!(out.groups[0].representative, 1);
    }

    #[test]
    fn deduplicated_output_is_stable() {
        let cands = vec![
            square(52.0, 52.0, 96.0, 380),
            square(49.0, 49.0, 102.0, 404),
            square(300.0, 40.0, 80.0, 320),
            square(301.0, 41.0, 78.0, 312),
        ];
        let params = QuadDetectorParams::default();
        let once = dedup(cands, &params).candidates;
        let twice = dedup(once.clone(), &params);
        assert_eq!(twice.candidates, once);
        assert!(twice.groups.is_empty());
    }

    #[test]
    fn negative_rate_is_rejected() {
        let params = QuadDetectorParams {
            min_marker_distance_rate: -1.0,
            ..QuadDetectorParams::default()
        };
        let err = dedup_candidates(&ImageprocBackend, CandidatePool::default(), &params);
        assert!(matches!(
            err,
            Err(QuadDetectError::InvalidConfiguration { .. })
        ));
    }
}
