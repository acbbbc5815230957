use serde::Serialize;

use crate::binarize::ScaleWindow;
use crate::dedup::GroupSummary;
use crate::filter::FilterStats;
use crate::Candidate;

/// What happened at one threshold scale.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScaleReport {
    pub window: ScaleWindow,
    pub stats: FilterStats,
    /// Backend failure that emptied this scale, if any.
    pub error: Option<String>,
}

/// Full result of [`QuadDetector::detect_with_report`](crate::QuadDetector::detect_with_report).
#[derive(Clone, Debug)]
pub struct DetectionReport {
    pub image_width: usize,
    pub image_height: usize,
    /// One entry per scale, ascending window size.
    pub scales: Vec<ScaleReport>,
    /// Duplicate groups found in the pooled candidates.
    pub groups: Vec<GroupSummary>,
    /// Number of candidates before deduplication.
    pub pooled: usize,
    /// Deduplicated candidates with clockwise corners.
    pub candidates: Vec<Candidate>,
}

impl DetectionReport {
    pub(crate) fn empty(image_width: usize, image_height: usize) -> Self {
        Self {
            image_width,
            image_height,
            scales: Vec::new(),
            groups: Vec::new(),
            pooled: 0,
            candidates: Vec::new(),
        }
    }

    /// Scales whose backend failed.
    pub fn failed_scales(&self) -> impl Iterator<Item = &ScaleReport> {
        self.scales.iter().filter(|s| s.error.is_some())
    }
}
