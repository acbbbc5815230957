//! End-to-end multi-scale candidate detection.
//!
//! Pipeline:
//! 1. binarize the image at every window size of the sweep,
//! 2. trace each binary image and keep the convex quads,
//! 3. pool all scales in ascending window order,
//! 4. collapse cross-scale duplicates,
//! 5. rewrite corners clockwise.
//!
//! Scales are independent until step 3 and run on the rayon pool when the
//! `rayon` feature is enabled. Each binary image is dropped as soon as its
//! contours are traced.

use log::{debug, warn};
use quadscan_core::GrayImageView;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::aggregate::aggregate;
use crate::backend::{GeometryBackend, ImageprocBackend};
use crate::binarize::{binarize_scale, scale_windows, ScaleWindow};
use crate::dedup::{dedup_candidates, DedupOutcome};
use crate::filter::{filter_quads, FilterStats, ScaleCandidates, ScaleError};
use crate::report::{DetectionReport, ScaleReport};
use crate::winding::normalize_winding;
use crate::{Candidate, QuadDetectError, QuadDetectorParams};

/// Multi-scale quad candidate detector.
///
/// Holds validated parameters and a geometry backend; detection itself keeps
/// no state, so one detector may serve many images and threads.
#[derive(Clone, Debug)]
pub struct QuadDetector<B: GeometryBackend = ImageprocBackend> {
    params: QuadDetectorParams,
    backend: B,
}

impl QuadDetector {
    /// Detector backed by `imageproc`.
    pub fn new(params: QuadDetectorParams) -> Result<Self, QuadDetectError> {
        Self::with_backend(params, ImageprocBackend)
    }
}

impl<B: GeometryBackend> QuadDetector<B> {
    pub fn with_backend(params: QuadDetectorParams, backend: B) -> Result<Self, QuadDetectError> {
        params.validate()?;
        Ok(Self { params, backend })
    }

    #[inline]
    pub fn params(&self) -> &QuadDetectorParams {
        &self.params
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Deduplicated, clockwise candidate quads of `image`.
    pub fn detect(&self, image: &GrayImageView<'_>) -> Result<Vec<Candidate>, QuadDetectError> {
        Ok(self.detect_with_report(image)?.candidates)
    }

    /// Like [`detect`](Self::detect), plus per-scale statistics and the
    /// duplicate groups.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            level = "info",
            skip(self, image),
            fields(width = image.width, height = image.height)
        )
    )]
    pub fn detect_with_report(
        &self,
        image: &GrayImageView<'_>,
    ) -> Result<DetectionReport, QuadDetectError> {
        if !image.is_consistent() {
            return Err(QuadDetectError::InvalidImage {
                expected: image.width.saturating_mul(image.height),
                got: image.data.len(),
            });
        }
        if image.is_empty() {
            return Ok(DetectionReport::empty(image.width, image.height));
        }

        let results = self.run_scales(image);

        let mut scales = Vec::with_capacity(results.len());
        let mut per_scale = Vec::with_capacity(results.len());
        for (window, result) in results {
            match result {
                Ok(found) => {
                    scales.push(ScaleReport {
                        window,
                        stats: found.stats,
                        error: None,
                    });
                    per_scale.push(found);
                }
                Err(ScaleError::Config(err)) => return Err(err),
                Err(ScaleError::Backend(err)) => {
                    warn!("window {}: scale skipped: {err}", window.effective);
                    scales.push(ScaleReport {
                        window,
                        stats: FilterStats::default(),
                        error: Some(err.to_string()),
                    });
                }
            }
        }

        let pool = aggregate(per_scale);
        let pooled = pool.len();
        let DedupOutcome {
            mut candidates,
            groups,
        } = dedup_candidates(&self.backend, pool, &self.params)?;
        normalize_winding(&mut candidates);

        debug!(
            "{}x{}: {} scales, {} pooled, {} candidates",
            image.width,
            image.height,
            scales.len(),
            pooled,
            candidates.len()
        );

        Ok(DetectionReport {
            image_width: image.width,
            image_height: image.height,
            scales,
            groups,
            pooled,
            candidates,
        })
    }

    #[cfg(feature = "rayon")]
    fn run_scales(
        &self,
        image: &GrayImageView<'_>,
    ) -> Vec<(ScaleWindow, Result<ScaleCandidates, ScaleError>)> {
        scale_windows(&self.params)
            .into_par_iter()
            .map(|w| (w, self.process_scale(image, w)))
            .collect()
    }

    #[cfg(not(feature = "rayon"))]
    fn run_scales(
        &self,
        image: &GrayImageView<'_>,
    ) -> Vec<(ScaleWindow, Result<ScaleCandidates, ScaleError>)> {
        scale_windows(&self.params)
            .into_iter()
            .map(|w| (w, self.process_scale(image, w)))
            .collect()
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            level = "debug",
            skip(self, image, window),
            fields(window = window.effective)
        )
    )]
    fn process_scale(
        &self,
        image: &GrayImageView<'_>,
        window: ScaleWindow,
    ) -> Result<ScaleCandidates, ScaleError> {
        let binary = binarize_scale(&self.backend, image, window, &self.params)?;
        filter_quads(&self.backend, &binary.view(), window.effective, &self.params)
    }
}
