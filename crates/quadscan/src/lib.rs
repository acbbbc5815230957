//! Multi-scale quadrilateral candidate detection for square fiducial markers.
//!
//! The detector binarizes a grayscale image with an adaptive threshold at a
//! sweep of window sizes, keeps every traced contour that approximates a
//! convex quadrilateral of plausible size, and collapses the copies of the
//! same marker found at several scales or on both borders of its frame. What
//! comes out is a list of clockwise quads for a downstream decoder; no bits
//! are read here.
//!
//! ## Quickstart
//!
//! ```no_run
//! use quadscan::{detect, QuadDetectorParams};
//! use image::ImageReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = ImageReader::open("markers.png")?.decode()?;
//! let candidates = detect::detect_candidates(&img, QuadDetectorParams::default())?;
//! for c in &candidates {
//!     println!("window {}: {:?}", c.window_size, c.corners);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - [`QuadDetector`]: the full pipeline, with [`DetectionReport`] diagnostics.
//! - [`binarize`], [`filter`], [`aggregate`](mod@aggregate), [`dedup`], [`winding`]: the
//!   individual stages, usable on their own.
//! - [`GeometryBackend`]: the thresholding, contour and polygon primitives;
//!   [`ImageprocBackend`] is the default implementation.
//! - [`detect`]: helpers for `image` crate buffers.
//!
//! ## Features
//! - `rayon` (default): process threshold scales in parallel.
//! - `tracing`: emit spans for the detection entry points.

pub mod aggregate;
pub mod backend;
pub mod binarize;
mod candidate;
pub mod dedup;
pub mod detect;
mod detector;
mod error;
pub mod filter;
mod params;
mod report;
mod threshold;
pub mod winding;

pub use quadscan_core::{Contour, GrayImage, GrayImageView};

pub use aggregate::{aggregate, CandidatePool};
pub use backend::{BackendError, GeometryBackend, ImageprocBackend};
pub use binarize::ScaleWindow;
pub use candidate::Candidate;
pub use dedup::{dedup_candidates, DedupOutcome, GroupSummary};
pub use detector::QuadDetector;
pub use error::QuadDetectError;
pub use filter::{filter_quads, FilterStats, ScaleCandidates, ScaleError};
pub use params::{AdaptiveMethod, QuadDetectorParams};
pub use report::{DetectionReport, ScaleReport};
pub use winding::{clockwise_corners, normalize_winding};
