//! Core types and utilities for quadrilateral marker-candidate detection.
//!
//! Grayscale image views, traced contours and polygon predicates. No
//! thresholding or contour tracing happens here; those live behind the
//! `GeometryBackend` trait of the `quadscan` crate.

mod contour;
mod image;
mod logger;
mod polygon;

pub use contour::Contour;
pub use image::{GrayImage, GrayImageView};
pub use polygon::{cross2, is_convex_polygon, min_adjacent_dist_sq};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
