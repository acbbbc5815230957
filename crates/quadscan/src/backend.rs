//! Geometry collaborators: adaptive thresholding, contour tracing and polygon
//! helpers.
//!
//! The detector only talks to [`GeometryBackend`]. [`ImageprocBackend`] binds
//! it to `imageproc`.

use imageproc::point::Point;
use nalgebra::Point2;
use quadscan_core::{is_convex_polygon, Contour, GrayImage, GrayImageView};

use crate::threshold::{gaussian_kernel, threshold_against_mean};
use crate::AdaptiveMethod;

/// Failure of a geometry primitive.
///
/// These only ever cost the detector the scale they happened in.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("threshold window must be odd and >= 3 (got {0})")]
    InvalidWindow(u32),
    #[error("image of {width}x{height} pixels cannot be handed to the backend")]
    ImageSize { width: usize, height: usize },
    #[error("contour with {0} points cannot be approximated")]
    EmptyContour(usize),
    #[error("approximation tolerance must be positive and finite (got {0})")]
    InvalidEpsilon(f64),
}

/// The 2D primitives the candidate pipeline is built from.
pub trait GeometryBackend: Send + Sync {
    /// Binarize `image` against a local mean over an odd `window`.
    fn adaptive_binarize(
        &self,
        image: &GrayImageView<'_>,
        window: u32,
        constant: f64,
        method: AdaptiveMethod,
    ) -> Result<GrayImage, BackendError>;

    /// Trace the borders of all non-zero regions, outer borders and holes.
    fn find_contours(&self, binary: &GrayImageView<'_>) -> Result<Vec<Contour>, BackendError>;

    /// Closed Douglas-Peucker approximation with tolerance `epsilon`.
    fn approx_polygon(
        &self,
        contour: &Contour,
        epsilon: f64,
    ) -> Result<Vec<Point2<i32>>, BackendError>;

    /// Length of the closed contour.
    fn arc_length(&self, contour: &Contour) -> f64;

    fn is_convex(&self, polygon: &[Point2<f32>]) -> bool {
        is_convex_polygon(polygon)
    }

    /// Unsigned area of a closed polygon.
    fn area(&self, polygon: &[Point2<f32>]) -> f64;
}

/// [`GeometryBackend`] implemented with `imageproc`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageprocBackend;

impl ImageprocBackend {
    fn to_image(view: &GrayImageView<'_>) -> Result<image::GrayImage, BackendError> {
        let size_err = || BackendError::ImageSize {
            width: view.width,
            height: view.height,
        };
        let w = u32::try_from(view.width).map_err(|_| size_err())?;
        let h = u32::try_from(view.height).map_err(|_| size_err())?;
        image::GrayImage::from_raw(w, h, view.data.to_vec()).ok_or_else(size_err)
    }
}

impl GeometryBackend for ImageprocBackend {
    fn adaptive_binarize(
        &self,
        image: &GrayImageView<'_>,
        window: u32,
        constant: f64,
        method: AdaptiveMethod,
    ) -> Result<GrayImage, BackendError> {
        if window < 3 || window % 2 == 0 {
            return Err(BackendError::InvalidWindow(window));
        }
        if !image.is_consistent() {
            return Err(BackendError::ImageSize {
                width: image.width,
                height: image.height,
            });
        }

        let src = Self::to_image(image)?;
        let mean = match method {
            AdaptiveMethod::Gaussian => {
                imageproc::filter::separable_filter_equal(&src, &gaussian_kernel(window))
            }
            AdaptiveMethod::Mean => imageproc::filter::box_filter(&src, window / 2, window / 2),
        }
        .into_raw();

        Ok(GrayImage {
            width: image.width,
            height: image.height,
            data: threshold_against_mean(image.data, &mean, constant),
        })
    }

    fn find_contours(&self, binary: &GrayImageView<'_>) -> Result<Vec<Contour>, BackendError> {
        let img = Self::to_image(binary)?;
        Ok(imageproc::contours::find_contours::<i32>(&img)
            .into_iter()
            .map(|c| Contour::new(c.points.iter().map(|p| Point2::new(p.x, p.y)).collect()))
            .collect())
    }

    fn approx_polygon(
        &self,
        contour: &Contour,
        epsilon: f64,
    ) -> Result<Vec<Point2<i32>>, BackendError> {
        if !(epsilon > 0.0) || !epsilon.is_finite() {
            return Err(BackendError::InvalidEpsilon(epsilon));
        }
        if contour.len() < 3 {
            return Err(BackendError::EmptyContour(contour.len()));
        }
        let curve: Vec<Point<i32>> = contour
            .points
            .iter()
            .map(|p| Point::new(p.x, p.y))
            .collect();
        Ok(approximate_closed_dp(&curve, epsilon)
            .into_iter()
            .map(|p| Point2::new(p.x, p.y))
            .collect())
    }

    fn arc_length(&self, contour: &Contour) -> f64 {
        let curve: Vec<Point<i32>> = contour
            .points
            .iter()
            .map(|p| Point::new(p.x, p.y))
            .collect();
        imageproc::geometry::arc_length(&curve, true)
    }

    fn area(&self, polygon: &[Point2<f32>]) -> f64 {
        let pts: Vec<Point<f32>> = polygon.iter().map(|p| Point::new(p.x, p.y)).collect();
        imageproc::geometry::contour_area(&pts)
    }
}

/// Douglas-Peucker on a closed curve.
///
/// The curve is cut at two mutually distant points, which are always kept,
/// and each open half is simplified on its own. The result lists every
/// vertex once, in traversal order.
fn approximate_closed_dp(curve: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    let a = farthest_from(curve, curve[0]);
    let b = farthest_from(curve, curve[a]);
    let (a, b) = (a.min(b), a.max(b));
    if a == b {
        return vec![curve[a]];
    }

    let second: Vec<Point<i32>> = curve[b..].iter().chain(&curve[..=a]).copied().collect();
    let mut out = imageproc::geometry::approximate_polygon_dp(&curve[a..=b], epsilon, false);
    out.pop();
    let mut tail = imageproc::geometry::approximate_polygon_dp(&second, epsilon, false);
    tail.pop();
    out.append(&mut tail);
    out
}

fn farthest_from(curve: &[Point<i32>], from: Point<i32>) -> usize {
    let mut best = 0;
    let mut best_d = -1i64;
    for (i, p) in curve.iter().enumerate() {
        let dx = (p.x - from.x) as i64;
        let dy = (p.y - from.y) as i64;
        let d = dx * dx + dy * dy;
        if d > best_d {
            best = i;
            best_d = d;
        }
    }
    best
}
