//! Helpers for running the detector on `image` crate buffers.

use quadscan_core::GrayImageView;

use crate::{Candidate, QuadDetectError, QuadDetector, QuadDetectorParams};

/// Borrow an `image::GrayImage` as a [`GrayImageView`].
pub fn gray_view(img: &::image::GrayImage) -> GrayImageView<'_> {
    GrayImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Copy a row-major 8-bit buffer into an `image::GrayImage`.
pub fn gray_image_from_slice(
    width: u32,
    height: u32,
    pixels: &[u8],
) -> Result<::image::GrayImage, QuadDetectError> {
    let w = usize::try_from(width).ok();
    let h = usize::try_from(height).ok();
    let Some(expected) = w.zip(h).and_then(|(w, h)| w.checked_mul(h)) else {
        return Err(QuadDetectError::InvalidDimensions { width, height });
    };
    if pixels.len() != expected {
        return Err(QuadDetectError::InvalidImage {
            expected,
            got: pixels.len(),
        });
    }
    ::image::GrayImage::from_raw(width, height, pixels.to_vec())
        .ok_or(QuadDetectError::InvalidDimensions { width, height })
}

/// Detect candidates in any decoded image, converting to 8-bit luma first.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        level = "info",
        skip(img, params),
        fields(width = img.width(), height = img.height())
    )
)]
pub fn detect_candidates(
    img: &::image::DynamicImage,
    params: QuadDetectorParams,
) -> Result<Vec<Candidate>, QuadDetectError> {
    detect_candidates_gray(&img.to_luma8(), params)
}

/// Detect candidates in an 8-bit grayscale image.
pub fn detect_candidates_gray(
    img: &::image::GrayImage,
    params: QuadDetectorParams,
) -> Result<Vec<Candidate>, QuadDetectError> {
    QuadDetector::new(params)?.detect(&gray_view(img))
}

/// Detect candidates in a raw row-major 8-bit buffer.
pub fn detect_candidates_from_gray_u8(
    width: u32,
    height: u32,
    pixels: &[u8],
    params: QuadDetectorParams,
) -> Result<Vec<Candidate>, QuadDetectError> {
    let img = gray_image_from_slice(width, height, pixels)?;
    detect_candidates_gray(&img, params)
}
