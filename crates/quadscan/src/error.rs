/// Errors returned by the quad detector.
///
/// Finding no markers is not an error; an empty candidate list is returned
/// instead.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuadDetectError {
    #[error("invalid configuration: {field} {reason}")]
    InvalidConfiguration {
        field: &'static str,
        reason: &'static str,
    },
    #[error("invalid grayscale image buffer length (expected {expected} bytes, got {got})")]
    InvalidImage { expected: usize, got: usize },
    #[error("invalid grayscale image dimensions (width={width}, height={height})")]
    InvalidDimensions { width: u32, height: u32 },
}
