use serde::{Deserialize, Serialize};

use crate::QuadDetectError;

/// Local statistic the adaptive threshold compares each pixel against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdaptiveMethod {
    /// Gaussian-weighted mean over the window.
    #[default]
    Gaussian,
    /// Plain box mean over the window, edge pixels replicated.
    Mean,
}

/// Configuration of one detection run.
///
/// The value is read-only for the duration of a call; every stage receives it
/// by reference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadDetectorParams {
    /// Smallest adaptive-threshold window, in pixels (>= 3).
    pub adaptive_thresh_win_size_min: u32,
    /// Largest adaptive-threshold window, inclusive.
    pub adaptive_thresh_win_size_max: u32,
    /// Increment between consecutive windows (> 0).
    pub adaptive_thresh_win_size_step: u32,
    /// Constant subtracted from the local mean before comparing.
    pub adaptive_thresh_constant: f64,
    pub adaptive_method: AdaptiveMethod,
    /// Minimum contour length relative to `max(width, height)`.
    pub min_marker_perimeter_rate: f64,
    /// Maximum contour length relative to `max(width, height)`.
    pub max_marker_perimeter_rate: f64,
    /// Polygon approximation tolerance relative to the contour arc length.
    pub polygonal_approx_accuracy_rate: f64,
    /// Nominally the minimum corner spacing relative to the contour length.
    ///
    /// Only validated. The corner-spacing gate uses the fixed
    /// [`min_contour_size`](Self::min_contour_size) pixel threshold instead.
    pub min_corner_distance_rate: f64,
    /// Minimum distance between adjacent quad corners, in pixels.
    pub min_contour_size: u32,
    /// Corners closer than this to any image edge reject the quad, in pixels.
    pub min_distance_to_border: i32,
    /// Candidates whose mean squared corner distance is below
    /// `(rate * min_perimeter)^2` are treated as one marker.
    pub min_marker_distance_rate: f64,
    /// Also track the smallest member of each duplicate group (white-on-black
    /// markers). The output still forwards the largest member.
    pub detect_inverted_marker: bool,
}

impl Default for QuadDetectorParams {
    fn default() -> Self {
        Self {
            adaptive_thresh_win_size_min: 3,
            adaptive_thresh_win_size_max: 23,
            adaptive_thresh_win_size_step: 10,
            adaptive_thresh_constant: 7.0,
            adaptive_method: AdaptiveMethod::Gaussian,
            min_marker_perimeter_rate: 0.03,
            max_marker_perimeter_rate: 4.0,
            polygonal_approx_accuracy_rate: 0.03,
            min_corner_distance_rate: 0.05,
            min_contour_size: 10,
            min_distance_to_border: 3,
            min_marker_distance_rate: 0.05,
            detect_inverted_marker: false,
        }
    }
}

impl QuadDetectorParams {
    /// Check every field a stage relies on.
    ///
    /// Comparisons are written so that NaN fails them.
    pub fn validate(&self) -> Result<(), QuadDetectError> {
        if self.adaptive_thresh_win_size_min < 3 {
            return Err(invalid("adaptive_thresh_win_size_min", "must be >= 3"));
        }
        if self.adaptive_thresh_win_size_step == 0 {
            return Err(invalid("adaptive_thresh_win_size_step", "must be > 0"));
        }
        if self.adaptive_thresh_win_size_max < self.adaptive_thresh_win_size_min {
            return Err(invalid(
                "adaptive_thresh_win_size_max",
                "must be >= adaptive_thresh_win_size_min",
            ));
        }
        if !self.adaptive_thresh_constant.is_finite() {
            return Err(invalid("adaptive_thresh_constant", "must be finite"));
        }
        self.validate_contour_filter()?;
        if !(self.min_marker_distance_rate >= 0.0) {
            return Err(invalid("min_marker_distance_rate", "must be >= 0"));
        }
        Ok(())
    }

    /// The subset of [`validate`](Self::validate) the contour filter needs.
    pub fn validate_contour_filter(&self) -> Result<(), QuadDetectError> {
        if !(self.min_marker_perimeter_rate > 0.0) {
            return Err(invalid("min_marker_perimeter_rate", "must be > 0"));
        }
        if !(self.max_marker_perimeter_rate > 0.0) {
            return Err(invalid("max_marker_perimeter_rate", "must be > 0"));
        }
        if !(self.polygonal_approx_accuracy_rate > 0.0) {
            return Err(invalid("polygonal_approx_accuracy_rate", "must be > 0"));
        }
        if !(self.min_corner_distance_rate >= 0.0) {
            return Err(invalid("min_corner_distance_rate", "must be >= 0"));
        }
        if self.min_distance_to_border < 0 {
            return Err(invalid("min_distance_to_border", "must be >= 0"));
        }
        Ok(())
    }

    /// Number of threshold scales the sweep produces.
    pub fn num_scales(&self) -> usize {
        if self.adaptive_thresh_win_size_step == 0
            || self.adaptive_thresh_win_size_max < self.adaptive_thresh_win_size_min
        {
            return 0;
        }
        ((self.adaptive_thresh_win_size_max - self.adaptive_thresh_win_size_min)
            / self.adaptive_thresh_win_size_step) as usize
            + 1
    }
}

fn invalid(field: &'static str, reason: &'static str) -> QuadDetectError {
    QuadDetectError::InvalidConfiguration { field, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_and_sweep_three_scales() {
        let params = QuadDetectorParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.num_scales(), 3);
    }

    #[test]
    fn partial_step_truncates_the_sweep() {
        let params = QuadDetectorParams {
            adaptive_thresh_win_size_min: 3,
            adaptive_thresh_win_size_max: 20,
            adaptive_thresh_win_size_step: 10,
            ..QuadDetectorParams::default()
        };
        assert_eq!(params.num_scales(), 2);
    }

    #[test]
    fn rejects_non_positive_perimeter_rates() {
        let params = QuadDetectorParams {
            min_marker_perimeter_rate: 0.0,
            ..QuadDetectorParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(QuadDetectError::InvalidConfiguration {
                field: "min_marker_perimeter_rate",
                ..
            })
        ));

        let params = QuadDetectorParams {
            max_marker_perimeter_rate: f64::NAN,
            ..QuadDetectorParams::default()
        };
        assert!(params.validate_contour_filter().is_err());
    }

    #[test]
    fn rejects_negative_distances() {
        let params = QuadDetectorParams {
            min_distance_to_border: -1,
            ..QuadDetectorParams::default()
        };
        assert!(params.validate_contour_filter().is_err());

        let params = QuadDetectorParams {
            min_corner_distance_rate: -0.1,
            ..QuadDetectorParams::default()
        };
        assert!(params.validate_contour_filter().is_err());

        let params = QuadDetectorParams {
            min_marker_distance_rate: -0.1,
            ..QuadDetectorParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn rejects_bad_window_ranges() {
        for params in [
            QuadDetectorParams {
                adaptive_thresh_win_size_min: 2,
                ..QuadDetectorParams::default()
            },
            QuadDetectorParams {
                adaptive_thresh_win_size_step: 0,
                ..QuadDetectorParams::default()
            },
            QuadDetectorParams {
                adaptive_thresh_win_size_min: 15,
                adaptive_thresh_win_size_max: 5,
                ..QuadDetectorParams::default()
            },
        ] {
            assert!(params.validate().is_err(), "{params:?}");
        }
    }

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let params: QuadDetectorParams = serde_json::from_str(
            r#"{ "adaptive_thresh_win_size_max": 9, "adaptive_method": "mean" }"#,
        )
        .expect("parse params");
        assert_eq!(params.adaptive_thresh_win_size_max, 9);
        assert_eq!(params.adaptive_method, AdaptiveMethod::Mean);
        assert_eq!(params.min_distance_to_border, 3);
    }
}
