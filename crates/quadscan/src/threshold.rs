//! Local-mean kernels for adaptive thresholding.

/// Gaussian sigma matching a kernel of `window` pixels.
///
/// Same rule OpenCV uses when `sigma` is derived from the kernel size.
#[inline]
pub(crate) fn gaussian_sigma(window: u32) -> f32 {
    0.3 * ((window as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalized Gaussian taps for a `window`-pixel kernel.
///
/// The kernel has exactly `window` taps, so no pixel farther than
/// `window / 2` from the centre contributes to the mean.
pub(crate) fn gaussian_kernel(window: u32) -> Vec<f32> {
    let sigma = gaussian_sigma(window);
    let r = (window / 2) as i32;
    let denom = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (-r..=r).map(|i| (-((i * i) as f32) / denom).exp()).collect();
    let sum: f32 = kernel.iter().sum();
    for k in &mut kernel {
        *k /= sum;
    }
    kernel
}

/// `255` where `src > mean - constant`, else `0`.
pub(crate) fn threshold_against_mean(src: &[u8], mean: &[u8], constant: f64) -> Vec<u8> {
    src.iter()
        .zip(mean)
        .map(|(&s, &m)| {
            if s as f64 > m as f64 - constant {
                255
            } else {
                0
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sigma_for_smallest_window() {
        assert_relative_eq!(gaussian_sigma(3), 0.8, epsilon = 1e-6);
        assert!(gaussian_sigma(23) > gaussian_sigma(13));
    }

    #[test]
    fn kernel_has_one_tap_per_window_pixel() {
        for window in [3, 5, 13, 23] {
            let k = gaussian_kernel(window);
            assert_eq!(k.len(), window as usize);
            assert_relative_eq!(k.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
            let mid = k.len() / 2;
            for i in 0..mid {
                assert_relative_eq!(k[i], k[k.len() - 1 - i], epsilon = 1e-7);
                assert!(k[i] < k[i + 1]);
            }
        }
    }

    #[test]
    fn threshold_keeps_flat_regions_white() {
        let src = [10u8, 200, 50];
        let mean = [10u8, 200, 90];
        assert_eq!(threshold_against_mean(&src, &mean, 7.0), vec![255, 255, 0]);
    }
}
