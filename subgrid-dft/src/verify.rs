//! Accuracy checks between a reference subgrid and a candidate
//!
//! Single-precision accumulation of N terms drifts roughly like `sqrt(N)`
//! ulps, and the phase argument loses absolute precision as `|l|, |m|` grow.
//! The threshold therefore scales with both:
//!
//! `threshold = relative * sqrt(N) * max(amplitude, 1) * max(S/2, 1)`
//!
//! The default `relative = 2e-6` allows about 0.06 at 204800 samples on a
//! 96x96 subgrid, a few times the drift a correct single-precision kernel
//! shows there.

use crate::error::{DftError, Result};
use crate::samples::Subgrid;
use num_complex::Complex32;
use serde::{Deserialize, Serialize};

/// Number of leading pixels printed side by side
pub const DEFAULT_PREVIEW_PIXELS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    pub relative: f64,
}

impl Tolerance {
    pub fn new(relative: f64) -> Self {
        Self { relative }
    }

    /// Absolute error allowed per pixel
    pub fn threshold(&self, n_samples: usize, max_amplitude: f32, subgrid_size: usize) -> f64 {
        let amplitude = (max_amplitude as f64).max(1.0);
        let half_width = (subgrid_size as f64 / 2.0).max(1.0);
        self.relative * (n_samples as f64).sqrt() * amplitude * half_width
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self { relative: 2e-6 }
    }
}

/// Outcome of comparing two subgrids pixel by pixel
#[derive(Debug, Clone, Serialize)]
pub struct AccuracyReport {
    pub pixels_compared: usize,
    pub max_abs_error: f64,
    pub mean_abs_error: f64,
    /// Pixel with the largest error
    pub worst_pixel: usize,
    pub threshold: f64,
}

impl AccuracyReport {
    pub fn passed(&self) -> bool {
        self.max_abs_error <= self.threshold
    }

    /// `Err(AccuracyMismatch)` unless every pixel is within the threshold
    pub fn check(&self) -> Result<()> {
        if self.passed() {
            Ok(())
        } else {
            Err(DftError::AccuracyMismatch {
                pixel: self.worst_pixel,
                error: self.max_abs_error,
                threshold: self.threshold,
            })
        }
    }
}

/// Compare every pixel of `candidate` against `reference`
pub fn compare(
    reference: &Subgrid,
    candidate: &Subgrid,
    n_samples: usize,
    max_amplitude: f32,
    tolerance: &Tolerance,
) -> Result<AccuracyReport> {
    if reference.geometry() != candidate.geometry() {
        return Err(DftError::config(format!(
            "cannot compare a {}x{} subgrid with a {}x{} subgrid",
            reference.geometry().size(),
            reference.geometry().size(),
            candidate.geometry().size(),
            candidate.geometry().size()
        )));
    }

    let mut max_abs_error = 0.0f64;
    let mut worst_pixel = 0;
    let mut total = 0.0f64;
    for (idx, (r, c)) in reference.pixels().iter().zip(candidate.pixels()).enumerate() {
        let error = abs_error(*r, *c);
        total += error;
        // A NaN pixel becomes the worst pixel and stays there
        if error > max_abs_error || (error.is_nan() && !max_abs_error.is_nan()) {
            max_abs_error = error;
            worst_pixel = idx;
        }
    }

    let pixels_compared = reference.len();
    Ok(AccuracyReport {
        pixels_compared,
        max_abs_error,
        mean_abs_error: if pixels_compared == 0 {
            0.0
        } else {
            total / pixels_compared as f64
        },
        worst_pixel,
        threshold: tolerance.threshold(n_samples, max_amplitude, reference.geometry().size()),
    })
}

#[inline]
fn abs_error(a: Complex32, b: Complex32) -> f64 {
    let re = a.re as f64 - b.re as f64;
    let im = a.im as f64 - b.im as f64;
    re.hypot(im)
}

/// One pixel from each implementation, for display
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PixelPair {
    pub index: usize,
    pub reference: Complex32,
    pub candidate: Complex32,
}

/// First `count` pixels of both subgrids side by side
pub fn preview(reference: &Subgrid, candidate: &Subgrid, count: usize) -> Vec<PixelPair> {
    reference
        .pixels()
        .iter()
        .zip(candidate.pixels())
        .take(count)
        .enumerate()
        .map(|(index, (&reference, &candidate))| PixelPair {
            index,
            reference,
            candidate,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::SubgridGeometry;

    fn subgrid(values: &[(f32, f32)]) -> Subgrid {
        let geometry = SubgridGeometry::new(2).unwrap();
        let pixels = values.iter().map(|&(re, im)| Complex32::new(re, im)).collect();
        Subgrid::from_pixels(geometry, pixels).unwrap()
    }

    #[test]
    fn test_threshold_scaling() {
        let tol = Tolerance::new(1e-5);
        let t = tol.threshold(10_000, 0.5, 96);
        assert!((t - 1e-5 * 100.0 * 1.0 * 48.0).abs() < 1e-12);
        assert!(tol.threshold(40_000, 0.5, 96) > t);
        assert_eq!(tol.threshold(0, 1.0, 96), 0.0);
    }

    #[test]
    fn test_default_threshold_at_full_size() {
        // Uniform(-1, 1) data peaks at |d| = sqrt(2)
        let t = Tolerance::default().threshold(204_800, std::f32::consts::SQRT_2, 96);
        assert!(t > 0.05 && t < 0.07, "threshold {}", t);
    }

    #[test]
    fn test_identical_subgrids_pass() {
        let a = subgrid(&[(1.0, 0.0), (0.0, 1.0), (-1.0, 0.5), (2.0, 2.0)]);
        let report = compare(&a, &a, 100, 1.0, &Tolerance::default()).unwrap();
        assert_eq!(report.max_abs_error, 0.0);
        assert!(report.passed());
        assert!(report.check().is_ok());
    }

    #[test]
    fn test_mismatch_reports_worst_pixel() {
        let a = subgrid(&[(1.0, 0.0), (0.0, 1.0), (-1.0, 0.5), (2.0, 2.0)]);
        let b = subgrid(&[(1.0, 0.0), (0.0, 1.0), (-1.0, 0.5), (2.3, 2.4)]);
        let report = compare(&a, &b, 100, 1.0, &Tolerance::default()).unwrap();
        assert_eq!(report.worst_pixel, 3);
        assert!((report.max_abs_error - 0.5).abs() < 1e-6);
        assert!(!report.passed());
        match report.check() {
            Err(DftError::AccuracyMismatch { pixel, .. }) => assert_eq!(pixel, 3),
            other => panic!("expected AccuracyMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_nan_is_a_failure() {
        let a = subgrid(&[(1.0, 0.0), (0.0, 1.0), (-1.0, 0.5), (2.0, 2.0)]);
        let b = subgrid(&[(1.0, 0.0), (f32::NAN, 1.0), (-1.0, 0.5), (2.0, 2.0)]);
        let report = compare(&a, &b, 100, 1.0, &Tolerance::new(1.0)).unwrap();
        assert_eq!(report.worst_pixel, 1);
        assert!(!report.passed());
    }

    #[test]
    fn test_preview_takes_leading_pixels() {
        let a = subgrid(&[(1.0, 0.0), (0.0, 1.0), (-1.0, 0.5), (2.0, 2.0)]);
        let pairs = preview(&a, &a, 2);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].index, 1);
        assert_eq!(pairs[1].reference, Complex32::new(0.0, 1.0));
        assert_eq!(preview(&a, &a, 10).len(), 4);
    }
}
