//! Serial reference accumulator
//!
//! The ground truth every other implementation is checked against: for each
//! pixel, in order, sum the phase-rotated contribution of every sample.
//! `O(N * S^2)` with no parallelism.

use crate::error::{DftError, Result};
use crate::geometry::SubgridGeometry;
use crate::phase::{AngleConvention, phase_turns};
use crate::samples::{Origin, Subgrid, VisibilitySet};
use num_complex::Complex32;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct ReferenceAccumulator {
    geometry: SubgridGeometry,
    convention: AngleConvention,
}

impl ReferenceAccumulator {
    /// Reference accumulator using the radian convention
    pub fn new(geometry: SubgridGeometry) -> Self {
        Self {
            geometry,
            convention: AngleConvention::Radians,
        }
    }

    pub fn with_convention(mut self, convention: AngleConvention) -> Self {
        self.convention = convention;
        self
    }

    pub fn geometry(&self) -> SubgridGeometry {
        self.geometry
    }

    pub fn convention(&self) -> AngleConvention {
        self.convention
    }

    /// Fill `subgrid` with the direct Fourier sum of `samples`
    ///
    /// Every pixel is overwritten. `_origin` is accepted for interface parity
    /// with the accelerators and has no effect.
    pub fn accumulate(
        &self,
        samples: &VisibilitySet,
        _origin: &Origin,
        subgrid: &mut Subgrid,
    ) -> Result<()> {
        if subgrid.geometry() != self.geometry {
            return Err(DftError::config(format!(
                "output subgrid is {}x{}, accumulator expects {}x{}",
                subgrid.geometry().size(),
                subgrid.geometry().size(),
                self.geometry.size(),
                self.geometry.size()
            )));
        }

        self.fill(samples, subgrid.pixels_mut());
        Ok(())
    }

    /// Allocate a subgrid and accumulate into it
    pub fn compute(&self, samples: &VisibilitySet, _origin: &Origin) -> Subgrid {
        let mut subgrid = Subgrid::zeros(self.geometry);
        self.fill(samples, subgrid.pixels_mut());
        subgrid
    }

    /// `pixels` must hold exactly `geometry.n_pixels()` values
    fn fill(&self, samples: &VisibilitySet, pixels: &mut [Complex32]) {
        debug!(
            n_samples = samples.len(),
            n_pixels = pixels.len(),
            convention = ?self.convention,
            "Running reference accumulator"
        );

        for (idx, pixel) in pixels.iter_mut().enumerate() {
            let (l, m) = self.geometry.lm(idx);
            let mut cell = Complex32::new(0.0, 0.0);
            for (u, v, datum) in samples.iter() {
                cell += datum * self.convention.rotation(phase_turns(u, v, l, m));
            }
            *pixel = cell;
        }
    }
}
