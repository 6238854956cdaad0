//! Visibility samples, the coordinate origin and the subgrid output buffer

use crate::error::{DftError, Result};
use crate::geometry::SubgridGeometry;
use num_complex::Complex32;
use serde::{Deserialize, Serialize};

/// Number of samples in the default dataset (1024 x 200)
pub const DEFAULT_N_SAMPLES: usize = 1024 * 200;

/// Coordinate-frame reference point
///
/// Every accumulator accepts an origin, and none of them applies it: the phase
/// depends only on `(u, v)` and the pixel's `(l, m)`. Results are identical for
/// any origin value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Origin {
    pub u0: f32,
    pub v0: f32,
    pub w0: f32,
}

impl Origin {
    pub fn new(u0: f32, v0: f32, w0: f32) -> Self {
        Self { u0, v0, w0 }
    }
}

impl Default for Origin {
    fn default() -> Self {
        Self::new(1.5, 3.2, -0.4)
    }
}

/// Three parallel columns describing N visibility samples
///
/// The i-th element of `u`, `v` and `data` belong to the same sample. The set
/// is immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilitySet {
    u: Vec<f32>,
    v: Vec<f32>,
    data: Vec<Complex32>,
}

impl VisibilitySet {
    pub fn new(u: Vec<f32>, v: Vec<f32>, data: Vec<Complex32>) -> Result<Self> {
        if u.len() != v.len() || u.len() != data.len() {
            return Err(DftError::config(format!(
                "sample columns differ in length: u={}, v={}, data={}",
                u.len(),
                v.len(),
                data.len()
            )));
        }
        Ok(Self { u, v, data })
    }

    /// Columns already known to have equal length
    pub(crate) fn from_columns(u: Vec<f32>, v: Vec<f32>, data: Vec<Complex32>) -> Self {
        debug_assert!(u.len() == data.len() && v.len() == data.len());
        Self { u, v, data }
    }

    pub fn empty() -> Self {
        Self {
            u: Vec::new(),
            v: Vec::new(),
            data: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn u(&self) -> &[f32] {
        &self.u
    }

    pub fn v(&self) -> &[f32] {
        &self.v
    }

    pub fn data(&self) -> &[Complex32] {
        &self.data
    }

    /// Iterate `(u, v, datum)` triples in ascending sample index
    pub fn iter(&self) -> impl Iterator<Item = (f32, f32, Complex32)> + '_ {
        self.u
            .iter()
            .zip(self.v.iter())
            .zip(self.data.iter())
            .map(|((&u, &v), &datum)| (u, v, datum))
    }

    /// Copy of the set with the samples reordered by `order`
    ///
    /// `order` must be a permutation of `0..len()`.
    pub fn permuted(&self, order: &[usize]) -> Result<Self> {
        let mut seen = vec![false; self.len()];
        if order.len() != self.len()
            || !order
                .iter()
                .all(|&i| i < seen.len() && !std::mem::replace(&mut seen[i], true))
        {
            return Err(DftError::config(format!(
                "sample order is not a permutation of 0..{}",
                self.len()
            )));
        }

        Ok(Self {
            u: order.iter().map(|&i| self.u[i]).collect(),
            v: order.iter().map(|&i| self.v[i]).collect(),
            data: order.iter().map(|&i| self.data[i]).collect(),
        })
    }

    /// Largest sample magnitude, 0 for an empty set
    pub fn max_amplitude(&self) -> f32 {
        self.data.iter().map(|d| d.norm()).fold(0.0, f32::max)
    }
}

/// Row-major complex pixel buffer for one subgrid
#[derive(Debug, Clone, PartialEq)]
pub struct Subgrid {
    geometry: SubgridGeometry,
    pixels: Vec<Complex32>,
}

impl Subgrid {
    pub fn zeros(geometry: SubgridGeometry) -> Self {
        Self {
            geometry,
            pixels: vec![Complex32::new(0.0, 0.0); geometry.n_pixels()],
        }
    }

    pub fn from_pixels(geometry: SubgridGeometry, pixels: Vec<Complex32>) -> Result<Self> {
        if pixels.len() != geometry.n_pixels() {
            return Err(DftError::config(format!(
                "expected {} pixels for a {}x{} subgrid, got {}",
                geometry.n_pixels(),
                geometry.size(),
                geometry.size(),
                pixels.len()
            )));
        }
        Ok(Self { geometry, pixels })
    }

    pub fn geometry(&self) -> SubgridGeometry {
        self.geometry
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<Complex32> {
        self.pixels.get(idx).copied()
    }

    pub fn pixels(&self) -> &[Complex32] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Complex32] {
        &mut self.pixels
    }

    pub fn into_pixels(self) -> Vec<Complex32> {
        self.pixels
    }
}
