//! Pixel indexing for a square subgrid
//!
//! Pixels are stored row-major. A linear index `idx` maps to
//! `(row, col) = (idx / S, idx mod S)` and to the signed image-plane
//! coordinates `(l, m) = (row - S/2, col - S/2)`, so an `S = 96` grid spans
//! `-48..=47` on both axes.

use crate::error::{DftError, Result};
use serde::Serialize;

/// Side length of the default subgrid
pub const DEFAULT_SUBGRID_SIZE: usize = 96;

/// Shape of a square subgrid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubgridGeometry {
    size: usize,
}

impl SubgridGeometry {
    /// Create a geometry with side length `size`
    ///
    /// The side must be positive and even, and the pixel count must be
    /// addressable with a 32-bit index (accelerator launch indices are `u32`).
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(DftError::config("subgrid size must be positive"));
        }
        if size % 2 != 0 {
            return Err(DftError::config(format!(
                "subgrid size must be even so pixels span -S/2..S/2-1, got {}",
                size
            )));
        }
        size.checked_mul(size)
            .filter(|&n| n <= u32::MAX as usize)
            .ok_or_else(|| {
                DftError::config(format!("subgrid size {} overflows a 32-bit pixel index", size))
            })?;
        Ok(Self { size })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn half_width(&self) -> usize {
        self.size / 2
    }

    pub fn n_pixels(&self) -> usize {
        self.size * self.size
    }

    pub fn contains(&self, idx: usize) -> bool {
        idx < self.n_pixels()
    }

    /// Integer pixel coordinates `(row, col)` of a linear index
    #[inline]
    pub fn pixel_coords(&self, idx: usize) -> (usize, usize) {
        let row = idx / self.size;
        (row, idx - self.size * row)
    }

    /// Signed image-plane coordinates `(l, m)` of a linear index
    #[inline]
    pub fn image_coords(&self, idx: usize) -> (i32, i32) {
        let (row, col) = self.pixel_coords(idx);
        let half = self.half_width() as i32;
        (row as i32 - half, col as i32 - half)
    }

    /// `(l, m)` as the floating-point values used in the phase calculation
    #[inline]
    pub fn lm(&self, idx: usize) -> (f32, f32) {
        let (l, m) = self.image_coords(idx);
        (l as f32, m as f32)
    }
}

impl Default for SubgridGeometry {
    fn default() -> Self {
        Self {
            size: DEFAULT_SUBGRID_SIZE,
        }
    }
}
