//! GPU kernel for the per-pixel direct Fourier sum using cubeCL
//!
//! For pixel `(l, m)`:
//! subgrid = sum_i (d_re + i*d_im) * (cos(pi*x) + i*sin(pi*x)),  x = 2*(u*l + v*m)

use cubecl::prelude::*;

/// Direct-sum kernel
///
/// Each GPU thread owns one pixel and loops over every sample.
#[cube(launch)]
pub fn direct_sum_kernel<F: Float>(
    us: &Array<F>,              // u coordinate per sample
    vs: &Array<F>,              // v coordinate per sample
    data_re: &Array<F>,         // Real part of each sample
    data_im: &Array<F>,         // Imaginary part of each sample
    subgrid_re: &mut Array<F>,  // Output: real part per pixel
    subgrid_im: &mut Array<F>,  // Output: imaginary part per pixel
    n_samples: usize,
    #[comptime] size: u32,
) {
    let idx = ABSOLUTE_POS;

    // Bounds check: the last cube is usually only partly used
    if idx < subgrid_re.len() {
        let pixel = u32::cast_from(idx);
        let row = pixel / size;
        let col = pixel - size * row;
        let half = size / 2;
        let l = F::cast_from(row) - F::cast_from(half);
        let m = F::cast_from(col) - F::cast_from(half);

        let mut cell_re = F::new(0.0);
        let mut cell_im = F::new(0.0);
        for i in 0..n_samples {
            let turns = us[i] * l + vs[i] * m;

            // sincospi(2 * turns), reduced to [-1, 1] first
            let x = F::new(2.0) * turns;
            let r = x - F::new(2.0) * F::round(x * F::new(0.5));
            let angle = r * F::new(3.141_592_7);
            let cos = F::cos(angle);
            let sin = F::sin(angle);

            let d_re = data_re[i];
            let d_im = data_im[i];
            cell_re += d_re * cos - d_im * sin;
            cell_im += d_re * sin + d_im * cos;
        }

        subgrid_re[idx] = cell_re;
        subgrid_im[idx] = cell_im;
    }
}
