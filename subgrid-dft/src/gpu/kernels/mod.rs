//! Custom cubeCL kernels for the subgrid direct sum

mod direct_sum;
mod launch;

pub use launch::{CubeclAccelerator, CubeclBuffers};
