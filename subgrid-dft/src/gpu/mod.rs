//! GPU accelerator for the pixel kernel
//!
//! Runs the same per-pixel accumulation as [`crate::kernel::PixelKernel`] as a
//! cubeCL kernel on the WGPU runtime: one cube unit per pixel, one cube per
//! execution group.
//!
//! ## Implementation Details
//!
//! - **Backend**: WGPU (WebGPU) via cubeCL
//! - **Layout**: complex values are split into separate real/imaginary `f32`
//!   arrays on the device
//! - **Phase**: half-turn convention, reduced modulo 2 in-kernel before the
//!   multiplication by pi
//! - **Limits**: at most 256 units per group (the WebGPU default), in multiples
//!   of 32
//!
//! ## Usage
//!
//! Enabled with `--features cubecl`. Device buffers live in
//! [`CubeclBuffers`] and are released when it is dropped.

mod kernels;

pub use kernels::{CubeclAccelerator, CubeclBuffers};
