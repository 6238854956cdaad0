//! Direct Fourier transform of visibilities onto a subgrid
//!
//! This crate computes a small square image patch from a set of irregularly
//! positioned complex samples by brute-force summation:
//!
//! ```text
//! subgrid[idx] = sum_i data[i] * exp(j * 2 * pi * (u[i] * l + v[i] * m))
//! ```
//!
//! where `(l, m)` are the signed pixel coordinates of `idx` (see
//! [`SubgridGeometry`]). It is meant as a correctness oracle for faster
//! gridding algorithms, and provides two implementations of the same sum:
//!
//! - [`ReferenceAccumulator`]: serial, pixel by pixel, sample by sample
//! - [`PixelKernel`]: one independent execution unit per pixel, run by an
//!   [`Accelerator`] ([`HostAccelerator`] on a rayon pool, or the cubeCL GPU
//!   accelerator with `--features cubecl`)
//!
//! Both evaluate rotations through [`AngleConvention::rotation`], the only
//! place the phase convention is defined.
//!
//! # Quick Start
//!
//! ```rust
//! use subgrid_dft::{
//!     Accelerator, HostAccelerator, Origin, ReferenceAccumulator, SampleGenerator,
//!     SubgridGeometry, Tolerance, compare,
//! };
//!
//! let geometry = SubgridGeometry::new(8)?;
//! let samples = SampleGenerator::new(1).generate(256);
//! let origin = Origin::default();
//!
//! let expected = ReferenceAccumulator::new(geometry).compute(&samples, &origin);
//!
//! let accel = HostAccelerator::new(0)?;
//! let launch = accel.launch_config(&geometry, 32)?;
//! let mut buffers = accel.upload(&samples, geometry)?;
//! accel.launch(&mut buffers, &origin, &launch)?;
//! let subgrid = accel.download(&buffers)?;
//!
//! let report = compare(&expected, &subgrid, samples.len(), samples.max_amplitude(), &Tolerance::default())?;
//! report.check()?;
//! # Ok::<(), subgrid_dft::DftError>(())
//! ```
//!
//! For the full generate / time / compare sequence, see [`run_oracle`].

pub mod bench;
pub mod error;
pub mod geometry;
pub mod kernel;
pub mod phase;
pub mod pipeline;
pub mod reference;
pub mod samples;
pub mod synth;
pub mod verify;

#[cfg(feature = "cubecl")]
pub mod gpu;

pub use bench::{Timing, time_launches};
pub use error::{DftError, Result};
pub use geometry::SubgridGeometry;
pub use kernel::{Accelerator, DeviceLimits, HostAccelerator, LaunchConfig, PixelKernel};
pub use phase::{AngleConvention, phase_turns, sincospi};
pub use pipeline::{OracleConfig, OracleConfigBuilder, OracleReport, run_oracle};
pub use reference::ReferenceAccumulator;
pub use samples::{Origin, Subgrid, VisibilitySet};
pub use synth::SampleGenerator;
pub use verify::{AccuracyReport, PixelPair, Tolerance, compare, preview};
