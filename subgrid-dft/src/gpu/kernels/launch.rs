//! Buffer management and launch code for the cubeCL direct-sum kernel

use cubecl::bytes::Bytes;
use cubecl::prelude::*;
use cubecl::server::Handle;
use cubecl::wgpu::{WgpuDevice, WgpuRuntime};
use num_complex::Complex32;
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::debug;

use super::direct_sum::direct_sum_kernel;
use crate::error::{DftError, Result};
use crate::geometry::SubgridGeometry;
use crate::kernel::{Accelerator, DeviceLimits, LaunchConfig};
use crate::samples::{Origin, Subgrid, VisibilitySet};

const WGPU_LIMITS: DeviceLimits = DeviceLimits {
    max_group_size: 256,
    group_granularity: 32,
};

/// Runs the pixel kernel on the default WGPU adapter
pub struct CubeclAccelerator {
    device: WgpuDevice,
}

/// Device-side allocations for one dataset
///
/// Each handle is freed by the runtime when it is dropped.
pub struct CubeclBuffers {
    us: Handle,
    vs: Handle,
    data_re: Handle,
    data_im: Handle,
    subgrid_re: Handle,
    subgrid_im: Handle,
    /// Length of the sample arrays as allocated (at least 1)
    allocated_samples: usize,
    n_samples: usize,
    geometry: SubgridGeometry,
}

impl CubeclAccelerator {
    /// Create an accelerator on the default adapter
    ///
    /// Fails with `AcceleratorError` if no adapter can be initialised.
    pub fn new() -> Result<Self> {
        let device = WgpuDevice::default();
        catch_unwind(AssertUnwindSafe(|| {
            let _client = WgpuRuntime::client(&device);
        }))
        .map_err(|e| DftError::accelerator("device initialisation", panic_message(e)))?;
        Ok(Self { device })
    }
}

impl Accelerator for CubeclAccelerator {
    type Buffers = CubeclBuffers;

    fn name(&self) -> &str {
        "cubecl-wgpu"
    }

    fn limits(&self) -> DeviceLimits {
        WGPU_LIMITS
    }

    fn upload(&self, samples: &VisibilitySet, geometry: SubgridGeometry) -> Result<CubeclBuffers> {
        let client = WgpuRuntime::client(&self.device);

        // Zero-length buffers are not valid bindings, so pad empty inputs to one
        // element; the kernel only reads the first `n_samples`.
        let allocated_samples = samples.len().max(1);
        let pad = |mut column: Vec<f32>| {
            column.resize(allocated_samples, 0.0);
            column
        };
        let us = pad(samples.u().to_vec());
        let vs = pad(samples.v().to_vec());
        let data_re = pad(samples.data().iter().map(|d| d.re).collect());
        let data_im = pad(samples.data().iter().map(|d| d.im).collect());
        let n_pixels = geometry.n_pixels();

        let buffers = catch_unwind(AssertUnwindSafe(|| CubeclBuffers {
            us: client.create(to_bytes(&us)),
            vs: client.create(to_bytes(&vs)),
            data_re: client.create(to_bytes(&data_re)),
            data_im: client.create(to_bytes(&data_im)),
            subgrid_re: client.empty(n_pixels * std::mem::size_of::<f32>()),
            subgrid_im: client.empty(n_pixels * std::mem::size_of::<f32>()),
            allocated_samples,
            n_samples: samples.len(),
            geometry,
        }))
        .map_err(|e| DftError::accelerator("host-to-device transfer", panic_message(e)))?;

        debug!(
            n_samples = samples.len(),
            n_pixels, "Uploaded samples to GPU"
        );
        Ok(buffers)
    }

    fn launch(&self, buffers: &mut CubeclBuffers, _origin: &Origin, launch: &LaunchConfig) -> Result<()> {
        launch.ensure_covers(&buffers.geometry)?;
        let client = WgpuRuntime::client(&self.device);
        let n_pixels = buffers.geometry.n_pixels();
        let n = buffers.allocated_samples;

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            // Launch: one cube per group, one unit per pixel
            let launched = unsafe {
                direct_sum_kernel::launch::<f32, WgpuRuntime>(
                    &client,
                    CubeCount::Static(launch.group_count as u32, 1, 1),
                    CubeDim::new_1d(launch.group_size as u32),
                    ArrayArg::from_raw_parts::<f32>(&buffers.us, n, 1),
                    ArrayArg::from_raw_parts::<f32>(&buffers.vs, n, 1),
                    ArrayArg::from_raw_parts::<f32>(&buffers.data_re, n, 1),
                    ArrayArg::from_raw_parts::<f32>(&buffers.data_im, n, 1),
                    ArrayArg::from_raw_parts::<f32>(&buffers.subgrid_re, n_pixels, 1),
                    ArrayArg::from_raw_parts::<f32>(&buffers.subgrid_im, n_pixels, 1),
                    ScalarArg::new(buffers.n_samples),
                    buffers.geometry.size() as u32,
                )
            };
            launched.map_err(|e| format!("{:?}", e))?;
            // Block until the kernel has completed
            cubecl::future::block_on(client.sync());
            Ok::<(), String>(())
        }));

        match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(message)) => Err(DftError::accelerator("kernel launch", message)),
            Err(panic) => Err(DftError::accelerator("kernel launch", panic_message(panic))),
        }
    }

    fn download(&self, buffers: &CubeclBuffers) -> Result<Subgrid> {
        let client = WgpuRuntime::client(&self.device);

        let (re_bytes, im_bytes) = catch_unwind(AssertUnwindSafe(|| {
            (
                client.read_one(buffers.subgrid_re.clone()),
                client.read_one(buffers.subgrid_im.clone()),
            )
        }))
        .map_err(|e| DftError::accelerator("device-to-host transfer", panic_message(e)))?;

        let re: &[f32] = bytemuck::cast_slice(&re_bytes);
        let im: &[f32] = bytemuck::cast_slice(&im_bytes);
        let pixels = re
            .iter()
            .zip(im)
            .take(buffers.geometry.n_pixels())
            .map(|(&re, &im)| Complex32::new(re, im))
            .collect();

        Subgrid::from_pixels(buffers.geometry, pixels)
    }
}

fn to_bytes(values: &[f32]) -> Bytes {
    Bytes::from_bytes_vec(bytemuck::cast_slice::<f32, u8>(values).to_vec())
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown runtime panic".to_string()
    }
}
