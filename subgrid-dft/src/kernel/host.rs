//! Host accelerator: runs kernel groups on a dedicated rayon pool

use super::{Accelerator, DeviceLimits, LaunchConfig, PixelKernel};
use crate::error::{DftError, Result};
use crate::geometry::SubgridGeometry;
use crate::samples::{Origin, Subgrid, VisibilitySet};
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

const HOST_LIMITS: DeviceLimits = DeviceLimits {
    max_group_size: 1024,
    group_granularity: 1,
};

pub struct HostAccelerator {
    pool: ThreadPool,
}

/// Host-side copies standing in for device memory
pub struct HostBuffers {
    samples: VisibilitySet,
    subgrid: Subgrid,
    kernel: PixelKernel,
}

impl HostAccelerator {
    /// Create a pool with `threads` workers (0 picks rayon's default)
    pub fn new(threads: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("subgrid-unit-{}", i))
            .build()
            .map_err(|e| DftError::accelerator("thread pool creation", e))?;
        debug!(threads = pool.current_num_threads(), "Host accelerator ready");
        Ok(Self { pool })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl Accelerator for HostAccelerator {
    type Buffers = HostBuffers;

    fn name(&self) -> &str {
        "host"
    }

    fn limits(&self) -> DeviceLimits {
        HOST_LIMITS
    }

    fn upload(&self, samples: &VisibilitySet, geometry: SubgridGeometry) -> Result<HostBuffers> {
        Ok(HostBuffers {
            samples: samples.clone(),
            subgrid: Subgrid::zeros(geometry),
            kernel: PixelKernel::new(geometry),
        })
    }

    fn launch(&self, buffers: &mut HostBuffers, origin: &Origin, launch: &LaunchConfig) -> Result<()> {
        let HostBuffers {
            samples,
            subgrid,
            kernel,
        } = buffers;
        // install() returns only after every group has finished
        self.pool
            .install(|| kernel.launch(launch, samples, origin, subgrid.pixels_mut()))
    }

    fn download(&self, buffers: &HostBuffers) -> Result<Subgrid> {
        Ok(buffers.subgrid.clone())
    }
}
