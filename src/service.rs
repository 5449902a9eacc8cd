//! The streaming service loop: framer, engine, sink.

use std::io::{Read, Write};
use std::time::Instant;

use numr::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime};
use numr::runtime::{Runtime, RuntimeClient};
use tracing::{debug, info, warn};

use crate::batch::{CentroidSet, VectorBatch};
use crate::cluster::{KMeansAlgorithms, KMeansOptions};
use crate::config::{ComputeDevice, ServiceConfig};
use crate::error::{ServiceError, ServiceResult};
use crate::framing::{FrameDecoder, FrameReader};
use crate::sink::CentroidSink;

/// Counters reported when the input stream ends cleanly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceStats {
    /// Frames decoded and answered.
    pub batches: u64,
    /// Total rows across all frames.
    pub vectors: u64,
}

/// Runs K-Means on each incoming batch with a fixed backend client.
///
/// Batches are handled strictly one at a time and in arrival order. Nothing
/// carries over between batches: each one is seeded from its own leading rows.
pub struct ClusterService<R: Runtime> {
    config: ServiceConfig,
    client: R::Client,
    options: KMeansOptions,
}

impl<R: Runtime> ClusterService<R>
where
    R::Client: KMeansAlgorithms<R>,
{
    pub fn new(config: ServiceConfig, client: R::Client) -> ServiceResult<Self> {
        config.validate()?;
        let options = KMeansOptions {
            n_clusters: config.n_clusters,
            n_iter: config.n_iter,
        };
        Ok(Self {
            config,
            client,
            options,
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Compute the centroid set for one batch.
    ///
    /// An empty batch has no rows to seed from and yields an all-NaN set of
    /// the usual size, so every input frame still gets exactly one answer.
    pub fn cluster_batch(&self, batch: &VectorBatch) -> ServiceResult<CentroidSet> {
        let (k, d) = (self.config.n_clusters, self.config.dimensions);
        if batch.dimensions() != d {
            return Err(ServiceError::InvalidConfig {
                parameter: "dimensions",
                reason: format!("batch has width {}, service expects {d}", batch.dimensions()),
            });
        }

        if batch.is_empty() {
            warn!(clusters = k, "empty batch, emitting indeterminate centroids");
            return Ok(CentroidSet::indeterminate(k, d));
        }
        if batch.batch_size() < k {
            warn!(
                batch_size = batch.batch_size(),
                clusters = k,
                "batch has fewer rows than clusters; surplus centroids will be NaN"
            );
        }

        let data = batch.to_tensor::<R>(self.client.device())?;
        let result = self.client.kmeans(&data, &self.options)?;
        CentroidSet::from_tensor(&result.centroids)
    }

    /// Drive the stream until clean end of input.
    ///
    /// Each batch's centroids are written and flushed before the next frame
    /// is read. A truncated final frame aborts with `Truncated`; frames
    /// answered before that point have already been written.
    pub fn run<I: Read, O: Write>(&self, input: I, output: O) -> ServiceResult<ServiceStats> {
        let decoder = FrameDecoder::new(self.config.dimensions)
            .with_max_batch_size(self.config.max_batch_size);
        let mut frames = FrameReader::with_decoder(input, decoder);
        let mut sink = CentroidSink::new(output);
        let mut stats = ServiceStats::default();

        info!(runtime = R::name(), "going to process vectors");

        while let Some(batch) = frames.next_batch()? {
            let started = Instant::now();
            let centroids = self.cluster_batch(&batch)?;
            sink.write_centroids(&centroids)?;

            stats.batches += 1;
            stats.vectors += batch.batch_size() as u64;
            debug!(
                batch = stats.batches,
                batch_size = batch.batch_size(),
                elapsed_us = started.elapsed().as_micros() as u64,
                "batch clustered"
            );
        }

        info!(
            batches = stats.batches,
            vectors = stats.vectors,
            "input closed"
        );
        Ok(stats)
    }
}

/// Build a service on the configured device and run it over `input`/`output`.
pub fn run_on_device<I: Read, O: Write>(
    config: &ServiceConfig,
    input: I,
    output: O,
) -> ServiceResult<ServiceStats> {
    config.validate()?;
    info!(
        dimensions = config.dimensions,
        clusters = config.n_clusters,
        iterations = config.n_iter,
        device = %config.device,
        "starting k-means service"
    );

    match config.device {
        ComputeDevice::Cpu => {
            let client = CpuClient::new(CpuDevice::new());
            ClusterService::<CpuRuntime>::new(config.clone(), client)?.run(input, output)
        }
        #[cfg(feature = "cuda")]
        ComputeDevice::Cuda(index) => {
            use numr::runtime::cuda::{CudaClient, CudaDevice, CudaRuntime};
            let client = CudaClient::new(CudaDevice::new(index))
                .map_err(|e| ServiceError::UnsupportedDevice(format!("cuda:{index}: {e}")))?;
            ClusterService::<CudaRuntime>::new(config.clone(), client)?.run(input, output)
        }
        #[cfg(not(feature = "cuda"))]
        ComputeDevice::Cuda(index) => Err(ServiceError::UnsupportedDevice(format!(
            "cuda:{index} (built without the `cuda` feature)"
        ))),
        #[cfg(feature = "wgpu")]
        ComputeDevice::Wgpu(index) => {
            use numr::runtime::wgpu::{WgpuClient, WgpuDevice, WgpuRuntime};
            let client = WgpuClient::new(WgpuDevice::new(index))
                .map_err(|e| ServiceError::UnsupportedDevice(format!("wgpu:{index}: {e}")))?;
            ClusterService::<WgpuRuntime>::new(config.clone(), client)?.run(input, output)
        }
        #[cfg(not(feature = "wgpu"))]
        ComputeDevice::Wgpu(index) => Err(ServiceError::UnsupportedDevice(format!(
            "wgpu:{index} (built without the `wgpu` feature)"
        ))),
    }
}
