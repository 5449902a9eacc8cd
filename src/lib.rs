//! kmeans-stream - Streaming K-Means Centroid Service
//!
//! kmeans-stream reads length-prefixed batches of vectors from a byte stream,
//! runs a fixed number of Lloyd K-Means iterations on each batch, and writes
//! one frame of centroids back per batch. Built on numr's tensor runtime, the
//! clustering engine works across all backends (CPU, CUDA, WebGPU).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   VectorBatch   ┌──────────────┐   CentroidSet   ┌──────────────┐
//! │   framing    ├────────────────►│   cluster    ├────────────────►│     sink     │
//! │ (stdin, u32  │                 │ (Lloyd, numr │                 │ (stdout, f32 │
//! │  BE prefix)  │                 │   backend)   │                 │  + flush)    │
//! └──────────────┘                 └──────────────┘                 └──────────────┘
//!                         driven by service::ClusterService
//! ```
//!
//! # Modules
//!
//! - [`framing`] - Wire format: frame decoder, blocking reader, client-side codec
//! - [`cluster`] - K-Means traits, generic implementation, per-backend impls
//! - [`batch`] - Host-side vector batches and centroid sets
//! - [`sink`] - Centroid frame writer
//! - [`service`] - The read / cluster / write loop and device dispatch
//! - [`client`] - Synchronous client that drives a service subprocess
//! - [`config`] - Service parameters and compute device selection
//!
//! # Wire Protocol
//!
//! ```text
//! input:  [u32 batch_size, big-endian][batch_size * dimensions * f32, native order] ...
//! output: [n_clusters * dimensions * f32, native order] ...
//! ```
//!
//! `dimensions` and `n_clusters` are fixed for the lifetime of a service, so
//! output frames need no prefix.
//!
//! # Feature Flags
//!
//! | Feature | Description | Dependencies |
//! |---------|-------------|--------------|
//! | `cuda`  | Enable CUDA GPU acceleration | CUDA 12.x, numr/cuda |
//! | `wgpu`  | Enable WebGPU cross-platform GPU | numr/wgpu |
//!
//! # Example
//!
//! ```ignore
//! use kmeans_stream::{ClusterService, ServiceConfig};
//! use numr::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime};
//!
//! let config = ServiceConfig::new(128, 8);
//! let client = CpuClient::new(CpuDevice::new());
//! let service = ClusterService::<CpuRuntime>::new(config, client)?;
//!
//! let stdin = std::io::stdin().lock();
//! let stdout = std::io::stdout().lock();
//! let stats = service.run(stdin, stdout)?;
//! ```

pub mod batch;
pub mod client;
pub mod cluster;
pub mod config;
pub mod error;
pub mod framing;
pub mod service;
pub mod sink;

pub use batch::{CentroidSet, VectorBatch};
pub use client::ClusterClient;
pub use cluster::{KMeansAlgorithms, KMeansOptions, KMeansResult};
pub use config::{ComputeDevice, DEFAULT_ITERATIONS, ServiceConfig};
pub use error::{ServiceError, ServiceResult};
pub use framing::{CentroidDecoder, FrameDecoder, FrameReader, encode_frame, encode_rows};
pub use service::{ClusterService, ServiceStats, run_on_device};
pub use sink::CentroidSink;

// Re-export numr types that users will commonly need
pub use numr::dtype::DType;
pub use numr::runtime::{Runtime, RuntimeClient};
pub use numr::tensor::Tensor;
