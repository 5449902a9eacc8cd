//! Startup configuration for the clustering service.

use std::fmt;
use std::str::FromStr;

use crate::error::{ServiceError, ServiceResult};

/// Default number of Lloyd iterations per batch.
pub const DEFAULT_ITERATIONS: usize = 10;

/// Execution target for the numr backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComputeDevice {
    /// Host CPU (default).
    #[default]
    Cpu,
    /// NVIDIA GPU by ordinal.
    Cuda(usize),
    /// WebGPU adapter by index.
    Wgpu(usize),
}

impl FromStr for ComputeDevice {
    type Err = ServiceError;

    /// Parses `cpu`, `cuda`, `cuda:N`, `wgpu` or `wgpu:N`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let (kind, index) = match lower.split_once(':') {
            Some((kind, idx)) => {
                let index = idx
                    .parse::<usize>()
                    .map_err(|_| ServiceError::UnsupportedDevice(s.to_string()))?;
                (kind, index)
            }
            None => (lower.as_str(), 0),
        };

        match kind {
            "cpu" if index == 0 => Ok(Self::Cpu),
            "cuda" | "gpu" => Ok(Self::Cuda(index)),
            "wgpu" | "webgpu" => Ok(Self::Wgpu(index)),
            _ => Err(ServiceError::UnsupportedDevice(s.to_string())),
        }
    }
}

impl fmt::Display for ComputeDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            Self::Cuda(i) => write!(f, "cuda:{i}"),
            Self::Wgpu(i) => write!(f, "wgpu:{i}"),
        }
    }
}

/// Parameters negotiated with the parent process at startup.
///
/// `dimensions` and `n_clusters` fix the size of every output frame, so both
/// sides must agree on them before the first batch is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Length of every vector in every batch.
    pub dimensions: usize,
    /// Number of centroids produced per batch.
    pub n_clusters: usize,
    /// Lloyd iterations per batch. No early exit.
    pub n_iter: usize,
    /// Backend execution target.
    pub device: ComputeDevice,
    /// Optional cap on rows per frame, checked before the payload is buffered.
    pub max_batch_size: Option<usize>,
}

impl ServiceConfig {
    pub fn new(dimensions: usize, n_clusters: usize) -> Self {
        Self {
            dimensions,
            n_clusters,
            n_iter: DEFAULT_ITERATIONS,
            device: ComputeDevice::Cpu,
            max_batch_size: None,
        }
    }

    pub fn with_iterations(mut self, n_iter: usize) -> Self {
        self.n_iter = n_iter;
        self
    }

    pub fn with_device(mut self, device: ComputeDevice) -> Self {
        self.device = device;
        self
    }

    pub fn with_max_batch_size(mut self, limit: usize) -> Self {
        self.max_batch_size = Some(limit);
        self
    }

    /// Size in bytes of one output frame.
    pub fn output_frame_bytes(&self) -> usize {
        crate::framing::F32_BYTES * self.dimensions * self.n_clusters
    }

    /// Check that every parameter is in range.
    pub fn validate(&self) -> ServiceResult<()> {
        if self.dimensions == 0 {
            return Err(ServiceError::InvalidConfig {
                parameter: "dimensions",
                reason: "must be > 0".to_string(),
            });
        }
        if self.n_clusters == 0 {
            return Err(ServiceError::InvalidConfig {
                parameter: "n_clusters",
                reason: "must be > 0".to_string(),
            });
        }
        if self.n_iter == 0 {
            return Err(ServiceError::InvalidConfig {
                parameter: "n_iter",
                reason: "must be > 0".to_string(),
            });
        }
        if self.max_batch_size == Some(0) {
            return Err(ServiceError::InvalidConfig {
                parameter: "max_batch_size",
                reason: "must be > 0 when set".to_string(),
            });
        }
        Ok(())
    }
}
