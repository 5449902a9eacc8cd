//! Host-side matrices exchanged over the wire.
//!
//! A [`VectorBatch`] is what the framer hands to the engine; a [`CentroidSet`]
//! is what the engine hands to the sink. Both are dense row-major `f32`
//! matrices that live on the host, independent of the backend the engine
//! runs on.

use bytes::BufMut;
use numr::dtype::DType;
use numr::runtime::Runtime;
use numr::tensor::Tensor;

use crate::error::{ServiceError, ServiceResult};
use crate::framing::F32_BYTES;

/// Decode host-native `f32` values from raw bytes.
///
/// `bytes.len()` must be a multiple of 4; a trailing partial value is ignored.
pub(crate) fn f32s_from_ne_bytes(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(F32_BYTES)
        .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// One decoded frame: `batch_size` vectors of `dimensions` values each.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorBatch {
    batch_size: usize,
    dimensions: usize,
    data: Vec<f32>,
}

impl VectorBatch {
    /// Wrap row-major data of shape `[batch_size, dimensions]`.
    pub fn new(data: Vec<f32>, batch_size: usize, dimensions: usize) -> ServiceResult<Self> {
        let expected = batch_size * dimensions;
        if data.len() != expected {
            return Err(ServiceError::ShapeMismatch {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            batch_size,
            dimensions,
            data,
        })
    }

    /// Build a batch from individual rows, all of length `dimensions`.
    pub fn from_rows<V: AsRef<[f32]>>(rows: &[V], dimensions: usize) -> ServiceResult<Self> {
        let mut data = Vec::with_capacity(rows.len() * dimensions);
        for row in rows {
            let row = row.as_ref();
            if row.len() != dimensions {
                return Err(ServiceError::ShapeMismatch {
                    expected: dimensions,
                    got: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Self::new(data, rows.len(), dimensions)
    }

    /// Decode a payload of host-native floats.
    pub(crate) fn from_ne_bytes(
        payload: &[u8],
        batch_size: usize,
        dimensions: usize,
    ) -> ServiceResult<Self> {
        Self::new(f32s_from_ne_bytes(payload), batch_size, dimensions)
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn is_empty(&self) -> bool {
        self.batch_size == 0
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn row(&self, i: usize) -> Option<&[f32]> {
        if i >= self.batch_size {
            return None;
        }
        Some(&self.data[i * self.dimensions..(i + 1) * self.dimensions])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.dimensions.max(1))
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Upload to a backend device as an F32 tensor `[batch_size, dimensions]`.
    pub fn to_tensor<R: Runtime>(&self, device: &R::Device) -> numr::error::Result<Tensor<R>> {
        let shape = [self.batch_size, self.dimensions];
        Tensor::<R>::try_from_slice(self.data.as_slice(), &shape, device)
    }
}

/// Centroids for one batch, `[n_clusters, dimensions]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CentroidSet {
    n_clusters: usize,
    dimensions: usize,
    data: Vec<f32>,
}

impl CentroidSet {
    pub fn new(data: Vec<f32>, n_clusters: usize, dimensions: usize) -> ServiceResult<Self> {
        let expected = n_clusters * dimensions;
        if data.len() != expected {
            return Err(ServiceError::ShapeMismatch {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            n_clusters,
            dimensions,
            data,
        })
    }

    /// A set where every value is NaN (indeterminate centroids).
    pub fn indeterminate(n_clusters: usize, dimensions: usize) -> Self {
        Self {
            n_clusters,
            dimensions,
            data: vec![f32::NAN; n_clusters * dimensions],
        }
    }

    /// Download a `[k, d]` F32 tensor from any backend.
    pub fn from_tensor<R: Runtime>(tensor: &Tensor<R>) -> ServiceResult<Self> {
        if tensor.dtype() != DType::F32 {
            return Err(ServiceError::Backend(format!(
                "centroids must be F32, got {:?}",
                tensor.dtype()
            )));
        }
        let shape = tensor.shape();
        if shape.len() != 2 {
            return Err(ServiceError::Backend(format!(
                "centroids must be 2-D [k, d], got {}-D",
                shape.len()
            )));
        }
        let (k, d) = (shape[0], shape[1]);
        let data: Vec<f32> = tensor.contiguous().to_vec();
        Self::new(data, k, d)
    }

    /// Decode one output frame of host-native floats.
    pub fn from_ne_bytes(
        bytes: &[u8],
        n_clusters: usize,
        dimensions: usize,
    ) -> ServiceResult<Self> {
        if bytes.len() != F32_BYTES * n_clusters * dimensions {
            return Err(ServiceError::ShapeMismatch {
                expected: n_clusters * dimensions,
                got: bytes.len() / F32_BYTES,
            });
        }
        Self::new(f32s_from_ne_bytes(bytes), n_clusters, dimensions)
    }

    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn centroid(&self, j: usize) -> Option<&[f32]> {
        if j >= self.n_clusters {
            return None;
        }
        Some(&self.data[j * self.dimensions..(j + 1) * self.dimensions])
    }

    pub fn centroids(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.dimensions.max(1))
    }

    /// Append the row-major native-order bytes to `buf`.
    pub fn put_ne_bytes<B: BufMut>(&self, buf: &mut B) {
        for v in &self.data {
            buf.put_slice(&v.to_ne_bytes());
        }
    }

    /// Row-major native-order bytes, exactly `4 * n_clusters * dimensions` long.
    pub fn to_ne_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len() * F32_BYTES);
        self.put_ne_bytes(&mut out);
        out
    }
}
