//! Client-side codec: encode input frames, decode output frames.

use bytes::{BufMut, Bytes, BytesMut};

use super::{F32_BYTES, LENGTH_PREFIX_BYTES};
use crate::batch::{CentroidSet, VectorBatch};
use crate::error::{ServiceError, ServiceResult};

/// Encode one batch as an input frame.
///
/// Fails when the row count does not fit the 32-bit prefix.
pub fn encode_frame(batch: &VectorBatch) -> ServiceResult<Bytes> {
    let batch_size = u32::try_from(batch.batch_size()).map_err(|_| {
        ServiceError::FrameTooLarge {
            batch_size: batch.batch_size(),
            limit: u32::MAX as usize,
        }
    })?;

    let capacity = LENGTH_PREFIX_BYTES + batch.as_slice().len() * F32_BYTES;
    let mut buf = BytesMut::with_capacity(capacity);
    buf.put_u32(batch_size);
    for v in batch.as_slice() {
        buf.put_slice(&v.to_ne_bytes());
    }
    Ok(buf.freeze())
}

/// Encode rows of length `dimensions` as an input frame.
pub fn encode_rows<V: AsRef<[f32]>>(rows: &[V], dimensions: usize) -> ServiceResult<Bytes> {
    encode_frame(&VectorBatch::from_rows(rows, dimensions)?)
}

/// Buffers service output and yields one [`CentroidSet`] per complete frame.
#[derive(Debug)]
pub struct CentroidDecoder {
    n_clusters: usize,
    dimensions: usize,
    buf: BytesMut,
}

impl CentroidDecoder {
    pub fn new(n_clusters: usize, dimensions: usize) -> Self {
        Self {
            n_clusters,
            dimensions,
            buf: BytesMut::new(),
        }
    }

    /// Size of one output frame in bytes.
    pub fn frame_len(&self) -> usize {
        F32_BYTES * self.n_clusters * self.dimensions
    }

    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Decode the next output frame, or `Ok(None)` if more bytes are needed.
    pub fn try_decode(&mut self) -> ServiceResult<Option<CentroidSet>> {
        let frame_len = self.frame_len();
        if self.buf.len() < frame_len {
            return Ok(None);
        }
        let frame = self.buf.split_to(frame_len);
        CentroidSet::from_ne_bytes(&frame, self.n_clusters, self.dimensions).map(Some)
    }
}
