//! Incremental decoder for input frames.

use bytes::{Buf, BytesMut};

use super::{F32_BYTES, LENGTH_PREFIX_BYTES};
use crate::batch::VectorBatch;
use crate::error::{ServiceError, ServiceResult};

/// Buffers raw input bytes and cuts them into [`VectorBatch`] frames.
///
/// The prefix is consumed as soon as it is complete, so the buffer never
/// holds more than the payload of the frame being assembled plus whatever
/// trailing bytes of later frames arrived with it. Consumed frames are split
/// off the front of the buffer without copying the remainder.
#[derive(Debug)]
pub struct FrameDecoder {
    dimensions: usize,
    max_batch_size: Option<usize>,
    buf: BytesMut,
    /// Row count of the frame whose prefix has been read but whose payload
    /// is still incomplete.
    pending: Option<usize>,
}

impl FrameDecoder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            max_batch_size: None,
            buf: BytesMut::new(),
            pending: None,
        }
    }

    /// Reject frames declaring more than `limit` rows.
    pub fn with_max_batch_size(mut self, limit: Option<usize>) -> Self {
        self.max_batch_size = limit;
        self
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// True when no partial frame is held.
    pub fn is_idle(&self) -> bool {
        self.pending.is_none() && self.buf.is_empty()
    }

    /// Append bytes read from the transport.
    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn payload_len(&self, batch_size: usize) -> ServiceResult<usize> {
        let row_bytes = F32_BYTES * self.dimensions;
        batch_size
            .checked_mul(row_bytes)
            .ok_or(ServiceError::FrameTooLarge {
                batch_size,
                limit: usize::MAX / row_bytes.max(1),
            })
    }

    /// Decode the next complete frame, or `Ok(None)` if more bytes are needed.
    pub fn try_decode(&mut self) -> ServiceResult<Option<VectorBatch>> {
        let batch_size = match self.pending {
            Some(n) => n,
            None => {
                if self.buf.len() < LENGTH_PREFIX_BYTES {
                    return Ok(None);
                }
                let n = self.buf.get_u32() as usize;
                if let Some(limit) = self.max_batch_size
                    && n > limit
                {
                    return Err(ServiceError::FrameTooLarge {
                        batch_size: n,
                        limit,
                    });
                }
                self.pending = Some(n);
                n
            }
        };

        let payload_len = self.payload_len(batch_size)?;
        if self.buf.len() < payload_len {
            return Ok(None);
        }

        let payload = self.buf.split_to(payload_len);
        self.pending = None;
        VectorBatch::from_ne_bytes(&payload, batch_size, self.dimensions).map(Some)
    }

    /// Signal end of input.
    ///
    /// Ending exactly on a frame boundary is a clean end of stream. Anything
    /// else, including a partial length prefix, is a truncation fault.
    pub fn finish(&self) -> ServiceResult<()> {
        match self.pending {
            None if self.buf.is_empty() => Ok(()),
            None => Err(ServiceError::Truncated {
                needed: LENGTH_PREFIX_BYTES,
                available: self.buf.len(),
            }),
            Some(batch_size) => Err(ServiceError::Truncated {
                needed: LENGTH_PREFIX_BYTES + self.payload_len(batch_size)?,
                available: LENGTH_PREFIX_BYTES + self.buf.len(),
            }),
        }
    }
}
