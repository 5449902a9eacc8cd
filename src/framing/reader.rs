//! Blocking frame reader over any byte source.

use std::io::{ErrorKind, Read};

use super::FrameDecoder;
use crate::batch::VectorBatch;
use crate::error::ServiceResult;

/// Read buffer size used when none is given.
pub const DEFAULT_READ_CHUNK: usize = 64 * 1024;

/// Pulls bytes from `R` until a whole frame is available.
///
/// Reads block; a stalled source stalls the reader. Iteration ends at a clean
/// end of input and yields a single `Truncated` error if the source ends
/// inside a frame.
pub struct FrameReader<R> {
    inner: R,
    decoder: FrameDecoder,
    chunk: Vec<u8>,
    eof: bool,
}

impl<R: Read> FrameReader<R> {
    pub fn new(inner: R, dimensions: usize) -> Self {
        Self::with_decoder(inner, FrameDecoder::new(dimensions))
    }

    pub fn with_decoder(inner: R, decoder: FrameDecoder) -> Self {
        Self {
            inner,
            decoder,
            chunk: vec![0; DEFAULT_READ_CHUNK],
            eof: false,
        }
    }

    /// Set the size of each underlying `read` call.
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk = vec![0; size.max(1)];
        self
    }

    /// Next complete batch, `Ok(None)` at end of input.
    pub fn next_batch(&mut self) -> ServiceResult<Option<VectorBatch>> {
        loop {
            if let Some(batch) = self.decoder.try_decode()? {
                return Ok(Some(batch));
            }
            if self.eof {
                return Ok(None);
            }

            let n = match self.inner.read(&mut self.chunk) {
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            if n == 0 {
                self.eof = true;
                self.decoder.finish()?;
                return Ok(None);
            }
            self.decoder.push(&self.chunk[..n]);
        }
    }
}

impl<R: Read> Iterator for FrameReader<R> {
    type Item = ServiceResult<VectorBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_batch().transpose()
    }
}
