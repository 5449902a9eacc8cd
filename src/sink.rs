//! Output side of the service: one frame of centroids per batch.

use std::io::Write;

use bytes::BytesMut;

use crate::batch::CentroidSet;
use crate::error::ServiceResult;

/// Writes centroid frames to a byte sink, flushing after each one.
///
/// Frames carry no header. The reader relies on the fixed
/// `4 * n_clusters * dimensions` size to find frame boundaries, so a frame is
/// either written whole or the write fails.
pub struct CentroidSink<W> {
    inner: W,
    scratch: BytesMut,
    frames_written: u64,
}

impl<W: Write> CentroidSink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            scratch: BytesMut::new(),
            frames_written: 0,
        }
    }

    /// Serialize `centroids` in host byte order, write, then flush.
    pub fn write_centroids(&mut self, centroids: &CentroidSet) -> ServiceResult<()> {
        self.scratch.clear();
        centroids.put_ne_bytes(&mut self.scratch);
        self.inner.write_all(&self.scratch)?;
        self.inner.flush()?;
        self.frames_written += 1;
        Ok(())
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
