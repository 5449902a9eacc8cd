//! Synchronous client for a running clustering service.

use std::ffi::OsStr;
use std::io::{ErrorKind, Read, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use tracing::debug;

use crate::batch::CentroidSet;
use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::framing::{CentroidDecoder, DEFAULT_READ_CHUNK, encode_rows};

/// Sends batches to a service and reads back one centroid frame per batch.
///
/// `W` is the service's input and `R` its output. Requests are strictly
/// sequential: each call writes a frame, flushes, then blocks until the
/// matching output frame has arrived.
pub struct ClusterClient<W: Write, R: Read> {
    writer: W,
    reader: R,
    decoder: CentroidDecoder,
    dimensions: usize,
    chunk: Vec<u8>,
    child: Option<Child>,
}

impl<W: Write, R: Read> ClusterClient<W, R> {
    /// Both `n_clusters` and `dimensions` must be non-zero: an empty output
    /// frame could never be told apart from a missing one.
    pub fn new(writer: W, reader: R, n_clusters: usize, dimensions: usize) -> ServiceResult<Self> {
        ServiceConfig::new(dimensions, n_clusters).validate()?;
        Ok(Self {
            writer,
            reader,
            decoder: CentroidDecoder::new(n_clusters, dimensions),
            dimensions,
            chunk: vec![0; DEFAULT_READ_CHUNK],
            child: None,
        })
    }

    /// Cluster `rows` and return the resulting centroids.
    ///
    /// Every row must have the negotiated number of dimensions. Fails with
    /// `ServiceExited` if the service's output closes before a full frame.
    pub fn generate_centroids<V: AsRef<[f32]>>(
        &mut self,
        rows: &[V],
    ) -> ServiceResult<CentroidSet> {
        let frame = encode_rows(rows, self.dimensions)?;
        self.writer.write_all(&frame)?;
        self.writer.flush()?;

        loop {
            if let Some(centroids) = self.decoder.try_decode()? {
                return Ok(centroids);
            }
            let n = match self.reader.read(&mut self.chunk) {
                Ok(0) => return Err(ServiceError::ServiceExited),
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            self.decoder.push(&self.chunk[..n]);
        }
    }
}

impl ClusterClient<ChildStdin, ChildStdout> {
    /// Launch `program` as the service and connect to its stdio.
    ///
    /// The child's stderr is inherited so its log output stays visible.
    pub fn spawn<P: AsRef<OsStr>>(program: P, config: &ServiceConfig) -> ServiceResult<Self> {
        config.validate()?;

        let mut command = Command::new(program);
        command
            .arg(config.dimensions.to_string())
            .arg(config.n_clusters.to_string())
            .arg(config.device.to_string())
            .arg("--iterations")
            .arg(config.n_iter.to_string());
        if let Some(limit) = config.max_batch_size {
            command.arg("--max-batch").arg(limit.to_string());
        }

        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;
        debug!(pid = child.id(), "spawned clustering service");

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            return Err(ServiceError::ServiceExited);
        };

        let mut client = Self::new(stdin, stdout, config.n_clusters, config.dimensions)?;
        client.child = Some(child);
        Ok(client)
    }
}

impl<W: Write, R: Read> Drop for ClusterClient<W, R> {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}
