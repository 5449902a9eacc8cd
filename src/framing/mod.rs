//! Length-prefixed batch framing.
//!
//! # Wire format
//!
//! ```text
//! input:  [u32 batch_size, big-endian][batch_size * dimensions * f32, native order] ...
//! output: [n_clusters * dimensions * f32, native order] ...
//! ```
//!
//! Frames are concatenated with no delimiters or padding. The length prefix is
//! big-endian while the float payload uses the host's byte order; the two
//! must not be unified. Output frames carry no prefix: their size is fixed by
//! `dimensions` and `n_clusters`, negotiated at startup.
//!
//! Decoding is pull-based. Bytes are pushed into a [`FrameDecoder`] in
//! whatever chunks the transport delivers, and `try_decode` yields a batch
//! only once a whole frame is buffered. [`FrameReader`] wraps any
//! [`std::io::Read`] in that loop.

mod decoder;
mod encoder;
mod reader;

pub use decoder::FrameDecoder;
pub use encoder::{CentroidDecoder, encode_frame, encode_rows};
pub use reader::{DEFAULT_READ_CHUNK, FrameReader};

/// Size of the big-endian `batch_size` prefix.
pub const LENGTH_PREFIX_BYTES: usize = 4;

/// Size of one encoded `f32`.
pub const F32_BYTES: usize = 4;
