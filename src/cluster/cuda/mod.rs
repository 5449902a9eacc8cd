//! CUDA implementations of clustering algorithms.

mod kmeans;
