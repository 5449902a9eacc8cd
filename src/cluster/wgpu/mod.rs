//! WebGPU implementations of clustering algorithms.

mod kmeans;
