//! CPU implementations of clustering algorithms.

mod kmeans;
