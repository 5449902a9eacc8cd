//! Clustering algorithm traits.

pub mod kmeans;
