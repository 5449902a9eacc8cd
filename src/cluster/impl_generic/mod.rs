//! Generic clustering algorithm implementations.

pub mod kmeans;

pub use kmeans::{assign_nearest, kmeans_impl, kmeans_predict_impl, lloyd_step, seed_centroids};
