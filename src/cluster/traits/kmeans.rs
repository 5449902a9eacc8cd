//! K-Means clustering trait.

use numr::error::Result;
use numr::runtime::Runtime;
use numr::tensor::Tensor;

use crate::config::DEFAULT_ITERATIONS;

/// Options for fixed-iteration Lloyd K-Means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KMeansOptions {
    /// Number of clusters. Centroids are seeded from the first `n_clusters` rows.
    pub n_clusters: usize,
    /// Number of E/M iterations. Always run in full, no convergence check.
    pub n_iter: usize,
}

impl KMeansOptions {
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            ..Default::default()
        }
    }
}

impl Default for KMeansOptions {
    fn default() -> Self {
        Self {
            n_clusters: 8,
            n_iter: DEFAULT_ITERATIONS,
        }
    }
}

/// Result of K-Means clustering.
#[derive(Debug, Clone)]
pub struct KMeansResult<R: Runtime> {
    /// Cluster centroids `[k, d]`. Rows of empty clusters are NaN.
    pub centroids: Tensor<R>,
    /// Assignment from the last E-step, `[n]` I64.
    pub labels: Tensor<R>,
    /// Number of iterations run.
    pub n_iter: usize,
}

/// K-Means clustering algorithms.
pub trait KMeansAlgorithms<R: Runtime> {
    /// Fit K-Means to data `[n, d]` with first-rows seeding.
    fn kmeans(&self, data: &Tensor<R>, options: &KMeansOptions) -> Result<KMeansResult<R>>;

    /// Nearest-centroid assignment for `data` (ties go to the lowest index).
    fn kmeans_predict(&self, centroids: &Tensor<R>, data: &Tensor<R>) -> Result<Tensor<R>>;
}
