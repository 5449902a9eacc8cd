//! Generic K-Means clustering implementation.

use crate::cluster::traits::kmeans::{KMeansOptions, KMeansResult};
use crate::cluster::validation::{
    validate_centroids, validate_cluster_dtype, validate_data_2d, validate_n_clusters,
    validate_n_iter,
};
use numr::dtype::DType;
use numr::error::Result;
use numr::ops::{
    BinaryOps, ConditionalOps, DistanceMetric, DistanceOps, IndexingOps, ScatterReduceOp,
    TypeConversionOps, UnaryOps,
};
use numr::runtime::{Runtime, RuntimeClient};
use numr::tensor::Tensor;

/// Seed centroids from the leading rows of `data`.
///
/// Row `j` of the result is a copy of data row `j mod n`. With `k <= n` that
/// is simply the first `k` rows; with `k > n` the seeds repeat and the
/// duplicates end up empty after the first E-step.
pub fn seed_centroids<R, C>(client: &C, data: &Tensor<R>, k: usize) -> Result<Tensor<R>>
where
    R: Runtime,
    C: IndexingOps<R> + RuntimeClient<R>,
{
    let n = data.shape()[0];
    let indices: Vec<i64> = (0..k).map(|j| (j % n) as i64).collect();
    let idx_tensor = Tensor::<R>::try_from_slice(&indices, &[k], data.device())?;
    client.index_select(data, 0, &idx_tensor)
}

/// Index of the nearest centroid for every row of `data`, `[n]` I64.
///
/// Distances to NaN centroids (left by empty clusters) are masked to +inf, so
/// rows always go to the nearest finite centroid. Ties go to the lowest index.
pub fn assign_nearest<R, C>(
    client: &C,
    data: &Tensor<R>,
    centroids: &Tensor<R>,
) -> Result<Tensor<R>>
where
    R: Runtime,
    C: DistanceOps<R> + IndexingOps<R> + UnaryOps<R> + ConditionalOps<R> + RuntimeClient<R>,
{
    let dists = client.cdist(data, centroids, DistanceMetric::SquaredEuclidean)?; // [n, k]
    let is_nan = client.isnan(&dists)?;
    let inf_val =
        Tensor::<R>::try_full_scalar(dists.shape(), dists.dtype(), f64::INFINITY, dists.device())?;
    let dists = client.where_cond(&is_nan, &inf_val, &dists)?;
    client.argmin(&dists, 1, false)
}

/// Single Lloyd's iteration: assign, then rebuild centroids from scratch.
/// Returns (new_centroids, labels).
pub fn lloyd_step<R, C>(
    client: &C,
    data: &Tensor<R>,
    centroids: &Tensor<R>,
) -> Result<(Tensor<R>, Tensor<R>)>
where
    R: Runtime,
    C: DistanceOps<R>
        + IndexingOps<R>
        + BinaryOps<R>
        + UnaryOps<R>
        + ConditionalOps<R>
        + TypeConversionOps<R>
        + RuntimeClient<R>,
{
    let n = data.shape()[0];
    let k = centroids.shape()[0];
    let d = data.shape()[1];
    let dtype = data.dtype();
    let device = data.device();

    // E step
    let labels = assign_nearest(client, data, centroids)?; // [n] I64

    // M step: zeroed sums, scatter-add each row into its cluster
    let labels_expanded = labels.unsqueeze(1)?.broadcast_to(&[n, d])?;
    let dst = Tensor::<R>::try_zeros(&[k, d], dtype, device)?;
    let sums = client.scatter_reduce(
        &dst,
        0,
        &labels_expanded,
        data,
        ScatterReduceOp::Sum,
        true,
    )?;

    // Divide by occupancy. Empty clusters give 0/0 and stay NaN.
    let counts = client.bincount(&labels, None, k)?; // [k] I64
    let counts_f = client.cast(&counts, dtype)?;
    let counts_expanded = counts_f.unsqueeze(1)?.broadcast_to(&[k, d])?;
    let new_centroids = client.div(&sums, &counts_expanded)?;

    Ok((new_centroids, labels))
}

/// Generic K-Means implementation.
pub fn kmeans_impl<R, C>(
    client: &C,
    data: &Tensor<R>,
    options: &KMeansOptions,
) -> Result<KMeansResult<R>>
where
    R: Runtime,
    C: DistanceOps<R>
        + IndexingOps<R>
        + BinaryOps<R>
        + UnaryOps<R>
        + ConditionalOps<R>
        + TypeConversionOps<R>
        + RuntimeClient<R>,
{
    validate_cluster_dtype(data.dtype(), "kmeans")?;
    validate_data_2d(data.shape(), "kmeans")?;
    validate_n_clusters(options.n_clusters, "kmeans")?;
    validate_n_iter(options.n_iter, "kmeans")?;

    let mut centroids = seed_centroids(client, data, options.n_clusters)?;
    let mut labels = Tensor::<R>::try_zeros(&[data.shape()[0]], DType::I64, data.device())?;

    for _ in 0..options.n_iter {
        let (new_centroids, new_labels) = lloyd_step(client, data, &centroids)?;
        centroids = new_centroids;
        labels = new_labels;
    }

    Ok(KMeansResult {
        centroids,
        labels,
        n_iter: options.n_iter,
    })
}

/// Predict cluster assignments for new data given centroids.
pub fn kmeans_predict_impl<R, C>(
    client: &C,
    centroids: &Tensor<R>,
    data: &Tensor<R>,
) -> Result<Tensor<R>>
where
    R: Runtime,
    C: DistanceOps<R> + IndexingOps<R> + UnaryOps<R> + ConditionalOps<R> + RuntimeClient<R>,
{
    validate_cluster_dtype(data.dtype(), "kmeans_predict")?;
    validate_data_2d(data.shape(), "kmeans_predict")?;
    validate_centroids(centroids.shape(), data.shape(), "kmeans_predict")?;

    assign_nearest(client, data, centroids)
}
