//! Argument checks shared by the clustering entry points.

use numr::dtype::DType;
use numr::error::{Error, Result};

/// Point sets must be F32 or F64.
pub fn validate_cluster_dtype(dtype: DType, op: &'static str) -> Result<()> {
    match dtype {
        DType::F32 | DType::F64 => Ok(()),
        _ => Err(Error::UnsupportedDType { dtype, op }),
    }
}

/// Data must be a non-empty 2D tensor `[n, d]`.
pub fn validate_data_2d(shape: &[usize], op: &'static str) -> Result<()> {
    if shape.len() != 2 {
        return Err(Error::InvalidArgument {
            arg: "data",
            reason: format!("{op} requires 2D data [n, d], got {}-D", shape.len()),
        });
    }
    if shape[0] == 0 {
        return Err(Error::InvalidArgument {
            arg: "data",
            reason: format!("{op} requires at least 1 data point"),
        });
    }
    Ok(())
}

/// `n_clusters` may exceed the number of points; only zero is rejected.
pub fn validate_n_clusters(n_clusters: usize, op: &'static str) -> Result<()> {
    if n_clusters == 0 {
        return Err(Error::InvalidArgument {
            arg: "n_clusters",
            reason: format!("{op} requires n_clusters > 0"),
        });
    }
    Ok(())
}

pub fn validate_n_iter(n_iter: usize, op: &'static str) -> Result<()> {
    if n_iter == 0 {
        return Err(Error::InvalidArgument {
            arg: "n_iter",
            reason: format!("{op} requires n_iter > 0"),
        });
    }
    Ok(())
}

/// Centroids must be `[k, d]` with the same `d` as the data.
pub fn validate_centroids(
    centroid_shape: &[usize],
    data_shape: &[usize],
    op: &'static str,
) -> Result<()> {
    if centroid_shape.len() != 2 || centroid_shape[0] == 0 {
        return Err(Error::InvalidArgument {
            arg: "centroids",
            reason: format!("{op} requires non-empty 2D centroids [k, d], got {centroid_shape:?}"),
        });
    }
    if centroid_shape[1] != data_shape[1] {
        return Err(Error::InvalidArgument {
            arg: "centroids",
            reason: format!(
                "{op}: centroid width {} does not match data width {}",
                centroid_shape[1], data_shape[1]
            ),
        });
    }
    Ok(())
}
