//! CPU implementation of K-Means clustering.

use crate::cluster::impl_generic::{kmeans_impl, kmeans_predict_impl};
use crate::cluster::traits::kmeans::{KMeansAlgorithms, KMeansOptions, KMeansResult};
use numr::error::Result;
use numr::runtime::cpu::{CpuClient, CpuRuntime};
use numr::tensor::Tensor;

impl KMeansAlgorithms<CpuRuntime> for CpuClient {
    fn kmeans(
        &self,
        data: &Tensor<CpuRuntime>,
        options: &KMeansOptions,
    ) -> Result<KMeansResult<CpuRuntime>> {
        kmeans_impl(self, data, options)
    }

    fn kmeans_predict(
        &self,
        centroids: &Tensor<CpuRuntime>,
        data: &Tensor<CpuRuntime>,
    ) -> Result<Tensor<CpuRuntime>> {
        kmeans_predict_impl(self, centroids, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::impl_generic::kmeans::{lloyd_step, seed_centroids};
    use numr::dtype::DType;
    use numr::runtime::cpu::CpuDevice;

    fn setup() -> (CpuClient, CpuDevice) {
        let device = CpuDevice::new();
        let client = CpuClient::new(device.clone());
        (client, device)
    }

    fn fit(client: &CpuClient, data: &Tensor<CpuRuntime>, k: usize, n_iter: usize) -> Vec<f32> {
        let options = KMeansOptions { n_clusters: k, n_iter };
        client.kmeans(data, &options).unwrap().centroids.contiguous().to_vec()
    }

    #[test]
    fn test_kmeans_two_groups() {
        let (client, device) = setup();

        #[rustfmt::skip]
        let data = Tensor::<CpuRuntime>::from_slice(
            &[
                0.0f32, 0.0,
                0.0, 1.0,
                10.0, 0.0,
                10.0, 1.0,
            ],
            &[4, 2],
            &device,
        );

        // Seeds (0,0) and (0,1) split the points by their second coordinate.
        let result = client.kmeans(&data, &KMeansOptions::new(2)).unwrap();
        assert_eq!(result.centroids.shape(), &[2, 2]);
        assert_eq!(result.n_iter, 10);

        let centroids: Vec<f32> = result.centroids.contiguous().to_vec();
        assert_eq!(centroids, vec![5.0, 0.0, 5.0, 1.0]);

        let labels: Vec<i64> = result.labels.contiguous().to_vec();
        assert_eq!(labels, vec![0, 1, 0, 1]);
    }

    #[test]
    fn test_kmeans_seed_order_decides_split() {
        let (client, device) = setup();

        // Seeds (0,0) and (10,0) split the points by their first coordinate.
        #[rustfmt::skip]
        let data = Tensor::<CpuRuntime>::from_slice(
            &[
                0.0f32, 0.0,
                10.0, 0.0,
                0.0, 1.0,
                10.0, 1.0,
            ],
            &[4, 2],
            &device,
        );

        assert_eq!(fit(&client, &data, 2, 10), vec![0.0, 0.5, 10.0, 0.5]);
    }

    #[test]
    fn test_kmeans_k_equals_n_returns_rows() {
        let (client, device) = setup();
        let rows = [1.0f32, 2.0, -3.0, 4.5, 7.25, -6.0];
        let data = Tensor::<CpuRuntime>::from_slice(&rows, &[3, 2], &device);

        assert_eq!(fit(&client, &data, 3, 1), rows.to_vec());
        assert_eq!(fit(&client, &data, 3, 10), rows.to_vec());
    }

    #[test]
    fn test_kmeans_single_cluster_is_mean() {
        let (client, device) = setup();
        let data =
            Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0], &[3, 2], &device);

        let one = fit(&client, &data, 1, 1);
        assert!((one[0] - 3.0).abs() < 1e-6, "mean x = {}", one[0]);
        assert!((one[1] - 4.0).abs() < 1e-6, "mean y = {}", one[1]);
        assert_eq!(fit(&client, &data, 1, 10), one);
    }

    #[test]
    fn test_kmeans_is_deterministic() {
        let (client, device) = setup();
        let values: Vec<f32> = (0..64).map(|i| ((i * 37) % 23) as f32 * 0.5).collect();
        let data = Tensor::<CpuRuntime>::from_slice(&values, &[16, 4], &device);

        let a = fit(&client, &data, 4, 10);
        let b = fit(&client, &data, 4, 10);
        let a_bits: Vec<u32> = a.iter().map(|v| v.to_bits()).collect();
        let b_bits: Vec<u32> = b.iter().map(|v| v.to_bits()).collect();
        assert_eq!(a_bits, b_bits);
    }

    #[test]
    fn test_seed_copies_leading_rows() {
        let (client, device) = setup();
        let data =
            Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0], &[3, 2], &device);

        let seeds = seed_centroids(&client, &data, 2).unwrap();
        assert_eq!(seeds.contiguous().to_vec::<f32>(), vec![1.0, 2.0, 3.0, 4.0]);

        // Seeds wrap around once the rows run out.
        let seeds = seed_centroids(&client, &data, 5).unwrap();
        assert_eq!(
            seeds.contiguous().to_vec::<f32>(),
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 1.0, 2.0, 3.0, 4.0]
        );
    }

    #[test]
    fn test_empty_cluster_is_nan() {
        let (client, device) = setup();
        let data =
            Tensor::<CpuRuntime>::from_slice(&[0.0f32, 0.0, 10.0, 10.0], &[2, 2], &device);

        // Seed 2 duplicates seed 0, loses the tie and ends up empty.
        let centroids = fit(&client, &data, 3, 10);
        assert_eq!(&centroids[..4], &[0.0, 0.0, 10.0, 10.0]);
        assert!(centroids[4].is_nan());
        assert!(centroids[5].is_nan());
    }

    #[test]
    fn test_first_cluster_empties_mid_run() {
        let (client, device) = setup();

        #[rustfmt::skip]
        let data = Tensor::<CpuRuntime>::from_slice(
            &[
                -7.0f32, -9.0,
                -9.0, -8.0,
                -9.0, -9.0,
                -3.0, 2.0,
                -3.0, 5.0,
                -8.0, -8.0,
                -2.0, 0.0,
            ],
            &[7, 2],
            &device,
        );

        // Cluster 0 holds two rows after the first pass and none after the second.
        let result = client.kmeans(&data, &KMeansOptions { n_clusters: 3, n_iter: 10 }).unwrap();
        let labels: Vec<i64> = result.labels.contiguous().to_vec();
        assert_eq!(labels, vec![2, 2, 2, 1, 1, 2, 1]);

        let centroids: Vec<f32> = result.centroids.contiguous().to_vec();
        assert!(centroids[0].is_nan() && centroids[1].is_nan());
        let expected = [-8.0 / 3.0, 7.0 / 3.0, -8.25, -8.5];
        for (got, want) in centroids[2..].iter().zip(expected) {
            assert!((got - want).abs() < 1e-5, "centroid {got} vs {want}");
        }
    }

    #[test]
    fn test_nan_centroid_never_attracts_rows() {
        let (client, device) = setup();
        let centroids = Tensor::<CpuRuntime>::from_slice(
            &[f32::NAN, f32::NAN, 0.0, 0.0, 10.0, 10.0],
            &[3, 2],
            &device,
        );
        let data =
            Tensor::<CpuRuntime>::from_slice(&[0.5f32, 0.5, 9.0, 9.0, -1.0, 0.0], &[3, 2], &device);

        let labels = client.kmeans_predict(&centroids, &data).unwrap();
        assert_eq!(labels.contiguous().to_vec::<i64>(), vec![1, 2, 1]);
    }

    #[test]
    fn test_lloyd_step_rebuilds_from_zero() {
        let (client, device) = setup();
        let data =
            Tensor::<CpuRuntime>::from_slice(&[2.0f32, 2.0, 4.0, 4.0], &[2, 2], &device);
        let centroids = Tensor::<CpuRuntime>::from_slice(&[100.0f32, 100.0], &[1, 2], &device);

        let (next, labels) = lloyd_step(&client, &data, &centroids).unwrap();
        assert_eq!(next.contiguous().to_vec::<f32>(), vec![3.0, 3.0]);
        assert_eq!(labels.dtype(), DType::I64);
        assert_eq!(labels.contiguous().to_vec::<i64>(), vec![0, 0]);
    }

    #[test]
    fn test_kmeans_predict_ties_go_to_lowest_index() {
        let (client, device) = setup();
        let centroids =
            Tensor::<CpuRuntime>::from_slice(&[-1.0f32, 0.0, 1.0, 0.0, 10.0, 10.0], &[3, 2], &device);
        let data =
            Tensor::<CpuRuntime>::from_slice(&[0.0f32, 0.0, 0.9, 0.1, 9.0, 9.5], &[3, 2], &device);

        let labels = client.kmeans_predict(&centroids, &data).unwrap();
        assert_eq!(labels.contiguous().to_vec::<i64>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_kmeans_rejects_bad_arguments() {
        let (client, device) = setup();
        let data = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0], &[1, 2], &device);

        let zero_k = KMeansOptions { n_clusters: 0, n_iter: 10 };
        assert!(client.kmeans(&data, &zero_k).is_err());

        let zero_iter = KMeansOptions { n_clusters: 1, n_iter: 0 };
        assert!(client.kmeans(&data, &zero_iter).is_err());

        let wide = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0, 3.0], &[1, 3], &device);
        assert!(client.kmeans_predict(&wide, &data).is_err());
    }
}
