//! End-to-end checks over in-memory streams and a spawned service process.

use std::io::Cursor;

use kmeans_stream::{
    CentroidDecoder, ClusterClient, ServiceConfig, ServiceError, VectorBatch, encode_frame,
    run_on_device,
};

fn grid_batch(batch_size: usize, dimensions: usize) -> VectorBatch {
    let data = (0..batch_size * dimensions)
        .map(|i| ((i * 7) % 13) as f32 - 6.0)
        .collect();
    VectorBatch::new(data, batch_size, dimensions).unwrap()
}

#[test]
fn answers_every_frame_in_order() {
    let config = ServiceConfig::new(3, 4);
    let sizes = [4, 9, 32, 5];

    let mut input = Vec::new();
    for &n in &sizes {
        input.extend_from_slice(&encode_frame(&grid_batch(n, 3)).unwrap());
    }

    let mut output = Vec::new();
    let stats = run_on_device(&config, Cursor::new(input), &mut output).unwrap();
    assert_eq!(stats.batches, sizes.len() as u64);
    assert_eq!(stats.vectors, sizes.iter().sum::<usize>() as u64);
    assert_eq!(output.len(), sizes.len() * config.output_frame_bytes());

    // k == n: the first frame's centroids are its own rows.
    let mut decoder = CentroidDecoder::new(4, 3);
    decoder.push(&output);
    let first = decoder.try_decode().unwrap().unwrap();
    assert_eq!(first.as_slice(), grid_batch(4, 3).as_slice());
}

#[test]
fn single_cluster_is_batch_mean() {
    let config = ServiceConfig::new(2, 1);
    let batch = VectorBatch::from_rows(&[[1.5f32, -2.0], [2.5, 4.0], [0.5, 1.0]], 2).unwrap();

    let mut output = Vec::new();
    run_on_device(&config, Cursor::new(encode_frame(&batch).unwrap()), &mut output).unwrap();

    let mut decoder = CentroidDecoder::new(1, 2);
    decoder.push(&output);
    let centroid = decoder.try_decode().unwrap().unwrap();
    let mean = centroid.as_slice();
    assert!((mean[0] - 1.5).abs() < 1e-6, "mean x = {}", mean[0]);
    assert!((mean[1] - 1.0).abs() < 1e-6, "mean y = {}", mean[1]);
}

#[test]
fn truncated_stream_is_fatal() {
    let config = ServiceConfig::new(2, 2);
    let encoded = encode_frame(&grid_batch(6, 2)).unwrap();

    let mut output = Vec::new();
    let err = run_on_device(
        &config,
        Cursor::new(encoded[..encoded.len() - 1].to_vec()),
        &mut output,
    )
    .unwrap_err();
    assert!(matches!(err, ServiceError::Truncated { .. }));
    assert!(output.is_empty());
}

#[test]
fn client_drives_spawned_service() {
    let config = ServiceConfig::new(2, 2);
    let mut client = ClusterClient::spawn(env!("CARGO_BIN_EXE_kmeans-stream"), &config).unwrap();

    let centroids = client
        .generate_centroids(&[[0.0f32, 0.0], [0.0, 1.0], [10.0, 0.0], [10.0, 1.0]])
        .unwrap();
    assert_eq!(centroids.as_slice(), &[5.0, 0.0, 5.0, 1.0]);

    // The same process serves the next batch with fresh seeds.
    let centroids = client
        .generate_centroids(&[[1.0f32, 1.0], [3.0, 3.0], [1.0, 1.0]])
        .unwrap();
    assert_eq!(centroids.as_slice(), &[1.0, 1.0, 3.0, 3.0]);
}
