//! Lloyd K-Means clustering.
//!
//! Split the same way across backends: [`traits`] holds the algorithm trait and
//! its options, [`impl_generic`] holds the runtime-generic implementation, and
//! each backend module implements the trait for its client by delegating there.

mod cpu;
pub mod impl_generic;
pub mod traits;
mod validation;

#[cfg(feature = "cuda")]
mod cuda;
#[cfg(feature = "wgpu")]
mod wgpu;

pub use traits::kmeans::{KMeansAlgorithms, KMeansOptions, KMeansResult};
pub use validation::*;
