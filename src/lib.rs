//! # bnn
//!
//! A small feed-forward neural network engine: build a multi-layer
//! perceptron from layer sizes, run it forward, train it with online
//! backpropagation, and save/load it in a flat `.bnn` text format.
//!
//! ## Overview
//!
//! Every non-output layer carries a bias neuron (output fixed at 1.0) and the
//! weight matrix to the next layer. Training is strictly one sample at a
//! time; a NaN in any forward pass aborts training.
//!
//! ## Structure
//!
//! - [`core`]: Network, layers, neurons, forward and backward passes
//! - [`activation`]: Name-keyed activation catalog
//! - [`training`]: Training loop, divergence detection, metrics
//! - [`data`]: Labeled datasets
//! - [`checkpoint`]: `.bnn` import/export
//! - [`utils`]: Scalar activation functions and derivatives

pub mod activation;
pub mod checkpoint;
pub mod core;
pub mod data;
pub mod error;
pub mod training;
pub mod utils;

pub use activation::{ActivationFn, ActivationId, Catalog};
pub use self::core::{Layer, Network, Neuron, Role, Topology};
pub use data::{Dataset, Sample};
pub use error::{BnnError, BnnResult};
pub use training::{evaluate, Metrics, TrainOutcome};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Training configuration.
///
/// Used by [`Network::train`] and [`Network::train_with_callback`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub epochs: usize,
    /// Draw samples uniformly with replacement instead of in order
    pub shuffle: bool,
    /// Seed for shuffled sampling; entropy when absent
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            epochs: 1000,
            shuffle: false,
            seed: None,
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> BnnResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// A generator local to one training call.
    pub(crate) fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
