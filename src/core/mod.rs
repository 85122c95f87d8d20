//! Core network implementation.
//!
//! This module provides the multi-layer perceptron and its two passes:
//! - Forward propagation through activated layers and weight matrices
//! - Recursive backward propagation with in-place delta-rule weight updates
//!
//! ## Layout
//!
//! Layer `l` owns the weights `W^l` from itself to layer `l+1`, shape
//! `(n_l + 1, n_{l+1})`. The last row multiplies the bias neuron, whose
//! output is always 1.0. The output layer owns no weights.
//!
//! ## Update Rule
//!
//! With `δ^{l+1} = e^{l+1} ⊙ f'(y^{l+1})`:
//! ```text
//! e^l  = W^l[..n_l, :] · δ^{l+1}
//! W^l += η · y^l ⊗ δ^{l+1}
//! ```
//! where `e^L = target - y^L` at the output layer.

mod layer;
mod topology;

pub use layer::{Layer, Neuron, Role};
pub use topology::Topology;

use crate::activation::Catalog;
use crate::error::{BnnError, BnnResult};
use ndarray::{s, Array1, Array2, ArrayView1, Axis};
use ndarray_rand::RandomExt;
use rand::distributions::Uniform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A feed-forward network trained by online backpropagation.
///
/// # Architecture
///
/// - **Layers:** indexed 0 (input) to L (output); neighbours are `index ± 1`
/// - **Weights:** `layers[l].weights()` has shape `(n_l + 1, n_{l+1})`
/// - **Activation:** one catalog entry per layer, resolved at construction
///
/// # Weight Initialization
///
/// Every weight, bias rows included, is drawn independently from U[-1, 1).
#[derive(Clone)]
pub struct Network {
    learning_rate: f64,
    layers: Vec<Layer>,
    catalog: Catalog,
}

impl std::fmt::Debug for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Network")
            .field("learning_rate", &self.learning_rate)
            .field("sizes", &self.sizes())
            .field(
                "layers",
                &self
                    .layers
                    .iter()
                    .map(|l| format!("{} ({})", l.name(), l.activation_name()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Network {
    /// Create a network with the standard catalog and an entropy-seeded generator.
    ///
    /// `activations` is either one name for every layer or one per layer.
    ///
    /// # Errors
    /// - `Configuration` for fewer than 2 layers or mismatched list lengths
    /// - `UnknownActivation` for a name missing from the catalog
    pub fn new<N, A>(
        learning_rate: f64,
        sizes: &[usize],
        names: &[N],
        activations: &[A],
    ) -> BnnResult<Self>
    where
        N: AsRef<str>,
        A: AsRef<str>,
    {
        Self::from_topology(&Topology::new(learning_rate, sizes, names, activations))
    }

    /// Create a network from a topology with the standard catalog.
    ///
    /// Weights are reproducible when `topology.seed` is set.
    pub fn from_topology(topology: &Topology) -> BnnResult<Self> {
        Self::with_catalog(topology, &Catalog::standard())
    }

    /// Create a network whose activation names resolve against `catalog`.
    pub fn with_catalog(topology: &Topology, catalog: &Catalog) -> BnnResult<Self> {
        let mut rng = match topology.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(topology, catalog, &mut rng)
    }

    /// Create a network drawing initial weights from `rng`.
    pub fn with_rng<R: Rng>(
        topology: &Topology,
        catalog: &Catalog,
        rng: &mut R,
    ) -> BnnResult<Self> {
        topology.validate()?;
        let activations = topology.layer_activations();
        let count = topology.sizes.len();

        let mut layers = Vec::with_capacity(count);
        for (index, &size) in topology.sizes.iter().enumerate() {
            let activation = catalog.lookup(activations[index])?;
            let weights = match topology.sizes.get(index + 1) {
                Some(&next) => Some(Array2::random_using(
                    (size + 1, next),
                    Uniform::new(-1.0, 1.0),
                    rng,
                )),
                None => None,
            };
            layers.push(Layer::new(
                &topology.names[index],
                Role::at(index, count),
                size,
                activation,
                activations[index],
                weights,
            ));
        }

        log::info!(
            "Built network {:?} with learning rate {}",
            topology.sizes,
            topology.learning_rate
        );

        Ok(Self {
            learning_rate: topology.learning_rate,
            layers,
            catalog: catalog.clone(),
        })
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn set_learning_rate(&mut self, learning_rate: f64) {
        self.learning_rate = learning_rate;
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    /// First layer carrying `name`.
    pub fn layer_by_name(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name() == name)
    }

    pub fn input_layer(&self) -> &Layer {
        &self.layers[0]
    }

    pub fn output_layer(&self) -> &Layer {
        &self.layers[self.layers.len() - 1]
    }

    /// Index of the layer feeding layer `index`, `None` for the input layer.
    pub fn previous_index(&self, index: usize) -> Option<usize> {
        if index == 0 || index >= self.layers.len() {
            None
        } else {
            Some(index - 1)
        }
    }

    /// Index of the layer fed by layer `index`, `None` for the output layer.
    pub fn next_index(&self, index: usize) -> Option<usize> {
        if index + 1 < self.layers.len() {
            Some(index + 1)
        } else {
            None
        }
    }

    /// Neuron counts per layer, bias excluded.
    pub fn sizes(&self) -> Vec<usize> {
        self.layers.iter().map(Layer::neuron_count).collect()
    }

    /// The topology this network would be rebuilt from (without a seed).
    pub fn topology(&self) -> Topology {
        Topology {
            learning_rate: self.learning_rate,
            sizes: self.sizes(),
            names: self.layers.iter().map(|l| l.name().to_string()).collect(),
            activations: self
                .layers
                .iter()
                .map(|l| l.activation_name().to_string())
                .collect(),
            seed: None,
        }
    }

    /// Weights from layer `index` to the next one.
    pub fn weights(&self, index: usize) -> Option<&Array2<f64>> {
        self.layers.get(index).and_then(Layer::weights)
    }

    /// Replace the weights from layer `index` to the next one.
    ///
    /// # Errors
    /// - `Configuration` if `index` is out of range or is the output layer
    /// - `WeightShape` if `weights` is not `(n_index + 1, n_{index+1})`
    pub fn set_weights(&mut self, index: usize, weights: Array2<f64>) -> BnnResult<()> {
        let count = self.layers.len();
        let layer = self.layers.get_mut(index).ok_or_else(|| {
            BnnError::config(format!("Layer index {index} out of range for {count} layers"))
        })?;
        layer.set_weights(weights)
    }

    /// Push `input` through every layer and return the output layer's activations.
    ///
    /// # Algorithm
    ///
    /// For each layer ℓ in order:
    /// ```text
    /// y^ℓ       = f(x^ℓ)                  (bias output stays 1.0)
    /// x^{ℓ+1}   = [y^ℓ, 1] · W^ℓ           (skipped for the output layer)
    /// ```
    ///
    /// # Errors
    /// - `ShapeMismatch` if `input.len()` differs from the input layer's neuron count
    pub fn forward_propagate(&mut self, input: &Array1<f64>) -> BnnResult<Array1<f64>> {
        let expected = self.layers[0].neuron_count();
        if input.len() != expected {
            return Err(BnnError::ShapeMismatch {
                context: "forward input",
                expected,
                actual: input.len(),
            });
        }
        self.layers[0].set_input(input.view());

        let catalog = &self.catalog;
        for l in 0..self.layers.len() {
            let (head, tail) = self.layers.split_at_mut(l + 1);
            let layer = &mut head[l];
            layer.activate(catalog.get(layer.activation_id()));

            if let (Some(weights), Some(next)) = (layer.weights.as_ref(), tail.first_mut()) {
                let weighted = layer.output.dot(weights);
                next.set_input(weighted.view());
            }
        }

        Ok(self.output_layer().outputs().to_owned())
    }

    /// Propagate the error against `expected` back from the output layer,
    /// updating every weight matrix in place.
    ///
    /// Must follow a [`forward_propagate`](Self::forward_propagate) call: it
    /// reads the activations that pass left behind.
    ///
    /// # Errors
    /// - `ShapeMismatch` if `expected.len()` differs from the output layer's neuron count
    pub fn back_propagate(&mut self, expected: &Array1<f64>) -> BnnResult<()> {
        let outputs = self.output_layer().neuron_count();
        if expected.len() != outputs {
            return Err(BnnError::ShapeMismatch {
                context: "expected output",
                expected: outputs,
                actual: expected.len(),
            });
        }
        let last = self.layers.len() - 1;
        self.propagate_error(last, Some(expected.view()));
        Ok(())
    }

    /// One recursion step of the backward pass, from layer `index` into the
    /// layer before it.
    ///
    /// `expected` is only given for the output layer, whose error is the raw
    /// residual `target - output`.
    fn propagate_error(&mut self, index: usize, expected: Option<ArrayView1<f64>>) {
        let (head, tail) = self.layers.split_at_mut(index);
        let layer = &mut tail[0];

        if let Some(expected) = expected {
            let residual = &expected - &layer.outputs();
            layer.error.assign(&residual);
        }

        // Base case: the input layer has nothing before it
        let Some(prev) = head.last_mut() else {
            return;
        };
        let n = prev.neuron_count();
        let Some(weights) = prev.weights.as_mut() else {
            return;
        };

        // δ = e ⊙ f'(y) over the non-bias neurons of `layer`
        let derivative = self
            .catalog
            .get(layer.activation_id())
            .derivative(layer.outputs());
        let delta = &layer.error * &derivative;

        // Errors of prev's non-bias neurons, from the weights before this update
        prev.error = weights.slice(s![..n, ..]).dot(&delta);

        // W += η * (y_prev ⊗ δ), bias row included
        let y_col = prev.output.view().insert_axis(Axis(1));
        let delta_row = delta.view().insert_axis(Axis(0));
        *weights += &(self.learning_rate * &(&y_col * &delta_row));

        self.propagate_error(index - 1, None);
    }
}
