//! Layers and neurons.
//!
//! A layer keeps its neuron state column-wise: one `Array1<f64>` each for
//! inputs, outputs and errors. Non-output layers carry a bias neuron in the
//! last slot of `input`/`output`; its output is fixed at 1.0 and it has no
//! error entry.

use crate::activation::{ActivationFn, ActivationId};
use crate::error::{BnnError, BnnResult};
use ndarray::{s, Array1, Array2, ArrayView1};

/// Position of a layer in its network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Input,
    Hidden,
    Output,
}

impl Role {
    /// Role of the layer at `index` in a network of `count` layers (count >= 2).
    pub fn at(index: usize, count: usize) -> Self {
        if index == 0 {
            Role::Input
        } else if index + 1 == count {
            Role::Output
        } else {
            Role::Hidden
        }
    }
}

/// Snapshot of a single neuron.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neuron<'a> {
    pub input: f64,
    pub output: f64,
    /// Always 0.0 for a bias neuron
    pub error: f64,
    pub activation: &'a str,
    pub is_bias: bool,
}

#[derive(Debug, Clone)]
pub struct Layer {
    name: String,
    role: Role,
    neuron_count: usize,
    activation: ActivationId,
    activation_name: String,
    /// Pre-activation values, length n (+1 bias slot)
    pub(crate) input: Array1<f64>,
    /// Activated values, length n (+1 bias slot fixed at 1.0)
    pub(crate) output: Array1<f64>,
    /// Error per non-bias neuron, length n
    pub(crate) error: Array1<f64>,
    /// Shape (n + 1, next layer's n); `None` for the output layer
    pub(crate) weights: Option<Array2<f64>>,
}

impl Layer {
    pub(crate) fn new(
        name: &str,
        role: Role,
        neuron_count: usize,
        activation: ActivationId,
        activation_name: &str,
        weights: Option<Array2<f64>>,
    ) -> Self {
        let slots = if role == Role::Output {
            neuron_count
        } else {
            neuron_count + 1
        };
        let mut output = Array1::zeros(slots);
        if role != Role::Output {
            output[neuron_count] = 1.0;
        }

        Self {
            name: name.to_string(),
            role,
            neuron_count,
            activation,
            activation_name: activation_name.to_string(),
            input: Array1::zeros(slots),
            output,
            error: Array1::zeros(neuron_count),
            weights,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Number of neurons, not counting the bias neuron.
    pub fn neuron_count(&self) -> usize {
        self.neuron_count
    }

    pub fn has_bias(&self) -> bool {
        self.role != Role::Output
    }

    pub fn activation_name(&self) -> &str {
        &self.activation_name
    }

    pub fn activation_id(&self) -> ActivationId {
        self.activation
    }

    /// Weights to the next layer, rows = `neuron_count() + 1` (bias last).
    pub fn weights(&self) -> Option<&Array2<f64>> {
        self.weights.as_ref()
    }

    /// Pre-activation values of the non-bias neurons.
    pub fn inputs(&self) -> ArrayView1<'_, f64> {
        self.input.slice(s![..self.neuron_count])
    }

    /// Activated values of the non-bias neurons.
    pub fn outputs(&self) -> ArrayView1<'_, f64> {
        self.output.slice(s![..self.neuron_count])
    }

    pub fn errors(&self) -> ArrayView1<'_, f64> {
        self.error.view()
    }

    /// Neuron `index`; the bias neuron, if any, sits at `neuron_count()`.
    pub fn neuron(&self, index: usize) -> Option<Neuron<'_>> {
        if index >= self.input.len() {
            return None;
        }
        Some(Neuron {
            input: self.input[index],
            output: self.output[index],
            error: self.error.get(index).copied().unwrap_or(0.0),
            activation: &self.activation_name,
            is_bias: index == self.neuron_count,
        })
    }

    /// All neurons, bias last.
    pub fn neurons(&self) -> impl Iterator<Item = Neuron<'_>> + '_ {
        (0..self.input.len()).filter_map(move |i| self.neuron(i))
    }

    pub(crate) fn set_input(&mut self, values: ArrayView1<f64>) {
        self.input.slice_mut(s![..self.neuron_count]).assign(&values);
    }

    /// output = f(input) for the non-bias neurons.
    pub(crate) fn activate(&mut self, activation: &ActivationFn) {
        let activated = activation.apply(self.input.slice(s![..self.neuron_count]));
        self.output
            .slice_mut(s![..self.neuron_count])
            .assign(&activated);
    }

    pub(crate) fn set_weights(&mut self, weights: Array2<f64>) -> BnnResult<()> {
        let current = self.weights.as_mut().ok_or_else(|| {
            BnnError::config(format!("Output layer {} has no weights", self.name))
        })?;
        if current.dim() != weights.dim() {
            return Err(BnnError::WeightShape {
                expected: current.dim(),
                actual: weights.dim(),
            });
        }
        *current = weights;
        Ok(())
    }
}
