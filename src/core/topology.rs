//! Network shape description: learning rate, layer sizes, names, activations.

use crate::error::{BnnError, BnnResult};
use serde::{Deserialize, Serialize};

/// Everything a [`Network`](crate::Network) is built from.
///
/// `activations` holds either a single name, applied to every layer, or one
/// name per layer. `seed`, when set, makes weight initialization
/// reproducible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    pub learning_rate: f64,
    pub sizes: Vec<usize>,
    pub names: Vec<String>,
    pub activations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Topology {
    pub fn new<N, A>(learning_rate: f64, sizes: &[usize], names: &[N], activations: &[A]) -> Self
    where
        N: AsRef<str>,
        A: AsRef<str>,
    {
        Self {
            learning_rate,
            sizes: sizes.to_vec(),
            names: names.iter().map(|n| n.as_ref().to_string()).collect(),
            activations: activations.iter().map(|a| a.as_ref().to_string()).collect(),
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parse a topology from JSON, e.g.
    /// `{"learning_rate": 0.5, "sizes": [2, 4, 1], "names": ["in", "h", "out"], "activations": ["tanh"]}`.
    pub fn from_json(json: &str) -> BnnResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check the argument lists against each other.
    ///
    /// # Errors
    /// - `Configuration` if there are fewer than 2 layers, if `names` and
    ///   `sizes` differ in length, if `activations` is neither one name nor one
    ///   per layer, if a layer has no neurons, or if a weight matrix would
    ///   hold more than `usize::MAX` values
    pub fn validate(&self) -> BnnResult<()> {
        if self.sizes.len() < 2 {
            return Err(BnnError::config(format!(
                "Must have at least 2 layers (input and output), got {}",
                self.sizes.len()
            )));
        }
        if self.names.len() != self.sizes.len() {
            return Err(BnnError::config(format!(
                "Got {} layer names for {} layers",
                self.names.len(),
                self.sizes.len()
            )));
        }
        if self.activations.len() != 1 && self.activations.len() != self.sizes.len() {
            return Err(BnnError::config(format!(
                "Got {} activation names for {} layers; give one for all layers or one per layer",
                self.activations.len(),
                self.sizes.len()
            )));
        }
        if let Some(index) = self.sizes.iter().position(|&n| n == 0) {
            return Err(BnnError::config(format!(
                "Layer {} ({}) has no neurons",
                index, self.names[index]
            )));
        }
        for (index, pair) in self.sizes.windows(2).enumerate() {
            let cells = pair[0].checked_add(1).and_then(|rows| rows.checked_mul(pair[1]));
            if cells.is_none() {
                return Err(BnnError::config(format!(
                    "Weight matrix of layer {} ({}) is too large: ({} + 1) x {}",
                    index, self.names[index], pair[0], pair[1]
                )));
            }
        }
        Ok(())
    }

    /// One activation name per layer, expanding a single shared name.
    ///
    /// Only meaningful after [`validate`](Self::validate) succeeded.
    pub fn layer_activations(&self) -> Vec<&str> {
        match self.activations.as_slice() {
            [shared] => vec![shared.as_str(); self.sizes.len()],
            per_layer => per_layer.iter().map(String::as_str).collect(),
        }
    }
}
