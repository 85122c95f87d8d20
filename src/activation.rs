//! Activation catalog: a name-keyed table of activation functions.
//!
//! Layers never hold a function value. They resolve their activation name
//! once, at construction, to an [`ActivationId`] into the network's catalog.
//! The name is what gets written to a checkpoint, so a network restored from
//! disk finds the same functions again as long as the catalog knows the name.

use crate::error::{BnnError, BnnResult};
use crate::utils;
use ndarray::{Array1, ArrayView1};

/// Index of an entry in a [`Catalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivationId(usize);

/// One catalog entry: an elementwise activation and its derivative.
///
/// The derivative takes the activated output `y = f(x)`, not the
/// pre-activation input.
#[derive(Debug, Clone)]
pub struct ActivationFn {
    name: String,
    activate: fn(f64) -> f64,
    derivative: fn(f64) -> f64,
}

impl ActivationFn {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply activation function elementwise: f(x)
    pub fn apply(&self, x: ArrayView1<f64>) -> Array1<f64> {
        x.mapv(self.activate)
    }

    /// Derivative of the activation, elementwise over activated outputs: f'(y)
    pub fn derivative(&self, y: ArrayView1<f64>) -> Array1<f64> {
        y.mapv(self.derivative)
    }
}

/// An immutable-after-setup table of activation functions.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<ActivationFn>,
}

impl Catalog {
    /// An empty catalog. Every name a network uses must be registered first.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The built-in functions: `identity`, `sigmoid`, `tanh`, `relu`,
    /// `leaky_relu` and `softplus`.
    pub fn standard() -> Self {
        let mut catalog = Self::empty();
        catalog.register("identity", utils::identity, utils::d_identity);
        catalog.register("sigmoid", utils::sigmoid, utils::d_sigmoid);
        catalog.register("tanh", utils::tanh, utils::d_tanh);
        catalog.register("relu", utils::relu, utils::d_relu);
        catalog.register("leaky_relu", utils::leaky_relu, utils::d_leaky_relu);
        catalog.register("softplus", utils::softplus, utils::d_softplus);
        catalog
    }

    /// Add a function under `name`, replacing any entry with the same name.
    pub fn register(
        &mut self,
        name: &str,
        activate: fn(f64) -> f64,
        derivative: fn(f64) -> f64,
    ) -> ActivationId {
        let entry = ActivationFn {
            name: name.to_string(),
            activate,
            derivative,
        };
        match self.entries.iter().position(|e| e.name == name) {
            Some(index) => {
                self.entries[index] = entry;
                ActivationId(index)
            }
            None => {
                self.entries.push(entry);
                ActivationId(self.entries.len() - 1)
            }
        }
    }

    /// Resolve a name to its id.
    ///
    /// # Errors
    /// - `UnknownActivation` if no entry carries `name`
    pub fn lookup(&self, name: &str) -> BnnResult<ActivationId> {
        self.entries
            .iter()
            .position(|e| e.name == name)
            .map(ActivationId)
            .ok_or_else(|| BnnError::UnknownActivation {
                name: name.to_string(),
            })
    }

    /// The entry behind an id handed out by this catalog.
    ///
    /// Ids are only minted by `register`/`lookup` and entries are never
    /// removed, so an id from this catalog is always in range.
    pub fn get(&self, id: ActivationId) -> &ActivationFn {
        &self.entries[id.0]
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}
