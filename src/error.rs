//! Error types shared by every module of the crate.

use thiserror::Error;

/// Errors that can occur while building, running, or persisting a network.
#[derive(Debug, Error)]
pub enum BnnError {
    /// Bad constructor arguments (too few layers, mismatched list lengths).
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Malformed `.bnn` file or path.
    #[error("Format error: {0}")]
    Format(String),

    /// An activation name that is not registered in the catalog.
    #[error("Unknown activation function: {name}")]
    UnknownActivation { name: String },

    /// A vector whose length does not match the layer it is fed to.
    #[error("Shape mismatch in {context}: expected {expected}, got {actual}")]
    ShapeMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A weight matrix whose (rows, cols) does not match the layers it joins.
    #[error("Weight matrix shape mismatch: expected {expected:?}, got {actual:?}")]
    WeightShape {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type BnnResult<T> = Result<T, BnnError>;

impl BnnError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        BnnError::Configuration(msg.into())
    }

    pub(crate) fn format(msg: impl Into<String>) -> Self {
        BnnError::Format(msg.into())
    }
}
