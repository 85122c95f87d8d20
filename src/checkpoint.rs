//! Checkpoint save/load in the `.bnn` text format.
//!
//! ```text
//! line 0   learning rate
//! line 1   layer sizes, bias excluded        2;4;1
//! line 2   layer names                       input;hidden;output
//! line 3   activation names, one or per layer
//! line 4+  one line per non-output layer: its weights row-major, every value
//!          followed by a space, rows = size + 1 (bias last), cols = next size
//! ```
//!
//! Activation names are resolved against a [`Catalog`] on load, so the
//! functions themselves never touch the file.

use crate::activation::Catalog;
use crate::core::{Network, Topology};
use crate::error::{BnnError, BnnResult};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;

/// Required file extension.
pub const EXTENSION: &str = "bnn";

const HEADER_LINES: usize = 4;

fn check_extension(path: &Path) -> BnnResult<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(EXTENSION) => Ok(()),
        _ => Err(BnnError::format(format!(
            "File format must be .{EXTENSION}: {}",
            path.display()
        ))),
    }
}

/// Names are joined with `;` on one line, so they may not contain either.
fn check_field(kind: &str, value: &str) -> BnnResult<()> {
    if value.contains(';') || value.contains('\n') || value.contains('\r') {
        return Err(BnnError::format(format!(
            "{kind} {value:?} cannot be stored: contains ';' or a line break"
        )));
    }
    Ok(())
}

/// Serialize a network to `.bnn` text.
///
/// # Errors
/// - `Format` if a layer or activation name contains `;` or a line break
pub fn encode(network: &Network) -> BnnResult<String> {
    let topology = network.topology();
    for name in &topology.names {
        check_field("Layer name", name)?;
    }
    for name in &topology.activations {
        check_field("Activation name", name)?;
    }

    let sizes: Vec<String> = topology.sizes.iter().map(usize::to_string).collect();
    let mut lines = vec![
        topology.learning_rate.to_string(),
        sizes.join(";"),
        topology.names.join(";"),
        topology.activations.join(";"),
    ];
    for layer in network.layers() {
        if let Some(weights) = layer.weights() {
            lines.push(weights.iter().map(|value| format!("{value} ")).collect());
        }
    }

    let mut text = lines.join("\n");
    text.push('\n');
    Ok(text)
}

/// Parse `.bnn` text, resolving activations against the standard catalog.
pub fn decode(text: &str) -> BnnResult<Network> {
    decode_with_catalog(text, &Catalog::standard())
}

/// Parse `.bnn` text, resolving activations against `catalog`.
///
/// # Errors
/// - `Format` for fewer than 4 lines, an unparsable learning rate, size or
///   weight, a missing weight line, or a weight line of the wrong length
/// - `Configuration` / `UnknownActivation` if the header describes an
///   invalid network
pub fn decode_with_catalog(text: &str, catalog: &Catalog) -> BnnResult<Network> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() < HEADER_LINES {
        return Err(BnnError::format(format!(
            "Meta data was not provided: expected at least {HEADER_LINES} lines, found {}",
            lines.len()
        )));
    }

    let learning_rate = lines[0].trim().parse::<f64>().map_err(|e| {
        BnnError::format(format!("Invalid learning rate {:?}: {e}", lines[0]))
    })?;

    let sizes = lines[1]
        .trim()
        .split(';')
        .map(|token| {
            token.trim().parse::<usize>().map_err(|e| {
                BnnError::format(format!("Invalid layer size {token:?}: {e}"))
            })
        })
        .collect::<BnnResult<Vec<usize>>>()?;

    let names: Vec<&str> = lines[2].split(';').collect();
    let activations: Vec<&str> = lines[3].split(';').map(str::trim).collect();

    let topology = Topology::new(learning_rate, &sizes, &names, &activations);
    topology.validate()?;

    // Weight lines are checked against the header before any layer is allocated
    let mut matrices = Vec::with_capacity(sizes.len() - 1);
    for index in 0..sizes.len() - 1 {
        let (rows, cols) = (sizes[index] + 1, sizes[index + 1]);
        let line = lines.get(HEADER_LINES + index).ok_or_else(|| {
            BnnError::format(format!("Missing weight line for layer {}", names[index]))
        })?;

        let values = line
            .split_whitespace()
            .map(|token| {
                token.parse::<f64>().map_err(|e| {
                    BnnError::format(format!("Invalid weight {token:?}: {e}"))
                })
            })
            .collect::<BnnResult<Vec<f64>>>()?;
        if values.len() != rows * cols {
            return Err(BnnError::format(format!(
                "Layer {} needs {} weights ({rows}x{cols}), found {}",
                names[index],
                rows * cols,
                values.len()
            )));
        }

        let weights = Array2::from_shape_vec((rows, cols), values)
            .map_err(|e| BnnError::format(format!("Failed to reconstruct weight matrix: {e}")))?;
        matrices.push(weights);
    }

    // Every weight is overwritten below, the seed only fills the placeholders
    let mut network = Network::with_rng(&topology, catalog, &mut StdRng::seed_from_u64(0))?;
    for (index, weights) in matrices.into_iter().enumerate() {
        network.set_weights(index, weights)?;
    }

    Ok(network)
}

/// Save a network to a `.bnn` file, creating parent directories as needed.
///
/// # Errors
/// - `Format` if `path` does not end in `.bnn` or a name cannot be stored
/// - `Io` if the file cannot be written
pub fn export(network: &Network, path: &Path) -> BnnResult<()> {
    check_extension(path)?;
    let text = encode(network)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, text)?;

    log::info!("Exported network {:?} to {}", network.sizes(), path.display());
    Ok(())
}

/// Load a network from a `.bnn` file using the standard catalog.
pub fn import(path: &Path) -> BnnResult<Network> {
    import_with_catalog(path, &Catalog::standard())
}

/// Load a network from a `.bnn` file, resolving activations against `catalog`.
///
/// # Errors
/// - `Format` if `path` does not end in `.bnn` or the contents are malformed
/// - `Io` if the file cannot be read
pub fn import_with_catalog(path: &Path, catalog: &Catalog) -> BnnResult<Network> {
    check_extension(path)?;
    let text = std::fs::read_to_string(path)?;
    let network = decode_with_catalog(&text, catalog)?;

    log::info!("Imported network {:?} from {}", network.sizes(), path.display());
    Ok(network)
}

impl Network {
    /// Load a network from a `.bnn` file. See [`import`].
    pub fn import(path: impl AsRef<Path>) -> BnnResult<Self> {
        import(path.as_ref())
    }

    /// Save this network to a `.bnn` file. See [`export`].
    pub fn export(&self, path: impl AsRef<Path>) -> BnnResult<()> {
        export(self, path.as_ref())
    }
}
