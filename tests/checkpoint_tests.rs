//! Tests for `.bnn` export and import through the file system.
//!
//! These tests verify:
//! - Export followed by import reproduces the network
//! - Trained networks keep their predictions across a round trip
//! - Malformed files and paths are rejected with format errors
//! - Custom activation catalogs resolve on import

use approx::assert_abs_diff_eq;
use bnn::checkpoint::{import, import_with_catalog};
use bnn::{BnnError, Catalog, Config, Dataset, Network, Topology};
use ndarray::arr1;
use std::fs;
use std::path::PathBuf;

/// A scratch directory under the system temp dir, removed on drop.
struct ScratchDir(PathBuf);

impl ScratchDir {
    fn new(name: &str) -> Self {
        let dir = std::env::temp_dir()
            .join("bnn_checkpoint_tests")
            .join(format!("{name}_{}", std::process::id()));
        fs::create_dir_all(&dir).expect("create scratch dir");
        Self(dir)
    }

    fn file(&self, name: &str) -> PathBuf {
        self.0.join(name)
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

fn make_test_network(seed: u64) -> Network {
    let topology = Topology::new(
        0.35,
        &[3, 5, 4, 2],
        &["input", "hidden1", "hidden2", "output"],
        &["identity", "tanh", "relu", "sigmoid"],
    )
    .with_seed(seed);
    Network::from_topology(&topology).expect("valid topology")
}

fn assert_same_network(original: &Network, loaded: &Network) {
    assert_eq!(loaded.learning_rate(), original.learning_rate());
    assert_eq!(loaded.sizes(), original.sizes());
    assert_eq!(loaded.topology(), original.topology());

    for index in 0..original.layer_count() {
        match (original.weights(index), loaded.weights(index)) {
            (Some(a), Some(b)) => {
                assert_eq!(a.shape(), b.shape());
                for (x, y) in a.iter().zip(b.iter()) {
                    assert_abs_diff_eq!(x, y, epsilon = 1e-9);
                }
            }
            (None, None) => {}
            _ => panic!("weight presence differs at layer {index}"),
        }
    }
}

// ============================================================================
// ROUND TRIP
// ============================================================================

#[test]
fn test_checkpoint_round_trip() {
    let scratch = ScratchDir::new("round_trip");
    let path = scratch.file("net.bnn");
    let network = make_test_network(1);

    network.export(&path).expect("export failed");
    let loaded = Network::import(&path).expect("import failed");

    assert_same_network(&network, &loaded);
}

#[test]
fn test_round_trip_after_training() {
    let scratch = ScratchDir::new("trained");
    let path = scratch.file("trained.bnn");

    let mut network = make_test_network(2);
    let data = Dataset::from_pairs(vec![
        (arr1(&[0.1, 0.2, 0.3]), arr1(&[0.9, 0.1])),
        (arr1(&[-0.5, 0.4, 0.0]), arr1(&[0.2, 0.8])),
    ]);
    let config = Config {
        epochs: 100,
        ..Config::default()
    };
    network.train(&config, &data).unwrap();
    network.export(&path).unwrap();

    let mut loaded = import(&path).unwrap();
    assert_same_network(&network, &loaded);

    for (input, _) in &data {
        let a = network.forward_propagate(input).unwrap();
        let b = loaded.forward_propagate(input).unwrap();
        for (x, y) in a.iter().zip(b.iter()) {
            assert_abs_diff_eq!(x, y, epsilon = 1e-9);
        }
    }
}

#[test]
fn test_export_creates_directory() {
    let scratch = ScratchDir::new("nested");
    let path = scratch.0.join("deep").join("path").join("net.bnn");

    make_test_network(3).export(&path).unwrap();
    assert!(path.exists());
}

#[test]
fn test_exported_header() {
    let scratch = ScratchDir::new("header");
    let path = scratch.file("header.bnn");
    make_test_network(4).export(&path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "0.35");
    assert_eq!(lines[1], "3;5;4;2");
    assert_eq!(lines[2], "input;hidden1;hidden2;output");
    assert_eq!(lines[3], "identity;tanh;relu;sigmoid");
    // one weight line per non-output layer
    assert_eq!(lines.len(), 4 + 3);
    assert_eq!(lines[4].split_whitespace().count(), 4 * 5);
    assert!(lines[4].ends_with(' '));
}

// ============================================================================
// FORMAT ERRORS
// ============================================================================

#[test]
fn test_wrong_extension() {
    let scratch = ScratchDir::new("extension");
    let path = scratch.file("net.txt");
    fs::write(&path, "0.1\n2;1\nin;out\nsigmoid\n1 2 3 \n").unwrap();

    assert!(matches!(import(&path), Err(BnnError::Format(_))));
    assert!(matches!(
        make_test_network(5).export(&path),
        Err(BnnError::Format(_))
    ));
}

#[test]
fn test_too_few_lines() {
    let scratch = ScratchDir::new("short");
    let path = scratch.file("short.bnn");
    fs::write(&path, "0.1\n2;1\nin;out\n").unwrap();

    assert!(matches!(import(&path), Err(BnnError::Format(_))));
}

#[test]
fn test_non_integer_layer_size() {
    let scratch = ScratchDir::new("sizes");
    let path = scratch.file("sizes.bnn");

    for sizes in ["2;1.5", "2;one", "2;-1", ";1"] {
        fs::write(&path, format!("0.1\n{sizes}\nin;out\nsigmoid\n1 2 3 \n")).unwrap();
        assert!(
            matches!(import(&path), Err(BnnError::Format(_))),
            "sizes line {sizes:?} should be rejected"
        );
    }
}

#[test]
fn test_bad_weight_token() {
    let scratch = ScratchDir::new("weights");
    let path = scratch.file("weights.bnn");
    fs::write(&path, "0.1\n2;1\nin;out\nsigmoid\n1 2 x3 \n").unwrap();

    assert!(matches!(import(&path), Err(BnnError::Format(_))));
}

#[test]
fn test_header_configuration_errors() {
    let scratch = ScratchDir::new("config");
    let path = scratch.file("config.bnn");
    fs::write(&path, "0.1\n2;1\nin\nsigmoid\n1 2 3 \n").unwrap();

    assert!(matches!(import(&path), Err(BnnError::Configuration(_))));
}

// ============================================================================
// CUSTOM CATALOG
// ============================================================================

fn cube(x: f64) -> f64 {
    x * x * x
}

fn d_cube(y: f64) -> f64 {
    3.0 * y.cbrt().powi(2)
}

#[test]
fn test_custom_catalog_round_trip() {
    let scratch = ScratchDir::new("catalog");
    let path = scratch.file("cube.bnn");

    let mut catalog = Catalog::standard();
    catalog.register("cube", cube, d_cube);

    let topology = Topology::new(0.1, &[2, 2], &["in", "out"], &["identity", "cube"]).with_seed(6);
    let network = Network::with_catalog(&topology, &catalog).unwrap();
    network.export(&path).unwrap();

    // The standard catalog does not know "cube"
    assert!(matches!(
        import(&path),
        Err(BnnError::UnknownActivation { .. })
    ));

    let loaded = import_with_catalog(&path, &catalog).unwrap();
    assert_same_network(&network, &loaded);
    assert_eq!(loaded.output_layer().activation_name(), "cube");
}
