//! Training loop, divergence detection, and evaluation metrics.
//!
//! Training is online gradient descent: one forward and one backward pass
//! per sample, weights updated after every sample.

use crate::core::Network;
use crate::data::Dataset;
use crate::error::BnnResult;
use crate::Config;
use ndarray::Array1;
use rand::Rng;

/// How a call to [`Network::train`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainOutcome {
    /// Every requested epoch ran.
    Completed { epochs: usize },
    /// A forward pass produced NaN during `epoch`; nothing after it ran.
    Diverged { epoch: usize },
}

impl TrainOutcome {
    pub fn is_diverged(&self) -> bool {
        matches!(self, TrainOutcome::Diverged { .. })
    }

    /// Number of epochs that ran to the end.
    pub fn epochs_completed(&self) -> usize {
        match *self {
            TrainOutcome::Completed { epochs } => epochs,
            TrainOutcome::Diverged { epoch } => epoch,
        }
    }
}

/// Error metrics of a network over a dataset.
#[derive(Debug, Clone)]
pub struct Metrics {
    /// Σ over samples of Σ over outputs of (expected - output)²
    pub sum_squared_error: f64,
    /// `sum_squared_error` divided by the number of samples
    pub mean_squared_error: f64,
    /// Largest |expected - output| seen on any output
    pub max_abs_error: f64,
}

impl Network {
    /// Train for `config.epochs` epochs over `dataset`.
    ///
    /// See [`train_with_callback`](Self::train_with_callback).
    pub fn train(&mut self, config: &Config, dataset: &Dataset) -> BnnResult<TrainOutcome> {
        self.train_with_callback(config, dataset, |_| {})
    }

    /// Train for `config.epochs` epochs, calling `on_epoch_end(epoch)` after
    /// each epoch that completes.
    ///
    /// # Algorithm
    ///
    /// Each epoch makes `dataset.len()` steps. A step takes the next sample in
    /// order, or with `config.shuffle` a uniformly drawn one (with
    /// replacement), then:
    /// ```text
    /// y = forward_propagate(x)
    /// if any(y is NaN): stop, return Diverged { epoch }
    /// back_propagate(t)
    /// ```
    ///
    /// Divergence leaves the weights as they were at the failing step.
    ///
    /// # Errors
    /// - `ShapeMismatch` if any sample does not fit the network (checked before
    ///   the first step)
    pub fn train_with_callback<F>(
        &mut self,
        config: &Config,
        dataset: &Dataset,
        mut on_epoch_end: F,
    ) -> BnnResult<TrainOutcome>
    where
        F: FnMut(usize),
    {
        dataset.validate(
            self.input_layer().neuron_count(),
            self.output_layer().neuron_count(),
        )?;
        let mut rng = config.rng();
        let samples = dataset.samples();

        for epoch in 0..config.epochs {
            for step in 0..samples.len() {
                let index = if config.shuffle {
                    rng.gen_range(0..samples.len())
                } else {
                    step
                };
                let (input, expected) = &samples[index];

                let output = self.forward_propagate(input)?;
                if output.iter().any(|v| v.is_nan()) {
                    log::warn!(
                        "Network output became NaN at epoch {epoch} (sample {index}); aborting training"
                    );
                    return Ok(TrainOutcome::Diverged { epoch });
                }
                self.back_propagate(expected)?;
            }

            log::debug!("Finished epoch {epoch}");
            on_epoch_end(epoch);
        }

        log::info!(
            "Trained {} epochs over {} samples (shuffle: {})",
            config.epochs,
            samples.len(),
            config.shuffle
        );
        Ok(TrainOutcome::Completed {
            epochs: config.epochs,
        })
    }
}

/// Squared error of one output vector.
pub fn squared_error(output: &Array1<f64>, expected: &Array1<f64>) -> f64 {
    (expected - output).mapv(|e| e * e).sum()
}

/// Run every sample forward (no weight updates) and collect error metrics.
///
/// # Errors
/// - `ShapeMismatch` if a sample does not fit the network
pub fn evaluate(network: &mut Network, dataset: &Dataset) -> BnnResult<Metrics> {
    dataset.validate(
        network.input_layer().neuron_count(),
        network.output_layer().neuron_count(),
    )?;
    let mut sum_squared_error = 0.0;
    let mut max_abs_error = 0.0f64;

    for (input, expected) in dataset {
        let output = network.forward_propagate(input)?;
        sum_squared_error += squared_error(&output, expected);
        max_abs_error = (expected - &output)
            .iter()
            .fold(max_abs_error, |acc, e| acc.max(e.abs()));
    }

    let mean_squared_error = if dataset.is_empty() {
        0.0
    } else {
        sum_squared_error / dataset.len() as f64
    };

    Ok(Metrics {
        sum_squared_error,
        mean_squared_error,
        max_abs_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Topology;
    use crate::error::BnnError;
    use ndarray::arr1;

    fn small_network() -> Network {
        let topology = Topology::new(0.5, &[2, 3, 1], &["in", "h", "out"], &["tanh"]).with_seed(3);
        Network::from_topology(&topology).unwrap()
    }

    #[test]
    fn test_outcome_accessors() {
        let done = TrainOutcome::Completed { epochs: 10 };
        assert!(!done.is_diverged());
        assert_eq!(done.epochs_completed(), 10);

        let diverged = TrainOutcome::Diverged { epoch: 4 };
        assert!(diverged.is_diverged());
        assert_eq!(diverged.epochs_completed(), 4);
    }

    #[test]
    fn test_squared_error() {
        let err = squared_error(&arr1(&[1.0, 2.0]), &arr1(&[0.0, 4.0]));
        assert_eq!(err, 5.0);
    }

    #[test]
    fn test_callback_every_epoch() {
        let mut net = small_network();
        let data = Dataset::from_pairs(vec![(arr1(&[0.1, 0.2]), arr1(&[0.3]))]);
        let config = Config {
            epochs: 5,
            ..Config::default()
        };

        let mut seen = Vec::new();
        let outcome = net
            .train_with_callback(&config, &data, |epoch| seen.push(epoch))
            .unwrap();
        assert_eq!(outcome, TrainOutcome::Completed { epochs: 5 });
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_shape_checked_before_training() {
        let mut net = small_network();
        let before = net.weights(0).unwrap().clone();
        let data = Dataset::from_pairs(vec![
            (arr1(&[0.1, 0.2]), arr1(&[0.3])),
            (arr1(&[0.1]), arr1(&[0.3])),
        ]);
        let result = net.train(&Config::default(), &data);
        assert!(matches!(result, Err(BnnError::ShapeMismatch { .. })));
        assert_eq!(net.weights(0).unwrap(), &before);
    }

    #[test]
    fn test_nan_input_diverges_immediately() {
        let mut net = small_network();
        let data = Dataset::from_pairs(vec![(arr1(&[f64::NAN, 0.0]), arr1(&[0.3]))]);
        let mut calls = 0;
        let outcome = net
            .train_with_callback(&Config::default(), &data, |_| calls += 1)
            .unwrap();
        assert_eq!(outcome, TrainOutcome::Diverged { epoch: 0 });
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_empty_dataset() {
        let mut net = small_network();
        let outcome = net.train(&Config::default(), &Dataset::new()).unwrap();
        assert_eq!(outcome.epochs_completed(), Config::default().epochs);

        let metrics = evaluate(&mut net, &Dataset::new()).unwrap();
        assert_eq!(metrics.mean_squared_error, 0.0);
    }

    #[test]
    fn test_evaluate() {
        let mut net = small_network();
        let data = Dataset::from_pairs(vec![
            (arr1(&[0.1, 0.2]), arr1(&[0.3])),
            (arr1(&[-0.4, 0.9]), arr1(&[-0.2])),
        ]);
        let metrics = evaluate(&mut net, &data).unwrap();
        assert!(metrics.sum_squared_error >= 0.0);
        assert!(
            (metrics.mean_squared_error * 2.0 - metrics.sum_squared_error).abs() < 1e-12
        );
        assert!(metrics.max_abs_error * metrics.max_abs_error <= metrics.sum_squared_error + 1e-12);
    }
}
