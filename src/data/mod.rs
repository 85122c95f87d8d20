//! Labeled training data.
//!
//! A [`Dataset`] is an ordered list of `(input, expected)` pairs. Unshuffled
//! training visits the pairs in insertion order.

use crate::error::{BnnError, BnnResult};
use ndarray::{Array1, Array2};

pub type Sample = (Array1<f64>, Array1<f64>);

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    samples: Vec<Sample>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    /// Pair row `i` of `inputs` with row `i` of `targets`.
    ///
    /// # Errors
    /// - `ShapeMismatch` if the two matrices have different row counts
    pub fn from_arrays(inputs: &Array2<f64>, targets: &Array2<f64>) -> BnnResult<Self> {
        if inputs.nrows() != targets.nrows() {
            return Err(BnnError::ShapeMismatch {
                context: "dataset rows",
                expected: inputs.nrows(),
                actual: targets.nrows(),
            });
        }
        let samples = inputs
            .rows()
            .into_iter()
            .zip(targets.rows())
            .map(|(x, y)| (x.to_owned(), y.to_owned()))
            .collect();
        Ok(Self { samples })
    }

    pub fn push(&mut self, input: Array1<f64>, expected: Array1<f64>) {
        self.samples.push((input, expected));
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Sample> {
        self.samples.get(index)
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    /// Check every sample against a network's input and output widths.
    ///
    /// # Errors
    /// - `ShapeMismatch` naming the first offending vector
    pub fn validate(&self, input_dim: usize, output_dim: usize) -> BnnResult<()> {
        for (input, expected) in &self.samples {
            if input.len() != input_dim {
                return Err(BnnError::ShapeMismatch {
                    context: "dataset input",
                    expected: input_dim,
                    actual: input.len(),
                });
            }
            if expected.len() != output_dim {
                return Err(BnnError::ShapeMismatch {
                    context: "dataset expected output",
                    expected: output_dim,
                    actual: expected.len(),
                });
            }
        }
        Ok(())
    }
}

impl FromIterator<Sample> for Dataset {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    #[test]
    fn test_from_arrays() {
        let inputs = arr2(&[[0.0, 0.0], [0.0, 1.0], [1.0, 0.0]]);
        let targets = arr2(&[[0.0], [1.0], [1.0]]);
        let data = Dataset::from_arrays(&inputs, &targets).unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data.get(1).unwrap().0, arr1(&[0.0, 1.0]));
        assert_eq!(data.get(2).unwrap().1, arr1(&[1.0]));
    }

    #[test]
    fn test_from_arrays_row_mismatch() {
        let inputs = arr2(&[[0.0], [1.0]]);
        let targets = arr2(&[[0.0]]);
        assert!(Dataset::from_arrays(&inputs, &targets).is_err());
    }

    #[test]
    fn test_validate() {
        let mut data = Dataset::new();
        assert!(data.is_empty());
        data.push(arr1(&[1.0, 2.0]), arr1(&[0.5]));
        assert!(data.validate(2, 1).is_ok());
        assert!(matches!(
            data.validate(3, 1),
            Err(BnnError::ShapeMismatch {
                context: "dataset input",
                ..
            })
        ));
        assert!(matches!(
            data.validate(2, 2),
            Err(BnnError::ShapeMismatch {
                context: "dataset expected output",
                ..
            })
        ));
    }

    #[test]
    fn test_insertion_order() {
        let data: Dataset = (0..4)
            .map(|i| (arr1(&[i as f64]), arr1(&[0.0])))
            .collect();
        let firsts: Vec<f64> = data.iter().map(|(x, _)| x[0]).collect();
        assert_eq!(firsts, vec![0.0, 1.0, 2.0, 3.0]);
    }
}
