use serde::{Serialize, Deserialize};
use crate::{math::matrix::Matrix, activation::activation::ActivationFunction};

/// Fully connected layer: `a = f(x · W + b)`.
///
/// `weights` is `input_size × size`, `biases` is `1 × size`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer{
    pub size: usize,
    pub weights: Matrix,
    pub biases: Matrix,
    pub activator: ActivationFunction
}

impl Layer {
    pub fn new(weights: Matrix, biases: Vec<f64>, activation: ActivationFunction) -> Layer {
        Layer {
            size: weights.cols,
            weights,
            biases: Matrix::from_data(vec![biases]),
            activator: activation
        }
    }

    pub fn input_size(&self) -> usize {
        self.weights.rows
    }

    pub fn feed_from(&self, input: &[f64]) -> Vec<f64> {
        let mut z = self.weights.vec_mul(input);
        if let Some(bias) = self.biases.data.first() {
            for (v, b) in z.iter_mut().zip(bias) {
                *v += b;
            }
        }
        self.activator.apply(&mut z);
        z
    }

    /// Shape problems in this layer, if any.
    pub fn shape_error(&self) -> Option<String> {
        if !self.weights.is_consistent() {
            return Some(format!(
                "weights claim {}x{} but store a different shape",
                self.weights.rows, self.weights.cols
            ));
        }
        if self.size != self.weights.cols {
            return Some(format!("size {} but weights have {} columns", self.size, self.weights.cols));
        }
        if self.biases.rows != 1 || self.biases.cols != self.size || !self.biases.is_consistent() {
            return Some(format!("biases must be 1x{}", self.size));
        }
        None
    }
}
