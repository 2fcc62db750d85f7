use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::grid::{InputGrid, GRID_SIZE};
use crate::inference::FeatureMap;
use crate::math::matrix::Matrix;

/// Single-channel 2-D convolution over the input grid, stride 1, no padding.
///
/// Each filter is a square `k × k` kernel; with the usual 3×3 kernels the
/// outputs are 26×26 feature maps. The flattened maps (filter-major) feed
/// the first dense layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conv2d {
    pub filters: Vec<Matrix>,
    pub biases: Vec<f64>,
    pub activator: ActivationFunction,
}

impl Conv2d {
    pub fn kernel_size(&self) -> usize {
        self.filters.first().map_or(0, |f| f.rows)
    }

    /// Side of each output map: `28 - k + 1`.
    pub fn output_side(&self) -> usize {
        GRID_SIZE + 1 - self.kernel_size().clamp(1, GRID_SIZE)
    }

    /// Number of values handed to the first dense layer.
    pub fn output_len(&self) -> usize {
        let side = self.output_side();
        self.filters.len() * side * side
    }

    pub fn forward(&self, grid: &InputGrid) -> Vec<FeatureMap> {
        let k = self.kernel_size();
        let side = self.output_side();
        let input = grid.as_slice();

        self.filters
            .iter()
            .zip(&self.biases)
            .map(|(kernel, &bias)| {
                let mut values = Vec::with_capacity(side * side);
                for r in 0..side {
                    for c in 0..side {
                        let mut acc = bias;
                        for (kr, krow) in kernel.data.iter().enumerate().take(k) {
                            let base = (r + kr) * GRID_SIZE + c;
                            for (kc, w) in krow.iter().enumerate().take(k) {
                                acc += input[base + kc] * w;
                            }
                        }
                        values.push(acc);
                    }
                }
                // Softmax over a feature map is meaningless; everything else is element-wise.
                if self.activator != ActivationFunction::Softmax {
                    self.activator.apply(&mut values);
                }
                FeatureMap { width: side, height: side, values }
            })
            .collect()
    }

    pub fn shape_error(&self) -> Option<String> {
        if self.filters.is_empty() {
            return Some("convolution has no filters".into());
        }
        if self.filters.len() != self.biases.len() {
            return Some(format!(
                "{} filters but {} biases",
                self.filters.len(),
                self.biases.len()
            ));
        }
        let k = self.kernel_size();
        if k == 0 || k > GRID_SIZE {
            return Some(format!("kernel size {} does not fit a {}x{} grid", k, GRID_SIZE, GRID_SIZE));
        }
        if self.filters.iter().any(|f| f.rows != k || f.cols != k || !f.is_consistent()) {
            return Some(format!("every kernel must be {}x{}", k, k));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_conv() -> Conv2d {
        let mut kernel = Matrix::zeros(3, 3);
        kernel.data[1][1] = 1.0;
        Conv2d { filters: vec![kernel], biases: vec![0.0], activator: ActivationFunction::ReLU }
    }

    #[test]
    fn test_output_shape() {
        let conv = identity_conv();
        assert_eq!(conv.output_side(), 26);
        assert_eq!(conv.output_len(), 676);
        let maps = conv.forward(&InputGrid::zeros());
        assert_eq!(maps.len(), 1);
        assert_eq!((maps[0].width, maps[0].height), (26, 26));
        assert_eq!(maps[0].values.len(), 676);
    }

    #[test]
    fn test_center_kernel_shifts_input() {
        let conv = identity_conv();
        let mut grid = InputGrid::zeros();
        grid.set(5, 7, 1.0);
        let maps = conv.forward(&grid);
        // Output (r, c) sees input (r+1, c+1) under the centered kernel.
        assert_eq!(maps[0].values[4 * 26 + 6], 1.0);
        assert_eq!(maps[0].values.iter().sum::<f64>(), 1.0);
    }

    #[test]
    fn test_shape_errors() {
        let mut conv = identity_conv();
        conv.biases.push(1.0);
        assert!(conv.shape_error().is_some());

        let conv = Conv2d { filters: vec![], biases: vec![], activator: ActivationFunction::ReLU };
        assert!(conv.shape_error().is_some());
        assert!(identity_conv().shape_error().is_none());
    }
}
