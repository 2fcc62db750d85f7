use serde::{Serialize, Deserialize};

/// Dense row-major matrix, serialized the same way saved models store weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix{
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows]
        }
    }

    pub fn from_data(data: Vec<Vec<f64>>) -> Matrix {
        Matrix {
            rows: data.len(),
            cols: data.first().map_or(0, |r| r.len()),
            data
        }
    }

    /// True when `data` really is `rows × cols`. Hand-edited or truncated
    /// model files can claim one shape and store another.
    pub fn is_consistent(&self) -> bool {
        self.data.len() == self.rows && self.data.iter().all(|r| r.len() == self.cols)
    }

    /// Row-vector product `x · M`; `x` must have `rows` entries.
    pub fn vec_mul(&self, x: &[f64]) -> Vec<f64> {
        assert_eq!(x.len(), self.rows, "vector length does not match matrix rows");
        let mut out = vec![0.0; self.cols];
        for (xi, row) in x.iter().zip(&self.data) {
            if *xi == 0.0 {
                continue;
            }
            for (o, w) in out.iter_mut().zip(row) {
                *o += xi * w;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_mul() {
        // [1, 2] · [[1, 0, 2], [0, 1, 1]] = [1, 2, 4]
        let m = Matrix::from_data(vec![vec![1.0, 0.0, 2.0], vec![0.0, 1.0, 1.0]]);
        assert_eq!(m.vec_mul(&[1.0, 2.0]), vec![1.0, 2.0, 4.0]);
    }

    #[test]
    fn test_consistency() {
        let mut m = Matrix::zeros(2, 3);
        assert!(m.is_consistent());
        m.data[1].pop();
        assert!(!m.is_consistent());
        assert_eq!(Matrix::from_data(vec![]).cols, 0);
    }
}
