use serde::{Deserialize, Serialize};

/// Side length of the classifier input. Every variant draws into a 28×28 grid.
pub const GRID_SIZE: usize = 28;

/// Number of cells in the grid (784).
pub const GRID_CELLS: usize = GRID_SIZE * GRID_SIZE;

/// The 28×28 intensity matrix fed to the classifier.
///
/// Values are stored row-major and always lie in [0, 1]; `set` clamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputGrid {
    cells: Vec<f64>,
}

impl InputGrid {
    pub fn zeros() -> InputGrid {
        InputGrid { cells: vec![0.0; GRID_CELLS] }
    }

    /// Builds a grid from 784 row-major values, clamping each into [0, 1].
    /// Returns `None` if the length is wrong.
    pub fn from_flat(values: Vec<f64>) -> Option<InputGrid> {
        if values.len() != GRID_CELLS {
            return None;
        }
        let cells = values.into_iter().map(clamp_unit).collect();
        Some(InputGrid { cells })
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.cells[row * GRID_SIZE + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.cells[row * GRID_SIZE + col] = clamp_unit(value);
    }

    pub fn clear(&mut self) {
        self.cells.fill(0.0);
    }

    /// Row-major flat view, 784 values.
    pub fn as_slice(&self) -> &[f64] {
        &self.cells
    }

    /// Nested rows, the shape the browser and `GET /grid` consume.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.cells.chunks(GRID_SIZE).map(|row| row.to_vec()).collect()
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|&v| v == 0.0)
    }

    /// Sum of all intensities; a cheap "how much ink" measure for logging.
    pub fn ink(&self) -> f64 {
        self.cells.iter().sum()
    }
}

impl Default for InputGrid {
    fn default() -> Self {
        InputGrid::zeros()
    }
}

// NaN becomes 0 so it can never leak into the classifier.
fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros_shape() {
        let grid = InputGrid::zeros();
        let rows = grid.to_rows();
        assert_eq!(rows.len(), GRID_SIZE);
        assert!(rows.iter().all(|r| r.len() == GRID_SIZE));
        assert!(grid.is_blank());
    }

    #[test]
    fn test_set_clamps() {
        let mut grid = InputGrid::zeros();
        grid.set(0, 0, 3.0);
        grid.set(0, 1, -2.0);
        grid.set(0, 2, f64::NAN);
        assert_eq!(grid.get(0, 0), 1.0);
        assert_eq!(grid.get(0, 1), 0.0);
        assert_eq!(grid.get(0, 2), 0.0);
    }

    #[test]
    fn test_row_major_layout() {
        let mut grid = InputGrid::zeros();
        grid.set(1, 2, 0.5);
        assert_eq!(grid.as_slice()[GRID_SIZE + 2], 0.5);
        assert_eq!(grid.to_rows()[1][2], 0.5);
    }

    #[test]
    fn test_from_flat_rejects_wrong_length() {
        assert!(InputGrid::from_flat(vec![0.0; 10]).is_none());
        let grid = InputGrid::from_flat(vec![2.0; GRID_CELLS]).unwrap();
        assert_eq!(grid.ink(), GRID_CELLS as f64);
    }

    #[test]
    fn test_clear() {
        let mut grid = InputGrid::from_flat(vec![0.7; GRID_CELLS]).unwrap();
        grid.clear();
        assert!(grid.is_blank());
    }
}
