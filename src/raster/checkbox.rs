use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{PadError, PadResult};
use crate::grid::{InputGrid, GRID_CELLS, GRID_SIZE};

/// Extra cells marked around every cell a drag passes over.
///
/// Offsets are `(d_row, d_col)`. The default marks the cell to the right and
/// the cell above, which makes one-cell-wide drags thick enough to read.
/// Neighbors that fall outside the grid are skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Thickening {
    pub offsets: Vec<(isize, isize)>,
}

impl Thickening {
    pub fn none() -> Thickening {
        Thickening { offsets: Vec::new() }
    }
}

impl Default for Thickening {
    fn default() -> Self {
        Thickening { offsets: vec![(0, 1), (-1, 0)] }
    }
}

/// Checkbox-grid input: one boolean per cell plus the "mouse is down" flag.
#[derive(Debug, Clone)]
pub struct CheckboxRasterizer {
    cells: Vec<bool>,
    dragging: bool,
    thickening: Thickening,
}

impl CheckboxRasterizer {
    pub fn new(thickening: Thickening) -> CheckboxRasterizer {
        CheckboxRasterizer {
            cells: vec![false; GRID_CELLS],
            dragging: false,
            thickening,
        }
    }

    pub fn set_cell(&mut self, row: usize, col: usize, value: bool) -> PadResult<()> {
        check_bounds(row, col)?;
        self.cells[row * GRID_SIZE + col] = value;
        Ok(())
    }

    pub fn cell(&self, row: usize, col: usize) -> bool {
        self.cells[row * GRID_SIZE + col]
    }

    pub fn pointer_down(&mut self) {
        self.dragging = true;
    }

    pub fn pointer_up(&mut self) {
        self.dragging = false;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Pointer entered cell `(row, col)`.
    ///
    /// While dragging, marks the cell and its thickening neighbors and returns
    /// `true` so the caller re-runs inference. Outside a drag this is a no-op.
    pub fn drag_over(&mut self, row: usize, col: usize) -> PadResult<bool> {
        check_bounds(row, col)?;
        if !self.dragging {
            return Ok(false);
        }

        self.cells[row * GRID_SIZE + col] = true;
        for &(dr, dc) in &self.thickening.offsets {
            let r = row as isize + dr;
            let c = col as isize + dc;
            if (0..GRID_SIZE as isize).contains(&r) && (0..GRID_SIZE as isize).contains(&c) {
                self.cells[r as usize * GRID_SIZE + c as usize] = true;
            }
        }
        trace!(row, col, "checkbox drag");
        Ok(true)
    }

    /// Checked cells map to 1.0, unchecked to 0.0.
    pub fn to_grid(&self) -> InputGrid {
        let values = self.cells.iter().map(|&on| if on { 1.0 } else { 0.0 }).collect();
        // Length is GRID_CELLS by construction.
        InputGrid::from_flat(values).unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.cells.fill(false);
    }

    pub fn checked_count(&self) -> usize {
        self.cells.iter().filter(|&&on| on).count()
    }
}

impl Default for CheckboxRasterizer {
    fn default() -> Self {
        CheckboxRasterizer::new(Thickening::default())
    }
}

fn check_bounds(row: usize, col: usize) -> PadResult<()> {
    if row >= GRID_SIZE || col >= GRID_SIZE {
        return Err(PadError::CellOutOfRange { row, col, size: GRID_SIZE });
    }
    Ok(())
}
