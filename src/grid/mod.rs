pub mod input_grid;

pub use input_grid::{InputGrid, GRID_CELLS, GRID_SIZE};
