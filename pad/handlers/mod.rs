pub mod event;
pub mod grid;
pub mod model;
pub mod page;
