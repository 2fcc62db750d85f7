pub mod canvas;
pub mod checkbox;

pub use canvas::{CanvasRasterizer, DownsampleFilter};
pub use checkbox::{CheckboxRasterizer, Thickening};
