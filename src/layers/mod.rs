pub mod conv;
pub mod dense;

pub use conv::Conv2d;
pub use dense::Layer;
