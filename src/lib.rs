pub mod error;
pub mod config;
pub mod grid;
pub mod raster;
pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod inference;
pub mod render;
pub mod session;

// Convenience re-exports
pub use error::{PadError, PadResult};
pub use config::{PadConfig, Variant};
pub use grid::{InputGrid, GRID_SIZE};
pub use raster::{CanvasRasterizer, CheckboxRasterizer, DownsampleFilter, Thickening};
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use layers::{Conv2d, Layer};
pub use network::{ModelMetadata, ModelStore, Network};
pub use inference::{ClassProbability, Classifier, FeatureMap, Generation, ModelSlot, Prediction};
pub use render::{render_prediction, RenderedRow};
pub use session::{DrawingSession, Frame, PadEvent};
