pub mod classifier;
pub mod slot;

pub use classifier::{ClassProbability, Classifier, FeatureMap, Prediction, NUM_CLASSES};
pub use slot::{Generation, ModelSlot};
