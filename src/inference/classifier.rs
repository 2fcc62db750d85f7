use serde::Serialize;

use crate::error::{PadError, PadResult};
use crate::grid::InputGrid;

/// Digits 0–9.
pub const NUM_CLASSES: usize = 10;

/// Probability assigned to one digit class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassProbability {
    pub class: usize,
    pub probability: f64,
}

/// The ten class probabilities for one grid, in class order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    classes: Vec<ClassProbability>,
}

impl Prediction {
    pub fn from_probabilities(probabilities: Vec<f64>) -> PadResult<Prediction> {
        if probabilities.len() != NUM_CLASSES {
            return Err(PadError::ModelShape(format!(
                "classifier returned {} probabilities, expected {}",
                probabilities.len(),
                NUM_CLASSES
            )));
        }
        let classes = probabilities
            .into_iter()
            .enumerate()
            .map(|(class, probability)| ClassProbability { class, probability })
            .collect();
        Ok(Prediction { classes })
    }

    pub fn classes(&self) -> &[ClassProbability] {
        &self.classes
    }

    /// First class holding the maximum probability.
    pub fn best(&self) -> ClassProbability {
        let mut best = self.classes[0];
        for c in &self.classes[1..] {
            if c.probability > best.probability {
                best = *c;
            }
        }
        best
    }
}

/// An intermediate activation map, row-major, for visualization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureMap {
    pub width: usize,
    pub height: usize,
    pub values: Vec<f64>,
}

/// A pretrained digit classifier.
///
/// Implementors are opaque: the session only hands them a grid snapshot and
/// renders whatever comes back.
pub trait Classifier: Send {
    fn predict(&self, grid: &InputGrid) -> PadResult<Prediction>;

    /// Intermediate maps for the visualization view. Models without a
    /// convolutional front return none.
    fn feature_maps(&self, _grid: &InputGrid) -> PadResult<Vec<FeatureMap>> {
        Ok(Vec::new())
    }

    /// Display labels for the ten outputs, when the model carries them.
    fn labels(&self) -> Option<&[String]> {
        None
    }
}
