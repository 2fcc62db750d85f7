use std::path::Path;

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::activation::activation::{softmax, ActivationFunction};
use crate::error::{PadError, PadResult};
use crate::grid::{InputGrid, GRID_CELLS};
use crate::inference::{Classifier, FeatureMap, Prediction, NUM_CLASSES};
use crate::layers::{Conv2d, Layer};
use crate::network::metadata::ModelMetadata;

/// A pretrained digit classifier: optional convolution front, then dense layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    #[serde(default)]
    pub conv: Option<Conv2d>,
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub metadata: Option<ModelMetadata>,
}

impl Network {
    /// Builds a network and checks that it maps a 28×28 grid to 10 classes.
    pub fn new(conv: Option<Conv2d>, layers: Vec<Layer>) -> PadResult<Network> {
        let network = Network { conv, layers, metadata: None };
        network.validate()?;
        Ok(network)
    }

    /// Checks layer shapes chain from the grid (or conv output) to 10 outputs.
    pub fn validate(&self) -> PadResult<()> {
        let mut width = match &self.conv {
            Some(conv) => {
                if let Some(err) = conv.shape_error() {
                    return Err(PadError::ModelShape(err));
                }
                conv.output_len()
            }
            None => GRID_CELLS,
        };

        if self.layers.is_empty() {
            return Err(PadError::ModelShape("model has no dense layers".into()));
        }
        for (i, layer) in self.layers.iter().enumerate() {
            if let Some(err) = layer.shape_error() {
                return Err(PadError::ModelShape(format!("layer {}: {}", i, err)));
            }
            if layer.input_size() != width {
                return Err(PadError::ModelShape(format!(
                    "layer {} expects {} inputs, previous stage produces {}",
                    i,
                    layer.input_size(),
                    width
                )));
            }
            width = layer.size;
        }
        if width != NUM_CLASSES {
            return Err(PadError::ModelShape(format!(
                "output has {} units, expected {}",
                width, NUM_CLASSES
            )));
        }
        if let Some(labels) = self.metadata.as_ref().and_then(|m| m.output_labels.as_ref()) {
            if labels.len() != NUM_CLASSES {
                return Err(PadError::ModelShape(format!(
                    "{} output labels for {} classes",
                    labels.len(),
                    NUM_CLASSES
                )));
            }
        }
        Ok(())
    }

    /// Forward pass from a grid to the raw output-layer values.
    pub fn forward(&self, grid: &InputGrid) -> Vec<f64> {
        let mut current = match &self.conv {
            Some(conv) => conv
                .forward(grid)
                .into_iter()
                .flat_map(|map| map.values)
                .collect(),
            None => grid.as_slice().to_vec(),
        };
        for layer in &self.layers {
            current = layer.feed_from(&current);
        }
        current
    }

    /// Serializes the network to a pretty-printed JSON file.
    pub fn save_json(&self, path: &Path) -> PadResult<()> {
        let file = std::fs::File::create(path)
            .map_err(|source| PadError::ModelIo { path: path.to_path_buf(), source })?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|source| PadError::ModelParse { path: path.to_path_buf(), source })
    }

    /// Loads and validates a network previously written by `save_json`.
    pub fn load_json(path: &Path) -> PadResult<Network> {
        let file = std::fs::File::open(path)
            .map_err(|source| PadError::ModelIo { path: path.to_path_buf(), source })?;
        let reader = std::io::BufReader::new(file);
        let network: Network = serde_json::from_reader(reader)
            .map_err(|source| PadError::ModelParse { path: path.to_path_buf(), source })?;
        network.validate()?;
        debug!(
            path = %path.display(),
            conv = network.conv.is_some(),
            layers = network.layers.len(),
            "model loaded"
        );
        Ok(network)
    }
}

impl Classifier for Network {
    fn predict(&self, grid: &InputGrid) -> PadResult<Prediction> {
        let mut output = self.forward(grid);
        let already_softmax = self
            .layers
            .last()
            .map_or(false, |l| l.activator == ActivationFunction::Softmax);
        if !already_softmax {
            softmax(&mut output);
        }
        Prediction::from_probabilities(output)
    }

    fn feature_maps(&self, grid: &InputGrid) -> PadResult<Vec<FeatureMap>> {
        Ok(self.conv.as_ref().map(|conv| conv.forward(grid)).unwrap_or_default())
    }

    fn labels(&self) -> Option<&[String]> {
        self.metadata.as_ref().and_then(|m| m.output_labels.as_deref())
    }
}
