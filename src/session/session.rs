use serde::Serialize;
use tracing::{debug, info};

use crate::config::{PadConfig, Variant};
use crate::error::PadResult;
use crate::grid::InputGrid;
use crate::inference::{Classifier, FeatureMap, Generation, ModelSlot};
use crate::network::{ModelStore, Network};
use crate::raster::{CanvasRasterizer, CheckboxRasterizer};
use crate::render::{render_prediction, RenderedRow};

/// A user gesture, already translated out of whatever UI produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PadEvent {
    PointerDown { x: f64, y: f64 },
    /// `radius` overrides the configured brush for this segment.
    PointerMove { x: f64, y: f64, radius: Option<f64> },
    PointerUp,
    PointerLeave,
    /// Pointer entered a checkbox cell.
    CellOver { row: usize, col: usize },
    Clear,
}

/// Everything the display needs after one prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub rows: Vec<RenderedRow>,
    pub features: Vec<FeatureMap>,
    pub model: String,
    pub generation: u64,
}

#[derive(Debug, Clone)]
enum Rasterizer {
    Checkbox(CheckboxRasterizer),
    Canvas(CanvasRasterizer),
}

/// One drawing pad: the input surface, the active model, and the counters
/// the UI reports. Owned by whoever dispatches events; nothing here is global.
pub struct DrawingSession {
    raster: Rasterizer,
    slot: ModelSlot,
    brush_radius: f64,
    predictions: usize,
}

impl DrawingSession {
    /// Creates a session and runs one warm-up prediction on the blank grid.
    pub fn new(
        variant: Variant,
        model_name: impl Into<String>,
        model: Box<dyn Classifier>,
        config: &PadConfig,
    ) -> PadResult<DrawingSession> {
        let raster = match variant {
            Variant::Checkbox => Rasterizer::Checkbox(CheckboxRasterizer::new(config.thickening.clone())),
            Variant::Canvas => Rasterizer::Canvas(CanvasRasterizer::new(config.canvas_scale, config.filter)),
        };
        let mut session = DrawingSession {
            raster,
            slot: ModelSlot::new(model_name, model),
            brush_radius: config.brush_radius,
            predictions: 0,
        };
        session.infer()?;
        Ok(session)
    }

    /// Loads the configured (or first available) model from `config.model_dir`.
    /// A missing or malformed model fails construction.
    pub fn from_config(config: &PadConfig) -> PadResult<DrawingSession> {
        let store = ModelStore::new(&config.model_dir);
        let name = store.resolve(config.model.as_deref())?;
        let network = store.load(&name)?;
        info!(model = %name, variant = %config.variant, "drawing session ready");
        DrawingSession::new(config.variant, name, Box::new(network), config)
    }

    pub fn variant(&self) -> Variant {
        match self.raster {
            Rasterizer::Checkbox(_) => Variant::Checkbox,
            Rasterizer::Canvas(_) => Variant::Canvas,
        }
    }

    /// Canvas surface size, if this is a canvas session.
    pub fn canvas_size(&self) -> Option<(u32, u32)> {
        match &self.raster {
            Rasterizer::Canvas(c) => Some((c.width(), c.height())),
            Rasterizer::Checkbox(_) => None,
        }
    }

    pub fn model_name(&self) -> &str {
        self.slot.name()
    }

    pub fn predictions_run(&self) -> usize {
        self.predictions
    }

    /// Snapshot of the current input grid.
    pub fn grid(&self) -> InputGrid {
        match &self.raster {
            Rasterizer::Checkbox(c) => c.to_grid(),
            Rasterizer::Canvas(c) => c.to_grid(),
        }
    }

    /// Applies one event. Returns a frame when the grid may have changed and
    /// a prediction ran; events that change nothing (or do not apply to this
    /// variant) return `None`.
    pub fn handle(&mut self, event: PadEvent) -> PadResult<Option<Frame>> {
        if event == PadEvent::Clear {
            match &mut self.raster {
                Rasterizer::Checkbox(c) => c.clear(),
                Rasterizer::Canvas(c) => c.clear(),
            }
            return self.infer().map(Some);
        }

        let variant = self.variant();
        let brush_radius = self.brush_radius;
        let changed = match (&mut self.raster, event) {
            (Rasterizer::Checkbox(c), PadEvent::PointerDown { .. }) => {
                c.pointer_down();
                false
            }
            (Rasterizer::Checkbox(c), PadEvent::PointerUp | PadEvent::PointerLeave) => {
                c.pointer_up();
                false
            }
            (Rasterizer::Checkbox(c), PadEvent::CellOver { row, col }) => c.drag_over(row, col)?,

            (Rasterizer::Canvas(c), PadEvent::PointerDown { x, y }) => {
                c.begin_stroke(x, y)?;
                false
            }
            (Rasterizer::Canvas(c), PadEvent::PointerMove { x, y, radius }) => {
                c.extend_stroke(x, y, radius.unwrap_or(brush_radius))? > 0
            }
            (Rasterizer::Canvas(c), PadEvent::PointerUp | PadEvent::PointerLeave) => {
                c.end_stroke();
                false
            }

            (_, ignored) => {
                debug!(?ignored, %variant, "event does not apply");
                false
            }
        };

        if changed {
            self.infer().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Re-runs the classifier on the current grid without changing it.
    pub fn refresh(&mut self) -> PadResult<Frame> {
        self.infer()
    }

    /// Starts a model switch; pass the token to `complete_switch` once the
    /// new model is loaded.
    pub fn begin_switch(&mut self) -> Generation {
        self.slot.begin_switch()
    }

    /// Installs a loaded model unless a newer switch began meanwhile.
    /// Returns a fresh frame when the model was installed.
    pub fn complete_switch(
        &mut self,
        generation: Generation,
        name: impl Into<String>,
        model: Box<dyn Classifier>,
    ) -> PadResult<Option<Frame>> {
        if self.slot.complete_switch(generation, name, model) {
            info!(model = %self.slot.name(), generation = generation.0, "model switched");
            self.infer().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Synchronous switch: load from `store` and install.
    ///
    /// A bad name or a missing file fails before a new generation starts, so
    /// it never cancels a switch already in flight.
    pub fn switch_model(&mut self, store: &ModelStore, name: &str) -> PadResult<Option<Frame>> {
        let path = store.locate(name)?;
        let generation = self.begin_switch();
        let network = Network::load_json(&path)?;
        self.complete_switch(generation, name, Box::new(network))
    }

    fn infer(&mut self) -> PadResult<Frame> {
        let grid = self.grid();
        let model = self.slot.model();
        let prediction = model.predict(&grid)?;
        let features = model.feature_maps(&grid)?;
        let rows = render_prediction(&prediction, model.labels());
        self.predictions += 1;
        debug!(
            best = prediction.best().class,
            ink = grid.ink(),
            run = self.predictions,
            "prediction"
        );
        Ok(Frame {
            rows,
            features,
            model: self.slot.name().to_owned(),
            generation: self.slot.generation().0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::Prediction;

    /// Predicts class 1 once any ink is present, uniform otherwise.
    struct InkDetector;

    impl Classifier for InkDetector {
        fn predict(&self, grid: &InputGrid) -> PadResult<Prediction> {
            let mut probs = vec![0.1; 10];
            if !grid.is_blank() {
                probs = vec![0.0; 10];
                probs[1] = 1.0;
            }
            Prediction::from_probabilities(probs)
        }
    }

    fn session(variant: Variant) -> DrawingSession {
        DrawingSession::new(variant, "ink", Box::new(InkDetector), &PadConfig::default()).unwrap()
    }

    #[test]
    fn test_warm_up_prediction() {
        let s = session(Variant::Canvas);
        assert_eq!(s.predictions_run(), 1);
        assert!(s.grid().is_blank());
    }

    #[test]
    fn test_canvas_stroke_predicts() {
        let mut s = session(Variant::Canvas);
        assert!(s.handle(PadEvent::PointerDown { x: 100.0, y: 100.0 }).unwrap().is_none());
        let frame = s
            .handle(PadEvent::PointerMove { x: 140.0, y: 100.0, radius: None })
            .unwrap()
            .unwrap();
        assert!(frame.rows[1].is_max);
        assert!(s.handle(PadEvent::PointerLeave).unwrap().is_none());
        // Stroke ended: further moves draw nothing.
        assert!(s.handle(PadEvent::PointerMove { x: 10.0, y: 10.0, radius: Some(2.0) }).unwrap().is_none());
    }

    #[test]
    fn test_checkbox_drag_predicts() {
        let mut s = session(Variant::Checkbox);
        assert!(s.handle(PadEvent::CellOver { row: 3, col: 3 }).unwrap().is_none());
        s.handle(PadEvent::PointerDown { x: 0.0, y: 0.0 }).unwrap();
        let frame = s.handle(PadEvent::CellOver { row: 3, col: 3 }).unwrap().unwrap();
        assert!(frame.rows[1].is_max);
        assert_eq!(s.grid().ink(), 3.0);
        s.handle(PadEvent::PointerUp).unwrap();
        assert!(s.handle(PadEvent::CellOver { row: 9, col: 9 }).unwrap().is_none());
    }

    #[test]
    fn test_mismatched_events_are_ignored() {
        let mut s = session(Variant::Checkbox);
        assert!(s.handle(PadEvent::PointerMove { x: 1.0, y: 1.0, radius: None }).unwrap().is_none());
        let mut s = session(Variant::Canvas);
        assert!(s.handle(PadEvent::CellOver { row: 1, col: 1 }).unwrap().is_none());
        assert_eq!(s.predictions_run(), 1);
    }

    #[test]
    fn test_clear_twice_renders_default() {
        let mut s = session(Variant::Checkbox);
        let first = s.handle(PadEvent::Clear).unwrap().unwrap();
        let second = s.handle(PadEvent::Clear).unwrap().unwrap();
        assert_eq!(first, second);
        assert!(first.rows[0].is_max);
        assert_eq!(s.predictions_run(), 3);
    }

    #[test]
    fn test_bad_brush_is_an_error() {
        let mut s = session(Variant::Canvas);
        s.handle(PadEvent::PointerDown { x: 0.0, y: 0.0 }).unwrap();
        assert!(s.handle(PadEvent::PointerMove { x: 5.0, y: 5.0, radius: Some(-1.0) }).is_err());
    }

    #[test]
    fn test_stale_switch_keeps_current_model() {
        let mut s = session(Variant::Canvas);
        let stale = s.begin_switch();
        let fresh = s.begin_switch();
        let frame = s.complete_switch(fresh, "fresh", Box::new(InkDetector)).unwrap().unwrap();
        assert_eq!(frame.model, "fresh");
        assert_eq!(frame.generation, fresh.0);
        assert!(s.complete_switch(stale, "stale", Box::new(InkDetector)).unwrap().is_none());
        assert_eq!(s.model_name(), "fresh");
    }
}
