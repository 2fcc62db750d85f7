use tracing::{debug, warn};

use super::Classifier;

/// Token identifying one model switch. Later switches carry larger values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(pub u64);

/// Holds the active classifier and guards it against stale model loads.
///
/// A switch is split in two: `begin_switch` hands out a fresh generation
/// before the (possibly slow) load starts, and `complete_switch` installs
/// the loaded model only if no newer switch has begun since.
pub struct ModelSlot {
    name: String,
    model: Box<dyn Classifier>,
    installed: Generation,
    latest: Generation,
}

impl ModelSlot {
    pub fn new(name: impl Into<String>, model: Box<dyn Classifier>) -> ModelSlot {
        ModelSlot {
            name: name.into(),
            model,
            installed: Generation(0),
            latest: Generation(0),
        }
    }

    pub fn model(&self) -> &dyn Classifier {
        self.model.as_ref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Generation of the installed model.
    pub fn generation(&self) -> Generation {
        self.installed
    }

    pub fn begin_switch(&mut self) -> Generation {
        self.latest = Generation(self.latest.0 + 1);
        debug!(generation = self.latest.0, "model switch started");
        self.latest
    }

    /// Installs `model` if `generation` is still the newest switch.
    /// Returns `false` (and drops the model) when a later switch superseded it.
    pub fn complete_switch(
        &mut self,
        generation: Generation,
        name: impl Into<String>,
        model: Box<dyn Classifier>,
    ) -> bool {
        let name = name.into();
        if generation != self.latest {
            warn!(
                model = %name,
                generation = generation.0,
                latest = self.latest.0,
                "discarding stale model load"
            );
            return false;
        }
        self.name = name;
        self.model = model;
        self.installed = generation;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PadResult;
    use crate::grid::InputGrid;
    use crate::inference::Prediction;

    struct Fixed(usize);

    impl Classifier for Fixed {
        fn predict(&self, _grid: &InputGrid) -> PadResult<Prediction> {
            let mut probs = vec![0.0; 10];
            probs[self.0] = 1.0;
            Prediction::from_probabilities(probs)
        }
    }

    fn best(slot: &ModelSlot) -> usize {
        slot.model().predict(&InputGrid::zeros()).unwrap().best().class
    }

    #[test]
    fn test_switch_installs_latest() {
        let mut slot = ModelSlot::new("a", Box::new(Fixed(1)));
        let g = slot.begin_switch();
        assert!(slot.complete_switch(g, "b", Box::new(Fixed(2))));
        assert_eq!(slot.name(), "b");
        assert_eq!(slot.generation(), g);
        assert_eq!(best(&slot), 2);
    }

    #[test]
    fn test_stale_load_is_discarded() {
        let mut slot = ModelSlot::new("a", Box::new(Fixed(1)));
        let slow = slot.begin_switch();
        let fast = slot.begin_switch();
        assert!(slow < fast);

        assert!(slot.complete_switch(fast, "fast", Box::new(Fixed(3))));
        assert!(!slot.complete_switch(slow, "slow", Box::new(Fixed(4))));
        assert_eq!(slot.name(), "fast");
        assert_eq!(best(&slot), 3);
    }

    #[test]
    fn test_superseded_before_completion() {
        let mut slot = ModelSlot::new("a", Box::new(Fixed(1)));
        let first = slot.begin_switch();
        let _second = slot.begin_switch();
        // The older load finishes first but a newer one is still pending.
        assert!(!slot.complete_switch(first, "first", Box::new(Fixed(5))));
        assert_eq!(slot.name(), "a");
        assert_eq!(slot.generation(), Generation(0));
    }
}
