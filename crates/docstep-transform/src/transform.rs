use std::sync::Arc;

use docstep_model::{Node, Pos};

use crate::error::StepError;
use crate::map::{Bias, MapResult, PosMap, map_through};
use crate::step::{Step, StepRegistry};

/// A document being edited through a sequence of steps.
///
/// Holds the current document, every applied step, the map each step
/// produced, and the document each step was applied to. Rejected steps leave
/// all of it untouched.
#[derive(Debug, Clone)]
pub struct Transform {
    registry: Arc<StepRegistry>,
    doc: Arc<Node>,
    docs: Vec<Arc<Node>>,
    steps: Vec<Step>,
    maps: Vec<PosMap>,
}

impl Transform {
    pub fn new(doc: Arc<Node>) -> Self {
        Self::with_registry(doc, StepRegistry::shared())
    }

    pub fn with_registry(doc: Arc<Node>, registry: Arc<StepRegistry>) -> Self {
        Self {
            registry,
            doc,
            docs: Vec::new(),
            steps: Vec::new(),
            maps: Vec::new(),
        }
    }

    pub fn registry(&self) -> &Arc<StepRegistry> {
        &self.registry
    }

    /// The current document.
    pub fn doc(&self) -> &Arc<Node> {
        &self.doc
    }

    /// The document before the first step.
    pub fn before(&self) -> &Arc<Node> {
        self.docs.first().unwrap_or(&self.doc)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn maps(&self) -> &[PosMap] {
        &self.maps
    }

    /// The document each step was applied to, in step order.
    pub fn docs(&self) -> &[Arc<Node>] {
        &self.docs
    }

    pub fn is_changed(&self) -> bool {
        !self.steps.is_empty()
    }

    /// Apply a step and record it. On error nothing changes.
    pub fn try_step(&mut self, step: Step) -> Result<&PosMap, StepError> {
        let result = self.registry.apply(&self.doc, &step)?;
        log::trace!("applied {step}");
        let previous = std::mem::replace(&mut self.doc, result.doc);
        self.docs.push(previous);
        self.steps.push(step);
        self.maps.push(result.map);
        Ok(&self.maps[self.maps.len() - 1])
    }

    /// Apply a step if it fits the current document, otherwise leave the
    /// transform as it is.
    pub fn step(&mut self, step: Step) -> &mut Self {
        let label = step.to_string();
        if let Err(err) = self.try_step(step) {
            log::debug!("rejected {label}: {err}");
        }
        self
    }

    /// Run a multi-step edit on a copy of this transform. The copy replaces
    /// `self` only when `edit` succeeds, so a failure part way through leaves
    /// no steps behind.
    pub(crate) fn atomic(
        &mut self,
        edit: impl FnOnce(&mut Transform) -> Result<(), StepError>,
    ) -> Result<(), StepError> {
        let mut staged = self.clone();
        edit(&mut staged)?;
        *self = staged;
        Ok(())
    }

    /// Map a position in [`Transform::before`] to the current document.
    pub fn map(&self, pos: &Pos, bias: Bias) -> MapResult {
        map_through(&self.maps, pos, bias)
    }

    /// The inverse of every applied step, newest first. Applying them in
    /// order to the current document gives back [`Transform::before`].
    pub fn inverted_steps(&self) -> Result<Vec<Step>, StepError> {
        self.steps
            .iter()
            .zip(&self.docs)
            .zip(&self.maps)
            .rev()
            .map(|((step, doc), map)| step.invert(&self.registry, doc, map))
            .collect()
    }
}
