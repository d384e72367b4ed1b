//! `addMark` and `removeMark` steps, and the transform helpers that issue
//! them only over runs that actually change.

use std::collections::BTreeSet;
use std::ops::Range;
use std::sync::Arc;

use docstep_model::{Mark, Node, Pos, blocks_between, copy_to, is_flat_range};

use crate::error::StepError;
use crate::map::PosMap;
use crate::step::{Step, StepKind, StepParam, StepResult, TransformResult};
use crate::transform::Transform;

pub const ADD_MARK: &str = "addMark";
pub const REMOVE_MARK: &str = "removeMark";

pub struct AddMarkStep;

pub struct RemoveMarkStep;

impl StepKind for AddMarkStep {
    fn apply(&self, doc: &Arc<Node>, step: &Step) -> StepResult {
        change_marks(doc, step, true)
    }

    fn invert(&self, step: &Step, _old_doc: &Node, _map: &PosMap) -> Step {
        Step {
            kind: REMOVE_MARK.to_string(),
            ..step.clone()
        }
    }
}

impl StepKind for RemoveMarkStep {
    fn apply(&self, doc: &Arc<Node>, step: &Step) -> StepResult {
        change_marks(doc, step, false)
    }

    fn invert(&self, step: &Step, _old_doc: &Node, _map: &PosMap) -> Step {
        Step {
            kind: ADD_MARK.to_string(),
            ..step.clone()
        }
    }
}

fn change_marks(doc: &Arc<Node>, step: &Step, add: bool) -> StepResult {
    let StepParam::Mark { mark } = &step.param else {
        return Err(step.invalid_param());
    };
    let (from, to) = (&step.from, &step.to);
    if !is_flat_range(from, to) {
        return Err(StepError::NotFlat {
            from: from.to_string(),
            to: to.to_string(),
        });
    }
    let block = doc
        .try_path(&from.path)
        .ok_or_else(|| StepError::OutOfRange(from.to_string()))?;
    if !block.node_type().is_textblock() {
        return Err(StepError::NotTextblock(block.name().to_string()));
    }
    if to.offset > block.max_offset() {
        return Err(StepError::OutOfRange(to.to_string()));
    }
    if add && block.node_type().plain_text {
        return Err(StepError::PlainTextViolation(block.name().to_string()));
    }

    let changes = |node: &Node| node.marks().contains(mark) != add;
    if !block.content()[from.offset..to.offset]
        .iter()
        .any(|child| changes(child))
    {
        return Err(StepError::NoOp(step.to_string()));
    }

    let mut copy = doc.clone();
    let children = copy_to(&mut copy, &from.path).content_mut();
    for child in &mut children[from.offset..to.offset] {
        if !changes(child) {
            continue;
        }
        let child = Arc::make_mut(child);
        if add {
            child.add_mark(mark.clone());
        } else {
            child.remove_mark(mark);
        }
    }
    Ok(TransformResult::new(copy, PosMap::identity()))
}

/// Child ranges of the textblock at `path` that fall between `from` and `to`.
fn block_span(path: &[usize], block: &Node, from: &Pos, to: &Pos) -> Range<usize> {
    let start = if from.path == path { from.offset } else { 0 };
    let end = if to.path == path {
        to.offset
    } else {
        block.max_offset()
    };
    start..end.max(start)
}

/// Maximal runs inside `span` whose children all satisfy `pred`.
fn runs(block: &Node, span: Range<usize>, pred: impl Fn(&Node) -> bool) -> Vec<Range<usize>> {
    let mut out = Vec::new();
    let mut open: Option<usize> = None;
    for index in span.clone() {
        match (pred(block.child(index)), open) {
            (true, None) => open = Some(index),
            (false, Some(start)) => {
                out.push(start..index);
                open = None;
            }
            _ => {}
        }
    }
    if let Some(start) = open {
        out.push(start..span.end);
    }
    out
}

impl Transform {
    /// Add `mark` to every inline node between `from` and `to` that lacks it.
    pub fn add_mark(&mut self, from: &Pos, to: &Pos, mark: &Mark) -> &mut Self {
        for (path, block) in blocks_between(self.doc(), from, to) {
            if block.node_type().plain_text {
                continue;
            }
            let span = block_span(&path, &block, from, to);
            for run in runs(&block, span, |node| !node.marks().contains(mark)) {
                self.step(Step::add_mark(
                    Pos::new(path.clone(), run.start),
                    Pos::new(path.clone(), run.end),
                    mark.clone(),
                ));
            }
        }
        self
    }

    /// Remove `mark` from every inline node between `from` and `to`.
    pub fn remove_mark(&mut self, from: &Pos, to: &Pos, mark: &Mark) -> &mut Self {
        for (path, block) in blocks_between(self.doc(), from, to) {
            let span = block_span(&path, &block, from, to);
            for run in runs(&block, span, |node| node.marks().contains(mark)) {
                self.step(Step::remove_mark(
                    Pos::new(path.clone(), run.start),
                    Pos::new(path.clone(), run.end),
                    mark.clone(),
                ));
            }
        }
        self
    }

    /// Strip every mark from the inline nodes between `from` and `to`.
    /// Non-text inline nodes are kept.
    pub fn clear_markup(&mut self, from: &Pos, to: &Pos) -> &mut Self {
        if let Err(err) = self.atomic(|tr| tr.try_clear_markup(from, to)) {
            log::debug!("clearing markup in {from}..{to} stopped: {err}");
        }
        self
    }

    pub(crate) fn try_clear_markup(&mut self, from: &Pos, to: &Pos) -> Result<(), StepError> {
        for (path, block) in blocks_between(self.doc(), from, to) {
            let span = block_span(&path, &block, from, to);
            let marks: BTreeSet<&Mark> = block.content()[span.clone()]
                .iter()
                .flat_map(|child| child.marks())
                .collect();
            for mark in marks {
                for run in runs(&block, span.clone(), |node| node.marks().contains(mark)) {
                    self.try_step(Step::remove_mark(
                        Pos::new(path.clone(), run.start),
                        Pos::new(path.clone(), run.end),
                        mark.clone(),
                    ))?;
                }
            }
        }
        Ok(())
    }
}
