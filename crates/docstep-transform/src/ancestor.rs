//! The `ancestor` step: change how deeply, and inside which wrappers, a run of
//! siblings is nested.
//!
//! One step covers unwrapping (`depth > 0`, no wrappers), wrapping
//! (`depth == 0`, wrappers) and retagging (`depth == 1`, one wrapper).

use std::sync::Arc;

use docstep_model::{Node, Pos, copy_to, is_flat_range, is_plain_text};

use crate::error::StepError;
use crate::map::{Bias, MovedRange, PosMap, ReplacedRange};
use crate::step::{Step, StepKind, StepParam, StepResult, TransformResult};

pub const ANCESTOR: &str = "ancestor";

pub struct AncestorStep;

impl StepKind for AncestorStep {
    fn apply(&self, doc: &Arc<Node>, step: &Step) -> StepResult {
        let StepParam::Ancestor { depth, wrappers } = &step.param else {
            return Err(step.invalid_param());
        };
        let (from, to) = (&step.from, &step.to);
        if !is_flat_range(from, to) {
            return Err(StepError::NotFlat {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        if *depth == 0 && wrappers.is_empty() {
            return Err(StepError::NoOp(step.to_string()));
        }
        let inner = doc
            .try_path(&from.path)
            .filter(|node| !node.is_text())
            .ok_or_else(|| StepError::OutOfRange(from.to_string()))?;
        if to.offset > inner.max_offset() {
            return Err(StepError::OutOfRange(to.to_string()));
        }

        let mut target_path: &[usize] = &from.path;
        let (mut start, mut end) = (from.offset, to.offset);
        for level in 0..*depth {
            if start > 0 || end < doc.path(target_path).max_offset() {
                return Err(StepError::RangeNotSpanning { level });
            }
            let Some((&index, parent)) = target_path.split_last() else {
                return Err(StepError::ClimbPastRoot);
            };
            start = index;
            end = index + 1;
            target_path = parent;
        }

        let target = doc.path(target_path);
        let parent_size = target.max_offset();
        let selected = &inner.content()[from.offset..to.offset];

        let replacement = match (wrappers.first(), wrappers.last()) {
            (Some(outer), Some(innermost)) => {
                if !target.node_type().can_contain(outer.node_type()) {
                    return Err(StepError::TypeMismatch {
                        container: target.name().to_string(),
                        content: outer.name().to_string(),
                    });
                }
                if !same_contains(innermost, inner) {
                    return Err(StepError::TypeMismatch {
                        container: innermost.name().to_string(),
                        content: inner.name().to_string(),
                    });
                }
                if innermost.node_type().plain_text && !is_plain_text(inner) {
                    return Err(StepError::PlainTextViolation(innermost.name().to_string()));
                }
                let mut node = innermost.copy(selected.to_vec());
                for wrapper in wrappers[..wrappers.len() - 1].iter().rev() {
                    node = wrapper.copy(vec![Arc::new(node)]);
                }
                vec![Arc::new(node)]
            }
            _ => {
                if !same_contains(target, inner) {
                    return Err(StepError::TypeMismatch {
                        container: target.name().to_string(),
                        content: inner.name().to_string(),
                    });
                }
                selected.to_vec()
            }
        };

        let mut copy = doc.clone();
        copy_to(&mut copy, target_path)
            .content_mut()
            .splice(start..end, replacement);

        let span = to.offset - from.offset;
        let wrapped = !wrappers.is_empty();
        let inserted = if wrapped { 1 } else { span };

        let mut inner_path = target_path.to_vec();
        for i in 0..wrappers.len() {
            inner_path.push(if i == 0 { start } else { 0 });
        }
        let start_of_inner = Pos::new(inner_path.clone(), if wrapped { 0 } else { start });

        let mut replaced = Vec::new();
        if *depth > 1 || wrappers.len() > 1 {
            let before = Pos::new(target_path.to_vec(), start);
            let after_old = Pos::new(target_path.to_vec(), end);
            let after_new = Pos::new(target_path.to_vec(), start + inserted);
            let end_of_inner = Pos::new(inner_path, start_of_inner.offset + span);
            replaced.push(ReplacedRange::new(
                before.clone(),
                from.clone(),
                before,
                start_of_inner.clone(),
            ));
            replaced.push(ReplacedRange::with_refs(
                to.clone(),
                after_old.clone(),
                end_of_inner,
                after_new.clone(),
                after_old,
                after_new,
            ));
        }

        let mut moved = vec![MovedRange::new(from.clone(), span, start_of_inner)];
        if end - start != inserted {
            moved.push(MovedRange::new(
                Pos::new(target_path.to_vec(), end),
                parent_size - end,
                Pos::new(target_path.to_vec(), start + inserted),
            ));
        }

        Ok(TransformResult::new(copy, PosMap::new(moved, replaced)))
    }

    fn invert(&self, step: &Step, old_doc: &Node, map: &PosMap) -> Step {
        let (depth, inserted) = match &step.param {
            StepParam::Ancestor { depth, wrappers } => (*depth, wrappers.len()),
            _ => (0, 0),
        };
        // The stripped ancestors, outermost first, without their content.
        let path = &step.from.path;
        let wrappers = (0..depth)
            .rev()
            .map(|i| old_doc.path(&path[..path.len() - i]).copy(Vec::new()))
            .collect();

        let new_from = map.map(&step.from, Bias::After).pos;
        let new_to = if step.from != step.to {
            map.map(&step.to, Bias::Before).pos
        } else {
            new_from.clone()
        };
        Step::ancestor(new_from, new_to, inserted, wrappers)
    }
}

fn same_contains(a: &Node, b: &Node) -> bool {
    let contains = &a.node_type().contains;
    contains.is_some() && *contains == b.node_type().contains
}
