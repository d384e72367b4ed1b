//! The `join` step: merge two adjacent siblings.

use std::sync::Arc;

use docstep_model::{Node, Pos, copy_to, is_plain_text};

use crate::error::StepError;
use crate::map::{MovedRange, PosMap, ReplacedRange};
use crate::step::{Step, StepKind, StepResult, TransformResult};
use crate::transform::Transform;

pub const JOIN: &str = "join";

/// Merges the node ending at `step.from` with the sibling starting at
/// `step.to`. The merged node keeps the type and attributes of the first.
pub struct JoinStep;

impl StepKind for JoinStep {
    fn apply(&self, doc: &Arc<Node>, step: &Step) -> StepResult {
        let (from, to) = (&step.from, &step.to);
        let not_joinable = || StepError::NotJoinable {
            from: from.to_string(),
            to: to.to_string(),
        };
        let (Some((&index, parent_path)), Some((&next, next_parent))) =
            (from.path.split_last(), to.path.split_last())
        else {
            return Err(not_joinable());
        };
        if parent_path != next_parent || next != index + 1 {
            return Err(not_joinable());
        }
        let before = container_at(doc, from)?;
        let after = container_at(doc, to)?;
        if from.offset != before.max_offset() || to.offset != 0 {
            return Err(not_joinable());
        }
        if before.node_type().contains.is_none()
            || before.node_type().contains != after.node_type().contains
        {
            return Err(StepError::TypeMismatch {
                container: before.name().to_string(),
                content: after.name().to_string(),
            });
        }
        if before.node_type().plain_text && !is_plain_text(after) {
            return Err(StepError::PlainTextViolation(before.name().to_string()));
        }

        let parent_size = doc.path(parent_path).max_offset();
        let after_size = after.max_offset();
        let content = before
            .content()
            .iter()
            .chain(after.content())
            .cloned()
            .collect();
        let merged = before.copy(content);

        let mut copy = doc.clone();
        copy_to(&mut copy, parent_path)
            .content_mut()
            .splice(index..index + 2, [Arc::new(merged)]);

        let map = PosMap::new(
            vec![
                MovedRange::new(to.clone(), after_size, from.clone()),
                MovedRange::new(
                    Pos::new(parent_path.to_vec(), index + 2),
                    parent_size - index - 2,
                    Pos::new(parent_path.to_vec(), index + 1),
                ),
            ],
            vec![ReplacedRange::new(
                from.clone(),
                to.clone(),
                from.clone(),
                from.clone(),
            )],
        );
        Ok(TransformResult::new(copy, map))
    }

    fn invert(&self, step: &Step, old_doc: &Node, _map: &PosMap) -> Step {
        let after = old_doc.path(&step.to.path).copy(Vec::new());
        Step::split(step.from.clone(), Some(after))
    }
}

fn container_at<'a>(doc: &'a Node, pos: &Pos) -> Result<&'a Node, StepError> {
    doc.try_path(&pos.path)
        .filter(|node| !node.is_text())
        .ok_or_else(|| StepError::OutOfRange(pos.to_string()))
}

impl Transform {
    /// Join the children on either side of `at`.
    pub fn join(&mut self, at: &Pos) -> &mut Self {
        if let Err(err) = self.try_join(at) {
            log::debug!("join at {at} rejected: {err}");
        }
        self
    }

    pub(crate) fn try_join(&mut self, at: &Pos) -> Result<(), StepError> {
        let Some(index) = at.offset.checked_sub(1) else {
            return Err(StepError::OutOfRange(at.to_string()));
        };
        let mut before_path = at.path.clone();
        before_path.push(index);
        let before_size = self
            .doc()
            .try_path(&before_path)
            .map(Node::max_offset)
            .ok_or_else(|| StepError::OutOfRange(at.to_string()))?;
        let from = Pos::new(before_path, before_size);
        let to = Pos::new(at.to_path(), 0);
        self.try_step(Step::join(from, to))?;
        Ok(())
    }
}
