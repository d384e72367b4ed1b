//! The `split` step: cut a container in two at a position.

use std::sync::Arc;

use docstep_model::{Node, Pos, copy_to, is_plain_text};

use crate::error::StepError;
use crate::map::{Bias, MovedRange, PosMap, ReplacedRange};
use crate::step::{Step, StepKind, StepResult, TransformResult};
use crate::transform::Transform;

pub const SPLIT: &str = "split";

/// Splits the container at `step.from.path` so that its children from
/// `step.from.offset` on move into a new next sibling. When `step.node` is
/// set, the new sibling takes its type and attributes.
pub struct SplitStep;

impl StepKind for SplitStep {
    fn apply(&self, doc: &Arc<Node>, step: &Step) -> StepResult {
        let at = &step.from;
        let Some((&index, parent_path)) = at.path.split_last() else {
            return Err(StepError::ClimbPastRoot);
        };
        let target = doc
            .try_path(&at.path)
            .filter(|node| !node.node_type().is_leaf())
            .ok_or_else(|| StepError::OutOfRange(at.to_string()))?;
        if at.offset > target.max_offset() {
            return Err(StepError::OutOfRange(at.to_string()));
        }
        let parent = doc.path(parent_path);

        let (head, tail) = target.content().split_at(at.offset);
        let second = step.node.as_ref().unwrap_or(target).copy(tail.to_vec());
        if !parent.node_type().can_contain(second.node_type())
            || second.node_type().contains != target.node_type().contains
        {
            return Err(StepError::TypeMismatch {
                container: parent.name().to_string(),
                content: second.name().to_string(),
            });
        }
        if second.node_type().plain_text && !is_plain_text(&second) {
            return Err(StepError::PlainTextViolation(second.name().to_string()));
        }
        let first = target.copy(head.to_vec());

        let target_size = target.max_offset();
        let parent_size = parent.max_offset();
        let mut copy = doc.clone();
        copy_to(&mut copy, parent_path)
            .content_mut()
            .splice(index..index + 1, [Arc::new(first), Arc::new(second)]);

        let mut second_path = parent_path.to_vec();
        second_path.push(index + 1);
        let start_of_second = Pos::new(second_path, 0);
        let map = PosMap::new(
            vec![
                MovedRange::new(at.clone(), target_size - at.offset, start_of_second.clone()),
                MovedRange::new(
                    Pos::new(parent_path.to_vec(), index + 1),
                    parent_size - index - 1,
                    Pos::new(parent_path.to_vec(), index + 2),
                ),
            ],
            vec![ReplacedRange::with_refs(
                at.clone(),
                at.clone(),
                at.clone(),
                start_of_second,
                at.clone(),
                at.shorten(None, 1),
            )],
        );
        Ok(TransformResult::new(copy, map))
    }

    fn invert(&self, step: &Step, _old_doc: &Node, map: &PosMap) -> Step {
        Step::join(step.from.clone(), map.map(&step.from, Bias::After).pos)
    }
}

impl Transform {
    /// Split `depth` levels of containers at `pos`, innermost first. Only the
    /// innermost new sibling takes the type of `node_after`. When any level
    /// cannot be split, none is.
    pub fn split(&mut self, pos: &Pos, depth: usize, node_after: Option<Node>) -> &mut Self {
        if let Err(err) = self.atomic(|tr| tr.try_split(pos, depth, node_after)) {
            log::debug!("split at {pos} stopped: {err}");
        }
        self
    }

    pub(crate) fn try_split(
        &mut self,
        pos: &Pos,
        depth: usize,
        node_after: Option<Node>,
    ) -> Result<(), StepError> {
        let mut pos = pos.clone();
        let mut node_after = node_after;
        for level in 0..depth {
            self.try_step(Step::split(pos.clone(), node_after.take()))?;
            if level + 1 < depth {
                pos = pos.shorten(None, 1);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use docstep_model::{is_valid_pos, positions};
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_paragraph() {
        let before = doc(vec![p(vec![text("a"), text("b")]), hr()]);
        let result = SplitStep
            .apply(&before, &Step::split(pos(&[0], 1), None))
            .unwrap();
        assert_snapshot!(result.doc.to_string(), @r#"doc(paragraph("a"), paragraph("b"), horizontal_rule)"#);

        let map = &result.map;
        assert_eq!(map.map(&pos(&[0], 1), Bias::Before).pos, pos(&[0], 1));
        assert_eq!(map.map(&pos(&[0], 1), Bias::After).pos, pos(&[1], 0));
        assert_eq!(map.map(&pos(&[0], 2), Bias::After).pos, pos(&[1], 1));
        assert_eq!(map.map(&pos(&[], 1), Bias::After).pos, pos(&[], 2));
        assert_eq!(map.map(&pos(&[1], 0), Bias::After).pos, pos(&[2], 0));
        assert_eq!(map.map(&pos(&[0], 0), Bias::After).pos, pos(&[0], 0));
    }

    #[test]
    fn test_split_as_other_type() {
        let before = doc(vec![h(1, vec![text("a"), text("b")])]);
        let step = Step::split(pos(&[0], 1), Some(p(vec![])));
        let result = SplitStep.apply(&before, &step).unwrap();
        assert_snapshot!(result.doc.to_string(), @r#"doc(heading{level=1}("a"), paragraph("b"))"#);
    }

    #[test]
    fn test_split_round_trip_and_positions() {
        let before = doc(vec![ul(vec![li(vec![p(vec![text("a")]), p(vec![text("b")])])])]);
        let step = Step::split(pos(&[0, 0], 1), None);
        let result = SplitStep.apply(&before, &step).unwrap();
        assert_eq!(
            result.doc.to_string(),
            r#"doc(bullet_list(list_item(paragraph("a")), list_item(paragraph("b"))))"#
        );
        for old in positions(&before) {
            let new = result.map.map(&old, Bias::After).pos;
            assert!(is_valid_pos(&result.doc, &new), "{old} -> {new}");
        }

        let inverse = SplitStep.invert(&step, &before, &result.map);
        assert_eq!(inverse, Step::join(pos(&[0, 0], 1), pos(&[0, 1], 0)));
        let restored = inverse.apply(&crate::step::StepRegistry::new(), &result.doc).unwrap();
        assert_eq!(restored.doc, before);
    }

    #[test]
    fn test_split_at_edges_leaves_empty_halves() {
        let before = doc(vec![p(vec![text("a")])]);
        let result = SplitStep.apply(&before, &Step::split(pos(&[0], 0), None)).unwrap();
        assert_eq!(result.doc.to_string(), r#"doc(paragraph, paragraph("a"))"#);
    }

    #[test]
    fn test_split_rejects_root() {
        let before = doc(vec![p(vec![text("a")])]);
        assert_eq!(
            SplitStep.apply(&before, &Step::split(pos(&[], 1), None)).unwrap_err(),
            StepError::ClimbPastRoot
        );
    }

    #[test]
    fn test_split_rejects_out_of_range() {
        let before = doc(vec![p(vec![text("a")])]);
        assert!(matches!(
            SplitStep.apply(&before, &Step::split(pos(&[0], 2), None)),
            Err(StepError::OutOfRange(_))
        ));
        assert!(matches!(
            SplitStep.apply(&before, &Step::split(pos(&[3], 0), None)),
            Err(StepError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_split_rejects_leaf() {
        let before = doc(vec![p(vec![text("a")]), hr()]);
        assert!(matches!(
            SplitStep.apply(&before, &Step::split(pos(&[1], 0), None)),
            Err(StepError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_split_rejects_type_the_parent_cannot_hold() {
        let before = doc(vec![ul(vec![li(vec![p(vec![text("a"), text("b")])])])]);
        // an item cannot hold another item
        let step = Step::split(pos(&[0, 0, 0], 1), Some(li(vec![])));
        assert_eq!(
            SplitStep.apply(&before, &step).unwrap_err(),
            StepError::TypeMismatch {
                container: "list_item".into(),
                content: "list_item".into()
            }
        );
    }

    #[test]
    fn test_split_rejects_plain_text_violation() {
        let before = doc(vec![p(vec![
            text("a"),
            marked("b", docstep_model::Mark::new("em")),
        ])]);
        let step = Step::split(pos(&[0], 1), Some(code(vec![])));
        assert_eq!(
            SplitStep.apply(&before, &step).unwrap_err(),
            StepError::PlainTextViolation("code_block".into())
        );
    }

    #[test]
    fn test_transform_split_several_levels() {
        let before = doc(vec![ul(vec![li(vec![p(vec![text("a"), text("b")])])])]);
        let mut tr = Transform::new(before);
        tr.split(&pos(&[0, 0, 0], 1), 2, None);
        assert_eq!(tr.steps().len(), 2);
        assert_snapshot!(tr.doc().to_string(), @r#"doc(bullet_list(list_item(paragraph("a")), list_item(paragraph("b"))))"#);
    }

    #[test]
    fn test_transform_split_past_root_changes_nothing() {
        let before = doc(vec![p(vec![text("a"), text("b")])]);
        let mut tr = Transform::new(before.clone());
        tr.split(&pos(&[0], 1), 3, None);
        assert!(Arc::ptr_eq(tr.doc(), &before));
        assert!(tr.steps().is_empty());
        assert!(tr.maps().is_empty());
    }
}
