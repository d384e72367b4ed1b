//! Lift, wrap and set-block-type, built from ancestor, split and join steps.
//!
//! Each operation has a pure feasibility check (`can_lift`, `can_wrap`) that
//! callers may use to decide whether to offer it, and a [`Transform`] method
//! that applies it. An infeasible request leaves the transform unchanged.

use std::sync::Arc;

use docstep_model::{
    Attrs, ConnectionResolver, Node, NodeType, Pos, SiblingRange, blocks_between, is_plain_text,
    selected_siblings,
};

use crate::error::StepError;
use crate::step::Step;
use crate::transform::Transform;

/// How many times lifting may first unwrap the selected nodes themselves
/// while searching for an ancestor that accepts their content.
pub const MAX_UNWRAP_PASSES: usize = 1;

/// Where a lift takes a range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiftTarget {
    pub range: SiblingRange,
    /// Path of the ancestor that will hold the lifted content.
    pub path: Vec<usize>,
    /// The selected nodes are unwrapped, and their content lifted.
    pub unwrap: bool,
}

pub fn can_lift(doc: &Node, from: &Pos, to: &Pos) -> Option<LiftTarget> {
    let range = selected_siblings(doc, from, to);
    find_lift_target(doc, range, MAX_UNWRAP_PASSES)
}

fn find_lift_target(doc: &Node, range: SiblingRange, max_unwrap: usize) -> Option<LiftTarget> {
    if range.is_empty() {
        return None;
    }
    let container = doc.path(&range.path);
    let mut content = container.node_type().contains.clone()?;
    let mut passes = 0;
    loop {
        // deepest ancestor that holds this kind of content
        let mut found = None;
        let mut node = doc;
        for (depth, &index) in range.path.iter().enumerate() {
            if node.node_type().contains.as_deref() == Some(content.as_str()) {
                found = Some(depth);
            }
            node = node.child(index);
        }
        if let Some(depth) = found {
            return Some(LiftTarget {
                path: range.path[..depth].to_vec(),
                unwrap: passes > 0,
                range,
            });
        }
        if passes == max_unwrap {
            return None;
        }
        content = shared_contains(container, &range)?;
        passes += 1;
    }
}

/// The content kind every selected child holds, when they agree.
fn shared_contains(container: &Node, range: &SiblingRange) -> Option<String> {
    let selected = &container.content()[range.from..range.to];
    let (first, rest) = selected.split_first()?;
    let contains = first.node_type().contains.as_deref()?;
    rest.iter()
        .all(|node| node.node_type().contains.as_deref() == Some(contains))
        .then(|| contains.to_string())
}

/// The wrapper chain a wrap will insert.
#[derive(Debug, Clone)]
pub struct WrapPlan {
    pub range: SiblingRange,
    /// Types between the range's container and the requested wrapper.
    pub around: Vec<Arc<NodeType>>,
    /// Types between the requested wrapper and the selected nodes.
    pub inside: Vec<Arc<NodeType>>,
}

pub fn can_wrap(
    doc: &Node,
    from: &Pos,
    to: &Pos,
    node: &Node,
    resolver: &dyn ConnectionResolver,
) -> Option<WrapPlan> {
    let range = selected_siblings(doc, from, to);
    if range.is_empty() {
        return None;
    }
    let parent = doc.path(&range.path);
    let around = resolver.find_connection(parent.node_type(), node.node_type())?;
    let inside = resolver.find_connection(node.node_type(), parent.child(range.from).node_type())?;
    Some(WrapPlan {
        range,
        around,
        inside,
    })
}

impl Transform {
    /// Move the nodes between `from` and `to` out of their nearest ancestor
    /// that cannot hold them, splitting that ancestor around them first.
    pub fn lift(&mut self, from: &Pos, to: &Pos) -> &mut Self {
        let Some(target) = can_lift(self.doc(), from, to) else {
            log::debug!("nothing to lift between {from} and {to}");
            return self;
        };
        if let Err(err) = self.atomic(|tr| tr.apply_lift(target)) {
            log::debug!("lift between {from} and {to} stopped: {err}");
        }
        self
    }

    fn apply_lift(&mut self, target: LiftTarget) -> Result<(), StepError> {
        let LiftTarget {
            mut range,
            path,
            unwrap,
        } = target;
        let mut depth = range.path.len() - path.len();

        // Split off whatever follows the range at each level we climb.
        let mut pos = range.end();
        for d in 0..depth {
            if pos.offset < self.doc().path(&pos.path).max_offset() {
                self.try_split(&pos, depth - d, None)?;
                break;
            }
            if d + 1 < depth {
                pos = pos.shorten(None, 1);
            }
        }

        // Same for whatever precedes it; the range then sits at the start of
        // the second halves.
        let mut pos = range.start();
        for d in 0..depth {
            if pos.offset > 0 {
                self.try_split(&pos, depth - d, None)?;
                let cut = range.path.len() - depth;
                let mut moved = pos.path[..cut].to_vec();
                moved.push(pos.path[cut] + 1);
                moved.resize(range.path.len(), 0);
                range = SiblingRange {
                    path: moved,
                    from: 0,
                    to: range.len(),
                };
                break;
            }
            if d + 1 < depth {
                pos = pos.shorten(None, 0);
            }
        }

        if unwrap {
            for index in (range.from + 1..range.to).rev() {
                self.try_join(&Pos::new(range.path.clone(), index))?;
            }
            let mut merged = range.path.clone();
            merged.push(range.from);
            let size = self.doc().path(&merged).max_offset();
            range = SiblingRange {
                path: merged,
                from: 0,
                to: size,
            };
            depth += 1;
        }

        self.try_step(Step::ancestor(range.start(), range.end(), depth, Vec::new()))?;
        Ok(())
    }

    /// Wrap the nodes between `from` and `to` in `node`, adding whatever
    /// intermediate wrappers `resolver` says are needed around and inside it.
    pub fn wrap(
        &mut self,
        from: &Pos,
        to: &Pos,
        node: &Node,
        resolver: &dyn ConnectionResolver,
    ) -> &mut Self {
        let Some(plan) = can_wrap(self.doc(), from, to, node, resolver) else {
            log::debug!("cannot wrap {from}..{to} in {}", node.name());
            return self;
        };
        if let Err(err) = self.atomic(|tr| tr.apply_wrap(plan, node)) {
            log::debug!("wrap of {from}..{to} in {} stopped: {err}", node.name());
        }
        self
    }

    fn apply_wrap(&mut self, plan: WrapPlan, node: &Node) -> Result<(), StepError> {
        let WrapPlan {
            range,
            around,
            inside,
        } = plan;
        let template = |node_type: &Arc<NodeType>| Node::new(node_type.clone(), Attrs::new(), Vec::new());
        let wrappers: Vec<Node> = around
            .iter()
            .map(template)
            .chain(std::iter::once(node.copy(Vec::new())))
            .chain(inside.iter().map(template))
            .collect();
        let count = wrappers.len();
        self.try_step(Step::ancestor(range.start(), range.end(), 0, wrappers))?;

        if !inside.is_empty() {
            // Give each wrapped node its own chain of inner wrappers.
            let mut inner = range.path.clone();
            inner.push(range.from);
            inner.resize(range.path.len() + count, 0);
            for index in (1..range.len()).rev() {
                self.try_split(&Pos::new(inner.clone(), index), inside.len(), None)?;
            }
        }
        Ok(())
    }

    /// Retag every textblock between `from` and `to` as `node`, clearing
    /// marks first when `node` only takes plain text. Each block is retagged
    /// together with its clearing or left exactly as it was.
    pub fn set_block_type(&mut self, from: &Pos, to: &Pos, node: &Node) -> &mut Self {
        let clear = node.node_type().plain_text;
        for (path, block) in blocks_between(self.doc(), from, to) {
            let start = Pos::new(path.clone(), 0);
            let end = Pos::new(path, block.max_offset());
            let retag = self.atomic(|tr| {
                if clear && !is_plain_text(&block) {
                    tr.try_clear_markup(&start, &end)?;
                }
                tr.try_step(Step::ancestor(
                    start.clone(),
                    end.clone(),
                    1,
                    vec![node.copy(Vec::new())],
                ))?;
                Ok(())
            });
            if let Err(err) = retag {
                log::debug!("cannot retag {start}..{end} as {}: {err}", node.name());
            }
        }
        self
    }
}
