//! Range and path helpers over document trees.

use std::sync::Arc;

use crate::node::Node;
use crate::pos::Pos;

/// Adjacent children `from..to` of the container at `path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiblingRange {
    pub path: Vec<usize>,
    pub from: usize,
    pub to: usize,
}

impl SiblingRange {
    pub fn start(&self) -> Pos {
        Pos::new(self.path.clone(), self.from)
    }

    pub fn end(&self) -> Pos {
        Pos::new(self.path.clone(), self.to)
    }

    pub fn len(&self) -> usize {
        self.to - self.from
    }

    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }
}

/// Both positions sit in the same container, in order.
pub fn is_flat_range(from: &Pos, to: &Pos) -> bool {
    from.path == to.path && from.offset <= to.offset
}

/// Copy-on-write descent: clone every node on `path` that is still shared
/// with another document and return the container at its end.
///
/// # Panics
/// Panics when the path does not exist.
pub fn copy_to<'a>(root: &'a mut Arc<Node>, path: &[usize]) -> &'a mut Node {
    let mut node = Arc::make_mut(root);
    for &index in path {
        let children = node.content_mut();
        assert!(
            index < children.len(),
            "copy_to: index {index} out of range (len {})",
            children.len()
        );
        node = Arc::make_mut(&mut children[index]);
    }
    node
}

/// The sibling range spanned by two positions: the children of their deepest
/// common container that the selection touches. A selection inside a single
/// textblock yields that textblock.
pub fn selected_siblings(doc: &Node, from: &Pos, to: &Pos) -> SiblingRange {
    let mut node = doc;
    let mut depth = 0;
    loop {
        if depth > 0 && node.node_type().is_textblock() {
            let index = from.path[depth - 1];
            return SiblingRange {
                path: from.path[..depth - 1].to_vec(),
                from: index,
                to: index + 1,
            };
        }
        let from_end = depth == from.path.len();
        let to_end = depth == to.path.len();
        let left = if from_end { from.offset } else { from.path[depth] };
        let right = if to_end { to.offset } else { to.path[depth] };
        if from_end || to_end || left != right {
            return SiblingRange {
                path: from.path[..depth].to_vec(),
                from: left,
                to: if to_end { right } else { right + 1 },
            };
        }
        node = node.child(left);
        depth += 1;
    }
}

type Bound<'a> = Option<(&'a [usize], usize)>;

/// Every textblock touched by the range between two positions, in document
/// order, with its path.
pub fn blocks_between(doc: &Arc<Node>, from: &Pos, to: &Pos) -> Vec<(Vec<usize>, Arc<Node>)> {
    let mut found = Vec::new();
    let mut path = Vec::new();
    scan_blocks(
        doc,
        Some((&from.path, from.offset)),
        Some((&to.path, to.offset)),
        &mut path,
        &mut found,
    );
    found
}

fn scan_blocks(
    node: &Arc<Node>,
    from: Bound<'_>,
    to: Bound<'_>,
    path: &mut Vec<usize>,
    found: &mut Vec<(Vec<usize>, Arc<Node>)>,
) {
    if node.node_type().is_textblock() {
        found.push((path.clone(), node.clone()));
        return;
    }
    let (start, from_rest) = match from {
        Some(([first, rest @ ..], offset)) => (*first, Some((rest, offset))),
        Some(([], offset)) => (offset, None),
        None => (0, None),
    };
    let (end, to_rest) = match to {
        Some(([first, rest @ ..], offset)) => (*first + 1, Some((rest, offset))),
        Some(([], offset)) => (offset, None),
        None => (node.max_offset(), None),
    };
    for index in start..end.min(node.max_offset()) {
        let child_from = if index == start { from_rest } else { None };
        let child_to = if index + 1 == end { to_rest } else { None };
        path.push(index);
        scan_blocks(node.child(index), child_from, child_to, path, found);
        path.pop();
    }
}

/// All children are text runs without marks.
pub fn is_plain_text(node: &Node) -> bool {
    node.content()
        .iter()
        .all(|child| child.is_text() && child.marks().is_empty())
}

/// The position addresses an existing non-text container and its offset is
/// within that container's content.
pub fn is_valid_pos(doc: &Node, pos: &Pos) -> bool {
    doc.try_path(&pos.path)
        .is_some_and(|node| !node.is_text() && pos.offset <= node.max_offset())
}

/// Every valid position in the document, in document order.
pub fn positions(doc: &Node) -> Vec<Pos> {
    let mut out = Vec::new();
    let mut path = Vec::new();
    collect_positions(doc, &mut path, &mut out);
    out
}

fn collect_positions(node: &Node, path: &mut Vec<usize>, out: &mut Vec<Pos>) {
    if node.is_text() {
        return;
    }
    for index in 0..=node.max_offset() {
        out.push(Pos::new(path.clone(), index));
        if index < node.max_offset() {
            path.push(index);
            collect_positions(node.child(index), path, out);
            path.pop();
        }
    }
}
