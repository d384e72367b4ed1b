//! Position maps: how positions in a document before a step translate to
//! positions in the document after it.
//!
//! A [`PosMap`] is made of two kinds of entries:
//!
//! - [`MovedRange`]: a run of content that kept its shape but now starts
//!   somewhere else. Positions inside it (including positions nested deeper
//!   inside its children) shift along with it.
//! - [`ReplacedRange`]: a zone whose structure was rewritten. Positions inside
//!   it have no exact counterpart, so they snap to one edge of the new zone,
//!   picked by [`Bias`].
//!
//! Replaced ranges are consulted first because they describe the ambiguous
//! edges of moved content; a position on such an edge must not be captured by
//! the moved range that shares it.

use docstep_model::Pos;
use serde::{Deserialize, Serialize};

/// Which side a position on an ambiguous boundary sticks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Bias {
    /// Stay with the content before the edit.
    Before,
    /// Move along with the content after the edit.
    #[default]
    After,
}

/// `size` positions starting at `start` now start at `dest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovedRange {
    pub start: Pos,
    pub size: usize,
    pub dest: Pos,
}

impl MovedRange {
    pub fn new(start: Pos, size: usize, dest: Pos) -> Self {
        Self { start, size, dest }
    }

    pub fn end(&self) -> Pos {
        Pos::new(self.start.path.clone(), self.start.offset + self.size)
    }
}

/// One side of a replaced range. `reference` anchors offsets measured inside
/// the zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Side {
    pub from: Pos,
    pub to: Pos,
    pub reference: Pos,
}

/// The old zone `before` was rewritten into the new zone `after`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacedRange {
    pub before: Side,
    pub after: Side,
}

impl ReplacedRange {
    /// Both references default to the start of their zone.
    pub fn new(from: Pos, to: Pos, new_from: Pos, new_to: Pos) -> Self {
        let reference = from.clone();
        let new_reference = new_from.clone();
        Self::with_refs(from, to, new_from, new_to, reference, new_reference)
    }

    pub fn with_refs(
        from: Pos,
        to: Pos,
        new_from: Pos,
        new_to: Pos,
        reference: Pos,
        new_reference: Pos,
    ) -> Self {
        Self {
            before: Side {
                from,
                to,
                reference,
            },
            after: Side {
                from: new_from,
                to: new_to,
                reference: new_reference,
            },
        }
    }
}

/// Where a position ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapResult {
    pub pos: Pos,
    /// The position was strictly inside a replaced zone; its content no
    /// longer exists in the same form.
    pub deleted: bool,
}

impl MapResult {
    fn kept(pos: Pos) -> Self {
        Self {
            pos,
            deleted: false,
        }
    }
}

/// The mapping produced by one step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosMap {
    pub moved: Vec<MovedRange>,
    pub replaced: Vec<ReplacedRange>,
}

impl PosMap {
    pub fn new(moved: Vec<MovedRange>, replaced: Vec<ReplacedRange>) -> Self {
        Self { moved, replaced }
    }

    /// A map that leaves every position where it is.
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn is_identity(&self) -> bool {
        self.moved.is_empty() && self.replaced.is_empty()
    }

    /// Map a position from the old document into the new one.
    pub fn map(&self, pos: &Pos, bias: Bias) -> MapResult {
        self.map_through(pos, bias, false)
    }

    /// Map a position from the new document back into the old one.
    pub fn map_back(&self, pos: &Pos, bias: Bias) -> MapResult {
        self.map_through(pos, bias, true)
    }

    fn map_through(&self, pos: &Pos, bias: Bias, back: bool) -> MapResult {
        for range in &self.replaced {
            let (side, other) = if back {
                (&range.after, &range.before)
            } else {
                (&range.before, &range.after)
            };
            let left = pos.cmp(&side.from);
            let right = pos.cmp(&side.to);
            if left.is_ge() && right.is_le() {
                let target = match bias {
                    Bias::Before => other.from.clone(),
                    Bias::After => other.to.clone(),
                };
                return MapResult {
                    pos: target,
                    deleted: left.is_gt() && right.is_lt(),
                };
            }
        }

        for range in &self.moved {
            let (start, dest) = if back {
                (&range.dest, &range.start)
            } else {
                (&range.start, &range.dest)
            };
            let end_offset = start.offset + range.size;
            let before_end = Pos::cmp_parts(&pos.path, pos.offset, &start.path, end_offset).is_le();
            if pos >= start && before_end {
                let depth = start.depth();
                let mapped = if pos.depth() > depth {
                    let mut path = dest.path.clone();
                    path.push(dest.offset + (pos.path[depth] - start.offset));
                    path.extend_from_slice(&pos.path[depth + 1..]);
                    Pos::new(path, pos.offset)
                } else {
                    Pos::new(dest.path.clone(), dest.offset + (pos.offset - start.offset))
                };
                return MapResult::kept(mapped);
            }
        }

        MapResult::kept(pos.clone())
    }
}

/// Thread a position through a sequence of maps, oldest first.
pub fn map_through(maps: &[PosMap], pos: &Pos, bias: Bias) -> MapResult {
    let mut deleted = false;
    let mut current = pos.clone();
    for map in maps {
        let result = map.map(&current, bias);
        deleted |= result.deleted;
        current = result.pos;
    }
    MapResult {
        pos: current,
        deleted,
    }
}
