use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A location in a document tree.
///
/// `path` is the sequence of child indices leading from the root to a
/// container node, and `offset` indexes into that container's content list
/// (`0..=len`). A position therefore always sits *between* children.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Pos {
    pub path: Vec<usize>,
    pub offset: usize,
}

impl Pos {
    pub fn new(path: Vec<usize>, offset: usize) -> Self {
        Self { path, offset }
    }

    /// Number of containers between the root and this position's container.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Climb to an ancestor container.
    ///
    /// `to` is the path length of the target container and defaults to one
    /// level up. The resulting offset is the index the climbed child occupied
    /// in that container, adjusted by `offset_delta` (pass `1` to land after
    /// the child instead of before it).
    ///
    /// Callers must stay inside the tree: shortening a root position, or to a
    /// length that is not above the current path, is a programming error.
    ///
    /// # Panics
    /// Panics when the path is empty or `to` is not shorter than it.
    pub fn shorten(&self, to: Option<usize>, offset_delta: isize) -> Pos {
        let to = to.unwrap_or_else(|| {
            self.path
                .len()
                .checked_sub(1)
                .expect("cannot shorten a position at the root")
        });
        assert!(
            to < self.path.len(),
            "shorten target {to} must be above path {:?}",
            self.path
        );
        let index = self.path[to] as isize + offset_delta;
        Pos::new(self.path[..to].to_vec(), index.max(0) as usize)
    }

    /// Same container, offset moved by `delta`.
    pub fn move_by(&self, delta: isize) -> Pos {
        let offset = (self.offset as isize + delta).max(0) as usize;
        Pos::new(self.path.clone(), offset)
    }

    /// The path with the offset appended, i.e. the path of the child right
    /// after this position.
    pub fn to_path(&self) -> Vec<usize> {
        let mut path = self.path.clone();
        path.push(self.offset);
        path
    }

    /// Inverse of [`Pos::to_path`]. Returns `None` for an empty path.
    pub fn from_path(path: &[usize]) -> Option<Pos> {
        let (&offset, parent) = path.split_last()?;
        Some(Pos::new(parent.to_vec(), offset))
    }

    /// Compare two raw path/offset pairs.
    ///
    /// When one path is a prefix of the other, the shallower position lies
    /// before the deeper one iff its offset is at or before the child the
    /// deeper path descends into.
    pub fn cmp_parts(
        path_a: &[usize],
        offset_a: usize,
        path_b: &[usize],
        offset_b: usize,
    ) -> Ordering {
        let common = path_a.len().min(path_b.len());
        for i in 0..common {
            match path_a[i].cmp(&path_b[i]) {
                Ordering::Equal => {}
                other => return other,
            }
        }
        match path_a.len().cmp(&path_b.len()) {
            Ordering::Greater => {
                if offset_b <= path_a[common] {
                    Ordering::Greater
                } else {
                    Ordering::Less
                }
            }
            Ordering::Less => {
                if offset_a <= path_b[common] {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            }
            Ordering::Equal => offset_a.cmp(&offset_b),
        }
    }
}

impl Ord for Pos {
    fn cmp(&self, other: &Self) -> Ordering {
        Pos::cmp_parts(&self.path, self.offset, &other.path, other.offset)
    }
}

impl PartialOrd for Pos {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path: Vec<String> = self.path.iter().map(|i| i.to_string()).collect();
        write!(f, "{}:{}", path.join("/"), self.offset)
    }
}
