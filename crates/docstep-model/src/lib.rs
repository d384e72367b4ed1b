//! # docstep-model
//!
//! The document side of docstep: an immutable tree of typed nodes and the
//! positions that address it.
//!
//! ## Positions
//!
//! A [`Pos`] is a path of child indices from the root down to a container,
//! plus an offset into that container's children. Positions are totally
//! ordered in document order, so a position inside a child compares between
//! the offsets just before and just after that child:
//!
//! ```text
//! doc( list( item(p), item(p) ), p )
//!     ^     ^                ^   ^
//!   :0    0:0              0:2  :1
//! ```
//!
//! ## Trees
//!
//! [`Node`]s hold their children behind `Arc`. Edits go through
//! [`tree::copy_to`], which clones only the spine from the root to the edited
//! container; every untouched subtree stays shared with the previous document.
//! Old documents therefore remain valid and cheap to keep around for undo or
//! for mapping positions held by other parties.
//!
//! ## Schema
//!
//! Every node has a [`NodeType`] naming the group it belongs to and the group
//! its children must belong to. A [`Schema`] collects the types of a document
//! and implements [`ConnectionResolver`], which finds wrapper chains that let
//! one type legally hold another.

pub mod node;
pub mod pos;
pub mod schema;
pub mod tree;

pub use node::{Attrs, Mark, Node};
pub use pos::Pos;
pub use schema::{BLOCK, ConnectionResolver, INLINE, NodeType, Schema, SchemaError};
pub use tree::{
    SiblingRange, blocks_between, copy_to, is_flat_range, is_plain_text, is_valid_pos,
    positions, selected_siblings,
};
