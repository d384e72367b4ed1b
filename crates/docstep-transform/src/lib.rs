//! # docstep-transform
//!
//! Named, invertible edit steps over [`docstep_model`] documents, and the
//! position maps that let anyone holding an old position find where it lives
//! after an edit.
//!
//! A [`Transform`] applies [`Step`]s one at a time through a
//! [`StepRegistry`]. Every applied step yields a new document and a
//! [`PosMap`]; rejected steps return a [`StepError`] and change nothing.
//!
//! ```
//! use std::sync::Arc;
//! use docstep_model::{Attrs, Pos, Schema};
//! use docstep_transform::{Bias, Transform};
//!
//! let schema = Schema::basic();
//! let para = schema
//!     .node("paragraph", Attrs::new(), vec![schema.text("hi", vec![]).unwrap()])
//!     .unwrap();
//! let doc = Arc::new(schema.node("doc", Attrs::new(), vec![para]).unwrap());
//!
//! let quote = schema.template("blockquote", Attrs::new()).unwrap();
//! let mut tr = Transform::new(doc);
//! tr.wrap(&Pos::new(vec![0], 0), &Pos::new(vec![0], 1), &quote, &schema);
//!
//! assert_eq!(tr.doc().to_string(), r#"doc(blockquote(paragraph("hi")))"#);
//! assert_eq!(
//!     tr.map(&Pos::new(vec![0], 1), Bias::After).pos,
//!     Pos::new(vec![0, 0], 1)
//! );
//! ```

pub mod ancestor;
pub mod error;
pub mod join;
pub mod map;
pub mod mark;
pub mod split;
pub mod step;
pub mod structure;
pub mod transform;

#[cfg(test)]
mod test_support;

pub use ancestor::ANCESTOR;
pub use error::StepError;
pub use join::JOIN;
pub use map::{Bias, MapResult, MovedRange, PosMap, ReplacedRange, Side, map_through};
pub use mark::{ADD_MARK, REMOVE_MARK};
pub use split::SPLIT;
pub use step::{Step, StepKind, StepParam, StepRegistry, StepResult, TransformResult};
pub use structure::{LiftTarget, MAX_UNWRAP_PASSES, WrapPlan, can_lift, can_wrap};
pub use transform::Transform;
