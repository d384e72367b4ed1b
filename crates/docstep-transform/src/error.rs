//! Reasons a step cannot be applied to a document.

use thiserror::Error;

/// Why a step was rejected.
///
/// Rejection is an ordinary outcome: the step's preconditions do not hold for
/// this particular document. The document is never partially modified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    /// No step kind with this name is registered.
    #[error("unknown step kind: {0}")]
    UnknownKind(String),

    /// The step carries a parameter shape its kind does not understand.
    #[error("step {kind} got an invalid parameter")]
    InvalidParam { kind: String },

    /// The step would not change anything.
    #[error("step {0} has nothing to do")]
    NoOp(String),

    /// `from` and `to` are not in the same container, or are out of order.
    #[error("range {from}..{to} is not flat")]
    NotFlat { from: String, to: String },

    /// A position points past its container's content.
    #[error("position {0} is out of range")]
    OutOfRange(String),

    /// While climbing, the range did not cover its whole container.
    #[error("range does not span its container at climb level {level}")]
    RangeNotSpanning { level: usize },

    /// Climbing would go above the document root.
    #[error("cannot climb past the document root")]
    ClimbPastRoot,

    /// A container would end up holding content it may not contain.
    #[error("{container} cannot hold {content}")]
    TypeMismatch { container: String, content: String },

    /// A plain-text wrapper around content carrying marks or non-text nodes.
    #[error("{0} only accepts plain text")]
    PlainTextViolation(String),

    /// An inline-only operation was aimed at a container that is not a
    /// textblock.
    #[error("{0} is not a textblock")]
    NotTextblock(String),

    /// The two sides of a join are not adjacent compatible siblings.
    #[error("cannot join {from} and {to}")]
    NotJoinable { from: String, to: String },
}
