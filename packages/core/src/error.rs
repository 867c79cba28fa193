//! Construction-time invariant failures.

use thiserror::Error;

use crate::shape_id::ShapeId;

/// A graph or event that would break a structural invariant.
///
/// Raised only while building a [`ShapeIndex`](crate::ShapeIndex) or a
/// [`ValidationEvent`](crate::ValidationEvent); nothing partially built is
/// ever returned alongside it.
#[derive(Debug, Error, PartialEq)]
pub enum InvariantViolation {
    #[error("shape {0} is defined more than once")]
    DuplicateShape(ShapeId),

    #[error("member shape {0} must have a member name in its id")]
    MemberWithoutMemberName(ShapeId),

    #[error("shape {0} has a member name in its id but is not a member shape")]
    UnexpectedMemberName(ShapeId),

    #[error("member {0} has no containing shape in the index")]
    OrphanedMember(ShapeId),

    #[error("member {member} is not declared by its container {container}")]
    UndeclaredMember { container: ShapeId, member: ShapeId },

    #[error("{container} declares member {member:?} but no such member shape exists")]
    MissingMember { container: ShapeId, member: String },

    #[error("{container} declares member {member:?} more than once")]
    DuplicateMember { container: ShapeId, member: String },

    #[error("invalid member name {member:?} declared by {container}")]
    InvalidMemberName { container: ShapeId, member: String },

    #[error("a suppression reason must only be provided for SUPPRESSED events")]
    SuppressionReasonOnUnsuppressed,

    #[error("validation event is missing required field `{0}`")]
    MissingEventField(&'static str),
}
