//! Error surface for the tessellation crate (spec.md §7).
//!
//! All fallible builder entry points return [`Result<T, TessellationError>`].
//! Internal consistency breaks (arena indices that should always be valid)
//! stay as `debug_assert!`/indexing panics rather than error variants, the
//! same split the teacher crate makes between `Result<_, PrecisionError>`
//! for geometric predicates and `unwrap()`/`panic!` for bookkeeping that a
//! correct caller can never violate.

use thiserror::Error;

use crate::mesh::SimplexId;
use crate::mesh::VertexId;

/// The four error kinds of spec.md §7. Capacity exhaustion is deliberately
/// absent: it is always recovered by arena growth and never surfaces here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TessellationError {
    /// A point's rescaled coordinate fell outside `[1, 2)`; the bounding
    /// box passed to the encoder does not actually enclose the point.
    #[error("point {point:?} is out of bounds on axis {axis} (rescaled coordinate left [1, 2))")]
    OutOfBounds { point: Vec<f64>, axis: usize },

    /// A colinear/coplanar simplex, a duplicate point, or a predicate
    /// result inconsistent with any lawful geometric case was found during
    /// location or the flip cascade.
    #[error("degenerate configuration at simplex {simplex:?} (vertices {vertices:?}): {reason}")]
    Degenerate {
        simplex: Option<SimplexId>,
        vertices: Vec<VertexId>,
        reason: String,
    },

    /// The optional integrity-check sweep (spec.md §9) found a broken
    /// invariant. This always indicates a builder bug, not bad input.
    #[error("invariant violation: {detail}")]
    InvariantViolation { detail: String },
}

pub type Result<T> = std::result::Result<T, TessellationError>;
