//! Input collaborator configuration (spec.md §6): the bounding box a caller
//! establishes before `init`. Plays the same role as the teacher's
//! `SimulationBox`, but as plain coordinates rather than a dimensional-unit
//! wrapper, since spec.md treats coordinates as finite doubles, not
//! physical quantities.

use serde::Deserialize;
use serde::Serialize;

use crate::geometry::Point;

/// The enlargement factor applied to the user box before handing it to the
/// coordinate encoder, per spec.md §4.1 / §9 ("empirical cushions for
/// boundary ghosts"): 6x in 2D, 9x in 3D.
#[cfg(feature = "2d")]
pub const ENLARGEMENT: f64 = 6.0;
#[cfg(feature = "3d")]
pub const ENLARGEMENT: f64 = 9.0;

/// A bounding box: an anchor (minimum corner) and per-axis side lengths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub anchor: Point,
    pub sides: Point,
}

impl BoundingBox {
    pub fn new(anchor: Point, sides: Point) -> Self {
        Self { anchor, sides }
    }

    pub fn from_min_max(min: Point, max: Point) -> Self {
        Self {
            anchor: min,
            sides: max - min,
        }
    }

    /// Enlarges the box by `factor`, keeping the original box centered
    /// inside the enlarged one. This is the cushion applied before the
    /// super-simplex / encoder anchor is derived (spec.md §4.1, §4.3).
    pub fn enlarged(&self, factor: f64) -> Self {
        let extra = self.sides * ((factor - 1.0) / 2.0);
        Self {
            anchor: self.anchor - extra,
            sides: self.sides * factor,
        }
    }
}
