//! Maps user coordinates into the 52-bit fixed-point integer domain that
//! the exact predicates operate on (spec.md §4.1).
//!
//! A point `p` is rescaled to `1 + (p - anchor) / side`, which by
//! construction of `side` (the enlarged box shrunk by [`RESCALE_MARGIN`])
//! lies in `[1, 2)`. Because an IEEE-754 double in `[1, 2)` has exponent 0,
//! its 52-bit mantissa field *is* the fixed-point fractional part scaled by
//! `2^52` — so extracting the mantissa bits is exact and allocation-free.

use crate::config::BoundingBox;
use crate::error::TessellationError;
use crate::geometry::coords;
use crate::geometry::point_from_coords;
use crate::geometry::IntPoint;
use crate::geometry::Point;
use crate::geometry::DIM;
use crate::geometry::FIXED_POINT_BITS;
use crate::geometry::RESCALE_MARGIN;

/// Anchor and inverse scale used to rescale user coordinates into `[1, 2)`
/// before extracting their fixed-point mantissa.
#[derive(Debug, Clone, Copy)]
pub struct Encoder {
    anchor: [f64; DIM],
    inv_side: [f64; DIM],
}

impl Encoder {
    /// Builds an encoder from an already-enlarged bounding box (see
    /// [`BoundingBox::enlarged`] and spec.md §4.1/§4.3).
    pub fn new(enlarged_box: &BoundingBox) -> Self {
        let anchor = coords(enlarged_box.anchor);
        let sides = coords(enlarged_box.sides);
        let mut inv_side = [0.0; DIM];
        for i in 0..DIM {
            debug_assert!(sides[i] > 0.0, "bounding box has non-positive side length");
            inv_side[i] = (1.0 - RESCALE_MARGIN) / sides[i];
        }
        Self { anchor, inv_side }
    }

    /// Rescales `p` into `[1, 2)^DIM` without extracting the fixed-point
    /// mantissa. Exposed for callers (e.g. debug float-predicate
    /// cross-checks) that want the rescaled representation.
    pub fn rescale(&self, p: Point) -> [f64; DIM] {
        let c = coords(p);
        let mut out = [0.0; DIM];
        for i in 0..DIM {
            out[i] = 1.0 + (c[i] - self.anchor[i]) * self.inv_side[i];
        }
        out
    }

    /// Converts a user point into its authoritative fixed-point integer
    /// coordinates, failing with [`TessellationError::OutOfBounds`] if any
    /// rescaled axis falls outside `[1, 2)` (spec.md §7, kind 1).
    pub fn to_integer(&self, p: Point) -> Result<IntPoint, TessellationError> {
        let rescaled = self.rescale(p);
        let mut out = [0u64; DIM];
        for i in 0..DIM {
            if !(1.0..2.0).contains(&rescaled[i]) {
                return Err(TessellationError::OutOfBounds {
                    point: coords(p).to_vec(),
                    axis: i,
                });
            }
            out[i] = mantissa_bits(rescaled[i]);
        }
        Ok(out)
    }

    /// The anchor this encoder was constructed with, in user coordinates.
    pub fn anchor(&self) -> Point {
        point_from_coords(self.anchor)
    }
}

fn mantissa_bits(x: f64) -> u64 {
    debug_assert!((1.0..2.0).contains(&x));
    let mask = (1u64 << FIXED_POINT_BITS) - 1;
    x.to_bits() & mask
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "2d")]
    fn unit_box() -> BoundingBox {
        BoundingBox::new(Point::new(0.0, 0.0), Point::new(1.0, 1.0))
    }
    #[cfg(feature = "3d")]
    fn unit_box() -> BoundingBox {
        BoundingBox::new(Point::new(0.0, 0.0, 0.0), Point::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn anchor_maps_to_one() {
        let enc = Encoder::new(&unit_box());
        let rescaled = enc.rescale(enc.anchor());
        for v in rescaled {
            assert_eq!(v, 1.0);
        }
    }

    #[test]
    fn in_bounds_point_encodes() {
        let enc = Encoder::new(&unit_box());
        #[cfg(feature = "2d")]
        let p = Point::new(0.5, 0.25);
        #[cfg(feature = "3d")]
        let p = Point::new(0.5, 0.25, 0.75);
        assert!(enc.to_integer(p).is_ok());
    }

    #[test]
    fn out_of_bounds_point_errors() {
        let enc = Encoder::new(&unit_box());
        #[cfg(feature = "2d")]
        let p = Point::new(10.0, 0.25);
        #[cfg(feature = "3d")]
        let p = Point::new(10.0, 0.25, 0.75);
        assert!(matches!(
            enc.to_integer(p),
            Err(TessellationError::OutOfBounds { axis: 0, .. })
        ));
    }

    #[test]
    fn distinct_points_encode_distinctly() {
        let enc = Encoder::new(&unit_box());
        #[cfg(feature = "2d")]
        let (p, q) = (Point::new(0.3, 0.3), Point::new(0.300001, 0.3));
        #[cfg(feature = "3d")]
        let (p, q) = (
            Point::new(0.3, 0.3, 0.3),
            Point::new(0.300001, 0.3, 0.3),
        );
        assert_ne!(enc.to_integer(p).unwrap(), enc.to_integer(q).unwrap());
    }
}
