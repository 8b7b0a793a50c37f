//! Coordinate space and exact predicates (spec.md §4.1). The crate is
//! compiled for exactly one dimension at a time, selected by the mutually
//! exclusive `2d`/`3d` Cargo features — the same convention the teacher's
//! `voronoi` module uses for its own `Point` alias.

pub mod circum;
pub mod encode;
pub mod predicates;

#[cfg(all(feature = "2d", feature = "3d"))]
compile_error!("features \"2d\" and \"3d\" are mutually exclusive");
#[cfg(not(any(feature = "2d", feature = "3d")))]
compile_error!("one of the \"2d\" or \"3d\" features must be enabled");

#[cfg(feature = "2d")]
pub type Point = glam::DVec2;
#[cfg(feature = "3d")]
pub type Point = glam::DVec3;

/// Spatial dimension of the active feature configuration.
#[cfg(feature = "2d")]
pub const DIM: usize = 2;
#[cfg(feature = "3d")]
pub const DIM: usize = 3;

/// Number of vertices in a simplex (triangle or tetrahedron) of this
/// dimension: `DIM + 1`.
pub const NUM_VERTICES: usize = DIM + 1;

/// Width, in bits, of the fixed-point mantissa used by the coordinate
/// encoder (spec.md §4, §3): the mantissa of an IEEE double.
pub const FIXED_POINT_BITS: u32 = 52;

/// Safety margin subtracted from the rescaled-coordinate upper bound so
/// that points exactly on the user box boundary still land in `[1, 2)`.
pub const RESCALE_MARGIN: f64 = 1e-13;

/// Splits a [`Point`] into its per-axis components.
pub fn coords(p: Point) -> [f64; DIM] {
    #[cfg(feature = "2d")]
    {
        [p.x, p.y]
    }
    #[cfg(feature = "3d")]
    {
        [p.x, p.y, p.z]
    }
}

/// Rebuilds a [`Point`] from per-axis components.
pub fn point_from_coords(c: [f64; DIM]) -> Point {
    #[cfg(feature = "2d")]
    {
        Point::new(c[0], c[1])
    }
    #[cfg(feature = "3d")]
    {
        Point::new(c[0], c[1], c[2])
    }
}

/// A point's coordinates, encoded into the 52-bit fixed-point integer
/// domain on which the exact predicates operate (spec.md §3, §4.1).
pub type IntPoint = [u64; DIM];
