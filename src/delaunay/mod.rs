//! Incremental Delaunay construction (spec.md §4.3-§4.6). Exposes exactly
//! one [`DelaunayTriangulation`] type, built from the 2D or 3D module
//! according to whichever of the mutually exclusive `2d`/`3d` features is
//! active — callers never see the dimension split directly.

#[cfg(feature = "2d")]
mod builder_2d;
#[cfg(feature = "3d")]
mod builder_3d;
#[cfg(feature = "3d")]
pub mod rotation;

#[cfg(feature = "2d")]
pub use builder_2d::DelaunayTriangulation;
#[cfg(feature = "3d")]
pub use builder_3d::DelaunayTriangulation;
