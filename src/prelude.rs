//! The small set of names a caller needs to build a triangulation, extract
//! its Voronoi dual, and dump both out (spec.md §OVERVIEW).

pub use crate::config::BoundingBox;
pub use crate::delaunay::DelaunayTriangulation;
pub use crate::error::Result;
pub use crate::error::TessellationError;
pub use crate::geometry::Point;
pub use crate::mesh::Mesh;
pub use crate::mesh::SimplexId;
pub use crate::mesh::VertexId;

#[cfg(feature = "3d")]
pub use crate::voronoi::extract as extract_voronoi;
#[cfg(feature = "3d")]
pub use crate::voronoi::Cell as VoronoiCell;
#[cfg(feature = "3d")]
pub use crate::voronoi::Face as VoronoiFace;
#[cfg(feature = "3d")]
pub use crate::voronoi::FaceSide;
#[cfg(feature = "3d")]
pub use crate::voronoi::VoronoiGrid;
