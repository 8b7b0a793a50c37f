//! Exact-predicate incremental Delaunay/Voronoi tessellation (spec.md
//! §OVERVIEW). Built for exactly one dimension at a time via the mutually
//! exclusive `2d`/`3d` Cargo features; see [`geometry`] for the guard.

pub mod arena;
pub mod config;
pub mod delaunay;
pub mod dump;
pub mod error;
pub mod geometry;
pub mod mesh;

#[cfg(feature = "3d")]
pub mod voronoi;

pub mod prelude;
