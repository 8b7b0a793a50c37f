//! Textual dump writer (spec.md §4.14, §6): the stable line formats a
//! caller's driver writes a finished tessellation out in. One writer
//! function per record kind, all taking `impl Write` so they compose with
//! any sink — mirrors the teacher's `io::output` module's separation of
//! record shape from sink, and is ported line-for-line from
//! `voronoi_print_grid`/`delaunay_print_tessellation` in
//! `original_source/src/voronoi3d.h`/`delaunay3d.h`.

use std::io;
use std::io::Write;

use crate::geometry::coords;
use crate::mesh::Mesh;
use crate::mesh::SimplexId;
use crate::mesh::VertexId;

/// `V\t<id>\t<x>\t<y>[\t<z>]` — one per vertex (spec.md §6).
pub fn write_vertex(mut w: impl Write, id: VertexId, mesh: &Mesh) -> io::Result<()> {
    let c = coords(mesh.vertex(id).position);
    #[cfg(feature = "2d")]
    return writeln!(w, "V\t{}\t{}\t{}", id.0, c[0], c[1]);
    #[cfg(feature = "3d")]
    writeln!(w, "V\t{}\t{}\t{}\t{}", id.0, c[0], c[1], c[2])
}

/// `T\t<v0>\t<v1>\t<v2>[\t<v3>]` — one per active simplex (spec.md §6).
pub fn write_simplex(mut w: impl Write, id: SimplexId, mesh: &Mesh) -> io::Result<()> {
    let s = mesh.simplex(id);
    #[cfg(feature = "2d")]
    return writeln!(w, "T\t{}\t{}\t{}", s.vertices[0].0, s.vertices[1].0, s.vertices[2].0);
    #[cfg(feature = "3d")]
    writeln!(
        w,
        "T\t{}\t{}\t{}\t{}",
        s.vertices[0].0, s.vertices[1].0, s.vertices[2].0, s.vertices[3].0
    )
}

/// Writes every real vertex and active, non-dummy simplex of `mesh`.
pub fn write_mesh(mut w: impl Write, mesh: &Mesh) -> io::Result<()> {
    for (id, _) in mesh.vertices.iter() {
        write_vertex(&mut w, VertexId(id), mesh)?;
    }
    for (id, s) in mesh.simplices.iter() {
        let id = SimplexId(id);
        if id.is_dummy() || !s.active {
            continue;
        }
        write_simplex(&mut w, id, mesh)?;
    }
    Ok(())
}

#[cfg(feature = "3d")]
pub use voronoi_lines::*;

#[cfg(feature = "3d")]
mod voronoi_lines {
    use std::io;
    use std::io::Write;

    use crate::geometry::coords;
    use crate::geometry::Point;
    use crate::voronoi::Cell;
    use crate::voronoi::Face;
    use crate::voronoi::FaceSide;
    use crate::voronoi::VoronoiGrid;

    /// `G\t<gx>\t<gy>\t<gz>` — optional generator echo (spec.md §6).
    pub fn write_generator(mut w: impl Write, p: Point) -> io::Result<()> {
        let c = coords(p);
        writeln!(w, "G\t{}\t{}\t{}", c[0], c[1], c[2])
    }

    /// `C\t<cx>\t<cy>\t<cz>\t<V>[\t<nface>]` — one per cell (spec.md §6).
    pub fn write_cell(mut w: impl Write, cell: &Cell, with_nface: bool) -> io::Result<()> {
        let c = coords(cell.centroid);
        if with_nface {
            writeln!(
                w,
                "C\t{}\t{}\t{}\t{}\t{}",
                c[0], c[1], c[2], cell.volume, cell.num_faces
            )
        } else {
            writeln!(w, "C\t{}\t{}\t{}\t{}", c[0], c[1], c[2], cell.volume)
        }
    }

    /// `F\t<sid>\t<area>\t<mx>\t<my>\t<mz>[\t(<vx>, <vy>, <vz>)…]` — one per
    /// face (spec.md §6). `sid` is `0` for an interior face, `1` for a
    /// boundary one, matching the original's `sid` convention.
    pub fn write_face(mut w: impl Write, face: &Face) -> io::Result<()> {
        let sid = match face.side {
            FaceSide::Interior => 0,
            FaceSide::Boundary => 1,
        };
        let m = coords(face.midpoint);
        write!(w, "F\t{}\t{}\t{}\t{}\t{}", sid, face.area, m[0], m[1], m[2])?;
        if let Some(vertices) = &face.vertices {
            for v in vertices {
                let vc = coords(*v);
                write!(w, "\t({}, {}, {})", vc[0], vc[1], vc[2])?;
            }
        }
        writeln!(w)
    }

    /// Writes every cell and face of a [`VoronoiGrid`], in that order.
    pub fn write_grid(mut w: impl Write, grid: &VoronoiGrid, with_nface: bool) -> io::Result<()> {
        for cell in &grid.cells {
            write_cell(&mut w, cell, with_nface)?;
        }
        for face in &grid.faces {
            write_face(&mut w, face)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoundingBox;
    use crate::delaunay::DelaunayTriangulation;
    use crate::geometry::Point;

    #[cfg(feature = "2d")]
    fn unit_box() -> BoundingBox {
        BoundingBox::new(Point::new(0.0, 0.0), Point::new(1.0, 1.0))
    }
    #[cfg(feature = "3d")]
    fn unit_box() -> BoundingBox {
        BoundingBox::new(Point::new(0.0, 0.0, 0.0), Point::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn write_mesh_emits_one_line_per_real_vertex_and_active_simplex() {
        let mut tri = DelaunayTriangulation::init(&unit_box());
        #[cfg(feature = "2d")]
        tri.add_vertex(Point::new(0.5, 0.5)).unwrap();
        #[cfg(feature = "3d")]
        tri.add_vertex(Point::new(0.5, 0.5, 0.5)).unwrap();

        let mut out = Vec::new();
        write_mesh(&mut out, tri.mesh()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.lines().all(|l| l.starts_with('V') || l.starts_with('T')));
        assert!(text.lines().any(|l| l.starts_with('V')));
        assert!(text.lines().any(|l| l.starts_with('T')));
    }
}
