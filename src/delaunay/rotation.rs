//! Rotation around a Delaunay edge in 3D (spec.md §4.6). Used by the 3D
//! builder to enumerate the fan of tetrahedra sharing an edge (for the
//! edge-incident insertion case and for 4-4/3-2 flip detection) and by
//! Voronoi face construction to walk the dual polygon of an edge.
//!
//! Grounded on the same "rotate around an edge via neighbor stepping"
//! idea as the teacher's 2D `Tetra::get_all_tetras_with_vertex`, lifted
//! to 3D: a fan of tetrahedra sharing edge `(a0, a1)` is a cycle, and
//! stepping to the next tetrahedron only requires remembering which of
//! the two non-axis vertices was reached most recently.

use crate::mesh::Mesh;
use crate::mesh::SimplexId;
use crate::mesh::VertexId;

/// One step of the fan: the tetrahedron itself and the non-axis vertex
/// that was *not* shared with the previous step (the vertex the walk
/// just rotated onto).
#[derive(Debug, Clone, Copy)]
pub struct FanStep {
    pub tetra: SimplexId,
    pub far_vertex: VertexId,
}

/// Walks the full fan of tetrahedra sharing edge `(a0, a1)`, starting
/// from `start` (which must contain both). Returns one [`FanStep`] per
/// tetrahedron in traversal order, ending when the walk returns to
/// `start`.
pub fn rotate_around_edge(mesh: &Mesh, start: SimplexId, a0: VertexId, a1: VertexId) -> Vec<FanStep> {
    let mut steps = Vec::new();
    let mut current = start;
    let mut prev_vertex: Option<VertexId> = None;

    loop {
        let s = mesh.simplex(current);
        let others: Vec<usize> = (0..4)
            .filter(|&i| s.vertices[i] != a0 && s.vertices[i] != a1)
            .collect();
        debug_assert_eq!(others.len(), 2, "edge (a0, a1) is not shared by this tetrahedron");

        let (stale_slot, far_vertex) = match prev_vertex {
            None => (others[0], s.vertices[others[1]]),
            Some(pv) => {
                if s.vertices[others[0]] == pv {
                    (others[0], s.vertices[others[1]])
                } else {
                    (others[1], s.vertices[others[0]])
                }
            }
        };

        steps.push(FanStep {
            tetra: current,
            far_vertex,
        });

        let next = s.neighbors[stale_slot];
        if next == start {
            break;
        }
        prev_vertex = Some(far_vertex);
        current = next;

        if steps.len() > mesh.simplices.len() {
            // A malformed mesh could otherwise loop forever; this can only
            // trip if neighbor symmetry (I2) has already been violated.
            break;
        }
    }

    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoundingBox;
    use crate::delaunay::DelaunayTriangulation;
    use crate::geometry::Point;

    #[test]
    fn rotation_returns_to_start_around_bootstrap_edge() {
        let box_ = BoundingBox::new(Point::new(0.0, 0.0, 0.0), Point::new(1.0, 1.0, 1.0));
        let tri = DelaunayTriangulation::init(&box_);
        let mesh = tri.mesh();
        // The bootstrap's single real tetrahedron has vertices 0..3; any
        // edge of it is shared only by itself among active tetrahedra.
        let real = crate::mesh::SimplexId(4);
        let a0 = mesh.simplex(real).vertices[0];
        let a1 = mesh.simplex(real).vertices[1];
        let fan = rotate_around_edge(mesh, real, a0, a1);
        assert_eq!(fan.len(), 1);
        assert_eq!(fan[0].tetra, real);
    }
}
