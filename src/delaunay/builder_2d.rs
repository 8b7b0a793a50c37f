//! Incremental 2D Delaunay builder (spec.md §4.3, §4.4). Grounded on the
//! teacher's `delaunay/impl_2d.rs` for the overall shape of a "locate,
//! split, restore" insertion loop and its point-location coin flip, but
//! rebuilt around exact integer predicates and explicit neighbor-index
//! arrays instead of the teacher's floating-point `Result<bool,
//! PrecisionError>` predicates and `generational_arena` handles.

use log::debug;
use log::trace;
use log::warn;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use crate::config::BoundingBox;
use crate::config::ENLARGEMENT;
use crate::error::Result;
use crate::error::TessellationError;
use crate::geometry::encode::Encoder;
use crate::geometry::predicates::in_sphere;
use crate::geometry::predicates::orient;
use crate::geometry::coords;
use crate::geometry::point_from_coords;
use crate::geometry::Point;
use crate::mesh::Mesh;
use crate::mesh::Simplex;
use crate::mesh::SimplexId;
use crate::mesh::Vertex;
use crate::mesh::VertexId;
use crate::mesh::DUMMY_TIP;

/// Where point location landed (spec.md §4.4 step 1).
enum Located {
    /// Strictly inside this triangle.
    Interior(SimplexId),
    /// Exactly on the edge opposite `vertices[edge]` of this triangle.
    OnEdge(SimplexId, usize),
}

/// Incremental 2D Delaunay triangulation builder.
pub struct DelaunayTriangulation {
    mesh: Mesh,
    encoder: Encoder,
    last_simplex: SimplexId,
    rng: StdRng,
    checked: bool,
    ghost_offset: Option<u32>,
}

impl DelaunayTriangulation {
    /// Bootstraps the mesh: enlarges `user_box`, derives the coordinate
    /// encoder from it, inserts the super-triangle's three vertices, and
    /// wires the three permanent dummy triangles opposite its edges
    /// (spec.md §4.3).
    pub fn init(user_box: &BoundingBox) -> Self {
        let enlarged = user_box.enlarged(ENLARGEMENT);
        let encoder = Encoder::new(&enlarged);
        let mut mesh = Mesh::new();

        let corners = super_triangle(&enlarged);
        let mut vertex_ids = [VertexId(0); 3];
        for (i, p) in corners.into_iter().enumerate() {
            let fp = encoder
                .to_integer(p)
                .expect("super-triangle vertices must lie inside the enlarged box");
            let rescaled = encoder.rescale(p);
            vertex_ids[i] = mesh.push_vertex(Vertex::new(p, rescaled, fp));
        }

        // Three dummy triangles occupy indices [0, 2] (spec.md §3).
        for _ in 0..3 {
            mesh.new_simplex();
        }
        let real = mesh.new_simplex();
        debug_assert_eq!(real.0, 3, "the first real triangle must be index 3");

        let fp = |id: VertexId| mesh.vertex(id).fixed_point;
        let sign = orient(fp(vertex_ids[0]), fp(vertex_ids[1]), fp(vertex_ids[2]));
        if sign < 0 {
            vertex_ids.swap(1, 2);
        }
        mesh.init_simplex(real, vertex_ids);

        for i in 0..3 {
            let dummy = SimplexId(i as u32);
            let mut dummy_verts = vertex_ids;
            dummy_verts[i] = DUMMY_TIP;
            mesh.init_simplex(dummy, dummy_verts);
            mesh.link(real, i, dummy, i);
            for j in 0..3 {
                if j != i {
                    mesh.link(dummy, j, dummy, j);
                }
            }
        }

        Self {
            mesh,
            encoder,
            last_simplex: real,
            rng: StdRng::from_entropy(),
            checked: false,
            ghost_offset: None,
        }
    }

    /// Replaces the location coin flip's source of randomness with a seeded
    /// generator, for deterministic runs (spec.md §5, §9).
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Enables the optional integrity-check sweep after every insertion
    /// (spec.md §9's runtime toggle).
    pub fn with_integrity_checks(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Number of real vertices inserted before `consolidate` was called, or
    /// the total real-vertex count if it has not been called yet.
    pub fn ghost_offset(&self) -> Option<u32> {
        self.ghost_offset
    }

    /// Marks the end of "real" insertions (spec.md §4.8). All vertices
    /// inserted afterwards are ghosts.
    pub fn consolidate(&mut self) {
        debug!("consolidating at {} vertices", self.mesh.vertices.len());
        self.ghost_offset = Some(self.mesh.vertices.len() as u32);
    }

    /// The ids of real (non-super-triangle, non-ghost) vertices: those
    /// inserted between bootstrap and (if called) `consolidate` (spec.md
    /// §4.8, §6 — "vertex IDs are assigned in stream order starting after
    /// the super-simplex vertices").
    pub fn real_vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        let end = self.ghost_offset.unwrap_or(self.mesh.vertices.len() as u32);
        (crate::geometry::NUM_VERTICES as u32..end).map(VertexId)
    }

    /// Recomputes the search radius (spec.md §4.7) of every vertex whose
    /// current radius exceeds `threshold`, returning how many still exceed
    /// it afterwards. Drives the ghost-population iteration used by
    /// callers to ensure all relevant periodic/boundary neighbors have been
    /// added.
    pub fn update_search_radii(&mut self, threshold: f64) -> usize {
        let mut exceeding = 0;
        let ids: Vec<VertexId> = (0..self.mesh.vertices.len() as u32)
            .map(VertexId)
            .filter(|&v| self.mesh.vertex(v).search_radius > threshold)
            .collect();
        for v in ids {
            let r = self.search_radius_of(v);
            self.mesh.vertex_mut(v).search_radius = r;
            if r > threshold {
                exceeding += 1;
            }
        }
        debug!(
            "update_search_radii(threshold={}): {} vertices still exceed it",
            threshold, exceeding
        );
        exceeding
    }

    fn search_radius_of(&self, v: VertexId) -> f64 {
        self.mesh
            .incident_simplices(v)
            .into_iter()
            .map(|t| 2.0 * self.circumradius(t))
            .fold(0.0, f64::max)
    }

    fn circumradius(&self, t: SimplexId) -> f64 {
        let s = self.mesh.simplex(t);
        let p = s.vertices.map(|v| self.mesh.vertex(v).position);
        crate::geometry::circum::circumradius(p)
    }

    /// Inserts one point, returning its new vertex id (spec.md §4.4).
    pub fn add_vertex(&mut self, p: Point) -> Result<VertexId> {
        let fp = self.encoder.to_integer(p)?;
        let rescaled = self.encoder.rescale(p);
        let v = self.mesh.push_vertex(Vertex::new(p, rescaled, fp));

        let located = self.locate(v)?;
        let mut queue = Vec::new();
        match located {
            Located::Interior(t) => self.split_interior(t, v, &mut queue),
            Located::OnEdge(t, edge) => self.split_on_edge(t, edge, v, &mut queue)?,
        }
        // Any triangle produced by the split still contains v after the
        // flip cascade (flips around v always keep v at slot 2), so it
        // remains a valid locate seed regardless of how the cascade
        // rewrites its neighbors.
        self.last_simplex = queue[0];
        self.restore(&mut queue)?;

        if self.checked {
            self.check_integrity()?;
        }
        Ok(v)
    }

    fn locate(&mut self, v: VertexId) -> Result<Located> {
        let target = self.mesh.vertex(v).fixed_point;
        let mut current = self.last_simplex;
        loop {
            let s = *self.mesh.simplex(current);
            let mut signs = [0i32; 3];
            for i in 0..3 {
                let a = self.mesh.vertex(s.vertices[(i + 1) % 3]).fixed_point;
                let b = self.mesh.vertex(s.vertices[(i + 2) % 3]).fixed_point;
                signs[i] = orient(a, b, target);
            }
            let outside: Vec<usize> = (0..3).filter(|&i| signs[i] < 0).collect();
            match outside.len() {
                0 => {
                    let on_edges: Vec<usize> = (0..3).filter(|&i| signs[i] == 0).collect();
                    return match on_edges.len() {
                        0 => Ok(Located::Interior(current)),
                        1 => Ok(Located::OnEdge(current, on_edges[0])),
                        _ => Err(TessellationError::Degenerate {
                            simplex: Some(current),
                            vertices: vec![v],
                            reason: "inserted point coincides with an existing vertex".into(),
                        }),
                    };
                }
                1 => current = s.neighbors[outside[0]],
                2 => {
                    let choice = if self.rng.gen() { outside[0] } else { outside[1] };
                    current = s.neighbors[choice];
                }
                _ => {
                    return Err(TessellationError::Degenerate {
                        simplex: Some(current),
                        vertices: s.vertices.to_vec(),
                        reason: "point lies outside all three edges of its locate target".into(),
                    })
                }
            }
        }
    }

    /// 1->3 split (spec.md §4.4 step 2, interior case).
    fn split_interior(&mut self, t: SimplexId, v: VertexId, queue: &mut Vec<SimplexId>) {
        let old = *self.mesh.simplex(t);
        let mut new_ids = [t, SimplexId(0), SimplexId(0)];
        new_ids[1] = self.mesh.new_simplex();
        new_ids[2] = self.mesh.new_simplex();

        for i in 0..3 {
            let x = old.vertices[(i + 1) % 3];
            let y = old.vertices[(i + 2) % 3];
            self.mesh.init_simplex(new_ids[i], [x, y, v]);
        }
        for i in 0..3 {
            let ext_slot = old.index_in_neighbor[i] as usize;
            let ext = old.neighbors[i];
            self.mesh.link(new_ids[i], 2, ext, ext_slot);
            self.mesh.link(new_ids[i], 0, new_ids[(i + 1) % 3], 1);
        }
        trace!("1->3 split of {:?} around vertex {:?}", t, v);
        queue.extend_from_slice(&new_ids);
    }

    /// 2->4 split (spec.md §4.4 step 2, on-edge case).
    fn split_on_edge(
        &mut self,
        t: SimplexId,
        edge: usize,
        v: VertexId,
        queue: &mut Vec<SimplexId>,
    ) -> Result<()> {
        let told = *self.mesh.simplex(t);
        let n_id = told.neighbors[edge];
        if n_id.is_dummy() {
            return Err(TessellationError::Degenerate {
                simplex: Some(t),
                vertices: vec![v],
                reason: "point lies on the boundary edge of the super-triangle".into(),
            });
        }
        let nold = *self.mesh.simplex(n_id);
        let m = told.index_in_neighbor[edge] as usize;

        let r = told.vertices[edge];
        let p = told.vertices[(edge + 1) % 3];
        let q = told.vertices[(edge + 2) % 3];
        let s = nold.vertices[m];

        let t1 = t;
        let t2 = self.mesh.new_simplex();
        let t3 = n_id;
        let t4 = self.mesh.new_simplex();

        self.mesh.init_simplex(t1, [r, p, v]);
        self.mesh.init_simplex(t2, [q, r, v]);
        self.mesh.init_simplex(t3, [s, q, v]);
        self.mesh.init_simplex(t4, [p, s, v]);

        self.mesh.link(t1, 0, t4, 1);
        self.mesh.link(t1, 1, t2, 0);
        self.mesh.link(
            t1,
            2,
            told.neighbors[(edge + 2) % 3],
            told.index_in_neighbor[(edge + 2) % 3] as usize,
        );

        self.mesh.link(t2, 1, t3, 0);
        self.mesh.link(
            t2,
            2,
            told.neighbors[(edge + 1) % 3],
            told.index_in_neighbor[(edge + 1) % 3] as usize,
        );

        self.mesh.link(t3, 1, t4, 0);
        self.mesh.link(
            t3,
            2,
            nold.neighbors[(m + 2) % 3],
            nold.index_in_neighbor[(m + 2) % 3] as usize,
        );

        self.mesh.link(
            t4,
            2,
            nold.neighbors[(m + 1) % 3],
            nold.index_in_neighbor[(m + 1) % 3] as usize,
        );

        trace!("2->4 split of {:?}/{:?} around vertex {:?}", t, n_id, v);
        queue.extend_from_slice(&[t1, t2, t3, t4]);
        Ok(())
    }

    /// Flip cascade (spec.md §4.4 step 3).
    fn restore(&mut self, queue: &mut Vec<SimplexId>) -> Result<()> {
        while let Some(t_id) = queue.pop() {
            let t = *self.mesh.simplex(t_id);
            let n_id = t.neighbors[2];
            if n_id.is_dummy() {
                continue;
            }
            let n = *self.mesh.simplex(n_id);
            let m = t.index_in_neighbor[2] as usize;
            let w = n.vertices[m];

            let fp = |id: VertexId| self.mesh.vertex(id).fixed_point;
            let sign = in_sphere(fp(t.vertices[0]), fp(t.vertices[1]), fp(t.vertices[2]), fp(w));
            if sign > 0 {
                trace!("edge flip between {:?} and {:?}", t_id, n_id);
                self.flip_edge(t_id, n_id, queue);
            }
        }
        Ok(())
    }

    fn flip_edge(&mut self, t_id: SimplexId, n_id: SimplexId, queue: &mut Vec<SimplexId>) {
        let t = *self.mesh.simplex(t_id);
        let n = *self.mesh.simplex(n_id);
        let m = t.index_in_neighbor[2] as usize;

        let a = t.vertices[0];
        let b = t.vertices[1];
        let v = t.vertices[2];
        let w = n.vertices[m];

        let nt1 = t_id;
        let nt2 = n_id;
        self.mesh.init_simplex(nt1, [a, w, v]);
        self.mesh.init_simplex(nt2, [w, b, v]);

        self.mesh.link(nt1, 0, nt2, 1);
        self.mesh.link(
            nt1,
            1,
            t.neighbors[1],
            t.index_in_neighbor[1] as usize,
        );
        self.mesh.link(
            nt1,
            2,
            n.neighbors[(m + 1) % 3],
            n.index_in_neighbor[(m + 1) % 3] as usize,
        );

        self.mesh.link(
            nt2,
            0,
            t.neighbors[0],
            t.index_in_neighbor[0] as usize,
        );
        self.mesh.link(
            nt2,
            2,
            n.neighbors[(m + 2) % 3],
            n.index_in_neighbor[(m + 2) % 3] as usize,
        );

        queue.push(nt1);
        queue.push(nt2);
    }

    /// Verifies invariants I1-I4 over every active, non-dummy triangle
    /// (spec.md §8, §9).
    pub fn check_integrity(&self) -> Result<()> {
        for (id, s) in self.mesh.simplices.iter() {
            let id = SimplexId(id);
            if id.is_dummy() {
                continue;
            }
            let fp = |v: VertexId| self.mesh.vertex(v).fixed_point;
            if orient(fp(s.vertices[0]), fp(s.vertices[1]), fp(s.vertices[2])) <= 0 {
                warn!("triangle {:?} is not positively oriented", id);
                return Err(TessellationError::InvariantViolation {
                    detail: format!("triangle {:?} is not positively oriented", id),
                });
            }
            for i in 0..3 {
                let n_id = s.neighbors[i];
                if n_id.is_dummy() {
                    continue;
                }
                let n = self.mesh.simplex(n_id);
                let back = s.index_in_neighbor[i] as usize;
                if n.neighbors[back] != id || n.index_in_neighbor[back] as usize != i {
                    return Err(TessellationError::InvariantViolation {
                        detail: format!("neighbor symmetry broken between {:?} and {:?}", id, n_id),
                    });
                }
            }
        }
        Ok(())
    }
}

/// A triangle strictly enclosing `box_` (spec.md §4.1, §4.3): a right
/// triangle with legs three times the box's own extent past its far
/// corner, comfortably covering the axis-aligned box on both axes.
fn super_triangle(box_: &BoundingBox) -> [Point; 3] {
    let a = coords(box_.anchor);
    let s = coords(box_.sides);
    [
        point_from_coords([a[0] - s[0], a[1] - s[1]]),
        point_from_coords([a[0] + 3.0 * s[0], a[1] - s[1]]),
        point_from_coords([a[0] - s[0], a[1] + 3.0 * s[1]]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_box() -> BoundingBox {
        BoundingBox::new(Point::new(0.0, 0.0), Point::new(1.0, 1.0))
    }

    #[test]
    fn bootstrap_has_one_real_triangle() {
        let tri = DelaunayTriangulation::init(&small_box());
        let active_real = tri
            .mesh()
            .simplices
            .iter()
            .filter(|(id, _)| !SimplexId(*id).is_dummy())
            .count();
        assert_eq!(active_real, 1);
    }

    #[test]
    fn single_interior_point_yields_three_triangles() {
        let mut tri = DelaunayTriangulation::init(&small_box()).with_seed(1);
        tri.add_vertex(Point::new(0.5, 0.5)).unwrap();
        let active_real = tri
            .mesh()
            .simplices
            .iter()
            .filter(|(id, _)| !SimplexId(*id).is_dummy())
            .count();
        assert_eq!(active_real, 3);
        tri.check_integrity().unwrap();
    }

    #[test]
    fn grid_of_four_points_stays_delaunay() {
        let mut tri = DelaunayTriangulation::init(&small_box()).with_seed(7);
        for p in [
            Point::new(0.2, 0.2),
            Point::new(0.8, 0.2),
            Point::new(0.2, 0.8),
            Point::new(0.8, 0.8),
        ] {
            tri.add_vertex(p).unwrap();
        }
        tri.check_integrity().unwrap();
    }

    #[test]
    fn out_of_bounds_point_is_rejected() {
        let mut tri = DelaunayTriangulation::init(&small_box());
        assert!(tri.add_vertex(Point::new(100.0, 100.0)).is_err());
    }
}
