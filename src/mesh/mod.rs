//! Mesh primitives (spec.md §3, §4.2): vertices, simplices (triangles in
//! 2D, tetrahedra in 3D), and the arena-backed storage that owns them.
//! Grounded on the teacher's `voronoi::Point3d`/`Tetra` pairing in shape
//! (newtype ids + plain aggregate records) but restructured around
//! explicit neighbor-index arrays instead of `generational_arena::Index`
//! handles, since spec.md's invariants (I2, I5) are phrased directly in
//! terms of index-in-neighbor backpointers.

use derive_more::From;
use derive_more::Into;

use crate::arena::Arena;
use crate::geometry::IntPoint;
use crate::geometry::Point;
use crate::geometry::DIM;
use crate::geometry::NUM_VERTICES;

/// Identity of a vertex: a plain index into [`Mesh::vertices`], assigned at
/// insertion and never reused (spec.md §3, §4.2 — "vertex allocation never
/// recycles").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, From, Into)]
pub struct VertexId(pub u32);

/// Sentinel vertex slot used by a dummy simplex's single invalid "tip"
/// vertex (spec.md §4.3, glossary "Dummy"). No real vertex ever carries
/// this id.
pub const DUMMY_TIP: VertexId = VertexId(u32::MAX);

/// Identity of a simplex: a plain index into [`Mesh::simplices`]. Indices
/// `[0, DIM]` are always the permanent dummy simplices (spec.md §3,
/// glossary "Dummy").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, From, Into)]
pub struct SimplexId(pub u32);

impl SimplexId {
    /// Whether this id names one of the `DIM + 1` permanent dummy slots.
    pub fn is_dummy(self) -> bool {
        (self.0 as usize) < NUM_VERTICES
    }
}

/// A mesh vertex (spec.md §3): the point itself in three coordinate
/// representations, plus a back-link into the simplex arena used to find
/// any simplex incident to it in O(1).
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Point,
    pub rescaled: [f64; DIM],
    pub fixed_point: IntPoint,
    /// A simplex that contains this vertex, and the slot (0..=DIM) at
    /// which it appears there (spec.md §3, invariant I4).
    pub back_link: SimplexId,
    pub slot_in_simplex: u8,
    /// Twice the largest circumradius among incident simplices; `f64::MAX`
    /// until first computed (spec.md §4.7).
    pub search_radius: f64,
}

impl Vertex {
    pub fn new(position: Point, rescaled: [f64; DIM], fixed_point: IntPoint) -> Self {
        Self {
            position,
            rescaled,
            fixed_point,
            back_link: SimplexId(0),
            slot_in_simplex: 0,
            search_radius: f64::MAX,
        }
    }
}

/// A simplex: triangle (`DIM == 2`) or tetrahedron (`DIM == 3`). Vertex,
/// neighbor, and index-in-neighbor tuples all have length `NUM_VERTICES`
/// (spec.md §3).
#[derive(Debug, Clone, Copy)]
pub struct Simplex {
    pub vertices: [VertexId; NUM_VERTICES],
    pub neighbors: [SimplexId; NUM_VERTICES],
    pub index_in_neighbor: [u8; NUM_VERTICES],
    /// 3D only: cleared by a 3→2 flip that vacates this slot; ignored in
    /// 2D, where slots are never vacated (spec.md §3).
    pub active: bool,
}

impl Simplex {
    /// A simplex record with every field zeroed/inactive; used only as a
    /// placeholder immediately before `init` overwrites it.
    fn empty() -> Self {
        Self {
            vertices: [VertexId(0); NUM_VERTICES],
            neighbors: [SimplexId(0); NUM_VERTICES],
            index_in_neighbor: [0; NUM_VERTICES],
            active: true,
        }
    }

    /// Returns the slot (0..NUM_VERTICES) at which `v` appears, if any.
    pub fn slot_of(&self, v: VertexId) -> Option<usize> {
        self.vertices.iter().position(|&x| x == v)
    }

    /// Returns the slot at which neighbor `n` appears, if any.
    pub fn neighbor_slot(&self, n: SimplexId) -> Option<usize> {
        self.neighbors.iter().position(|&x| x == n)
    }
}

/// Owns the vertex and simplex arenas and implements the low-level
/// bookkeeping operations of spec.md §4.2 that both dimensions' builders
/// share: neighbor swaps, simplex init, and vertex/simplex allocation.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Arena<Vertex>,
    pub simplices: Arena<Simplex>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex(&self, id: VertexId) -> &Vertex {
        self.vertices.get(id.0)
    }

    pub fn vertex_mut(&mut self, id: VertexId) -> &mut Vertex {
        self.vertices.get_mut(id.0)
    }

    pub fn simplex(&self, id: SimplexId) -> &Simplex {
        self.simplices.get(id.0)
    }

    pub fn simplex_mut(&mut self, id: SimplexId) -> &mut Simplex {
        self.simplices.get_mut(id.0)
    }

    /// Appends a new vertex; vertex ids are never reused (spec.md §4.2).
    pub fn push_vertex(&mut self, vertex: Vertex) -> VertexId {
        VertexId(self.vertices.push(vertex))
    }

    /// Allocates a new simplex slot, reusing a freelist entry when one is
    /// available (spec.md §4.2 — "next unused slot, or a popped freelist
    /// slot"). 2D builders never free slots, so this always appends there.
    pub fn new_simplex(&mut self) -> SimplexId {
        SimplexId(self.simplices.alloc(Simplex::empty()))
    }

    /// Vacates `id`'s slot onto the freelist after a 3→2 flip (3D only).
    pub fn free_simplex(&mut self, id: SimplexId) {
        self.simplex_mut(id).active = false;
        self.simplices.free(id.0);
    }

    /// Writes `vertices` into simplex `id`, marks it active, and (3D only)
    /// refreshes each listed vertex's back-link to point at `id` (spec.md
    /// §4.2 — "init... in 3D, refreshes each vertex's back-link").
    pub fn init_simplex(&mut self, id: SimplexId, vertices: [VertexId; NUM_VERTICES]) {
        {
            let s = self.simplex_mut(id);
            s.vertices = vertices;
            s.active = true;
        }
        #[cfg(feature = "3d")]
        for (slot, &v) in vertices.iter().enumerate() {
            if v != DUMMY_TIP {
                let vertex = self.vertex_mut(v);
                vertex.back_link = id;
                vertex.slot_in_simplex = slot as u8;
            }
        }
    }

    /// Writes both the neighbor id and index-in-neighbor for `slot` of
    /// `s` in one call (spec.md §4.2).
    pub fn swap_neighbor(&mut self, s: SimplexId, slot: usize, new_ngb: SimplexId, new_slot: usize) {
        let simplex = self.simplex_mut(s);
        simplex.neighbors[slot] = new_ngb;
        simplex.index_in_neighbor[slot] = new_slot as u8;
    }

    /// Applies `swap_neighbor` for all `NUM_VERTICES` slots of `s` at once
    /// (spec.md §4.2 — `swap_neighbors_bulk`).
    pub fn swap_neighbors_bulk(
        &mut self,
        s: SimplexId,
        neighbors: [SimplexId; NUM_VERTICES],
        index_in_neighbor: [u8; NUM_VERTICES],
    ) {
        let simplex = self.simplex_mut(s);
        simplex.neighbors = neighbors;
        simplex.index_in_neighbor = index_in_neighbor;
    }

    /// Connects `a`'s slot `slot_a` and `b`'s slot `slot_b` as mutual
    /// neighbors, keeping invariant I2 intact in one call.
    pub fn link(&mut self, a: SimplexId, slot_a: usize, b: SimplexId, slot_b: usize) {
        self.swap_neighbor(a, slot_a, b, slot_b);
        self.swap_neighbor(b, slot_b, a, slot_a);
    }

    /// Every active, non-dummy simplex incident to `v` (spec.md §4.7,
    /// §4.9): a simplex containing `v` at slot `s` can only neighbor other
    /// simplices containing `v` across the `NUM_VERTICES - 1` slots other
    /// than `s`, so a flood fill starting from `v`'s back-link visits
    /// exactly the incident set. Grounded on the same "walk neighbors that
    /// still share the axis" idea as [`crate::delaunay::rotation`], but
    /// unordered and covering every incident simplex rather than a single
    /// edge's fan.
    pub fn incident_simplices(&self, v: VertexId) -> Vec<SimplexId> {
        let mut result = Vec::new();
        let mut seen = std::collections::HashSet::new();
        let mut stack = vec![self.vertex(v).back_link];
        while let Some(t) = stack.pop() {
            if t.is_dummy() || !seen.insert(t) {
                continue;
            }
            let s = self.simplex(t);
            let slot = match s.slot_of(v) {
                Some(slot) => slot,
                None => continue,
            };
            result.push(t);
            for (i, &n) in s.neighbors.iter().enumerate() {
                if i != slot && !n.is_dummy() && !seen.contains(&n) {
                    stack.push(n);
                }
            }
        }
        result
    }
}
