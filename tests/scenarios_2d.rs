//! End-to-end 2D scenarios (spec.md §8) exercised only through the public
//! API, mirroring the concrete numbered scenarios of that section.

#![cfg(feature = "2d")]

use voronoi::config::BoundingBox;
use voronoi::delaunay::DelaunayTriangulation;
use voronoi::geometry::coords;
use voronoi::geometry::Point;
use voronoi::mesh::SimplexId;

fn unit_box() -> BoundingBox {
    BoundingBox::new(Point::new(0.0, 0.0), Point::new(1.0, 1.0))
}

fn active_real_count(tri: &DelaunayTriangulation) -> usize {
    tri.mesh()
        .simplices
        .iter()
        .filter(|(id, _)| !SimplexId(*id).is_dummy())
        .count()
}

fn canonical_triangles(tri: &DelaunayTriangulation) -> Vec<[[f64; 2]; 3]> {
    let mesh = tri.mesh();
    let mut out: Vec<[[f64; 2]; 3]> = mesh
        .simplices
        .iter()
        .filter(|(id, _)| !SimplexId(*id).is_dummy())
        .map(|(_, s)| {
            let mut pts = s.vertices.map(|v| coords(mesh.vertex(v).position));
            pts.sort_by(|a, b| a.partial_cmp(b).unwrap());
            pts
        })
        .collect();
    out.sort_by(|a, b| a.partial_cmp(b).unwrap());
    out
}

/// Scenario 1: single interior point yields three active triangles, each
/// Delaunay by construction.
#[test]
fn single_interior_point_yields_three_triangles() {
    let mut tri = DelaunayTriangulation::init(&unit_box()).with_seed(1);
    tri.add_vertex(Point::new(0.5, 0.5)).unwrap();
    assert_eq!(active_real_count(&tri), 3);
    tri.check_integrity().unwrap();
}

/// Scenario 2: a second interior point splits whichever triangle contains
/// it into three more; any flips the cascade performs only swap a
/// diagonal, so the final count is always 3 - 1 + 3 = 5 regardless of
/// which triangle absorbed the second point.
#[test]
fn two_points_forcing_a_flip_leave_five_triangles() {
    let mut tri = DelaunayTriangulation::init(&unit_box()).with_seed(2);
    tri.add_vertex(Point::new(0.5, 0.5)).unwrap();
    tri.add_vertex(Point::new(0.5, 0.1)).unwrap();
    assert_eq!(active_real_count(&tri), 5);
    tri.check_integrity().unwrap();
}

/// Scenario 3: a grid of four points has its diagonal chosen by the exact
/// in-sphere test; whichever diagonal survives, the result is a valid
/// Delaunay mesh.
#[test]
fn grid_of_four_points_stays_delaunay() {
    let mut tri = DelaunayTriangulation::init(&unit_box()).with_seed(7);
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

/// Boundary behavior: a point collinear with two already-inserted
/// vertices may land exactly on a shared mesh edge, which must trigger
/// the degenerate 2-to-4 split rather than a panic or a location failure.
#[test]
fn collinear_point_does_not_abort_construction() {
    let mut tri = DelaunayTriangulation::init(&unit_box()).with_seed(3);
    tri.add_vertex(Point::new(0.5, 0.5)).unwrap();
    tri.add_vertex(Point::new(0.5, 0.2)).unwrap();
    tri.add_vertex(Point::new(0.5, 0.35)).unwrap();
    tri.check_integrity().unwrap();
}

/// Round-trip law: inserting the same point set in a different order
/// produces the same set of triangles, modulo simplex-id relabeling.
#[test]
fn insertion_order_does_not_change_the_resulting_mesh() {
    let points = [
        Point::new(0.2, 0.2),
        Point::new(0.8, 0.2),
        Point::new(0.2, 0.8),
        Point::new(0.8, 0.8),
        Point::new(0.5, 0.5),
    ];

    let mut forward = DelaunayTriangulation::init(&unit_box()).with_seed(42);
    for &p in &points {
        forward.add_vertex(p).unwrap();
    }

    let mut backward = DelaunayTriangulation::init(&unit_box()).with_seed(42);
    for &p in points.iter().rev() {
        backward.add_vertex(p).unwrap();
    }

    assert_eq!(canonical_triangles(&forward), canonical_triangles(&backward));
}

/// Boundary behavior: with only the super-triangle vertices present, the
/// mesh has exactly one real triangle.
#[test]
fn bootstrap_has_exactly_one_real_triangle() {
    let tri = DelaunayTriangulation::init(&unit_box());
    assert_eq!(active_real_count(&tri), 1);
}
