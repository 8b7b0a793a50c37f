//! Floating-point circumcenter/circumradius of a simplex (spec.md §4.7,
//! §4.9). Unlike [`crate::geometry::predicates`], these are not required to
//! be sign-exact: the search-radius bookkeeping and the Voronoi extractor
//! both consume them as ordinary floating-point geometry, the same way the
//! teacher's own `Tetra2dData::get_center_of_circumcircle` is plain `f64`
//! arithmetic rather than routed through the exact predicate machinery.

use crate::geometry::Point;
use crate::geometry::NUM_VERTICES;

/// Center of the circle (2D) or sphere (3D) through all `NUM_VERTICES`
/// points of a simplex.
#[cfg(feature = "2d")]
pub fn circumcenter(p: [Point; NUM_VERTICES]) -> Point {
    let (a, b, c) = (p[0], p[1], p[2]);
    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    let ax2 = a.x * a.x + a.y * a.y;
    let bx2 = b.x * b.x + b.y * b.y;
    let cx2 = c.x * c.x + c.y * c.y;
    Point::new(
        (ax2 * (b.y - c.y) + bx2 * (c.y - a.y) + cx2 * (a.y - b.y)) / d,
        (ax2 * (c.x - b.x) + bx2 * (a.x - c.x) + cx2 * (b.x - a.x)) / d,
    )
}

/// Center of the circumscribed sphere of a tetrahedron, via the standard
/// perpendicular-bisector-plane construction: with `a = p1-p0`, `b = p2-p0`,
/// `c = p3-p0`, the center is `p0 + (|a|^2 (b x c) + |b|^2 (c x a) + |c|^2 (a
/// x b)) / (2 a . (b x c))`.
#[cfg(feature = "3d")]
pub fn circumcenter(p: [Point; NUM_VERTICES]) -> Point {
    let a = p[1] - p[0];
    let b = p[2] - p[0];
    let c = p[3] - p[0];
    let denom = 2.0 * a.dot(b.cross(c));
    let numer = a.length_squared() * b.cross(c)
        + b.length_squared() * c.cross(a)
        + c.length_squared() * a.cross(b);
    p[0] + numer / denom
}

/// Twice the radius of the circumscribed circle/sphere of a simplex
/// (spec.md §4.7: "a vertex's search radius equals twice the largest
/// circumradius among simplices incident to it").
pub fn circumradius(p: [Point; NUM_VERTICES]) -> f64 {
    (circumcenter(p) - p[0]).length()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "2d")]
    #[test]
    fn circumcenter_of_right_triangle_is_hypotenuse_midpoint() {
        let p = [
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(0.0, 4.0),
        ];
        let center = circumcenter(p);
        assert!((center - Point::new(2.0, 2.0)).length() < 1e-9);
    }

    #[cfg(feature = "3d")]
    #[test]
    fn circumcenter_of_regular_tetra_is_equidistant() {
        let p = [
            Point::new(0.0, 0.0, 0.0),
            Point::new(4.0, 0.0, 0.0),
            Point::new(0.0, 4.0, 0.0),
            Point::new(0.0, 0.0, 4.0),
        ];
        let center = circumcenter(p);
        let r0 = (center - p[0]).length();
        for &q in &p[1..] {
            assert!(((center - q).length() - r0).abs() < 1e-9);
        }
    }
}
