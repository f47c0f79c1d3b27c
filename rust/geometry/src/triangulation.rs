// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon triangulation
//!
//! Faces are projected to 2D by dropping their dominant normal axis and then
//! ear-clipped. Strictly convex faces take a fan fast path. Loops on which
//! ear clipping stalls (self-touching output of boolean operations) are
//! handed to earcutr.

use crate::error::{Error, Result};
use crate::extract::ExtractedPolygon;
use nalgebra::{Point2, Point3, Vector3};
use smallvec::SmallVec;

/// Projected face vertices
pub type ProjectedPoints = SmallVec<[Point2<f64>; 8]>;

/// Triangle with the winding of its source face
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub v0: Point3<f64>,
    pub v1: Point3<f64>,
    pub v2: Point3<f64>,
    /// Index of the source face in the solid
    pub face: usize,
}

impl Triangle {
    /// Create a new triangle
    pub fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>, face: usize) -> Self {
        Self { v0, v1, v2, face }
    }

    /// Unnormalized normal, `(v1 - v0) x (v2 - v0)`
    #[inline]
    pub fn cross(&self) -> Vector3<f64> {
        (self.v1 - self.v0).cross(&(self.v2 - self.v0))
    }

    /// Calculate triangle normal, `None` when degenerate
    pub fn normal(&self) -> Option<Vector3<f64>> {
        self.cross().try_normalize(0.0)
    }

    /// Calculate triangle area
    pub fn area(&self) -> f64 {
        self.cross().norm() * 0.5
    }

    #[inline]
    pub fn vertices(&self) -> [Point3<f64>; 3] {
        [self.v0, self.v1, self.v2]
    }
}

/// Triangles produced for one face
#[derive(Debug, Clone, Default)]
pub struct FaceTriangulation {
    pub triangles: Vec<Triangle>,
    /// Zero-area triangles that were omitted
    pub degenerate: usize,
}

/// Triangulate one validated face.
///
/// Triangles whose area is at or below `area_epsilon` are omitted and
/// counted in [`FaceTriangulation::degenerate`].
pub fn triangulate_face(face: &ExtractedPolygon, area_epsilon: f64) -> Result<FaceTriangulation> {
    let points = &face.points;
    let n = points.len();
    if n < 3 {
        return Err(Error::Triangulation(
            "Need at least 3 points to triangulate".to_string(),
        ));
    }

    // FAST PATH: Triangle - no projection needed
    let indices = if n == 3 {
        vec![0, 1, 2]
    } else {
        let projected = project_dominant_axis(points, &face.normal);
        triangulate_polygon(&projected)?
    };

    let mut result = FaceTriangulation {
        triangles: Vec::with_capacity(indices.len() / 3),
        degenerate: 0,
    };
    for tri in indices.chunks_exact(3) {
        let triangle = Triangle::new(points[tri[0]], points[tri[1]], points[tri[2]], face.face);
        if triangle.area() <= area_epsilon {
            result.degenerate += 1;
        } else {
            result.triangles.push(triangle);
        }
    }
    Ok(result)
}

/// Project points to 2D by dropping the axis of the largest absolute normal
/// component. The two remaining axes are ordered so that a loop that is
/// counter-clockwise around `normal` stays counter-clockwise in 2D.
pub fn project_dominant_axis(points: &[Point3<f64>], normal: &Vector3<f64>) -> ProjectedPoints {
    let (ax, ay, az) = (normal.x.abs(), normal.y.abs(), normal.z.abs());

    // (u, v) such that u x v points along the dropped axis
    let (u, v, flip) = if az >= ax && az >= ay {
        (0, 1, normal.z < 0.0)
    } else if ax >= ay {
        (1, 2, normal.x < 0.0)
    } else {
        (2, 0, normal.y < 0.0)
    };
    let (u, v) = if flip { (v, u) } else { (u, v) };

    points.iter().map(|p| Point2::new(p[u], p[v])).collect()
}

/// Signed area of a 2D loop (positive when counter-clockwise)
#[inline]
pub fn signed_area(points: &[Point2<f64>]) -> f64 {
    let n = points.len();
    let mut twice = 0.0;
    for i in 0..n {
        let p = &points[i];
        let q = &points[(i + 1) % n];
        twice += p.x * q.y - q.x * p.y;
    }
    twice * 0.5
}

#[inline]
fn cross(o: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Tolerance for orientation tests, scaled to the loop's extent
fn orientation_epsilon(points: &[Point2<f64>]) -> f64 {
    let mut min = Point2::new(f64::MAX, f64::MAX);
    let mut max = Point2::new(f64::MIN, f64::MIN);
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    let extent = (max.x - min.x).max(max.y - min.y).max(1e-300);
    extent * extent * 1e-12
}

/// Check if a polygon is strictly convex (all turns have the same sign and
/// none is collinear)
#[inline]
fn is_convex(points: &[Point2<f64>], eps: f64) -> bool {
    if points.len() < 3 {
        return false;
    }

    let n = points.len();
    let mut sign = 0i8;

    for i in 0..n {
        let turn = cross(&points[i], &points[(i + 1) % n], &points[(i + 2) % n]);
        if turn.abs() <= eps {
            return false;
        }
        let current_sign = if turn > 0.0 { 1i8 } else { -1i8 };
        if sign == 0 {
            sign = current_sign;
        } else if sign != current_sign {
            return false; // Sign changed - not convex
        }
    }

    true
}

/// Simple fan triangulation for convex polygons
#[inline]
fn fan_triangulate(n: usize) -> Vec<usize> {
    let mut indices = Vec::with_capacity((n - 2) * 3);
    for i in 1..n - 1 {
        indices.push(0);
        indices.push(i);
        indices.push(i + 1);
    }
    indices
}

/// Triangulate a simple polygon (no holes).
///
/// Returns triangle indices into the input points, wound like the input
/// loop. A simple polygon of n vertices yields n - 2 triangles (collinear
/// vertices produce zero-area triangles, which callers filter). A loop with
/// zero area yields no triangles. A loop that touches itself at a repeated
/// vertex is split there and each lobe is triangulated on its own.
pub fn triangulate_polygon(points: &[Point2<f64>]) -> Result<Vec<usize>> {
    let n = points.len();

    if n < 3 {
        return Err(Error::Triangulation(
            "Need at least 3 points to triangulate".to_string(),
        ));
    }

    if let Some((i, j)) = find_pinch(points) {
        return triangulate_pinched(points, i, j);
    }

    let eps = orientation_epsilon(points);
    let area = signed_area(points);
    if area.abs() <= eps {
        return Ok(Vec::new());
    }

    // FAST PATH: Triangle - no triangulation needed
    if n == 3 {
        return Ok(vec![0, 1, 2]);
    }

    // FAST PATH: Convex polygon - use fan triangulation
    if is_convex(points, eps) {
        return Ok(fan_triangulate(n));
    }

    ear_clip(points, area > 0.0, eps)
}

/// First pair of non-adjacent vertices sharing a position
fn find_pinch(points: &[Point2<f64>]) -> Option<(usize, usize)> {
    let n = points.len();
    (0..n).find_map(|i| {
        (i + 2..n)
            .filter(|&j| !(i == 0 && j == n - 1))
            .find(|&j| points[i] == points[j])
            .map(|j| (i, j))
    })
}

/// Split the loop at `points[i] == points[j]` into the lobes `i..j` and
/// `j..n, 0..i`. Lobes of fewer than 3 vertices are spikes and add nothing.
fn triangulate_pinched(points: &[Point2<f64>], i: usize, j: usize) -> Result<Vec<usize>> {
    let n = points.len();
    let lobes: [Vec<usize>; 2] = [(i..j).collect(), (j..n).chain(0..i).collect()];

    let mut indices = Vec::with_capacity((n - 2) * 3);
    for lobe in &lobes {
        if lobe.len() < 3 {
            continue;
        }
        let lobe_points: Vec<Point2<f64>> = lobe.iter().map(|&k| points[k]).collect();
        indices.extend(triangulate_polygon(&lobe_points)?.into_iter().map(|k| lobe[k]));
    }
    Ok(indices)
}

/// Ear clipping over an index loop. `ccw` is the orientation of the input;
/// clockwise input is walked in reverse and the emitted triangles are
/// flipped back to the input winding.
fn ear_clip(points: &[Point2<f64>], ccw: bool, eps: f64) -> Result<Vec<usize>> {
    let n = points.len();
    let mut remaining: Vec<usize> = if ccw {
        (0..n).collect()
    } else {
        (0..n).rev().collect()
    };
    let mut indices = Vec::with_capacity((n - 2) * 3);
    let mut emit = |a: usize, b: usize, c: usize| {
        if ccw {
            indices.extend_from_slice(&[a, b, c]);
        } else {
            indices.extend_from_slice(&[c, b, a]);
        }
    };

    while remaining.len() > 3 {
        let m = remaining.len();
        let ear = (0..m).find(|&k| {
            let a = remaining[(k + m - 1) % m];
            let b = remaining[k];
            let c = remaining[(k + 1) % m];
            is_ear(points, &remaining, a, b, c, eps)
        });

        // Collinear vertices are never ears; clipping one yields a zero-area
        // triangle the caller drops
        let clip = ear.or_else(|| {
            (0..m).find(|&k| {
                let a = remaining[(k + m - 1) % m];
                let b = remaining[k];
                let c = remaining[(k + 1) % m];
                cross(&points[a], &points[b], &points[c]).abs() <= eps
            })
        });

        match clip {
            Some(k) => {
                let a = remaining[(k + m - 1) % m];
                let b = remaining[k];
                let c = remaining[(k + 1) % m];
                emit(a, b, c);
                remaining.remove(k);
            }
            None => {
                // Not a simple loop; let earcut resolve what is left
                let rest = earcut_fallback(points, &remaining)?;
                for tri in rest.chunks_exact(3) {
                    emit(tri[0], tri[1], tri[2]);
                }
                return Ok(indices);
            }
        }
    }

    emit(remaining[0], remaining[1], remaining[2]);
    Ok(indices)
}

fn is_ear(
    points: &[Point2<f64>],
    remaining: &[usize],
    a: usize,
    b: usize,
    c: usize,
    eps: f64,
) -> bool {
    let (pa, pb, pc) = (&points[a], &points[b], &points[c]);
    if cross(pa, pb, pc) <= eps {
        return false; // Reflex or collinear
    }

    remaining.iter().all(|&i| {
        if i == a || i == b || i == c {
            return true;
        }
        !point_in_triangle(&points[i], pa, pb, pc, eps)
    })
}

/// Inclusive point-in-triangle test for a counter-clockwise triangle
#[inline]
fn point_in_triangle(
    p: &Point2<f64>,
    a: &Point2<f64>,
    b: &Point2<f64>,
    c: &Point2<f64>,
    eps: f64,
) -> bool {
    cross(a, b, p) >= -eps && cross(b, c, p) >= -eps && cross(c, a, p) >= -eps
}

/// Triangulate the remaining loop with earcutr, returning indices into
/// `points` oriented counter-clockwise
fn earcut_fallback(points: &[Point2<f64>], remaining: &[usize]) -> Result<Vec<usize>> {
    let mut vertices = Vec::with_capacity(remaining.len() * 2);
    for &i in remaining {
        vertices.push(points[i].x);
        vertices.push(points[i].y);
    }

    let local = earcutr::earcut(&vertices, &[], 2)
        .map_err(|e| Error::Triangulation(format!("{:?}", e)))?;
    if local.is_empty() {
        return Err(Error::Triangulation(
            "earcut produced no triangles for a stalled loop".to_string(),
        ));
    }

    let mut indices = Vec::with_capacity(local.len());
    for tri in local.chunks_exact(3) {
        let (a, b, c) = (remaining[tri[0]], remaining[tri[1]], remaining[tri[2]]);
        if cross(&points[a], &points[b], &points[c]) < 0.0 {
            indices.extend_from_slice(&[a, c, b]);
        } else {
            indices.extend_from_slice(&[a, b, c]);
        }
    }
    Ok(indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point2<f64>> {
        coords.iter().map(|&(x, y)| Point2::new(x, y)).collect()
    }

    fn triangle_area_sum(points: &[Point2<f64>], indices: &[usize]) -> f64 {
        indices
            .chunks_exact(3)
            .map(|t| cross(&points[t[0]], &points[t[1]], &points[t[2]]) * 0.5)
            .sum()
    }

    #[test]
    fn test_triangulate_square() {
        let points = pts(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);

        let indices = triangulate_polygon(&points).unwrap();

        // Convex fast path fans from the first vertex
        assert_eq!(indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn test_triangulate_triangle() {
        let points = pts(&[(0.0, 0.0), (1.0, 0.0), (0.5, 1.0)]);

        let indices = triangulate_polygon(&points).unwrap();

        // Triangle should have 3 indices
        assert_eq!(indices.len(), 3);
    }

    #[test]
    fn test_triangulate_insufficient_points() {
        let points = pts(&[(0.0, 0.0), (1.0, 0.0)]);

        let result = triangulate_polygon(&points);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_area_yields_nothing() {
        let points = pts(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]);
        assert!(triangulate_polygon(&points).unwrap().is_empty());
    }

    #[test]
    fn test_concave_l_shape() {
        // L-shape: reflex vertex at (1, 1)
        let points = pts(&[
            (0.0, 0.0),
            (2.0, 0.0),
            (2.0, 1.0),
            (1.0, 1.0),
            (1.0, 2.0),
            (0.0, 2.0),
        ]);
        let indices = triangulate_polygon(&points).unwrap();
        assert_eq!(indices.len() / 3, points.len() - 2);
        assert!((triangle_area_sum(&points, &indices) - 3.0).abs() < 1e-12);
        for tri in indices.chunks_exact(3) {
            assert!(cross(&points[tri[0]], &points[tri[1]], &points[tri[2]]) > 0.0);
        }
    }

    #[test]
    fn test_concave_quad_is_not_fanned_from_reflex_corner() {
        // Arrowhead (dart); fanning from vertex 0 would cover the notch
        let points = pts(&[(0.0, 0.0), (2.0, 1.0), (0.0, 2.0), (1.0, 1.0)]);
        let indices = triangulate_polygon(&points).unwrap();
        assert_eq!(indices.len(), 6);
        assert!((triangle_area_sum(&points, &indices) - signed_area(&points)).abs() < 1e-12);
        for tri in indices.chunks_exact(3) {
            assert!(cross(&points[tri[0]], &points[tri[1]], &points[tri[2]]) > 0.0);
        }
    }

    #[test]
    fn test_clockwise_input_keeps_winding() {
        // Same L-shape, clockwise
        let mut points = pts(&[
            (0.0, 0.0),
            (2.0, 0.0),
            (2.0, 1.0),
            (1.0, 1.0),
            (1.0, 2.0),
            (0.0, 2.0),
        ]);
        points.reverse();
        let indices = triangulate_polygon(&points).unwrap();
        assert_eq!(indices.len() / 3, 4);
        assert!((triangle_area_sum(&points, &indices) + 3.0).abs() < 1e-12);
        for tri in indices.chunks_exact(3) {
            assert!(cross(&points[tri[0]], &points[tri[1]], &points[tri[2]]) < 0.0);
        }
    }

    #[test]
    fn test_comb_polygon() {
        // Comb with three teeth: many reflex vertices
        let points = pts(&[
            (0.0, 0.0),
            (5.0, 0.0),
            (5.0, 3.0),
            (4.0, 3.0),
            (4.0, 1.0),
            (3.0, 1.0),
            (3.0, 3.0),
            (2.0, 3.0),
            (2.0, 1.0),
            (1.0, 1.0),
            (1.0, 3.0),
            (0.0, 3.0),
        ]);
        let indices = triangulate_polygon(&points).unwrap();
        assert_eq!(indices.len() / 3, points.len() - 2);
        assert!((triangle_area_sum(&points, &indices) - signed_area(&points)).abs() < 1e-9);
    }

    #[test]
    fn test_collinear_vertex_counts_as_degenerate_triangle() {
        // Square with an extra vertex in the middle of the bottom edge
        let points = pts(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]);
        let indices = triangulate_polygon(&points).unwrap();
        assert_eq!(indices.len() / 3, 3);
        assert!((triangle_area_sum(&points, &indices) - 4.0).abs() < 1e-12);
    }

    fn abs_area_sum(points: &[Point2<f64>], indices: &[usize]) -> f64 {
        indices
            .chunks_exact(3)
            .map(|t| (cross(&points[t[0]], &points[t[1]], &points[t[2]]) * 0.5).abs())
            .sum()
    }

    #[test]
    fn test_self_touching_loop_stays_inside() {
        // Two unit squares touching at (1, 1)
        let points = pts(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (1.0, 1.0),
            (2.0, 1.0),
            (2.0, 2.0),
            (1.0, 2.0),
            (1.0, 1.0),
            (0.0, 1.0),
        ]);
        let indices = triangulate_polygon(&points).unwrap();
        assert_eq!(indices.len() / 3, 4);
        assert!((signed_area(&points) - 2.0).abs() < 1e-12);
        assert!((triangle_area_sum(&points, &indices) - 2.0).abs() < 1e-12);
        assert!((abs_area_sum(&points, &indices) - 2.0).abs() < 1e-12);
        for tri in indices.chunks_exact(3) {
            assert!(cross(&points[tri[0]], &points[tri[1]], &points[tri[2]]) > 0.0);
        }
    }

    #[test]
    fn test_spike_is_dropped() {
        // Square with a zero-width spike out of its top edge
        let points = pts(&[
            (0.0, 0.0),
            (2.0, 0.0),
            (2.0, 2.0),
            (1.0, 2.0),
            (1.0, 3.0),
            (1.0, 2.0),
            (0.0, 2.0),
        ]);
        let indices = triangulate_polygon(&points).unwrap();
        assert!((abs_area_sum(&points, &indices) - 4.0).abs() < 1e-12);
        assert!(indices.iter().all(|&k| k != 4));
        for tri in indices.chunks_exact(3) {
            assert!(cross(&points[tri[0]], &points[tri[1]], &points[tri[2]]) >= 0.0);
        }
    }

    #[test]
    fn test_project_dominant_axis_keeps_orientation() {
        let ccw_about_minus_x = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let normal = crate::solid::newell_normal(&ccw_about_minus_x).normalize();
        assert!(normal.x < 0.0);
        let projected = project_dominant_axis(&ccw_about_minus_x, &normal);
        assert!(signed_area(&projected) > 0.0);

        for normal in [Vector3::<f64>::x(), Vector3::y(), Vector3::z(), -Vector3::y(), -Vector3::z()] {
            // Build a CCW square around each axis and check orientation survives
            let u = if normal.x.abs() > 0.5 { Vector3::y() } else { Vector3::x() };
            let v = normal.cross(&u);
            let square: Vec<Point3<f64>> = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]
                .iter()
                .map(|&(a, b)| Point3::origin() + u * a + v * b)
                .collect();
            let projected = project_dominant_axis(&square, &normal);
            assert!(signed_area(&projected) > 0.0, "normal {:?}", normal);
        }
    }
}
