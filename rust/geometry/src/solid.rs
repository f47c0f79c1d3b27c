// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon-soup boundary representation of a solid

use nalgebra::{Point3, Vector3};

/// Planar face loop, counter-clockwise when viewed from outside the solid
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub vertices: Vec<Point3<f64>>,
}

impl Polygon {
    /// Create a polygon from its vertex loop
    pub fn new(vertices: Vec<Point3<f64>>) -> Self {
        Self { vertices }
    }

    /// Create a polygon from raw coordinate triples
    pub fn from_coords(coords: &[[f64; 3]]) -> Self {
        Self {
            vertices: coords.iter().map(|c| Point3::new(c[0], c[1], c[2])).collect(),
        }
    }

    /// Number of vertices in the loop
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// Unnormalized Newell normal; its length is twice the enclosed area
    pub fn newell_normal(&self) -> Vector3<f64> {
        newell_normal(&self.vertices)
    }

    /// Reverse the winding (flips the outward side)
    pub fn flip(&mut self) {
        self.vertices.reverse();
    }
}

/// Newell's method over a closed loop. Robust for concave and slightly
/// non-planar loops.
pub(crate) fn newell_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    let n = points.len();
    let mut normal = Vector3::<f64>::zeros();
    for i in 0..n {
        let current = &points[i];
        let next = &points[(i + 1) % n];

        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }
    normal
}

/// One CSG result: an ordered collection of faces
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Solid {
    pub polygons: Vec<Polygon>,
}

impl Solid {
    pub fn new(polygons: Vec<Polygon>) -> Self {
        Self { polygons }
    }

    /// Create a solid from bare vertex loops
    pub fn from_faces(faces: Vec<Vec<Point3<f64>>>) -> Self {
        Self {
            polygons: faces.into_iter().map(Polygon::new).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    #[inline]
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn iter(&self) -> impl Iterator<Item = &Polygon> {
        self.polygons.iter()
    }

    /// Total number of raw (unwelded) face vertices
    pub fn vertex_count(&self) -> usize {
        self.polygons.iter().map(Polygon::len).sum()
    }

    /// Move all faces of `other` into this solid (no boolean union)
    pub fn append(&mut self, other: Solid) {
        self.polygons.extend(other.polygons);
    }
}

impl FromIterator<Polygon> for Solid {
    fn from_iter<T: IntoIterator<Item = Polygon>>(iter: T) -> Self {
        Self {
            polygons: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Solid {
    type Item = &'a Polygon;
    type IntoIter = std::slice::Iter<'a, Polygon>;

    fn into_iter(self) -> Self::IntoIter {
        self.polygons.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newell_normal_ccw_square() {
        let square = Polygon::from_coords(&[
            [0.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [2.0, 2.0, 0.0],
            [0.0, 2.0, 0.0],
        ]);
        let normal = square.newell_normal();
        // Length is twice the area
        assert!((normal.z - 8.0).abs() < 1e-12);
        assert!(normal.x.abs() < 1e-12 && normal.y.abs() < 1e-12);
    }

    #[test]
    fn test_flip_reverses_normal() {
        let mut tri = Polygon::from_coords(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        assert!(tri.newell_normal().z > 0.0);
        tri.flip();
        assert!(tri.newell_normal().z < 0.0);
    }

    #[test]
    fn test_solid_counts() {
        let mut solid = Solid::from_faces(vec![vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]]);
        solid.append(Solid::new(vec![Polygon::from_coords(&[
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
            [0.0, 1.0, 1.0],
        ])]));
        assert_eq!(solid.len(), 2);
        assert_eq!(solid.vertex_count(), 7);
        assert_eq!((&solid).into_iter().count(), 2);
    }
}
