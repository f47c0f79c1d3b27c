// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures and final assembly

use crate::error::{Error, Result};
use crate::weld::IndexedTriangle;
use nalgebra::{Point3, Vector3};

/// Indexed triangle mesh in renderer layout
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Vertex positions (x, y, z)
    pub positions: Vec<f32>,
    /// Vertex normals (nx, ny, nz); zero for vertices without a valid normal
    pub normals: Vec<f32>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Vec<u32>,
}

/// Pack welded positions, vertex normals and index triples into a [`Mesh`].
///
/// Fails with [`Error::AssemblyInvariantViolation`] when the inputs disagree
/// in length or an index is out of range. Both mean an earlier stage is
/// broken.
pub fn assemble(
    positions: &[Point3<f64>],
    normals: &[Vector3<f64>],
    triangles: &[IndexedTriangle],
) -> Result<Mesh> {
    if positions.len() != normals.len() {
        return Err(Error::AssemblyInvariantViolation(format!(
            "{} positions but {} normals",
            positions.len(),
            normals.len()
        )));
    }
    if positions.len() > u32::MAX as usize {
        return Err(Error::AssemblyInvariantViolation(format!(
            "{} vertices exceed the u32 index range",
            positions.len()
        )));
    }

    let mut mesh = Mesh::with_capacity(positions.len(), triangles.len() * 3);
    for (position, normal) in positions.iter().zip(normals) {
        mesh.add_vertex(*position, *normal);
    }

    let vertex_count = positions.len() as u32;
    for tri in triangles {
        if let Some(&bad) = tri.indices.iter().find(|&&i| i >= vertex_count) {
            return Err(Error::AssemblyInvariantViolation(format!(
                "triangle of face {} references vertex {} of {}",
                tri.face, bad, vertex_count
            )));
        }
        let [a, b, c] = tri.indices;
        mesh.add_triangle(a, b, c);
    }

    mesh.validate()?;
    Ok(mesh)
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Create a mesh with capacity
    pub fn with_capacity(vertex_count: usize, index_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count * 3),
            normals: Vec::with_capacity(vertex_count * 3),
            indices: Vec::with_capacity(index_count),
        }
    }

    /// Add a vertex with normal
    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>, normal: Vector3<f64>) {
        self.positions.push(position.x as f32);
        self.positions.push(position.y as f32);
        self.positions.push(position.z as f32);

        self.normals.push(normal.x as f32);
        self.normals.push(normal.y as f32);
        self.normals.push(normal.z as f32);
    }

    /// Add a triangle
    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.push(i0);
        self.indices.push(i1);
        self.indices.push(i2);
    }

    /// Append another mesh, offsetting its indices
    #[inline]
    pub fn merge(&mut self, other: &Mesh) {
        if other.is_empty() {
            return;
        }

        let vertex_offset = self.vertex_count() as u32;

        self.positions.reserve(other.positions.len());
        self.normals.reserve(other.normals.len());
        self.indices.reserve(other.indices.len());

        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.indices
            .extend(other.indices.iter().map(|&i| i + vertex_offset));
    }

    /// Get vertex count
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Get triangle count
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check if mesh is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Check the buffer invariants: aligned position/normal buffers, whole
    /// triangles, and every index in range
    pub fn validate(&self) -> Result<()> {
        if self.positions.len() % 3 != 0 {
            return Err(Error::AssemblyInvariantViolation(format!(
                "position buffer length {} is not a multiple of 3",
                self.positions.len()
            )));
        }
        if self.normals.len() != self.positions.len() {
            return Err(Error::AssemblyInvariantViolation(format!(
                "normal buffer length {} != position buffer length {}",
                self.normals.len(),
                self.positions.len()
            )));
        }
        if self.indices.len() % 3 != 0 {
            return Err(Error::AssemblyInvariantViolation(format!(
                "index buffer length {} is not a multiple of 3",
                self.indices.len()
            )));
        }
        let vertex_count = self.vertex_count();
        if let Some(&bad) = self.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(Error::AssemblyInvariantViolation(format!(
                "index {} out of range for {} vertices",
                bad, vertex_count
            )));
        }
        Ok(())
    }

    /// Position of vertex `i`
    #[inline]
    pub fn position(&self, i: usize) -> Option<Point3<f32>> {
        self.positions
            .get(i * 3..i * 3 + 3)
            .map(|p| Point3::new(p[0], p[1], p[2]))
    }

    /// Normal of vertex `i`
    #[inline]
    pub fn normal(&self, i: usize) -> Option<Vector3<f32>> {
        self.normals
            .get(i * 3..i * 3 + 3)
            .map(|n| Vector3::new(n[0], n[1], n[2]))
    }

    /// Iterate over index triples
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Corner positions of every triangle, in f64
    fn triangle_corners(&self) -> impl Iterator<Item = [Vector3<f64>; 3]> + '_ {
        self.triangles().filter_map(move |[a, b, c]| {
            let corner = |i: u32| {
                self.position(i as usize)
                    .map(|p| Vector3::new(p.x as f64, p.y as f64, p.z as f64))
            };
            Some([corner(a)?, corner(b)?, corner(c)?])
        })
    }

    /// Signed volume enclosed by the triangles (positive for outward winding)
    pub fn volume(&self) -> f64 {
        self.triangle_corners()
            .map(|[a, b, c]| a.dot(&b.cross(&c)))
            .sum::<f64>()
            / 6.0
    }

    /// Total triangle area
    pub fn surface_area(&self) -> f64 {
        self.triangle_corners()
            .map(|[a, b, c]| (b - a).cross(&(c - a)).norm() * 0.5)
            .sum()
    }

    /// Calculate bounds (min, max)
    #[inline]
    pub fn bounds(&self) -> (Point3<f32>, Point3<f32>) {
        if self.is_empty() {
            return (Point3::origin(), Point3::origin());
        }

        let mut min = Point3::new(f32::MAX, f32::MAX, f32::MAX);
        let mut max = Point3::new(f32::MIN, f32::MIN, f32::MIN);

        self.positions.chunks_exact(3).for_each(|chunk| {
            let (x, y, z) = (chunk[0], chunk[1], chunk[2]);
            min.x = min.x.min(x);
            min.y = min.y.min(y);
            min.z = min.z.min(z);
            max.x = max.x.max(x);
            max.y = max.y.max(y);
            max.z = max.z.max(z);
        });

        (min, max)
    }

    /// Average of all vertex positions, accumulated in f64
    #[inline]
    pub fn centroid(&self) -> Point3<f64> {
        if self.is_empty() {
            return Point3::origin();
        }

        let mut sum = Vector3::<f64>::zeros();
        self.positions.chunks_exact(3).for_each(|chunk| {
            sum.x += chunk[0] as f64;
            sum.y += chunk[1] as f64;
            sum.z += chunk[2] as f64;
        });

        Point3::from(sum / self.vertex_count() as f64)
    }

    /// Clear the mesh
    #[inline]
    pub fn clear(&mut self) {
        self.positions.clear();
        self.normals.clear();
        self.indices.clear();
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square() -> (Vec<Point3<f64>>, Vec<Vector3<f64>>, Vec<IndexedTriangle>) {
        (
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![Vector3::z(); 4],
            vec![
                IndexedTriangle::new(0, 1, 2, 0),
                IndexedTriangle::new(0, 2, 3, 0),
            ],
        )
    }

    #[test]
    fn test_mesh_creation() {
        let mesh = Mesh::new();
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_add_vertex() {
        let mut mesh = Mesh::new();
        mesh.add_vertex(Point3::new(1.0, 2.0, 3.0), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(mesh.vertex_count(), 1);
        assert_eq!(mesh.positions, vec![1.0, 2.0, 3.0]);
        assert_eq!(mesh.normals, vec![0.0, 0.0, 1.0]);
        assert_eq!(mesh.position(0), Some(Point3::new(1.0, 2.0, 3.0)));
        assert_eq!(mesh.normal(1), None);
    }

    #[test]
    fn test_assemble_square() {
        let (positions, normals, triangles) = unit_square();
        let mesh = assemble(&positions, &normals, &triangles).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.triangles().collect::<Vec<_>>(), vec![[0, 1, 2], [0, 2, 3]]);
        assert_relative_eq!(mesh.surface_area(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_assemble_rejects_bad_index() {
        let (positions, normals, mut triangles) = unit_square();
        triangles.push(IndexedTriangle::new(0, 1, 9, 3));
        let err = assemble(&positions, &normals, &triangles).unwrap_err();
        assert!(matches!(err, Error::AssemblyInvariantViolation(_)));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_assemble_rejects_misaligned_normals() {
        let (positions, mut normals, triangles) = unit_square();
        normals.pop();
        assert!(matches!(
            assemble(&positions, &normals, &triangles),
            Err(Error::AssemblyInvariantViolation(_))
        ));
    }

    #[test]
    fn test_validate_catches_manual_corruption() {
        let (positions, normals, triangles) = unit_square();
        let mut mesh = assemble(&positions, &normals, &triangles).unwrap();
        assert!(mesh.validate().is_ok());
        mesh.normals.truncate(9);
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn test_merge() {
        let (positions, normals, triangles) = unit_square();
        let mut mesh1 = assemble(&positions, &normals, &triangles).unwrap();
        let mesh2 = mesh1.clone();

        mesh1.merge(&mesh2);
        assert_eq!(mesh1.vertex_count(), 8);
        assert_eq!(mesh1.triangle_count(), 4);
        assert_eq!(&mesh1.indices[6..], &[4, 5, 6, 4, 6, 7]);
        assert!(mesh1.validate().is_ok());
    }

    #[test]
    fn test_tetrahedron_volume() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        let normals = vec![Vector3::zeros(); 4];
        let triangles = vec![
            IndexedTriangle::new(0, 2, 1, 0),
            IndexedTriangle::new(0, 1, 3, 1),
            IndexedTriangle::new(0, 3, 2, 2),
            IndexedTriangle::new(1, 2, 3, 3),
        ];
        let mesh = assemble(&positions, &normals, &triangles).unwrap();
        assert_relative_eq!(mesh.volume(), 1.0 / 6.0, epsilon = 1e-9);
        let (min, max) = mesh.bounds();
        assert_eq!(min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(max, Point3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(mesh.centroid(), Point3::new(0.25, 0.25, 0.25), epsilon = 1e-9);
    }
}
