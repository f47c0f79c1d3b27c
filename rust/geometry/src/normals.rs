// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Smooth vertex normals
//!
//! Every non-degenerate triangle adds its unit normal to the vertices it
//! touches. Contributions are weighted per source face: the triangles of one
//! face first sum into a pending vector for each vertex, which is normalized
//! and added once when that vertex sees its next face. A corner shared by
//! three quads of a cube therefore averages three face normals no matter how
//! each quad was split.

use crate::weld::IndexedTriangle;
use nalgebra::{Point3, Vector3};

/// A welded position and its accumulated normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeldedVertex {
    pub position: Point3<f64>,
    pub normal_sum: Vector3<f64>,
    /// Number of faces that contributed to `normal_sum`
    pub samples: u32,
    pending: Vector3<f64>,
    pending_face: Option<usize>,
}

impl WeldedVertex {
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            normal_sum: Vector3::zeros(),
            samples: 0,
            pending: Vector3::zeros(),
            pending_face: None,
        }
    }

    /// Add a triangle normal coming from `face`
    #[inline]
    pub fn accumulate(&mut self, normal: Vector3<f64>, face: usize) {
        if self.pending_face != Some(face) {
            self.flush();
            self.pending_face = Some(face);
        }
        self.pending += normal;
    }

    /// Fold the pending face contribution into the running sum
    #[inline]
    pub fn flush(&mut self) {
        if let Some(n) = self.pending.try_normalize(0.0) {
            self.normal_sum += n;
            self.samples += 1;
        }
        self.pending = Vector3::zeros();
        self.pending_face = None;
    }

    /// Unit average normal, `None` when no valid normal was accumulated
    pub fn normal(&self) -> Option<Vector3<f64>> {
        if self.samples == 0 {
            return None;
        }
        self.normal_sum.try_normalize(f64::EPSILON)
    }
}

/// Normals aligned 1:1 with the welded positions
#[derive(Debug, Clone, Default)]
pub struct VertexNormals {
    /// Unit vectors, or zero for vertices without a valid normal
    pub normals: Vec<Vector3<f64>>,
    /// Vertices touched by no non-degenerate triangle
    pub missing: usize,
    /// Triangles excluded from accumulation
    pub degenerate_triangles: usize,
}

/// Compute per-vertex normals.
///
/// A triangle with `|e1 x e2| < area_epsilon` stays in the mesh but is left
/// out of accumulation.
pub fn compute_vertex_normals(
    positions: &[Point3<f64>],
    triangles: &[IndexedTriangle],
    area_epsilon: f64,
) -> VertexNormals {
    let mut vertices: Vec<WeldedVertex> = positions.iter().copied().map(WeldedVertex::new).collect();
    let mut degenerate_triangles = 0;

    for tri in triangles {
        let [a, b, c] = tri.indices.map(|i| i as usize);
        let (pa, pb, pc) = match (positions.get(a), positions.get(b), positions.get(c)) {
            (Some(pa), Some(pb), Some(pc)) => (pa, pb, pc),
            // Out-of-range triangles are reported by assembly
            _ => continue,
        };

        let cross = (pb - pa).cross(&(pc - pa));
        let magnitude = cross.norm();
        if !(magnitude >= area_epsilon) || magnitude == 0.0 {
            degenerate_triangles += 1;
            continue;
        }
        let normal = cross / magnitude;

        for i in [a, b, c] {
            vertices[i].accumulate(normal, tri.face);
        }
    }

    let mut missing = 0;
    let normals = vertices
        .iter_mut()
        .map(|v| {
            v.flush();
            v.normal().unwrap_or_else(|| {
                missing += 1;
                Vector3::zeros()
            })
        })
        .collect();

    VertexNormals {
        normals,
        missing,
        degenerate_triangles,
    }
}
