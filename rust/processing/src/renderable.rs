// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Renderable meshes.
//!
//! A [`RenderableMesh`] owns one converted mesh and a list of ways to draw
//! it. The shaded surface, its wireframe and its vertex-normal overlay all
//! read the same buffers; nothing is cloned per variant.

use crate::config::ViewerConfig;
use csg_view_geometry::{ConversionReport, Mesh};
use serde::Serialize;
use std::sync::Arc;

/// Convert a 0xRRGGBB color into linear 0-1 RGB components.
pub fn rgb_from_hex(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

/// Surface material parameters for lit rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Material {
    pub color: [f32; 3],
    pub specular: [f32; 3],
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: rgb_from_hex(0xffffff),
            specular: rgb_from_hex(0x111111),
            shininess: 30.0,
        }
    }
}

/// One way of drawing a mesh.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawVariant {
    /// Lit surface
    Shaded { material: Material, cast_shadow: bool },
    /// Triangle edges
    Wireframe { color: [f32; 3] },
    /// A line per vertex along its normal
    VertexNormals { length: f32, color: [f32; 3] },
}

impl DrawVariant {
    pub fn shaded() -> Self {
        DrawVariant::Shaded {
            material: Material::default(),
            cast_shadow: true,
        }
    }

    pub fn wireframe() -> Self {
        DrawVariant::Wireframe {
            color: rgb_from_hex(0x444444),
        }
    }

    pub fn vertex_normals(length: f32) -> Self {
        DrawVariant::VertexNormals {
            length,
            color: rgb_from_hex(0xff0000),
        }
    }

    /// Variants for a freshly added mesh under `config`.
    pub fn defaults_for(config: &ViewerConfig) -> Vec<DrawVariant> {
        let mut variants = vec![Self::shaded()];
        if config.wireframe {
            variants.push(Self::wireframe());
        }
        if config.normals_length > 0.0 {
            variants.push(Self::vertex_normals(config.normals_length));
        }
        variants
    }
}

/// A converted mesh registered with the viewer.
#[derive(Debug, Clone)]
pub struct RenderableMesh {
    pub name: String,
    mesh: Arc<Mesh>,
    pub variants: Vec<DrawVariant>,
    pub report: ConversionReport,
}

impl RenderableMesh {
    pub fn new(
        name: impl Into<String>,
        mesh: Mesh,
        variants: Vec<DrawVariant>,
        report: ConversionReport,
    ) -> Self {
        Self {
            name: name.into(),
            mesh: Arc::new(mesh),
            variants,
            report,
        }
    }

    #[inline]
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Shared handle to the mesh buffers.
    pub fn shared_mesh(&self) -> Arc<Mesh> {
        Arc::clone(&self.mesh)
    }

    /// Material of the shaded variant, if any.
    pub fn material(&self) -> Option<&Material> {
        self.variants.iter().find_map(|v| match v {
            DrawVariant::Shaded { material, .. } => Some(material),
            _ => None,
        })
    }

    pub fn has_wireframe(&self) -> bool {
        self.variants
            .iter()
            .any(|v| matches!(v, DrawVariant::Wireframe { .. }))
    }

    /// Normal overlay length, or 0 when the overlay is disabled.
    pub fn normals_length(&self) -> f32 {
        self.variants
            .iter()
            .find_map(|v| match v {
                DrawVariant::VertexNormals { length, .. } => Some(*length),
                _ => None,
            })
            .unwrap_or(0.0)
    }

    /// Line segments of the vertex-normal overlay as (x, y, z) pairs:
    /// vertex position, then position + normal * length.
    pub fn normal_lines(&self) -> Vec<f32> {
        let length = self.normals_length();
        if length <= 0.0 {
            return Vec::new();
        }
        let mesh = &self.mesh;
        let mut lines = Vec::with_capacity(mesh.positions.len() * 2);
        for (p, n) in mesh
            .positions
            .chunks_exact(3)
            .zip(mesh.normals.chunks_exact(3))
        {
            lines.extend_from_slice(p);
            lines.extend_from_slice(&[
                p[0] + n[0] * length,
                p[1] + n[1] * length,
                p[2] + n[2] * length,
            ]);
        }
        lines
    }

    /// Serializable summary of this mesh.
    pub fn summary(&self) -> MeshSummary {
        let (min, max) = self.mesh.bounds();
        MeshSummary {
            name: self.name.clone(),
            vertices: self.mesh.vertex_count(),
            triangles: self.mesh.triangle_count(),
            bounds_min: [min.x, min.y, min.z],
            bounds_max: [max.x, max.y, max.z],
            volume: self.mesh.volume(),
            surface_area: self.mesh.surface_area(),
            faces_skipped: self.report.faces_skipped,
            near_planar_faces: self.report.near_planar_faces,
            degenerate_triangles: self.report.degenerate_triangles,
            variants: self.variants.clone(),
        }
    }
}

/// Per-mesh entry of a scene report.
#[derive(Debug, Clone, Serialize)]
pub struct MeshSummary {
    pub name: String,
    pub vertices: usize,
    pub triangles: usize,
    pub bounds_min: [f32; 3],
    pub bounds_max: [f32; 3],
    pub volume: f64,
    pub surface_area: f64,
    pub faces_skipped: usize,
    pub near_planar_faces: usize,
    pub degenerate_triangles: usize,
    pub variants: Vec<DrawVariant>,
}
