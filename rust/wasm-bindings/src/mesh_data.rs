// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh buffers handed to JavaScript.

use csg_view_geometry::Mesh;
use csg_view_processing::RenderableMesh;
use std::sync::Arc;
use wasm_bindgen::prelude::*;

/// One renderable mesh: shared buffers plus its draw settings.
#[wasm_bindgen]
pub struct MeshDataJs {
    name: String,
    mesh: Arc<Mesh>,
    color: [f32; 3],
    wireframe: bool,
    normals_length: f32,
    normal_lines: Vec<f32>,
}

#[wasm_bindgen]
impl MeshDataJs {
    #[wasm_bindgen(getter)]
    pub fn name(&self) -> String {
        self.name.clone()
    }

    /// Get positions as Float32Array (copy to JS)
    #[wasm_bindgen(getter)]
    pub fn positions(&self) -> js_sys::Float32Array {
        js_sys::Float32Array::from(&self.mesh.positions[..])
    }

    /// Get normals as Float32Array (copy to JS)
    #[wasm_bindgen(getter)]
    pub fn normals(&self) -> js_sys::Float32Array {
        js_sys::Float32Array::from(&self.mesh.normals[..])
    }

    /// Get indices as Uint32Array (copy to JS)
    #[wasm_bindgen(getter)]
    pub fn indices(&self) -> js_sys::Uint32Array {
        js_sys::Uint32Array::from(&self.mesh.indices[..])
    }

    /// Line segment endpoints of the vertex-normal overlay; empty when disabled
    #[wasm_bindgen(getter, js_name = normalLines)]
    pub fn normal_lines(&self) -> js_sys::Float32Array {
        js_sys::Float32Array::from(&self.normal_lines[..])
    }

    /// Get surface color as [r, g, b]
    #[wasm_bindgen(getter)]
    pub fn color(&self) -> Vec<f32> {
        self.color.to_vec()
    }

    #[wasm_bindgen(getter)]
    pub fn wireframe(&self) -> bool {
        self.wireframe
    }

    #[wasm_bindgen(getter, js_name = normalsLength)]
    pub fn normals_length(&self) -> f32 {
        self.normals_length
    }

    #[wasm_bindgen(getter, js_name = vertexCount)]
    pub fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }

    #[wasm_bindgen(getter, js_name = triangleCount)]
    pub fn triangle_count(&self) -> usize {
        self.mesh.triangle_count()
    }

    /// Enclosed volume (signed tetrahedron method)
    #[wasm_bindgen]
    pub fn volume(&self) -> f64 {
        self.mesh.volume()
    }

    #[wasm_bindgen(js_name = surfaceArea)]
    pub fn surface_area(&self) -> f64 {
        self.mesh.surface_area()
    }

    /// Axis-aligned bounds as [minX, minY, minZ, maxX, maxY, maxZ]
    #[wasm_bindgen]
    pub fn bounds(&self) -> Vec<f32> {
        let (min, max) = self.mesh.bounds();
        vec![min.x, min.y, min.z, max.x, max.y, max.z]
    }
}

impl MeshDataJs {
    pub fn from_renderable(renderable: &RenderableMesh) -> Self {
        Self {
            name: renderable.name.clone(),
            mesh: renderable.shared_mesh(),
            color: renderable
                .material()
                .map(|m| m.color)
                .unwrap_or([1.0, 1.0, 1.0]),
            wireframe: renderable.has_wireframe(),
            normals_length: renderable.normals_length(),
            normal_lines: renderable.normal_lines(),
        }
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csg_view_geometry::primitives::cube;
    use csg_view_processing::{Viewer, ViewerConfig};

    #[test]
    fn test_mesh_data_shares_viewer_buffers() {
        let mut viewer = Viewer::new(ViewerConfig::new()).unwrap();
        viewer.add_solid("cube", &cube(2.0).unwrap()).unwrap();
        let renderable = viewer.get(0).unwrap();

        let data = MeshDataJs::from_renderable(renderable);
        assert!(std::ptr::eq(data.mesh(), renderable.mesh()));
        assert_eq!(data.vertex_count(), 8);
        assert_eq!(data.triangle_count(), 12);
        assert!(data.wireframe());
        assert_eq!(data.normal_lines.len(), 8 * 6);
        assert_eq!(data.bounds(), vec![-1.0, -1.0, -1.0, 1.0, 1.0, 1.0]);
    }
}
