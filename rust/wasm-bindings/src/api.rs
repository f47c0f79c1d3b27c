// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JavaScript API for CSG-View
//!
//! A [`CsgViewer`] owns one scene. Solids come in as flat polygon buffers
//! (or from the built-in demo scene) and go out as [`MeshDataJs`] buffers
//! ready for WebGL.

use crate::flat::{solid_from_flat, FlatSolidError};
use crate::mesh_data::MeshDataJs;
use crate::utils::console_warn;
use csg_view_geometry::ShadingMode;
use csg_view_processing::{populate_demo_scene, Viewer, ViewerConfig};
use serde::Deserialize;
use thiserror::Error;
use wasm_bindgen::prelude::*;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Flat(#[from] FlatSolidError),

    #[error(transparent)]
    Processing(#[from] csg_view_processing::Error),

    #[error(transparent)]
    Geometry(#[from] csg_view_geometry::Error),

    #[error("Invalid options: {0}")]
    Options(String),
}

/// Viewer options accepted from JavaScript. Missing fields keep defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewerOptions {
    pub weld_tolerance: Option<f64>,
    pub planar_tolerance: Option<f64>,
    pub shading: Option<String>,
    pub wireframe: Option<bool>,
    pub normals_length: Option<f32>,
}

impl ViewerOptions {
    pub fn into_config(self) -> Result<ViewerConfig, ApiError> {
        let mut config = ViewerConfig::new();
        if let Some(tolerance) = self.weld_tolerance {
            if !(tolerance.is_finite() && tolerance > 0.0) {
                return Err(ApiError::Options(format!("weldTolerance {}", tolerance)));
            }
            config.weld_tolerance = tolerance;
        }
        if let Some(tolerance) = self.planar_tolerance {
            if !(tolerance.is_finite() && tolerance >= 0.0) {
                return Err(ApiError::Options(format!("planarTolerance {}", tolerance)));
            }
            config.planar_tolerance = tolerance;
        }
        if let Some(shading) = self.shading {
            config.shading = shading.parse::<ShadingMode>().map_err(ApiError::Options)?;
        }
        if let Some(wireframe) = self.wireframe {
            config.wireframe = wireframe;
        }
        if let Some(length) = self.normals_length {
            if !(length.is_finite() && length >= 0.0) {
                return Err(ApiError::Options(format!("normalsLength {}", length)));
            }
            config.normals_length = length;
        }
        Ok(config)
    }
}

/// Scene context exposed to JavaScript
#[wasm_bindgen]
pub struct CsgViewer {
    viewer: Viewer,
}

#[wasm_bindgen]
impl CsgViewer {
    /// Create a viewer with default settings
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<CsgViewer, JsError> {
        crate::set_panic_hook();
        Ok(Self::from_config(ViewerConfig::new())?)
    }

    /// Create a viewer from an options object, e.g.
    /// `{ shading: "flat", wireframe: false, normalsLength: 0.5 }`
    #[wasm_bindgen(js_name = withOptions)]
    pub fn with_options(options: JsValue) -> Result<CsgViewer, JsError> {
        crate::set_panic_hook();
        let options: ViewerOptions = if options.is_undefined() || options.is_null() {
            ViewerOptions::default()
        } else {
            serde_wasm_bindgen::from_value(options)
                .map_err(|e| JsError::new(&format!("Invalid options: {}", e)))?
        };
        Ok(Self::from_config(options.into_config()?)?)
    }

    /// Create a default viewer already holding the demo scene
    #[wasm_bindgen(js_name = withDemoScene)]
    pub fn with_demo_scene() -> Result<CsgViewer, JsError> {
        let mut api = CsgViewer::new()?;
        api.load_demo_scene()?;
        Ok(api)
    }

    /// Convert the built-in demo scene. Returns how many meshes were added.
    #[wasm_bindgen(js_name = addDemoScene)]
    pub fn add_demo_scene(&mut self) -> Result<usize, JsError> {
        Ok(self.load_demo_scene()?)
    }

    /// Convert one solid given as flat buffers. Returns the mesh index.
    ///
    /// # Arguments
    ///
    /// * `name` - Mesh name; a later mesh with the same name shadows it
    /// * `positions` - x, y, z for every polygon vertex
    /// * `face_sizes` - vertex count of each polygon
    #[wasm_bindgen(js_name = addPolygons)]
    pub fn add_polygons(
        &mut self,
        name: &str,
        positions: &[f32],
        face_sizes: &[u32],
    ) -> Result<usize, JsError> {
        Ok(self.add_flat_solid(name, positions, face_sizes)?)
    }

    /// Get number of meshes
    #[wasm_bindgen(getter)]
    pub fn length(&self) -> usize {
        self.viewer.len()
    }

    /// Get mesh at index
    #[wasm_bindgen]
    pub fn get(&self, index: usize) -> Option<MeshDataJs> {
        self.viewer.get(index).map(MeshDataJs::from_renderable)
    }

    /// Get mesh by name
    #[wasm_bindgen(js_name = getByName)]
    pub fn get_by_name(&self, name: &str) -> Option<MeshDataJs> {
        self.viewer
            .get_by_name(name)
            .ok()
            .map(MeshDataJs::from_renderable)
    }

    /// Solids that failed to convert, as `[{ name, error }]`
    #[wasm_bindgen]
    pub fn failures(&self) -> Result<JsValue, JsError> {
        serde_wasm_bindgen::to_value(self.viewer.failures())
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Scene statistics as a plain object
    #[wasm_bindgen]
    pub fn stats(&self) -> Result<JsValue, JsError> {
        serde_wasm_bindgen::to_value(&self.viewer.stats())
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Full scene report as JSON
    #[wasm_bindgen]
    pub fn report(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.viewer.report())?)
    }
}

impl CsgViewer {
    pub fn from_config(config: ViewerConfig) -> Result<Self, ApiError> {
        Ok(Self {
            viewer: Viewer::new(config)?,
        })
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    fn load_demo_scene(&mut self) -> Result<usize, ApiError> {
        let failures_before = self.viewer.failures().len();
        let added = populate_demo_scene(&mut self.viewer)?;
        self.warn_new_failures(failures_before);
        Ok(added)
    }

    fn add_flat_solid(
        &mut self,
        name: &str,
        positions: &[f32],
        face_sizes: &[u32],
    ) -> Result<usize, ApiError> {
        let solid = solid_from_flat(positions, face_sizes)?;
        let failures_before = self.viewer.failures().len();
        let result = self.viewer.add_solid(name, &solid);
        self.warn_new_failures(failures_before);
        let index = result?;

        let report = &self.viewer.meshes()[index].report;
        if !report.is_clean() {
            console_warn(&format!(
                "[csg-view] '{}': {} of {} faces skipped, {} degenerate triangles dropped",
                name, report.faces_skipped, report.faces_total, report.degenerate_triangles
            ));
        }
        Ok(index)
    }

    fn warn_new_failures(&self, from: usize) {
        for failure in &self.viewer.failures()[from..] {
            console_warn(&format!(
                "[csg-view] '{}' could not be converted: {}",
                failure.name, failure.error
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square_pyramid() -> (Vec<f32>, Vec<u32>) {
        let base = [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0], [1.0, 0.0, 0.0]];
        let apex = [0.5, 0.5, 1.0];
        let mut positions: Vec<f32> = base.iter().flatten().copied().collect();
        let mut sizes = vec![4];
        for i in 0..4 {
            let a = base[(i + 1) % 4];
            let b = base[i];
            // Side faces wind counter-clockwise seen from outside
            positions.extend_from_slice(&[a[0], a[1], a[2], b[0], b[1], b[2]]);
            positions.extend_from_slice(&apex);
            sizes.push(3);
        }
        (positions, sizes)
    }

    #[test]
    fn test_add_flat_solid() {
        let mut api = CsgViewer::from_config(ViewerConfig::new()).unwrap();
        let (positions, sizes) = unit_square_pyramid();
        let index = api.add_flat_solid("pyramid", &positions, &sizes).unwrap();
        assert_eq!(index, 0);
        let mesh = api.viewer().get(0).unwrap().mesh();
        assert_eq!(mesh.vertex_count(), 5);
        assert_eq!(mesh.triangle_count(), 6);
        assert!((mesh.volume() - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_bad_buffers_are_rejected_before_conversion() {
        let mut api = CsgViewer::from_config(ViewerConfig::new()).unwrap();
        let result = api.add_flat_solid("bad", &[0.0; 9], &[4]);
        assert!(matches!(result, Err(ApiError::Flat(_))));
        assert!(api.viewer().failures().is_empty());
    }

    #[test]
    fn test_empty_solid_is_recorded_as_failure() {
        let mut api = CsgViewer::from_config(ViewerConfig::new()).unwrap();
        let result = api.add_flat_solid("nothing", &[], &[]);
        assert!(matches!(result, Err(ApiError::Processing(_))));
        assert_eq!(api.viewer().failures().len(), 1);
        assert_eq!(api.length(), 0);
    }

    #[test]
    fn test_demo_scene() {
        let mut api = CsgViewer::from_config(ViewerConfig::new()).unwrap();
        assert_eq!(api.load_demo_scene().unwrap(), 10);
        assert!(api.viewer().get_by_name("torus").is_ok());
    }

    #[test]
    fn test_options_into_config() {
        let config = ViewerOptions {
            shading: Some("flat".to_string()),
            wireframe: Some(false),
            normals_length: Some(0.0),
            ..Default::default()
        }
        .into_config()
        .unwrap();
        assert_eq!(config.shading, ShadingMode::Flat);
        assert!(!config.wireframe);
        assert_eq!(config.normals_length, 0.0);

        let bad = ViewerOptions {
            weld_tolerance: Some(-1.0),
            ..Default::default()
        };
        assert!(matches!(bad.into_config(), Err(ApiError::Options(_))));
        let bad = ViewerOptions {
            shading: Some("glossy".to_string()),
            ..Default::default()
        };
        assert!(bad.into_config().is_err());
    }
}
