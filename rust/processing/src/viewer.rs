// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The viewer context: converts solids and keeps the resulting meshes.

use crate::config::ViewerConfig;
use crate::error::{Error, Result};
use crate::renderable::{DrawVariant, MeshSummary, RenderableMesh};
use csg_view_geometry::{convert_batch, convert_solid, Conversion, ConversionOptions, Solid};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::time::Instant;

/// A solid that could not be converted.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionFailure {
    pub name: String,
    pub error: String,
}

/// Totals over all registered meshes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SceneStats {
    pub total_meshes: usize,
    pub total_vertices: usize,
    pub total_triangles: usize,
    pub faces_skipped: usize,
    pub degenerate_triangles: usize,
    pub failures: usize,
    /// Time spent converting solids (ms).
    pub conversion_time_ms: u64,
}

/// Everything the viewer knows, ready for serialization.
#[derive(Debug, Clone, Serialize)]
pub struct SceneReport {
    pub config: ViewerConfig,
    pub stats: SceneStats,
    pub meshes: Vec<MeshSummary>,
    pub failures: Vec<ConversionFailure>,
}

/// Explicit scene context. Holds the configuration, the registered meshes
/// in insertion order, and the solids that failed to convert.
pub struct Viewer {
    config: ViewerConfig,
    options: ConversionOptions,
    meshes: Vec<RenderableMesh>,
    by_name: FxHashMap<String, usize>,
    failures: Vec<ConversionFailure>,
    pool: Option<rayon::ThreadPool>,
    conversion_time_ms: u64,
}

impl Viewer {
    /// Create a viewer. A dedicated thread pool is built when the config
    /// asks for a specific number of worker threads.
    pub fn new(config: ViewerConfig) -> Result<Self> {
        let pool = match config.worker_threads {
            Some(threads) => Some(rayon::ThreadPoolBuilder::new().num_threads(threads).build()?),
            None => None,
        };
        Ok(Self {
            options: config.conversion_options(),
            config,
            meshes: Vec::new(),
            by_name: FxHashMap::default(),
            failures: Vec::new(),
            pool,
            conversion_time_ms: 0,
        })
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Convert one solid and register it. Returns the mesh index.
    ///
    /// On failure the solid is recorded in [`Viewer::failures`] and the
    /// error returned; previously registered meshes are untouched.
    pub fn add_solid(&mut self, name: impl Into<String>, solid: &Solid) -> Result<usize> {
        let name = name.into();
        let start = Instant::now();
        let result = convert_solid(solid, &self.options);
        self.conversion_time_ms += start.elapsed().as_millis() as u64;

        match result {
            Ok(conversion) => Ok(self.register(name, conversion)),
            Err(e) => {
                self.record_failure(name, &e);
                Err(Error::Geometry(e))
            }
        }
    }

    /// Convert many solids in parallel and register the successful ones in
    /// input order. Returns how many meshes were added.
    pub fn add_solids(&mut self, solids: Vec<(String, Solid)>) -> usize {
        let (names, solids): (Vec<String>, Vec<Solid>) = solids.into_iter().unzip();

        let start = Instant::now();
        let options = self.options;
        let results = match &self.pool {
            Some(pool) => pool.install(|| convert_batch(&solids, &options)),
            None => convert_batch(&solids, &options),
        };
        self.conversion_time_ms += start.elapsed().as_millis() as u64;

        let mut added = 0;
        for (name, result) in names.into_iter().zip(results) {
            match result {
                Ok(conversion) => {
                    self.register(name, conversion);
                    added += 1;
                }
                Err(e) => self.record_failure(name, &e),
            }
        }

        let stats = self.stats();
        tracing::info!(
            added,
            failed = solids.len() - added,
            total_meshes = stats.total_meshes,
            total_triangles = stats.total_triangles,
            conversion_time_ms = stats.conversion_time_ms,
            "Scene updated"
        );
        added
    }

    fn register(&mut self, name: String, conversion: Conversion) -> usize {
        let Conversion { mesh, report } = conversion;
        tracing::debug!(
            name = %name,
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            skipped = report.faces_skipped,
            "Registered mesh"
        );
        let index = self.meshes.len();
        let variants = DrawVariant::defaults_for(&self.config);
        self.by_name.insert(name.clone(), index);
        self.meshes.push(RenderableMesh::new(name, mesh, variants, report));
        index
    }

    fn record_failure(&mut self, name: String, error: &csg_view_geometry::Error) {
        tracing::warn!(name = %name, error = %error, "Conversion failed");
        self.failures.push(ConversionFailure {
            name,
            error: error.to_string(),
        });
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RenderableMesh> {
        self.meshes.get(index)
    }

    /// Most recently registered mesh with this name.
    pub fn get_by_name(&self, name: &str) -> Result<&RenderableMesh> {
        self.by_name
            .get(name)
            .and_then(|&i| self.meshes.get(i))
            .ok_or_else(|| Error::UnknownMesh(name.to_string()))
    }

    pub fn meshes(&self) -> &[RenderableMesh] {
        &self.meshes
    }

    pub fn failures(&self) -> &[ConversionFailure] {
        &self.failures
    }

    pub fn stats(&self) -> SceneStats {
        SceneStats {
            total_meshes: self.meshes.len(),
            total_vertices: self.meshes.iter().map(|m| m.mesh().vertex_count()).sum(),
            total_triangles: self.meshes.iter().map(|m| m.mesh().triangle_count()).sum(),
            faces_skipped: self.meshes.iter().map(|m| m.report.faces_skipped).sum(),
            degenerate_triangles: self
                .meshes
                .iter()
                .map(|m| m.report.degenerate_triangles)
                .sum(),
            failures: self.failures.len(),
            conversion_time_ms: self.conversion_time_ms,
        }
    }

    pub fn report(&self) -> SceneReport {
        SceneReport {
            config: self.config.clone(),
            stats: self.stats(),
            meshes: self.meshes.iter().map(RenderableMesh::summary).collect(),
            failures: self.failures.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csg_view_geometry::primitives::{cube, sphere};
    use csg_view_geometry::{Polygon, ShadingMode};

    fn viewer() -> Viewer {
        Viewer::new(ViewerConfig::new()).unwrap()
    }

    #[test]
    fn test_add_solid() {
        let mut viewer = viewer();
        let index = viewer.add_solid("cube", &cube(2.0).unwrap()).unwrap();
        assert_eq!(index, 0);
        assert_eq!(viewer.len(), 1);
        assert_eq!(viewer.get_by_name("cube").unwrap().mesh().vertex_count(), 8);
        assert!(matches!(viewer.get_by_name("torus"), Err(Error::UnknownMesh(_))));
    }

    #[test]
    fn test_failed_solid_is_recorded() {
        let mut viewer = viewer();
        viewer.add_solid("cube", &cube(1.0).unwrap()).unwrap();
        let broken = Solid::new(vec![Polygon::from_coords(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]])]);
        assert!(viewer.add_solid("broken", &broken).is_err());
        assert_eq!(viewer.len(), 1);
        assert_eq!(viewer.failures().len(), 1);
        assert_eq!(viewer.failures()[0].name, "broken");
    }

    #[test]
    fn test_add_solids_in_order() {
        let mut viewer = Viewer::new(ViewerConfig {
            worker_threads: Some(2),
            ..ViewerConfig::new()
        })
        .unwrap();
        let added = viewer.add_solids(vec![
            ("a".to_string(), cube(1.0).unwrap()),
            ("empty".to_string(), Solid::default()),
            ("b".to_string(), sphere(1.0, 12).unwrap()),
        ]);
        assert_eq!(added, 2);
        assert_eq!(viewer.get(0).unwrap().name, "a");
        assert_eq!(viewer.get(1).unwrap().name, "b");
        assert_eq!(viewer.stats().failures, 1);
        // Sphere: 24 pole triangles plus 48 quads
        assert_eq!(viewer.stats().total_triangles, 12 + 24 + 96);
    }

    #[test]
    fn test_flat_config_reaches_conversion() {
        let mut viewer = Viewer::new(ViewerConfig {
            shading: ShadingMode::Flat,
            ..ViewerConfig::new()
        })
        .unwrap();
        viewer.add_solid("cube", &cube(1.0).unwrap()).unwrap();
        assert_eq!(viewer.get(0).unwrap().mesh().vertex_count(), 36);
    }

    #[test]
    fn test_report_serializes() {
        let mut viewer = viewer();
        viewer.add_solid("cube", &cube(1.0).unwrap()).unwrap();
        let json = serde_json::to_value(viewer.report()).unwrap();
        assert_eq!(json["stats"]["total_meshes"], 1);
        assert_eq!(json["config"]["shading"], "smooth");
        assert_eq!(json["meshes"][0]["name"], "cube");
    }
}
