// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Solid to mesh conversion
//!
//! Runs extraction, triangulation, welding, normal computation and assembly
//! strictly in that order. Each conversion owns all of its intermediate
//! state, so independent solids can be converted on different threads.

use crate::error::{Error, PolygonDefect, Result};
use crate::extract::extract_polygons;
use crate::mesh::{assemble, Mesh};
use crate::normals::compute_vertex_normals;
use crate::options::ConversionOptions;
use crate::solid::Solid;
use crate::triangulation::triangulate_face;
use crate::weld::index_triangles;
use rayon::prelude::*;
use tracing::{debug, warn};

/// A face left out of the mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedFace {
    pub face: usize,
    pub reason: PolygonDefect,
}

/// Counters collected during one conversion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionReport {
    pub faces_total: usize,
    pub faces_skipped: usize,
    pub near_planar_faces: usize,
    /// Zero-area triangles omitted from the mesh or left out of normal
    /// accumulation
    pub degenerate_triangles: usize,
    /// Vertices that ended up with the zero normal
    pub vertices_without_normal: usize,
    pub skipped: Vec<SkippedFace>,
    /// One [`Error::DegenerateTriangle`] per triangle left out of the mesh
    pub omitted: Vec<Error>,
}

impl ConversionReport {
    /// Whether anything was skipped, dropped or approximated
    pub fn is_clean(&self) -> bool {
        self.faces_skipped == 0
            && self.near_planar_faces == 0
            && self.degenerate_triangles == 0
            && self.vertices_without_normal == 0
    }

    fn omit_triangles(&mut self, face: usize, count: usize) {
        self.degenerate_triangles += count;
        self.omitted
            .extend(std::iter::repeat(Error::DegenerateTriangle { face }).take(count));
    }
}

/// A finished mesh and what happened while building it
#[derive(Debug, Clone)]
pub struct Conversion {
    pub mesh: Mesh,
    pub report: ConversionReport,
}

/// Convert one solid into an indexed triangle mesh.
///
/// Invalid faces are skipped and reported. Fails with
/// [`Error::EmptyMesh`] when no triangle survives; no partial mesh is
/// returned in that case.
pub fn convert_solid(solid: &Solid, options: &ConversionOptions) -> Result<Conversion> {
    let area_epsilon = options.area_epsilon();
    let mut report = ConversionReport {
        faces_total: solid.len(),
        ..Default::default()
    };

    let mut triangles = Vec::with_capacity(solid.vertex_count());
    for extracted in extract_polygons(solid, options) {
        let face = match extracted {
            Ok(face) => face,
            Err(Error::InvalidPolygon { face, reason }) => {
                warn!(face, %reason, "skipping face");
                report.faces_skipped += 1;
                report.skipped.push(SkippedFace { face, reason });
                continue;
            }
            Err(e) => return Err(e),
        };
        if face.near_planar {
            report.near_planar_faces += 1;
        }

        match triangulate_face(&face, area_epsilon) {
            Ok(result) => {
                report.omit_triangles(face.face, result.degenerate);
                triangles.extend(result.triangles);
            }
            Err(e) if e.is_recoverable() => {
                // A face that cannot be triangulated contributes nothing
                warn!(face = face.face, error = %e, "triangulation failed");
                report.omit_triangles(face.face, face.points.len().saturating_sub(2));
            }
            Err(e) => return Err(e),
        }
    }

    if triangles.is_empty() {
        return Err(Error::EmptyMesh(format!(
            "no triangles from {} faces ({} skipped)",
            report.faces_total, report.faces_skipped
        )));
    }

    let welded = index_triangles(&triangles, options);
    for &face in &welded.collapsed {
        report.omit_triangles(face, 1);
    }
    if welded.triangles.is_empty() {
        return Err(Error::EmptyMesh(format!(
            "all {} triangles collapsed while welding",
            triangles.len()
        )));
    }

    let normals = compute_vertex_normals(&welded.positions, &welded.triangles, area_epsilon);
    report.degenerate_triangles += normals.degenerate_triangles;
    report.vertices_without_normal = normals.missing;

    let mesh = assemble(&welded.positions, &normals.normals, &welded.triangles)?;

    debug!(
        faces = report.faces_total,
        skipped = report.faces_skipped,
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "converted solid"
    );

    Ok(Conversion { mesh, report })
}

/// Convert many solids in parallel. One result per input, in input order;
/// a failed solid does not affect the others.
pub fn convert_batch(solids: &[Solid], options: &ConversionOptions) -> Vec<Result<Conversion>> {
    solids
        .par_iter()
        .map(|solid| convert_solid(solid, options))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solid::Polygon;
    use approx::assert_relative_eq;

    #[test]
    fn test_single_quad() {
        let solid = Solid::new(vec![Polygon::from_coords(&[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ])]);

        let Conversion { mesh, report } = convert_solid(&solid, &ConversionOptions::default()).unwrap();

        assert_eq!(
            mesh.positions,
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0]
        );
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        for i in 0..4 {
            assert_eq!(mesh.normal(i).unwrap(), nalgebra::Vector3::new(0.0, 0.0, 1.0));
        }
        assert!(report.is_clean());
    }

    #[test]
    fn test_zero_area_face_is_skipped() {
        let solid = Solid::new(vec![
            Polygon::from_coords(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]]),
            Polygon::from_coords(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]]),
        ]);
        let conversion = convert_solid(&solid, &ConversionOptions::default()).unwrap();
        assert_eq!(conversion.report.faces_skipped, 1);
        assert_eq!(
            conversion.report.skipped,
            vec![SkippedFace {
                face: 1,
                reason: PolygonDefect::ZeroArea
            }]
        );
        assert_eq!(conversion.mesh.triangle_count(), 1);
        assert_relative_eq!(conversion.mesh.surface_area(), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_sliver_triangle_is_omitted_and_reported() {
        // Convex quad whose fan leaves a sliver (area 0.01) along the diagonal
        let solid = Solid::new(vec![Polygon::from_coords(&[
            [0.0, 0.0, 0.0],
            [10.0, 0.0, 0.0],
            [10.0, 1.0, 0.0],
            [5.0, 0.502, 0.0],
        ])]);
        let options = ConversionOptions::default().with_weld_tolerance(0.15);

        let Conversion { mesh, report } = convert_solid(&solid, &options).unwrap();

        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(report.degenerate_triangles, 1);
        assert_eq!(report.omitted, vec![Error::DegenerateTriangle { face: 0 }]);
        assert!(report.omitted[0].is_recoverable());
        assert!(!report.is_clean());
    }

    #[test]
    fn test_no_valid_faces_is_empty_mesh() {
        let solid = Solid::new(vec![Polygon::from_coords(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]])]);
        assert!(matches!(
            convert_solid(&solid, &ConversionOptions::default()),
            Err(Error::EmptyMesh(_))
        ));
        assert!(matches!(
            convert_solid(&Solid::default(), &ConversionOptions::default()),
            Err(Error::EmptyMesh(_))
        ));
    }

    #[test]
    fn test_batch_keeps_order_and_isolates_failures() {
        let good = Solid::new(vec![Polygon::from_coords(&[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
        ])]);
        let results = convert_batch(
            &[good.clone(), Solid::default(), good],
            &ConversionOptions::default(),
        );
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(Error::EmptyMesh(_))));
        assert!(results[2].is_ok());
    }
}
