// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon extraction and validation
//!
//! Walks the faces of a [`Solid`] lazily and yields each one together with
//! its best-fit plane. Faces with fewer than three distinct vertices, zero
//! area or a gross planarity defect come out as [`Error::InvalidPolygon`] so
//! the caller can count and skip them. Small planarity deviations left by
//! boolean operations only set the `near_planar` flag.

use crate::error::{Error, PolygonDefect, Result};
use crate::options::ConversionOptions;
use crate::solid::{newell_normal, Polygon, Solid};
use nalgebra::{Point3, Vector3};
use smallvec::SmallVec;
use std::iter::Enumerate;
use std::slice::Iter;

/// Face vertices; most CSG faces are triangles or quads
pub type FacePoints = SmallVec<[Point3<f64>; 8]>;

/// A validated face ready for triangulation
#[derive(Debug, Clone)]
pub struct ExtractedPolygon {
    /// Index of the face in the source solid
    pub face: usize,
    /// Vertex loop with consecutive duplicates removed
    pub points: FacePoints,
    /// Unit normal of the best-fit plane (follows the loop's winding)
    pub normal: Vector3<f64>,
    /// Vertex centroid, a point on the best-fit plane
    pub centroid: Point3<f64>,
    pub area: f64,
    /// Largest perpendicular distance of a vertex from the best-fit plane
    pub max_deviation: f64,
    /// Deviation exceeded the planar tolerance but not the ceiling
    pub near_planar: bool,
}

/// Lazy iterator over the faces of a solid
pub struct PolygonExtractor<'a> {
    faces: Enumerate<Iter<'a, Polygon>>,
    options: ConversionOptions,
}

/// Start extracting the faces of `solid`
pub fn extract_polygons<'a>(solid: &'a Solid, options: &ConversionOptions) -> PolygonExtractor<'a> {
    PolygonExtractor {
        faces: solid.polygons.iter().enumerate(),
        options: *options,
    }
}

impl<'a> Iterator for PolygonExtractor<'a> {
    type Item = Result<ExtractedPolygon>;

    fn next(&mut self) -> Option<Self::Item> {
        let (face, polygon) = self.faces.next()?;
        Some(extract_polygon(face, polygon, &self.options))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.faces.size_hint()
    }
}

impl ExactSizeIterator for PolygonExtractor<'_> {}

/// Validate a single face
pub fn extract_polygon(
    face: usize,
    polygon: &Polygon,
    options: &ConversionOptions,
) -> Result<ExtractedPolygon> {
    let invalid = |reason| Error::InvalidPolygon { face, reason };

    if polygon
        .vertices
        .iter()
        .any(|p| !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()))
    {
        return Err(invalid(PolygonDefect::NonFinite));
    }

    let points = collapse_duplicates(&polygon.vertices, options.weld_tolerance);
    if points.len() < 3 {
        return Err(invalid(PolygonDefect::TooFewVertices(points.len())));
    }

    let newell = newell_normal(&points);
    let area = newell.norm() * 0.5;
    if area <= options.area_epsilon() {
        return Err(invalid(PolygonDefect::ZeroArea));
    }
    let normal = newell / (area * 2.0);

    let count = points.len() as f64;
    let centroid = Point3::from(points.iter().map(|p| p.coords).sum::<Vector3<f64>>() / count);

    let max_deviation = points
        .iter()
        .map(|p| (p - centroid).dot(&normal).abs())
        .fold(0.0f64, f64::max);

    // The ceiling scales with the face size so large faces tolerate
    // proportionally larger drift
    let ceiling = options.planar_ceiling * bounding_diagonal(&points).max(1.0);
    if max_deviation > ceiling {
        return Err(invalid(PolygonDefect::NonPlanar));
    }

    Ok(ExtractedPolygon {
        face,
        points,
        normal,
        centroid,
        area,
        max_deviation,
        near_planar: max_deviation > options.planar_tolerance,
    })
}

/// Drop consecutive vertices (including last/first) closer than `tolerance`
fn collapse_duplicates(vertices: &[Point3<f64>], tolerance: f64) -> FacePoints {
    let tolerance_sq = tolerance * tolerance;
    let mut points = FacePoints::with_capacity(vertices.len());
    for p in vertices {
        match points.last() {
            Some(last) if (p - last).norm_squared() <= tolerance_sq => {}
            _ => points.push(*p),
        }
    }
    while points.len() > 1 {
        let first = points[0];
        match points.last() {
            Some(last) if (first - last).norm_squared() <= tolerance_sq => {
                points.pop();
            }
            _ => break,
        }
    }
    points
}

fn bounding_diagonal(points: &[Point3<f64>]) -> f64 {
    let mut min = Point3::new(f64::MAX, f64::MAX, f64::MAX);
    let mut max = Point3::new(f64::MIN, f64::MIN, f64::MIN);
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        min.z = min.z.min(p.z);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
        max.z = max.z.max(p.z);
    }
    (max - min).norm()
}
