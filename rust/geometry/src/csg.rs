// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Boolean operations through csgrs
//!
//! Solids are handed to csgrs as polygons carrying their face normal and
//! read back as plain vertex loops. The boolean algorithm is entirely
//! csgrs'; its output is what the conversion pipeline is built to tolerate
//! (split faces, slivers, small planarity drift).

use crate::solid::{Polygon, Solid};
use csgrs::mesh::{polygon::Polygon as CSGPolygon, vertex::Vertex, Mesh as CSGMesh};
use csgrs::traits::CSG;
use std::fmt::Debug;

impl<S: Clone + Send + Sync + Debug> From<&CSGMesh<S>> for Solid {
    fn from(csg_mesh: &CSGMesh<S>) -> Self {
        csg_mesh
            .polygons
            .iter()
            .filter(|polygon| polygon.vertices.len() >= 3)
            .map(|polygon| {
                Polygon::new(
                    polygon
                        .vertices
                        .iter()
                        .map(|v| v.pos)
                        .collect(),
                )
            })
            .collect()
    }
}

impl Solid {
    /// Convert to a csgrs mesh. Faces without a usable normal are left out.
    pub fn to_csgrs(&self) -> CSGMesh<()> {
        let polygons: Vec<CSGPolygon<()>> = self
            .polygons
            .iter()
            .filter(|polygon| polygon.len() >= 3)
            .filter_map(|polygon| {
                // Skip degenerate faces to avoid NaN propagation
                let normal = polygon.newell_normal().try_normalize(1e-10)?;
                let vertices = polygon
                    .vertices
                    .iter()
                    .map(|p| Vertex::new(*p, normal))
                    .collect();
                Some(CSGPolygon::new(vertices, None))
            })
            .collect();

        CSGMesh::from_polygons(&polygons, None)
    }
}

/// Everything inside either solid
pub fn union(a: &Solid, b: &Solid) -> Solid {
    Solid::from(&a.to_csgrs().union(&b.to_csgrs()))
}

/// Everything inside both solids
pub fn intersect(a: &Solid, b: &Solid) -> Solid {
    Solid::from(&a.to_csgrs().intersection(&b.to_csgrs()))
}

/// `a` with `b` removed
pub fn subtract(a: &Solid, b: &Solid) -> Solid {
    // Fast path: nothing to remove
    if b.is_empty() {
        return a.clone();
    }
    Solid::from(&a.to_csgrs().difference(&b.to_csgrs()))
}
