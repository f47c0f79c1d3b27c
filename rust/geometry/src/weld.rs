// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vertex welding
//!
//! Triangle corners whose positions round to the same key share one vertex.
//! The key is the position rounded to the number of decimal places derived
//! from the weld tolerance, so the result depends only on the input stream:
//! the same triangles always produce the same positions in the same order.

use crate::options::{decimal_places, ConversionOptions, ShadingMode};
use crate::triangulation::Triangle;
use nalgebra::Point3;
use rustc_hash::FxHashMap;

/// Position rounded to a fixed number of decimal places
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuantizedKey([i64; 3]);

impl QuantizedKey {
    /// Quantize `p` with `scale = 10^decimals`. `None` for coordinates that
    /// cannot be represented (NaN, infinite, or out of `i64` range); such
    /// vertices are never welded.
    #[inline]
    pub fn new(p: &Point3<f64>, scale: f64) -> Option<Self> {
        const LIMIT: f64 = i64::MAX as f64;
        let mut key = [0i64; 3];
        for (slot, value) in key.iter_mut().zip(p.iter()) {
            let scaled = (value * scale).round();
            if !scaled.is_finite() || scaled.abs() >= LIMIT {
                return None;
            }
            // -0.0 and 0.0 both become 0
            *slot = scaled as i64;
        }
        Some(Self(key))
    }
}

/// Index triple plus the face it came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexedTriangle {
    pub indices: [u32; 3],
    pub face: usize,
}

impl IndexedTriangle {
    #[inline]
    pub fn new(a: u32, b: u32, c: u32, face: usize) -> Self {
        Self {
            indices: [a, b, c],
            face,
        }
    }

    /// Two corners share a vertex
    #[inline]
    pub fn is_collapsed(&self) -> bool {
        let [a, b, c] = self.indices;
        a == b || b == c || a == c
    }
}

/// Output of the welding stage
#[derive(Debug, Clone, Default)]
pub struct IndexedTriangles {
    /// Distinct vertex positions in first-seen order
    pub positions: Vec<Point3<f64>>,
    pub triangles: Vec<IndexedTriangle>,
    /// Source faces of triangles dropped because welding merged two of
    /// their corners, one entry per triangle
    pub collapsed: Vec<usize>,
}

/// Maps quantized positions to vertex indices
#[derive(Debug, Clone)]
pub struct VertexIndexer {
    scale: f64,
    shading: ShadingMode,
    lookup: FxHashMap<QuantizedKey, u32>,
    positions: Vec<Point3<f64>>,
}

impl VertexIndexer {
    pub fn new(tolerance: f64, shading: ShadingMode) -> Self {
        Self {
            scale: 10f64.powi(decimal_places(tolerance) as i32),
            shading,
            lookup: FxHashMap::default(),
            positions: Vec::new(),
        }
    }

    pub fn from_options(options: &ConversionOptions) -> Self {
        Self::new(options.weld_tolerance, options.shading)
    }

    /// Reserve room for `additional` more vertices
    pub fn reserve(&mut self, additional: usize) {
        self.positions.reserve(additional);
        if self.shading == ShadingMode::Smooth {
            self.lookup.reserve(additional);
        }
    }

    /// Index of the vertex at `p`, appending a new one when no vertex with
    /// the same key exists. In flat mode every call appends.
    pub fn insert(&mut self, p: Point3<f64>) -> u32 {
        if self.shading == ShadingMode::Flat {
            return self.push(p);
        }
        match QuantizedKey::new(&p, self.scale) {
            Some(key) => {
                if let Some(&index) = self.lookup.get(&key) {
                    return index;
                }
                let index = self.push(p);
                self.lookup.insert(key, index);
                index
            }
            None => self.push(p),
        }
    }

    #[inline]
    fn push(&mut self, p: Point3<f64>) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(p);
        index
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[inline]
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    pub fn into_positions(self) -> Vec<Point3<f64>> {
        self.positions
    }
}

/// Weld the full triangle stream of one solid
pub fn index_triangles(triangles: &[Triangle], options: &ConversionOptions) -> IndexedTriangles {
    let mut indexer = VertexIndexer::from_options(options);
    indexer.reserve(match options.shading {
        ShadingMode::Smooth => triangles.len(),
        ShadingMode::Flat => triangles.len() * 3,
    });

    let mut indexed = Vec::with_capacity(triangles.len());
    let mut collapsed = Vec::new();
    for triangle in triangles {
        let a = indexer.insert(triangle.v0);
        let b = indexer.insert(triangle.v1);
        let c = indexer.insert(triangle.v2);
        let tri = IndexedTriangle::new(a, b, c, triangle.face);
        if tri.is_collapsed() {
            collapsed.push(triangle.face);
        } else {
            indexed.push(tri);
        }
    }

    IndexedTriangles {
        positions: indexer.into_positions(),
        triangles: indexed,
        collapsed,
    }
}
