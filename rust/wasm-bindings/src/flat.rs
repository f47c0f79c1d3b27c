// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Solids passed from JavaScript as flat buffers.
//!
//! `positions` holds x, y, z triples for every polygon vertex in order;
//! `face_sizes` holds the vertex count of each polygon.

use csg_view_geometry::{Point3, Polygon, Solid};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlatSolidError {
    #[error("positions length {0} is not a multiple of 3")]
    RaggedPositions(usize),

    #[error("face sizes cover {expected} vertices but positions hold {actual}")]
    VertexCountMismatch { expected: usize, actual: usize },
}

/// Rebuild a [`Solid`] from flat buffers.
///
/// Face sizes below 3 are kept as-is; the conversion pipeline reports
/// such faces as skipped instead of failing the whole solid.
pub fn solid_from_flat(positions: &[f32], face_sizes: &[u32]) -> Result<Solid, FlatSolidError> {
    if positions.len() % 3 != 0 {
        return Err(FlatSolidError::RaggedPositions(positions.len()));
    }
    let actual = positions.len() / 3;
    let expected: usize = face_sizes.iter().map(|&n| n as usize).sum();
    if expected != actual {
        return Err(FlatSolidError::VertexCountMismatch { expected, actual });
    }

    let mut points = positions
        .chunks_exact(3)
        .map(|c| Point3::new(c[0] as f64, c[1] as f64, c[2] as f64));

    Ok(face_sizes
        .iter()
        .map(|&n| Polygon::new(points.by_ref().take(n as usize).collect()))
        .collect())
}
