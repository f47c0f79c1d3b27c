// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;
use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Why a face was rejected by the polygon extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonDefect {
    /// Fewer than 3 distinct vertices
    TooFewVertices(usize),
    /// Enclosed area at or below the squared weld tolerance
    ZeroArea,
    /// A coordinate is NaN or infinite
    NonFinite,
    /// Deviation from the best-fit plane beyond the hard ceiling
    NonPlanar,
}

impl fmt::Display for PolygonDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolygonDefect::TooFewVertices(n) => write!(f, "only {} distinct vertices", n),
            PolygonDefect::ZeroArea => write!(f, "zero area"),
            PolygonDefect::NonFinite => write!(f, "non-finite coordinate"),
            PolygonDefect::NonPlanar => write!(f, "deviates from its plane beyond the ceiling"),
        }
    }
}

/// Errors that can occur while converting solids into meshes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Recoverable: the face is skipped and counted, conversion continues
    #[error("Invalid polygon (face {face}): {reason}")]
    InvalidPolygon { face: usize, reason: PolygonDefect },

    /// Recoverable: the triangle is omitted or excluded from normal accumulation
    #[error("Degenerate triangle in face {face}")]
    DegenerateTriangle { face: usize },

    #[error("Triangulation failed: {0}")]
    Triangulation(String),

    /// Terminal for one conversion: nothing renderable was produced
    #[error("Empty mesh: {0}")]
    EmptyMesh(String),

    /// A bug in an earlier pipeline stage; never retried
    #[error("Assembly invariant violated: {0}")]
    AssemblyInvariantViolation(String),

    #[error("Invalid primitive: {0}")]
    InvalidPrimitive(String),
}

impl Error {
    /// Whether the conversion can continue past this error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::InvalidPolygon { .. } | Error::DegenerateTriangle { .. } | Error::Triangulation(_)
        )
    }
}
