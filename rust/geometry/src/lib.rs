// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CSG-View Geometry
//!
//! Converts polygon-soup solids, as produced by CSG boolean operations, into
//! indexed triangle meshes with smooth per-vertex normals.
//!
//! The conversion runs five stages in order: polygon extraction,
//! ear-clipping triangulation, vertex welding, normal averaging and mesh
//! assembly. See [`convert_solid`].

pub mod convert;
pub mod csg;
pub mod error;
pub mod extract;
pub mod mesh;
pub mod normals;
pub mod options;
pub mod primitives;
pub mod solid;
pub mod transform;
pub mod triangulation;
pub mod weld;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point2, Point3, Vector2, Vector3};

pub use convert::{convert_batch, convert_solid, Conversion, ConversionReport, SkippedFace};
pub use error::{Error, PolygonDefect, Result};
pub use extract::{extract_polygons, ExtractedPolygon, PolygonExtractor};
pub use mesh::{assemble, Mesh};
pub use normals::{compute_vertex_normals, VertexNormals, WeldedVertex};
pub use options::{ConversionOptions, ShadingMode};
pub use solid::{Polygon, Solid};
pub use triangulation::{triangulate_face, triangulate_polygon, FaceTriangulation, Triangle};
pub use weld::{index_triangles, IndexedTriangle, IndexedTriangles, QuantizedKey, VertexIndexer};
