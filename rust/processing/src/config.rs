// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Viewer configuration loaded from environment variables.

use csg_view_geometry::options::{DEFAULT_PLANAR_TOLERANCE, DEFAULT_WELD_TOLERANCE};
use csg_view_geometry::{ConversionOptions, ShadingMode};
use serde::Serialize;

/// Default length of the vertex-normal overlay lines.
pub const DEFAULT_NORMALS_LENGTH: f32 = 0.3;

/// Viewer configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewerConfig {
    /// Positions closer than this weld into one vertex.
    pub weld_tolerance: f64,
    /// Planarity deviation above which a face is flagged near-planar.
    pub planar_tolerance: f64,
    /// Smooth (welded) or flat (faceted) shading.
    #[serde(serialize_with = "serialize_shading")]
    pub shading: ShadingMode,
    /// Add a wireframe draw variant to every mesh.
    pub wireframe: bool,
    /// Length of the vertex-normal overlay; 0 disables it.
    pub normals_length: f32,
    /// Number of worker threads for batch conversion (None = rayon default).
    pub worker_threads: Option<usize>,
}

fn serialize_shading<S: serde::Serializer>(shading: &ShadingMode, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(match shading {
        ShadingMode::Smooth => "smooth",
        ShadingMode::Flat => "flat",
    })
}

impl ViewerConfig {
    /// Built-in defaults, without reading the environment.
    pub fn new() -> Self {
        Self {
            weld_tolerance: DEFAULT_WELD_TOLERANCE,
            planar_tolerance: DEFAULT_PLANAR_TOLERANCE,
            shading: ShadingMode::Smooth,
            wireframe: true,
            normals_length: DEFAULT_NORMALS_LENGTH,
            worker_threads: None,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`; missing or unparsable values fall
    /// back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::new();
        Self {
            weld_tolerance: lookup("CSG_VIEW_WELD_TOLERANCE")
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite() && *v > 0.0)
                .unwrap_or(defaults.weld_tolerance),
            planar_tolerance: lookup("CSG_VIEW_PLANAR_TOLERANCE")
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite() && *v >= 0.0)
                .unwrap_or(defaults.planar_tolerance),
            shading: lookup("CSG_VIEW_SHADING")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.shading),
            wireframe: lookup("CSG_VIEW_WIREFRAME")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.wireframe),
            normals_length: lookup("CSG_VIEW_NORMALS_LENGTH")
                .and_then(|v| v.trim().parse::<f32>().ok())
                .filter(|v| v.is_finite() && *v >= 0.0)
                .unwrap_or(defaults.normals_length),
            worker_threads: lookup("CSG_VIEW_WORKER_THREADS")
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|n| *n > 0),
        }
    }

    /// Options for each solid-to-mesh conversion.
    pub fn conversion_options(&self) -> ConversionOptions {
        ConversionOptions::new()
            .with_weld_tolerance(self.weld_tolerance)
            .with_planar_tolerance(self.planar_tolerance)
            .with_shading(self.shading)
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
