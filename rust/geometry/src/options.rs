// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversion tolerances and shading mode

use std::str::FromStr;

/// Default weld tolerance in model units
pub const DEFAULT_WELD_TOLERANCE: f64 = 1e-6;
/// Deviation above which a face is flagged near-planar
pub const DEFAULT_PLANAR_TOLERANCE: f64 = 1e-4;
/// Deviation above which a face is rejected outright
pub const DEFAULT_PLANAR_CEILING: f64 = 1e-2;

/// How triangle corners are shared between faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadingMode {
    /// Weld coincident vertices and average normals across faces
    #[default]
    Smooth,
    /// Every triangle corner gets a private vertex (faceted look)
    Flat,
}

impl FromStr for ShadingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "smooth" => Ok(ShadingMode::Smooth),
            "flat" | "faceted" => Ok(ShadingMode::Flat),
            other => Err(format!("unknown shading mode '{}'", other)),
        }
    }
}

/// Options controlling one solid-to-mesh conversion.
///
/// Immutable and `Copy`, so a single value can be shared by conversions
/// running on different threads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionOptions {
    /// Positions closer than this weld into one vertex (ε)
    pub weld_tolerance: f64,
    /// Faces deviating more than this from their plane are flagged near-planar
    pub planar_tolerance: f64,
    /// Faces deviating more than this (relative for large faces) are skipped
    pub planar_ceiling: f64,
    pub shading: ShadingMode,
}

impl ConversionOptions {
    pub fn new() -> Self {
        Self {
            weld_tolerance: DEFAULT_WELD_TOLERANCE,
            planar_tolerance: DEFAULT_PLANAR_TOLERANCE,
            planar_ceiling: DEFAULT_PLANAR_CEILING,
            shading: ShadingMode::Smooth,
        }
    }

    /// Faceted output: no welding
    pub fn flat() -> Self {
        Self::new().with_shading(ShadingMode::Flat)
    }

    pub fn with_weld_tolerance(mut self, tolerance: f64) -> Self {
        self.weld_tolerance = tolerance.abs().max(f64::EPSILON);
        self
    }

    pub fn with_planar_tolerance(mut self, tolerance: f64) -> Self {
        self.planar_tolerance = tolerance.abs();
        self
    }

    pub fn with_planar_ceiling(mut self, ceiling: f64) -> Self {
        self.planar_ceiling = ceiling.abs();
        self
    }

    pub fn with_shading(mut self, shading: ShadingMode) -> Self {
        self.shading = shading;
        self
    }

    /// Squared tolerance, the area threshold for degenerate faces and triangles
    #[inline]
    pub fn area_epsilon(&self) -> f64 {
        self.weld_tolerance * self.weld_tolerance
    }

    /// Number of decimal places positions are rounded to when welding
    #[inline]
    pub fn decimal_places(&self) -> u32 {
        decimal_places(self.weld_tolerance)
    }
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Decimal places derived from a tolerance: 1e-6 -> 6, 5e-4 -> 4
#[inline]
pub fn decimal_places(tolerance: f64) -> u32 {
    if !tolerance.is_finite() || tolerance <= 0.0 {
        return 12;
    }
    let places = (-tolerance.log10()).ceil();
    places.clamp(0.0, 12.0) as u32
}
