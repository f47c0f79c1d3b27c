// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Affine transforms of solids

use crate::solid::Solid;
use nalgebra::{Matrix4, Rotation3, Vector3};

impl Solid {
    /// Apply an affine transform to every vertex.
    ///
    /// A transform that mirrors (negative determinant of the linear part)
    /// also reverses each face loop so faces keep pointing outward.
    pub fn transform(&self, matrix: &Matrix4<f64>) -> Solid {
        let mirrors = matrix.fixed_view::<3, 3>(0, 0).determinant() < 0.0;
        let mut result: Solid = self
            .polygons
            .iter()
            .map(|polygon| {
                let mut polygon = polygon.clone();
                for p in polygon.vertices.iter_mut() {
                    *p = matrix.transform_point(p);
                }
                polygon
            })
            .collect();
        if mirrors {
            result.polygons.iter_mut().for_each(|p| p.flip());
        }
        result
    }

    pub fn translate(&self, offset: [f64; 3]) -> Solid {
        self.transform(&Matrix4::new_translation(&Vector3::from(offset)))
    }

    /// Rotate by Euler angles in radians, about X first, then Y, then Z
    pub fn rotate(&self, angles: [f64; 3]) -> Solid {
        let [x, y, z] = angles;
        let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), z)
            * Rotation3::from_axis_angle(&Vector3::y_axis(), y)
            * Rotation3::from_axis_angle(&Vector3::x_axis(), x);
        self.transform(&rotation.to_homogeneous())
    }

    pub fn scale(&self, factors: [f64; 3]) -> Solid {
        self.transform(&Matrix4::new_nonuniform_scaling(&Vector3::from(factors)))
    }
}
