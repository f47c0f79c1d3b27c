// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The demo scene: a 3 x 3 grid of primitives plus one boolean combination,
//! laid out on the y = 0 ground plane with Y up.

use crate::viewer::Viewer;
use csg_view_geometry::csg::{intersect, subtract, union};
use csg_view_geometry::primitives::{
    cube, cuboid, cylinder, cylinder_elliptic, geodesic_sphere, rounded_cuboid, rounded_cylinder,
    sphere, torus,
};
use csg_view_geometry::{Result, Solid};
use std::f64::consts::FRAC_PI_2;

/// Turns the Z-up primitives so their axis points along Y.
const Z_TO_Y: [f64; 3] = [FRAC_PI_2, 0.0, 0.0];

/// Build every solid of the demo scene, named and positioned.
pub fn demo_scene() -> Result<Vec<(String, Solid)>> {
    let combo = union(
        &intersect(&cube(1.5)?, &sphere(1.0, 24)?),
        &subtract(&cube(2.0)?, &sphere(1.33, 24)?),
    );

    let solids = vec![
        ("cube", cube(2.0)?.translate([-3.0, 1.0, -3.0])),
        ("cuboid", cuboid([2.5, 2.0, 2.0])?.translate([0.0, 1.0, -3.0])),
        (
            "rounded-cuboid",
            rounded_cuboid([2.0, 2.0, 2.0], 0.2, 8)?.translate([3.0, 1.0, -3.0]),
        ),
        (
            "cylinder",
            cylinder(1.0, 2.0, 12)?
                .rotate(Z_TO_Y)
                .translate([-3.0, 1.0, 0.0]),
        ),
        (
            "elliptic-cylinder",
            cylinder_elliptic([1.25, 1.0], [1.0, 1.0], 2.0, 16)?
                .rotate(Z_TO_Y)
                .translate([0.0, 1.0, 0.0]),
        ),
        (
            "rounded-cylinder",
            rounded_cylinder(1.0, 2.0, 0.2, 16)?
                .rotate(Z_TO_Y)
                .translate([3.0, 1.0, 0.0]),
        ),
        (
            "sphere",
            sphere(1.0, 12)?.rotate(Z_TO_Y).translate([-3.0, 1.0, 3.0]),
        ),
        ("geodesic-sphere", geodesic_sphere(1.0, 2)?.translate([0.0, 1.0, 3.0])),
        (
            "torus",
            torus(0.4, 1.0, 8, 12)?
                .rotate(Z_TO_Y)
                .translate([3.0, 0.5, 3.0]),
        ),
        ("boolean-combo", combo.translate([-3.0, 1.0, 6.0])),
    ];

    Ok(solids
        .into_iter()
        .map(|(name, solid)| (name.to_string(), solid))
        .collect())
}

/// Convert the demo scene into `viewer`. Returns how many meshes were added.
pub fn populate_demo_scene(viewer: &mut Viewer) -> Result<usize> {
    let solids = demo_scene()?;
    Ok(viewer.add_solids(solids))
}
