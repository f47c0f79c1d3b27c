// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Primitive solids
//!
//! All primitives are polygon soups with outward counter-clockwise faces,
//! centred at the origin with their axis along +Z. Round primitives are built
//! by sweeping rings of points around the Z axis.

use crate::error::{Error, Result};
use crate::solid::{Polygon, Solid};
use crate::triangulation::signed_area;
use nalgebra::{Point2, Point3, Vector3};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Default number of segments used by the round primitives
pub const DEFAULT_SEGMENTS: usize = 32;

fn invalid(msg: impl Into<String>) -> Error {
    Error::InvalidPrimitive(msg.into())
}

fn check_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{} must be positive, got {}", name, value)))
    }
}

fn check_segments(name: &str, value: usize, min: usize) -> Result<()> {
    if value >= min {
        Ok(())
    } else {
        Err(invalid(format!("{} must be at least {}, got {}", name, min, value)))
    }
}

/// Push a face, dropping consecutive repeats of the same point
fn push_face(polygons: &mut Vec<Polygon>, points: impl IntoIterator<Item = Point3<f64>>) {
    let mut loop_points: Vec<Point3<f64>> = Vec::new();
    for p in points {
        if loop_points.last() != Some(&p) {
            loop_points.push(p);
        }
    }
    while loop_points.len() > 1 && loop_points.first() == loop_points.last() {
        loop_points.pop();
    }
    if loop_points.len() >= 3 {
        polygons.push(Polygon::new(loop_points));
    }
}

/// Axis-aligned cube with edge length `size`
pub fn cube(size: f64) -> Result<Solid> {
    cuboid([size, size, size])
}

/// Axis-aligned box with the given edge lengths
pub fn cuboid(size: [f64; 3]) -> Result<Solid> {
    for (axis, value) in ["x", "y", "z"].iter().zip(size) {
        check_positive(&format!("cuboid size {}", axis), value)?;
    }
    let [hx, hy, hz] = size.map(|s| s * 0.5);
    let p = |sx: f64, sy: f64, sz: f64| Point3::new(sx * hx, sy * hy, sz * hz);

    Ok(Solid::new(vec![
        // -X, +X
        Polygon::new(vec![p(-1., -1., -1.), p(-1., -1., 1.), p(-1., 1., 1.), p(-1., 1., -1.)]),
        Polygon::new(vec![p(1., -1., -1.), p(1., 1., -1.), p(1., 1., 1.), p(1., -1., 1.)]),
        // -Y, +Y
        Polygon::new(vec![p(-1., -1., -1.), p(1., -1., -1.), p(1., -1., 1.), p(-1., -1., 1.)]),
        Polygon::new(vec![p(-1., 1., -1.), p(-1., 1., 1.), p(1., 1., 1.), p(1., 1., -1.)]),
        // -Z, +Z
        Polygon::new(vec![p(-1., -1., -1.), p(-1., 1., -1.), p(1., 1., -1.), p(1., -1., -1.)]),
        Polygon::new(vec![p(-1., -1., 1.), p(1., -1., 1.), p(1., 1., 1.), p(-1., 1., 1.)]),
    ]))
}

/// One ring of a swept solid: an ellipse of radii (rx, ry) at height z.
/// A ring with both radii zero is a pole.
#[derive(Debug, Clone, Copy)]
struct Ring {
    rx: f64,
    ry: f64,
    z: f64,
}

impl Ring {
    fn circle(r: f64, z: f64) -> Self {
        Self { rx: r, ry: r, z }
    }

    fn pole(z: f64) -> Self {
        Self { rx: 0.0, ry: 0.0, z }
    }

    fn is_pole(&self) -> bool {
        self.rx == 0.0 && self.ry == 0.0
    }

    fn point(&self, cos_sin: (f64, f64)) -> Point3<f64> {
        Point3::new(self.rx * cos_sin.0, self.ry * cos_sin.1, self.z)
    }
}

/// Sweep rings ordered from top to bottom around the Z axis.
///
/// Bands between rings become quads (triangles next to a pole, or split in
/// two when the rings are not similar ellipses). Open sweeps get an n-gon cap
/// on each end that is not a pole; closed sweeps also join the last ring
/// back to the first.
fn sweep(rings: &[Ring], segments: usize, closed: bool) -> Solid {
    let angles: Vec<(f64, f64)> = (0..segments)
        .map(|j| {
            let phi = TAU * j as f64 / segments as f64;
            (phi.cos(), phi.sin())
        })
        .collect();

    let mut polygons = Vec::new();
    let band_count = if closed { rings.len() } else { rings.len() - 1 };

    for i in 0..band_count {
        let upper = &rings[i];
        let lower = &rings[(i + 1) % rings.len()];
        if upper.is_pole() && lower.is_pole() {
            continue;
        }
        let similar = (upper.rx * lower.ry - lower.rx * upper.ry).abs() <= 1e-12;

        for j in 0..segments {
            let next = (j + 1) % segments;
            let a = upper.point(angles[j]);
            let b = lower.point(angles[j]);
            let c = lower.point(angles[next]);
            let d = upper.point(angles[next]);

            if upper.is_pole() {
                push_face(&mut polygons, [a, b, c]);
            } else if lower.is_pole() {
                push_face(&mut polygons, [a, b, d]);
            } else if similar {
                push_face(&mut polygons, [a, b, c, d]);
            } else {
                push_face(&mut polygons, [a, b, c]);
                push_face(&mut polygons, [a, c, d]);
            }
        }
    }

    if !closed {
        if let Some(top) = rings.first().filter(|r| !r.is_pole()) {
            push_face(&mut polygons, angles.iter().map(|&cs| top.point(cs)));
        }
        if let Some(bottom) = rings.last().filter(|r| !r.is_pole()) {
            push_face(&mut polygons, angles.iter().rev().map(|&cs| bottom.point(cs)));
        }
    }

    Solid::new(polygons)
}

/// Circular cylinder of the given height
pub fn cylinder(radius: f64, height: f64, segments: usize) -> Result<Solid> {
    cylinder_elliptic([radius, radius], [radius, radius], height, segments)
}

/// Cylinder with elliptic ends; `start_radius` is at the bottom,
/// `end_radius` at the top
pub fn cylinder_elliptic(
    start_radius: [f64; 2],
    end_radius: [f64; 2],
    height: f64,
    segments: usize,
) -> Result<Solid> {
    for r in start_radius.iter().chain(end_radius.iter()) {
        check_positive("cylinder radius", *r)?;
    }
    check_positive("cylinder height", height)?;
    check_segments("cylinder segments", segments, 3)?;

    let half = height * 0.5;
    let rings = [
        Ring {
            rx: end_radius[0],
            ry: end_radius[1],
            z: half,
        },
        Ring {
            rx: start_radius[0],
            ry: start_radius[1],
            z: -half,
        },
    ];
    Ok(sweep(&rings, segments, false))
}

/// Cylinder whose top and bottom edges are rounded with `round_radius`
pub fn rounded_cylinder(radius: f64, height: f64, round_radius: f64, segments: usize) -> Result<Solid> {
    check_positive("cylinder radius", radius)?;
    check_positive("cylinder height", height)?;
    check_positive("round radius", round_radius)?;
    check_segments("cylinder segments", segments, 4)?;
    if round_radius >= radius || round_radius * 2.0 >= height {
        return Err(invalid("round radius must be smaller than the radius and half the height"));
    }

    let steps = (segments / 4).max(1);
    let inner = radius - round_radius;
    let top = height * 0.5 - round_radius;

    let mut rings = Vec::with_capacity(2 * (steps + 1));
    // Upper arc from 90 down to 0 degrees, lower arc from 0 down to -90
    for (centre_z, start) in [(top, FRAC_PI_2), (-top, 0.0)] {
        for t in 0..=steps {
            let alpha = start - FRAC_PI_2 * t as f64 / steps as f64;
            rings.push(Ring::circle(
                inner + round_radius * alpha.cos(),
                centre_z + round_radius * alpha.sin(),
            ));
        }
    }
    Ok(sweep(&rings, segments, false))
}

/// UV sphere: `segments` slices around Z and `segments / 2` stacks, with
/// triangle fans at the poles
pub fn sphere(radius: f64, segments: usize) -> Result<Solid> {
    check_positive("sphere radius", radius)?;
    check_segments("sphere segments", segments, 4)?;

    let stacks = (segments / 2).max(2);
    let rings: Vec<Ring> = (0..=stacks)
        .map(|i| {
            let theta = PI * i as f64 / stacks as f64;
            if i == 0 {
                Ring::pole(radius)
            } else if i == stacks {
                Ring::pole(-radius)
            } else {
                Ring::circle(radius * theta.sin(), radius * theta.cos())
            }
        })
        .collect();
    Ok(sweep(&rings, segments, false))
}

/// Torus around Z. `inner_radius` is the tube radius, `outer_radius` the
/// distance from the axis to the tube centre.
pub fn torus(
    inner_radius: f64,
    outer_radius: f64,
    inner_segments: usize,
    outer_segments: usize,
) -> Result<Solid> {
    check_positive("torus inner radius", inner_radius)?;
    check_positive("torus outer radius", outer_radius)?;
    check_segments("torus inner segments", inner_segments, 3)?;
    check_segments("torus outer segments", outer_segments, 3)?;
    if inner_radius >= outer_radius {
        return Err(invalid("torus inner radius must be smaller than the outer radius"));
    }

    // Tube cross-section walked clockwise in (r, z) so the outside goes down
    let rings: Vec<Ring> = (0..inner_segments)
        .map(|t| {
            let angle = TAU * t as f64 / inner_segments as f64;
            Ring::circle(
                outer_radius + inner_radius * angle.cos(),
                -inner_radius * angle.sin(),
            )
        })
        .collect();
    Ok(sweep(&rings, outer_segments, true))
}

/// Sphere built by subdividing each icosahedron edge `frequency` times
pub fn geodesic_sphere(radius: f64, frequency: usize) -> Result<Solid> {
    check_positive("sphere radius", radius)?;
    check_segments("geodesic frequency", frequency, 1)?;

    let phi = (1.0 + 5f64.sqrt()) * 0.5;
    let corners = [
        Vector3::new(-1.0, phi, 0.0),
        Vector3::new(1.0, phi, 0.0),
        Vector3::new(-1.0, -phi, 0.0),
        Vector3::new(1.0, -phi, 0.0),
        Vector3::new(0.0, -1.0, phi),
        Vector3::new(0.0, 1.0, phi),
        Vector3::new(0.0, -1.0, -phi),
        Vector3::new(0.0, 1.0, -phi),
        Vector3::new(phi, 0.0, -1.0),
        Vector3::new(phi, 0.0, 1.0),
        Vector3::new(-phi, 0.0, -1.0),
        Vector3::new(-phi, 0.0, 1.0),
    ];
    const FACES: [[usize; 3]; 20] = [
        [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
        [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
        [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
        [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
    ];

    let f = frequency as f64;
    let mut polygons = Vec::with_capacity(20 * frequency * frequency);
    for [ia, ib, ic] in FACES {
        let (a, mut b, mut c) = (corners[ia], corners[ib], corners[ic]);
        if (b - a).cross(&(c - a)).dot(&(a + b + c)) < 0.0 {
            std::mem::swap(&mut b, &mut c);
        }
        let at = |i: usize, j: usize| {
            let v = a + (b - a) * (i as f64 / f) + (c - a) * (j as f64 / f);
            Point3::from(v.normalize() * radius)
        };
        for i in 0..frequency {
            for j in 0..frequency - i {
                push_face(&mut polygons, [at(i, j), at(i + 1, j), at(i, j + 1)]);
                if i + j + 1 < frequency {
                    push_face(&mut polygons, [at(i + 1, j), at(i + 1, j + 1), at(i, j + 1)]);
                }
            }
        }
    }
    Ok(Solid::new(polygons))
}

/// Box whose edges and corners are rounded with `round_radius`
pub fn rounded_cuboid(size: [f64; 3], round_radius: f64, segments: usize) -> Result<Solid> {
    for value in size {
        check_positive("cuboid size", value)?;
    }
    check_positive("round radius", round_radius)?;
    check_segments("cuboid segments", segments, 4)?;
    let inner = size.map(|s| s * 0.5 - round_radius);
    if inner.iter().any(|&h| h <= 0.0) {
        return Err(invalid("round radius must be smaller than half of every edge"));
    }

    let steps = (segments / 4).max(1);
    let step = FRAC_PI_2 / steps as f64;

    // Columns walk the four quadrants around Z; each quadrant repeats its
    // boundary angle so neighbouring corner patches are joined by flat bands
    let columns: Vec<(f64, f64, f64, f64)> = (0..4)
        .flat_map(|q| {
            let (sx, sy) = match q {
                0 => (1.0, 1.0),
                1 => (-1.0, 1.0),
                2 => (-1.0, -1.0),
                _ => (1.0, -1.0),
            };
            (0..=steps).map(move |t| {
                let phi = FRAC_PI_2 * q as f64 + step * t as f64;
                (phi.cos(), phi.sin(), sx, sy)
            })
        })
        .collect();
    let rows: Vec<(f64, f64, f64)> = [(0.0, 1.0), (FRAC_PI_2, -1.0)]
        .iter()
        .flat_map(|&(start, sz)| {
            (0..=steps).map(move |t| {
                let theta = start + step * t as f64;
                (theta.sin(), theta.cos(), sz)
            })
        })
        .collect();

    let vertex = |row: usize, col: usize| {
        let (sin_t, cos_t, sz) = rows[row];
        let (cos_p, sin_p, sx, sy) = columns[col];
        Point3::new(
            sx * inner[0] + round_radius * sin_t * cos_p,
            sy * inner[1] + round_radius * sin_t * sin_p,
            sz * inner[2] + round_radius * cos_t,
        )
    };

    let mut polygons = Vec::new();
    let cols = columns.len();
    for row in 0..rows.len() - 1 {
        for col in 0..cols {
            let next = (col + 1) % cols;
            push_face(
                &mut polygons,
                [
                    vertex(row, col),
                    vertex(row + 1, col),
                    vertex(row + 1, next),
                    vertex(row, next),
                ],
            );
        }
    }
    push_face(&mut polygons, (0..cols).map(|col| vertex(0, col)));
    push_face(&mut polygons, (0..cols).rev().map(|col| vertex(rows.len() - 1, col)));

    Ok(Solid::new(polygons))
}

/// Extrude a simple 2D profile along +Z from z = 0 to z = `height`.
///
/// The profile may be concave; clockwise profiles are reversed. Caps are
/// single n-gon faces.
pub fn prism(profile: &[Point2<f64>], height: f64) -> Result<Solid> {
    check_positive("prism height", height)?;
    if profile.len() < 3 {
        return Err(invalid(format!(
            "prism profile needs at least 3 points, got {}",
            profile.len()
        )));
    }
    let area = signed_area(profile);
    if !area.is_finite() || area == 0.0 {
        return Err(invalid("prism profile has zero area"));
    }

    let mut outline: Vec<Point2<f64>> = profile.to_vec();
    if area < 0.0 {
        outline.reverse();
    }

    let n = outline.len();
    let mut polygons = Vec::with_capacity(n + 2);
    for i in 0..n {
        let p0 = outline[i];
        let p1 = outline[(i + 1) % n];
        push_face(
            &mut polygons,
            [
                Point3::new(p0.x, p0.y, 0.0),
                Point3::new(p1.x, p1.y, 0.0),
                Point3::new(p1.x, p1.y, height),
                Point3::new(p0.x, p0.y, height),
            ],
        );
    }
    push_face(&mut polygons, outline.iter().rev().map(|p| Point3::new(p.x, p.y, 0.0)));
    push_face(&mut polygons, outline.iter().map(|p| Point3::new(p.x, p.y, height)));

    Ok(Solid::new(polygons))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every face must face away from the solid's centre
    fn assert_outward(solid: &Solid) {
        let count = solid.vertex_count() as f64;
        let centre = Point3::from(
            solid
                .iter()
                .flat_map(|p| p.vertices.iter())
                .map(|p| p.coords)
                .sum::<Vector3<f64>>()
                / count,
        );
        for (i, polygon) in solid.iter().enumerate() {
            let n = polygon.newell_normal();
            let face_centre = Point3::from(
                polygon.vertices.iter().map(|p| p.coords).sum::<Vector3<f64>>()
                    / polygon.len() as f64,
            );
            assert!(
                n.dot(&(face_centre - centre)) > 0.0,
                "face {} points inward",
                i
            );
        }
    }

    #[test]
    fn test_cube_faces() {
        let solid = cube(2.0).unwrap();
        assert_eq!(solid.len(), 6);
        assert_eq!(solid.vertex_count(), 24);
        assert_outward(&solid);
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(matches!(cube(0.0), Err(Error::InvalidPrimitive(_))));
        assert!(cuboid([1.0, -1.0, 1.0]).is_err());
        assert!(sphere(1.0, 2).is_err());
        assert!(torus(2.0, 1.0, 8, 12).is_err());
        assert!(rounded_cuboid([1.0, 1.0, 1.0], 0.5, 8).is_err());
        assert!(prism(&[Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)], 1.0).is_err());
    }

    #[test]
    fn test_sphere_layout() {
        let solid = sphere(1.0, 12).unwrap();
        // 12 slices x 6 stacks
        assert_eq!(solid.len(), 72);
        let triangles = solid.iter().filter(|p| p.len() == 3).count();
        assert_eq!(triangles, 24);
        assert_outward(&solid);
    }

    #[test]
    fn test_cylinder_caps_are_ngons() {
        let solid = cylinder(1.0, 2.0, 12).unwrap();
        assert_eq!(solid.len(), 14);
        assert_eq!(solid.iter().filter(|p| p.len() == 12).count(), 2);
        assert_outward(&solid);
    }

    #[test]
    fn test_elliptic_cylinder_splits_warped_bands() {
        let solid = cylinder_elliptic([1.25, 1.0], [1.0, 1.0], 2.0, 16).unwrap();
        assert_eq!(solid.len(), 16 * 2 + 2);
        assert_outward(&solid);
    }

    #[test]
    fn test_torus_faces_point_away_from_tube() {
        let solid = torus(0.4, 1.0, 8, 12).unwrap();
        assert_eq!(solid.len(), 96);
        for polygon in solid.iter() {
            let centre = polygon.vertices.iter().map(|p| p.coords).sum::<Vector3<f64>>()
                / polygon.len() as f64;
            let radial = Vector3::new(centre.x, centre.y, 0.0).normalize();
            let tube_centre = radial * 1.0;
            assert!(polygon.newell_normal().dot(&(centre - tube_centre)) > 0.0);
        }
    }

    #[test]
    fn test_other_primitives_face_outward() {
        assert_outward(&geodesic_sphere(1.0, 2).unwrap());
        assert_outward(&rounded_cylinder(1.0, 2.0, 0.2, 16).unwrap());
        assert_outward(&rounded_cuboid([2.0, 2.0, 2.0], 0.2, 8).unwrap());
    }

    #[test]
    fn test_geodesic_face_count() {
        assert_eq!(geodesic_sphere(1.0, 1).unwrap().len(), 20);
        assert_eq!(geodesic_sphere(1.0, 3).unwrap().len(), 180);
    }

    #[test]
    fn test_prism_reverses_clockwise_profile() {
        let clockwise = [
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 0.0),
        ];
        let solid = prism(&clockwise, 2.0).unwrap();
        assert_eq!(solid.len(), 6);
        assert_outward(&solid);
    }
}
