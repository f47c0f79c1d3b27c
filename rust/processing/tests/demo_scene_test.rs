// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use approx::assert_relative_eq;
use csg_view_processing::{populate_demo_scene, DrawVariant, Viewer, ViewerConfig};

fn demo_viewer(config: ViewerConfig) -> Viewer {
    let mut viewer = Viewer::new(config).unwrap();
    populate_demo_scene(&mut viewer).unwrap();
    viewer
}

#[test]
fn test_demo_scene_converts_completely() {
    let viewer = demo_viewer(ViewerConfig::new());

    assert!(viewer.failures().is_empty(), "failures: {:?}", viewer.failures());
    assert_eq!(viewer.len(), 10);

    for renderable in viewer.meshes() {
        let mesh = renderable.mesh();
        assert!(mesh.validate().is_ok(), "{}", renderable.name);
        assert!(mesh.volume() > 0.0, "{} has inverted winding", renderable.name);
        assert_eq!(renderable.variants.len(), 3);
        assert_relative_eq!(renderable.normals_length(), 0.3);
    }

    let cube = viewer.get_by_name("cube").unwrap().mesh();
    assert_eq!(cube.vertex_count(), 8);
    assert_relative_eq!(cube.volume(), 8.0, epsilon = 1e-5);
    let (min, max) = cube.bounds();
    assert_relative_eq!(min.y, 0.0);
    assert_relative_eq!(max.y, 2.0);
    assert_relative_eq!(cube.centroid().x, -3.0, epsilon = 1e-6);
}

#[test]
fn test_boolean_combo_is_smaller_than_its_cube() {
    let viewer = demo_viewer(ViewerConfig::new());
    let combo = viewer.get_by_name("boolean-combo").unwrap().mesh();
    let volume = combo.volume();
    assert!(volume > 0.0 && volume < 8.0, "volume {}", volume);
}

#[test]
fn test_flat_scene_without_overlays() {
    let mut config = ViewerConfig::new();
    config.shading = "flat".parse().unwrap();
    config.wireframe = false;
    config.normals_length = 0.0;
    let viewer = demo_viewer(config);

    let cube = viewer.get_by_name("cube").unwrap();
    assert_eq!(cube.mesh().vertex_count(), 36);
    assert_eq!(cube.variants, vec![DrawVariant::shaded()]);
    assert!(cube.normal_lines().is_empty());
}

#[test]
fn test_report_lists_every_mesh() {
    let viewer = demo_viewer(ViewerConfig::new());
    let report = viewer.report();
    assert_eq!(report.meshes.len(), 10);
    assert_eq!(report.stats.total_meshes, 10);
    assert_eq!(
        report.stats.total_triangles,
        viewer.meshes().iter().map(|m| m.mesh().triangle_count()).sum::<usize>()
    );
    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"rounded-cylinder\""));
}
