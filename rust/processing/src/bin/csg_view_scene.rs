// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Builds the demo scene and prints a JSON report of every converted mesh.
//!
//! Configuration comes from `CSG_VIEW_*` environment variables; logging is
//! controlled with `RUST_LOG`.

use csg_view_processing::{populate_demo_scene, Result, Viewer, ViewerConfig};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,csg_view_processing=debug".into()),
        )
        .with_writer(std::io::stderr)
        .pretty()
        .init();

    let config = ViewerConfig::from_env();

    tracing::info!(
        weld_tolerance = config.weld_tolerance,
        shading = ?config.shading,
        worker_threads = ?config.worker_threads,
        "Building demo scene"
    );

    let mut viewer = Viewer::new(config)?;
    populate_demo_scene(&mut viewer)?;

    println!("{}", serde_json::to_string_pretty(&viewer.report())?);
    Ok(())
}
