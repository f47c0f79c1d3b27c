// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CSG-View Processing
//!
//! The viewer layer on top of `csg-view-geometry`: an explicit [`Viewer`]
//! context that converts solids (in parallel when asked to), keeps each
//! result as a [`RenderableMesh`] with its draw variants, and reports what
//! happened.

pub mod config;
pub mod error;
pub mod renderable;
pub mod scene;
pub mod viewer;

pub use config::ViewerConfig;
pub use error::{Error, Result};
pub use renderable::{rgb_from_hex, DrawVariant, Material, MeshSummary, RenderableMesh};
pub use scene::{demo_scene, populate_demo_scene};
pub use viewer::{ConversionFailure, SceneReport, SceneStats, Viewer};
