// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CSG-View WebAssembly Bindings
//!
//! JavaScript API for converting CSG solids into WebGL-ready meshes.

use wasm_bindgen::prelude::*;

mod api;
mod flat;
mod mesh_data;
mod utils;

pub use api::{CsgViewer, ViewerOptions};
pub use flat::{solid_from_flat, FlatSolidError};
pub use mesh_data::MeshDataJs;
pub use utils::set_panic_hook;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    set_panic_hook();
}

/// Get the version of CSG-View
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
