//! Layout of a `.sketchplugin` bundle.
//!
//! ```text
//! my-plugin.sketchplugin/
//!   Contents/
//!     Sketch/       manifest.json and compiled commands
//!     Resources/    compiled resources and copied assets
//! ```

use std::path::{Path, PathBuf};

pub const CONTENTS_DIR: &str = "Contents";
pub const SKETCH_DIR: &str = "Sketch";
pub const RESOURCES_DIR: &str = "Resources";
pub const MANIFEST_FILE: &str = "manifest.json";

/// Directory holding the emitted manifest and the compiled commands.
pub fn sketch_dir(output: &Path) -> PathBuf {
  output.join(CONTENTS_DIR).join(SKETCH_DIR)
}

/// Directory holding compiled resources and copied assets.
pub fn resources_dir(output: &Path) -> PathBuf {
  output.join(CONTENTS_DIR).join(RESOURCES_DIR)
}

/// Path of the emitted manifest.
pub fn manifest_output(output: &Path) -> PathBuf {
  sketch_dir(output).join(MANIFEST_FILE)
}

/// File name component of a path-like string, or the string itself when it
/// has none (e.g. `..`).
pub fn basename(path: &str) -> String {
  Path::new(path)
    .file_name()
    .map(|name| name.to_string_lossy().into_owned())
    .unwrap_or_else(|| path.to_string())
}
