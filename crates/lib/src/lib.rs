//! sketchpack-lib: packaging of Sketch plugins
//!
//! This crate turns a plugin project into a `.sketchplugin` bundle:
//! - `config`: the project description read from `package.json`
//! - `manifest`: the source manifest, its compilation targets and the emitted copy
//! - `collect`: resource and asset discovery
//! - `bundler`: the external compiler seam
//! - `build`: one-shot builds and watch generations
//! - `watch`: rebuilding whenever the manifest changes

pub mod build;
pub mod bundler;
pub mod collect;
pub mod config;
pub mod manifest;
pub mod paths;
pub mod util;
pub mod watch;
