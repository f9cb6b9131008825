//! Plugin manifest handling.
//!
//! The source manifest is read fresh for every build generation, folded into
//! compilation targets, and re-emitted into the bundle with project defaults.

pub mod emit;
pub mod normalize;
mod types;

pub use emit::{EmitError, emit_manifest, render_manifest};
pub use normalize::{CompilationTarget, DEFAULT_HANDLER, MAX_HANDLER_DEPTH, collect_targets};
pub use types::*;
