//! Types for plugin builds.

use std::path::PathBuf;

use thiserror::Error;

use crate::bundler::{BundleConfig, BundleError};
use crate::collect::CollectError;
use crate::manifest::{CompilationTarget, EmitError, ManifestDocument, ManifestError};

/// Errors that can stop a build generation.
#[derive(Debug, Error)]
pub enum BuildError {
  #[error(transparent)]
  Manifest(#[from] ManifestError),

  #[error(transparent)]
  Collect(#[from] CollectError),

  #[error("error while copying {manifest}: {source}")]
  Emit { manifest: String, source: EmitError },

  #[error("error while copying {}: {source}", asset.display())]
  AssetCopy { asset: PathBuf, source: std::io::Error },

  #[error("error while building {target}:\n{}", errors.join("\n"))]
  Compile { target: String, errors: Vec<String> },

  #[error("error while building {target}: {source}")]
  Bundler { target: String, source: BundleError },

  #[error("build task failed: {0}")]
  Task(#[from] tokio::task::JoinError),
}

impl BuildError {
  /// Whether the error ends a watch session.
  ///
  /// Manifest problems are not: the next edit of the manifest may fix them.
  pub fn is_fatal_in_watch(&self) -> bool {
    !matches!(self, BuildError::Manifest(_) | BuildError::Collect(_))
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuildMode {
  /// Build everything once and stop.
  #[default]
  Once,
  /// Keep every target watched and recompile on change.
  Watch,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
  pub mode: BuildMode,
  /// Hide compilation warnings.
  pub quiet: bool,
}

/// Everything one generation has to do, resolved from a fresh manifest read.
#[derive(Debug, Clone)]
pub struct BuildPlan {
  pub document: ManifestDocument,
  pub targets: Vec<CompilationTarget>,
  /// Resource scripts, relative to the project root.
  pub resources: Vec<PathBuf>,
  /// Asset files, relative to the project root.
  pub assets: Vec<PathBuf>,
}

impl BuildPlan {
  /// Commands, resources and assets, plus one step for the manifest.
  pub fn total_steps(&self) -> usize {
    self.targets.len() + self.resources.len() + self.assets.len() + 1
  }
}

/// One compilation: a command script or a resource.
#[derive(Debug, Clone)]
pub struct BuildJob {
  /// Name shown in progress output.
  pub label: String,
  pub config: BundleConfig,
}
