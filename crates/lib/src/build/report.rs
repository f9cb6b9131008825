//! Progress reporting.
//!
//! The orchestrator announces every completed step through a [`Reporter`];
//! the CLI renders them on the console and tests record them.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use super::BuildError;
use crate::manifest::EmitError;

/// Position of a completed step within a one-shot build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
  pub step: usize,
  pub total: usize,
}

impl fmt::Display for Progress {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[{}/{}]", self.step, self.total)
  }
}

/// Result of a completed one-shot build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
  pub generation: u64,
  pub steps: usize,
  pub elapsed: Duration,
}

/// Receiver of build progress.
///
/// `progress` is `Some` in one-shot builds and `None` while watching, where
/// a step total has no meaning across repeated compilations.
pub trait Reporter: Send + Sync + 'static {
  fn manifest_copied(&self, manifest: &str, elapsed: Duration, progress: Option<Progress>);

  /// The manifest could not be written while watching; the generation goes on.
  fn manifest_failed(&self, manifest: &str, error: &EmitError);

  fn asset_copied(&self, asset: &Path, progress: Option<Progress>);

  fn built(&self, target: &str, elapsed: Duration, progress: Option<Progress>);

  fn warnings(&self, target: &str, warnings: &[String]);

  /// A watched target failed to compile; its watch stays active.
  fn compile_failed(&self, target: &str, errors: &[String]);

  fn finished(&self, summary: &BuildSummary);

  /// The manifest changed on disk and the plugin is rebuilt from scratch.
  fn manifest_changed(&self);

  /// A watch generation could not start; the manifest is still watched.
  fn generation_failed(&self, error: &BuildError);
}
