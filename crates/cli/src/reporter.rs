//! Console rendering of build progress.

use std::path::Path;
use std::time::Duration;

use sketchpack_lib::build::{BuildError, BuildMode, BuildSummary, Progress, Reporter};
use sketchpack_lib::manifest::EmitError;

use crate::output::{
  format_duration, print_diagnostics, print_error, print_info, print_success, print_warning, progress_prefix,
};

pub struct ConsoleReporter {
  mode: BuildMode,
}

impl ConsoleReporter {
  pub fn new(mode: BuildMode) -> Self {
    Self { mode }
  }
}

impl Reporter for ConsoleReporter {
  fn manifest_copied(&self, manifest: &str, elapsed: Duration, progress: Option<Progress>) {
    print_success(&format!(
      "{}Copied {} in {}",
      progress_prefix(progress),
      manifest,
      format_duration(elapsed)
    ));
  }

  fn manifest_failed(&self, manifest: &str, error: &EmitError) {
    print_error(&format!("error while copying {}: {}", manifest, error));
  }

  fn asset_copied(&self, asset: &Path, progress: Option<Progress>) {
    print_success(&format!("{}Copied {}", progress_prefix(progress), asset.display()));
  }

  fn built(&self, target: &str, elapsed: Duration, progress: Option<Progress>) {
    print_success(&format!(
      "{}Built {} in {}",
      progress_prefix(progress),
      target,
      format_duration(elapsed)
    ));
  }

  fn warnings(&self, target: &str, warnings: &[String]) {
    print_warning(&format!("warnings while building {}", target));
    print_diagnostics(warnings);
  }

  fn compile_failed(&self, target: &str, errors: &[String]) {
    print_error(&format!("error while building {}", target));
    print_diagnostics(errors);
  }

  fn finished(&self, summary: &BuildSummary) {
    if self.mode == BuildMode::Once {
      print_success(&format!("Plugin built in {}", format_duration(summary.elapsed)));
    }
  }

  fn manifest_changed(&self) {
    print_info("Manifest changed, rebuilding the plugin");
  }

  fn generation_failed(&self, error: &BuildError) {
    print_error(&error.to_string());
    print_info("Waiting for the manifest to change");
  }
}
