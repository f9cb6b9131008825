//! Test utilities for sketchpack-lib.
//!
//! Provides a stand-in bundler program for exercising the child-process
//! bundler, an in-process [`FakeBundler`], a [`RecordingReporter`] and a
//! project fixture.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::oneshot;

use crate::build::{BuildError, BuildSummary, Progress, Reporter};
use crate::bundler::{BundleConfig, BundleError, Bundler, CompilationResult, WatchCallback, WatchHandle};
use crate::config::ProjectConfig;
use crate::manifest::EmitError;

/// Write an executable script accepting the bundler's arguments.
///
/// It copies the entry to `--outfile`, fails when the entry contains
/// `SYNTAX_ERROR` and warns when it contains `WARN`.
#[cfg(unix)]
pub fn fake_bundler(dir: &Path) -> PathBuf {
  use std::os::unix::fs::PermissionsExt;

  let path = dir.join("fake-bundler.sh");
  let script = r#"#!/bin/sh
entry="$1"
out=""
for arg in "$@"; do
  case "$arg" in
    --outfile=*) out="${arg#--outfile=}" ;;
  esac
done
if grep -q SYNTAX_ERROR "$entry"; then
  echo "error: bad syntax in $entry" >&2
  exit 1
fi
if grep -q WARN "$entry"; then
  echo "warning: suspicious code" >&2
fi
mkdir -p "$(dirname "$out")"
cp "$entry" "$out"
"#;
  std::fs::write(&path, script).unwrap();
  std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
  path
}

/// In-process bundler.
///
/// Entries whose file name is listed as failing compile with an error;
/// every other entry is copied to its output.
#[derive(Debug, Default)]
pub struct FakeBundler {
  failing: Vec<String>,
  delay: Duration,
  open_watches: Arc<AtomicUsize>,
  started_watches: AtomicUsize,
}

impl FakeBundler {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn failing(mut self, entry: &str) -> Self {
    self.failing.push(entry.to_string());
    self
  }

  /// Delay every successful compilation.
  pub fn with_delay(mut self, delay: Duration) -> Self {
    self.delay = delay;
    self
  }

  pub fn open_watches(&self) -> usize {
    self.open_watches.load(Ordering::SeqCst)
  }

  pub fn started_watches(&self) -> usize {
    self.started_watches.load(Ordering::SeqCst)
  }

  fn fails(&self, config: &BundleConfig) -> bool {
    let name = config
      .entry
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_default();
    self.failing.contains(&name)
  }

  fn compile_now(&self, config: &BundleConfig) -> CompilationResult {
    if self.fails(config) {
      return CompilationResult {
        errors: vec![format!("error: cannot compile {}", config.entry.display())],
        ..Default::default()
      };
    }

    if let Some(parent) = config.output.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::copy(&config.entry, &config.output).unwrap();
    CompilationResult::default()
  }
}

impl Bundler for FakeBundler {
  async fn compile(&self, config: &BundleConfig) -> Result<CompilationResult, BundleError> {
    if !self.fails(config) && !self.delay.is_zero() {
      tokio::time::sleep(self.delay).await;
    }
    Ok(self.compile_now(config))
  }

  fn watch(&self, config: BundleConfig, callback: WatchCallback) -> Result<WatchHandle, BundleError> {
    self.started_watches.fetch_add(1, Ordering::SeqCst);
    self.open_watches.fetch_add(1, Ordering::SeqCst);
    callback(Ok(self.compile_now(&config)));

    let (tx, rx) = oneshot::channel::<()>();
    let open = self.open_watches.clone();
    let task = tokio::spawn(async move {
      let _ = rx.await;
      open.fetch_sub(1, Ordering::SeqCst);
    });
    Ok(WatchHandle::new(tx, task))
  }
}

/// Everything a [`RecordingReporter`] saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reported {
  ManifestCopied(Option<Progress>),
  ManifestFailed,
  AssetCopied(PathBuf, Option<Progress>),
  Built(String, Option<Progress>),
  Warnings(String, Vec<String>),
  CompileFailed(String),
  Finished(usize),
  ManifestChanged,
  GenerationFailed(String),
}

#[derive(Debug, Default)]
pub struct RecordingReporter {
  events: Mutex<Vec<Reported>>,
}

impl RecordingReporter {
  pub fn events(&self) -> Vec<Reported> {
    self.events.lock().unwrap().clone()
  }

  pub fn count(&self, matches: impl Fn(&Reported) -> bool) -> usize {
    self.events().iter().filter(|e| matches(e)).count()
  }

  fn push(&self, event: Reported) {
    self.events.lock().unwrap().push(event);
  }
}

impl Reporter for RecordingReporter {
  fn manifest_copied(&self, _manifest: &str, _elapsed: Duration, progress: Option<Progress>) {
    self.push(Reported::ManifestCopied(progress));
  }

  fn manifest_failed(&self, _manifest: &str, _error: &EmitError) {
    self.push(Reported::ManifestFailed);
  }

  fn asset_copied(&self, asset: &Path, progress: Option<Progress>) {
    self.push(Reported::AssetCopied(asset.to_path_buf(), progress));
  }

  fn built(&self, target: &str, _elapsed: Duration, progress: Option<Progress>) {
    self.push(Reported::Built(target.to_string(), progress));
  }

  fn warnings(&self, target: &str, warnings: &[String]) {
    self.push(Reported::Warnings(target.to_string(), warnings.to_vec()));
  }

  fn compile_failed(&self, target: &str, _errors: &[String]) {
    self.push(Reported::CompileFailed(target.to_string()));
  }

  fn finished(&self, summary: &BuildSummary) {
    self.push(Reported::Finished(summary.steps));
  }

  fn manifest_changed(&self) {
    self.push(Reported::ManifestChanged);
  }

  fn generation_failed(&self, error: &BuildError) {
    self.push(Reported::GenerationFailed(error.to_string()));
  }
}

/// Write a project under `root` and load its configuration.
///
/// `skpm` is the JSON body of the `skpm` section; `manifest` is written to
/// `src/manifest.json` unless `None`.
pub fn project(root: &Path, skpm: &str, manifest: Option<&str>) -> ProjectConfig {
  let package = format!(
    r#"{{ "name": "fixture", "version": "1.0.0", "repository": "acme/fixture", "skpm": {} }}"#,
    skpm
  );
  std::fs::write(root.join("package.json"), package).unwrap();
  if let Some(manifest) = manifest {
    std::fs::create_dir_all(root.join("src")).unwrap();
    std::fs::write(root.join("src/manifest.json"), manifest).unwrap();
  }
  ProjectConfig::from_json(root, &std::fs::read_to_string(root.join("package.json")).unwrap()).unwrap()
}
