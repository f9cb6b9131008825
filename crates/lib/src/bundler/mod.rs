//! The bundler seam.
//!
//! Compilation itself is delegated to an external bundler. The build only
//! needs two operations from it: a one-shot [`Bundler::compile`] and a
//! persistent [`Bundler::watch`] that reports every recompilation through a
//! callback until its [`WatchHandle`] is closed.

pub mod command;

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::warn;

pub use command::CommandBundler;

/// Errors raised by the bundler itself, as opposed to errors in the code it
/// compiles (those are reported in [`CompilationResult::errors`]).
#[derive(Debug, Error)]
pub enum BundleError {
  #[error("failed to start bundler {program}: {source}")]
  Spawn { program: String, source: std::io::Error },

  #[error("failed to create output directory {}: {source}", path.display())]
  CreateDir { path: PathBuf, source: std::io::Error },

  #[error("failed to watch {}: {source}", path.display())]
  Watch { path: PathBuf, source: notify::Error },
}

/// Per-target bundler configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleConfig {
  /// Script to compile.
  pub entry: PathBuf,
  /// Compiled file to write.
  pub output: PathBuf,
  /// Functions exposed to the host application.
  pub handlers: Vec<String>,
  /// Command identifiers served by this script.
  pub identifiers: Vec<String>,
  /// Working directory of the bundler.
  pub root: PathBuf,
  /// Paths whose changes never trigger a recompilation (the output bundle).
  pub ignore: Vec<PathBuf>,
}

/// Outcome of one compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilationResult {
  pub errors: Vec<String>,
  pub warnings: Vec<String>,
  pub duration: Duration,
}

impl CompilationResult {
  pub fn has_errors(&self) -> bool {
    !self.errors.is_empty()
  }

  pub fn has_warnings(&self) -> bool {
    !self.warnings.is_empty()
  }
}

/// Invoked after every compilation of a watched target.
pub type WatchCallback = Arc<dyn Fn(Result<CompilationResult, BundleError>) + Send + Sync>;

/// A compiler abstraction the build orchestrator drives.
pub trait Bundler: Send + Sync + 'static {
  /// Compile once.
  fn compile(&self, config: &BundleConfig) -> impl Future<Output = Result<CompilationResult, BundleError>> + Send;

  /// Compile now and again on every source change, reporting each result
  /// through `callback`, until the returned handle is closed.
  fn watch(&self, config: BundleConfig, callback: WatchCallback) -> Result<WatchHandle, BundleError>;
}

/// Handle on a running watch.
///
/// Closing signals the watch task and waits until it has exited, so no
/// compilation of this watch is still writing once `close` returns. Dropping
/// the handle signals the task without waiting.
#[derive(Debug)]
pub struct WatchHandle {
  shutdown: Option<oneshot::Sender<()>>,
  task: Option<JoinHandle<()>>,
}

impl WatchHandle {
  pub fn new(shutdown: oneshot::Sender<()>, task: JoinHandle<()>) -> Self {
    Self {
      shutdown: Some(shutdown),
      task: Some(task),
    }
  }

  pub async fn close(mut self) {
    if let Some(shutdown) = self.shutdown.take() {
      // The task may already have exited on its own.
      let _ = shutdown.send(());
    }
    if let Some(task) = self.task.take() {
      if let Err(e) = task.await {
        warn!(error = %e, "watch task ended abnormally");
      }
    }
  }
}

impl Drop for WatchHandle {
  fn drop(&mut self) {
    if let Some(shutdown) = self.shutdown.take() {
      let _ = shutdown.send(());
    }
  }
}

/// Close every handle, waiting for each one in turn.
pub async fn close_all(handles: Vec<WatchHandle>) {
  for handle in handles {
    handle.close().await;
  }
}
