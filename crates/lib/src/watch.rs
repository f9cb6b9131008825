//! Watch mode.
//!
//! The coordinator owns the watch handles of the current generation. Every
//! change to the source manifest closes them all, waits for each one to
//! exit, and only then starts the next generation, so two generations never
//! write to the bundle at the same time.

use std::future::Future;
use std::path::{Path, PathBuf};

use notify::{Event, EventKind, RecursiveMode, Watcher};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::build::{BuildError, Builder, Reporter};
use crate::bundler::{Bundler, WatchHandle, close_all};

#[derive(Debug, Error)]
pub enum WatchError {
  #[error("failed to watch {}: {source}", path.display())]
  Watch { path: PathBuf, source: notify::Error },

  #[error(transparent)]
  Build(#[from] BuildError),
}

/// Rebuilds the plugin whenever the source manifest changes.
pub struct WatchCoordinator<B: Bundler, R: Reporter> {
  builder: Builder<B, R>,
  manifest_path: PathBuf,
}

impl<B: Bundler, R: Reporter> WatchCoordinator<B, R> {
  pub fn new(builder: Builder<B, R>) -> Self {
    let manifest_path = builder.config().manifest_path();
    Self {
      builder,
      manifest_path,
    }
  }

  /// Watch until interrupted with Ctrl-C.
  pub async fn run(&self) -> Result<(), WatchError> {
    let (tx, rx) = mpsc::unbounded_channel();
    let dir = self
      .manifest_path
      .parent()
      .map(Path::to_path_buf)
      .unwrap_or_else(|| self.builder.config().root.clone());
    let manifest = self.manifest_path.clone();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
      Ok(event) if is_manifest_event(&event, &manifest) => {
        // The coordinator is gone once the session has ended.
        let _ = tx.send(());
      }
      Ok(_) => {}
      Err(e) => warn!(error = %e, "manifest watcher error"),
    })
    .map_err(|source| WatchError::Watch {
      path: dir.clone(),
      source,
    })?;
    watcher
      .watch(&dir, RecursiveMode::NonRecursive)
      .map_err(|source| WatchError::Watch {
        path: dir.clone(),
        source,
      })?;

    info!(manifest = %self.manifest_path.display(), "watching manifest");
    self.run_until(rx, shutdown_signal()).await
  }

  /// Run generations until `shutdown` resolves or the event stream ends.
  ///
  /// Each message on `events` is one change of the manifest. Changes that
  /// arrive while a generation is starting are folded into one rebuild.
  pub async fn run_until(
    &self,
    mut events: mpsc::UnboundedReceiver<()>,
    shutdown: impl Future<Output = ()>,
  ) -> Result<(), WatchError> {
    tokio::pin!(shutdown);
    let mut handles = self.start_generation().await?;

    loop {
      tokio::select! {
        _ = &mut shutdown => {
          info!("stopping watch");
          break;
        }
        event = events.recv() => {
          if event.is_none() {
            debug!("manifest events closed");
            break;
          }
          while events.try_recv().is_ok() {}

          info!("manifest changed, rebuilding");
          self.builder.reporter().manifest_changed();
          close_all(std::mem::take(&mut handles)).await;
          handles = self.start_generation().await?;
        }
      }
    }

    close_all(handles).await;
    Ok(())
  }

  /// Start a generation. Errors the next manifest change may fix are
  /// reported and leave the session without watches until then.
  async fn start_generation(&self) -> Result<Vec<WatchHandle>, WatchError> {
    match self.builder.start_watching().await {
      Ok(handles) => Ok(handles),
      Err(e) if !e.is_fatal_in_watch() => {
        warn!(error = %e, "cannot start build, waiting for the manifest to change");
        self.builder.reporter().generation_failed(&e);
        Ok(Vec::new())
      }
      Err(e) => Err(e.into()),
    }
  }
}

fn is_manifest_event(event: &Event, manifest: &Path) -> bool {
  if matches!(event.kind, EventKind::Access(_)) {
    return false;
  }
  event
    .paths
    .iter()
    .any(|path| path.file_name().is_some() && path.file_name() == manifest.file_name())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!(error = %e, "cannot listen for Ctrl-C");
    std::future::pending::<()>().await;
  }
}
