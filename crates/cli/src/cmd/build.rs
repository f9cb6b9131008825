//! Implementation of the `sketchpack` build.
//!
//! Loads the project from `package.json`, then either builds the plugin once
//! or keeps rebuilding it until interrupted.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use sketchpack_lib::build::{BuildMode, BuildOptions, Builder};
use sketchpack_lib::bundler::CommandBundler;
use sketchpack_lib::config::ProjectConfig;
use sketchpack_lib::watch::WatchCoordinator;

use crate::output::print_info;
use crate::reporter::ConsoleReporter;

pub struct BuildArgs {
  pub root: PathBuf,
  pub watch: bool,
  pub quiet: bool,
  pub run: bool,
}

/// Execute the build.
///
/// One-shot builds fail on the first error. In watch mode only errors that
/// cannot be recovered by editing the sources end the session.
pub fn cmd_build(args: &BuildArgs) -> Result<()> {
  let config = ProjectConfig::load(&args.root).context("Failed to load package.json")?;
  if args.run {
    debug!("--run is not supported, the plugin is only built");
  }

  let mode = if args.watch { BuildMode::Watch } else { BuildMode::Once };
  let options = BuildOptions {
    mode,
    quiet: args.quiet,
  };
  let bundler = CommandBundler::new(config.bundler.clone());
  let builder = Builder::new(
    Arc::new(config),
    Arc::new(bundler),
    Arc::new(ConsoleReporter::new(mode)),
    options,
  );

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;

  match mode {
    BuildMode::Once => {
      let summary = rt.block_on(builder.run_once()).context("Build failed")?;
      debug!(generation = summary.generation, steps = summary.steps, "build finished");
    }
    BuildMode::Watch => {
      print_info("Watching for changes, press Ctrl-C to stop");
      let coordinator = WatchCoordinator::new(builder);
      rt.block_on(coordinator.run()).context("Watch failed")?;
    }
  }

  Ok(())
}
