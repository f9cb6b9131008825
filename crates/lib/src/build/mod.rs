//! Build orchestration.
//!
//! A build generation runs in three strictly ordered phases:
//! 1. Emit the bundle manifest
//! 2. Copy assets (concurrently among themselves)
//! 3. Compile commands and resources (concurrently among themselves)
//!
//! In [`BuildMode::Once`] the first failure ends the build. In
//! [`BuildMode::Watch`] compilation is handed to persistent watches whose
//! failures are reported and survived; the returned handles are owned by the
//! caller until the next generation.

pub mod assets;
pub mod generation;
mod report;
mod types;

use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::bundler::{BundleConfig, BundleError, Bundler, CompilationResult, WatchCallback, WatchHandle};
use crate::collect::{collect_assets, collect_resources};
use crate::config::ProjectConfig;
use crate::manifest::{ManifestDocument, collect_targets, emit_manifest};
use crate::paths;

pub use generation::BuildGeneration;
pub use report::{BuildSummary, Progress, Reporter};
pub use types::{BuildError, BuildJob, BuildMode, BuildOptions, BuildPlan};

/// Drives build generations for one project.
pub struct Builder<B: Bundler, R: Reporter> {
  config: Arc<ProjectConfig>,
  bundler: Arc<B>,
  reporter: Arc<R>,
  options: BuildOptions,
}

impl<B: Bundler, R: Reporter> Builder<B, R> {
  pub fn new(config: Arc<ProjectConfig>, bundler: Arc<B>, reporter: Arc<R>, options: BuildOptions) -> Self {
    Self {
      config,
      bundler,
      reporter,
      options,
    }
  }

  pub fn config(&self) -> &ProjectConfig {
    &self.config
  }

  pub fn reporter(&self) -> &Arc<R> {
    &self.reporter
  }

  /// Resolve the work of a new generation from a fresh manifest read.
  ///
  /// The manifest read and glob expansion run on the blocking pool.
  pub async fn plan(&self) -> Result<BuildPlan, BuildError> {
    let config = self.config.clone();
    tokio::task::spawn_blocking(move || resolve_plan(&config)).await?
  }

  /// Compilation jobs of a plan: commands first, then resources.
  ///
  /// Command scripts resolve against the manifest's directory and compile
  /// into `Contents/Sketch`; resources resolve against the project root and
  /// compile into `Contents/Resources`.
  pub fn jobs(&self, plan: &BuildPlan) -> Vec<BuildJob> {
    let output = self.config.output_dir();
    let manifest_path = self.config.manifest_path();
    let manifest_dir = manifest_path.parent().unwrap_or(&self.config.root);

    let commands = plan.targets.iter().map(|target| BuildJob {
      label: target.script.clone(),
      config: BundleConfig {
        entry: manifest_dir.join(&target.script),
        output: paths::sketch_dir(&output).join(paths::basename(&target.script)),
        handlers: target.handlers.clone(),
        identifiers: target.identifiers.clone(),
        root: self.config.root.clone(),
        ignore: vec![output.clone()],
      },
    });

    let resources = plan.resources.iter().map(|resource| {
      let label = resource.display().to_string();
      BuildJob {
        config: BundleConfig {
          entry: self.config.root.join(resource),
          output: paths::resources_dir(&output).join(paths::basename(&label)),
          handlers: Vec::new(),
          identifiers: Vec::new(),
          root: self.config.root.clone(),
          ignore: vec![output.clone()],
        },
        label,
      }
    });

    commands.chain(resources).collect()
  }

  fn progress(&self, generation: &BuildGeneration, step: usize) -> Option<Progress> {
    match self.options.mode {
      BuildMode::Once => Some(Progress {
        step,
        total: generation.total(),
      }),
      BuildMode::Watch => None,
    }
  }

  /// Build the plugin once.
  ///
  /// Succeeds once every step of the generation has completed; any failure
  /// is returned as soon as it happens.
  pub async fn run_once(&self) -> Result<BuildSummary, BuildError> {
    let plan = self.plan().await?;
    let generation = BuildGeneration::new(plan.total_steps());
    info!(
      generation = generation.id(),
      commands = plan.targets.len(),
      resources = plan.resources.len(),
      assets = plan.assets.len(),
      "starting build"
    );

    self.copy_manifest(&plan, &generation).await?;
    self.copy_assets(&plan, &generation).await?;
    self.compile_all(&plan, &generation).await?;

    let summary = BuildSummary {
      generation: generation.id(),
      steps: generation.completed(),
      elapsed: generation.elapsed(),
    };
    if generation.is_complete() {
      info!(generation = summary.generation, steps = summary.steps, "build complete");
      self.reporter.finished(&summary);
    }
    Ok(summary)
  }

  /// Start a watch generation: emit the manifest, copy assets, then install a
  /// watch per compilation job.
  ///
  /// A manifest that cannot be written is reported without stopping the
  /// generation. Asset copy failures are returned; the caller treats them as
  /// fatal.
  pub async fn start_watching(&self) -> Result<Vec<WatchHandle>, BuildError> {
    let plan = self.plan().await?;
    let generation = BuildGeneration::new(plan.total_steps());
    info!(generation = generation.id(), "starting watch generation");

    if let Err(e) = self.copy_manifest(&plan, &generation).await {
      if let BuildError::Emit { manifest, source } = &e {
        error!(manifest = %manifest, error = %source, "failed to copy manifest");
        self.reporter.manifest_failed(manifest, source);
      } else {
        return Err(e);
      }
    }

    self.copy_assets(&plan, &generation).await?;

    let mut handles = Vec::new();
    for job in self.jobs(&plan) {
      let callback = self.watch_callback(job.label.clone());
      let handle = self
        .bundler
        .watch(job.config, callback)
        .map_err(|source| BuildError::Bundler {
          target: job.label.clone(),
          source,
        })?;
      handles.push(handle);
    }

    debug!(generation = generation.id(), watches = handles.len(), "watch generation started");
    Ok(handles)
  }

  async fn copy_manifest(&self, plan: &BuildPlan, generation: &BuildGeneration) -> Result<(), BuildError> {
    let started = Instant::now();
    emit_manifest(&plan.document, &self.config)
      .await
      .map_err(|source| BuildError::Emit {
        manifest: self.config.manifest.clone(),
        source,
      })?;

    let step = generation.complete_step();
    self
      .reporter
      .manifest_copied(&self.config.manifest, started.elapsed(), self.progress(generation, step));
    Ok(())
  }

  /// Copy every asset concurrently.
  ///
  /// All copies are allowed to settle; the first failure is returned
  /// afterwards.
  async fn copy_assets(&self, plan: &BuildPlan, generation: &BuildGeneration) -> Result<(), BuildError> {
    let output = self.config.output_dir();
    let mut join_set = JoinSet::new();

    for asset in &plan.assets {
      let asset = asset.clone();
      let source = self.config.root.join(&asset);
      let destination = assets::asset_destination(&output, &asset);
      join_set.spawn(async move {
        assets::copy_asset(&asset, &source, &destination).await?;
        Ok::<_, BuildError>(asset)
      });
    }

    let mut first_error = None;
    while let Some(joined) = join_set.join_next().await {
      match joined.map_err(BuildError::from).and_then(|copied| copied) {
        Ok(asset) => {
          let step = generation.complete_step();
          self.reporter.asset_copied(&asset, self.progress(generation, step));
        }
        Err(e) => {
          error!(error = %e, "asset copy failed");
          first_error.get_or_insert(e);
        }
      }
    }

    match first_error {
      Some(e) => Err(e),
      None => Ok(()),
    }
  }

  /// Compile every job concurrently, stopping at the first failure.
  async fn compile_all(&self, plan: &BuildPlan, generation: &BuildGeneration) -> Result<(), BuildError> {
    let mut join_set = JoinSet::new();

    for job in self.jobs(plan) {
      let bundler = self.bundler.clone();
      join_set.spawn(async move {
        let result = bundler.compile(&job.config).await;
        (job.label, result)
      });
    }

    while let Some(joined) = join_set.join_next().await {
      let (label, result) = joined?;
      let result = result.map_err(|source| BuildError::Bundler {
        target: label.clone(),
        source,
      });

      match result {
        Ok(compiled) if !compiled.has_errors() => {
          self.report_warnings(&label, &compiled);
          let step = generation.complete_step();
          self
            .reporter
            .built(&label, compiled.duration, self.progress(generation, step));
        }
        Ok(compiled) => {
          join_set.abort_all();
          return Err(BuildError::Compile {
            target: label,
            errors: compiled.errors,
          });
        }
        Err(e) => {
          join_set.abort_all();
          return Err(e);
        }
      }
    }

    Ok(())
  }

  fn report_warnings(&self, label: &str, compiled: &CompilationResult) {
    if compiled.has_warnings() && !self.options.quiet {
      self.reporter.warnings(label, &compiled.warnings);
    }
  }

  fn watch_callback(&self, label: String) -> WatchCallback {
    let reporter = self.reporter.clone();
    let quiet = self.options.quiet;

    Arc::new(move |result: Result<CompilationResult, BundleError>| match result {
      Ok(compiled) if compiled.has_errors() => {
        error!(target = %label, errors = compiled.errors.len(), "compilation failed");
        reporter.compile_failed(&label, &compiled.errors);
      }
      Ok(compiled) => {
        if compiled.has_warnings() && !quiet {
          reporter.warnings(&label, &compiled.warnings);
        }
        reporter.built(&label, compiled.duration, None);
      }
      Err(e) => {
        error!(target = %label, error = %e, "bundler failed");
        reporter.compile_failed(&label, &[e.to_string()]);
      }
    })
  }
}


fn resolve_plan(config: &ProjectConfig) -> Result<BuildPlan, BuildError> {
  let document = ManifestDocument::load(&config.manifest_path())?;
  let targets = collect_targets(&document.commands)?;
  let resources = collect_resources(config)?;
  let assets = collect_assets(config)?;

  Ok(BuildPlan {
    document,
    targets,
    resources,
    assets,
  })
}
