//! Bundler driven as a child process.
//!
//! The program is invoked with esbuild-compatible arguments:
//!
//! ```text
//! <program> <entry> --bundle --format=iife --global-name=exports \
//!   --platform=neutral --outfile=<output> --footer:js=<handler glue>
//! ```
//!
//! The footer binds every handler to a global function so the host
//! application can call it by name.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Instant;

use notify::{Event, EventKind, RecursiveMode, Watcher};
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use super::{BundleConfig, BundleError, Bundler, CompilationResult, WatchCallback, WatchHandle};

/// A bundler executed as an external program.
#[derive(Debug, Clone)]
pub struct CommandBundler {
  program: String,
}

impl CommandBundler {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
    }
  }

  /// Arguments passed to the bundler for a target.
  pub fn args(config: &BundleConfig) -> Vec<String> {
    let mut args = vec![
      config.entry.display().to_string(),
      "--bundle".to_string(),
      "--format=iife".to_string(),
      "--global-name=exports".to_string(),
      "--platform=neutral".to_string(),
      format!("--outfile={}", config.output.display()),
    ];

    let footer = footer(&config.handlers, &config.identifiers);
    if !footer.is_empty() {
      args.push(format!("--footer:js={}", footer));
    }

    args
  }
}

/// JavaScript appended to the bundle: one global per handler, plus the
/// identifiers served by the script.
fn footer(handlers: &[String], identifiers: &[String]) -> String {
  let mut lines = Vec::new();
  let mut seen = Vec::new();

  for handler in handlers {
    if seen.contains(&handler) {
      continue;
    }
    seen.push(handler);

    let name = js_string(handler);
    let lookup = if handler == crate::manifest::DEFAULT_HANDLER {
      format!("exports[{}] || exports.default", name)
    } else {
      format!("exports[{}]", name)
    };
    lines.push(format!(
      "globalThis[{name}] = function (context) {{ var fn = {lookup}; return fn && fn(context); }};"
    ));
  }

  if !identifiers.is_empty() {
    let list = serde_json::to_string(identifiers).unwrap_or_else(|_| "[]".to_string());
    lines.push(format!("globalThis.__command_identifiers = {};", list));
  }

  lines.join("\n")
}

fn js_string(value: &str) -> String {
  serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value))
}

impl Bundler for CommandBundler {
  async fn compile(&self, config: &BundleConfig) -> Result<CompilationResult, BundleError> {
    run(&self.program, config).await
  }

  fn watch(&self, config: BundleConfig, callback: WatchCallback) -> Result<WatchHandle, BundleError> {
    // Imports may live anywhere in the project, so the whole root is watched.
    let watch_root = config.root.clone();

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
      // The receiver is gone once the watch task has exited.
      let _ = event_tx.send(res);
    })
    .map_err(|source| BundleError::Watch {
      path: watch_root.clone(),
      source,
    })?;
    watcher
      .watch(&watch_root, RecursiveMode::Recursive)
      .map_err(|source| BundleError::Watch {
        path: watch_root.clone(),
        source,
      })?;

    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
    let program = self.program.clone();

    info!(entry = %config.entry.display(), root = %watch_root.display(), "watching sources");

    let task = tokio::spawn(async move {
      // Owned by the task so the file watcher lives exactly as long as it.
      let _watcher = watcher;

      tokio::select! {
        _ = &mut shutdown_rx => return,
        result = run(&program, &config) => callback(result),
      }

      loop {
        tokio::select! {
          _ = &mut shutdown_rx => break,
          event = event_rx.recv() => {
            match event {
              None => break,
              Some(Ok(event)) if is_relevant(&event, &config.ignore) => {}
              Some(Ok(_)) => continue,
              Some(Err(e)) => {
                warn!(entry = %config.entry.display(), error = %e, "file watcher error");
                continue;
              }
            }

            // One recompilation covers a burst of events.
            while event_rx.try_recv().is_ok() {}

            debug!(entry = %config.entry.display(), "sources changed, recompiling");
            tokio::select! {
              _ = &mut shutdown_rx => break,
              result = run(&program, &config) => callback(result),
            }
          }
        }
      }

      debug!(entry = %config.entry.display(), "watch closed");
    });

    Ok(WatchHandle::new(shutdown_tx, task))
  }
}

/// Directories whose content never triggers a recompilation.
const IGNORED_DIRS: &[&str] = &["node_modules", ".git"];

fn is_relevant(event: &Event, ignore: &[PathBuf]) -> bool {
  if matches!(event.kind, EventKind::Access(_)) {
    return false;
  }
  event.paths.iter().any(|path| {
    !ignore.iter().any(|ignored| path.starts_with(ignored))
      && !path
        .components()
        .any(|c| IGNORED_DIRS.iter().any(|dir| c.as_os_str() == *dir))
  })
}

/// Run the bundler once for a target.
///
/// A non-zero exit turns the bundler's stderr into compilation errors; on
/// success, anything printed to stderr is reported as warnings.
async fn run(program: &str, config: &BundleConfig) -> Result<CompilationResult, BundleError> {
  if let Some(parent) = config.output.parent() {
    tokio::fs::create_dir_all(parent)
      .await
      .map_err(|source| BundleError::CreateDir {
        path: parent.to_path_buf(),
        source,
      })?;
  }

  let args = CommandBundler::args(config);
  debug!(program = %program, args = ?args, "spawning bundler");

  let started = Instant::now();
  let output = Command::new(program)
    .args(&args)
    .current_dir(&config.root)
    .stdin(Stdio::null())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .kill_on_drop(true)
    .output()
    .await
    .map_err(|source| BundleError::Spawn {
      program: program.to_string(),
      source,
    })?;
  let duration = started.elapsed();

  let stdout = String::from_utf8_lossy(&output.stdout);
  if !stdout.trim().is_empty() {
    debug!(stdout = %stdout.trim(), "bundler output");
  }

  let diagnostics: Vec<String> = String::from_utf8_lossy(&output.stderr)
    .lines()
    .map(str::trim_end)
    .filter(|line| !line.trim().is_empty())
    .map(str::to_string)
    .collect();

  if output.status.success() {
    Ok(CompilationResult {
      errors: Vec::new(),
      warnings: diagnostics,
      duration,
    })
  } else {
    let errors = if diagnostics.is_empty() {
      vec![format!("{} exited with {}", program, output.status)]
    } else {
      diagnostics
    };
    Ok(CompilationResult {
      errors,
      warnings: Vec::new(),
      duration,
    })
  }
}
