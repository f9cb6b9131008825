//! Resource and asset discovery.
//!
//! Both lists are declared as glob patterns relative to the project root.
//! Patterns starting with `!` exclude files matched by the other patterns.

use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern, PatternError};
use indexmap::IndexSet;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ProjectConfig;

#[derive(Debug, Error)]
pub enum CollectError {
  #[error("invalid glob pattern {pattern:?}: {source}")]
  Pattern { pattern: String, source: PatternError },
}

/// Scripts compiled into `Contents/Resources`.
pub fn collect_resources(config: &ProjectConfig) -> Result<Vec<PathBuf>, CollectError> {
  expand(&config.root, &config.resources)
}

/// Files copied verbatim into `Contents/Resources`.
pub fn collect_assets(config: &ProjectConfig) -> Result<Vec<PathBuf>, CollectError> {
  expand(&config.root, &config.assets)
}

/// Expand glob patterns into existing files, relative to `root`.
///
/// No patterns, or no matches, is an empty list. Directories are skipped and
/// a file matched by several patterns is listed once.
pub fn expand(root: &Path, patterns: &[String]) -> Result<Vec<PathBuf>, CollectError> {
  if patterns.is_empty() {
    return Ok(Vec::new());
  }

  let options = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
  };

  let mut excludes = Vec::new();
  let mut includes = Vec::new();
  for raw in patterns {
    match raw.strip_prefix('!') {
      Some(negated) => excludes.push(compile(negated)?),
      None => includes.push(raw.as_str()),
    }
  }

  let escaped_root = Pattern::escape(&root.to_string_lossy());
  let mut files = IndexSet::new();

  for pattern in includes {
    let absolute = format!("{}/{}", escaped_root, pattern.trim_start_matches("./"));
    let entries = glob::glob_with(&absolute, options).map_err(|source| CollectError::Pattern {
      pattern: pattern.to_string(),
      source,
    })?;

    for entry in entries {
      let path = match entry {
        Ok(path) => path,
        Err(e) => {
          warn!(pattern = %pattern, error = %e, "skipping unreadable path");
          continue;
        }
      };
      if !path.is_file() {
        continue;
      }
      let relative = path.strip_prefix(root).map(Path::to_path_buf).unwrap_or(path);
      if excludes.iter().any(|p| p.matches_path_with(&relative, options)) {
        continue;
      }
      files.insert(relative);
    }
  }

  debug!(patterns = patterns.len(), files = files.len(), "expanded globs");
  Ok(files.into_iter().collect())
}

fn compile(pattern: &str) -> Result<Pattern, CollectError> {
  Pattern::new(pattern.trim_start_matches("./")).map_err(|source| CollectError::Pattern {
    pattern: pattern.to_string(),
    source,
  })
}
