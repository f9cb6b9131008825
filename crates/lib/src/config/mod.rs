//! Project configuration.
//!
//! The project is described by its `package.json`. Plugin-specific settings
//! live under the `skpm` key:
//!
//! ```json
//! {
//!   "name": "my-plugin",
//!   "version": "1.0.0",
//!   "repository": "jane/my-plugin",
//!   "skpm": {
//!     "main": "my-plugin.sketchplugin",
//!     "manifest": "src/manifest.json",
//!     "resources": ["resources/**/*.js"],
//!     "assets": ["assets/**/*"]
//!   }
//! }
//! ```
//!
//! The remaining package metadata (version, description, author, ...) is the
//! fallback for the emitted plugin manifest.

mod author;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use author::{Author, AuthorField};

/// Name of the project metadata file, resolved against the project root.
pub const PACKAGE_FILE: &str = "package.json";

/// Environment variable overriding the bundler program.
pub const BUNDLER_ENV: &str = "SKETCHPACK_BUNDLER";

/// Bundler program used when neither the package nor the environment names one.
pub const DEFAULT_BUNDLER: &str = "esbuild";

/// Errors that can occur while resolving the project configuration.
///
/// All of them are fatal: configuration problems are not transient.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read {}: {source}", path.display())]
  Read { path: PathBuf, source: std::io::Error },

  #[error("failed to parse {}: {source}", path.display())]
  Parse { path: PathBuf, source: serde_json::Error },

  #[error("missing \"skpm.main\" field in package.json, it should point to the \".sketchplugin\" bundle")]
  MissingMain,

  #[error("missing \"skpm.manifest\" field in package.json, it should point to the \"manifest.json\" file")]
  MissingManifest,
}

/// An appcast setting: either a feed URL or a boolean switch.
///
/// Only `false` has a meaning as a boolean; it suppresses the appcast entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Appcast {
  Url(String),
  Flag(bool),
}

impl Appcast {
  pub fn is_disabled(&self) -> bool {
    matches!(self, Appcast::Flag(false))
  }

  pub fn url(&self) -> Option<&str> {
    match self {
      Appcast::Url(url) if !url.is_empty() => Some(url),
      _ => None,
    }
  }
}

#[derive(Debug, Deserialize)]
struct PackageJson {
  name: Option<String>,
  version: Option<String>,
  description: Option<String>,
  homepage: Option<String>,
  repository: Option<RepositoryField>,
  author: Option<AuthorField>,
  skpm: Option<SkpmSection>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RepositoryField {
  Short(String),
  Object { url: String },
}

#[derive(Debug, Default, Deserialize)]
struct SkpmSection {
  name: Option<String>,
  main: Option<String>,
  manifest: Option<String>,
  #[serde(default)]
  resources: Vec<String>,
  #[serde(default)]
  assets: Vec<String>,
  appcast: Option<Appcast>,
  bundler: Option<String>,
}

/// Immutable project configuration, loaded once per process.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
  /// Project root; every relative path below resolves against it.
  pub root: PathBuf,
  pub name: Option<String>,
  pub version: Option<String>,
  pub description: Option<String>,
  pub homepage: Option<String>,
  /// GitHub repository as `owner/repo`.
  pub repository: Option<String>,
  pub author: Option<AuthorField>,
  /// Output bundle path (the `.sketchplugin` directory).
  pub main: String,
  /// Source manifest path.
  pub manifest: String,
  /// Globs for scripts compiled into `Contents/Resources`.
  pub resources: Vec<String>,
  /// Globs for files copied verbatim into `Contents/Resources`.
  pub assets: Vec<String>,
  pub appcast: Option<Appcast>,
  /// Bundler program invoked for every compilation.
  pub bundler: String,
}

impl ProjectConfig {
  /// Load `package.json` from the given project root.
  pub fn load(root: &Path) -> Result<Self, ConfigError> {
    let root = dunce::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
    let path = root.join(PACKAGE_FILE);

    let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
      path: path.clone(),
      source,
    })?;

    let config = Self::from_json(&root, &content)?;
    debug!(
      root = %config.root.display(),
      main = %config.main,
      manifest = %config.manifest,
      bundler = %config.bundler,
      "loaded project config"
    );
    Ok(config)
  }

  /// Build the configuration from `package.json` content.
  pub fn from_json(root: &Path, content: &str) -> Result<Self, ConfigError> {
    let package: PackageJson = serde_json::from_str(content).map_err(|source| ConfigError::Parse {
      path: root.join(PACKAGE_FILE),
      source,
    })?;
    let skpm = package.skpm.unwrap_or_default();

    let main = skpm.main.filter(|m| !m.is_empty()).ok_or(ConfigError::MissingMain)?;
    let manifest = skpm
      .manifest
      .filter(|m| !m.is_empty())
      .ok_or(ConfigError::MissingManifest)?;

    let repository = package.repository.and_then(|field| match field {
      RepositoryField::Short(raw) => normalize_repository(&raw),
      RepositoryField::Object { url } => normalize_repository(&url),
    });

    let bundler = std::env::var(BUNDLER_ENV)
      .ok()
      .filter(|b| !b.is_empty())
      .or(skpm.bundler)
      .unwrap_or_else(|| DEFAULT_BUNDLER.to_string());

    Ok(Self {
      root: root.to_path_buf(),
      name: skpm.name.or(package.name),
      version: package.version,
      description: package.description,
      homepage: package.homepage,
      repository,
      author: package.author,
      main,
      manifest,
      resources: skpm.resources,
      assets: skpm.assets,
      appcast: skpm.appcast,
      bundler,
    })
  }

  /// Absolute path of the output bundle.
  pub fn output_dir(&self) -> PathBuf {
    self.root.join(&self.main)
  }

  /// Absolute path of the source manifest.
  pub fn manifest_path(&self) -> PathBuf {
    self.root.join(&self.manifest)
  }

  /// Default appcast feed, hosted next to the sources on GitHub.
  pub fn default_appcast_url(&self) -> Option<String> {
    self
      .repository
      .as_ref()
      .map(|repo| format!("https://raw.githubusercontent.com/{}/master/.appcast.xml", repo))
  }
}

/// Normalize a `repository` value to `owner/repo`.
///
/// Accepts the npm shorthand forms (`owner/repo`, `github:owner/repo`) and
/// GitHub URLs in their https, ssh and `git+` variants. Repositories hosted
/// elsewhere yield `None`.
pub fn normalize_repository(raw: &str) -> Option<String> {
  const PREFIXES: &[&str] = &[
    "https://github.com/",
    "http://github.com/",
    "git://github.com/",
    "ssh://git@github.com/",
    "git@github.com:",
    "github:",
  ];

  let mut rest = raw.trim();
  rest = rest.strip_prefix("git+").unwrap_or(rest);

  if let Some(stripped) = PREFIXES.iter().find_map(|p| rest.strip_prefix(p)) {
    rest = stripped;
  } else if rest.contains(':') {
    return None;
  }

  let rest = rest.trim_end_matches('/');
  let rest = rest.strip_suffix(".git").unwrap_or(rest);

  let mut parts = rest.split('/');
  match (parts.next(), parts.next(), parts.next()) {
    (Some(owner), Some(repo), None) if !owner.is_empty() && !repo.is_empty() => Some(format!("{}/{}", owner, repo)),
    _ => None,
  }
}
