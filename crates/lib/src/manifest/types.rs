//! Plugin manifest types.
//!
//! The source manifest is a JSON document listing the plugin's commands. Only
//! the fields the build step reads or rewrites are typed; every other key is
//! kept in `extra` and emitted untouched.
//!
//! ```json
//! {
//!   "commands": [
//!     { "name": "Open", "identifier": "open", "script": "./open.js", "handler": "onRun" },
//!     { "script": "./open.js", "handlers": { "actions": { "OpenDocument": "onOpenDocument" } } }
//!   ],
//!   "menu": { "items": ["open"] }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::Appcast;

/// Errors raised while reading or normalizing a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("failed to read manifest {}: {source}", path.display())]
  Read { path: PathBuf, source: std::io::Error },

  #[error("failed to parse manifest {}: {source}", path.display())]
  Parse { path: PathBuf, source: serde_json::Error },

  #[error("handlers of {script} are nested deeper than {max} levels")]
  HandlersTooDeep { script: String, max: usize },
}

/// Handler declaration of a command.
///
/// A leaf is a single function name or a list of names; groups nest leaves
/// under arbitrary labels (e.g. `actions` -> action name -> handler).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HandlerSpec {
  Name(String),
  List(Vec<String>),
  Group(IndexMap<String, HandlerSpec>),
}

/// A command entry of the source manifest.
///
/// Several entries may point at the same script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandSpec {
  pub script: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub handler: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub handlers: Option<HandlerSpec>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub identifier: Option<String>,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl CommandSpec {
  pub fn new(script: impl Into<String>) -> Self {
    Self {
      script: script.into(),
      handler: None,
      handlers: None,
      identifier: None,
      extra: Map::new(),
    }
  }
}

/// The source manifest document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestDocument {
  #[serde(default)]
  pub commands: Vec<CommandSpec>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub version: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub homepage: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub author: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub author_email: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub disable_cocoa_script_preprocessor: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub appcast: Option<Appcast>,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl ManifestDocument {
  /// Read the manifest from disk.
  ///
  /// Always reads the file anew; nothing is cached between calls, so every
  /// build generation sees the latest edits.
  pub fn load(path: &Path) -> Result<Self, ManifestError> {
    let content = fs::read_to_string(path).map_err(|source| ManifestError::Read {
      path: path.to_path_buf(),
      source,
    })?;

    serde_json::from_str(&content).map_err(|source| ManifestError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }
}
