//! Emitting the bundle manifest.
//!
//! The emitted manifest is the source document with project-level defaults
//! filled in and script paths reduced to file names, since the compiled
//! scripts sit next to it in `Contents/Sketch`.

use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use super::types::ManifestDocument;
use crate::config::{Appcast, ProjectConfig};
use crate::paths;

/// Errors that can occur while writing the bundle manifest.
#[derive(Debug, Error)]
pub enum EmitError {
  #[error("failed to serialize the manifest: {0}")]
  Serialize(#[from] serde_json::Error),

  #[error("failed to create directory {}: {source}", path.display())]
  CreateDir { path: PathBuf, source: std::io::Error },

  #[error("error while writing the manifest {}: {source}", path.display())]
  Write { path: PathBuf, source: std::io::Error },
}

/// Merge the source manifest with the project defaults.
pub fn render_manifest(doc: &ManifestDocument, config: &ProjectConfig) -> ManifestDocument {
  let mut out = doc.clone();

  out.version = or_default(&doc.version, &config.version);
  out.description = or_default(&doc.description, &config.description);
  out.homepage = or_default(&doc.homepage, &config.homepage);
  out.name = or_default(&doc.name, &config.name);
  out.disable_cocoa_script_preprocessor = Some(doc.disable_cocoa_script_preprocessor.unwrap_or(true));
  out.appcast = resolve_appcast(doc, config);

  let has_author = doc.author.as_deref().is_some_and(|a| !a.is_empty());
  if !has_author {
    if let Some(field) = &config.author {
      let author = field.resolve();
      out.author = (!author.name.is_empty()).then_some(author.name);
      if out.author_email.is_none() {
        out.author_email = author.email;
      }
    }
  }

  for command in &mut out.commands {
    command.script = paths::basename(&command.script);
  }

  out
}

/// The document value unless it is missing or empty, then the package value.
fn or_default(document: &Option<String>, package: &Option<String>) -> Option<String> {
  document
    .as_deref()
    .filter(|value| !value.is_empty())
    .or(package.as_deref())
    .map(str::to_string)
}

/// Appcast URL of the emitted manifest.
///
/// `false` on either side suppresses it; otherwise the document value wins,
/// then the project value, then the feed derived from the repository.
fn resolve_appcast(doc: &ManifestDocument, config: &ProjectConfig) -> Option<Appcast> {
  let disabled = doc.appcast.as_ref().is_some_and(Appcast::is_disabled)
    || config.appcast.as_ref().is_some_and(Appcast::is_disabled);
  if disabled {
    return None;
  }

  doc
    .appcast
    .as_ref()
    .and_then(Appcast::url)
    .or_else(|| config.appcast.as_ref().and_then(Appcast::url))
    .map(str::to_string)
    .or_else(|| config.default_appcast_url())
    .map(Appcast::Url)
}

/// Render the manifest and write it to `Contents/Sketch/manifest.json`.
///
/// Returns the path written.
pub async fn emit_manifest(doc: &ManifestDocument, config: &ProjectConfig) -> Result<PathBuf, EmitError> {
  let output = config.output_dir();
  let dir = paths::sketch_dir(&output);
  let path = paths::manifest_output(&output);

  let rendered = render_manifest(doc, config);
  let json = serde_json::to_string_pretty(&rendered)?;

  tokio::fs::create_dir_all(&dir)
    .await
    .map_err(|source| EmitError::CreateDir { path: dir.clone(), source })?;
  tokio::fs::write(&path, json).await.map_err(|source| EmitError::Write {
    path: path.clone(),
    source,
  })?;

  debug!(path = %path.display(), commands = rendered.commands.len(), "wrote manifest");
  Ok(path)
}
