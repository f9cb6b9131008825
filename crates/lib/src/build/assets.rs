//! Copying assets into the bundle.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::BuildError;
use crate::paths;

/// Destination of an asset: its file name under `Contents/Resources`.
pub fn asset_destination(output: &Path, asset: &Path) -> PathBuf {
  let name = asset.file_name().unwrap_or(asset.as_os_str());
  paths::resources_dir(output).join(name)
}

/// Copy one asset, creating the destination directory first.
pub async fn copy_asset(asset: &Path, source: &Path, destination: &Path) -> Result<(), BuildError> {
  let fail = |source| BuildError::AssetCopy {
    asset: asset.to_path_buf(),
    source,
  };

  if let Some(parent) = destination.parent() {
    tokio::fs::create_dir_all(parent).await.map_err(fail)?;
  }
  tokio::fs::copy(source, destination).await.map_err(fail)?;

  debug!(asset = %asset.display(), destination = %destination.display(), "copied asset");
  Ok(())
}
