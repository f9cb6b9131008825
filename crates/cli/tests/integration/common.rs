//! Shared test helpers for CLI integration tests.

use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Stand-in bundler: copies the entry to `--outfile`, fails on
/// `SYNTAX_ERROR` and warns on `WARN`.
const FAKE_BUNDLER: &str = r#"#!/bin/sh
entry="$1"
out=""
for arg in "$@"; do
  case "$arg" in
    --outfile=*) out="${arg#--outfile=}" ;;
  esac
done
if grep -q SYNTAX_ERROR "$entry"; then
  echo "error: bad syntax in $entry" >&2
  exit 1
fi
if grep -q WARN "$entry"; then
  echo "warning: suspicious code" >&2
fi
mkdir -p "$(dirname "$out")"
cp "$entry" "$out"
"#;

/// Default `skpm` section of the generated package.json.
pub const SKPM: &str = r#"{
  "main": "my-plugin.sketchplugin",
  "manifest": "src/manifest.json",
  "resources": ["resources/**/*.js"],
  "assets": ["assets/**/*"]
}"#;

/// Isolated plugin project.
///
/// Each test gets its own temporary project directory and its own copy of
/// the fake bundler.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// Create a project with the given `skpm` section.
  pub fn new(skpm: &str) -> Self {
    let temp = TempDir::new().unwrap();
    let env = Self { temp };
    env.write_file(
      "package.json",
      &format!(
        r#"{{ "name": "my-plugin", "version": "1.2.0", "description": "A plugin", "repository": "acme/my-plugin", "author": "Jane Doe <jane@example.com>", "skpm": {} }}"#,
        skpm
      ),
    );
    env
  }

  /// Write a file relative to the project root.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  /// Project root, canonicalized.
  pub fn root(&self) -> PathBuf {
    dunce::canonicalize(self.temp.path()).unwrap()
  }

  /// Path inside the built bundle.
  pub fn bundle_path(&self, relative_path: &str) -> PathBuf {
    self.root().join("my-plugin.sketchplugin").join(relative_path)
  }

  fn bundler_path(&self) -> PathBuf {
    let dir = self.temp.path().join(".bin");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("fake-bundler");
    std::fs::write(&path, FAKE_BUNDLER).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
  }

  /// Get a pre-configured Command for the sketchpack binary.
  ///
  /// Runs in the project root with `SKETCHPACK_BUNDLER` pointing at the fake
  /// bundler.
  pub fn sketchpack_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("sketchpack");
    cmd.env("SKETCHPACK_BUNDLER", self.bundler_path());
    cmd.env_remove("RUST_LOG");
    cmd.arg("--cwd").arg(self.temp.path());
    cmd
  }
}
