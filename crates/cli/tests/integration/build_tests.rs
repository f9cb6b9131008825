//! One-shot build integration tests.

use predicates::prelude::*;
use serde_json::Value;

use super::common::{SKPM, TestEnv};

const MANIFEST: &str = r#"{
  "identifier": "com.acme.my-plugin",
  "commands": [
    { "name": "Open", "identifier": "open", "script": "./commands/open.js", "handlers": { "run": "onRun", "actions": { "OpenDocument": "onOpenDocument" } } },
    { "name": "Close", "identifier": "close", "script": "./commands/open.js", "handler": "onClose" }
  ],
  "menu": { "title": "My Plugin", "items": ["open", "close"] }
}"#;

fn project() -> TestEnv {
  let env = TestEnv::new(SKPM);
  env.write_file("src/manifest.json", MANIFEST);
  env.write_file("src/commands/open.js", "export default function () {}");
  env.write_file("resources/webview.js", "window.ready = true");
  env.write_file("assets/icon.png", "png");
  env
}

#[test]
fn build_writes_the_whole_bundle() {
  let env = project();

  env
    .sketchpack_cmd()
    .assert()
    .success()
    .stdout(predicate::str::contains("[1/4]"))
    .stdout(predicate::str::contains("[4/4]"))
    .stdout(predicate::str::contains("Copied src/manifest.json"))
    .stdout(predicate::str::contains("Built ./commands/open.js"))
    .stdout(predicate::str::contains("Plugin built"));

  assert!(env.bundle_path("Contents/Sketch/open.js").is_file());
  assert!(env.bundle_path("Contents/Resources/webview.js").is_file());
  assert_eq!(
    std::fs::read_to_string(env.bundle_path("Contents/Resources/icon.png")).unwrap(),
    "png"
  );
}

#[test]
fn emitted_manifest_is_completed_from_package() {
  let env = project();

  env.sketchpack_cmd().assert().success();

  let manifest: Value =
    serde_json::from_str(&std::fs::read_to_string(env.bundle_path("Contents/Sketch/manifest.json")).unwrap()).unwrap();

  assert_eq!(manifest["version"], "1.2.0");
  assert_eq!(manifest["description"], "A plugin");
  assert_eq!(manifest["name"], "my-plugin");
  assert_eq!(manifest["author"], "Jane Doe");
  assert_eq!(manifest["authorEmail"], "jane@example.com");
  assert_eq!(manifest["disableCocoaScriptPreprocessor"], true);
  assert_eq!(
    manifest["appcast"],
    "https://raw.githubusercontent.com/acme/my-plugin/master/.appcast.xml"
  );
  assert_eq!(manifest["commands"][0]["script"], "open.js");
  assert_eq!(manifest["commands"][1]["script"], "open.js");
  assert_eq!(manifest["menu"]["title"], "My Plugin");
}

#[test]
fn asset_only_project_has_two_steps() {
  let env = TestEnv::new(r#"{ "main": "my-plugin.sketchplugin", "manifest": "src/manifest.json", "assets": ["assets/*"] }"#);
  env.write_file("src/manifest.json", r#"{ "commands": [] }"#);
  env.write_file("assets/icon.png", "png");

  env
    .sketchpack_cmd()
    .assert()
    .success()
    .stdout(predicate::str::contains("[2/2]"))
    .stdout(predicate::str::contains("Copied assets/icon.png"));

  assert!(env.bundle_path("Contents/Resources/icon.png").is_file());
}

#[test]
fn compile_error_fails_the_build() {
  let env = project();
  env.write_file("src/commands/open.js", "SYNTAX_ERROR");

  env
    .sketchpack_cmd()
    .assert()
    .code(1)
    .stderr(predicate::str::contains("error while building ./commands/open.js"))
    .stderr(predicate::str::contains("bad syntax"))
    .stdout(predicate::str::contains("Plugin built").not());
}

#[test]
fn warnings_are_shown_unless_quiet() {
  let env = project();
  env.write_file("src/commands/open.js", "// WARN");

  env
    .sketchpack_cmd()
    .assert()
    .success()
    .stderr(predicate::str::contains("warning: suspicious code"));

  env
    .sketchpack_cmd()
    .arg("--quiet")
    .assert()
    .success()
    .stderr(predicate::str::contains("suspicious code").not());
}

#[test]
fn missing_manifest_file_fails() {
  let env = TestEnv::new(SKPM);

  env
    .sketchpack_cmd()
    .assert()
    .code(1)
    .stderr(predicate::str::contains("manifest.json"));
}

#[test]
fn run_flag_is_accepted() {
  let env = project();

  env.sketchpack_cmd().arg("-r").assert().success();
}
