//! Folding manifest commands into compilation targets.

use indexmap::IndexMap;

use super::types::{CommandSpec, HandlerSpec, ManifestError};

/// Handler every compiled command exposes, whether declared or not.
pub const DEFAULT_HANDLER: &str = "onRun";

/// Maximum number of nested handler groups accepted in a command.
pub const MAX_HANDLER_DEPTH: usize = 32;

/// One distinct script to compile, with the handlers and identifiers of
/// every command that references it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationTarget {
  pub script: String,
  pub handlers: Vec<String>,
  pub identifiers: Vec<String>,
}

/// Fold the commands of a manifest into one target per script.
///
/// Targets come out in the order their script is first referenced. Handler
/// names are appended in discovery order without deduplication, except for
/// [`DEFAULT_HANDLER`] which is added once if no command declared it.
pub fn collect_targets(commands: &[CommandSpec]) -> Result<Vec<CompilationTarget>, ManifestError> {
  let mut targets: IndexMap<&str, CompilationTarget> = IndexMap::new();

  for command in commands {
    let target = targets
      .entry(command.script.as_str())
      .or_insert_with(|| CompilationTarget {
        script: command.script.clone(),
        handlers: Vec::new(),
        identifiers: Vec::new(),
      });

    if let Some(handler) = &command.handler {
      target.handlers.push(handler.clone());
    } else if let Some(handlers) = &command.handlers {
      flatten_handlers(handlers, 0, &mut target.handlers).map_err(|()| ManifestError::HandlersTooDeep {
        script: command.script.clone(),
        max: MAX_HANDLER_DEPTH,
      })?;
    }

    if !target.handlers.iter().any(|h| h == DEFAULT_HANDLER) {
      target.handlers.push(DEFAULT_HANDLER.to_string());
    }

    if let Some(identifier) = &command.identifier {
      target.identifiers.push(identifier.clone());
    }
  }

  Ok(targets.into_values().collect())
}

fn flatten_handlers(spec: &HandlerSpec, depth: usize, out: &mut Vec<String>) -> Result<(), ()> {
  match spec {
    HandlerSpec::Name(name) => out.push(name.clone()),
    HandlerSpec::List(names) => out.extend(names.iter().cloned()),
    HandlerSpec::Group(entries) => {
      if depth >= MAX_HANDLER_DEPTH {
        return Err(());
      }
      for nested in entries.values() {
        flatten_handlers(nested, depth + 1, out)?;
      }
    }
  }
  Ok(())
}
