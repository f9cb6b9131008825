mod cmd;
mod output;
mod reporter;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cmd::BuildArgs;

/// sketchpack - Build Sketch plugins
#[derive(Parser)]
#[command(name = "sketchpack")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Rebuild on every change to the sources or the manifest
  #[arg(short, long)]
  watch: bool,

  /// Hide compilation warnings
  #[arg(short, long)]
  quiet: bool,

  /// Run the plugin once built (accepted, not acted on)
  #[arg(short, long)]
  run: bool,

  /// Enable verbose logging
  #[arg(short, long)]
  verbose: bool,

  /// Project directory containing package.json
  #[arg(long, default_value = ".")]
  cwd: PathBuf,
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let args = BuildArgs {
    root: cli.cwd,
    watch: cli.watch,
    quiet: cli.quiet,
    run: cli.run,
  };

  match cmd::cmd_build(&args) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      output::print_error(&format!("{:#}", e));
      ExitCode::FAILURE
    }
  }
}
