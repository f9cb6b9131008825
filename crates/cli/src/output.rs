//! CLI output formatting utilities.
//!
//! Provides consistent formatting for terminal output: colored status
//! markers, build progress and durations.

use std::time::Duration;

use owo_colors::{OwoColorize, Stream};
use sketchpack_lib::build::Progress;

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
}

pub fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  let millis = duration.subsec_millis();

  if secs >= 60 {
    let mins = secs / 60;
    let remaining_secs = secs % 60;
    format!("{}m {}s", mins, remaining_secs)
  } else if secs > 0 {
    format!("{}.{:02}s", secs, millis / 10)
  } else {
    format!("{}ms", millis)
  }
}

/// `[n/total] ` in dim text, or nothing outside one-shot builds.
pub fn progress_prefix(progress: Option<Progress>) -> String {
  match progress {
    Some(progress) => format!(
      "{} ",
      progress
        .to_string()
        .if_supports_color(Stream::Stdout, |s| s.dimmed())
    ),
    None => String::new(),
  }
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

/// Diagnostic lines from the bundler, indented under their heading.
pub fn print_diagnostics(lines: &[String]) {
  for line in lines {
    eprintln!("    {}", line);
  }
}
