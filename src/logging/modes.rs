use std::sync::atomic::{AtomicU8, Ordering};

use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

/// Global output mode shared by the logging macros.
///
/// Initialized to normal output; [`set_verbose`] and [`set_quiet`] change it.
static OUTPUT_MODE: AtomicU8 = AtomicU8::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
  Normal = 0,
  Quiet = 1,
  Verbose = 2,
}

impl OutputMode {
  const fn from_u8(value: u8) -> Self {
    match value {
      1 => OutputMode::Quiet,
      2 => OutputMode::Verbose,
      _ => OutputMode::Normal,
    }
  }
}

/// Enum representing the color mode options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
  /// Automatically determine whether to use colors based on TTY detection
  Auto,
  /// Never use colors
  Never,
  /// Always use colors
  Always,
}

impl ColorMode {
  /// Applies the mode to all colored output.
  pub fn apply(self) {
    match self {
      ColorMode::Auto => owo_colors::unset_override(),
      ColorMode::Never => owo_colors::set_override(false),
      ColorMode::Always => owo_colors::set_override(true),
    }
  }
}

/// Sets the global verbose logging flag.
///
/// When verbose logging is enabled, the [`verbose_log!`](crate::verbose_log)
/// macro writes its messages to stderr.
pub fn set_verbose() {
  OUTPUT_MODE.store(OutputMode::Verbose as u8, Ordering::SeqCst);
}

/// Suppresses [`info_log!`](crate::info_log) output.
pub fn set_quiet() {
  OUTPUT_MODE.store(OutputMode::Quiet as u8, Ordering::SeqCst);
}

pub fn is_verbose() -> bool {
  matches!(OutputMode::from_u8(OUTPUT_MODE.load(Ordering::SeqCst)), OutputMode::Verbose)
}

pub fn is_quiet() -> bool {
  matches!(OutputMode::from_u8(OUTPUT_MODE.load(Ordering::SeqCst)), OutputMode::Quiet)
}

/// Maps `-q` and the `-v` count to a default tracing filter.
const fn default_directive(quiet: bool, verbosity: u8) -> &'static str {
  if quiet {
    return "error";
  }
  match verbosity {
    0 => "warn",
    1 => "info",
    2 => "debug",
    _ => "trace",
  }
}

/// Installs the global tracing subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence over the level derived from the flags. Calling
/// this more than once keeps the first subscriber.
pub fn init_tracing(quiet: bool, verbosity: u8) {
  let filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(quiet, verbosity)));

  if let Err(e) = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .without_time()
    .try_init()
  {
    tracing::debug!("Keeping the existing tracing subscriber: {}", e);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_directive() {
    assert_eq!(default_directive(true, 3), "error");
    assert_eq!(default_directive(false, 0), "warn");
    assert_eq!(default_directive(false, 1), "info");
    assert_eq!(default_directive(false, 2), "debug");
    assert_eq!(default_directive(false, 7), "trace");
  }

  #[test]
  fn test_output_mode_from_u8() {
    assert_eq!(OutputMode::from_u8(0), OutputMode::Normal);
    assert_eq!(OutputMode::from_u8(1), OutputMode::Quiet);
    assert_eq!(OutputMode::from_u8(2), OutputMode::Verbose);
    assert_eq!(OutputMode::from_u8(9), OutputMode::Normal);
  }
}
