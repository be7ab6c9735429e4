//! # CLI Module
//!
//! This module contains the command-line interface implementation.
//! It uses clap for argument parsing; [`run`] drives one pass over the
//! tracked files of the repository.

mod run;

use std::path::PathBuf;

use clap::Parser;
use clap::builder::styling::{AnsiColor, Color, Style, Styles};
pub use run::run;

use crate::logging::ColorMode;

/// Environment variable naming the output root when `--output-root` is absent.
pub const OUTPUT_ROOT_ENV_VAR: &str = "HEADSTAMP_OUTPUT_ROOT";

const CUSTOM_STYLES: Styles = Styles::styled()
  .header(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))).bold())
  .usage(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))).bold())
  .literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Blue))).bold())
  .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
  .error(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red))).bold())
  .valid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))))
  .invalid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow))));

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")");

/// Top-level CLI arguments
#[derive(Parser, Debug)]
#[command(
  author,
  version,
  long_version = LONG_VERSION,
  about,
  styles = CUSTOM_STYLES,
  after_help = "Examples:
  # Expand header tokens in every tracked file of the current repository
  headstamp

  # Only touch files below src/ and Python files anywhere
  headstamp src \"*.py\"

  # Show what would change without writing anything
  headstamp --dry-run --show-diff

  # Write the results into a mirror of the repository
  headstamp --output-root /tmp/stamped

  # Leave generated files alone
  headstamp --exclude \"gen/*\" --exclude \"*.pb.go\"
",
  help_template = "{before-help}{name} v{version}
{about-section}
{usage-heading} {usage}

{all-args}{after-help}
"
)]
pub struct Cli {
  /// Path prefixes or glob patterns, relative to the current directory, that
  /// restrict which tracked files are processed (default: all)
  #[arg(value_name = "PATHS")]
  pub paths: Vec<String>,

  /// Path to config file (default: .headstamp.yml, .headstamp.yaml or
  /// .headstamp.toml in the repository root)
  #[arg(long, value_name = "FILE")]
  pub config: Option<PathBuf>,

  /// Ignore config file even if present
  #[arg(long, conflicts_with = "config")]
  pub no_config: bool,

  /// Write results below this directory instead of in place (also read from
  /// HEADSTAMP_OUTPUT_ROOT)
  #[arg(long, value_name = "DIR")]
  pub output_root: Option<PathBuf>,

  /// Report the files that would change without writing anything
  #[arg(long)]
  pub dry_run: bool,

  /// Show diff of changes in dry run mode
  #[arg(long, requires = "dry_run")]
  pub show_diff: bool,

  /// Save diff of changes to a file in dry run mode
  #[arg(long, value_name = "FILE", requires = "dry_run")]
  pub save_diff: Option<PathBuf>,

  /// Tracked files to leave alone (repeatable, glob patterns relative to the
  /// repository root)
  #[arg(long, short = 'e', value_name = "GLOB")]
  pub exclude: Vec<String>,

  /// Increase verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Suppress all output except errors
  #[arg(short, long, conflicts_with = "verbose")]
  pub quiet: bool,

  /// Control when to use colored output (auto, never, always)
  #[arg(
    long,
    value_name = "WHEN",
    num_args = 0..=1,
    default_value_t = ColorMode::Auto,
    default_missing_value = "always",
    value_enum
  )]
  pub colors: ColorMode,
}

impl Cli {
  /// Parse CLI arguments and return the Cli struct
  pub fn parse_args() -> Self {
    Self::parse()
  }

  /// The output root from the flag, falling back to the environment.
  pub fn output_root(&self) -> Option<PathBuf> {
    self.output_root.clone().or_else(|| {
      std::env::var_os(OUTPUT_ROOT_ENV_VAR)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
    })
  }
}

#[cfg(test)]
mod tests {
  use clap::CommandFactory;

  use super::*;

  #[test]
  fn test_cli_definition_is_valid() {
    Cli::command().debug_assert();
  }

  #[test]
  fn test_parse_full_command_line() {
    let cli = Cli::try_parse_from([
      "headstamp",
      "src",
      "*.py",
      "--dry-run",
      "--show-diff",
      "--exclude",
      "gen/*",
      "-e",
      "*.bak",
      "-vv",
      "--colors",
      "never",
    ])
    .expect("parse");

    assert_eq!(cli.paths, vec!["src", "*.py"]);
    assert!(cli.dry_run);
    assert!(cli.show_diff);
    assert_eq!(cli.exclude, vec!["gen/*", "*.bak"]);
    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.colors, ColorMode::Never);
  }

  #[test]
  fn test_show_diff_requires_dry_run() {
    assert!(Cli::try_parse_from(["headstamp", "--show-diff"]).is_err());
  }

  #[test]
  fn test_quiet_conflicts_with_verbose() {
    assert!(Cli::try_parse_from(["headstamp", "-q", "-v"]).is_err());
  }

  #[test]
  fn test_explicit_output_root_wins() {
    let cli = Cli::try_parse_from(["headstamp", "--output-root", "/tmp/out"]).expect("parse");
    assert_eq!(cli.output_root(), Some(PathBuf::from("/tmp/out")));
  }
}
