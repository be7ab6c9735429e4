//! # headstamp
//!
//! Expands configured header tokens in the tracked files of a git repository.

use anyhow::Result;
use headstamp::cli::{Cli, run};

fn main() -> Result<()> {
  let cli = Cli::parse_args();
  run(cli)
}
