//! # headstamp
//!
//! A tool that expands configured header tokens in the git-tracked files of a
//! repository.
//!
//! Each header maps a token such as `@license@` to a block of template text.
//! Wherever a token appears on a line, the line is replaced by the template,
//! with whatever surrounded the token (a comment leader, say) repeated on every
//! template line. A template line containing the `<copyrights>` marker is in
//! turn expanded into one `Copyright © <years> <owner>` line per contributor,
//! derived from the file's git history and an optional email-to-owner remap.
//!
//! ## Features
//!
//! * Byte-exact rewriting: line endings, a missing final newline and non-UTF-8
//!   content survive untouched
//! * Per-commit (`log`) or per-line (`blame`) attribution of copyright years
//! * Regex-based remapping of author emails to organisations
//! * Atomic replacement of each file, preserving its permissions
//! * Dry runs with unified diffs, and a separate output root for mirroring
//!
//! ## Usage as a Library
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use headstamp::config::Config;
//! use headstamp::git::open_history;
//! use headstamp::history::HistoryAggregator;
//! use headstamp::rewriter::{FileRewriter, rules_from_headers};
//!
//! fn main() -> anyhow::Result<()> {
//!     let root = Path::new(".");
//!     let config = Config::load(&root.join(".headstamp.yml"))?;
//!
//!     let history = open_history(root, config.history)?;
//!     let aggregator = HistoryAggregator::new(history, config.remapper());
//!     let mut rewriter = FileRewriter::new(rules_from_headers(&config.headers), aggregator);
//!
//!     let outcome = rewriter.process(Path::new("src/main.c"))?;
//!     println!("{outcome:?}");
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! * [`rewriter`] - Token expansion and atomic file replacement
//! * [`history`] - Turning file history into copyright lines
//! * [`copyright`] - Year ranges, owner remapping and the owner ledger
//! * [`config`] - Loading `.headstamp.yml` / `.headstamp.toml`
//! * [`git`] - Repository discovery, tracked files and history sources
//!
//! [`rewriter`]: crate::rewriter
//! [`history`]: crate::history
//! [`copyright`]: crate::copyright
//! [`config`]: crate::config
//! [`git`]: crate::git

pub mod cli;
pub mod config;
pub mod copyright;
pub mod diff;
pub mod file_filter;
pub mod git;
pub mod history;
pub mod logging;
pub mod output;
pub mod rewriter;
pub mod workspace;
