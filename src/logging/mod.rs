//! # Logging Module
//!
//! This module provides logging utilities for the headstamp tool, including:
//! - Verbose logging that can be enabled/disabled
//! - Standard info logging with color support
//! - The `tracing` subscriber used for structured diagnostics
//!
//! Verbose logs and tracing events go to stderr and info logs go to stdout
//! for better pipeline integration.
//!
//! ## Example
//!
//! ```rust
//! use headstamp::logging::{ColorMode, set_verbose};
//! use headstamp::{info_log, verbose_log};
//!
//! set_verbose();
//! ColorMode::Never.apply();
//!
//! verbose_log!("Processing file: {}", "example.rs");
//! info_log!("Rewrote: {}", "example.rs");
//! ```

mod modes;

pub use modes::{ColorMode, init_tracing, is_quiet, is_verbose, set_quiet, set_verbose};
use owo_colors::{OwoColorize, Stream};

/// Logs a message to stderr if verbose mode is enabled.
#[macro_export]
macro_rules! verbose_log {
    ($($arg:tt)*) => {
        if $crate::logging::is_verbose() {
            eprintln!($($arg)*);
        }
    };
}

/// Logs a message to stdout unless quiet mode is enabled.
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        if !$crate::logging::is_quiet() {
            $crate::logging::print_info_log(&format!($($arg)*));
        }
    };
}

/// Prints an info message in yellow when stdout supports colors.
pub fn print_info_log(message: &str) {
  println!("{}", message.if_supports_color(Stream::Stdout, |m| m.yellow()));
}
