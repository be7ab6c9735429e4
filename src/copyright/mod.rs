//! # Copyright Module
//!
//! Building blocks for the generated copyright block:
//! - [`years`] - year range compression
//! - [`remap`] - owner identity remapping
//! - [`ledger`] - per-owner year accumulation and rendering

pub mod ledger;
pub mod remap;
pub mod years;

pub use ledger::{CopyrightOwner, OwnerLedger};
pub use remap::{OwnerRemapper, RemapRule};
pub use years::{compress_years, expand_ranges};

/// Marker inside a header template that expands to the copyright lines.
pub const COPYRIGHTS_MARKER: &str = "<copyrights>";
