//! # Year Ranges
//!
//! Compresses a set of contribution years into the compact form used in
//! copyright lines, e.g. `{2019, 2020, 2021, 2023}` becomes `"2019-2021, 2023"`.

use std::collections::BTreeSet;

use thiserror::Error;

/// Error returned when a range string cannot be parsed back into years.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid year range '{0}'")]
pub struct InvalidRange(pub String);

/// Compresses years into ascending, comma separated ranges.
///
/// Every maximal run of consecutive years collapses to `start-end`; a run of a
/// single year renders as just that year. Input order and duplicates do not
/// matter. An empty input yields an empty string.
pub fn compress_years<I>(years: I) -> String
where
  I: IntoIterator<Item = i32>,
{
  let sorted: BTreeSet<i32> = years.into_iter().collect();

  let mut runs: Vec<(i32, i32)> = Vec::new();
  for year in sorted {
    match runs.last_mut() {
      Some((_, end)) if *end + 1 == year => *end = year,
      _ => runs.push((year, year)),
    }
  }

  runs
    .into_iter()
    .map(|(start, end)| {
      if start == end {
        start.to_string()
      } else {
        format!("{start}-{end}")
      }
    })
    .collect::<Vec<_>>()
    .join(", ")
}

/// Expands a string produced by [`compress_years`] back into the set of years.
pub fn expand_ranges(ranges: &str) -> Result<BTreeSet<i32>, InvalidRange> {
  let mut years = BTreeSet::new();
  if ranges.trim().is_empty() {
    return Ok(years);
  }

  for part in ranges.split(", ") {
    let invalid = || InvalidRange(part.to_string());
    match part.split_once('-') {
      Some((start, end)) => {
        let start: i32 = start.parse().map_err(|_| invalid())?;
        let end: i32 = end.parse().map_err(|_| invalid())?;
        if end < start {
          return Err(invalid());
        }
        years.extend(start..=end);
      }
      None => {
        years.insert(part.parse().map_err(|_| invalid())?);
      }
    }
  }

  Ok(years)
}
