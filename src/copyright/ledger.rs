//! # Owner Ledger
//!
//! Accumulates the years each copyright owner contributed to a file and renders
//! the resulting `Copyright © ...` lines.

use std::collections::{BTreeMap, BTreeSet};

use super::years::compress_years;

/// One copyright owner and the years they contributed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyrightOwner {
  pub identity_key: String,
  pub display_name: String,
  pub years: BTreeSet<i32>,
}

impl CopyrightOwner {
  fn new(identity_key: &str, display_name: &str, year: i32) -> Self {
    Self {
      identity_key: identity_key.to_string(),
      display_name: display_name.to_string(),
      years: BTreeSet::from([year]),
    }
  }

  /// Earliest contribution year, `i32::MAX` if no year was recorded.
  pub fn first_year(&self) -> i32 {
    self.years.first().copied().unwrap_or(i32::MAX)
  }

  /// Renders the owner as a single copyright line.
  pub fn render(&self) -> String {
    format!(
      "Copyright © {} {}",
      compress_years(self.years.iter().copied()),
      self.display_name
    )
  }
}

/// Sort key for rendering order.
fn render_order(owner: &CopyrightOwner) -> (i32, &str) {
  (owner.first_year(), owner.identity_key.as_str())
}

/// Per-file collection of copyright owners keyed by identity.
#[derive(Debug, Default)]
pub struct OwnerLedger {
  owners: BTreeMap<String, CopyrightOwner>,
}

impl OwnerLedger {
  pub fn new() -> Self {
    Self::default()
  }

  /// Records a contribution, creating the owner on first sight.
  ///
  /// The display name of an existing owner is kept as first recorded.
  pub fn add_contribution(&mut self, identity_key: &str, display_name: &str, year: i32) {
    match self.owners.get_mut(identity_key) {
      Some(owner) => {
        owner.years.insert(year);
      }
      None => {
        self
          .owners
          .insert(identity_key.to_string(), CopyrightOwner::new(identity_key, display_name, year));
      }
    }
  }

  pub fn len(&self) -> usize {
    self.owners.len()
  }

  pub fn is_empty(&self) -> bool {
    self.owners.is_empty()
  }

  pub fn get(&self, identity_key: &str) -> Option<&CopyrightOwner> {
    self.owners.get(identity_key)
  }

  /// Renders one line per owner, earliest first year first.
  ///
  /// Owners sharing a first year are ordered by identity key.
  pub fn render(&self) -> Vec<String> {
    let mut owners: Vec<&CopyrightOwner> = self.owners.values().collect();
    owners.sort_by(|a, b| render_order(a).cmp(&render_order(b)));
    owners.into_iter().map(CopyrightOwner::render).collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_ledger_renders_nothing() {
    let ledger = OwnerLedger::new();
    assert!(ledger.is_empty());
    assert!(ledger.render().is_empty());
  }

  #[test]
  fn test_contributions_merge_by_identity() {
    let mut ledger = OwnerLedger::new();
    ledger.add_contribution("dev@example.com", "Dev", 2020);
    ledger.add_contribution("dev@example.com", "Developer", 2021);
    ledger.add_contribution("dev@example.com", "Dev", 2020);

    assert_eq!(ledger.len(), 1);
    let owner = ledger.get("dev@example.com").expect("owner exists");
    assert_eq!(owner.display_name, "Dev");
    assert_eq!(owner.years, BTreeSet::from([2020, 2021]));
    assert_eq!(ledger.render(), vec!["Copyright © 2020-2021 Dev".to_string()]);
  }

  #[test]
  fn test_render_sorted_by_first_year() {
    let mut ledger = OwnerLedger::new();
    ledger.add_contribution("late@example.com", "Late", 2022);
    ledger.add_contribution("early@example.com", "Early", 2018);
    ledger.add_contribution("late@example.com", "Late", 2015);
    ledger.add_contribution("early@example.com", "Early", 2023);

    assert_eq!(
      ledger.render(),
      vec![
        "Copyright © 2015, 2022 Late".to_string(),
        "Copyright © 2018, 2023 Early".to_string(),
      ]
    );
  }

  #[test]
  fn test_ties_are_ordered_by_identity_key() {
    let mut ledger = OwnerLedger::new();
    ledger.add_contribution("Org B", "Org B", 2020);
    ledger.add_contribution("Org A", "Org A", 2020);

    assert_eq!(
      ledger.render(),
      vec!["Copyright © 2020 Org A".to_string(), "Copyright © 2020 Org B".to_string()]
    );
  }

  #[test]
  fn test_first_year_sentinel() {
    let owner = CopyrightOwner {
      identity_key: "k".to_string(),
      display_name: "K".to_string(),
      years: BTreeSet::new(),
    };
    assert_eq!(owner.first_year(), i32::MAX);
  }
}
