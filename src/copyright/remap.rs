//! # Owner Remapping
//!
//! Maps raw commit identities onto copyright owners using the `owner_remap`
//! rules from the configuration file.

use regex::Regex;

/// A single `owner_remap` entry with its pattern compiled for full matching.
#[derive(Debug, Clone)]
pub struct RemapRule {
  pattern: Regex,
  name: String,
}

impl RemapRule {
  /// Compiles `pattern` so that it only matches the complete email address.
  pub fn new(pattern: &str, name: impl Into<String>) -> Result<Self, regex::Error> {
    let pattern = Regex::new(&format!("^(?:{pattern})$"))?;
    Ok(Self {
      pattern,
      name: name.into(),
    })
  }

  pub fn is_match(&self, email: &str) -> bool {
    self.pattern.is_match(email)
  }
}

/// Resolves `(email, name)` pairs to `(identity_key, display_name)`.
#[derive(Debug, Clone, Default)]
pub struct OwnerRemapper {
  rules: Vec<RemapRule>,
}

impl OwnerRemapper {
  pub const fn new(rules: Vec<RemapRule>) -> Self {
    Self { rules }
  }

  pub fn rules(&self) -> &[RemapRule] {
    &self.rules
  }

  /// Returns the grouping key and display name for a commit author.
  ///
  /// The first rule whose pattern matches the whole email wins, and both the
  /// key and the display name become the rule's name, so every matching email
  /// merges into one owner. Without a match the email is the key and the
  /// author name is displayed: one email under several names is still one
  /// owner, while distinct emails stay distinct.
  pub fn remap(&self, email: &str, name: &str) -> (String, String) {
    match self.rules.iter().find(|rule| rule.is_match(email)) {
      Some(rule) => (rule.name.clone(), rule.name.clone()),
      None => (email.to_string(), name.to_string()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn remapper(rules: &[(&str, &str)]) -> OwnerRemapper {
    OwnerRemapper::new(
      rules
        .iter()
        .map(|(pattern, name)| RemapRule::new(pattern, *name).expect("valid pattern"))
        .collect(),
    )
  }

  #[test]
  fn test_matching_rule_collapses_key_and_name() {
    let remapper = remapper(&[(r".*@a\.com", "Org A")]);
    assert_eq!(
      remapper.remap("alice@a.com", "Alice"),
      ("Org A".to_string(), "Org A".to_string())
    );
  }

  #[test]
  fn test_unmatched_email_is_the_key() {
    let remapper = remapper(&[(r".*@a\.com", "Org A")]);
    assert_eq!(
      remapper.remap("carol@c.com", "Carol"),
      ("carol@c.com".to_string(), "Carol".to_string())
    );
  }

  #[test]
  fn test_pattern_must_match_entire_email() {
    let remapper = remapper(&[("a.com", "Org A")]);
    assert_eq!(remapper.remap("alice@a.com", "Alice").0, "alice@a.com");
    assert_eq!(remapper.remap("a.com", "Host").0, "Org A");
  }

  #[test]
  fn test_alternation_is_anchored_as_a_whole() {
    let remapper = remapper(&[("x@a.com|y@a.com", "Pair")]);
    assert_eq!(remapper.remap("x@a.com", "X").0, "Pair");
    assert_eq!(remapper.remap("y@a.com", "Y").0, "Pair");
    assert_eq!(remapper.remap("x@a.com.evil", "X").0, "x@a.com.evil");
  }

  #[test]
  fn test_first_matching_rule_wins() {
    let remapper = remapper(&[(r"bob@.*", "Bob Personal"), (r".*@b\.com", "Org B")]);
    assert_eq!(remapper.remap("bob@b.com", "Bob").1, "Bob Personal");
    assert_eq!(remapper.remap("eve@b.com", "Eve").1, "Org B");
  }

  #[test]
  fn test_invalid_pattern_is_rejected() {
    assert!(RemapRule::new("(unclosed", "Nobody").is_err());
  }
}
