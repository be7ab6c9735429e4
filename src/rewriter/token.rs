//! # Token Rules
//!
//! Byte-level token matching and the prologue/epilogue preserving line
//! substitution shared by header tokens and the nested copyrights marker.

/// Returns the offset of the first occurrence of `needle` in `haystack`.
pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
  if needle.is_empty() || needle.len() > haystack.len() {
    return None;
  }
  haystack.windows(needle.len()).position(|window| window == needle)
}

/// Splits content into lines, each keeping its `\n` (and any `\r` before it).
///
/// A final line without a newline is returned as is; empty content has no
/// lines.
pub fn split_lines(content: &[u8]) -> Vec<&[u8]> {
  content.split_inclusive(|&byte| byte == b'\n').collect()
}

/// A token and the lines it expands to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRule {
  token: Vec<u8>,
  replacement_lines: Vec<Vec<u8>>,
}

impl TokenRule {
  pub fn new(token: impl Into<Vec<u8>>, replacement_lines: Vec<Vec<u8>>) -> Self {
    Self {
      token: token.into(),
      replacement_lines,
    }
  }

  /// Builds a rule from template text; one replacement line per template line.
  ///
  /// Line terminators of the template are dropped, the terminator of the line
  /// being substituted is used instead.
  pub fn from_template(token: &str, template: &str) -> Self {
    let replacement_lines = template.lines().map(|line| line.as_bytes().to_vec()).collect();
    Self::new(token.as_bytes(), replacement_lines)
  }

  pub fn token(&self) -> &[u8] {
    &self.token
  }

  pub fn replacement_lines(&self) -> &[Vec<u8>] {
    &self.replacement_lines
  }

  pub fn matches(&self, line: &[u8]) -> bool {
    find(line, &self.token).is_some()
  }

  /// Expands the first occurrence of the token in `line`.
  ///
  /// Each replacement line is wrapped in the text before the token (prologue)
  /// and after it (epilogue, including the line terminator). No replacement
  /// lines means no output lines. A line without a match is returned as is.
  ///
  /// An unterminated `line` gives unterminated output lines; see
  /// [`join_block`] for putting them back together.
  pub fn substitute(&self, line: &[u8]) -> Vec<Vec<u8>> {
    let Some(start) = find(line, &self.token) else {
      return vec![line.to_vec()];
    };
    let prologue = &line[..start];
    let epilogue = &line[start + self.token.len()..];

    self
      .replacement_lines
      .iter()
      .map(|replacement| {
        let mut expanded = Vec::with_capacity(prologue.len() + replacement.len() + epilogue.len());
        expanded.extend_from_slice(prologue);
        expanded.extend_from_slice(replacement);
        expanded.extend_from_slice(epilogue);
        expanded
      })
      .collect()
  }
}

/// Appends the lines a source line expanded into to `output`.
///
/// Expansions of an unterminated source line are unterminated themselves, so
/// they are separated with `\n` and the last one is left without a
/// terminator, as the source line was.
pub fn join_block(output: &mut Vec<u8>, block: &[Vec<u8>]) {
  for (index, line) in block.iter().enumerate() {
    output.extend_from_slice(line);
    if index + 1 < block.len() && !line.ends_with(b"\n") {
      output.push(b'\n');
    }
  }
}

/// Builds one rule per configured header, keeping declaration order.
pub fn rules_from_headers(headers: &[(String, String)]) -> Vec<TokenRule> {
  headers
    .iter()
    .map(|(token, template)| TokenRule::from_template(token, template))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn lines(values: &[&str]) -> Vec<Vec<u8>> {
    values.iter().map(|value| value.as_bytes().to_vec()).collect()
  }

  #[test]
  fn test_find() {
    assert_eq!(find(b"abc@hdr@", b"@hdr@"), Some(3));
    assert_eq!(find(b"@hdr@ @hdr@", b"@hdr@"), Some(0));
    assert_eq!(find(b"abc", b"abcd"), None);
    assert_eq!(find(b"abc", b""), None);
  }

  #[test]
  fn test_split_lines_keeps_terminators() {
    assert_eq!(
      split_lines(b"one\r\ntwo\nthree"),
      vec![&b"one\r\n"[..], &b"two\n"[..], &b"three"[..]]
    );
    assert!(split_lines(b"").is_empty());
    assert_eq!(split_lines(b"\n\n"), vec![&b"\n"[..], &b"\n"[..]]);
  }

  #[test]
  fn test_matches_is_byte_containment() {
    let rule = TokenRule::from_template("@hdr@", "x");
    assert!(rule.matches(b"  # @hdr@ trailing\n"));
    assert!(!rule.matches(b"  # @hdr\n"));
    assert!(rule.matches(&[0xff, b'@', b'h', b'd', b'r', b'@']));
  }

  #[test]
  fn test_multi_line_expansion_preserves_decoration() {
    let rule = TokenRule::new("@hdr@", lines(&["first", "second"]));
    assert_eq!(rule.substitute(b"   # @hdr@"), lines(&["   # first", "   # second"]));
    assert_eq!(rule.substitute(b"   # @hdr@\n"), lines(&["   # first\n", "   # second\n"]));
  }

  #[test]
  fn test_epilogue_repeats_on_every_line() {
    let rule = TokenRule::new("<copyrights>", lines(&["A", "B"]));
    assert_eq!(
      rule.substitute(b" * <copyrights> *\r\n"),
      lines(&[" * A *\r\n", " * B *\r\n"])
    );
  }

  #[test]
  fn test_only_first_occurrence_is_replaced() {
    let rule = TokenRule::new("@t@", lines(&["X"]));
    assert_eq!(rule.substitute(b"@t@ and @t@\n"), lines(&["X and @t@\n"]));
  }

  #[test]
  fn test_zero_replacement_lines_delete_the_line() {
    let rule = TokenRule::new("@gone@", Vec::new());
    assert!(rule.substitute(b"// @gone@\n").is_empty());
  }

  #[test]
  fn test_unmatched_line_is_returned_unchanged() {
    let rule = TokenRule::new("@t@", lines(&["X"]));
    assert_eq!(rule.substitute(b"plain\n"), lines(&["plain\n"]));
  }

  #[test]
  fn test_from_template_splits_lines() {
    let rule = TokenRule::from_template("@t@", "one\r\ntwo\n<copyrights>\n");
    assert_eq!(rule.replacement_lines(), lines(&["one", "two", "<copyrights>"]).as_slice());
    assert_eq!(TokenRule::from_template("@t@", "").replacement_lines().len(), 0);
  }

  #[test]
  fn test_join_block_leaves_last_line_unterminated() {
    let mut output = b"x\n".to_vec();
    join_block(&mut output, &lines(&["// one", "// two"]));
    assert_eq!(output, b"x\n// one\n// two");

    let mut output = Vec::new();
    join_block(&mut output, &lines(&["a\r\n", "b\r\n"]));
    assert_eq!(output, b"a\r\nb\r\n");

    let mut output = Vec::new();
    join_block(&mut output, &[]);
    assert!(output.is_empty());
  }

  #[test]
  fn test_rules_keep_header_order() {
    let headers = vec![
      ("@b@".to_string(), "b".to_string()),
      ("@a@".to_string(), "a".to_string()),
    ];
    let rules = rules_from_headers(&headers);
    assert_eq!(rules[0].token(), b"@b@");
    assert_eq!(rules[1].token(), b"@a@");
  }
}
