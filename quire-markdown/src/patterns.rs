//! Regular expressions for in-code control markers.
//!
//! A marker is a `[!code X]` token wrapped in a comment of one of six styles:
//! `// [!code X]`, `# [!code X]`, `/* [!code X] */`, `-- [!code X]`,
//! `<!-- [!code X] -->` and `; [!code X]`. Every marker family accepts every
//! wrapper.

use std::sync::LazyLock;

use regex::Regex;

use crate::utils::compile_regex;

/// The kind of control marker found on a code line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
  DiffAdd,
  DiffRemove,
  Focus,
  Error,
  Warning,
}

/// Comment wrappers around a marker token, as `(prefix, suffix)` regex parts.
const WRAPPERS: [(&str, &str); 6] = [
  (r"<!--\s*", r"\s*-->"),
  (r"/\*\s*", r"\s*\*/"),
  (r"//\s*", ""),
  (r"#\s*", ""),
  (r"--\s*", ""),
  (r";\s*", ""),
];

/// Build a regex matching `token` inside any comment wrapper, including the
/// whitespace that separates the marker from preceding code.
fn marker_regex(token: &str) -> Regex {
  let alternatives = WRAPPERS
    .iter()
    .map(|(prefix, suffix)| format!("{prefix}{token}{suffix}"))
    .collect::<Vec<_>>()
    .join("|");
  compile_regex(&format!(r"[ \t]*(?:{alternatives})"))
}

static DIFF_RE: LazyLock<Regex> =
  LazyLock::new(|| marker_regex(r"\[!code\s+(\+\+|--)\s*\]"));
static FOCUS_RE: LazyLock<Regex> =
  LazyLock::new(|| marker_regex(r"\[!code\s+focus\s*\]"));
static ERROR_RE: LazyLock<Regex> =
  LazyLock::new(|| marker_regex(r"\[!code\s+error\s*\]"));
static WARNING_RE: LazyLock<Regex> =
  LazyLock::new(|| marker_regex(r"\[!code\s+warning\s*\]"));

/// Diff markers (`++` and `--`).
#[must_use]
pub fn diff_marker() -> &'static Regex {
  &DIFF_RE
}

/// Focus markers.
#[must_use]
pub fn focus_marker() -> &'static Regex {
  &FOCUS_RE
}

/// Error markers.
#[must_use]
pub fn error_marker() -> &'static Regex {
  &ERROR_RE
}

/// Warning markers.
#[must_use]
pub fn warning_marker() -> &'static Regex {
  &WARNING_RE
}

/// A marker located on a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerMatch {
  pub kind:  MarkerKind,
  /// Byte offset where the match starts, including leading whitespace.
  pub start: usize,
  pub end:   usize,
}

/// Find every marker on `line`, ordered left to right.
#[must_use]
pub fn find_markers(line: &str) -> Vec<MarkerMatch> {
  let mut found = Vec::new();

  for caps in DIFF_RE.captures_iter(line) {
    let Some(whole) = caps.get(0) else { continue };
    // Exactly one of the per-wrapper groups captured the sign.
    let plus = caps
      .iter()
      .skip(1)
      .flatten()
      .any(|group| group.as_str() == "++");
    found.push(MarkerMatch {
      kind:  if plus {
        MarkerKind::DiffAdd
      } else {
        MarkerKind::DiffRemove
      },
      start: whole.start(),
      end:   whole.end(),
    });
  }

  for (re, kind) in [
    (&*FOCUS_RE, MarkerKind::Focus),
    (&*ERROR_RE, MarkerKind::Error),
    (&*WARNING_RE, MarkerKind::Warning),
  ] {
    found.extend(re.find_iter(line).map(|m| {
      MarkerMatch {
        kind,
        start: m.start(),
        end: m.end(),
      }
    }));
  }

  found.sort_by_key(|m| m.start);
  found
}

#[cfg(test)]
mod tests {
  use super::*;

  const WRAPPED: [(&str, &str); 6] = [
    ("// ", ""),
    ("# ", ""),
    ("/* ", " */"),
    ("-- ", ""),
    ("<!-- ", " -->"),
    ("; ", ""),
  ];

  fn wrap(prefix: &str, token: &str, suffix: &str) -> String {
    format!("code {prefix}[!code {token}]{suffix}")
  }

  #[test]
  fn test_every_family_accepts_every_wrapper() {
    let cases = [
      ("++", MarkerKind::DiffAdd),
      ("--", MarkerKind::DiffRemove),
      ("focus", MarkerKind::Focus),
      ("error", MarkerKind::Error),
      ("warning", MarkerKind::Warning),
    ];

    for (token, kind) in cases {
      for (prefix, suffix) in WRAPPED {
        let line = wrap(prefix, token, suffix);
        let markers = find_markers(&line);
        assert_eq!(markers.len(), 1, "no single marker in {line:?}");
        assert_eq!(markers[0].kind, kind, "wrong kind for {line:?}");
        assert_eq!(&line[..markers[0].start], "code", "bad span for {line:?}");
        assert_eq!(markers[0].end, line.len(), "bad end for {line:?}");
      }
    }
  }

  #[test]
  fn test_single_sign_diff_never_matches() {
    for (prefix, suffix) in WRAPPED {
      assert!(find_markers(&wrap(prefix, "+", suffix)).is_empty());
      assert!(find_markers(&wrap(prefix, "-", suffix)).is_empty());
      assert!(find_markers(&wrap(prefix, "+++", suffix)).is_empty());
    }
  }

  #[test]
  fn test_flexible_interior_whitespace() {
    assert!(focus_marker().is_match("x //   [!code    focus ]"));
    assert!(diff_marker().is_match("x #[!code ++]"));
    assert!(!focus_marker().is_match("x // [code focus]"));
  }

  #[test]
  fn test_multiple_markers_left_to_right() {
    let markers = find_markers("x // [!code ++] // [!code focus]");
    let kinds: Vec<_> = markers.iter().map(|m| m.kind).collect();
    assert_eq!(kinds, vec![MarkerKind::DiffAdd, MarkerKind::Focus]);
  }
}
