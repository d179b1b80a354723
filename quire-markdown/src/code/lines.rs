//! Splitting highlighted HTML into lines and decorating each line.

use std::collections::{BTreeMap, BTreeSet};

use super::features::{CodeBlockFeatures, DiffKind};

/// An open element tracked while splitting.
struct OpenTag<'a> {
  name: &'a str,
  /// The full opening tag, re-emitted at the start of the next line.
  raw:  &'a str,
}

const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "wbr"];

fn tag_name(tag: &str) -> &str {
  let inner = tag.trim_start_matches('<').trim_start_matches('/');
  let end = inner
    .find(|c: char| c.is_ascii_whitespace() || c == '>' || c == '/')
    .unwrap_or(inner.len());
  &inner[..end]
}

/// Split highlighter output into one well-formed HTML fragment per source
/// line.
///
/// Elements open across a newline are closed at the end of the line,
/// innermost first, and reopened with their original attributes at the start
/// of the next one, outermost first. A trailing newline does not produce an
/// extra empty line.
#[must_use]
pub fn parse_lines(html: &str) -> Vec<String> {
  let mut lines = Vec::new();
  let mut stack: Vec<OpenTag<'_>> = Vec::new();
  let mut current = String::new();
  let mut has_text = false;
  let mut saw_newline = false;
  let mut pos = 0;

  while pos < html.len() {
    let rest = &html[pos..];

    if rest.starts_with('<') {
      let Some(close) = rest.find('>') else {
        // Stray '<': treat the remainder as text.
        current.push_str(rest);
        has_text = true;
        break;
      };
      let tag = &rest[..=close];
      let name = tag_name(tag);

      if tag.starts_with("</") {
        if let Some(idx) = stack.iter().rposition(|open| open.name.eq_ignore_ascii_case(name)) {
          stack.truncate(idx);
        }
      } else if !tag.starts_with("<!")
        && !tag.ends_with("/>")
        && !VOID_ELEMENTS.contains(&name.to_ascii_lowercase().as_str())
      {
        stack.push(OpenTag { name, raw: tag });
      }

      current.push_str(tag);
      pos += tag.len();
      continue;
    }

    let text_end = rest.find(['<', '\n']).unwrap_or(rest.len());
    if text_end > 0 {
      current.push_str(&rest[..text_end]);
      has_text = true;
      pos += text_end;
      continue;
    }

    // Newline: close innermost-first, reopen outermost-first.
    for open in stack.iter().rev() {
      current.push_str("</");
      current.push_str(open.name);
      current.push('>');
    }
    lines.push(std::mem::take(&mut current));
    for open in &stack {
      current.push_str(open.raw);
    }
    has_text = false;
    saw_newline = true;
    pos += 1;
  }

  if has_text || (!saw_newline && !current.is_empty()) {
    lines.push(current);
  }

  lines
}

/// Per-line state applied by [`wrap_lines`].
///
/// `highlighted` holds display line numbers (counted from `start_line`); the
/// other sets hold source line numbers (counted from 1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDecorations {
  pub highlighted:  BTreeSet<usize>,
  pub diff:         BTreeMap<usize, DiffKind>,
  pub focus:        BTreeSet<usize>,
  pub error:        BTreeSet<usize>,
  pub warning:      BTreeSet<usize>,
  pub start_line:   usize,
  pub line_numbers: bool,
}

impl Default for LineDecorations {
  fn default() -> Self {
    Self {
      highlighted:  BTreeSet::new(),
      diff:         BTreeMap::new(),
      focus:        BTreeSet::new(),
      error:        BTreeSet::new(),
      warning:      BTreeSet::new(),
      start_line:   1,
      line_numbers: false,
    }
  }
}

impl LineDecorations {
  /// Decorations for a block, with the site-wide line-number default.
  #[must_use]
  pub fn from_features(features: &CodeBlockFeatures, line_numbers_default: bool) -> Self {
    Self {
      highlighted:  features.highlighted_lines.iter().copied().collect(),
      diff:         features.diff_lines.clone(),
      focus:        features.focus_lines.clone(),
      error:        features.error_lines.clone(),
      warning:      features.warning_lines.clone(),
      start_line:   features.start_line(),
      line_numbers: features.shows_line_numbers(line_numbers_default),
    }
  }

  fn classes(&self, source_line: usize) -> String {
    let display_line = self.start_line.saturating_add(source_line - 1);
    let mut classes = String::from("line");

    if self.highlighted.contains(&display_line) {
      classes.push_str(" highlighted");
    }
    match self.diff.get(&source_line) {
      Some(DiffKind::Addition) => classes.push_str(" diff add"),
      Some(DiffKind::Deletion) => classes.push_str(" diff remove"),
      None => {},
    }
    if self.focus.contains(&source_line) {
      classes.push_str(" focus");
    }
    if self.error.contains(&source_line) {
      classes.push_str(" error");
    }
    if self.warning.contains(&source_line) {
      classes.push_str(" warning");
    }

    classes
  }
}

/// Wrap every line of highlighted `html` in `<span class="line ...">`.
#[must_use]
pub fn wrap_lines(html: &str, decorations: &LineDecorations) -> String {
  let lines = parse_lines(html);
  let mut out = String::with_capacity(html.len() + lines.len() * 32);

  for (index, line) in lines.iter().enumerate() {
    let source_line = index + 1;
    if index > 0 {
      out.push('\n');
    }
    out.push_str("<span class=\"");
    out.push_str(&decorations.classes(source_line));
    out.push_str("\">");
    if decorations.line_numbers {
      out.push_str("<span class=\"line-number\">");
      out.push_str(&decorations.start_line.saturating_add(index).to_string());
      out.push_str("</span>");
    }
    out.push_str(line);
    out.push_str("</span>");
  }

  out
}
