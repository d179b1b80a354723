//! Per-block code features: info-string parsing and marker extraction.
//!
//! Features are extracted from raw Markdown before conversion. Each fence
//! opener is rewritten to carry a `quire-block=N` tag so that the converter can
//! look the features up by id after comrak has parsed the document, no matter
//! how deeply the fence ends up nested.

use std::{
  collections::{BTreeMap, BTreeSet},
  sync::LazyLock,
};

use regex::Regex;

use crate::{
  patterns::{MarkerKind, find_markers},
  utils::{codeblock::fences, compile_regex},
};

/// Info-string attribute carrying the block id.
pub const BLOCK_TAG: &str = "quire-block=";

/// Upper bound on the number of lines a single `a-b` highlight range expands
/// to.
const MAX_HIGHLIGHT_SPAN: usize = 10_000;

/// Line numbering directive from the info string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineNumbers {
  /// `:line-numbers`
  On,
  /// `:line-numbers=N`
  StartAt(usize),
  /// `:no-line-numbers`
  Off,
}

impl LineNumbers {
  /// The display number of the first line.
  #[must_use]
  pub const fn start(self) -> usize {
    match self {
      Self::StartAt(n) => n,
      Self::On | Self::Off => 1,
    }
  }
}

/// Whether a diff line was added or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffKind {
  Addition,
  Deletion,
}

/// Everything known about one fenced code block.
///
/// Line numbers are 1-based positions in the fence body before markers were
/// stripped, except `highlighted_lines`, which are display numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeBlockFeatures {
  pub language:          Option<String>,
  pub title:             Option<String>,
  pub line_numbers:      Option<LineNumbers>,
  pub highlighted_lines: Vec<usize>,
  pub diff_lines:        BTreeMap<usize, DiffKind>,
  pub focus_lines:       BTreeSet<usize>,
  pub error_lines:       BTreeSet<usize>,
  pub warning_lines:     BTreeSet<usize>,
  /// Set when the block is rendered as a code-group tab.
  pub in_group:          bool,
}

impl CodeBlockFeatures {
  /// Parse an info string without looking at the body.
  #[must_use]
  pub fn from_info(info: &str) -> Self {
    let parsed = parse_info(info);
    Self {
      language: parsed.language,
      title: parsed.title,
      line_numbers: parsed.line_numbers,
      highlighted_lines: parsed.highlighted_lines,
      ..Self::default()
    }
  }

  /// Parse an info string and strip control markers from `body`, returning
  /// the features and the cleaned body.
  #[must_use]
  pub fn from_fence(info: &str, body: &str) -> (Self, String) {
    let mut features = Self::from_info(info);
    let cleaned = features.strip_markers(body);
    (features, cleaned)
  }

  /// Whether the block shows a line-number gutter, given the site default.
  #[must_use]
  pub fn shows_line_numbers(&self, default: bool) -> bool {
    match self.line_numbers {
      Some(LineNumbers::On | LineNumbers::StartAt(_)) => true,
      Some(LineNumbers::Off) => false,
      None => default,
    }
  }

  /// Display number of the first line.
  #[must_use]
  pub fn start_line(&self) -> usize {
    self.line_numbers.map_or(1, LineNumbers::start)
  }

  /// Remove every control marker from `body`, recording each one against its
  /// 1-based line.
  fn strip_markers(&mut self, body: &str) -> String {
    let mut cleaned = String::with_capacity(body.len());

    for (index, line) in body.split_inclusive('\n').enumerate() {
      let line_no = index + 1;
      let (content, ending) = match line.strip_suffix('\n') {
        Some(rest) => {
          match rest.strip_suffix('\r') {
            Some(rest) => (rest, "\r\n"),
            None => (rest, "\n"),
          }
        },
        None => (line, ""),
      };

      let markers = find_markers(content);
      if markers.is_empty() {
        cleaned.push_str(line);
        continue;
      }

      let mut kept = String::with_capacity(content.len());
      let mut pos = 0;
      for marker in &markers {
        if marker.start < pos {
          continue;
        }
        kept.push_str(&content[pos..marker.start]);
        pos = marker.end;
        self.record(marker.kind, line_no);
      }
      kept.push_str(&content[pos..]);

      cleaned.push_str(kept.trim_end());
      cleaned.push_str(ending);
    }

    cleaned
  }

  fn record(&mut self, kind: MarkerKind, line: usize) {
    match kind {
      MarkerKind::DiffAdd => {
        self.diff_lines.insert(line, DiffKind::Addition);
      },
      MarkerKind::DiffRemove => {
        self.diff_lines.insert(line, DiffKind::Deletion);
      },
      MarkerKind::Focus => {
        self.focus_lines.insert(line);
      },
      MarkerKind::Error => {
        self.error_lines.insert(line);
      },
      MarkerKind::Warning => {
        self.warning_lines.insert(line);
      },
    }
  }
}

/// The parts of a fence info string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoString {
  pub language:          Option<String>,
  pub title:             Option<String>,
  pub line_numbers:      Option<LineNumbers>,
  pub highlighted_lines: Vec<usize>,
}

static INFO_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile_regex(
    r"^(?P<lang>[^\s\[\]{}:]+)?(?:\s*\[(?P<title>[^\]]*)\])?(?::(?P<ln>no-line-numbers|line-numbers(?:=(?P<start>\d+))?))?(?:\s*\{(?P<hl>[^}]*)\})?\s*$",
  )
});

/// Parse `language [title]:line-numbers=N {1,3-5}`. Every part is optional
/// but the order is fixed.
///
/// An info string that does not follow the grammar still yields its first
/// word as the language.
#[must_use]
pub fn parse_info(info: &str) -> InfoString {
  let (info, _) = split_block_tag(info);
  let info = info.trim();

  let Some(caps) = INFO_RE.captures(info) else {
    return InfoString {
      language: info.split_whitespace().next().map(str::to_string),
      ..InfoString::default()
    };
  };

  let line_numbers = caps.name("ln").map(|ln| {
    if ln.as_str() == "no-line-numbers" {
      LineNumbers::Off
    } else {
      caps
        .name("start")
        .and_then(|start| start.as_str().parse().ok())
        .map_or(LineNumbers::On, LineNumbers::StartAt)
    }
  });

  InfoString {
    language: caps.name("lang").map(|m| m.as_str().to_string()),
    title: caps
      .name("title")
      .map(|m| m.as_str().trim().to_string())
      .filter(|t| !t.is_empty()),
    line_numbers,
    highlighted_lines: caps
      .name("hl")
      .map(|m| parse_highlight_spec(m.as_str()))
      .unwrap_or_default(),
  }
}

/// Parse `1,3-5,3` into a sorted, deduplicated list of line numbers.
///
/// Entries that are not numbers or ranges are ignored; reversed ranges are
/// accepted.
#[must_use]
pub fn parse_highlight_spec(spec: &str) -> Vec<usize> {
  let mut lines = BTreeSet::new();

  for part in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
    if let Some((a, b)) = part.split_once('-') {
      let (Ok(a), Ok(b)) = (a.trim().parse::<usize>(), b.trim().parse::<usize>())
      else {
        log::debug!("Ignoring malformed highlight range {part:?}");
        continue;
      };
      let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
      let hi = hi.min(lo.saturating_add(MAX_HIGHLIGHT_SPAN));
      lines.extend(lo..=hi);
    } else if let Ok(n) = part.parse::<usize>() {
      lines.insert(n);
    } else {
      log::debug!("Ignoring malformed highlight entry {part:?}");
    }
  }

  lines.into_iter().filter(|&n| n > 0).collect()
}

/// Split a `quire-block=N` tag off an info string.
#[must_use]
pub fn split_block_tag(info: &str) -> (&str, Option<usize>) {
  let trimmed = info.trim_end();
  let Some(tag_start) = trimmed.rfind(BLOCK_TAG) else {
    return (info, None);
  };
  if tag_start > 0
    && !trimmed[..tag_start]
      .chars()
      .next_back()
      .is_some_and(char::is_whitespace)
  {
    return (info, None);
  }
  match trimmed[tag_start + BLOCK_TAG.len()..].parse::<usize>() {
    Ok(id) => (trimmed[..tag_start].trim_end(), Some(id)),
    Err(_) => (info, None),
  }
}

/// Extract features from every fenced code block in `markdown`.
///
/// Returns the rewritten Markdown and the features of each newly tagged block;
/// the block ids start at `first_id` and follow document order. Fences that
/// already carry a block tag are left as they are.
#[must_use]
pub fn extract_code_blocks(
  markdown: &str,
  first_id: usize,
) -> (String, Vec<CodeBlockFeatures>) {
  let found = fences(markdown);
  let mut blocks = Vec::new();
  let mut out = String::with_capacity(markdown.len() + found.len() * 16);
  let mut copied = 0;

  for fence in found {
    if split_block_tag(fence.info).1.is_some() {
      continue;
    }

    let (features, cleaned) = CodeBlockFeatures::from_fence(fence.info, fence.body);
    let id = first_id + blocks.len();

    let opener = &markdown[fence.start..fence.start_marker_end];
    let indent_len = opener.len() - opener.trim_start().len();
    let marker: String = std::iter::repeat_n(fence.fence_char, fence.fence_len).collect();

    out.push_str(&markdown[copied..fence.start]);
    out.push_str(&opener[..indent_len]);
    out.push_str(&marker);
    if let Some(language) = &features.language {
      out.push_str(language);
      out.push(' ');
    }
    out.push_str(BLOCK_TAG);
    out.push_str(&id.to_string());
    out.push('\n');
    out.push_str(&cleaned);
    copied = fence.end_marker_start;

    blocks.push(features);
  }

  out.push_str(&markdown[copied..]);
  (out, blocks)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_info_full_grammar() {
    let info = parse_info("ts [src/app.ts]:line-numbers=10 {1,3-4}");
    assert_eq!(info.language.as_deref(), Some("ts"));
    assert_eq!(info.title.as_deref(), Some("src/app.ts"));
    assert_eq!(info.line_numbers, Some(LineNumbers::StartAt(10)));
    assert_eq!(info.highlighted_lines, vec![1, 3, 4]);
  }

  #[test]
  fn test_parse_info_partial() {
    let info = parse_info("js:no-line-numbers");
    assert_eq!(info.language.as_deref(), Some("js"));
    assert_eq!(info.line_numbers, Some(LineNumbers::Off));

    let info = parse_info("py {2}");
    assert_eq!(info.highlighted_lines, vec![2]);
    assert_eq!(info.title, None);

    assert_eq!(parse_info(""), InfoString::default());
  }

  #[test]
  fn test_parse_info_fallback_takes_first_word() {
    let info = parse_info("rust ignore,should_panic");
    assert_eq!(info.language.as_deref(), Some("rust"));
    assert!(info.highlighted_lines.is_empty());
  }

  #[test]
  fn test_highlight_spec_sorted_and_deduplicated() {
    assert_eq!(parse_highlight_spec("5, 1-3,2,x"), vec![1, 2, 3, 5]);
    assert_eq!(parse_highlight_spec("4-2"), vec![2, 3, 4]);
    assert!(parse_highlight_spec("").is_empty());
  }

  #[test]
  fn test_split_block_tag() {
    assert_eq!(split_block_tag("js quire-block=3"), ("js", Some(3)));
    assert_eq!(split_block_tag("quire-block=0"), ("", Some(0)));
    assert_eq!(split_block_tag("js"), ("js", None));
    assert_eq!(split_block_tag("jsquire-block=1"), ("jsquire-block=1", None));
  }

  #[test]
  fn test_extract_records_markers_and_cleans_body() {
    let md = "```js {2}\nconst x = 1;\nconst y = 2; // [!code ++]\n```\n";
    let (out, blocks) = extract_code_blocks(md, 0);
    assert_eq!(out, "```js quire-block=0\nconst x = 1;\nconst y = 2;\n```\n");
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].language.as_deref(), Some("js"));
    assert_eq!(blocks[0].highlighted_lines, vec![2]);
    assert_eq!(blocks[0].diff_lines.get(&2), Some(&DiffKind::Addition));
  }

  #[test]
  fn test_extract_keeps_trailing_comment() {
    let md = "```py\nx = 1  # [!code focus] # keep me\n```\n";
    let (out, blocks) = extract_code_blocks(md, 0);
    assert!(out.contains("x = 1 # keep me\n"), "got {out:?}");
    assert!(blocks[0].focus_lines.contains(&1));
  }

  #[test]
  fn test_extract_multiple_markers_on_one_line() {
    let md = "```js\na(); // [!code --] // [!code focus]\nb(); /* [!code error] */\nc(); // [!code warning]\n```\n";
    let (out, blocks) = extract_code_blocks(md, 4);
    assert!(out.contains("quire-block=4\na();\nb();\nc();\n```"), "got {out:?}");
    let block = &blocks[0];
    assert_eq!(block.diff_lines.get(&1), Some(&DiffKind::Deletion));
    assert!(block.focus_lines.contains(&1));
    assert!(block.error_lines.contains(&2));
    assert!(block.warning_lines.contains(&3));
  }

  #[test]
  fn test_extract_is_idempotent() {
    let md = "text\n\n```sh\necho hi\n```\n\n~~~\nplain\n~~~\n";
    let (once, blocks) = extract_code_blocks(md, 0);
    assert_eq!(blocks.len(), 2);
    let (twice, more) = extract_code_blocks(&once, blocks.len());
    assert_eq!(once, twice);
    assert!(more.is_empty());
    assert!(once.contains("~~~quire-block=1\nplain\n~~~"));
  }

  #[test]
  fn test_extract_leaves_unclosed_fence() {
    let md = "```js\nlet a; // [!code ++]\n";
    let (out, blocks) = extract_code_blocks(md, 0);
    assert_eq!(out, md);
    assert!(blocks.is_empty());
  }

  #[test]
  fn test_extract_preserves_indentation() {
    let md = "- item\n\n  ```js\n  a\n  ```\n";
    let (out, _) = extract_code_blocks(md, 0);
    assert!(out.contains("\n  ```js quire-block=0\n  a\n  ```\n"), "got {out:?}");
  }
}
