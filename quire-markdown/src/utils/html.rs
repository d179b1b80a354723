//! Small string-level HTML helpers shared by the processors.
//!
//! None of these build a DOM. They scan tags with counters, which is enough
//! for the well-formed markup produced by the converter and our own
//! components.

use std::borrow::Cow;

/// Escape text content for HTML.
#[must_use]
pub fn escape_html(text: &str) -> String {
  html_escape::encode_text(text).into_owned()
}

/// Escape a value for use inside a double-quoted attribute.
#[must_use]
pub fn escape_attr(text: &str) -> String {
  html_escape::encode_double_quoted_attribute(text).into_owned()
}

/// Remove every tag from `html`, keeping text content as-is.
#[must_use]
pub fn strip_tags(html: &str) -> String {
  let mut out = String::with_capacity(html.len());
  let mut in_tag = false;
  for ch in html.chars() {
    match ch {
      '<' => in_tag = true,
      '>' if in_tag => in_tag = false,
      _ if !in_tag => out.push(ch),
      _ => {},
    }
  }
  out
}

/// Plain text of an HTML fragment with entities decoded.
#[must_use]
pub fn text_content(html: &str) -> String {
  html_escape::decode_html_entities(&strip_tags(html))
    .trim()
    .to_string()
}

/// Drop whitespace-only lines so a rendered fragment stays a single HTML block
/// when it is embedded back into Markdown.
///
/// Inside `<pre>` a blank line is kept as an empty `<span></span>` instead,
/// which holds the block together without changing the displayed text.
#[must_use]
pub fn compact_fragment(html: &str) -> String {
  let mut lines = Vec::new();
  let mut pre_depth = 0usize;

  for line in html.lines() {
    if line.trim().is_empty() {
      if pre_depth > 0 {
        lines.push(format!("{line}<span></span>"));
      }
      continue;
    }

    for (pos, _) in line.match_indices('<') {
      if is_open_tag_at(line, pos, "pre") {
        pre_depth += 1;
      } else if is_close_tag_at(line, pos, "pre") {
        pre_depth = pre_depth.saturating_sub(1);
      }
    }
    lines.push(line.to_string());
  }

  lines.join("\n")
}

/// Check whether `html[pos..]` starts an opening tag named `tag`.
///
/// Compares bytes, so `pos` may sit anywhere in multi-byte text.
fn is_open_tag_at(html: &str, pos: usize, tag: &str) -> bool {
  let Some(rest) = html.as_bytes().get(pos..) else {
    return false;
  };
  rest.first() == Some(&b'<')
    && rest
      .get(1..=tag.len())
      .is_some_and(|name| name.eq_ignore_ascii_case(tag.as_bytes()))
    && rest
      .get(1 + tag.len())
      .is_some_and(|&b| b.is_ascii_whitespace() || b == b'>' || b == b'/')
}

/// Check whether `html[pos..]` starts a closing tag named `tag`.
fn is_close_tag_at(html: &str, pos: usize, tag: &str) -> bool {
  let Some(rest) = html.as_bytes().get(pos..) else {
    return false;
  };
  rest.starts_with(b"</")
    && rest
      .get(2..2 + tag.len())
      .is_some_and(|name| name.eq_ignore_ascii_case(tag.as_bytes()))
    && rest
      .get(2 + tag.len()..)
      .and_then(|tail| tail.iter().find(|b| !b.is_ascii_whitespace()))
      == Some(&b'>')
}

/// Given the byte offset of an opening `<tag ...>` in `html`, find the end of
/// its balanced closing tag (the offset just past `</tag>`).
///
/// Nested tags of the same name are counted; returns `None` when the element
/// is never closed.
#[must_use]
pub fn find_matching_close(
  html: &str,
  open_start: usize,
  tag: &str,
) -> Option<usize> {
  if !is_open_tag_at(html, open_start, tag) {
    return None;
  }

  let mut depth = 0usize;
  let mut pos = open_start;

  while let Some(offset) = html[pos..].find('<') {
    let at = pos + offset;
    if is_open_tag_at(html, at, tag) {
      depth += 1;
    } else if is_close_tag_at(html, at, tag) {
      depth -= 1;
      if depth == 0 {
        let close_end = html[at..].find('>')? + at + 1;
        return Some(close_end);
      }
    }
    pos = at + 1;
  }

  None
}

/// Apply `transform` to every text run of `html` that is not inside a tag and
/// not inside a `<code>` or `<pre>` element.
///
/// Returns the input unchanged (borrowed) when `transform` never changes a
/// run.
pub fn map_text_outside_code<F>(html: &str, mut transform: F) -> Cow<'_, str>
where
  F: FnMut(&str) -> Option<String>,
{
  let mut out = String::new();
  let mut changed = false;
  let mut code_depth = 0usize;
  let mut pos = 0;
  let mut copied = 0;

  while pos < html.len() {
    let Some(offset) = html[pos..].find('<') else {
      break;
    };
    let tag_start = pos + offset;

    if code_depth == 0 && tag_start > pos {
      if let Some(replaced) = transform(&html[pos..tag_start]) {
        out.push_str(&html[copied..pos]);
        out.push_str(&replaced);
        copied = tag_start;
        changed = true;
      }
    }

    let Some(tag_len) = html[tag_start..].find('>') else {
      pos = html.len();
      copied = copied.min(pos);
      break;
    };
    let tag_end = tag_start + tag_len + 1;

    if is_open_tag_at(html, tag_start, "code")
      || is_open_tag_at(html, tag_start, "pre")
    {
      code_depth += 1;
    } else if (is_close_tag_at(html, tag_start, "code")
      || is_close_tag_at(html, tag_start, "pre"))
      && code_depth > 0
    {
      code_depth -= 1;
    }

    pos = tag_end;
  }

  if code_depth == 0 && pos < html.len() {
    if let Some(replaced) = transform(&html[pos..]) {
      out.push_str(&html[copied..pos]);
      out.push_str(&replaced);
      copied = html.len();
      changed = true;
    }
  }

  if !changed {
    return Cow::Borrowed(html);
  }

  out.push_str(&html[copied..]);
  Cow::Owned(out)
}
