//! Component processors and the container scanning they share.
//!
//! Block components use `:::name args` ... `:::` containers. Containers nest:
//! every `:::name` line opens a level and every bare `:::` line closes one.
//! Lines inside fenced code blocks never open or close anything, so example
//! syntax shown in code stays as written. A container without a closing line
//! is left exactly as it was.

mod badge;
mod callout;
mod cards;
mod code_block;
mod code_group;
mod details;
mod headings;
mod icon;
mod snippet;
mod steps;
mod tabs;

use std::{collections::HashMap, sync::LazyLock};

pub use badge::BadgeProcessor;
pub use callout::{CalloutKind, CalloutProcessor, render_callout};
pub use cards::CardsProcessor;
pub use code_block::CodeBlockExtractor;
pub use code_group::CodeGroupProcessor;
pub use details::DetailsProcessor;
pub use headings::HeadingProcessor;
pub use icon::IconProcessor;
use regex::Regex;
pub use snippet::{SnippetError, SnippetProcessor};
pub use steps::StepsProcessor;
pub use tabs::{TabEntry, TabsProcessor, render_tabs};

use crate::utils::{
  codeblock::{FenceTracker, lines_with_offsets},
  compile_regex,
  html::compact_fragment,
};

static OPENER_RE: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r"^:::([A-Za-z][\w-]*)(.*)$"));

/// A `:::name args` ... `:::` block found in Markdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Container<'a> {
  /// The component name, as written.
  pub name:  &'a str,
  /// Everything after the name on the opening line, trimmed.
  pub args:  &'a str,
  /// Lines between the opening and closing lines.
  pub body:  &'a str,
  /// Byte range of the whole block, closing line included.
  pub start: usize,
  pub end:   usize,
}

/// Match a container opening line.
fn parse_opener(line: &str) -> Option<(&str, &str)> {
  let trimmed = line.trim();
  let caps = OPENER_RE.captures(trimmed)?;
  let name = caps.get(1)?.as_str();
  let args = caps.get(2).map_or("", |m| m.as_str().trim());
  Some((name, args))
}

fn is_closer(line: &str) -> bool {
  line.trim() == ":::"
}

/// Find the byte offset of the line closing a container whose body starts at
/// `body_start`, returning `(closing_line_start, closing_line_end)`.
fn find_closer(text: &str, body_start: usize) -> Option<(usize, usize)> {
  let mut fence = FenceTracker::new();
  let mut depth = 1usize;

  for (offset, line) in lines_with_offsets(&text[body_start..]) {
    let was_in_fence = fence.in_code_block();
    fence = fence.process_line(line);
    if was_in_fence || fence.in_code_block() {
      continue;
    }

    if is_closer(line) {
      depth -= 1;
      if depth == 0 {
        let start = body_start + offset;
        return Some((start, start + line.len()));
      }
    } else if parse_opener(line).is_some() {
      depth += 1;
    }
  }

  None
}

/// Replace containers in `markdown` with the HTML produced by `render`.
///
/// `render` is called for each outermost container in document order. When it
/// returns `None` the opening line is kept and scanning continues inside the
/// body, so containers nested in a foreign or unknown block are still found.
/// Rendered HTML is emitted as a single HTML block surrounded by blank lines.
pub fn replace_containers<F>(markdown: &str, mut render: F) -> String
where
  F: FnMut(&Container<'_>) -> Option<String>,
{
  let mut out = String::with_capacity(markdown.len());
  let mut fence = FenceTracker::new();
  let mut copied = 0;
  let mut skip_until = 0;

  for (offset, line) in lines_with_offsets(markdown) {
    let was_in_fence = fence.in_code_block();
    fence = fence.process_line(line);
    if offset < skip_until || was_in_fence || fence.in_code_block() {
      continue;
    }

    let Some((name, args)) = parse_opener(line) else {
      continue;
    };
    let body_start = offset + line.len();
    let Some((close_start, close_end)) = find_closer(markdown, body_start)
    else {
      log::warn!("Unterminated ':::{name}' block left as written");
      continue;
    };

    let container = Container {
      name,
      args,
      body: &markdown[body_start..close_start],
      start: offset,
      end: close_end,
    };

    if let Some(html) = render(&container) {
      out.push_str(&markdown[copied..offset]);
      push_html_block(&mut out, &html);
      copied = close_end;
      skip_until = close_end;
    }
  }

  out.push_str(&markdown[copied..]);
  out
}

/// Append `html` as a standalone HTML block.
pub(crate) fn push_html_block(out: &mut String, html: &str) {
  if !out.is_empty() && !out.ends_with("\n\n") {
    out.push('\n');
  }
  out.push_str(&compact_fragment(html));
  out.push_str("\n\n");
}

/// Split a container body into sections introduced by lines for which
/// `heading` returns a label.
///
/// Only lines outside code fences and outside nested containers count.
/// Text before the first heading is returned separately.
pub fn split_sections<'a, F>(
  body: &'a str,
  heading: F,
) -> (&'a str, Vec<(&'a str, &'a str)>)
where
  F: Fn(&'a str) -> Option<&'a str>,
{
  let mut fence = FenceTracker::new();
  let mut depth = 0usize;
  let mut sections: Vec<(&str, usize, usize)> = Vec::new();
  let mut preamble_end = body.len();

  for (offset, line) in lines_with_offsets(body) {
    let was_in_fence = fence.in_code_block();
    fence = fence.process_line(line);
    if was_in_fence || fence.in_code_block() {
      continue;
    }

    if parse_opener(line).is_some() {
      depth += 1;
      continue;
    }
    if is_closer(line) {
      depth = depth.saturating_sub(1);
      continue;
    }
    if depth > 0 {
      continue;
    }

    if let Some(label) = heading(line.trim_end_matches(['\n', '\r'])) {
      if let Some(last) = sections.last_mut() {
        last.2 = offset;
      } else {
        preamble_end = offset;
      }
      sections.push((label, offset + line.len(), body.len()));
    }
  }

  let sections = sections
    .into_iter()
    .map(|(label, start, end)| (label, &body[start..end]))
    .collect();
  (&body[..preamble_end], sections)
}

/// Parse `{key="value", flag, other=bare}` style attributes.
///
/// The surrounding braces are optional. Values may be double-quoted,
/// single-quoted or bare; pairs are separated by commas or whitespace. A key
/// without a value maps to an empty string.
#[must_use]
pub fn parse_attributes(input: &str) -> HashMap<String, String> {
  let inner = input.trim();
  let inner = inner
    .strip_prefix('{')
    .and_then(|s| s.strip_suffix('}'))
    .unwrap_or(inner);

  let mut attrs = HashMap::new();
  let mut chars = inner.char_indices().peekable();

  loop {
    while chars
      .peek()
      .is_some_and(|&(_, c)| c == ',' || c.is_whitespace())
    {
      chars.next();
    }
    let Some(&(key_start, _)) = chars.peek() else {
      break;
    };

    let mut key_end = inner.len();
    while let Some(&(i, c)) = chars.peek() {
      if c == '=' || c == ',' || c.is_whitespace() {
        key_end = i;
        break;
      }
      chars.next();
    }
    let key = inner[key_start..key_end].to_string();

    let mut value = String::new();
    if chars.peek().is_some_and(|&(_, c)| c == '=') {
      chars.next();
      match chars.peek().map(|&(_, c)| c) {
        Some(quote @ ('"' | '\'')) => {
          chars.next();
          for (_, c) in chars.by_ref() {
            if c == quote {
              break;
            }
            value.push(c);
          }
        },
        _ => {
          while let Some(&(_, c)) = chars.peek() {
            if c == ',' || c.is_whitespace() {
              break;
            }
            value.push(c);
            chars.next();
          }
        },
      }
    }

    if !key.is_empty() {
      attrs.insert(key, value);
    }
  }

  attrs
}
