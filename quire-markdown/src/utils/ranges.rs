//! Locating rendered tabs containers in HTML.

use std::{ops::Range, sync::LazyLock};

use regex::Regex;

use super::{compile_regex, html::find_matching_close};

/// Class token that marks a tabs container.
pub const TABS_CLASS: &str = "quire-tabs";

static DIV_OPEN_RE: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r#"<div\s[^>]*class="([^"]*)"[^>]*>"#));

/// Find every top-level tabs container in `html`.
///
/// Each range starts at the container's opening `<div>` and ends just past its
/// balanced `</div>`. Ranges are returned in document order and never overlap:
/// tabs nested inside another tabs container are covered by the outer range.
/// A container that is never closed is skipped.
#[must_use]
pub fn find_tabs_ranges(html: &str) -> Vec<Range<usize>> {
  let mut ranges = Vec::new();
  let mut pos = 0;

  while let Some(caps) = DIV_OPEN_RE.captures_at(html, pos) {
    let Some(whole) = caps.get(0) else {
      break;
    };
    let is_tabs = caps
      .get(1)
      .is_some_and(|class| class.as_str().split_whitespace().any(|c| c == TABS_CLASS));

    if !is_tabs {
      pos = whole.end();
      continue;
    }

    match find_matching_close(html, whole.start(), "div") {
      Some(end) => {
        ranges.push(whole.start()..end);
        pos = end;
      },
      None => {
        log::warn!("Unclosed tabs container at byte {}", whole.start());
        pos = whole.end();
      },
    }
  }

  ranges
}

/// Check whether `position` lies within any of `ranges`.
#[must_use]
pub fn in_any_range(ranges: &[Range<usize>], position: usize) -> bool {
  ranges.iter().any(|range| range.contains(&position))
}
