//! Inline `:name:` and `:name:weight:` Phosphor icons.

use std::sync::LazyLock;

use regex::Regex;

use crate::{
  context::ProcessingContext,
  processor::Processor,
  utils::{compile_regex, html::map_text_outside_code},
};

static ICON_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile_regex(
    r":([a-z][a-z0-9]*(?:-[a-z0-9]+)*):(?:(regular|bold|fill|light|thin|duotone):)?",
  )
});

/// Class list for an icon in the given weight.
fn icon_classes(name: &str, weight: Option<&str>) -> String {
  match weight {
    None | Some("regular") => format!("ph ph-{name}"),
    Some(weight) => format!("ph-{weight} ph-{name}"),
  }
}

/// Whether a match is glued to surrounding word characters or colons, as
/// in `std::io::Error` or `12:30:00`.
fn is_embedded(text: &str, start: usize, end: usize) -> bool {
  let glued = |c: char| c.is_alphanumeric() || c == ':';
  text[..start].chars().next_back().is_some_and(glued)
    || text[end..].chars().next().is_some_and(glued)
}

fn replace_icons(text: &str) -> Option<String> {
  let mut out = String::with_capacity(text.len());
  let mut copied = 0;

  for caps in ICON_RE.captures_iter(text) {
    let Some(whole) = caps.get(0) else { continue };
    if is_embedded(text, whole.start(), whole.end()) {
      continue;
    }
    let name = caps.get(1).map_or("", |m| m.as_str());
    let weight = caps.get(2).map(|m| m.as_str());

    out.push_str(&text[copied..whole.start()]);
    out.push_str(&format!(
      "<i class=\"{}\" aria-hidden=\"true\"></i>",
      icon_classes(name, weight)
    ));
    copied = whole.end();
  }

  if copied == 0 {
    return None;
  }
  out.push_str(&text[copied..]);
  Some(out)
}

/// Converts inline icon shortcodes in page text. Code spans and blocks are
/// skipped.
pub struct IconProcessor;

impl Processor for IconProcessor {
  fn name(&self) -> &'static str {
    "icon"
  }

  fn priority(&self) -> i32 {
    70
  }

  fn postprocess(&self, html: &str, _ctx: &mut ProcessingContext<'_>) -> String {
    map_text_outside_code(html, replace_icons).into_owned()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_icon_and_weight() {
    assert_eq!(
      replace_icons("Go :house: home").as_deref(),
      Some("Go <i class=\"ph ph-house\" aria-hidden=\"true\"></i> home")
    );
    assert_eq!(
      replace_icons(":arrow-right:bold:").as_deref(),
      Some("<i class=\"ph-bold ph-arrow-right\" aria-hidden=\"true\"></i>")
    );
    assert_eq!(
      replace_icons(":gear:regular:").as_deref(),
      Some("<i class=\"ph ph-gear\" aria-hidden=\"true\"></i>")
    );
  }

  #[test]
  fn test_embedded_colons_ignored() {
    assert_eq!(replace_icons("std::io::Error"), None);
    assert_eq!(replace_icons("at 12:30:00"), None);
    assert_eq!(replace_icons("key: value: other"), None);
  }

  #[test]
  fn test_code_skipped() {
    let html = "<p>:star: and <code>:star:</code></p>";
    assert_eq!(
      map_text_outside_code(html, replace_icons),
      "<p><i class=\"ph ph-star\" aria-hidden=\"true\"></i> and <code>:star:</code></p>"
    );
  }
}
