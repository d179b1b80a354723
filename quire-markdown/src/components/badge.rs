//! Inline `:badge[text]{type=...}` badges.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::parse_attributes;
use crate::{
  context::ProcessingContext,
  processor::Processor,
  utils::{compile_regex, html::map_text_outside_code},
};

static BADGE_RE: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r":badge\[([^\]]*)\](?:\{([^}]*)\})?"));

const VARIANTS: &[&str] = &["default", "success", "warning", "danger"];

/// The CSS variant for a badge's attribute block. Unknown or missing types
/// use `default`.
fn variant(attrs: Option<&str>) -> &'static str {
  let Some(attrs) = attrs else {
    return "default";
  };
  let decoded = html_escape::decode_html_entities(attrs);
  let requested = parse_attributes(&decoded)
    .get("type")
    .map(|t| t.trim().to_ascii_lowercase())
    .unwrap_or_default();

  VARIANTS
    .iter()
    .find(|v| **v == requested)
    .copied()
    .unwrap_or("default")
}

/// Converts badge syntax in page text. Code spans and blocks are skipped.
pub struct BadgeProcessor;

impl Processor for BadgeProcessor {
  fn name(&self) -> &'static str {
    "badge"
  }

  fn priority(&self) -> i32 {
    60
  }

  fn postprocess(&self, html: &str, _ctx: &mut ProcessingContext<'_>) -> String {
    if !html.contains(":badge[") {
      return html.to_string();
    }

    map_text_outside_code(html, |text| {
      if !BADGE_RE.is_match(text) {
        return None;
      }
      let replaced = BADGE_RE.replace_all(text, |caps: &Captures<'_>| {
        let variant = variant(caps.get(2).map(|m| m.as_str()));
        format!(
          "<span class=\"quire-badge quire-badge-{variant}\">{}</span>",
          &caps[1]
        )
      });
      Some(replaced.into_owned())
    })
    .into_owned()
  }
}
