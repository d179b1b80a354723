//! Callouts: `:::note|tip|important|warning|danger [Title]` containers and
//! GitHub-style `> [!NOTE]` alerts.

use std::sync::LazyLock;

use regex::Regex;

use super::{Container, replace_containers};
use crate::{
  code::{IconSource, icon_html},
  context::ProcessingContext,
  processor::Processor,
  utils::{capitalize_first, compile_regex, html::{escape_html, find_matching_close}},
};

/// The kinds of callout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalloutKind {
  Note,
  Tip,
  Important,
  Warning,
  Danger,
}

impl CalloutKind {
  /// Parse a callout type, ignoring case. GitHub's `caution` maps to
  /// [`Self::Danger`] only through [`Self::from_alert`].
  #[must_use]
  pub fn from_name(name: &str) -> Option<Self> {
    match name.to_ascii_lowercase().as_str() {
      "note" => Some(Self::Note),
      "tip" => Some(Self::Tip),
      "important" => Some(Self::Important),
      "warning" => Some(Self::Warning),
      "danger" => Some(Self::Danger),
      _ => None,
    }
  }

  /// Parse a GitHub alert marker type.
  #[must_use]
  pub fn from_alert(name: &str) -> Option<Self> {
    if name.eq_ignore_ascii_case("caution") {
      Some(Self::Danger)
    } else {
      Self::from_name(name)
    }
  }

  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Note => "note",
      Self::Tip => "tip",
      Self::Important => "important",
      Self::Warning => "warning",
      Self::Danger => "danger",
    }
  }

  /// Phosphor icon shown next to the title.
  #[must_use]
  pub const fn icon(self) -> &'static str {
    match self {
      Self::Note => "info",
      Self::Tip => "lightbulb",
      Self::Important => "star",
      Self::Warning => "warning",
      Self::Danger => "warning-octagon",
    }
  }

  /// ARIA role of the callout container.
  #[must_use]
  pub const fn role(self) -> &'static str {
    match self {
      Self::Note | Self::Tip | Self::Important => "note",
      Self::Warning | Self::Danger => "alert",
    }
  }

  #[must_use]
  pub fn default_title(self) -> String {
    capitalize_first(self.as_str())
  }
}

/// Render a callout around already rendered `content`.
#[must_use]
pub fn render_callout(kind: CalloutKind, title: Option<&str>, content: &str) -> String {
  let title = title
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .map_or_else(|| kind.default_title(), str::to_string);

  format!(
    "<div class=\"quire-callout quire-callout-{kind}\" role=\"{role}\">\n<div \
     class=\"quire-callout-title\">{icon}<span>{title}</span></div>\n<div \
     class=\"quire-callout-content\">\n{content}\n</div>\n</div>",
    kind = kind.as_str(),
    role = kind.role(),
    icon = icon_html(kind.icon(), IconSource::Phosphor),
    title = escape_html(&title),
    content = content.trim(),
  )
}

static ALERT_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile_regex(r"(?i)^<blockquote>\s*<p>\[!(note|tip|important|warning|caution)\][ \t]*")
});

/// Turn `<blockquote>` elements starting with `[!TYPE]` into callouts.
fn convert_alerts(html: &str) -> String {
  let mut out = String::with_capacity(html.len());
  let mut pos = 0;

  while let Some(offset) = html[pos..].find("<blockquote>") {
    let start = pos + offset;
    out.push_str(&html[pos..start]);

    let alert = ALERT_RE.captures(&html[start..]).and_then(|caps| {
      let kind = CalloutKind::from_alert(caps.get(1)?.as_str())?;
      let marker_end = start + caps.get(0)?.end();
      let end = find_matching_close(html, start, "blockquote")?;
      Some((kind, marker_end, end))
    });

    let Some((kind, marker_end, end)) = alert else {
      out.push_str("<blockquote>");
      pos = start + "<blockquote>".len();
      continue;
    };

    let close_start = html[..end].rfind("</blockquote>").unwrap_or(end);
    let rest = html[marker_end..close_start].trim_start();
    let content = match rest.strip_prefix("</p>") {
      Some(after) => after.to_string(),
      None => format!("<p>{rest}"),
    };

    out.push_str(&render_callout(kind, None, &convert_alerts(&content)));
    pos = end;
  }

  out.push_str(&html[pos..]);
  out
}

fn render_container(container: &Container<'_>, ctx: &mut ProcessingContext<'_>) -> Option<String> {
  let kind = CalloutKind::from_name(container.name)?;
  let content = ctx.render_markdown(container.body);
  Some(render_callout(kind, Some(container.args), &content))
}

/// Renders callout containers and converts GitHub alerts.
///
/// A container with an unknown type is left untouched.
pub struct CalloutProcessor;

impl Processor for CalloutProcessor {
  fn name(&self) -> &'static str {
    "callout"
  }

  fn priority(&self) -> i32 {
    40
  }

  fn preprocess(&self, content: &str, ctx: &mut ProcessingContext<'_>) -> String {
    replace_containers(content, |container| render_container(container, ctx))
  }

  fn postprocess(&self, html: &str, _ctx: &mut ProcessingContext<'_>) -> String {
    if html.contains("<blockquote>") {
      convert_alerts(html)
    } else {
      html.to_string()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::processor::{Converter, MarkdownOptions, ProcessorRegistry};

  fn preprocess(md: &str) -> String {
    let registry = ProcessorRegistry::with_builtins();
    let converter = Converter::new(&MarkdownOptions {
      highlight_code: false,
      ..Default::default()
    });
    let mut ctx = ProcessingContext::new(&registry, &converter, None);
    CalloutProcessor.preprocess(md, &mut ctx)
  }

  #[test]
  fn test_note_default_title() {
    let html = preprocess(":::note\nHello\n:::");
    assert!(html.contains("role=\"note\""));
    assert!(html.contains("<span>Note</span>"));
    assert!(html.contains("<p>Hello</p>"));
    assert!(html.contains("ph-info"));
  }

  #[test]
  fn test_unknown_type_unchanged() {
    let md = ":::unknowntype\nHello\n:::";
    assert_eq!(preprocess(md), md);
  }

  #[test]
  fn test_case_insensitive_custom_title_and_roles() {
    let html = preprocess(":::WARNING Mind the gap\ncareful\n:::\n");
    assert!(html.contains("quire-callout-warning"));
    assert!(html.contains("role=\"alert\""));
    assert!(html.contains("<span>Mind the gap</span>"));
    assert!(html.contains("ph-warning\""));

    for (name, icon, role) in [
      ("tip", "lightbulb", "note"),
      ("important", "star", "note"),
      ("danger", "warning-octagon", "alert"),
    ] {
      let html = preprocess(&format!(":::{name}\nx\n:::\n"));
      assert!(html.contains(&format!("ph-{icon}\"")), "{name}");
      assert!(html.contains(&format!("role=\"{role}\"")), "{name}");
    }
  }

  #[test]
  fn test_nested_callouts() {
    let html = preprocess(":::note\nouter\n:::tip\ninner\n:::\n:::\n");
    assert_eq!(html.matches("quire-callout-note").count(), 1);
    assert_eq!(html.matches("quire-callout-tip").count(), 1);
    assert!(html.find("quire-callout-note") < html.find("quire-callout-tip"));
  }

  #[test]
  fn test_github_alerts() {
    let html = "<blockquote>\n<p>[!CAUTION]\nDo not.</p>\n</blockquote>\n<p>after</p>";
    let out = convert_alerts(html);
    assert!(out.contains("quire-callout-danger"));
    assert!(out.contains("<span>Danger</span>"));
    assert!(out.contains("<p>Do not.</p>"));
    assert!(!out.contains("[!CAUTION]"));
    assert!(out.ends_with("<p>after</p>"));
  }

  #[test]
  fn test_github_alert_marker_in_own_paragraph() {
    let html = "<blockquote>\n<p>[!tip]</p>\n<p>Use it.</p>\n</blockquote>";
    let out = convert_alerts(html);
    assert!(out.contains("quire-callout-tip"));
    assert!(out.contains("<p>Use it.</p>"));
  }

  #[test]
  fn test_plain_blockquote_untouched() {
    let html = "<blockquote>\n<p>Just a quote</p>\n</blockquote>\n";
    assert_eq!(convert_alerts(html), html);
  }
}
