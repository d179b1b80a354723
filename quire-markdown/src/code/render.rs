//! HTML for a single code block.

use super::{
  features::CodeBlockFeatures,
  icons::{IconSource, icon_for_language, icon_html, parse_manual_icon},
  lines::{LineDecorations, wrap_lines},
};
use crate::{
  syntax::SyntaxManager,
  utils::html::{escape_attr, escape_html},
};

/// Render `code` with its features.
///
/// The highlighter output is split into per-line spans carrying the line
/// state classes. A title bar is shown for titled blocks unless the block is
/// a code-group tab, where the tab label already shows the title.
#[must_use]
pub fn render_code_block(
  code: &str,
  features: &CodeBlockFeatures,
  syntax: &SyntaxManager,
  line_numbers_default: bool,
) -> String {
  let language = features.language.as_deref().unwrap_or("text");

  let highlighted = match features.language.as_deref() {
    Some(lang) => {
      syntax.highlight_code(code, lang).unwrap_or_else(|e| {
        log::warn!("Failed to highlight {lang} code block: {e}");
        escape_html(code)
      })
    },
    None => escape_html(code),
  };

  let decorations = LineDecorations::from_features(features, line_numbers_default);
  let body = wrap_lines(&highlighted, &decorations);

  let mut classes = String::from("quire-code-block");
  if decorations.line_numbers {
    classes.push_str(" line-numbers");
  }
  if !decorations.focus.is_empty() {
    classes.push_str(" has-focus");
  }
  if !decorations.diff.is_empty() {
    classes.push_str(" has-diff");
  }

  let language_attr = escape_attr(language);
  let mut html = format!(
    "<div class=\"{classes}\" data-language=\"{language_attr}\">\n"
  );

  if let Some(title) = features.title.as_deref().filter(|_| !features.in_group) {
    html.push_str(&title_bar(title, features.language.as_deref()));
    html.push('\n');
  }

  html.push_str(&format!(
    "<div class=\"highlight\"><pre><code class=\"language-{language_attr}\">{body}</code></pre></div>\n</div>"
  ));
  html
}

fn title_bar(title: &str, language: Option<&str>) -> String {
  let (icon, text) = match parse_manual_icon(title) {
    Some((icon, text)) => (Some(icon_html(&icon, IconSource::Phosphor)), text),
    None => {
      let icon = language.map(|lang| {
        let (icon, source) = icon_for_language(lang);
        icon_html(&icon, source)
      });
      (icon, title.to_string())
    },
  };

  format!(
    "<div class=\"quire-code-header\">{}<span class=\"quire-code-title\">{}</span></div>",
    icon.unwrap_or_default(),
    escape_html(&text)
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::syntax::create_plain_manager;

  fn features(info: &str) -> CodeBlockFeatures {
    CodeBlockFeatures::from_info(info)
  }

  #[test]
  fn test_render_basic_block() {
    let syntax = create_plain_manager();
    let html = render_code_block("let a = 1;\n", &features("js"), &syntax, false);
    assert_eq!(
      html,
      "<div class=\"quire-code-block\" data-language=\"js\">\n<div \
       class=\"highlight\"><pre><code class=\"language-js\"><span \
       class=\"line\">let a = 1;</span></code></pre></div>\n</div>"
    );
  }

  #[test]
  fn test_render_title_bar_with_language_icon() {
    let syntax = create_plain_manager();
    let html = render_code_block("x\n", &features("rust [main.rs]"), &syntax, false);
    assert!(html.contains(
      "<div class=\"quire-code-header\"><i class=\"file-icon file-icon-rs\" \
       aria-hidden=\"true\"></i><span class=\"quire-code-title\">main.rs</span></div>"
    ));
  }

  #[test]
  fn test_render_title_suppressed_in_group() {
    let syntax = create_plain_manager();
    let mut feats = features("rust [main.rs]");
    feats.in_group = true;
    let html = render_code_block("x\n", &feats, &syntax, false);
    assert!(!html.contains("quire-code-header"));
  }

  #[test]
  fn test_render_line_numbers_and_escaping() {
    let syntax = create_plain_manager();
    let html = render_code_block("<a>\n<b>\n", &features("html:line-numbers=3"), &syntax, false);
    assert!(html.contains("quire-code-block line-numbers"));
    assert!(html.contains("<span class=\"line-number\">3</span>&lt;a&gt;"));
    assert!(html.contains("<span class=\"line-number\">4</span>&lt;b&gt;"));
  }

  #[test]
  fn test_render_without_language() {
    let syntax = create_plain_manager();
    let html = render_code_block("plain\n", &features(""), &syntax, true);
    assert!(html.contains("data-language=\"text\""));
    assert!(html.contains("line-numbers"));
  }
}
