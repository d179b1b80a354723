//! Icon resolution for tabs, code groups and code block titles.

use std::sync::LazyLock;

use regex::Regex;

use super::features::parse_info;
use crate::utils::{codeblock::fences, compile_regex, html::escape_attr};

/// Where an icon comes from, which decides how it is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconSource {
  /// A Phosphor icon font glyph.
  Phosphor,
  /// A file-type icon keyed by extension.
  FileExtension,
}

/// Display text with the icon chosen for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconResolution {
  /// The text with any manual `:icon:` prefix removed.
  pub text:   String,
  pub icon:   Option<String>,
  pub source: Option<IconSource>,
}

impl IconResolution {
  fn none(text: &str) -> Self {
    Self {
      text:   text.to_string(),
      icon:   None,
      source: None,
    }
  }
}

/// Languages rendered with the terminal glyph instead of a file icon.
const TERMINAL_LANGUAGES: &[&str] = &["bash", "sh", "shell", "powershell"];

/// Language identifier or alias to file-extension icon key.
const LANGUAGE_ICONS: &[(&str, &str)] = &[
  ("javascript", "js"),
  ("js", "js"),
  ("mjs", "js"),
  ("cjs", "js"),
  ("jsx", "jsx"),
  ("typescript", "ts"),
  ("ts", "ts"),
  ("tsx", "tsx"),
  ("python", "py"),
  ("py", "py"),
  ("ruby", "rb"),
  ("rb", "rb"),
  ("rust", "rs"),
  ("rs", "rs"),
  ("go", "go"),
  ("golang", "go"),
  ("java", "java"),
  ("kotlin", "kt"),
  ("kt", "kt"),
  ("swift", "swift"),
  ("c", "c"),
  ("cpp", "cpp"),
  ("c++", "cpp"),
  ("csharp", "cs"),
  ("cs", "cs"),
  ("php", "php"),
  ("html", "html"),
  ("vue", "vue"),
  ("svelte", "svelte"),
  ("css", "css"),
  ("scss", "scss"),
  ("sass", "sass"),
  ("json", "json"),
  ("yaml", "yaml"),
  ("yml", "yaml"),
  ("toml", "toml"),
  ("xml", "xml"),
  ("markdown", "md"),
  ("md", "md"),
  ("sql", "sql"),
  ("lua", "lua"),
  ("nix", "nix"),
  ("zig", "zig"),
  ("dockerfile", "docker"),
  ("docker", "docker"),
];

static MANUAL_ICON_RE: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r"^:([A-Za-z0-9-]+):\s+(.+)$"));

/// Parse a manual `:icon-name: Text` prefix, returning the icon name and the
/// remaining text.
#[must_use]
pub fn parse_manual_icon(text: &str) -> Option<(String, String)> {
  let caps = MANUAL_ICON_RE.captures(text.trim())?;
  Some((caps[1].to_string(), caps[2].trim().to_string()))
}

/// The icon for a code block language.
#[must_use]
pub fn icon_for_language(language: &str) -> (String, IconSource) {
  let lowered = language.to_ascii_lowercase();

  if TERMINAL_LANGUAGES.contains(&lowered.as_str()) {
    return ("terminal-window".to_string(), IconSource::Phosphor);
  }

  LANGUAGE_ICONS
    .iter()
    .find(|(alias, _)| *alias == lowered)
    .map_or_else(
      || ("file".to_string(), IconSource::Phosphor),
      |(_, key)| ((*key).to_string(), IconSource::FileExtension),
    )
}

/// Language of `body` when it consists of exactly one fenced code block.
///
/// Returns `Some(None)` for a lone fence without a language and `None` when
/// the body is anything else.
fn sole_fence_language(body: &str) -> Option<Option<String>> {
  let trimmed = body.trim();
  let found = fences(trimmed);
  let [fence] = found.as_slice() else {
    return None;
  };
  if fence.start != 0 || fence.end != trimmed.len() {
    return None;
  }
  Some(parse_info(fence.info).language)
}

/// Resolve the icon for a titled container with Markdown `body`.
///
/// A manual `:icon:` prefix on `name` always wins. Otherwise an icon is derived
/// only when the body is a single fenced code block and nothing else.
#[must_use]
pub fn detect_icon(name: &str, body: &str) -> IconResolution {
  if let Some((icon, text)) = parse_manual_icon(name) {
    return IconResolution {
      text,
      icon: Some(icon),
      source: Some(IconSource::Phosphor),
    };
  }

  let Some(language) = sole_fence_language(body) else {
    return IconResolution::none(name.trim());
  };

  let (icon, source) = language.as_deref().map_or_else(
    || ("file".to_string(), IconSource::Phosphor),
    icon_for_language,
  );

  IconResolution {
    text:   name.trim().to_string(),
    icon:   Some(icon),
    source: Some(source),
  }
}

/// Render an icon element.
#[must_use]
pub fn icon_html(icon: &str, source: IconSource) -> String {
  let icon = escape_attr(icon);
  match source {
    IconSource::Phosphor => {
      format!(r#"<i class="ph ph-{icon}" aria-hidden="true"></i>"#)
    },
    IconSource::FileExtension => {
      format!(r#"<i class="file-icon file-icon-{icon}" aria-hidden="true"></i>"#)
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_manual_icon_syntax() {
    assert_eq!(
      parse_manual_icon(":star: Featured"),
      Some(("star".to_string(), "Featured".to_string()))
    );
    assert_eq!(parse_manual_icon("star: Featured"), None);
    assert_eq!(parse_manual_icon(":: Featured"), None);
    assert_eq!(parse_manual_icon(":star:Featured"), None);
  }

  #[test]
  fn test_manual_icon_wins_over_code_body() {
    let resolved = detect_icon(":star: Featured", "```js\nlet a;\n```");
    assert_eq!(resolved.icon.as_deref(), Some("star"));
    assert_eq!(resolved.source, Some(IconSource::Phosphor));
    assert_eq!(resolved.text, "Featured");
  }

  #[test]
  fn test_auto_detect_only_for_sole_fence() {
    let resolved = detect_icon("npm", "\n```js\nlet a;\n```\n\n");
    assert_eq!(resolved.icon.as_deref(), Some("js"));
    assert_eq!(resolved.source, Some(IconSource::FileExtension));

    let mixed = detect_icon("npm", "Intro\n\n```js\nlet a;\n```");
    assert_eq!(mixed.icon, None);

    let two = detect_icon("npm", "```js\na\n```\n```ts\nb\n```");
    assert_eq!(two.icon, None);
    assert_eq!(two.text, "npm");
  }

  #[test]
  fn test_malformed_manual_icon_passes_through() {
    let resolved = detect_icon(":star Featured", "plain text");
    assert_eq!(resolved.text, ":star Featured");
    assert_eq!(resolved.icon, None);
  }

  #[test]
  fn test_language_icons() {
    assert_eq!(icon_for_language("BASH"), ("terminal-window".to_string(), IconSource::Phosphor));
    assert_eq!(icon_for_language("powershell").0, "terminal-window");
    assert_eq!(icon_for_language("typescript"), ("ts".to_string(), IconSource::FileExtension));
    assert_eq!(icon_for_language("brainfuck"), ("file".to_string(), IconSource::Phosphor));
  }

  #[test]
  fn test_tagged_fence_language() {
    let resolved = detect_icon("Install", "```sh quire-block=2\nnpm i\n```");
    assert_eq!(resolved.icon.as_deref(), Some("terminal-window"));

    let bare = detect_icon("Raw", "```quire-block=3\ntext\n```");
    assert_eq!(bare.icon.as_deref(), Some("file"));
  }

  #[test]
  fn test_icon_html() {
    assert_eq!(
      icon_html("star", IconSource::Phosphor),
      r#"<i class="ph ph-star" aria-hidden="true"></i>"#
    );
    assert_eq!(
      icon_html("rs", IconSource::FileExtension),
      r#"<i class="file-icon file-icon-rs" aria-hidden="true"></i>"#
    );
  }
}
