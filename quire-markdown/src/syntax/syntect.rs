//! Syntect-based syntax highlighting backend enhanced with two-face.
//!
//! Emits class-based markup (`<span class="syn-keyword syn-rust">`) so that
//! per-line wrapping and theme switching are handled in HTML and CSS. The
//! syntax definitions come from two-face, which extends syntect's defaults
//! with the grammars bundled by `bat`.

use std::sync::OnceLock;

use syntect::{
  highlighting::Theme,
  html::{ClassStyle, ClassedHTMLGenerator, css_for_theme_with_class_style},
  parsing::SyntaxSet,
  util::LinesWithEndings,
};
use two_face::{
  re_exports::syntect::highlighting::ThemeSet,
  theme::{EmbeddedLazyThemeSet, EmbeddedThemeName},
};

use super::{
  error::{SyntaxError, SyntaxResult},
  types::{SyntaxConfig, SyntaxHighlighter, SyntaxManager},
};

/// Prefix for every token class, keeping them apart from the line classes
/// (`line`, `error`, `warning`, ...).
const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "syn-" };

const DEFAULT_THEME: &str = "InspiredGitHub";

const EMBEDDED_THEMES: &[&str] = &[
  "Ansi",
  "Base16",
  "Base16EightiesDark",
  "Base16MochaDark",
  "Base16OceanDark",
  "Base16OceanLight",
  "Base16_256",
  "ColdarkCold",
  "ColdarkDark",
  "DarkNeon",
  "Dracula",
  "Github",
  "GruvboxDark",
  "GruvboxLight",
  "InspiredGithub",
  "Leet",
  "MonokaiExtended",
  "MonokaiExtendedBright",
  "MonokaiExtendedLight",
  "MonokaiExtendedOrigin",
  "Nord",
  "OneHalfDark",
  "OneHalfLight",
  "SolarizedDark",
  "SolarizedLight",
  "SublimeSnazzy",
  "TwoDark",
  "VisualStudioDarkPlus",
  "Zenburn",
];

fn embedded_theme(name: &str) -> Option<EmbeddedThemeName> {
  let theme = match name {
    "Ansi" => EmbeddedThemeName::Ansi,
    "Base16" => EmbeddedThemeName::Base16,
    "Base16EightiesDark" => EmbeddedThemeName::Base16EightiesDark,
    "Base16MochaDark" => EmbeddedThemeName::Base16MochaDark,
    "Base16OceanDark" => EmbeddedThemeName::Base16OceanDark,
    "Base16OceanLight" => EmbeddedThemeName::Base16OceanLight,
    "Base16_256" => EmbeddedThemeName::Base16_256,
    "ColdarkCold" => EmbeddedThemeName::ColdarkCold,
    "ColdarkDark" => EmbeddedThemeName::ColdarkDark,
    "DarkNeon" => EmbeddedThemeName::DarkNeon,
    "Dracula" => EmbeddedThemeName::Dracula,
    "Github" => EmbeddedThemeName::Github,
    "GruvboxDark" => EmbeddedThemeName::GruvboxDark,
    "GruvboxLight" => EmbeddedThemeName::GruvboxLight,
    "InspiredGithub" => EmbeddedThemeName::InspiredGithub,
    "Leet" => EmbeddedThemeName::Leet,
    "MonokaiExtended" => EmbeddedThemeName::MonokaiExtended,
    "MonokaiExtendedBright" => EmbeddedThemeName::MonokaiExtendedBright,
    "MonokaiExtendedLight" => EmbeddedThemeName::MonokaiExtendedLight,
    "MonokaiExtendedOrigin" => EmbeddedThemeName::MonokaiExtendedOrigin,
    "Nord" => EmbeddedThemeName::Nord,
    "OneHalfDark" => EmbeddedThemeName::OneHalfDark,
    "OneHalfLight" => EmbeddedThemeName::OneHalfLight,
    "SolarizedDark" => EmbeddedThemeName::SolarizedDark,
    "SolarizedLight" => EmbeddedThemeName::SolarizedLight,
    "SublimeSnazzy" => EmbeddedThemeName::SublimeSnazzy,
    "TwoDark" => EmbeddedThemeName::TwoDark,
    "VisualStudioDarkPlus" => EmbeddedThemeName::VisualStudioDarkPlus,
    "Zenburn" => EmbeddedThemeName::Zenburn,
    _ => return None,
  };
  Some(theme)
}

/// Syntect-based syntax highlighter
#[derive(Debug, Default, Clone, Copy)]
pub struct SyntectHighlighter;

impl SyntectHighlighter {
  fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(two_face::syntax::extra_newlines)
  }

  fn theme_set() -> &'static EmbeddedLazyThemeSet {
    static THEME_SET: OnceLock<EmbeddedLazyThemeSet> = OnceLock::new();
    THEME_SET.get_or_init(two_face::theme::extra)
  }

  fn default_theme_set() -> &'static ThemeSet {
    static DEFAULT_THEME_SET: OnceLock<ThemeSet> = OnceLock::new();
    DEFAULT_THEME_SET.get_or_init(ThemeSet::load_defaults)
  }

  /// Look a theme up in syntect's defaults first, then in two-face's set.
  fn find_theme(name: &str) -> Option<&'static Theme> {
    Self::default_theme_set()
      .themes
      .get(name)
      .or_else(|| embedded_theme(name).map(|theme| Self::theme_set().get(theme)))
  }
}

impl SyntaxHighlighter for SyntectHighlighter {
  fn name(&self) -> &'static str {
    "Syntect"
  }

  fn supported_languages(&self) -> Vec<String> {
    Self::syntax_set()
      .syntaxes()
      .iter()
      .flat_map(|syntax| {
        std::iter::once(syntax.name.to_lowercase())
          .chain(syntax.file_extensions.iter().map(|ext| ext.to_lowercase()))
      })
      .collect()
  }

  fn available_themes(&self) -> Vec<String> {
    let mut themes: Vec<String> =
      Self::default_theme_set().themes.keys().cloned().collect();
    themes.extend(EMBEDDED_THEMES.iter().map(|name| (*name).to_string()));
    themes.sort();
    themes.dedup();
    themes
  }

  fn supports_language(&self, language: &str) -> bool {
    Self::syntax_set().find_syntax_by_token(language).is_some()
  }

  fn highlight(&self, code: &str, language: &str) -> SyntaxResult<String> {
    let syntax_set = Self::syntax_set();
    let syntax = syntax_set
      .find_syntax_by_token(language)
      .unwrap_or_else(|| syntax_set.find_syntax_plain_text());

    let mut generator =
      ClassedHTMLGenerator::new_with_class_style(syntax, syntax_set, CLASS_STYLE);
    for line in LinesWithEndings::from(code) {
      generator
        .parse_html_for_line_which_includes_newline(line)
        .map_err(|e| SyntaxError::HighlightingFailed(e.to_string()))?;
    }
    Ok(generator.finalize())
  }

  fn theme_css(&self, theme: Option<&str>) -> SyntaxResult<Option<String>> {
    let name = theme.unwrap_or(DEFAULT_THEME);
    let theme =
      Self::find_theme(name).ok_or_else(|| SyntaxError::ThemeNotFound(name.to_string()))?;

    css_for_theme_with_class_style(theme, CLASS_STYLE)
      .map(Some)
      .map_err(|e| SyntaxError::HighlightingFailed(e.to_string()))
  }
}

/// Create a Syntect-based syntax manager.
#[must_use]
pub fn create_syntect_manager(theme: Option<String>) -> SyntaxManager {
  let config = SyntaxConfig {
    default_theme: theme.or_else(|| Some(DEFAULT_THEME.to_string())),
    ..SyntaxConfig::default()
  };
  SyntaxManager::new(Box::new(SyntectHighlighter), config)
}
