//! Core types and traits for syntax highlighting.

use std::collections::HashMap;

use super::error::{SyntaxError, SyntaxResult};
use crate::utils::html::escape_html;

/// Trait for syntax highlighting backends.
///
/// Backends emit class-based markup: every token is a `<span>` carrying CSS
/// classes, and colors come from the stylesheet returned by
/// [`SyntaxHighlighter::theme_css`]. A token span may contain newlines; the
/// code renderer splits those itself.
pub trait SyntaxHighlighter: Send + Sync {
  /// Get the name of this highlighter backend
  fn name(&self) -> &'static str;

  /// Get a list of supported languages
  fn supported_languages(&self) -> Vec<String>;

  /// Get a list of available themes
  fn available_themes(&self) -> Vec<String>;

  /// Check if a language is supported
  fn supports_language(&self, language: &str) -> bool {
    self
      .supported_languages()
      .iter()
      .any(|lang| lang.eq_ignore_ascii_case(language))
  }

  /// Highlight `code` as `language`, returning HTML with token spans.
  ///
  /// The output must escape everything that is not markup.
  fn highlight(&self, code: &str, language: &str) -> SyntaxResult<String>;

  /// Stylesheet for the class names emitted by [`Self::highlight`].
  ///
  /// Returns `Ok(None)` for backends that emit no token classes.
  fn theme_css(&self, theme: Option<&str>) -> SyntaxResult<Option<String>>;
}

/// Configuration for syntax highlighting
#[derive(Debug, Clone)]
pub struct SyntaxConfig {
  /// Theme used for the generated stylesheet when none is given
  pub default_theme: Option<String>,

  /// Language aliases for mapping common names to supported languages
  pub language_aliases: HashMap<String, String>,

  /// Whether to fall back to plain text for unsupported languages
  pub fallback_to_plain: bool,
}

impl Default for SyntaxConfig {
  fn default() -> Self {
    let language_aliases = [
      ("js", "javascript"),
      ("mjs", "javascript"),
      ("ts", "typescript"),
      ("py", "python"),
      ("rb", "ruby"),
      ("rs", "rust"),
      ("sh", "bash"),
      ("shell", "bash"),
      ("zsh", "bash"),
      ("console", "bash"),
      ("yml", "yaml"),
      ("md", "markdown"),
      ("ps1", "powershell"),
    ]
    .into_iter()
    .map(|(alias, language)| (alias.to_string(), language.to_string()))
    .collect();

    Self {
      default_theme: None,
      language_aliases,
      fallback_to_plain: true,
    }
  }
}

/// High-level syntax highlighting manager.
///
/// Wraps a backend with language alias resolution and a plain-text fallback.
pub struct SyntaxManager {
  highlighter: Box<dyn SyntaxHighlighter>,
  config:      SyntaxConfig,
}

impl std::fmt::Debug for SyntaxManager {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SyntaxManager")
      .field("highlighter", &self.highlighter.name())
      .field("config", &self.config)
      .finish()
  }
}

impl SyntaxManager {
  /// Create a new syntax manager with the given highlighter and config
  #[must_use]
  pub fn new(
    highlighter: Box<dyn SyntaxHighlighter>,
    config: SyntaxConfig,
  ) -> Self {
    Self {
      highlighter,
      config,
    }
  }

  /// Create a new syntax manager with the default configuration
  #[must_use]
  pub fn with_highlighter(highlighter: Box<dyn SyntaxHighlighter>) -> Self {
    Self::new(highlighter, SyntaxConfig::default())
  }

  /// Resolve a language name using aliases
  #[must_use]
  pub fn resolve_language(&self, language: &str) -> String {
    let lowered = language.to_ascii_lowercase();
    self
      .config
      .language_aliases
      .get(&lowered)
      .cloned()
      .unwrap_or(lowered)
  }

  /// Highlight code with automatic language resolution and fallback.
  ///
  /// # Errors
  ///
  /// Returns an error if the backend fails, or if the language is unsupported
  /// and plain-text fallback is disabled.
  pub fn highlight_code(
    &self,
    code: &str,
    language: &str,
  ) -> SyntaxResult<String> {
    let resolved_language = self.resolve_language(language);

    if self.highlighter.supports_language(&resolved_language) {
      return self.highlighter.highlight(code, &resolved_language);
    }

    if self.config.fallback_to_plain {
      log::debug!(
        "Language '{resolved_language}' not supported by {}, rendering as \
         plain text",
        self.highlighter.name()
      );
      return Ok(escape_html(code));
    }

    Err(SyntaxError::UnsupportedLanguage(resolved_language))
  }

  /// Stylesheet for `theme`, or for the configured default theme.
  ///
  /// # Errors
  ///
  /// Returns an error if the backend cannot produce a stylesheet.
  pub fn theme_css(&self, theme: Option<&str>) -> SyntaxResult<Option<String>> {
    self
      .highlighter
      .theme_css(theme.or(self.config.default_theme.as_deref()))
  }
}
