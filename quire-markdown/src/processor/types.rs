//! Type definitions for the Markdown processor.
//!
//! # Examples
//!
//! ```
//! use quire_markdown::{MarkdownOptions, MarkdownProcessor};
//!
//! let options = MarkdownOptions {
//!   highlight_code: false,
//!   line_numbers: true,
//!   ..Default::default()
//! };
//!
//! let processor = MarkdownProcessor::new(options);
//! let result = processor.render(":::tip\nUse the `--jobs` flag.\n:::");
//! assert!(result.html.contains("quire-callout-tip"));
//! ```

use std::path::PathBuf;

use super::{core::Converter, registry::ProcessorRegistry};

/// Options for configuring the Markdown processor.
#[derive(Debug, Clone)]
#[allow(
  clippy::struct_excessive_bools,
  reason = "Config struct with related boolean flags"
)]
pub struct MarkdownOptions {
  /// Enable GitHub Flavored Markdown (GFM) extensions.
  pub gfm: bool,

  /// Enable syntax highlighting for code blocks.
  pub highlight_code: bool,

  /// Optional: syntax highlighting theme for the generated stylesheet.
  pub highlight_theme: Option<String>,

  /// Show line numbers on code blocks that do not say otherwise.
  pub line_numbers: bool,

  /// How to handle hard tabs in code blocks.
  pub tab_style: TabStyle,

  /// Directory that `<<< @/path` snippet imports resolve against. Imports
  /// fail with an inline error when unset.
  pub docs_root: Option<PathBuf>,
}

/// Configuration for handling hard tabs in code blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TabStyle {
  /// Leave hard tabs unchanged
  #[default]
  None,
  /// Issue a warning when hard tabs are detected
  Warn,
  /// Automatically convert hard tabs to spaces (using 2 spaces per tab)
  Normalize,
}

impl Default for MarkdownOptions {
  fn default() -> Self {
    Self {
      gfm:             true,
      highlight_code:  cfg!(feature = "syntect"),
      highlight_theme: None,
      line_numbers:    false,
      tab_style:       TabStyle::None,
      docs_root:       None,
    }
  }
}

/// Main Markdown processor.
///
/// Immutable once built, so one instance can render many documents from many
/// threads at once; every render gets its own
/// [`crate::ProcessingContext`].
pub struct MarkdownProcessor {
  pub(crate) options:   MarkdownOptions,
  pub(crate) registry:  ProcessorRegistry,
  pub(crate) converter: Converter,
}

impl std::fmt::Debug for MarkdownProcessor {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("MarkdownProcessor")
      .field("options", &self.options)
      .field("registry", &self.registry)
      .finish_non_exhaustive()
  }
}

/// Builder for constructing `MarkdownOptions` with method chaining.
#[derive(Debug, Clone)]
pub struct MarkdownOptionsBuilder {
  options: MarkdownOptions,
}

impl MarkdownOptionsBuilder {
  /// Create a new builder with default options.
  #[must_use]
  pub fn new() -> Self {
    Self {
      options: MarkdownOptions::default(),
    }
  }

  /// Enable or disable GitHub Flavored Markdown.
  #[must_use]
  pub const fn gfm(mut self, enabled: bool) -> Self {
    self.options.gfm = enabled;
    self
  }

  /// Enable or disable syntax highlighting.
  #[must_use]
  pub const fn highlight_code(mut self, enabled: bool) -> Self {
    self.options.highlight_code = enabled;
    self
  }

  /// Set the highlighting theme.
  #[must_use]
  pub fn highlight_theme<S: Into<String>>(mut self, theme: Option<S>) -> Self {
    self.options.highlight_theme = theme.map(Into::into);
    self
  }

  /// Show line numbers by default.
  #[must_use]
  pub const fn line_numbers(mut self, enabled: bool) -> Self {
    self.options.line_numbers = enabled;
    self
  }

  /// Set the hard tab handling.
  #[must_use]
  pub const fn tab_style(mut self, style: TabStyle) -> Self {
    self.options.tab_style = style;
    self
  }

  /// Set the snippet docs root.
  #[must_use]
  pub fn docs_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
    self.options.docs_root = Some(root.into());
    self
  }

  /// Build the final options.
  #[must_use]
  pub fn build(self) -> MarkdownOptions {
    self.options
  }
}

impl Default for MarkdownOptionsBuilder {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_builder_sets_every_field() {
    let options = MarkdownOptionsBuilder::new()
      .gfm(false)
      .highlight_code(false)
      .highlight_theme(Some("Nord"))
      .line_numbers(true)
      .tab_style(TabStyle::Normalize)
      .docs_root("/docs")
      .build();

    assert!(!options.gfm);
    assert!(!options.highlight_code);
    assert_eq!(options.highlight_theme.as_deref(), Some("Nord"));
    assert!(options.line_numbers);
    assert_eq!(options.tab_style, TabStyle::Normalize);
    assert_eq!(options.docs_root, Some(PathBuf::from("/docs")));
  }

  #[test]
  fn test_processor_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<MarkdownProcessor>();
  }
}
