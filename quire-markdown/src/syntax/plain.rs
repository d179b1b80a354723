//! Highlighter that only escapes HTML.

use super::{error::SyntaxResult, types::SyntaxHighlighter};
use crate::utils::html::escape_html;

/// Backend used when highlighting is disabled or no real backend is compiled
/// in. Accepts every language and emits no token spans.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainHighlighter;

impl SyntaxHighlighter for PlainHighlighter {
  fn name(&self) -> &'static str {
    "Plain"
  }

  fn supported_languages(&self) -> Vec<String> {
    Vec::new()
  }

  fn available_themes(&self) -> Vec<String> {
    Vec::new()
  }

  fn supports_language(&self, _language: &str) -> bool {
    true
  }

  fn highlight(&self, code: &str, _language: &str) -> SyntaxResult<String> {
    Ok(escape_html(code))
  }

  fn theme_css(&self, _theme: Option<&str>) -> SyntaxResult<Option<String>> {
    Ok(None)
  }
}
