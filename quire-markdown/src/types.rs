//! Types for the public API.
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Represents a header in a Markdown document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Header {
  /// Header text with markup stripped.
  pub text:  String,
  /// Header level (1-6).
  pub level: u8,
  /// Anchor id assigned to the header.
  pub id:    String,
}

/// A file pulled in by a `<<< @/path` directive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IncludedSnippet {
  /// Path relative to the docs root, as written in the directive.
  pub path:     String,
  /// Resolved path on disk.
  pub resolved: PathBuf,
  /// The `{...}` suffix, if any.
  pub selector: Option<String>,
}

/// Result of Markdown processing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarkdownResult {
  /// Rendered HTML output.
  pub html: String,

  /// Headers outside tab panels, in document order (the table of contents).
  pub headers: Vec<Header>,

  /// Title of the document: the first level-1 header.
  pub title: Option<String>,

  /// Files imported through snippet directives.
  pub included_files: Vec<IncludedSnippet>,
}
