//! Trait-based syntax highlighting with pluggable backends.
//!
//! - **Syntect** (feature `syntect`, default) uses Sublime Text syntax
//!   definitions, extended through two-face.
//! - **Plain** escapes HTML and nothing else. It is used when highlighting is
//!   switched off or no backend is compiled in.

pub mod error;
mod plain;
pub mod types;

pub use error::{SyntaxError, SyntaxResult};
pub use plain::PlainHighlighter;
pub use types::{SyntaxConfig, SyntaxHighlighter, SyntaxManager};

#[cfg(feature = "syntect")] mod syntect;
#[cfg(feature = "syntect")] pub use syntect::*;

/// Create the default syntax manager based on available features.
///
/// # Errors
///
/// Returns [`SyntaxError::NoBackendAvailable`] when built without the
/// `syntect` feature.
pub fn create_default_manager(
  theme: Option<String>,
) -> SyntaxResult<SyntaxManager> {
  #[cfg(feature = "syntect")]
  {
    Ok(create_syntect_manager(theme))
  }

  #[cfg(not(feature = "syntect"))]
  {
    let _ = theme;
    Err(SyntaxError::NoBackendAvailable)
  }
}

/// A manager that only escapes code.
#[must_use]
pub fn create_plain_manager() -> SyntaxManager {
  SyntaxManager::with_highlighter(Box::new(PlainHighlighter))
}
