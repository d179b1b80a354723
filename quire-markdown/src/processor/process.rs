//! Processing entry points with error recovery.
use std::{fs, path::Path};

use log::error;

use super::types::{MarkdownOptions, MarkdownProcessor};
use crate::types::MarkdownResult;

/// Render `content`, turning a panic anywhere in the pipeline into an error
/// page instead of taking the caller down.
#[must_use]
pub fn process_with_recovery(
  processor: &MarkdownProcessor,
  content: &str,
) -> MarkdownResult {
  match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
    processor.render(content)
  })) {
    Ok(result) => result,
    Err(panic_err) => {
      error!("Panic during markdown processing: {}", panic_message(&*panic_err));
      MarkdownResult {
        html: "<div class=\"quire-error\" role=\"alert\">Critical error \
               processing markdown content</div>"
          .to_string(),

        headers:        Vec::new(),
        title:          None,
        included_files: Vec::new(),
      }
    },
  }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
  payload
    .downcast_ref::<String>()
    .map(String::as_str)
    .or_else(|| payload.downcast_ref::<&str>().copied())
    .unwrap_or("unknown error")
}

/// Render a Markdown string with default options.
#[must_use]
pub fn process_markdown_string(content: &str) -> MarkdownResult {
  let processor = MarkdownProcessor::new(MarkdownOptions::default());
  process_with_recovery(&processor, content)
}

/// Read and render a Markdown file, resolving snippet imports against the
/// file's directory.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn process_markdown_file(
  file_path: &Path,
  options: MarkdownOptions,
) -> Result<MarkdownResult, String> {
  let content = fs::read_to_string(file_path).map_err(|e| {
    format!("Failed to read file {}: {}", file_path.display(), e)
  })?;

  let docs_root = file_path.parent().unwrap_or_else(|| Path::new("."));
  let processor = MarkdownProcessor::new(options).with_docs_root(docs_root);
  Ok(process_with_recovery(&processor, &content))
}
