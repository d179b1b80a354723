//! Per-document state threaded through preprocess, convert and postprocess.

use std::path::Path;

use crate::{
  code::CodeBlockFeatures,
  processor::{Converter, ProcessorRegistry},
  types::{Header, IncludedSnippet},
};

/// Nesting limit for [`ProcessingContext::render_markdown`].
pub const MAX_RENDER_DEPTH: usize = 32;

/// State for one render of one document.
///
/// Created fresh by every [`crate::MarkdownProcessor::render`] call and never
/// shared between documents.
pub struct ProcessingContext<'a> {
  registry:  &'a ProcessorRegistry,
  converter: &'a Converter,
  docs_root: Option<&'a Path>,
  depth:     usize,

  /// Features of every extracted code block, indexed by block id.
  pub code_blocks:    Vec<CodeBlockFeatures>,
  /// Headers collected by the heading processor.
  pub headers:        Vec<Header>,
  /// Files pulled in by snippet directives.
  pub included_files: Vec<IncludedSnippet>,
}

impl<'a> ProcessingContext<'a> {
  #[must_use]
  pub const fn new(
    registry: &'a ProcessorRegistry,
    converter: &'a Converter,
    docs_root: Option<&'a Path>,
  ) -> Self {
    Self {
      registry,
      converter,
      docs_root,
      depth: 0,
      code_blocks: Vec::new(),
      headers: Vec::new(),
      included_files: Vec::new(),
    }
  }

  /// Directory that `<<< @/...` paths are resolved against.
  #[must_use]
  pub const fn docs_root(&self) -> Option<&'a Path> {
    self.docs_root
  }

  #[must_use]
  pub const fn converter(&self) -> &'a Converter {
    self.converter
  }

  /// Render a Markdown fragment (a container body) to HTML.
  ///
  /// The fragment runs through the whole preprocessor chain and the
  /// converter, so nested components and code blocks work inside it.
  /// Postprocessors are not run: they see the fragment later as part of the
  /// page.
  pub fn render_markdown(&mut self, markdown: &str) -> String {
    if self.depth >= MAX_RENDER_DEPTH {
      log::warn!(
        "Component nesting deeper than {MAX_RENDER_DEPTH} levels, rendering \
         the remainder without components"
      );
      return self.converter.convert(markdown, &self.code_blocks);
    }

    let registry = self.registry;
    self.depth += 1;
    let preprocessed = registry.run_preprocessors(markdown, self);
    self.depth -= 1;

    self.converter.convert(&preprocessed, &self.code_blocks)
  }
}
