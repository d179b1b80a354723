//! Core implementation of the Markdown processor.
//!
//! Holds the render pipeline (preprocessors, conversion, postprocessors) and
//! the comrak-based converter that sits between the two processor phases.
use std::{
  borrow::Cow,
  path::{Path, PathBuf},
};

use comrak::{
  Arena,
  nodes::{AstNode, NodeValue},
  options::Options,
  parse_document,
};
use log::trace;
use walkdir::WalkDir;

use super::{
  registry::{Processor, ProcessorRegistry},
  types::{MarkdownOptions, MarkdownProcessor, TabStyle},
};
use crate::{
  code::{CodeBlockFeatures, features::split_block_tag, render_code_block},
  context::ProcessingContext,
  syntax::{SyntaxManager, create_default_manager, create_plain_manager},
  types::MarkdownResult,
};

impl MarkdownProcessor {
  /// Create a new `MarkdownProcessor` with every built-in component.
  #[must_use]
  pub fn new(options: MarkdownOptions) -> Self {
    Self::with_registry(options, ProcessorRegistry::with_builtins())
  }

  /// Create a processor running exactly the processors in `registry`.
  #[must_use]
  pub fn with_registry(
    options: MarkdownOptions,
    registry: ProcessorRegistry,
  ) -> Self {
    let converter = Converter::new(&options);
    Self {
      options,
      registry,
      converter,
    }
  }

  /// Access processor options.
  #[must_use]
  pub const fn options(&self) -> &MarkdownOptions {
    &self.options
  }

  /// Access the processor chain.
  #[must_use]
  pub const fn registry(&self) -> &ProcessorRegistry {
    &self.registry
  }

  /// Add a processor to the chain. Must happen before rendering starts.
  pub fn register<P: Processor + 'static>(&mut self, processor: P) {
    self.registry.register(processor);
  }

  /// Set the directory snippet imports resolve against.
  #[must_use]
  pub fn with_docs_root(mut self, docs_root: &Path) -> Self {
    self.options.docs_root = Some(docs_root.to_path_buf());
    self
  }

  /// Stylesheet for the highlighting theme, if the backend has one.
  #[must_use]
  pub fn theme_css(&self) -> Option<String> {
    self
      .converter
      .syntax()
      .theme_css(self.options.highlight_theme.as_deref())
      .unwrap_or_else(|e| {
        log::warn!("Could not generate highlighting stylesheet: {e}");
        None
      })
  }

  /// Render Markdown to HTML, collecting headers, title and imported files.
  #[must_use]
  pub fn render(&self, markdown: &str) -> MarkdownResult {
    let content = strip_front_matter(markdown);
    let mut ctx = ProcessingContext::new(
      &self.registry,
      &self.converter,
      self.options.docs_root.as_deref(),
    );

    let preprocessed = self.registry.run_preprocessors(content, &mut ctx);
    let converted = self.converter.convert(&preprocessed, &ctx.code_blocks);
    let html = self.registry.run_postprocessors(&converted, &mut ctx);

    trace!(
      "Rendered document with {} code blocks and {} headers",
      ctx.code_blocks.len(),
      ctx.headers.len()
    );

    let title = ctx
      .headers
      .iter()
      .find(|header| header.level == 1)
      .map(|header| header.text.clone());

    MarkdownResult {
      html,
      headers: ctx.headers,
      title,
      included_files: ctx.included_files,
    }
  }
}

/// Markdown to HTML conversion with code blocks rendered by
/// [`render_code_block`].
pub struct Converter {
  gfm:          bool,
  line_numbers: bool,
  tab_style:    TabStyle,
  syntax:       SyntaxManager,
}

impl Converter {
  /// Build a converter, falling back to plain code rendering when no
  /// highlighting backend is available.
  #[must_use]
  pub fn new(options: &MarkdownOptions) -> Self {
    let syntax = if options.highlight_code {
      create_default_manager(options.highlight_theme.clone()).unwrap_or_else(
        |e| {
          log::warn!("Syntax highlighting unavailable: {e}");
          create_plain_manager()
        },
      )
    } else {
      create_plain_manager()
    };

    Self {
      gfm: options.gfm,
      line_numbers: options.line_numbers,
      tab_style: options.tab_style,
      syntax,
    }
  }

  #[must_use]
  pub const fn syntax(&self) -> &SyntaxManager {
    &self.syntax
  }

  /// Convert Markdown to HTML.
  ///
  /// Fenced code blocks tagged by the code block extractor take their
  /// features from `blocks`; untagged ones are parsed on the spot.
  #[must_use]
  pub fn convert(&self, markdown: &str, blocks: &[CodeBlockFeatures]) -> String {
    let arena = Arena::new();
    let options = comrak_options(self.gfm);
    let root = parse_document(&arena, markdown, &options);

    CodeBlockTransformer {
      converter: self,
      blocks,
    }
    .transform(root);

    let mut html_output = String::new();
    if let Err(e) = comrak::format_html(root, &options, &mut html_output) {
      log::error!("Failed to format HTML: {e}");
    }
    html_output
  }

  fn render_code(
    &self,
    info: &str,
    literal: &str,
    blocks: &[CodeBlockFeatures],
  ) -> String {
    let (bare_info, id) = split_block_tag(info);

    let (features, code) = match id.and_then(|id| blocks.get(id)) {
      Some(features) => (features.clone(), Cow::Borrowed(literal)),
      None => {
        if id.is_some() {
          log::warn!("No features recorded for code block tagged {info:?}");
        }
        let (features, cleaned) = CodeBlockFeatures::from_fence(bare_info, literal);
        (features, Cow::Owned(cleaned))
      },
    };

    let code = self.handle_hard_tabs(code);
    render_code_block(&code, &features, &self.syntax, self.line_numbers)
  }

  fn handle_hard_tabs<'c>(&self, code: Cow<'c, str>) -> Cow<'c, str> {
    if !code.contains('\t') {
      return code;
    }
    match self.tab_style {
      TabStyle::None => code,
      TabStyle::Warn => {
        log::warn!("Hard tabs detected in code block");
        code
      },
      TabStyle::Normalize => Cow::Owned(code.replace('\t', "  ")),
    }
  }
}

/// Trait for AST transformations applied between parsing and formatting.
pub trait AstTransformer {
  fn transform<'a>(&self, node: &'a AstNode<'a>);
}

/// Replaces every code block node with the rendered code block HTML.
struct CodeBlockTransformer<'c> {
  converter: &'c Converter,
  blocks:    &'c [CodeBlockFeatures],
}

impl AstTransformer for CodeBlockTransformer<'_> {
  fn transform<'a>(&self, node: &'a AstNode<'a>) {
    for child in node.children() {
      {
        let mut data = child.data.borrow_mut();
        if let NodeValue::CodeBlock(ref block) = data.value {
          let mut html =
            self
              .converter
              .render_code(&block.info, &block.literal, self.blocks);
          html.push('\n');
          data.value = NodeValue::HtmlInline(html);
        }
      }
      self.transform(child);
    }
  }
}

/// Build comrak options.
fn comrak_options(gfm: bool) -> Options<'static> {
  let mut options = Options::default();
  if gfm {
    options.extension.table = true;
    options.extension.footnotes = true;
    options.extension.strikethrough = true;
    options.extension.tasklist = true;
    options.extension.autolink = true;
  }
  options.render.r#unsafe = true;
  options.extension.header_ids = None;
  options
}

/// Strip a leading `---` delimited front matter block.
#[must_use]
pub fn strip_front_matter(markdown: &str) -> &str {
  let Some(rest) = markdown
    .strip_prefix("---\n")
    .or_else(|| markdown.strip_prefix("---\r\n"))
  else {
    return markdown;
  };

  let mut offset = 0;
  for line in rest.split_inclusive('\n') {
    offset += line.len();
    if line.trim_end() == "---" {
      return &rest[offset..];
    }
  }

  markdown
}

/// Collect all markdown files from the input directory, sorted by path.
///
/// Hidden directories are skipped.
#[must_use]
pub fn collect_markdown_files(input_dir: &Path) -> Vec<PathBuf> {
  let mut files: Vec<PathBuf> = WalkDir::new(input_dir)
    .follow_links(true)
    .into_iter()
    .filter_entry(|entry| {
      entry.depth() == 0
        || !entry.file_name().to_str().is_some_and(|name| name.starts_with('.'))
    })
    .filter_map(Result::ok)
    .filter(|entry| {
      entry.file_type().is_file()
        && entry.path().extension().is_some_and(|ext| ext == "md")
    })
    .map(walkdir::DirEntry::into_path)
    .collect();

  files.sort();
  trace!("Found {} markdown files to process", files.len());
  files
}

#[cfg(test)]
mod tests {
  use super::*;

  fn plain() -> MarkdownOptions {
    MarkdownOptions {
      highlight_code: false,
      ..Default::default()
    }
  }

  #[test]
  fn test_strip_front_matter() {
    assert_eq!(strip_front_matter("---\ntitle: x\n---\n# Hi\n"), "# Hi\n");
    assert_eq!(strip_front_matter("# Hi\n---\n"), "# Hi\n---\n");
    assert_eq!(strip_front_matter("---\nnever closed\n"), "---\nnever closed\n");
  }

  #[test]
  fn test_front_matter_not_rendered() {
    let processor = MarkdownProcessor::new(plain());
    let result = processor.render("---\ntitle: Secret\n---\n# Visible\n");
    assert!(!result.html.contains("Secret"));
    assert_eq!(result.title.as_deref(), Some("Visible"));
  }

  #[test]
  fn test_converter_renders_untagged_block_with_markers() {
    let converter = Converter::new(&plain());
    let html = converter.convert("```js {1}\na // [!code focus]\n```\n", &[]);
    assert!(html.contains("<span class=\"line highlighted focus\">a</span>"), "got {html}");
    assert!(!html.contains("[!code"));
  }

  #[test]
  fn test_converter_uses_recorded_features() {
    let converter = Converter::new(&plain());
    let features = CodeBlockFeatures {
      language: Some("py".to_string()),
      title: Some("main.py".to_string()),
      ..CodeBlockFeatures::default()
    };
    let html = converter.convert("```py quire-block=0\nprint()\n```\n", &[features]);
    assert!(html.contains("quire-code-title\">main.py"));
    assert!(html.contains("class=\"language-py\""));
  }

  #[test]
  fn test_gfm_tables_and_strikethrough() {
    let processor = MarkdownProcessor::new(plain());
    let result = processor.render("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~\n");
    assert!(result.html.contains("<table>"));
    assert!(result.html.contains("<del>gone</del>"));
  }

  #[test]
  fn test_hardtab_handling() {
    let markdown = "```rust\nfn main() {\n\tprintln!(\"hi\");\n}\n```\n";

    for (style, keeps_tab) in [
      (TabStyle::None, true),
      (TabStyle::Warn, true),
      (TabStyle::Normalize, false),
    ] {
      let processor = MarkdownProcessor::new(MarkdownOptions {
        tab_style: style,
        ..plain()
      });
      let html = processor.render(markdown).html;
      assert_eq!(html.contains("\tprintln"), keeps_tab, "{style:?}");
      if !keeps_tab {
        assert!(html.contains("  println"));
      }
    }
  }

  #[test]
  fn test_collect_markdown_files() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let root = dir.path();
    std::fs::create_dir_all(root.join("guide")).ok();
    std::fs::create_dir_all(root.join(".hidden")).ok();
    for file in ["index.md", "guide/b.md", "guide/a.md", ".hidden/x.md", "notes.txt"] {
      std::fs::write(root.join(file), "# x").ok();
    }

    let files = collect_markdown_files(root);
    let names: Vec<_> = files
      .iter()
      .filter_map(|p| p.strip_prefix(root).ok())
      .map(|p| p.to_string_lossy().replace('\\', "/"))
      .collect();
    assert_eq!(names, vec!["guide/a.md", "guide/b.md", "index.md"]);
  }
}
