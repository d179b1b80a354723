//! # Quire Markdown
//!
//! The Markdown pipeline behind the Quire documentation generator: comrak
//! plus an ordered chain of component processors for callouts, tabs, code
//! groups, steps, cards, accordions, badges, icons and annotated code blocks.
//!
//! ## Quick Start
//!
//! ```rust
//! use quire_markdown::{MarkdownOptions, MarkdownProcessor};
//!
//! let processor = MarkdownProcessor::new(MarkdownOptions::default());
//! let result = processor.render("# Hello\n\n:::note\nThis is **bold** text.\n:::");
//!
//! assert_eq!(result.title.as_deref(), Some("Hello"));
//! assert!(result.html.contains("quire-callout-note"));
//! ```
//!
//! ## Pipeline
//!
//! Every render runs three phases over one [`ProcessingContext`]:
//!
//! 1. preprocessors rewrite the raw Markdown in ascending priority order,
//!    recording code block features and imported files in the context
//! 2. comrak converts the result, with fenced code blocks rendered from the
//!    recorded features
//! 3. postprocessors rewrite the page HTML (heading anchors, GitHub alerts,
//!    badges, icons)
//!
//! Custom syntax inside fenced code blocks is never touched.
//!
//! ## Custom processors
//!
//! ```rust
//! use quire_markdown::{MarkdownOptions, MarkdownProcessor, ProcessingContext, Processor};
//!
//! struct Shout;
//!
//! impl Processor for Shout {
//!   fn name(&self) -> &'static str {
//!     "shout"
//!   }
//!
//!   fn postprocess(&self, html: &str, _ctx: &mut ProcessingContext<'_>) -> String {
//!     html.replace("hello", "HELLO")
//!   }
//! }
//!
//! let mut processor = MarkdownProcessor::new(MarkdownOptions::default());
//! processor.register(Shout);
//! assert!(processor.render("hello").html.contains("HELLO"));
//! ```

pub mod code;
pub mod components;
pub mod context;
pub mod patterns;
pub mod processor;
pub mod syntax;
mod types;
pub mod utils;

pub use crate::{
  context::ProcessingContext,
  processor::{
    MarkdownOptions,
    MarkdownOptionsBuilder,
    MarkdownProcessor,
    Processor,
    ProcessorRegistry,
    TabStyle,
    process_markdown_file,
    process_markdown_string,
    process_with_recovery,
  },
  types::{Header, IncludedSnippet, MarkdownResult},
};
