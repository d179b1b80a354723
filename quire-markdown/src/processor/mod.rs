//! Markdown processing: the processor chain, the converter and the render
//! entry points.
//!
//! - [`registry`]: the [`Processor`] trait and the ordered
//!   [`ProcessorRegistry`]
//! - [`core`]: `MarkdownProcessor::render` and the comrak [`Converter`]
//! - [`process`]: high-level processing functions with error recovery
//! - [`types`]: options and the processor struct
pub mod core;
pub mod process;
pub mod registry;
pub mod types;

pub use core::{
  AstTransformer,
  Converter,
  collect_markdown_files,
  strip_front_matter,
};

pub use process::{
  process_markdown_file,
  process_markdown_string,
  process_with_recovery,
};
pub use registry::{DEFAULT_PRIORITY, Processor, ProcessorRegistry};
pub use types::{
  MarkdownOptions,
  MarkdownOptionsBuilder,
  MarkdownProcessor,
  TabStyle,
};
