//! Code block feature extraction.

use crate::{
  code::extract_code_blocks,
  context::ProcessingContext,
  processor::Processor,
};

/// Strips code markers from every fence and records the block's features in
/// the context.
///
/// Each processed fence is tagged with its block id so that the converter and
/// the code-group component can find the features again.
pub struct CodeBlockExtractor;

impl Processor for CodeBlockExtractor {
  fn name(&self) -> &'static str {
    "code-block"
  }

  fn priority(&self) -> i32 {
    10
  }

  fn preprocess(&self, content: &str, ctx: &mut ProcessingContext<'_>) -> String {
    let (rewritten, blocks) = extract_code_blocks(content, ctx.code_blocks.len());
    if !blocks.is_empty() {
      log::debug!("Extracted {} code blocks", blocks.len());
    }
    ctx.code_blocks.extend(blocks);
    rewritten
  }
}
