//! `:::code-group` containers: one tab per fenced code block.

use super::{
  Container,
  replace_containers,
  tabs::{TabEntry, new_group_id, render_tabs},
};
use crate::{
  code::{CodeBlockFeatures, detect_icon, features::split_block_tag},
  context::ProcessingContext,
  processor::Processor,
  utils::codeblock::fences,
};

/// Mark the block as a group member and return the label for its tab.
///
/// Untagged fences (only seen when the extractor is not registered) fall
/// back to their info string.
fn claim_block(info: &str, ctx: &mut ProcessingContext<'_>) -> String {
  let features = match split_block_tag(info).1 {
    Some(id) => {
      ctx.code_blocks.get_mut(id).map(|features| {
        features.in_group = true;
        features.clone()
      })
    },
    None => None,
  }
  .unwrap_or_else(|| CodeBlockFeatures::from_info(info));

  features
    .title
    .or(features.language)
    .unwrap_or_else(|| "Code".to_string())
}

fn render_container(container: &Container<'_>, ctx: &mut ProcessingContext<'_>) -> Option<String> {
  let found = fences(container.body);
  if found.is_empty() {
    log::warn!("':::code-group' block without code blocks left as written");
    return None;
  }

  let mut entries = Vec::with_capacity(found.len());
  let mut last_end = 0;
  for fence in found {
    if !container.body[last_end..fence.start].trim().is_empty() {
      log::debug!("Ignoring text between code blocks in a ':::code-group'");
    }
    last_end = fence.end;

    let label = claim_block(fence.info, ctx);
    let source = &container.body[fence.start..fence.end];
    let resolved = detect_icon(&label, source);

    entries.push(TabEntry {
      name:        resolved.text,
      content:     ctx.render_markdown(source),
      icon:        resolved.icon,
      icon_source: resolved.source,
    });
  }

  Some(render_tabs(&entries, Some("quire-code-group"), new_group_id()))
}

/// Renders `:::code-group` containers as tabs of code blocks.
pub struct CodeGroupProcessor;

impl Processor for CodeGroupProcessor {
  fn name(&self) -> &'static str {
    "code-group"
  }

  fn priority(&self) -> i32 {
    15
  }

  fn preprocess(&self, content: &str, ctx: &mut ProcessingContext<'_>) -> String {
    replace_containers(content, |container| {
      if container.name == "code-group" {
        render_container(container, ctx)
      } else {
        None
      }
    })
  }
}
