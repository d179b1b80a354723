//! `:::details{title="...",open}` accordions.

use super::{Container, parse_attributes, replace_containers};
use crate::{context::ProcessingContext, processor::Processor, utils::html::escape_html};

const DEFAULT_TITLE: &str = "Details";

fn render_container(container: &Container<'_>, ctx: &mut ProcessingContext<'_>) -> String {
  let attrs = parse_attributes(container.args);
  let title = attrs
    .get("title")
    .map(|t| t.trim())
    .filter(|t| !t.is_empty())
    .unwrap_or(DEFAULT_TITLE);
  let open = if attrs.contains_key("open") { " open" } else { "" };
  let content = ctx.render_markdown(container.body);

  format!(
    "<details class=\"quire-details\"{open}>\n<summary class=\"quire-details-summary\">{}</summary>\n<div class=\"quire-details-content\">\n{}\n</div>\n</details>",
    escape_html(title),
    content.trim()
  )
}

/// Renders `:::details` containers as native disclosure widgets.
pub struct DetailsProcessor;

impl Processor for DetailsProcessor {
  fn name(&self) -> &'static str {
    "details"
  }

  fn priority(&self) -> i32 {
    35
  }

  fn preprocess(&self, content: &str, ctx: &mut ProcessingContext<'_>) -> String {
    replace_containers(content, |container| {
      (container.name == "details").then(|| render_container(container, ctx))
    })
  }
}
