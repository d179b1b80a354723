//! `:::steps` containers: numbered steps from `### Heading` sections.

use std::fmt::Write;

use super::{Container, replace_containers, split_sections};
use crate::{context::ProcessingContext, processor::Processor, utils::html::escape_html};

fn step_heading(line: &str) -> Option<&str> {
  line
    .trim_start()
    .strip_prefix("### ")
    .map(|heading| heading.trim().trim_end_matches('#').trim_end())
    .filter(|heading| !heading.is_empty())
}

fn render_container(container: &Container<'_>, ctx: &mut ProcessingContext<'_>) -> Option<String> {
  let (_, sections) = split_sections(container.body, step_heading);
  if sections.is_empty() {
    log::warn!("':::steps' block without '### ' headings left as written");
    return None;
  }

  let count = sections.len();
  let mut html = String::from("<div class=\"quire-steps\">\n");

  for (index, (title, body)) in sections.into_iter().enumerate() {
    let number = index + 1;
    let last = number == count;
    let content = ctx.render_markdown(body);

    let _ = write!(
      html,
      "<div class=\"quire-step{last_class}\">\n<div class=\"quire-step-indicator\">\
       <span class=\"quire-step-number\">{number}</span>{connector}</div>\n\
       <div class=\"quire-step-content\">\n<div class=\"quire-step-title\">{title}</div>\n\
       <div class=\"quire-step-body\">\n{content}\n</div>\n</div>\n</div>\n",
      last_class = if last { " quire-step-last" } else { "" },
      connector = if last {
        ""
      } else {
        "<span class=\"quire-step-connector\" aria-hidden=\"true\"></span>"
      },
      title = escape_html(title),
      content = content.trim(),
    );
  }

  html.push_str("</div>");
  Some(html)
}

/// Renders `:::steps` containers.
pub struct StepsProcessor;

impl Processor for StepsProcessor {
  fn name(&self) -> &'static str {
    "steps"
  }

  fn priority(&self) -> i32 {
    25
  }

  fn preprocess(&self, content: &str, ctx: &mut ProcessingContext<'_>) -> String {
    replace_containers(content, |container| {
      if container.name == "steps" {
        render_container(container, ctx)
      } else {
        None
      }
    })
  }
}
