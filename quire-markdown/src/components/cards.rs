//! `:::cards` grids of `::card{title=,icon=,href=}` ... `::` entries.

use std::collections::HashMap;

use super::{Container, parse_attributes, replace_containers};
use crate::{
  code::{IconSource, icon_html},
  context::ProcessingContext,
  processor::Processor,
  utils::{
    codeblock::{FenceTracker, lines_with_offsets},
    html::{escape_attr, escape_html},
  },
};

const DEFAULT_TITLE: &str = "Untitled";

#[derive(Debug, PartialEq, Eq)]
struct Card<'a> {
  attrs: HashMap<String, String>,
  body:  &'a str,
}

/// Split a cards body into its entries. An entry missing its `::` line runs
/// to the end of the body.
fn parse_cards(body: &str) -> Vec<Card<'_>> {
  let mut cards = Vec::new();
  let mut fence = FenceTracker::new();
  let mut open: Option<(HashMap<String, String>, usize)> = None;

  for (offset, line) in lines_with_offsets(body) {
    let was_in_fence = fence.in_code_block();
    fence = fence.process_line(line);
    if was_in_fence || fence.in_code_block() {
      continue;
    }

    let trimmed = line.trim();
    if trimmed == "::" {
      if let Some((attrs, start)) = open.take() {
        cards.push(Card {
          attrs,
          body: &body[start..offset],
        });
      }
    } else if let Some(args) = trimmed.strip_prefix("::card") {
      if let Some((attrs, start)) = open.take() {
        log::debug!("'::card' entry without closing '::'");
        cards.push(Card {
          attrs,
          body: &body[start..offset],
        });
      }
      open = Some((parse_attributes(args), offset + line.len()));
    }
  }

  if let Some((attrs, start)) = open {
    log::debug!("'::card' entry without closing '::'");
    cards.push(Card {
      attrs,
      body: &body[start..],
    });
  }

  cards
}

fn attr<'a>(attrs: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
  attrs.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn render_card(card: &Card<'_>, ctx: &mut ProcessingContext<'_>) -> String {
  let title = attr(&card.attrs, "title").unwrap_or(DEFAULT_TITLE);
  let href = attr(&card.attrs, "href");
  let content = ctx.render_markdown(card.body);

  let (open, close) = match href {
    Some(href) => {
      (
        format!("<a class=\"quire-card quire-card-link\" href=\"{}\">", escape_attr(href)),
        "</a>",
      )
    },
    None => ("<div class=\"quire-card\">".to_string(), "</div>"),
  };

  let mut html = open;
  html.push('\n');
  if let Some(icon) = attr(&card.attrs, "icon") {
    html.push_str("<div class=\"quire-card-icon\">");
    html.push_str(&icon_html(icon, IconSource::Phosphor));
    html.push_str("</div>\n");
  }
  html.push_str(&format!(
    "<div class=\"quire-card-title\">{}</div>\n<div class=\"quire-card-body\">\n{}\n</div>\n",
    escape_html(title),
    content.trim()
  ));
  html.push_str(close);
  html
}

fn render_container(container: &Container<'_>, ctx: &mut ProcessingContext<'_>) -> Option<String> {
  let cards = parse_cards(container.body);
  if cards.is_empty() {
    log::warn!("':::cards' block without '::card' entries left as written");
    return None;
  }

  let mut html = String::from("<div class=\"quire-cards\">\n");
  for card in &cards {
    html.push_str(&render_card(card, ctx));
    html.push('\n');
  }
  html.push_str("</div>");
  Some(html)
}

/// Renders `:::cards` containers.
pub struct CardsProcessor;

impl Processor for CardsProcessor {
  fn name(&self) -> &'static str {
    "cards"
  }

  fn priority(&self) -> i32 {
    30
  }

  fn preprocess(&self, content: &str, ctx: &mut ProcessingContext<'_>) -> String {
    replace_containers(content, |container| {
      if container.name == "cards" {
        render_container(container, ctx)
      } else {
        None
      }
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::processor::{Converter, MarkdownOptions, ProcessorRegistry};

  fn render(md: &str) -> String {
    let registry = ProcessorRegistry::with_builtins();
    let converter = Converter::new(&MarkdownOptions {
      highlight_code: false,
      ..Default::default()
    });
    let mut ctx = ProcessingContext::new(&registry, &converter, None);
    CardsProcessor.preprocess(md, &mut ctx)
  }

  #[test]
  fn test_parse_cards() {
    let cards = parse_cards("::card{title=\"A\"}\none\n::\n\n::card\ntwo\n");
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].attrs.get("title").map(String::as_str), Some("A"));
    assert_eq!(cards[0].body, "one\n");
    assert_eq!(cards[1].body, "two\n");
  }

  #[test]
  fn test_linked_card_with_icon() {
    let html = render(":::cards\n::card{title=\"Guide\",icon=\"book\",href=\"/guide/\"}\nRead **this**.\n::\n:::\n");
    assert!(html.contains("<a class=\"quire-card quire-card-link\" href=\"/guide/\">"));
    assert!(html.contains("<div class=\"quire-card-icon\"><i class=\"ph ph-book\" aria-hidden=\"true\"></i></div>"));
    assert!(html.contains("<div class=\"quire-card-title\">Guide</div>"));
    assert!(html.contains("<strong>this</strong>"));
    assert!(html.contains("</a>"));
  }

  #[test]
  fn test_plain_card_defaults() {
    let html = render(":::cards\n::card\nbody\n::\n:::\n");
    assert!(html.contains("<div class=\"quire-card\">"));
    assert!(html.contains(">Untitled</div>"));
    assert!(!html.contains("quire-card-icon"));
    assert!(!html.contains("<a "));
  }

  #[test]
  fn test_card_markers_in_code_ignored() {
    let cards = parse_cards("::card\n```\n::\n```\n::\n");
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].body, "```\n::\n```\n");
  }
}
