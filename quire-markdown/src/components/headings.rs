//! Heading anchors and the table of contents.

use std::sync::LazyLock;

use regex::Regex;

use crate::{
  context::ProcessingContext,
  processor::Processor,
  types::Header,
  utils::{
    SlugAllocator,
    compile_regex,
    html::{escape_attr, text_content},
    ranges::{find_tabs_ranges, in_any_range},
  },
};

static HEADING_OPEN_RE: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r"<h([1-6])(\s[^>]*)?>"));

static ID_ATTR_RE: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r#"\sid="([^"]*)""#));

/// Gives every heading an id and records it in the context.
///
/// Headings that already have an id keep it. Headings inside tab panels are
/// left alone and do not appear in the table of contents.
pub struct HeadingProcessor;

impl Processor for HeadingProcessor {
  fn name(&self) -> &'static str {
    "headings"
  }

  fn priority(&self) -> i32 {
    50
  }

  fn postprocess(&self, html: &str, ctx: &mut ProcessingContext<'_>) -> String {
    let tabs = find_tabs_ranges(html);
    let mut slugs = SlugAllocator::new();
    for caps in ID_ATTR_RE.captures_iter(html) {
      if let Some(id) = caps.get(1) {
        slugs.reserve(id.as_str());
      }
    }

    let mut out = String::with_capacity(html.len() + 64);
    let mut copied = 0;

    for caps in HEADING_OPEN_RE.captures_iter(html) {
      let Some(open) = caps.get(0) else { continue };
      if open.start() < copied || in_any_range(&tabs, open.start()) {
        continue;
      }
      let Ok(level) = caps[1].parse::<u8>() else { continue };
      let attrs = caps.get(2).map_or("", |m| m.as_str());

      let close_tag = format!("</h{level}>");
      let Some(close) = html[open.end()..].find(&close_tag).map(|i| open.end() + i)
      else {
        log::debug!("Unclosed <h{level}> skipped");
        continue;
      };
      let text = text_content(&html[open.end()..close]);

      let id = match ID_ATTR_RE.captures(attrs).and_then(|c| c.get(1)) {
        Some(existing) => existing.as_str().to_string(),
        None => {
          let id = slugs.allocate(&text);
          out.push_str(&html[copied..open.start()]);
          out.push_str(&format!("<h{level}{attrs} id=\"{}\">", escape_attr(&id)));
          copied = open.end();
          id
        },
      };

      ctx.headers.push(Header { text, level, id });
    }

    out.push_str(&html[copied..]);
    log::debug!("Collected {} headers", ctx.headers.len());
    out
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::processor::{Converter, MarkdownOptions, ProcessorRegistry};

  fn run(html: &str) -> (String, Vec<Header>) {
    let registry = ProcessorRegistry::new();
    let converter = Converter::new(&MarkdownOptions {
      highlight_code: false,
      ..Default::default()
    });
    let mut ctx = ProcessingContext::new(&registry, &converter, None);
    let out = HeadingProcessor.postprocess(html, &mut ctx);
    (out, ctx.headers)
  }

  #[test]
  fn test_assigns_unique_ids() {
    let (html, headers) = run("<h1>Intro</h1>\n<h2>Setup <code>x</code></h2>\n<h2>Intro</h2>\n");
    assert!(html.contains("<h1 id=\"intro\">Intro</h1>"));
    assert!(html.contains("<h2 id=\"setup-x\">"));
    assert!(html.contains("<h2 id=\"intro-1\">Intro</h2>"));
    assert_eq!(headers.len(), 3);
    assert_eq!(headers[1], Header {
      text:  "Setup x".to_string(),
      level: 2,
      id:    "setup-x".to_string(),
    });
  }

  #[test]
  fn test_existing_ids_kept_and_reserved() {
    let (html, headers) = run("<h2>Usage</h2>\n<h3 id=\"usage\">Other</h3>\n");
    assert!(html.contains("<h3 id=\"usage\">Other</h3>"));
    assert!(html.contains("<h2 id=\"usage-1\">Usage</h2>"));
    assert_eq!(headers[1].id, "usage");
  }

  #[test]
  fn test_headings_in_tabs_skipped() {
    let input = "<h2>Before</h2>\n<div class=\"quire-tabs\"><div role=\"tabpanel\"><h2>Inside</h2></div></div>\n<h2>After</h2>";
    let (html, headers) = run(input);
    assert!(html.contains("<h2>Inside</h2>"));
    let texts: Vec<_> = headers.iter().map(|h| h.text.as_str()).collect();
    assert_eq!(texts, vec!["Before", "After"]);
  }
}
