//! `:::tabs` containers with `== Label` sections.

use rand::RngExt;

use super::{Container, replace_containers, split_sections};
use crate::{
  code::{IconSource, detect_icon, icon_html},
  context::ProcessingContext,
  processor::Processor,
  utils::{
    html::{escape_attr, escape_html},
    ranges::TABS_CLASS,
  },
};

/// One tab of a tab group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabEntry {
  /// Label shown on the tab button.
  pub name:        String,
  /// Rendered HTML of the panel.
  pub content:     String,
  pub icon:        Option<String>,
  pub icon_source: Option<IconSource>,
}

/// Render a tab group.
///
/// `extra_class` is appended to the container's class list. Every id in the
/// group is derived from `group_id`; the first tab starts selected.
#[must_use]
pub fn render_tabs(entries: &[TabEntry], extra_class: Option<&str>, group_id: u64) -> String {
  let class = extra_class.map_or_else(
    || TABS_CLASS.to_string(),
    |extra| format!("{TABS_CLASS} {extra}"),
  );

  let mut html = format!(
    "<div class=\"{class}\" data-tabs-group=\"{group_id}\">\n<div \
     class=\"quire-tabs-list\" role=\"tablist\">\n"
  );

  for (index, entry) in entries.iter().enumerate() {
    let selected = index == 0;
    let icon = match (&entry.icon, entry.icon_source) {
      (Some(icon), Some(source)) => icon_html(icon, source),
      _ => String::new(),
    };
    html.push_str(&format!(
      "<button class=\"quire-tab{active}\" role=\"tab\" id=\"tab-{group_id}-{index}\" \
       aria-selected=\"{selected}\" aria-controls=\"tabpanel-{group_id}-{index}\" \
       tabindex=\"{tabindex}\">{icon}<span class=\"quire-tab-label\">{name}</span></button>\n",
      active = if selected { " active" } else { "" },
      tabindex = if selected { "0" } else { "-1" },
      name = escape_html(&entry.name),
    ));
  }
  html.push_str("</div>\n");

  for (index, entry) in entries.iter().enumerate() {
    let selected = index == 0;
    html.push_str(&format!(
      "<div class=\"quire-tab-panel{active}\" role=\"tabpanel\" \
       id=\"tabpanel-{group_id}-{index}\" aria-labelledby=\"tab-{group_id}-{index}\" \
       aria-hidden=\"{hidden}\" data-tab=\"{label}\">\n{content}\n</div>\n",
      active = if selected { " active" } else { "" },
      hidden = !selected,
      label = escape_attr(&entry.name),
      content = entry.content.trim(),
    ));
  }

  html.push_str("</div>");
  html
}

/// A fresh id for a tab group.
pub(crate) fn new_group_id() -> u64 {
  rand::rng().random::<u64>()
}

fn tab_label(line: &str) -> Option<&str> {
  line
    .trim_start()
    .strip_prefix("==")
    .filter(|rest| rest.starts_with([' ', '\t']))
    .map(str::trim)
    .filter(|label| !label.is_empty())
}

fn render_container(container: &Container<'_>, ctx: &mut ProcessingContext<'_>) -> Option<String> {
  let (preamble, sections) = split_sections(container.body, tab_label);
  if sections.is_empty() {
    log::warn!("':::tabs' block without any '== Label' sections left as written");
    return None;
  }
  if !preamble.trim().is_empty() {
    log::debug!("Dropping text before the first tab of a ':::tabs' block");
  }

  let entries: Vec<TabEntry> = sections
    .into_iter()
    .map(|(label, body)| {
      let resolved = detect_icon(label, body);
      TabEntry {
        name:        resolved.text,
        content:     ctx.render_markdown(body),
        icon:        resolved.icon,
        icon_source: resolved.source,
      }
    })
    .collect();

  Some(render_tabs(&entries, None, new_group_id()))
}

/// Renders `:::tabs` containers.
pub struct TabsProcessor;

impl Processor for TabsProcessor {
  fn name(&self) -> &'static str {
    "tabs"
  }

  fn priority(&self) -> i32 {
    20
  }

  fn preprocess(&self, content: &str, ctx: &mut ProcessingContext<'_>) -> String {
    replace_containers(content, |container| {
      if container.name == "tabs" {
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
    TabsProcessor.preprocess(md, &mut ctx)
  }

  #[test]
  fn test_tabs_aria_markup() {
    let html = render(":::tabs\n== npm\nnpm i\n\n== yarn\nyarn add\n:::");

    assert_eq!(html.matches("role=\"tablist\"").count(), 1);
    assert_eq!(html.matches("role=\"tab\"").count(), 2);
    assert_eq!(html.matches("role=\"tabpanel\"").count(), 2);
    assert_eq!(html.matches("aria-selected=\"true\"").count(), 1);
    assert_eq!(html.matches("aria-selected=\"false\"").count(), 1);
    assert_eq!(html.matches("aria-hidden=\"false\"").count(), 1);
    assert_eq!(html.matches("aria-hidden=\"true\"").count(), 1);

    let first = html.find("aria-selected=\"true\"").expect("selected tab");
    let second = html.find("aria-selected=\"false\"").expect("unselected tab");
    assert!(first < second, "first tab must be the selected one");
    assert!(html.contains("<p>npm i</p>"));
    assert!(html.contains("<p>yarn add</p>"));
  }

  #[test]
  fn test_ids_share_group() {
    let html = render(":::tabs\n== A\na\n== B\nb\n:::\n");
    let start = html.find("id=\"tab-").expect("tab id") + "id=\"tab-".len();
    let group: String = html[start..].chars().take_while(char::is_ascii_digit).collect();

    for id in [
      format!("tab-{group}-0"),
      format!("tab-{group}-1"),
      format!("tabpanel-{group}-0"),
      format!("tabpanel-{group}-1"),
    ] {
      assert!(html.contains(&format!("id=\"{id}\"")), "missing {id}");
    }
    assert!(html.contains(&format!("aria-controls=\"tabpanel-{group}-1\"")));
    assert!(html.contains(&format!("aria-labelledby=\"tab-{group}-0\"")));
  }

  #[test]
  fn test_tab_icons() {
    let html = render(":::tabs\n== :star: Fav\ntext\n== app.js\n```js\nlet a;\n```\n:::\n");
    assert!(html.contains("<i class=\"ph ph-star\" aria-hidden=\"true\"></i><span class=\"quire-tab-label\">Fav</span>"));
    assert!(html.contains("file-icon-js"));
  }

  #[test]
  fn test_fragment_has_no_blank_lines() {
    let html = render("intro\n\n:::tabs\n== A\npara one\n\npara two\n:::\n\nafter\n");
    let start = html.find("<div class=\"quire-tabs\"").expect("tabs");
    let end = html.rfind("</div>").expect("end");
    assert!(!html[start..end].contains("\n\n"));
    assert!(html.starts_with("intro\n\n<div"));
    assert!(html.ends_with("\n\nafter\n"));
  }

  #[test]
  fn test_no_sections_or_unterminated_left_alone() {
    let md = ":::tabs\njust text\n:::\n";
    assert_eq!(render(md), md);
    let md = ":::tabs\n== A\nnever closed\n";
    assert_eq!(render(md), md);
  }

  #[test]
  fn test_nested_tabs() {
    let html = render(":::tabs\n== Outer\n:::tabs\n== Inner\ndeep\n:::\n== Second\ns\n:::\n");
    assert_eq!(html.matches("role=\"tablist\"").count(), 2);
    assert_eq!(html.matches("role=\"tab\"").count(), 3);
    assert!(html.contains("<p>deep</p>"));
  }
}
