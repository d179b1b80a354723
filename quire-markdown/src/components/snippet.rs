//! `<<< @/path{selector}` imports of source files as fenced code blocks.
//!
//! The optional selector is a line range (`{5}` or `{3-10}`), a named region
//! (`{#setup}`) or a language override (`{ts}`).

use std::{
  borrow::Cow,
  fs,
  path::{Component, Path, PathBuf},
  sync::LazyLock,
};

use percent_encoding::percent_decode_str;
use regex::Regex;

use crate::{
  context::ProcessingContext,
  processor::Processor,
  types::IncludedSnippet,
  utils::{
    codeblock::{FenceTracker, lines_with_offsets},
    compile_regex,
    html::escape_html,
  },
};

/// Reasons a snippet import fails. Shown inline in place of the directive.
#[derive(Debug, thiserror::Error)]
pub enum SnippetError {
  #[error("No docs root is configured for snippet imports")]
  NoDocsRoot,
  #[error("Path '{0}' is not inside the docs root")]
  OutsideRoot(String),
  #[error("Could not read '{path}': {source}")]
  Read {
    path:   String,
    #[source]
    source: std::io::Error,
  },
  #[error("Line {start} is past the end of '{path}' ({lines} lines)")]
  LineRange {
    path:  String,
    start: usize,
    lines: usize,
  },
  #[error("Region '{region}' not found in '{path}'")]
  RegionNotFound { path: String, region: String },
  #[error("Region '{region}' in '{path}' is never closed")]
  RegionUnclosed { path: String, region: String },
}

static DIRECTIVE_RE: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r"^<<<\s+@/(\S+?)(?:\{([^}]*)\})?\s*$"));

static LINE_RANGE_RE: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r"^\s*(\d+)\s*(?:-\s*(\d+)\s*)?$"));

const COMMENT_OPENERS: &str = r"(?://|/\*|<!--|--|;)?";

static REGION_START_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile_regex(&format!(r"^\s*{COMMENT_OPENERS}\s*#region\b[ \t]*([\w.-]*)"))
});

static REGION_END_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile_regex(&format!(r"^\s*{COMMENT_OPENERS}\s*#endregion\b[ \t]*([\w.-]*)"))
});

/// What the `{...}` suffix of a directive asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Selector<'a> {
  Lines(usize, Option<usize>),
  Region(&'a str),
  Language(&'a str),
}

impl<'a> Selector<'a> {
  fn parse(raw: &'a str) -> Option<Self> {
    let raw = raw.trim();
    if raw.is_empty() {
      return None;
    }
    if let Some(caps) = LINE_RANGE_RE.captures(raw) {
      let start = caps[1].parse().ok()?;
      let end = caps.get(2).and_then(|m| m.as_str().parse().ok());
      return Some(Self::Lines(start, end));
    }
    if let Some(region) = raw.strip_prefix('#') {
      return Some(Self::Region(region.trim()));
    }
    Some(Self::Language(raw))
  }
}

/// Join `relative` onto `root`, refusing anything that could leave the root.
fn resolve_path(root: &Path, relative: &str) -> Result<PathBuf, SnippetError> {
  let escapes = Path::new(relative).components().any(|component| {
    !matches!(component, Component::Normal(_) | Component::CurDir)
  });
  if escapes || relative.is_empty() {
    return Err(SnippetError::OutsideRoot(relative.to_string()));
  }

  let resolved = root.join(relative);
  // Symlinks may still point elsewhere.
  if let (Ok(real_root), Ok(real_path)) = (root.canonicalize(), resolved.canonicalize()) {
    if !real_path.starts_with(&real_root) {
      return Err(SnippetError::OutsideRoot(relative.to_string()));
    }
  }
  Ok(resolved)
}

fn select_lines(
  content: &str,
  path: &str,
  start: usize,
  end: Option<usize>,
) -> Result<String, SnippetError> {
  let lines: Vec<&str> = content.lines().collect();
  let start = start.max(1);
  if start > lines.len() {
    return Err(SnippetError::LineRange {
      path: path.to_string(),
      start,
      lines: lines.len(),
    });
  }
  let end = end.unwrap_or(start).clamp(start, lines.len());
  Ok(lines[start - 1..end].join("\n"))
}

/// Extract the lines between `#region name` and its `#endregion`, dropping
/// nested region markers and the common indentation.
fn extract_region(content: &str, path: &str, region: &str) -> Result<String, SnippetError> {
  let mut lines = content.lines();

  let found = lines.by_ref().any(|line| {
    REGION_START_RE
      .captures(line)
      .and_then(|caps| caps.get(1))
      .is_some_and(|name| name.as_str() == region)
  });
  if !found {
    return Err(SnippetError::RegionNotFound {
      path:   path.to_string(),
      region: region.to_string(),
    });
  }

  let mut body = Vec::new();
  let mut depth = 0usize;
  let mut closed = false;

  for line in lines {
    if REGION_START_RE.is_match(line) {
      depth += 1;
      continue;
    }
    if let Some(caps) = REGION_END_RE.captures(line) {
      let name = caps.get(1).map_or("", |m| m.as_str());
      if depth > 0 {
        depth -= 1;
      } else if name.is_empty() || name == region {
        closed = true;
        break;
      }
      continue;
    }
    body.push(line);
  }

  if !closed {
    return Err(SnippetError::RegionUnclosed {
      path:   path.to_string(),
      region: region.to_string(),
    });
  }

  Ok(dedent(&body))
}

fn dedent(lines: &[&str]) -> String {
  let indent = lines
    .iter()
    .filter(|line| !line.trim().is_empty())
    .map(|line| line.len() - line.trim_start().len())
    .min()
    .unwrap_or(0);

  lines
    .iter()
    .map(|line| line.get(indent..).unwrap_or_else(|| line.trim_start()))
    .collect::<Vec<_>>()
    .join("\n")
}

/// Wrap `code` in a fence longer than any backtick run inside it.
fn fence_code(code: &str, language: Option<&str>) -> String {
  let longest_run = code
    .split(|c| c != '`')
    .map(str::len)
    .max()
    .unwrap_or(0);
  let fence = "`".repeat((longest_run + 1).max(3));

  format!(
    "{fence}{}\n{}\n{fence}\n",
    language.unwrap_or(""),
    code.trim_end_matches(['\n', '\r'])
  )
}

/// Load and format one import.
fn import(
  raw_path: &str,
  raw_selector: Option<&str>,
  ctx: &mut ProcessingContext<'_>,
) -> Result<String, SnippetError> {
  let root = ctx.docs_root().ok_or(SnippetError::NoDocsRoot)?;
  let relative: Cow<'_, str> = percent_decode_str(raw_path).decode_utf8_lossy();
  let resolved = resolve_path(root, &relative)?;

  let content = fs::read_to_string(&resolved).map_err(|source| {
    SnippetError::Read {
      path: relative.to_string(),
      source,
    }
  })?;

  let selector = raw_selector.and_then(Selector::parse);
  let extension_language = resolved
    .extension()
    .and_then(|ext| ext.to_str())
    .map(str::to_string);

  let (code, language) = match selector {
    Some(Selector::Lines(start, end)) => {
      (select_lines(&content, &relative, start, end)?, extension_language)
    },
    Some(Selector::Region(region)) => {
      (extract_region(&content, &relative, region)?, extension_language)
    },
    Some(Selector::Language(language)) => (content, Some(language.to_string())),
    None => (content, extension_language),
  };

  log::debug!("Imported snippet {}", resolved.display());
  ctx.included_files.push(IncludedSnippet {
    path: relative.into_owned(),
    resolved,
    selector: raw_selector.map(str::to_string),
  });

  Ok(fence_code(&code, language.as_deref()))
}

fn error_html(raw_path: &str, error: &SnippetError) -> String {
  format!(
    "<div class=\"quire-snippet-error\" role=\"alert\">Failed to import \
     <code>@/{}</code>: {}</div>\n\n",
    escape_html(raw_path),
    escape_html(&error.to_string())
  )
}

/// Replaces `<<< @/path` lines outside code fences with the imported code.
///
/// Failed imports leave an inline error in the page and never stop the
/// render.
pub struct SnippetProcessor;

impl Processor for SnippetProcessor {
  fn name(&self) -> &'static str {
    "snippet"
  }

  fn priority(&self) -> i32 {
    5
  }

  fn preprocess(&self, content: &str, ctx: &mut ProcessingContext<'_>) -> String {
    if !content.contains("<<<") {
      return content.to_string();
    }

    let mut out = String::with_capacity(content.len());
    let mut fence = FenceTracker::new();

    for (_, line) in lines_with_offsets(content) {
      let was_in_fence = fence.in_code_block();
      fence = fence.process_line(line);

      let directive = if was_in_fence || fence.in_code_block() {
        None
      } else {
        DIRECTIVE_RE.captures(line.trim())
      };

      let Some(caps) = directive else {
        out.push_str(line);
        continue;
      };

      let raw_path = caps.get(1).map_or("", |m| m.as_str());
      let raw_selector = caps.get(2).map(|m| m.as_str());

      match import(raw_path, raw_selector, ctx) {
        Ok(fenced) => out.push_str(&fenced),
        Err(e) => {
          log::warn!("Snippet import '@/{raw_path}' failed: {e}");
          out.push_str(&error_html(raw_path, &e));
        },
      }
    }

    out
  }
}

#[cfg(test)]
mod tests {
  use std::fs;

  use super::*;
  use crate::processor::{Converter, MarkdownOptions, ProcessorRegistry};

  fn run(root: Option<&Path>, md: &str) -> (String, Vec<IncludedSnippet>) {
    let registry = ProcessorRegistry::new();
    let converter = Converter::new(&MarkdownOptions {
      highlight_code: false,
      ..Default::default()
    });
    let mut ctx = ProcessingContext::new(&registry, &converter, root);
    let out = SnippetProcessor.preprocess(md, &mut ctx);
    (out, ctx.included_files)
  }

  fn docs() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    fs::create_dir_all(dir.path().join("src")).expect("create src");
    fs::write(
      dir.path().join("src/app.ts"),
      "import x from 'x';\n\n// #region setup\n  const a = 1;\n  // #region inner\n  const b = 2;\n  // #endregion inner\n// #endregion setup\nrun();\n",
    )
    .expect("write app.ts");
    fs::write(
      dir.path().join("src/tool.py"),
      "#region main\nprint('hi')\n#endregion\n",
    )
    .expect("write tool.py");
    fs::write(dir.path().join("my file.md"), "has ``` fences\n").expect("write md");
    dir
  }

  #[test]
  fn test_whole_file_uses_extension() {
    let dir = docs();
    let (out, included) = run(Some(dir.path()), "<<< @/src/tool.py\n");
    assert_eq!(out, "```py\n#region main\nprint('hi')\n#endregion\n```\n");
    assert_eq!(included.len(), 1);
    assert_eq!(included[0].path, "src/tool.py");
    assert_eq!(included[0].selector, None);
  }

  #[test]
  fn test_line_range_and_single_line() {
    let dir = docs();
    let (out, _) = run(Some(dir.path()), "<<< @/src/app.ts{1-1}\n<<< @/src/app.ts{9}\n");
    assert_eq!(out, "```ts\nimport x from 'x';\n```\n```ts\nrun();\n```\n");
  }

  #[test]
  fn test_range_clamped_to_file() {
    let dir = docs();
    let (out, _) = run(Some(dir.path()), "<<< @/src/tool.py{2-99}\n");
    assert_eq!(out, "```py\nprint('hi')\n#endregion\n```\n");
  }

  #[test]
  fn test_region_drops_nested_markers_and_dedents() {
    let dir = docs();
    let (out, included) = run(Some(dir.path()), "<<< @/src/app.ts{#setup}\n");
    assert_eq!(out, "```ts\nconst a = 1;\nconst b = 2;\n```\n");
    assert_eq!(included[0].selector.as_deref(), Some("#setup"));

    let (out, _) = run(Some(dir.path()), "<<< @/src/tool.py{#main}\n");
    assert_eq!(out, "```py\nprint('hi')\n```\n");
  }

  #[test]
  fn test_language_override_and_percent_decoding() {
    let dir = docs();
    let (out, included) = run(Some(dir.path()), "<<< @/my%20file.md{text}\n");
    assert_eq!(out, "````text\nhas ``` fences\n````\n");
    assert_eq!(included[0].path, "my file.md");
  }

  #[test]
  fn test_failures_are_inline_and_do_not_stop_processing() {
    let dir = docs();
    let md = "<<< @/missing.rs\nbetween\n<<< @/src/app.ts{#nope}\n<<< @/../etc/passwd\nend\n";
    let (out, included) = run(Some(dir.path()), md);

    assert_eq!(out.matches("quire-snippet-error").count(), 3);
    assert!(out.contains("role=\"alert\""));
    assert!(out.contains("Region &#x27;nope&#x27; not found") || out.contains("Region 'nope' not found"));
    assert!(out.contains("between\n"));
    assert!(out.ends_with("end\n"));
    assert!(included.is_empty());
  }

  #[test]
  fn test_no_docs_root() {
    let (out, _) = run(None, "<<< @/a.rs\n");
    assert!(out.contains("No docs root"));
  }

  #[test]
  fn test_directives_in_fences_skipped() {
    let dir = docs();
    let md = "```md\n<<< @/src/tool.py\n```\n";
    let (out, included) = run(Some(dir.path()), md);
    assert_eq!(out, md);
    assert!(included.is_empty());
  }

  #[test]
  fn test_selector_parsing() {
    assert_eq!(Selector::parse("3"), Some(Selector::Lines(3, None)));
    assert_eq!(Selector::parse("3-7"), Some(Selector::Lines(3, Some(7))));
    assert_eq!(Selector::parse("#a"), Some(Selector::Region("a")));
    assert_eq!(Selector::parse("rust"), Some(Selector::Language("rust")));
    assert_eq!(Selector::parse(" "), None);
  }
}
