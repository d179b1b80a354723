//! Whole-site build: every Markdown file of the input directory becomes an
//! HTML page in the output directory, rendered in parallel.
use std::{
  fs,
  path::{Path, PathBuf},
};

use color_eyre::eyre::{Context, Result, bail, eyre};
use log::{debug, error, info};
use quire_markdown::{
  MarkdownProcessor,
  processor::collect_markdown_files,
  process_with_recovery,
};
use rayon::prelude::*;
use tera::Tera;

use crate::config::Config;

const PAGE_TEMPLATE: &str = include_str!("../templates/page.html");
const STYLESHEET: &str = "syntax.css";

/// What a successful build produced.
#[derive(Debug, Default)]
pub struct BuildSummary {
  pub pages:      Vec<PathBuf>,
  pub stylesheet: Option<PathBuf>,
}

struct Site<'a> {
  config:         &'a Config,
  input_dir:      &'a Path,
  processor:      MarkdownProcessor,
  tera:           Tera,
  has_stylesheet: bool,
}

/// Render the site described by `config`.
///
/// A page that fails to read or write does not stop the others; the build
/// reports an error at the end if any did.
///
/// # Errors
///
/// Returns an error if the output directory, the template or the thread pool
/// cannot be set up, or if any page failed.
pub fn build_site(config: &Config) -> Result<BuildSummary> {
  let input_dir = config
    .input_dir
    .as_deref()
    .ok_or_else(|| eyre!("No input directory configured"))?;

  info!("Starting documentation generation...");
  fs::create_dir_all(&config.output_dir).wrap_err_with(|| {
    format!(
      "Failed to create output directory: {}",
      config.output_dir.display()
    )
  })?;
  info!("Output directory: {}", config.output_dir.display());

  let processor = MarkdownProcessor::new(config.markdown_options())
    .with_docs_root(input_dir);

  let mut summary = BuildSummary::default();
  if let Some(css) = processor.theme_css() {
    let path = config.output_dir.join(STYLESHEET);
    fs::write(&path, css).wrap_err_with(|| {
      format!("Failed to write stylesheet: {}", path.display())
    })?;
    summary.stylesheet = Some(path);
  }

  let mut tera = Tera::default();
  tera
    .add_raw_template("page.html", PAGE_TEMPLATE)
    .wrap_err("Failed to load page template")?;

  let site = Site {
    config,
    input_dir,
    processor,
    tera,
    has_stylesheet: summary.stylesheet.is_some(),
  };

  let files = collect_markdown_files(input_dir);
  if files.is_empty() {
    info!("No markdown files found in {}", input_dir.display());
  }

  let thread_count = config.jobs.unwrap_or_else(num_cpus::get);
  let pool = rayon::ThreadPoolBuilder::new()
    .num_threads(thread_count)
    .build()
    .wrap_err("Failed to build thread pool")?;

  let results: Vec<(PathBuf, Result<PathBuf>)> = pool.install(|| {
    files
      .par_iter()
      .map(|path| (path.clone(), site.render_page(path)))
      .collect()
  });

  let mut failed = 0usize;
  for (source, result) in results {
    match result {
      Ok(output) => summary.pages.push(output),
      Err(e) => {
        error!("Failed to render {}: {e:#}", source.display());
        failed += 1;
      },
    }
  }

  if failed > 0 {
    bail!("{failed} of {} pages failed to render", files.len());
  }

  info!(
    "Generated {} pages in {}",
    summary.pages.len(),
    config.output_dir.display()
  );
  Ok(summary)
}

impl Site<'_> {
  fn render_page(&self, source: &Path) -> Result<PathBuf> {
    let rel_path = source.strip_prefix(self.input_dir).wrap_err_with(|| {
      format!("{} is outside the input directory", source.display())
    })?;
    let content = fs::read_to_string(source)
      .wrap_err_with(|| format!("Failed to read {}", source.display()))?;

    let result = process_with_recovery(&self.processor, &content);
    debug!(
      "Rendered {} ({} headers, {} imported files)",
      rel_path.display(),
      result.headers.len(),
      result.included_files.len()
    );

    // Relative prefix back to the output root
    let depth = rel_path.components().count().saturating_sub(1);
    let root = "../".repeat(depth);

    let mut context = tera::Context::new();
    context.insert("content", &result.html);
    context.insert(
      "title",
      result.title.as_deref().unwrap_or(&self.config.title),
    );
    context.insert("site_title", &self.config.title);
    context.insert("headers", &result.headers);
    context.insert("root", &root);
    context.insert(
      "stylesheet",
      &if self.has_stylesheet {
        format!("{root}{STYLESHEET}")
      } else {
        String::new()
      },
    );

    let html = self
      .tera
      .render("page.html", &context)
      .wrap_err_with(|| format!("Failed to render template for {}", rel_path.display()))?;

    let output = self.config.output_dir.join(rel_path).with_extension("html");
    if let Some(parent) = output.parent() {
      fs::create_dir_all(parent).wrap_err_with(|| {
        format!("Failed to create directory: {}", parent.display())
      })?;
    }
    fs::write(&output, html)
      .wrap_err_with(|| format!("Failed to write {}", output.display()))?;

    Ok(output)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn site_config(input: &Path, output: &Path) -> Config {
    Config {
      input_dir: Some(input.to_path_buf()),
      output_dir: output.to_path_buf(),
      title: "Handbook".to_string(),
      jobs: Some(2),
      highlight_code: false,
      ..Default::default()
    }
  }

  #[test]
  fn test_build_mirrors_the_input_tree() {
    let input = tempfile::tempdir().expect("failed to create temp dir");
    let output = tempfile::tempdir().expect("failed to create temp dir");
    fs::create_dir_all(input.path().join("guide")).expect("create dir");
    fs::create_dir_all(input.path().join(".drafts")).expect("create dir");
    fs::write(input.path().join("index.md"), "# Welcome\n\n## Start\n\n## Next\n")
      .expect("write index");
    fs::write(
      input.path().join("guide/setup.md"),
      ":::tip\nRun the script.\n:::\n\n<<< @/snippet.sh\n",
    )
    .expect("write guide");
    fs::write(input.path().join("snippet.sh"), "echo hi\n").expect("write snippet");
    fs::write(input.path().join(".drafts/wip.md"), "# WIP\n").expect("write draft");

    let config = site_config(input.path(), output.path());
    let summary = build_site(&config).expect("build succeeds");

    assert_eq!(summary.pages.len(), 2);
    assert!(!output.path().join(".drafts/wip.html").exists());

    let index =
      fs::read_to_string(output.path().join("index.html")).expect("index page");
    assert!(index.contains("<title>Welcome - Handbook</title>"), "{index}");
    assert!(index.contains("href=\"#start\""));
    assert!(index.contains("<a href=\"index.html\">Handbook</a>"));

    let setup = fs::read_to_string(output.path().join("guide/setup.html"))
      .expect("guide page");
    assert!(setup.contains("<title>Handbook</title>"));
    assert!(setup.contains("quire-callout-tip"));
    assert!(setup.contains("echo hi"));
    assert!(setup.contains("<a href=\"../index.html\">Handbook</a>"));
  }

  #[test]
  fn test_build_without_input_dir_fails() {
    let output = tempfile::tempdir().expect("failed to create temp dir");
    let config = Config {
      output_dir: output.path().to_path_buf(),
      ..Default::default()
    };
    assert!(build_site(&config).is_err());
  }
}
