use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Command line interface for quire
#[derive(Parser, Debug)]
#[command(author, version, about = "Quire: documentation sites from component-rich Markdown")]
pub struct Cli {
  /// Subcommand to execute (see [`Commands`])
  #[command(subcommand)]
  pub command: Commands,

  /// Enable verbose debug logging
  #[arg(short, long, global = true)]
  pub verbose: bool,

  /// Path to the configuration file. Defaults to `quire.toml` in the current
  /// directory when present.
  #[arg(short = 'c', long = "config-file", global = true)]
  pub config_file: Option<PathBuf>,
}

/// All supported subcommands for the quire CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Write a default configuration file
  Init {
    /// Path to create the configuration file at
    #[arg(short, long, default_value = "quire.toml")]
    output: PathBuf,

    /// Force overwrite if file already exists
    #[arg(short, long)]
    force: bool,
  },

  /// Render a single Markdown file to standard output.
  Render {
    /// The Markdown file to render. Snippet imports resolve against its
    /// directory.
    file: PathBuf,

    /// Print the full result (HTML, headers, title, imported files) as JSON.
    #[arg(long)]
    json: bool,
  },

  /// Render every Markdown file of a directory into HTML pages.
  Build(BuildArgs),
}

/// Flags of the `build` subcommand. Each one overrides the configuration
/// file.
#[derive(Args, Debug, Default, Clone)]
pub struct BuildArgs {
  /// Path to the directory containing markdown files.
  #[arg(short, long)]
  pub input_dir: Option<PathBuf>,

  /// Output directory for generated documentation.
  #[arg(short, long)]
  pub output_dir: Option<PathBuf>,

  /// Number of threads to use for parallel processing.
  #[arg(short = 'p', long = "jobs")]
  pub jobs: Option<usize>,

  /// Title of the documentation site.
  #[arg(short = 'T', long)]
  pub title: Option<String>,

  /// Show line numbers on every code block that does not opt out.
  #[arg(long, action = clap::ArgAction::SetTrue)]
  pub line_numbers: bool,

  /// Disable syntax highlighting.
  #[arg(long, action = clap::ArgAction::SetTrue)]
  pub no_highlight: bool,

  /// Syntax highlighting theme used for `syntax.css`.
  #[arg(long)]
  pub theme: Option<String>,
}

impl Cli {
  /// Parse command line arguments into a [`Cli`] struct.
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  #[allow(clippy::panic)]
  fn test_build_flags() {
    let cli = Cli::try_parse_from([
      "quire", "-v", "build", "-i", "docs", "-o", "out", "-p", "4", "--line-numbers",
      "--no-highlight",
    ])
    .expect("valid arguments");

    assert!(cli.verbose);
    let Commands::Build(args) = cli.command else {
      panic!("expected build command");
    };
    assert_eq!(args.input_dir, Some(PathBuf::from("docs")));
    assert_eq!(args.output_dir, Some(PathBuf::from("out")));
    assert_eq!(args.jobs, Some(4));
    assert!(args.line_numbers);
    assert!(args.no_highlight);
  }

  #[test]
  fn test_render_with_global_config_flag() {
    let cli = Cli::try_parse_from(["quire", "render", "page.md", "--json", "-c", "site.toml"])
      .expect("valid arguments");
    assert_eq!(cli.config_file, Some(PathBuf::from("site.toml")));
    assert!(matches!(cli.command, Commands::Render { json: true, .. }));
  }
}
