//! Site configuration: `quire.toml` plus command line overrides.
use std::{
  fs,
  path::{Path, PathBuf},
  sync::OnceLock,
};

use quire_markdown::{MarkdownOptions, MarkdownOptionsBuilder, TabStyle};
use serde::{Deserialize, Serialize};

use crate::{cli::BuildArgs, error::ConfigError};

/// Configuration for a quire site build.
///
/// Loaded from TOML; every field has a default, so an empty file (or no file)
/// is valid as long as an input directory is supplied on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Directory containing the Markdown sources.
  pub input_dir: Option<PathBuf>,

  /// Output directory for generated pages.
  pub output_dir: PathBuf,

  /// Site title.
  pub title: String,

  /// Number of worker threads.
  pub jobs: Option<usize>,

  /// Whether to syntax highlight fenced code.
  pub highlight_code: bool,

  /// Highlighting theme for `syntax.css`.
  pub highlight_theme: Option<String>,

  /// Line numbers on by default.
  pub line_numbers: bool,

  /// Hard tab handling in code blocks.
  pub tab_style: TabStyleConfig,
}

/// Serialized form of [`TabStyle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabStyleConfig {
  #[default]
  None,
  Warn,
  Normalize,
}

impl From<TabStyleConfig> for TabStyle {
  fn from(style: TabStyleConfig) -> Self {
    match style {
      TabStyleConfig::None => Self::None,
      TabStyleConfig::Warn => Self::Warn,
      TabStyleConfig::Normalize => Self::Normalize,
    }
  }
}

impl Default for Config {
  fn default() -> Self {
    Self {
      input_dir:       None,
      output_dir:      PathBuf::from("build"),
      title:           "Documentation".to_string(),
      jobs:            None,
      highlight_code:  true,
      highlight_theme: None,
      line_numbers:    false,
      tab_style:       TabStyleConfig::None,
    }
  }
}

impl Config {
  /// Load configuration from a TOML file.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or is not valid TOML.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to read config file: {}: {}",
        path.display(),
        e
      ))
    })?;

    toml::from_str(&content).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to parse TOML config from {}: {}",
        path.display(),
        e
      ))
    })
  }

  /// Load the explicitly given file, else a discovered one, else defaults.
  ///
  /// # Errors
  ///
  /// Returns an error if a config file exists but cannot be loaded.
  pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
    if let Some(path) = config_file {
      return Self::from_file(path);
    }

    match Self::find_config_file() {
      Some(discovered) => {
        log::info!("Using discovered config file: {}", discovered.display());
        Self::from_file(&discovered)
      },
      None => Ok(Self::default()),
    }
  }

  /// Look for a config file in the current directory.
  #[must_use]
  pub fn find_config_file() -> Option<PathBuf> {
    static RESULT: OnceLock<Option<PathBuf>> = OnceLock::new();
    RESULT
      .get_or_init(|| {
        let current_dir = std::env::current_dir().ok()?;
        ["quire.toml", ".quire.toml", ".config/quire.toml"]
          .iter()
          .map(|name| current_dir.join(name))
          .find(|path| path.is_file())
      })
      .clone()
  }

  /// Apply `build` flags on top of the loaded values.
  pub fn merge_with_cli(&mut self, args: &BuildArgs) {
    if let Some(ref input_dir) = args.input_dir {
      self.input_dir = Some(input_dir.clone());
    }
    if let Some(ref output_dir) = args.output_dir {
      self.output_dir.clone_from(output_dir);
    }
    if let Some(ref title) = args.title {
      self.title.clone_from(title);
    }
    if args.jobs.is_some() {
      self.jobs = args.jobs;
    }
    if args.theme.is_some() {
      self.highlight_theme.clone_from(&args.theme);
    }
    if args.line_numbers {
      self.line_numbers = true;
    }
    if args.no_highlight {
      self.highlight_code = false;
    }
  }

  /// Check that the configuration can drive a build.
  ///
  /// # Errors
  ///
  /// Returns every problem found, one per line.
  pub fn validate(&self) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    match self.input_dir {
      None => {
        errors.push(
          "No input directory given; set `input_dir` or pass --input-dir"
            .to_string(),
        );
      },
      Some(ref input_dir) if !input_dir.is_dir() => {
        errors.push(format!(
          "Input directory does not exist: {}",
          input_dir.display()
        ));
      },
      Some(_) => {},
    }

    if self.jobs == Some(0) {
      errors.push("`jobs` must be at least 1".to_string());
    }

    if self.output_dir.is_file() {
      errors.push(format!(
        "Output path is a file: {}",
        self.output_dir.display()
      ));
    }

    if errors.is_empty() {
      Ok(())
    } else {
      Err(ConfigError::Config(format!(
        "Configuration validation errors:\n{}",
        errors.join("\n")
      )))
    }
  }

  /// Processor options described by this configuration.
  #[must_use]
  pub fn markdown_options(&self) -> MarkdownOptions {
    MarkdownOptionsBuilder::new()
      .highlight_code(self.highlight_code)
      .highlight_theme(self.highlight_theme.as_deref())
      .line_numbers(self.line_numbers)
      .tab_style(self.tab_style.into())
      .build()
  }

  /// Write the commented default configuration to `path`.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be written.
  pub fn generate_default_config(path: &Path) -> Result<(), ConfigError> {
    fs::write(path, include_str!("../templates/quire.toml")).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to write default config to {}: {}",
        path.display(),
        e
      ))
    })?;

    log::info!("Created default configuration file: {}", path.display());
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_template_parses() {
    let config: Config = toml::from_str(include_str!("../templates/quire.toml"))
      .expect("default template is valid");
    assert_eq!(config.input_dir, Some(PathBuf::from("docs")));
    assert_eq!(config.output_dir, PathBuf::from("build"));
    assert!(config.highlight_code);
  }

  #[test]
  fn test_partial_file_uses_defaults() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("quire.toml");
    fs::write(&path, "title = \"Handbook\"\ntab_style = \"normalize\"\n")
      .expect("write config");

    let config = Config::load(Some(path.as_path())).expect("load config");
    assert_eq!(config.title, "Handbook");
    assert_eq!(config.tab_style, TabStyleConfig::Normalize);
    assert_eq!(config.output_dir, PathBuf::from("build"));
    assert_eq!(config.markdown_options().tab_style, TabStyle::Normalize);
  }

  #[test]
  fn test_invalid_toml_is_reported() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("quire.toml");
    fs::write(&path, "tab_style = \"sideways\"\n").expect("write config");

    let err = Config::from_file(&path).expect_err("unknown tab style");
    assert!(err.to_string().contains("Failed to parse TOML config"));
  }

  #[test]
  fn test_cli_overrides_file() {
    let mut config = Config {
      title: "File".to_string(),
      ..Default::default()
    };
    config.merge_with_cli(&BuildArgs {
      input_dir: Some(PathBuf::from("src")),
      title: Some("Flag".to_string()),
      no_highlight: true,
      ..Default::default()
    });

    assert_eq!(config.input_dir, Some(PathBuf::from("src")));
    assert_eq!(config.title, "Flag");
    assert!(!config.highlight_code);
    assert!(!config.line_numbers);
  }

  #[test]
  fn test_validate_collects_errors() {
    let config = Config {
      jobs: Some(0),
      ..Default::default()
    };
    let message = config.validate().expect_err("invalid").to_string();
    assert!(message.contains("No input directory"));
    assert!(message.contains("`jobs` must be at least 1"));

    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let config = Config {
      input_dir: Some(dir.path().to_path_buf()),
      ..Default::default()
    };
    assert!(config.validate().is_ok());
  }
}
