use std::{
  fs,
  io::{self, Write},
};

use color_eyre::eyre::{Context, Result, bail};
use log::{LevelFilter, info};
use quire_markdown::process_markdown_file;

mod build;
mod cli;
mod config;
mod error;

use cli::{Cli, Commands};
use config::Config;

fn main() -> Result<()> {
  color_eyre::install()?;

  let cli = Cli::parse_args();

  env_logger::Builder::new()
    .filter_level(if cli.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    })
    .write_style(env_logger::WriteStyle::Always)
    .init();

  match cli.command {
    Commands::Init { ref output, force } => {
      if output.exists() && !force {
        bail!(
          "Configuration file already exists: {}. Use --force to overwrite.",
          output.display()
        );
      }

      if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
      {
        fs::create_dir_all(parent).wrap_err_with(|| {
          format!("Failed to create directory: {}", parent.display())
        })?;
        info!("Created directory: {}", parent.display());
      }

      Config::generate_default_config(output).wrap_err_with(|| {
        format!("Failed to generate configuration file: {}", output.display())
      })?;
      info!(
        "Configuration file created successfully. Edit it to customize your \
         site."
      );
      Ok(())
    },

    Commands::Render { ref file, json } => {
      let config = Config::load(cli.config_file.as_deref())?;
      let result = process_markdown_file(file, config.markdown_options())
        .map_err(|e| color_eyre::eyre::eyre!(e))?;

      let output = if json {
        serde_json::to_string_pretty(&result)
          .wrap_err("Failed to serialize render result")?
      } else {
        result.html
      };

      let mut stdout = io::stdout().lock();
      writeln!(stdout, "{output}").wrap_err("Failed to write output")?;
      Ok(())
    },

    Commands::Build(ref args) => {
      let mut config = Config::load(cli.config_file.as_deref())?;
      config.merge_with_cli(args);
      config.validate()?;

      build::build_site(&config)?;
      Ok(())
    },
  }
}
