use std::{
  fs,
  path::{Path, PathBuf},
};

use color_eyre::eyre::{Context, Result};
use dashing::{
  cli::{Cli, Commands},
  docset,
};
use dashing_config::Config;
use log::{LevelFilter, info};

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
    Commands::Init {
      output,
      format,
      force,
    } => init(&output, &format, force),
    Commands::Build {
      config_files,
      output,
    } => build(&config_files, output),
  }
}

fn init(output: &Path, format: &str, force: bool) -> Result<()> {
  // Create parent directories if needed
  if let Some(parent) = output.parent()
    && !parent.as_os_str().is_empty()
    && !parent.exists()
  {
    fs::create_dir_all(parent).wrap_err_with(|| {
      format!("Failed to create directory: {}", parent.display())
    })?;
    info!("Created directory: {}", parent.display());
  }

  Config::generate_default_config(format, output, force).wrap_err_with(|| {
    format!("Failed to generate configuration file: {}", output.display())
  })?;

  info!(
    "Configuration file created successfully. Edit it to describe your \
     documentation, then run `dashing build`."
  );
  Ok(())
}

fn build(config_files: &[PathBuf], output: Option<PathBuf>) -> Result<()> {
  let config = Config::load(config_files).wrap_err("Failed to load configuration")?;
  let output = output.unwrap_or_else(|| config.default_output_dir());

  docset::build(&config, &output)?;
  Ok(())
}
