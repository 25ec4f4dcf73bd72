use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command line interface for dashing
#[derive(Parser, Debug)]
#[command(author, version, about = "Generate Dash docsets from HTML documentation")]
pub struct Cli {
  /// Subcommand to execute (see [`Commands`])
  #[command(subcommand)]
  pub command: Commands,

  /// Enable verbose debug logging
  #[arg(short, long, global = true)]
  pub verbose: bool,
}

/// All supported subcommands for the dashing CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Build a docset from the files under the configured walk root.
  Build {
    /// Path to configuration file(s) (TOML, JSON or YAML, can be specified
    /// multiple times). Multiple files are merged in order, with later files
    /// overriding earlier ones. Defaults to a dashing.{toml,json,yaml,yml}
    /// in the current directory.
    #[arg(short = 'c', long = "config", action = clap::ArgAction::Append)]
    config_files: Vec<PathBuf>,

    /// Output directory for the docset. Defaults to `<package>.docset`.
    #[arg(short, long)]
    output: Option<PathBuf>,
  },

  /// Initialize a new dashing configuration file.
  Init {
    /// Path to create the configuration file at
    #[arg(short, long, default_value = "dashing.toml")]
    output: PathBuf,

    /// Format of the configuration file.
    #[arg(short = 'F', long, default_value = "toml", value_parser = ["toml", "json", "yaml"])]
    format: String,

    /// Force overwrite if file already exists
    #[arg(short, long)]
    force: bool,
  },
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
  #![allow(clippy::unwrap_used, clippy::panic, reason = "Fine in tests")]

  use super::*;

  #[test]
  fn test_build_accepts_multiple_configs() {
    let cli = Cli::try_parse_from([
      "dashing", "-v", "build", "-c", "base.toml", "-c", "extra.yaml", "-o", "out.docset",
    ])
    .unwrap();

    assert!(cli.verbose);
    let Commands::Build {
      config_files,
      output,
    } = cli.command
    else {
      panic!("expected build command");
    };
    assert_eq!(config_files, [PathBuf::from("base.toml"), PathBuf::from("extra.yaml")]);
    assert_eq!(output, Some(PathBuf::from("out.docset")));
  }

  #[test]
  fn test_init_defaults() {
    let cli = Cli::try_parse_from(["dashing", "init"]).unwrap();
    let Commands::Init {
      output,
      format,
      force,
    } = cli.command
    else {
      panic!("expected init command");
    };
    assert_eq!(output, PathBuf::from("dashing.toml"));
    assert_eq!(format, "toml");
    assert!(!force);
  }

  #[test]
  fn test_init_rejects_unknown_format() {
    assert!(Cli::try_parse_from(["dashing", "init", "-F", "ini"]).is_err());
  }

  #[test]
  fn test_command_is_required() {
    assert!(Cli::try_parse_from(["dashing"]).is_err());
  }
}
