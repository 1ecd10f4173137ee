//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod build;
mod check;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::loader::{find_config, load_config};
use crate::config::{default_config, LevelsConfig};

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Levelsrc - compile ASCII level maps into level data
#[derive(Parser)]
#[command(name = "lvl")]
#[command(about = "Levelsrc - compile plain-text level maps into level data for the game runtime")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile every level in a directory and write level data plus index.json
    Build {
        /// Directory containing level files (default: from levels.toml, else ./levels)
        src: Option<PathBuf>,

        /// Output directory (default: from levels.toml, else ./build/levels)
        out: Option<PathBuf>,

        /// Path to levels.toml (default: search upward from the current directory)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of worker threads (0 = available parallelism)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Strict mode: treat warnings as errors
        #[arg(long)]
        strict: bool,

        /// Compile and report, but do not write any files
        #[arg(long)]
        dry_run: bool,

        /// Emit progress as JSON lines
        #[arg(long)]
        json: bool,

        /// Show per-level progress
        #[arg(short, long)]
        verbose: bool,
    },

    /// Compile individual level files and report problems without writing output
    Check {
        /// Level files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Strict mode: treat warnings as errors
        #[arg(long)]
        strict: bool,

        /// Override the start marker character
        #[arg(long)]
        start_marker: Option<char>,
    },

    /// Compile one level file and print its grid and resolved legend
    Show {
        /// Level file to show
        file: PathBuf,

        /// Print the compiled level as JSON instead
        #[arg(long)]
        json: bool,

        /// Override the start marker character
        #[arg(long)]
        start_marker: Option<char>,
    },
}

/// Resolve configuration and project root.
///
/// An explicit path must load; otherwise `levels.toml` is searched upward
/// from the current directory, falling back to defaults.
pub(crate) fn resolve_config(explicit: Option<&Path>) -> Result<(LevelsConfig, PathBuf), String> {
    let cwd = std::env::current_dir().unwrap_or_default();
    let config_path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(path) => {
            let config = load_config(Some(&path)).map_err(|e| format!("{}: {}", path.display(), e))?;
            let root = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| p.to_path_buf())
                .unwrap_or(cwd);
            Ok((config, root))
        }
        None => Ok((default_config(), cwd)),
    }
}

/// Entry point for the `lvl` binary.
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { src, out, config, jobs, strict, dry_run, json, verbose } => {
            build::run_build(build::BuildArgs {
                src,
                out,
                config,
                jobs,
                strict,
                dry_run,
                json,
                verbose,
            })
        }
        Commands::Check { files, strict, start_marker } => {
            check::run_check(&files, strict, start_marker)
        }
        Commands::Show { file, json, start_marker } => check::run_show(&file, json, start_marker),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_build_positional_dirs() {
        let cli = Cli::try_parse_from(["lvl", "build", "levels", "out", "--jobs", "3"]).unwrap();
        match cli.command {
            Commands::Build { src, out, jobs, strict, .. } => {
                assert_eq!(src, Some(PathBuf::from("levels")));
                assert_eq!(out, Some(PathBuf::from("out")));
                assert_eq!(jobs, Some(3));
                assert!(!strict);
            }
            _ => panic!("expected build command"),
        }
    }

    #[test]
    fn test_parse_check_requires_files() {
        assert!(Cli::try_parse_from(["lvl", "check"]).is_err());
        assert!(Cli::try_parse_from(["lvl", "check", "a.txt", "--start-marker", "P"]).is_ok());
    }
}
