//! Build command implementation

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use super::{resolve_config, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::build::progress::{ConsoleProgress, JsonProgress, ProgressEvent, ProgressReporter};
use crate::build::{BuildContext, BuildError, BuildPipeline};
use crate::config::loader::{merge_cli_overrides, validate_config, CliOverrides};

/// Arguments for `lvl build`.
pub struct BuildArgs {
    pub src: Option<PathBuf>,
    pub out: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub jobs: Option<usize>,
    pub strict: bool,
    pub dry_run: bool,
    pub json: bool,
    pub verbose: bool,
}

/// Run the build command
pub fn run_build(args: BuildArgs) -> ExitCode {
    let (mut config, project_root) = match resolve_config(args.config.as_deref()) {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    if args.verbose && !args.json {
        eprintln!("Project root: {}", project_root.display());
    }

    // Positional directories are relative to where the command runs, not to levels.toml
    let cwd = std::env::current_dir().unwrap_or_default();
    let overrides = CliOverrides {
        src: args.src.map(|p| cwd.join(p)),
        out: args.out.map(|p| cwd.join(p)),
        strict: args.strict.then_some(true),
        jobs: args.jobs,
    };
    merge_cli_overrides(&mut config, &overrides);
    if let Err(e) = validate_config(&config) {
        eprintln!("Error: {}", e);
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let context = BuildContext::new(config, project_root);
    let src_dir = context.src_dir();
    let out_dir = context.out_dir();

    let reporter: Arc<dyn ProgressReporter> = if args.json {
        Arc::new(JsonProgress::new())
    } else {
        Arc::new(
            ConsoleProgress::new()
                .with_colors(atty::is(atty::Stream::Stderr))
                .with_verbose(args.verbose),
        )
    };

    if args.dry_run && !args.json {
        println!("Dry run - would build:");
        println!("  Source: {}", src_dir.display());
        println!("  Output: {}", out_dir.display());
    }

    let pipeline = BuildPipeline::new(context)
        .with_reporter(Arc::clone(&reporter))
        .with_dry_run(args.dry_run);

    match pipeline.build() {
        Ok(result) => {
            if args.json {
                return if result.is_success() {
                    ExitCode::from(EXIT_SUCCESS)
                } else {
                    ExitCode::from(EXIT_ERROR)
                };
            }

            if args.dry_run {
                println!("  Levels: {}", result.levels.len());
                for level in &result.levels {
                    println!("    - {} ({})", level.id, level.status);
                }
            } else if args.verbose {
                for output in &result.outputs {
                    println!("  wrote {}", output.display());
                }
            }

            if result.is_success() {
                println!("{}", result.summary());
                ExitCode::from(EXIT_SUCCESS)
            } else {
                eprintln!("{}", result.summary());
                ExitCode::from(EXIT_ERROR)
            }
        }
        Err(e) => {
            // Discovery problems were already reported by the pipeline
            if !matches!(e, BuildError::Discovery(_) | BuildError::EmptyLevelSet(_)) {
                reporter.report(ProgressEvent::Error { id: None, message: e.to_string() });
            }
            if !args.json && !src_dir.is_dir() {
                eprintln!("Create the directory or pass a different source directory");
            }
            ExitCode::from(EXIT_ERROR)
        }
    }
}
