//! Check and show command implementations

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::{resolve_config, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::assemble::CompileOptions;
use crate::build::compile_file;
use crate::config::loader::validate_config;
use crate::output::{render_legend_text, render_level_text, to_json};

/// Compile options from the nearest levels.toml plus command-line overrides.
fn compile_options(strict: bool, start_marker: Option<char>) -> Result<CompileOptions, String> {
    let (mut config, _) = resolve_config(None)?;
    if let Some(marker) = start_marker {
        config.format.start_marker = marker;
    }
    if strict {
        config.build.strict = true;
    }
    validate_config(&config).map_err(|e| e.to_string())?;
    Ok(CompileOptions { start_marker: config.format.start_marker, strict: config.build.strict })
}

/// Run the check command
pub fn run_check(files: &[PathBuf], strict: bool, start_marker: Option<char>) -> ExitCode {
    let options = match compile_options(strict, start_marker) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let mut failed = 0;
    for path in files {
        match compile_file(path, &options) {
            Ok(compiled) => {
                println!(
                    "{}: ok ({}x{}, start {})",
                    path.display(),
                    compiled.level.width(),
                    compiled.level.height(),
                    compiled.level.starting_position
                );
                for warning in &compiled.warnings {
                    println!("  warning: {}", warning);
                }
            }
            Err(e) => {
                failed += 1;
                eprintln!("{}: error[{}]: {}", path.display(), e.kind(), e);
            }
        }
    }

    if failed == 0 {
        ExitCode::from(EXIT_SUCCESS)
    } else {
        eprintln!("{} of {} files failed", failed, files.len());
        ExitCode::from(EXIT_ERROR)
    }
}

/// Run the show command
pub fn run_show(file: &Path, json: bool, start_marker: Option<char>) -> ExitCode {
    let options = match compile_options(false, start_marker) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let compiled = match compile_file(file, &options) {
        Ok(compiled) => compiled,
        Err(e) => {
            eprintln!("{}: error[{}]: {}", file.display(), e.kind(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    if json {
        return match to_json(&compiled.level) {
            Ok(text) => {
                print!("{}", text);
                ExitCode::from(EXIT_SUCCESS)
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::from(EXIT_ERROR)
            }
        };
    }

    print!("{}", render_level_text(&compiled.level, &compiled.legend, options.start_marker));
    if !compiled.legend.is_empty() {
        println!();
        print!("{}", render_legend_text(&compiled.legend));
    }
    for warning in &compiled.warnings {
        eprintln!("warning: {}", warning);
    }
    ExitCode::from(EXIT_SUCCESS)
}
