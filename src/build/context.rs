//! Build context containing configuration and state for a build.

use crate::assemble::CompileOptions;
use crate::config::loader::resolve_path;
use crate::config::LevelsConfig;
use std::path::{Path, PathBuf};

/// Build context containing configuration and paths for a compile run.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// The loaded configuration
    config: LevelsConfig,
    /// Project root directory (where levels.toml is located)
    project_root: PathBuf,
}

impl BuildContext {
    /// Create a new build context.
    pub fn new(config: LevelsConfig, project_root: PathBuf) -> Self {
        Self { config, project_root }
    }

    /// Get the configuration.
    pub fn config(&self) -> &LevelsConfig {
        &self.config
    }

    /// Get the project root directory.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Get the level source directory (resolved to absolute path).
    pub fn src_dir(&self) -> PathBuf {
        resolve_path(&self.project_root, &self.config.project.src)
    }

    /// Get the output directory (resolved to absolute path).
    pub fn out_dir(&self) -> PathBuf {
        resolve_path(&self.project_root, &self.config.project.out)
    }

    /// Recognized level file extensions.
    pub fn extensions(&self) -> &[String] {
        &self.config.format.extensions
    }

    /// Whether strict mode is enabled.
    pub fn is_strict(&self) -> bool {
        self.config.build.strict
    }

    /// Set strict mode.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.config.build.strict = strict;
        self
    }

    /// Worker count for per-file compilation.
    pub fn jobs(&self) -> usize {
        match self.config.build.jobs {
            0 => std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            n => n,
        }
    }

    /// Options for compiling each level.
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            start_marker: self.config.format.start_marker,
            strict: self.config.build.strict,
        }
    }
}
