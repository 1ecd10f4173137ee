//! Build pipeline orchestration.
//!
//! Discovers level files, compiles them concurrently, waits for every result,
//! then builds the level index and writes the artifacts.
//!
//! Failure policy: every discovered file is compiled and every failure is
//! reported, but if any file fails no index is built and nothing is written.

use crate::assemble::{compile_source, CompileOptions, CompiledLevel};
use crate::build::progress::{NullProgress, ProgressEvent, ProgressReporter};
use crate::build::{
    discover_levels, BuildContext, BuildResult, DiscoveryError, LevelFile, LevelResult,
};
use crate::error::CompileError;
use crate::index::{build_level_index, IndexError};
use crate::models::LevelIndex;
use crate::output::{write_build_outputs, OutputError};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Error that stops a build before or after per-level compilation.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Discovery error
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),
    /// Nothing to compile
    #[error("No level files found in {0}")]
    EmptyLevelSet(String),
    /// Level index could not be built
    #[error("Index error: {0}")]
    Index(#[from] IndexError),
    /// Worker pool could not be created
    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    /// Writing artifacts failed
    #[error("Output error: {0}")]
    Output(#[from] OutputError),
}

/// Read and compile one level file.
pub fn compile_file(path: &Path, options: &CompileOptions) -> Result<CompiledLevel, CompileError> {
    let text = fs::read_to_string(path)
        .map_err(|source| CompileError::Io { path: path.to_path_buf(), source })?;
    compile_source(&text, options)
}

/// Build pipeline for compiling a level directory.
pub struct BuildPipeline {
    /// Build context
    context: BuildContext,
    /// Progress and diagnostics sink
    reporter: Arc<dyn ProgressReporter>,
    /// Whether to skip writing outputs
    dry_run: bool,
}

impl BuildPipeline {
    /// Create a new build pipeline.
    pub fn new(context: BuildContext) -> Self {
        Self { context, reporter: Arc::new(NullProgress::new()), dry_run: false }
    }

    /// Set the progress reporter.
    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Set dry-run mode (compile but don't write outputs).
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Get the build context.
    pub fn context(&self) -> &BuildContext {
        &self.context
    }

    /// Discover level files in progression order.
    pub fn discover(&self) -> Result<Vec<LevelFile>, BuildError> {
        let files = discover_levels(&self.context.src_dir(), self.context.extensions())?;
        if files.is_empty() {
            return Err(BuildError::EmptyLevelSet(self.context.src_dir().display().to_string()));
        }
        Ok(files)
    }

    /// Run the build pipeline.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        let files = match self.discover() {
            Ok(files) => files,
            Err(e) => {
                self.reporter.report(ProgressEvent::Error { id: None, message: e.to_string() });
                return Err(e);
            }
        };

        self.reporter.report(ProgressEvent::BuildStarted { total_levels: files.len() });

        let mut result = BuildResult::new();
        for level_result in self.compile_all(&files)? {
            self.report_level(&level_result);
            result.add_result(level_result);
        }

        if result.is_success() && !self.dry_run {
            result.outputs = self.write_outputs(&result)?;
        }

        result.total_duration = start.elapsed();
        self.reporter.report(ProgressEvent::BuildCompleted {
            success: result.is_success(),
            duration_ms: result.total_duration.as_millis() as u64,
            succeeded: result.success_count(),
            failed: result.failed_count(),
        });

        Ok(result)
    }

    /// Compile every file on the worker pool; results keep discovery order.
    fn compile_all(&self, files: &[LevelFile]) -> Result<Vec<LevelResult>, BuildError> {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(self.context.jobs()).build()?;
        let options = self.context.compile_options();
        Ok(pool.install(|| files.par_iter().map(|file| self.compile_one(file, &options)).collect()))
    }

    fn compile_one(&self, file: &LevelFile, options: &CompileOptions) -> LevelResult {
        let start = Instant::now();
        self.reporter.report(ProgressEvent::LevelStarted { id: file.id.clone() });
        match compile_file(&file.path, options) {
            Ok(compiled) => LevelResult::success(
                file.id.clone(),
                file.path.clone(),
                compiled.level,
                start.elapsed(),
            )
            .with_warnings(compiled.warnings),
            Err(e) => {
                LevelResult::failed(file.id.clone(), file.path.clone(), e.to_string(), start.elapsed())
            }
        }
    }

    fn report_level(&self, level: &LevelResult) {
        for warning in &level.warnings {
            self.reporter
                .report(ProgressEvent::Warning { id: Some(level.id.clone()), message: warning.clone() });
        }
        self.reporter.report(ProgressEvent::LevelCompleted {
            id: level.id.clone(),
            status: level.status.clone(),
            duration_ms: level.duration.as_millis() as u64,
        });
    }

    fn write_outputs(&self, result: &BuildResult) -> Result<Vec<PathBuf>, BuildError> {
        let (order, index) = index_from_results(result)?;
        Ok(write_build_outputs(&self.context.out_dir(), &order, &index)?)
    }
}

/// Build the level index from a fully successful build result.
///
/// Returns the level identifiers in index order alongside the index.
pub fn index_from_results(result: &BuildResult) -> Result<(Vec<String>, LevelIndex), IndexError> {
    let (order, levels): (Vec<String>, Vec<_>) = result
        .levels
        .iter()
        .filter_map(|r| r.level.clone().map(|level| (r.id.clone(), level)))
        .unzip();
    Ok((order, build_level_index(levels)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LevelsConfig;
    use crate::models::Position;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn setup(files: &[(&str, &str)]) -> (TempDir, BuildContext) {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("levels");
        fs::create_dir_all(&src).unwrap();
        for (name, content) in files {
            File::create(src.join(name)).unwrap().write_all(content.as_bytes()).unwrap();
        }
        let mut config = LevelsConfig::default();
        config.build.jobs = 2;
        let ctx = BuildContext::new(config, temp.path().to_path_buf());
        (temp, ctx)
    }

    #[test]
    fn test_build_writes_levels_and_index() {
        let (temp, ctx) = setup(&[("b.txt", "#S\n"), ("a.txt", "S.F\n")]);
        let result = BuildPipeline::new(ctx).build().unwrap();

        assert!(result.is_success());
        let ids: Vec<&str> = result.levels.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        let out = temp.path().join("build/levels");
        assert!(out.join("a.json").exists());
        assert!(out.join("b.json").exists());
        assert_eq!(result.outputs.len(), 3);

        let index: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.join("index.json")).unwrap()).unwrap();
        assert_eq!(index["order"], serde_json::json!(["a", "b"]));
        assert_eq!(index["firstLevel"]["startingPosition"]["column"], 0);
        assert_eq!(index["restLevels"][0]["startingPosition"]["column"], 1);
    }

    #[test]
    fn test_build_failure_reports_all_and_writes_nothing() {
        let (temp, ctx) =
            setup(&[("a.txt", "S.F\n"), ("b.txt", "#.F\n"), ("c.txt", "S.S\n")]);
        let result = BuildPipeline::new(ctx).build().unwrap();

        assert!(!result.is_success());
        assert_eq!(result.failed_count(), 2);
        assert_eq!(result.success_count(), 1);
        assert!(result.outputs.is_empty());
        assert!(!temp.path().join("build/levels").exists());

        let failures = result.failures();
        assert_eq!(failures[0].id, "b");
        assert!(failures[0].status.to_string().contains("no start marker"));
        assert_eq!(failures[1].id, "c");
        assert!(failures[1].status.to_string().contains("appears 2 times"));
    }

    #[test]
    fn test_build_empty_directory() {
        let (_temp, ctx) = setup(&[]);
        let err = BuildPipeline::new(ctx).build().unwrap_err();
        assert!(matches!(err, BuildError::EmptyLevelSet(_)));
    }

    #[test]
    fn test_build_missing_directory() {
        let temp = TempDir::new().unwrap();
        let ctx = BuildContext::new(LevelsConfig::default(), temp.path().to_path_buf());
        let err = BuildPipeline::new(ctx).build().unwrap_err();
        assert!(matches!(err, BuildError::Discovery(DiscoveryError::FileSystem { .. })));
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let (temp, ctx) = setup(&[("a.txt", "S\n")]);
        let result = BuildPipeline::new(ctx).with_dry_run(true).build().unwrap();
        assert!(result.is_success());
        assert!(result.outputs.is_empty());
        assert!(!temp.path().join("build/levels").exists());
    }

    #[test]
    fn test_strict_mode_fails_on_warnings() {
        let (_temp, ctx) = setup(&[("a.txt", "S\n---\nq: Ice\n")]);
        let result = BuildPipeline::new(ctx.clone()).build().unwrap();
        assert!(result.is_success());
        assert_eq!(result.levels[0].warnings.len(), 1);

        let result = BuildPipeline::new(ctx.with_strict(true)).build().unwrap();
        assert!(!result.is_success());
    }

    #[test]
    fn test_index_from_results() {
        let (_temp, ctx) = setup(&[("1.txt", "S\n"), ("2.txt", ".S\n"), ("3.txt", "..S\n")]);
        let result = BuildPipeline::new(ctx).with_dry_run(true).build().unwrap();
        let (order, index) = index_from_results(&result).unwrap();
        assert_eq!(order, vec!["1", "2", "3"]);
        assert_eq!(index.first_level.starting_position, Position::new(0, 0));
        assert_eq!(index.rest_levels.len(), 2);
        assert_eq!(index.rest_levels[1].starting_position, Position::new(0, 2));
    }

    #[test]
    fn test_compile_file_missing() {
        let temp = TempDir::new().unwrap();
        let err = compile_file(&temp.path().join("nope.txt"), &CompileOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), "filesystem");
    }
}
