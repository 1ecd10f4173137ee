//! Build result types.
//!
//! Contains types for representing the outcome of compiling each level file.

use crate::models::Level;
use std::path::PathBuf;
use std::time::Duration;

/// Status of a single level file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelStatus {
    /// Compiled successfully
    Success,
    /// Failed with a reason
    Failed(String),
}

impl LevelStatus {
    /// Check if the status indicates success.
    pub fn is_success(&self) -> bool {
        matches!(self, LevelStatus::Success)
    }

    /// Check if the status indicates failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, LevelStatus::Failed(_))
    }
}

impl std::fmt::Display for LevelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LevelStatus::Success => write!(f, "success"),
            LevelStatus::Failed(err) => write!(f, "failed: {}", err),
        }
    }
}

/// Result of compiling a single level file.
#[derive(Debug, Clone)]
pub struct LevelResult {
    /// Level identifier
    pub id: String,
    /// Source file
    pub path: PathBuf,
    /// Compile status
    pub status: LevelStatus,
    /// Compiled level (present on success)
    pub level: Option<Level>,
    /// Compile duration
    pub duration: Duration,
    /// Warning messages (if any)
    pub warnings: Vec<String>,
}

impl LevelResult {
    /// Create a successful result.
    pub fn success(id: String, path: PathBuf, level: Level, duration: Duration) -> Self {
        Self {
            id,
            path,
            status: LevelStatus::Success,
            level: Some(level),
            duration,
            warnings: vec![],
        }
    }

    /// Create a failed result.
    pub fn failed(id: String, path: PathBuf, error: String, duration: Duration) -> Self {
        Self { id, path, status: LevelStatus::Failed(error), level: None, duration, warnings: vec![] }
    }

    /// Add warnings to the result.
    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    /// Check if this result is successful.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Result of a complete build run.
#[derive(Debug, Default)]
pub struct BuildResult {
    /// Results for each level, in discovery order
    pub levels: Vec<LevelResult>,
    /// Files written (empty unless every level compiled)
    pub outputs: Vec<PathBuf>,
    /// Total build duration
    pub total_duration: Duration,
}

impl BuildResult {
    /// Create a new empty build result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a level result.
    pub fn add_result(&mut self, result: LevelResult) {
        self.levels.push(result);
    }

    /// Get the number of successful levels.
    pub fn success_count(&self) -> usize {
        self.levels.iter().filter(|r| r.status.is_success()).count()
    }

    /// Get the number of failed levels.
    pub fn failed_count(&self) -> usize {
        self.levels.iter().filter(|r| r.status.is_failure()).count()
    }

    /// Check if the overall build succeeded (no failures).
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }

    /// Get all warnings, prefixed with their level identifier.
    pub fn all_warnings(&self) -> Vec<String> {
        self.levels
            .iter()
            .flat_map(|r| r.warnings.iter().map(move |w| format!("{}: {}", r.id, w)))
            .collect()
    }

    /// Get failed level results.
    pub fn failures(&self) -> Vec<&LevelResult> {
        self.levels.iter().filter(|r| r.status.is_failure()).collect()
    }

    /// Format a summary of the build result.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();

        let success = self.success_count();
        let failed = self.failed_count();
        let total = self.levels.len();

        if failed > 0 {
            lines.push(format!(
                "Build failed: {} compiled, {} failed ({} total)",
                success, failed, total
            ));
            for level in self.failures() {
                lines.push(format!("  - {} ({}): {}", level.id, level.path.display(), level.status));
            }
        } else {
            lines.push(format!(
                "Build succeeded: {} levels compiled in {:?}",
                total, self.total_duration
            ));
        }

        let warnings = self.all_warnings();
        if !warnings.is_empty() {
            lines.push(format!("Warnings ({}): ", warnings.len()));
            for warning in warnings.iter().take(5) {
                lines.push(format!("  - {}", warning));
            }
            if warnings.len() > 5 {
                lines.push(format!("  ... and {} more", warnings.len() - 5));
            }
        }

        lines.join("\n")
    }
}
