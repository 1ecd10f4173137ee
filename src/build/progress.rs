//! Build progress reporting.
//!
//! All diagnostics produced during a build (per-level status, warnings,
//! errors, the final summary) flow through a [`ProgressReporter`]. The console
//! reporter writes human-readable lines to stderr; the JSON reporter writes one
//! JSON object per line for tooling.
//!
//! # Example
//!
//! ```
//! use levelsrc::build::progress::{ConsoleProgress, ProgressEvent, ProgressReporter};
//!
//! let reporter = ConsoleProgress::new().with_colors(false);
//! reporter.report(ProgressEvent::BuildStarted { total_levels: 2 });
//! ```

use serde_json::json;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::build::LevelStatus;

/// Events that can be reported during a build.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Build process started
    BuildStarted {
        /// Number of discovered level files
        total_levels: usize,
    },
    /// A level started compiling
    LevelStarted {
        /// Level identifier
        id: String,
    },
    /// A level finished compiling
    LevelCompleted {
        /// Level identifier
        id: String,
        /// Compile status
        status: LevelStatus,
        /// Duration in milliseconds
        duration_ms: u64,
    },
    /// Build process completed
    BuildCompleted {
        /// Whether every level compiled and outputs were written
        success: bool,
        /// Total duration in milliseconds
        duration_ms: u64,
        /// Number of compiled levels
        succeeded: usize,
        /// Number of failed levels
        failed: usize,
    },
    /// A warning was generated
    Warning {
        /// Level that generated the warning (if applicable)
        id: Option<String>,
        /// Warning message
        message: String,
    },
    /// An error occurred
    Error {
        /// Level that generated the error (if applicable)
        id: Option<String>,
        /// Error message
        message: String,
    },
}

/// Trait for progress reporters.
pub trait ProgressReporter: Send + Sync {
    /// Report a progress event.
    fn report(&self, event: ProgressEvent);

    /// Check if this reporter wants verbose output.
    fn is_verbose(&self) -> bool {
        false
    }
}

/// A progress reporter that discards all events.
#[derive(Debug, Default)]
pub struct NullProgress;

impl NullProgress {
    /// Create a new null progress reporter.
    pub fn new() -> Self {
        Self
    }
}

impl ProgressReporter for NullProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Console progress reporter with optional colors.
pub struct ConsoleProgress {
    use_colors: bool,
    verbose: bool,
    current: AtomicUsize,
    total: AtomicUsize,
    output: Mutex<Box<dyn Write + Send>>,
}

impl std::fmt::Debug for ConsoleProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleProgress")
            .field("use_colors", &self.use_colors)
            .field("verbose", &self.verbose)
            .field("current", &self.current)
            .field("total", &self.total)
            .finish()
    }
}

impl ConsoleProgress {
    /// Create a new console progress reporter writing to stderr.
    pub fn new() -> Self {
        Self {
            use_colors: true,
            verbose: false,
            current: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
            output: Mutex::new(Box::new(std::io::stderr())),
        }
    }

    /// Create a console progress reporter that writes to a custom output.
    pub fn with_output<W: Write + Send + 'static>(output: W) -> Self {
        Self {
            use_colors: false,
            verbose: false,
            current: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
            output: Mutex::new(Box::new(output)),
        }
    }

    /// Set whether to use colors.
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Set verbose mode.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn color(&self, text: &str, color: &str) -> String {
        if self.use_colors {
            format!("{}{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    fn green(&self, text: &str) -> String {
        self.color(text, "\x1b[32m")
    }

    fn yellow(&self, text: &str) -> String {
        self.color(text, "\x1b[33m")
    }

    fn red(&self, text: &str) -> String {
        self.color(text, "\x1b[31m")
    }

    fn cyan(&self, text: &str) -> String {
        self.color(text, "\x1b[36m")
    }

    fn writeln(&self, line: &str) {
        if let Ok(mut output) = self.output.lock() {
            let _ = writeln!(output, "{}", line);
        }
    }

    fn prefixed(id: Option<String>, message: &str) -> String {
        match id {
            Some(id) => format!("{}: {}", id, message),
            None => message.to_string(),
        }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for ConsoleProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::BuildStarted { total_levels } => {
                self.total.store(total_levels, Ordering::SeqCst);
                self.current.store(0, Ordering::SeqCst);
                self.writeln(&format!(
                    "{} Compiling {} level{}...",
                    self.cyan("[build]"),
                    total_levels,
                    if total_levels == 1 { "" } else { "s" }
                ));
            }
            ProgressEvent::LevelStarted { id } => {
                if self.verbose {
                    self.writeln(&format!("{} compiling {}...", self.cyan("[build]"), id));
                }
            }
            ProgressEvent::LevelCompleted { id, status, duration_ms } => {
                let current = self.current.fetch_add(1, Ordering::SeqCst) + 1;
                let total = self.total.load(Ordering::SeqCst);

                let status_str = match &status {
                    LevelStatus::Success => self.green("ok"),
                    LevelStatus::Failed(_) => self.red("FAILED"),
                };

                self.writeln(&format!(
                    "{} [{}/{}] {} {} ({})",
                    self.cyan("[build]"),
                    current,
                    total,
                    status_str,
                    id,
                    format_duration(duration_ms)
                ));

                if let LevelStatus::Failed(err) = status {
                    self.writeln(&format!("        {}", self.red(&err)));
                }
            }
            ProgressEvent::BuildCompleted { success, duration_ms, succeeded, failed } => {
                let duration_str = format_duration(duration_ms);
                if success {
                    self.writeln(&format!(
                        "\n{} {} {} compiled in {}",
                        self.green("[done]"),
                        succeeded,
                        if succeeded == 1 { "level" } else { "levels" },
                        duration_str
                    ));
                } else {
                    self.writeln(&format!(
                        "\n{} Build failed: {} compiled, {} {} in {}; no output written",
                        self.red("[error]"),
                        succeeded,
                        failed,
                        if failed == 1 { "failure" } else { "failures" },
                        duration_str
                    ));
                }
            }
            ProgressEvent::Warning { id, message } => {
                self.writeln(&format!("{} {}", self.yellow("[warn]"), Self::prefixed(id, &message)));
            }
            ProgressEvent::Error { id, message } => {
                self.writeln(&format!("{} {}", self.red("[error]"), Self::prefixed(id, &message)));
            }
        }
    }

    fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// JSON progress reporter for machine-readable output.
pub struct JsonProgress {
    output: Mutex<Box<dyn Write + Send>>,
}

impl std::fmt::Debug for JsonProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonProgress").finish()
    }
}

impl JsonProgress {
    /// Create a new JSON progress reporter writing to stderr.
    pub fn new() -> Self {
        Self { output: Mutex::new(Box::new(std::io::stderr())) }
    }

    /// Create a JSON progress reporter that writes to a custom output.
    pub fn with_output<W: Write + Send + 'static>(output: W) -> Self {
        Self { output: Mutex::new(Box::new(output)) }
    }

    fn write_json(&self, value: serde_json::Value) {
        if let Ok(mut output) = self.output.lock() {
            let _ = writeln!(output, "{}", value);
        }
    }
}

impl Default for JsonProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for JsonProgress {
    fn report(&self, event: ProgressEvent) {
        let value = match event {
            ProgressEvent::BuildStarted { total_levels } => {
                json!({ "event": "build_started", "total_levels": total_levels })
            }
            ProgressEvent::LevelStarted { id } => json!({ "event": "level_started", "id": id }),
            ProgressEvent::LevelCompleted { id, status, duration_ms } => {
                let status_str = if status.is_success() { "success" } else { "failed" };
                let mut value = json!({
                    "event": "level_completed",
                    "id": id,
                    "status": status_str,
                    "duration_ms": duration_ms,
                });
                if let LevelStatus::Failed(err) = status {
                    value["error"] = json!(err);
                }
                value
            }
            ProgressEvent::BuildCompleted { success, duration_ms, succeeded, failed } => json!({
                "event": "build_completed",
                "success": success,
                "duration_ms": duration_ms,
                "succeeded": succeeded,
                "failed": failed,
            }),
            ProgressEvent::Warning { id, message } => {
                json!({ "event": "warning", "id": id, "message": message })
            }
            ProgressEvent::Error { id, message } => {
                json!({ "event": "error", "id": id, "message": message })
            }
        };
        self.write_json(value);
    }
}

/// Format a duration in milliseconds to a human-readable string.
fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        let minutes = ms / 60_000;
        let seconds = (ms % 60_000) / 1000;
        format!("{}m {}s", minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Test writer for capturing output.
    struct TestWriter(Arc<Mutex<Vec<u8>>>);

    impl Write for TestWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn capture() -> (Arc<Mutex<Vec<u8>>>, TestWriter) {
        let output = Arc::new(Mutex::new(Vec::new()));
        let writer = TestWriter(Arc::clone(&output));
        (output, writer)
    }

    fn text(output: &Arc<Mutex<Vec<u8>>>) -> String {
        String::from_utf8_lossy(&output.lock().unwrap()).into_owned()
    }

    #[test]
    fn test_null_progress() {
        let reporter = NullProgress::new();
        reporter.report(ProgressEvent::BuildStarted { total_levels: 10 });
        assert!(!reporter.is_verbose());
    }

    #[test]
    fn test_console_progress_level_completed() {
        let (output, writer) = capture();
        let reporter = ConsoleProgress::with_output(writer);
        reporter.report(ProgressEvent::BuildStarted { total_levels: 2 });
        reporter.report(ProgressEvent::LevelCompleted {
            id: "Level1".to_string(),
            status: LevelStatus::Success,
            duration_ms: 3,
        });
        reporter.report(ProgressEvent::LevelCompleted {
            id: "Level2".to_string(),
            status: LevelStatus::Failed("no start marker 'S' found in the map".to_string()),
            duration_ms: 1,
        });

        let text = text(&output);
        assert!(text.contains("Compiling 2 levels"));
        assert!(text.contains("[1/2] ok Level1 (3ms)"));
        assert!(text.contains("[2/2] FAILED Level2"));
        assert!(text.contains("no start marker"));
    }

    #[test]
    fn test_console_progress_level_started_only_when_verbose() {
        let (output, writer) = capture();
        let reporter = ConsoleProgress::with_output(writer);
        reporter.report(ProgressEvent::LevelStarted { id: "quiet".to_string() });
        assert!(text(&output).is_empty());

        let (output, writer) = capture();
        let reporter = ConsoleProgress::with_output(writer).with_verbose(true);
        reporter.report(ProgressEvent::LevelStarted { id: "loud".to_string() });
        assert!(text(&output).contains("compiling loud"));
        assert!(reporter.is_verbose());
    }

    #[test]
    fn test_console_progress_build_completed() {
        let (output, writer) = capture();
        let reporter = ConsoleProgress::with_output(writer);
        reporter.report(ProgressEvent::BuildCompleted {
            success: false,
            duration_ms: 1500,
            succeeded: 3,
            failed: 1,
        });
        let text = text(&output);
        assert!(text.contains("1 failure in 1.5s"));
        assert!(text.contains("no output written"));
    }

    #[test]
    fn test_console_progress_warning() {
        let (output, writer) = capture();
        let reporter = ConsoleProgress::with_output(writer);
        reporter.report(ProgressEvent::Warning {
            id: Some("Level1".to_string()),
            message: "legend symbol 'z' does not appear in the map".to_string(),
        });
        let text = text(&output);
        assert!(text.contains("[warn] Level1: legend symbol 'z'"));
    }

    #[test]
    fn test_json_progress_events() {
        let (output, writer) = capture();
        let reporter = JsonProgress::with_output(writer);
        reporter.report(ProgressEvent::BuildStarted { total_levels: 1 });
        reporter.report(ProgressEvent::LevelCompleted {
            id: "Level\"1".to_string(),
            status: LevelStatus::Failed("bad".to_string()),
            duration_ms: 7,
        });

        let text = text(&output);
        let lines: Vec<serde_json::Value> =
            text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(lines[0]["event"], "build_started");
        assert_eq!(lines[0]["total_levels"], 1);
        assert_eq!(lines[1]["id"], "Level\"1");
        assert_eq!(lines[1]["status"], "failed");
        assert_eq!(lines[1]["error"], "bad");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(500), "500ms");
        assert_eq!(format_duration(1500), "1.5s");
        assert_eq!(format_duration(125_000), "2m 5s");
    }
}
