//! Configuration schema types for `levels.toml`
//!
//! Defines the structure and validation rules for level project configuration.

use crate::classify::{BUILTIN_SYMBOLS, DEFAULT_START_MARKER};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Project metadata section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name
    #[serde(default = "default_name")]
    pub name: String,
    /// Directory containing level files
    #[serde(default = "default_src")]
    pub src: PathBuf,
    /// Directory receiving compiled level data
    #[serde(default = "default_out")]
    pub out: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self { name: default_name(), src: default_src(), out: default_out() }
    }
}

fn default_name() -> String {
    "levels".to_string()
}

fn default_src() -> PathBuf {
    PathBuf::from("levels")
}

fn default_out() -> PathBuf {
    PathBuf::from("build/levels")
}

/// Level file format settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatConfig {
    /// Character marking the player's starting position
    #[serde(default = "default_start_marker")]
    pub start_marker: char,
    /// Recognized level file extensions (without the leading dot)
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self { start_marker: default_start_marker(), extensions: default_extensions() }
    }
}

fn default_start_marker() -> char {
    DEFAULT_START_MARKER
}

fn default_extensions() -> Vec<String> {
    vec!["txt".to_string()]
}

/// Build behaviour settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Treat warnings as errors
    #[serde(default)]
    pub strict: bool,
    /// Worker threads for per-file compilation (0 = available parallelism)
    #[serde(default)]
    pub jobs: usize,
}

/// Complete `levels.toml` configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelsConfig {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub format: FormatConfig,
    #[serde(default)]
    pub build: BuildConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "format.start_marker")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "levels.toml: '{}' {}", self.field, self.message)
    }
}

impl LevelsConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        let marker = self.format.start_marker;
        if BUILTIN_SYMBOLS.contains(&marker) || marker == '-' || marker.is_whitespace() {
            errors.push(ConfigValidationError {
                field: "format.start_marker".to_string(),
                message: format!("'{}' collides with a built-in map symbol", marker),
            });
        }

        if self.format.extensions.is_empty() {
            errors.push(ConfigValidationError {
                field: "format.extensions".to_string(),
                message: "must list at least one extension".to_string(),
            });
        }
        for ext in &self.format.extensions {
            if ext.is_empty() || ext.starts_with('.') || ext.contains(['/', '\\', '*']) {
                errors.push(ConfigValidationError {
                    field: "format.extensions".to_string(),
                    message: format!("'{}' must be a bare extension such as \"txt\"", ext),
                });
            }
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: LevelsConfig = toml::from_str("").unwrap();
        assert_eq!(config.project.src, PathBuf::from("levels"));
        assert_eq!(config.project.out, PathBuf::from("build/levels"));
        assert_eq!(config.format.start_marker, 'S');
        assert_eq!(config.format.extensions, vec!["txt"]);
        assert!(!config.build.strict);
        assert_eq!(config.build.jobs, 0);
        assert!(config.is_valid());
    }

    #[test]
    fn test_full_config_parse() {
        let toml = r#"
[project]
name = "puzzle"
src = "data/levels"
out = "dist"

[format]
start_marker = "P"
extensions = ["txt", "lvl"]

[build]
strict = true
jobs = 4
"#;
        let config: LevelsConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.project.name, "puzzle");
        assert_eq!(config.project.src, PathBuf::from("data/levels"));
        assert_eq!(config.format.start_marker, 'P');
        assert_eq!(config.format.extensions.len(), 2);
        assert!(config.build.strict);
        assert_eq!(config.build.jobs, 4);
    }

    #[test]
    fn test_start_marker_must_be_single_char() {
        let result: Result<LevelsConfig, _> = toml::from_str("[format]\nstart_marker = \"SS\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_builtin_start_marker() {
        let mut config = LevelsConfig::default();
        config.format.start_marker = 'F';
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "format.start_marker");
    }

    #[test]
    fn test_validate_extensions() {
        let mut config = LevelsConfig::default();
        config.format.extensions = vec![".txt".to_string(), "*".to_string()];
        assert_eq!(config.validate().len(), 2);

        config.format.extensions.clear();
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("at least one"));
    }
}
