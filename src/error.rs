//! Error types for compiling a single level file.

use crate::models::Position;
use std::path::PathBuf;
use thiserror::Error;

/// A `@<char>` placeholder that could not be bound to a unique map position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    /// The referenced character never appears in the map section
    #[error("legend '{symbol}' references '@{target}', which does not appear in the map")]
    Unresolved { symbol: char, target: char },
    /// The referenced character appears more than once
    #[error(
        "legend '{symbol}' references '@{target}', which appears {count} times in the map (first at {first})"
    )]
    Ambiguous { symbol: char, target: char, count: usize, first: Position },
}

/// Error produced while compiling one level file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// The file could not be read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Malformed legend line or expression
    #[error("legend line {line}: {message}")]
    Format { line: usize, message: String },
    /// Unresolvable back-reference
    #[error(transparent)]
    Reference(#[from] ReferenceError),
    /// No start marker in the map section
    #[error("no start marker '{marker}' found in the map")]
    MissingStart { marker: char },
    /// More than one start marker in the map section
    #[error("start marker '{marker}' appears {} times (at {})", positions.len(), format_positions(positions))]
    AmbiguousStart { marker: char, positions: Vec<Position> },
    /// Warnings promoted to errors in strict mode
    #[error("strict mode: {}", warnings.join("; "))]
    Strict { warnings: Vec<String> },
}

impl CompileError {
    /// Construct a format error at a legend line.
    pub fn format(line: usize, message: impl Into<String>) -> Self {
        CompileError::Format { line, message: message.into() }
    }

    /// Short machine-friendly name of the error category.
    pub fn kind(&self) -> &'static str {
        match self {
            CompileError::Io { .. } => "filesystem",
            CompileError::Format { .. } => "format",
            CompileError::Reference(_) => "reference",
            CompileError::MissingStart { .. } => "missing_start",
            CompileError::AmbiguousStart { .. } => "ambiguous_start",
            CompileError::Strict { .. } => "strict",
        }
    }
}

fn format_positions(positions: &[Position]) -> String {
    positions.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(", ")
}
