//! Level assembly: tile grid construction and start detection
//!
//! [`compile_source`] runs the whole per-file pipeline on level text:
//! section split, legend resolution, classification and assembly.

use crate::classify::{TileClassifier, DEFAULT_START_MARKER};
use crate::error::CompileError;
use crate::legend::{resolve_legend, Legend};
use crate::models::{Level, Position, Tile};
use crate::parser::split_sections;

/// Options affecting how a single level is compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Character marking the starting position (classified as Floor)
    pub start_marker: char,
    /// Treat warnings as errors
    pub strict: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self { start_marker: DEFAULT_START_MARKER, strict: false }
    }
}

/// Output of compiling one level file.
#[derive(Debug, Clone)]
pub struct CompiledLevel {
    pub level: Level,
    pub legend: Legend,
    pub warnings: Vec<String>,
}

/// Build the tile grid and locate the unique start marker.
///
/// Rows are padded with Empty to the width of the widest row.
pub fn assemble_level<S: AsRef<str>>(
    map_rows: &[S],
    classifier: &TileClassifier<'_>,
) -> Result<Level, CompileError> {
    let marker = classifier.start_marker();
    let width = map_rows.iter().map(|r| r.as_ref().chars().count()).max().unwrap_or(0);

    let mut tiles = Vec::with_capacity(map_rows.len());
    let mut starts = Vec::new();

    for (row, text) in map_rows.iter().enumerate() {
        let mut tile_row: Vec<Tile> = Vec::with_capacity(width);
        for (column, ch) in text.as_ref().chars().enumerate() {
            if ch == marker {
                starts.push(Position::new(row, column));
            }
            tile_row.push(classifier.classify(ch));
        }
        tile_row.resize(width, Tile::Empty);
        tiles.push(tile_row);
    }

    let starting_position = match starts.as_slice() {
        [] => return Err(CompileError::MissingStart { marker }),
        [only] => *only,
        _ => return Err(CompileError::AmbiguousStart { marker, positions: starts }),
    };

    Ok(Level { tiles, starting_position })
}

/// Compile the text of one level file.
pub fn compile_source(text: &str, options: &CompileOptions) -> Result<CompiledLevel, CompileError> {
    let source = split_sections(text);
    let legend = resolve_legend(&source.map_rows, &source.legend_lines)?;
    let classifier = TileClassifier::new(&legend, options.start_marker);
    let level = assemble_level(&source.map_rows, &classifier)?;

    let warnings = legend_warnings(&legend, &classifier, &source.map_rows);
    if options.strict && !warnings.is_empty() {
        return Err(CompileError::Strict { warnings });
    }

    Ok(CompiledLevel { level, legend, warnings })
}

fn legend_warnings(
    legend: &Legend,
    classifier: &TileClassifier<'_>,
    map_rows: &[String],
) -> Vec<String> {
    let mut warnings = Vec::new();
    for entry in legend.entries() {
        if classifier.is_builtin(entry.symbol) {
            warnings.push(format!(
                "line {}: legend symbol '{}' is a built-in tile and will be ignored",
                entry.line, entry.symbol
            ));
        } else if !map_rows.iter().any(|row| row.contains(entry.symbol)) {
            warnings.push(format!(
                "line {}: legend symbol '{}' does not appear in the map",
                entry.line, entry.symbol
            ));
        }
    }
    warnings
}
