//! Splitting raw level text into map and legend sections
//!
//! A level file is a block of map rows, optionally followed by a line that is
//! exactly `---` and a legend section.

/// Line that separates the map section from the legend section.
pub const SECTION_SEPARATOR: &str = "---";

/// UTF-8 byte order mark, not part of the map.
const BYTE_ORDER_MARK: char = '\u{feff}';

/// The two sections of a level file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LevelSource {
    /// Map rows, one character per tile
    pub map_rows: Vec<String>,
    /// Legend lines paired with their 1-based line number in the file
    pub legend_lines: Vec<(usize, String)>,
}

impl LevelSource {
    /// Legend lines without line numbers.
    pub fn legend_text(&self) -> impl Iterator<Item = &str> {
        self.legend_lines.iter().map(|(_, line)| line.as_str())
    }
}

/// Split level text into its map and legend sections.
///
/// Rows end at `\n` or `\r\n`; a trailing newline does not add an empty row.
/// The first row exactly equal to `---` separates the sections. Without a
/// separator the whole text is the map and the legend is empty. A leading
/// byte order mark is dropped.
pub fn split_sections(text: &str) -> LevelSource {
    let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);
    let rows: Vec<&str> = text.lines().collect();

    match rows.iter().position(|row| *row == SECTION_SEPARATOR) {
        Some(sep) => LevelSource {
            map_rows: rows[..sep].iter().map(|r| r.to_string()).collect(),
            legend_lines: rows[sep + 1..]
                .iter()
                .enumerate()
                .map(|(i, line)| (sep + 2 + i, line.to_string()))
                .collect(),
        },
        None => LevelSource {
            map_rows: rows.iter().map(|r| r.to_string()).collect(),
            legend_lines: Vec::new(),
        },
    }
}
