//! Character to tile classification

use crate::legend::Legend;
use crate::models::Tile;

/// Default start marker.
pub const DEFAULT_START_MARKER: char = 'S';

/// Characters with a fixed meaning, excluding the start marker.
pub const BUILTIN_SYMBOLS: [char; 3] = ['#', 'F', 'R'];

/// Maps map characters to tiles for one level.
///
/// Built-in symbols win over legend entries; unknown characters are Empty.
#[derive(Debug, Clone, Copy)]
pub struct TileClassifier<'a> {
    legend: &'a Legend,
    start_marker: char,
}

impl<'a> TileClassifier<'a> {
    pub fn new(legend: &'a Legend, start_marker: char) -> Self {
        Self { legend, start_marker }
    }

    pub fn start_marker(&self) -> char {
        self.start_marker
    }

    /// Whether `ch` has a built-in meaning (including the start marker).
    pub fn is_builtin(&self, ch: char) -> bool {
        ch == self.start_marker || BUILTIN_SYMBOLS.contains(&ch)
    }

    /// Classify one map character.
    pub fn classify(&self, ch: char) -> Tile {
        match ch {
            '#' => Tile::Floor,
            c if c == self.start_marker => Tile::Floor,
            'F' => Tile::Finish,
            'R' => Tile::RustyFloor,
            c => match self.legend.get(c) {
                Some(custom) => Tile::Custom(custom.clone()),
                None => Tile::Empty,
            },
        }
    }
}
