//! Data models for compiled levels (tiles, positions, levels, the level index)
//!
//! These are the values handed to the game runtime. They are built once per
//! compile run and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 0-indexed (row, column) coordinate relative to the map section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub column: usize,
}

impl Position {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// Movement direction carried by directional tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Parse a direction keyword as written in a legend (`Up`, `Down`, `Left`, `Right`).
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "Up" => Some(Direction::Up),
            "Down" => Some(Direction::Down),
            "Left" => Some(Direction::Left),
            "Right" => Some(Direction::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = match self {
            Direction::Up => "Up",
            Direction::Down => "Down",
            Direction::Left => "Left",
            Direction::Right => "Right",
        };
        f.write_str(word)
    }
}

/// Opaque colour tag used by match-based puzzle logic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub String);

impl Color {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A gameplay effect bound to a tile, targeting zero or more map positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerAction {
    pub action: String,
    pub targets: Vec<Position>,
}

/// Extra data attached to a custom tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TilePayload {
    Trigger(TriggerAction),
    Direction(Direction),
    Color(Color),
}

/// A tile defined by a legend entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomTile {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub payload: Option<TilePayload>,
}

impl CustomTile {
    pub fn plain(name: impl Into<String>) -> Self {
        Self { name: name.into(), payload: None }
    }

    pub fn with_payload(name: impl Into<String>, payload: TilePayload) -> Self {
        Self { name: name.into(), payload: Some(payload) }
    }
}

/// One cell of a level grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Tile {
    #[default]
    Empty,
    Floor,
    Finish,
    RustyFloor,
    Custom(CustomTile),
}

impl Tile {
    /// Single-character rendering; custom tiles fall back to their name's initial
    /// when no legend symbol is at hand.
    pub fn glyph(&self) -> char {
        match self {
            Tile::Empty => '.',
            Tile::Floor => '#',
            Tile::Finish => 'F',
            Tile::RustyFloor => 'R',
            Tile::Custom(custom) => custom.name.chars().next().unwrap_or('?'),
        }
    }
}

/// A playable level: a row-major tile grid plus a starting position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub tiles: Vec<Vec<Tile>>,
    pub starting_position: Position,
}

impl Level {
    /// Number of rows.
    pub fn height(&self) -> usize {
        self.tiles.len()
    }

    /// Number of columns (rows are padded to equal width).
    pub fn width(&self) -> usize {
        self.tiles.first().map(|row| row.len()).unwrap_or(0)
    }

    /// Tile at a position; anything outside the grid is Empty.
    pub fn tile(&self, pos: Position) -> &Tile {
        static EMPTY: Tile = Tile::Empty;
        self.tiles.get(pos.row).and_then(|row| row.get(pos.column)).unwrap_or(&EMPTY)
    }
}

/// Ordered play sequence handed to the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelIndex {
    pub first_level: Level,
    pub rest_levels: Vec<Level>,
}

impl LevelIndex {
    /// Total number of levels.
    pub fn len(&self) -> usize {
        1 + self.rest_levels.len()
    }

    /// Always false: an index holds at least the first level.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Levels in progression order.
    pub fn iter(&self) -> impl Iterator<Item = &Level> {
        std::iter::once(&self.first_level).chain(self.rest_levels.iter())
    }
}
