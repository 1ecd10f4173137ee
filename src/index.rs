//! Level index construction (game progression order)

use crate::models::{Level, LevelIndex};
use thiserror::Error;

/// Error building the level index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// No level files were discovered
    #[error("no levels to index")]
    EmptyLevelSet,
}

/// Build the progression index from levels in discovery order.
///
/// The first level becomes `first_level`; the remainder keep their order.
pub fn build_level_index(levels: Vec<Level>) -> Result<LevelIndex, IndexError> {
    let mut levels = levels.into_iter();
    let first_level = levels.next().ok_or(IndexError::EmptyLevelSet)?;
    Ok(LevelIndex { first_level, rest_levels: levels.collect() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Position, Tile};

    fn level(tag: usize) -> Level {
        Level { tiles: vec![vec![Tile::Floor; tag + 1]], starting_position: Position::new(0, tag) }
    }

    #[test]
    fn test_three_levels() {
        let index = build_level_index(vec![level(1), level(2), level(3)]).unwrap();
        assert_eq!(index.first_level, level(1));
        assert_eq!(index.rest_levels, vec![level(2), level(3)]);
    }

    #[test]
    fn test_single_level() {
        let index = build_level_index(vec![level(1)]).unwrap();
        assert_eq!(index.first_level, level(1));
        assert!(index.rest_levels.is_empty());
    }

    #[test]
    fn test_no_levels() {
        assert_eq!(build_level_index(vec![]), Err(IndexError::EmptyLevelSet));
    }
}
