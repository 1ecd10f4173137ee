//! JSON output and file path generation

use crate::legend::Legend;
use crate::models::{Level, LevelIndex, Tile};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the progression index inside the output directory.
pub const INDEX_FILE_NAME: &str = "index.json";

/// Error type for output operations
#[derive(Debug, Error)]
pub enum OutputError {
    /// IO error during file operations
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// JSON encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Contents of `index.json`: the level index plus level identifiers in play order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDocument<'a> {
    pub order: Vec<&'a str>,
    #[serde(flatten)]
    pub index: &'a LevelIndex,
}

/// Output path for a compiled level.
pub fn level_output_path(out_dir: &Path, id: &str) -> PathBuf {
    out_dir.join(format!("{}.json", id))
}

/// Serialize a value as pretty JSON with a trailing newline.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, OutputError> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    Ok(json)
}

/// Write every level plus `index.json` as one unit.
///
/// Each artifact is first written under a staging name in `out_dir`; no
/// existing file is replaced until every staged write has succeeded, and
/// `index.json` is moved into place last. Level files listed by the previous
/// `index.json` that are no longer part of the build are then removed.
///
/// `order` holds the level identifiers in the same order as the index.
pub fn write_build_outputs(
    out_dir: &Path,
    order: &[String],
    index: &LevelIndex,
) -> Result<Vec<PathBuf>, OutputError> {
    let mut artifacts = Vec::with_capacity(order.len() + 1);
    for (id, level) in order.iter().zip(index.iter()) {
        artifacts.push((level_output_path(out_dir, id), to_json(level)?));
    }
    let document = IndexDocument { order: order.iter().map(|s| s.as_str()).collect(), index };
    artifacts.push((out_dir.join(INDEX_FILE_NAME), to_json(&document)?));

    let previous = previous_order(out_dir);

    let mut staged = Vec::with_capacity(artifacts.len());
    for (path, contents) in &artifacts {
        let staging = staging_path(path);
        if let Err(e) = write_file(&staging, contents) {
            discard_staged(&staged);
            return Err(e);
        }
        staged.push(staging);
    }

    for (staging, (path, _)) in staged.iter().zip(&artifacts) {
        fs::rename(staging, path)
            .map_err(|source| OutputError::Io { path: path.clone(), source })?;
    }

    for id in previous.iter().filter(|id| !order.contains(*id) && is_plain_id(id)) {
        let path = level_output_path(out_dir, id);
        match fs::remove_file(&path) {
            Err(source) if source.kind() != io::ErrorKind::NotFound => {
                return Err(OutputError::Io { path, source });
            }
            _ => {}
        }
    }

    Ok(artifacts.into_iter().map(|(path, _)| path).collect())
}

fn staging_path(path: &Path) -> PathBuf {
    let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

fn discard_staged(staged: &[PathBuf]) {
    for path in staged {
        let _ = fs::remove_file(path);
    }
}

/// Level identifiers recorded by an existing `index.json`, if any.
fn previous_order(out_dir: &Path) -> Vec<String> {
    #[derive(Deserialize)]
    struct PreviousIndex {
        #[serde(default)]
        order: Vec<String>,
    }

    fs::read_to_string(out_dir.join(INDEX_FILE_NAME))
        .ok()
        .and_then(|text| serde_json::from_str::<PreviousIndex>(&text).ok())
        .map(|doc| doc.order)
        .unwrap_or_default()
}

// Identifiers come from file stems; anything else in an old index is left alone.
fn is_plain_id(id: &str) -> bool {
    !id.is_empty() && id != "." && id != ".." && !id.contains(['/', '\\'])
}

fn write_file(path: &Path, contents: &str) -> Result<(), OutputError> {
    let io_err = |source| OutputError::Io { path: path.to_path_buf(), source };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
    }
    fs::write(path, contents).map_err(io_err)
}

/// Render a level grid as text, one glyph per tile, with the start marked.
///
/// Custom tiles are drawn with the legend symbol that defined them.
pub fn render_level_text(level: &Level, legend: &Legend, start_marker: char) -> String {
    let entries = legend.entries();
    let mut out = String::new();
    for (row, tiles) in level.tiles.iter().enumerate() {
        for (column, tile) in tiles.iter().enumerate() {
            if row == level.starting_position.row && column == level.starting_position.column {
                out.push(start_marker);
                continue;
            }
            let symbol = match tile {
                Tile::Custom(custom) => {
                    entries.iter().find(|e| &e.tile == custom).map(|e| e.symbol)
                }
                _ => None,
            };
            out.push(symbol.unwrap_or_else(|| tile.glyph()));
        }
        out.push('\n');
    }
    out
}

/// Describe resolved legend entries, one per line.
pub fn render_legend_text(legend: &Legend) -> String {
    let mut out = String::new();
    for entry in legend.entries() {
        let payload = match &entry.tile.payload {
            Some(payload) => serde_json::to_string(payload).unwrap_or_default(),
            None => "-".to_string(),
        };
        out.push_str(&format!("{}  {}  {}\n", entry.symbol, entry.tile.name, payload));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::legend::resolve_legend;
    use crate::models::Position;
    use tempfile::TempDir;

    fn level(col: usize) -> Level {
        Level {
            tiles: vec![vec![Tile::Floor, Tile::Empty, Tile::Finish]],
            starting_position: Position::new(0, col),
        }
    }

    fn order(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_write_build_outputs_creates_directory() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("nested/out");
        let index = LevelIndex { first_level: level(0), rest_levels: vec![] };
        let paths = write_build_outputs(&out, &order(&["Level1"]), &index).unwrap();
        assert_eq!(paths, vec![out.join("Level1.json"), out.join(INDEX_FILE_NAME)]);

        let parsed: Level =
            serde_json::from_str(&fs::read_to_string(&paths[0]).unwrap()).unwrap();
        assert_eq!(parsed, level(0));
    }

    #[test]
    fn test_write_build_outputs_index_document() {
        let temp = TempDir::new().unwrap();
        let index = LevelIndex { first_level: level(0), rest_levels: vec![level(2)] };
        write_build_outputs(temp.path(), &order(&["a", "b"]), &index).unwrap();

        let value: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(temp.path().join(INDEX_FILE_NAME)).unwrap(),
        )
        .unwrap();
        assert_eq!(value["order"], serde_json::json!(["a", "b"]));
        assert_eq!(value["firstLevel"]["startingPosition"]["column"], 0);
        assert_eq!(value["restLevels"][0]["startingPosition"]["column"], 2);

        let names: Vec<String> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert!(names.iter().all(|n| !n.ends_with(".tmp")), "leftover staging files: {:?}", names);
    }

    #[test]
    fn test_write_build_outputs_removes_levels_dropped_from_index() {
        let temp = TempDir::new().unwrap();
        let two = LevelIndex { first_level: level(0), rest_levels: vec![level(1)] };
        write_build_outputs(temp.path(), &order(&["a", "b"]), &two).unwrap();
        fs::write(temp.path().join("notes.json"), "{}").unwrap();

        let one = LevelIndex { first_level: level(0), rest_levels: vec![] };
        write_build_outputs(temp.path(), &order(&["a"]), &one).unwrap();

        assert!(temp.path().join("a.json").exists());
        assert!(!temp.path().join("b.json").exists());
        assert!(temp.path().join("notes.json").exists());
    }

    #[test]
    fn test_write_build_outputs_failure_keeps_previous_build() {
        let temp = TempDir::new().unwrap();
        let index = LevelIndex { first_level: level(0), rest_levels: vec![] };
        write_build_outputs(temp.path(), &order(&["a"]), &index).unwrap();
        let before = fs::read_to_string(temp.path().join(INDEX_FILE_NAME)).unwrap();

        // A directory where a staging file must go makes the staged write fail
        fs::create_dir(temp.path().join(".index.json.tmp")).unwrap();
        let next = LevelIndex { first_level: level(2), rest_levels: vec![level(1)] };
        let err = write_build_outputs(temp.path(), &order(&["a", "b"]), &next).unwrap_err();
        assert!(matches!(err, OutputError::Io { .. }));

        assert_eq!(fs::read_to_string(temp.path().join(INDEX_FILE_NAME)).unwrap(), before);
        assert!(!temp.path().join("b.json").exists());
        assert!(!temp.path().join(".a.json.tmp").exists());
        assert!(!temp.path().join(".b.json.tmp").exists());
        let a: Level =
            serde_json::from_str(&fs::read_to_string(temp.path().join("a.json")).unwrap()).unwrap();
        assert_eq!(a, level(0));
    }

    #[test]
    fn test_render_level_text() {
        assert_eq!(render_level_text(&level(0), &Legend::new(), 'S'), "S.F\n");
    }

    #[test]
    fn test_render_level_text_uses_legend_symbols() {
        let rows = ["S.C", "F.A"];
        let legend = resolve_legend(&rows, &[(4, "C: Finish(@A)".to_string())]).unwrap();
        let custom = legend.get('C').unwrap().clone();
        let level = Level {
            tiles: vec![
                vec![Tile::Floor, Tile::Empty, Tile::Custom(custom)],
                vec![Tile::Finish, Tile::Empty, Tile::Empty],
            ],
            starting_position: Position::new(0, 0),
        };
        assert_eq!(render_level_text(&level, &legend, 'S'), "S.C\nF..\n");
    }

    #[test]
    fn test_to_json_ends_with_newline() {
        assert!(to_json(&level(0)).unwrap().ends_with("}\n"));
    }
}
