//! Level file discovery.
//!
//! Lists level files in the source directory and orders them by identifier.
//! That order is the game's progression order.

use glob::{glob, Pattern};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error during level discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The directory or one of its entries could not be read
    #[error("cannot read {}: {source}", path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The source path exists but is not a directory
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),
    /// Two files map to the same level identifier
    #[error("level '{id}' is defined by both {} and {}", first.display(), second.display())]
    DuplicateIdentifier { id: String, first: PathBuf, second: PathBuf },
    /// File name is not valid UTF-8
    #[error("level file name is not valid UTF-8: {}", .0.display())]
    InvalidName(PathBuf),
}

/// A discovered level file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelFile {
    /// File name without extension
    pub id: String,
    /// Full path to the file
    pub path: PathBuf,
}

/// Discover level files directly inside `dir` (non-recursive).
///
/// Only files whose extension is listed in `extensions` are returned, sorted
/// lexicographically by identifier.
pub fn discover_levels(dir: &Path, extensions: &[String]) -> Result<Vec<LevelFile>, DiscoveryError> {
    let metadata = fs::metadata(dir)
        .map_err(|source| DiscoveryError::FileSystem { path: dir.to_path_buf(), source })?;
    if !metadata.is_dir() {
        return Err(DiscoveryError::NotADirectory(dir.to_path_buf()));
    }

    let base = Pattern::escape(&dir.to_string_lossy());
    let mut by_id: HashMap<String, PathBuf> = HashMap::new();

    for ext in extensions {
        let pattern = format!("{}/*.{}", base, Pattern::escape(ext));
        let paths = glob(&pattern).map_err(|e| DiscoveryError::FileSystem {
            path: dir.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()),
        })?;

        for entry in paths {
            let path = entry.map_err(|e| DiscoveryError::FileSystem {
                path: e.path().to_path_buf(),
                source: e.into_error(),
            })?;
            if !path.is_file() {
                continue;
            }
            let id = level_id(&path)?;
            if let Some(first) = by_id.get(&id) {
                let (first, second) = ordered_pair(first.clone(), path);
                return Err(DiscoveryError::DuplicateIdentifier { id, first, second });
            }
            by_id.insert(id, path);
        }
    }

    let mut levels: Vec<LevelFile> =
        by_id.into_iter().map(|(id, path)| LevelFile { id, path }).collect();
    levels.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(levels)
}

/// Level identifier: the file name without its extension.
pub fn level_id(path: &Path) -> Result<String, DiscoveryError> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
        .ok_or_else(|| DiscoveryError::InvalidName(path.to_path_buf()))
}

fn ordered_pair(a: PathBuf, b: PathBuf) -> (PathBuf, PathBuf) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        File::create(&path).unwrap().write_all(b"S").unwrap();
        path
    }

    fn txt() -> Vec<String> {
        vec!["txt".to_string()]
    }

    #[test]
    fn test_discover_filters_by_extension() {
        let temp = TempDir::new().unwrap();
        create_test_file(temp.path(), "Level1.txt");
        create_test_file(temp.path(), "notes.md");
        create_test_file(temp.path(), "Level1.txt.bak");

        let levels = discover_levels(temp.path(), &txt()).unwrap();
        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].id, "Level1");
        assert!(levels[0].path.ends_with("Level1.txt"));
    }

    #[test]
    fn test_discover_sorted_by_identifier() {
        let temp = TempDir::new().unwrap();
        create_test_file(temp.path(), "c.txt");
        create_test_file(temp.path(), "a.txt");
        create_test_file(temp.path(), "b.txt");

        let ids: Vec<String> =
            discover_levels(temp.path(), &txt()).unwrap().into_iter().map(|l| l.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_discover_is_not_recursive() {
        let temp = TempDir::new().unwrap();
        create_test_file(temp.path(), "top.txt");
        create_test_file(temp.path(), "nested/inner.txt");

        let levels = discover_levels(temp.path(), &txt()).unwrap();
        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].id, "top");
    }

    #[test]
    fn test_discover_multiple_extensions() {
        let temp = TempDir::new().unwrap();
        create_test_file(temp.path(), "b.lvl");
        create_test_file(temp.path(), "a.txt");

        let exts = vec!["txt".to_string(), "lvl".to_string()];
        let ids: Vec<String> =
            discover_levels(temp.path(), &exts).unwrap().into_iter().map(|l| l.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_discover_duplicate_identifier() {
        let temp = TempDir::new().unwrap();
        create_test_file(temp.path(), "a.txt");
        create_test_file(temp.path(), "a.lvl");

        let exts = vec!["txt".to_string(), "lvl".to_string()];
        let err = discover_levels(temp.path(), &exts).unwrap_err();
        assert!(matches!(err, DiscoveryError::DuplicateIdentifier { ref id, .. } if id == "a"));
    }

    #[test]
    fn test_discover_empty_directory() {
        let temp = TempDir::new().unwrap();
        assert!(discover_levels(temp.path(), &txt()).unwrap().is_empty());
    }

    #[test]
    fn test_discover_missing_directory() {
        let temp = TempDir::new().unwrap();
        let err = discover_levels(&temp.path().join("missing"), &txt()).unwrap_err();
        assert!(matches!(err, DiscoveryError::FileSystem { .. }));
    }

    #[test]
    fn test_discover_file_instead_of_directory() {
        let temp = TempDir::new().unwrap();
        let file = create_test_file(temp.path(), "a.txt");
        let err = discover_levels(&file, &txt()).unwrap_err();
        assert!(matches!(err, DiscoveryError::NotADirectory(_)));
    }

    #[test]
    fn test_level_id() {
        assert_eq!(level_id(Path::new("/x/Level12.txt")).unwrap(), "Level12");
    }
}
