//! Asset directory indexing.
//!
//! Stage 1 of the layergen pipeline. Scans the asset root into an
//! [`AssetIndex`], the lookup structure the generate stage draws from.
//!
//! ## Directory Structure
//!
//! The asset root is exactly two levels deep:
//!
//! ```text
//! assets/                          # Asset root
//! ├── background/                  # Category (a layer slot)
//! │   ├── red/                     # Type (a variant within the category)
//! │   │   ├── a.png                # Item (a concrete asset file)
//! │   │   └── b.png
//! │   └── blue/
//! │       └── c.png
//! ├── character/
//! │   └── robot/
//! │       └── bolt.png
//! └── overlay/
//!     └── frame/
//!         └── gold.png
//! ```
//!
//! ## Cache
//!
//! The index is serialized to `data/index.json` as a plain nested JSON
//! object (category → type → file list) so it can be inspected and so the
//! generate stage can run without re-scanning. The cache is fully rewritten
//! on every `index` invocation.
//!
//! Entries are sorted at scan time; a rescan of an unchanged tree is
//! byte-identical.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the index cache file within the data directory.
pub const CACHE_FILENAME: &str = "index.json";

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Asset root not found: {0}")]
    RootNotFound(PathBuf),
    #[error("Index cache not found at {0} (run `layergen index` first)")]
    CacheMissing(PathBuf),
}

/// Lookup structure over the asset tree: category → type → ordered filenames.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetIndex(BTreeMap<String, BTreeMap<String, Vec<String>>>);

impl AssetIndex {
    /// Scan the asset root into an index.
    ///
    /// Hidden entries (dotfiles, `.DS_Store` and friends) are skipped at
    /// every level; everything else is assumed to follow the
    /// category/type/item layout.
    pub fn scan(root: &Path) -> Result<Self, IndexError> {
        if !root.is_dir() {
            return Err(IndexError::RootNotFound(root.to_path_buf()));
        }

        let mut index = BTreeMap::new();
        for category_dir in visible_entries(root)? {
            if !category_dir.is_dir() {
                continue;
            }
            let category = entry_name(&category_dir);

            let mut types = BTreeMap::new();
            for type_dir in visible_entries(&category_dir)? {
                if !type_dir.is_dir() {
                    continue;
                }
                let items: Vec<String> = visible_entries(&type_dir)?
                    .iter()
                    .filter(|p| p.is_file())
                    .map(|p| entry_name(p))
                    .collect();
                types.insert(entry_name(&type_dir), items);
            }
            index.insert(category, types);
        }

        Ok(Self(index))
    }

    /// Load the index from its cache file in `data_dir`.
    pub fn load(data_dir: &Path) -> Result<Self, IndexError> {
        let path = data_dir.join(CACHE_FILENAME);
        if !path.exists() {
            return Err(IndexError::CacheMissing(path));
        }
        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write the index to its cache file in `data_dir`, creating the
    /// directory if needed.
    pub fn save(&self, data_dir: &Path) -> Result<(), IndexError> {
        fs::create_dir_all(data_dir)?;
        let json = serde_json::to_string_pretty(self)?;
        fs::write(data_dir.join(CACHE_FILENAME), json)?;
        Ok(())
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Type names within a category, or `None` for an unknown category.
    pub fn types(&self, category: &str) -> Option<Vec<&str>> {
        self.0
            .get(category)
            .map(|types| types.keys().map(String::as_str).collect())
    }

    /// Item filenames within a category/type, or `None` if either is unknown.
    pub fn items(&self, category: &str, type_name: &str) -> Option<&[String]> {
        self.0
            .get(category)?
            .get(type_name)
            .map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Sorted, non-hidden entries of a directory.
fn visible_entries(path: &Path) -> Result<Vec<PathBuf>, IndexError> {
    let mut entries: Vec<PathBuf> = fs::read_dir(path)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .map(|n| !n.to_string_lossy().starts_with('.'))
                .unwrap_or(false)
        })
        .collect();
    entries.sort();
    Ok(entries)
}

fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_assets() -> TempDir {
        let tmp = TempDir::new().unwrap();
        for (category, type_name, item) in [
            ("background", "red", "a.png"),
            ("background", "red", "b.png"),
            ("background", "blue", "c.png"),
            ("character", "robot", "bolt.png"),
            ("overlay", "frame", "gold.png"),
        ] {
            let dir = tmp.path().join(category).join(type_name);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join(item), "fake image").unwrap();
        }
        tmp
    }

    #[test]
    fn scan_finds_all_categories() {
        let tmp = setup_assets();
        let index = AssetIndex::scan(tmp.path()).unwrap();

        let categories: Vec<&str> = index.categories().collect();
        assert_eq!(categories, vec!["background", "character", "overlay"]);
    }

    #[test]
    fn scan_collects_types_and_items() {
        let tmp = setup_assets();
        let index = AssetIndex::scan(tmp.path()).unwrap();

        let mut types = index.types("background").unwrap();
        types.sort();
        assert_eq!(types, vec!["blue", "red"]);
        assert_eq!(
            index.items("background", "red").unwrap(),
            &["a.png".to_string(), "b.png".to_string()]
        );
    }

    #[test]
    fn scan_skips_hidden_entries() {
        let tmp = setup_assets();
        fs::write(tmp.path().join(".DS_Store"), "junk").unwrap();
        fs::write(tmp.path().join("background/red/.hidden.png"), "junk").unwrap();

        let index = AssetIndex::scan(tmp.path()).unwrap();
        assert_eq!(index.categories().count(), 3);
        assert_eq!(index.items("background", "red").unwrap().len(), 2);
    }

    #[test]
    fn scan_skips_stray_files_at_category_level() {
        let tmp = setup_assets();
        fs::write(tmp.path().join("README.txt"), "notes").unwrap();

        let index = AssetIndex::scan(tmp.path()).unwrap();
        assert_eq!(index.categories().count(), 3);
    }

    #[test]
    fn scan_missing_root_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = AssetIndex::scan(&tmp.path().join("nope"));
        assert!(matches!(result, Err(IndexError::RootNotFound(_))));
    }

    #[test]
    fn unknown_category_and_type_are_none() {
        let tmp = setup_assets();
        let index = AssetIndex::scan(tmp.path()).unwrap();

        assert!(index.types("hat").is_none());
        assert!(index.items("background", "green").is_none());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let assets = setup_assets();
        let data = TempDir::new().unwrap();

        let index = AssetIndex::scan(assets.path()).unwrap();
        index.save(data.path()).unwrap();
        let loaded = AssetIndex::load(data.path()).unwrap();

        assert_eq!(index, loaded);
    }

    #[test]
    fn cache_is_plain_nested_json() {
        let assets = setup_assets();
        let data = TempDir::new().unwrap();
        AssetIndex::scan(assets.path()).unwrap().save(data.path()).unwrap();

        let content = fs::read_to_string(data.path().join(CACHE_FILENAME)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["background"]["red"][0], "a.png");
    }

    #[test]
    fn load_missing_cache_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = AssetIndex::load(tmp.path());
        assert!(matches!(result, Err(IndexError::CacheMissing(_))));
    }
}
