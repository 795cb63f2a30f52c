//! Cross-run duplicate tracking.
//!
//! Every manifest ever produced is recorded here, so duplicate avoidance
//! spans sessions: a second batch run never repeats a combination from the
//! first. The set is loaded once at run start, passed by mutable reference
//! into the generation loop, and written back once at the natural end of a
//! run — a crash mid-run loses that run's additions but never corrupts prior
//! records, since the update is a single terminal overwrite.
//!
//! # Storage
//!
//! On disk the set is a plain JSON array of manifests at
//! `data/manifest.json`, in production order. At load time a reverse index
//! keyed on [`Manifest::fingerprint`] is built for O(1) membership checks;
//! the index is runtime-only and never serialized.
//!
//! A missing file is an empty set (first run). A file that exists but fails
//! to parse is a hard error: falling back to an empty set would silently
//! void the cross-session uniqueness guarantee.

use crate::manifest::Manifest;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the duplicate-set file within the data directory.
pub const SET_FILENAME: &str = "manifest.json";

#[derive(Error, Debug)]
pub enum DuplicatesError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Corrupt duplicate set at {path}: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Ordered record of all previously produced manifests.
#[derive(Debug, Clone, Default)]
pub struct DuplicateSet {
    entries: Vec<Manifest>,
    /// Runtime reverse index over [`Manifest::fingerprint`]. Never serialized.
    keys: HashSet<String>,
}

impl DuplicateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `data_dir`. A missing file is an empty set.
    pub fn load(data_dir: &Path) -> Result<Self, DuplicatesError> {
        let path = data_dir.join(SET_FILENAME);
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = fs::read_to_string(&path)?;
        let entries: Vec<Manifest> =
            serde_json::from_str(&content).map_err(|source| DuplicatesError::Corrupt {
                path: path.clone(),
                source,
            })?;
        let keys = entries.iter().map(Manifest::fingerprint).collect();
        Ok(Self { entries, keys })
    }

    /// Overwrite the set file in `data_dir`, creating the directory if
    /// needed. Serialized as a plain JSON array in production order.
    pub fn save(&self, data_dir: &Path) -> Result<(), DuplicatesError> {
        fs::create_dir_all(data_dir)?;
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(data_dir.join(SET_FILENAME), json)?;
        Ok(())
    }

    pub fn contains(&self, manifest: &Manifest) -> bool {
        self.keys.contains(&manifest.fingerprint())
    }

    /// Record a manifest. Returns `false` (without growing the set) if an
    /// equal manifest is already present.
    pub fn insert(&mut self, manifest: Manifest) -> bool {
        if !self.keys.insert(manifest.fingerprint()) {
            return false;
        }
        self.entries.push(manifest);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recorded manifests in production order.
    pub fn iter(&self) -> impl Iterator<Item = &Manifest> {
        self.entries.iter()
    }
}
