//! Manifest → metadata conversion.
//!
//! Stage 3 of the layergen pipeline, an optional pass over the generate
//! stage's output. Every `output/data/<id>.json` manifest becomes a
//! `output/metadata/<id>.json` record in the standard attribute schema:
//!
//! ```json
//! {
//!     "name": "Item 7",
//!     "description": "Seven of a kind",
//!     "image": "ipfs://png/7.png",
//!     "date": 1724457600000,
//!     "attributes": [
//!         { "trait_type": "background", "value": "a red" },
//!         { "trait_type": "character", "value": "b x" }
//!     ]
//! }
//! ```
//!
//! Attributes come out in manifest order, which is layer draw order. The
//! name and description are caller-supplied templates: `#` is a positional
//! token replaced by the numeric id, and the literal substring `[hash]`
//! escapes a real `#` into the result. Pure, stateless string work — the
//! only state is the clock.

use crate::manifest::Manifest;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Subdirectory of the output root for converted metadata records.
pub const METADATA_DIR: &str = "metadata";

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// One converted metadata record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetadataRecord {
    pub name: String,
    pub description: String,
    /// Image reference, `ipfs://png/<id>.png`.
    pub image: String,
    /// Generation timestamp, milliseconds since the Unix epoch.
    pub date: i64,
    pub attributes: Vec<Attribute>,
}

/// One manifest entry in attribute form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attribute {
    pub trait_type: String,
    pub value: String,
}

/// Name and description templates shared by a convert pass.
#[derive(Debug, Clone)]
pub struct Templates {
    pub name: String,
    pub description: String,
}

/// Summary of a convert pass.
#[derive(Debug, Clone, Default)]
pub struct ConvertSummary {
    /// Converted ids, in processing order.
    pub ids: Vec<String>,
}

impl ConvertSummary {
    pub fn converted(&self) -> usize {
        self.ids.len()
    }
}

/// Substitute the id into a template.
///
/// Every `#` becomes the id; every literal `[hash]` becomes `#`. The two
/// substitutions are independent — `[hash]` contains no `#`, so the order
/// cannot leak ids into escaped hashes.
pub fn apply_template(template: &str, id: &str) -> String {
    template.replace('#', id).replace("[hash]", "#")
}

/// Convert a single manifest into a metadata record.
///
/// `date` is epoch milliseconds, passed in so the transformation stays pure.
pub fn convert_manifest(
    manifest: &Manifest,
    id: &str,
    templates: &Templates,
    date: i64,
) -> MetadataRecord {
    let attributes = manifest
        .iter()
        .map(|(category, value)| Attribute {
            trait_type: category.to_string(),
            value: value.to_string(),
        })
        .collect();

    MetadataRecord {
        name: apply_template(&templates.name, id),
        description: apply_template(&templates.description, id),
        image: format!("ipfs://png/{id}.png"),
        date,
        attributes,
    }
}

/// Convert every manifest in `data_dir` into a metadata record in
/// `metadata_dir`, keyed by the same numeric id.
pub fn convert(
    data_dir: &Path,
    metadata_dir: &Path,
    templates: &Templates,
) -> Result<ConvertSummary, ConvertError> {
    let mut files: Vec<PathBuf> = fs::read_dir(data_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .map(|e| e.eq_ignore_ascii_case("json"))
                    .unwrap_or(false)
        })
        .collect();
    files.sort();

    fs::create_dir_all(metadata_dir)?;

    let mut summary = ConvertSummary::default();
    for path in &files {
        let id = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let content = fs::read_to_string(path)?;
        let manifest: Manifest =
            serde_json::from_str(&content).map_err(|source| ConvertError::Json {
                path: path.clone(),
                source,
            })?;

        let record = convert_manifest(&manifest, &id, templates, Utc::now().timestamp_millis());
        let json = serde_json::to_string_pretty(&record).map_err(|source| ConvertError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(metadata_dir.join(format!("{id}.json")), json)?;

        summary.ids.push(id);
    }

    Ok(summary)
}
