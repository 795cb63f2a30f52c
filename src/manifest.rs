//! The per-image manifest: an insertion-ordered category → value mapping.
//!
//! A manifest records which layers went into one generated image, e.g.
//! `{"background": "a red", "character": "b x"}`. It serves double duty as
//! the image's emitted metadata and as its duplicate-detection fingerprint:
//! two images are the same combination exactly when their manifests are
//! structurally equal.
//!
//! Insertion order is significant — it follows layer draw order and is
//! preserved through JSON serialization, so the attributes emitted by the
//! convert stage come out in draw order. Equality is order-sensitive for the
//! same reason; the layer order is fixed by config, so equal combinations
//! always compare equal.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::Path;

/// Insertion-ordered mapping from category name to layer value string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<(String, String)>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a category value, replacing any existing entry for the category
    /// in place (order of first insertion wins).
    pub fn insert(&mut self, category: impl Into<String>, value: impl Into<String>) {
        let category = category.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(c, _)| *c == category) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((category, value)),
        }
    }

    pub fn get(&self, category: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(c, _)| c == category)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(c, v)| (c.as_str(), v.as_str()))
    }

    /// Category names in insertion order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(c, _)| c.as_str())
    }

    /// Canonical string encoding used as a hash key for duplicate lookup.
    ///
    /// Infallible, order-sensitive, and injective: categories and values are
    /// joined with separators that cannot appear in path-derived names.
    pub fn fingerprint(&self) -> String {
        let mut key = String::new();
        for (category, value) in &self.entries {
            key.push_str(category);
            key.push('\u{1}');
            key.push_str(value);
            key.push('\u{2}');
        }
        key
    }
}

/// Build the human-readable layer value for a manifest entry.
///
/// The item's file extension is stripped: `("a.png", "red")` → `"a red"`.
pub fn layer_value(item_file: &str, type_name: &str) -> String {
    let stem = Path::new(item_file)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| item_file.to_string());
    format!("{} {}", stem, type_name)
}

impl Serialize for Manifest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (category, value) in &self.entries {
            map.serialize_entry(category, value)?;
        }
        map.end()
    }
}

struct ManifestVisitor;

impl<'de> Visitor<'de> for ManifestVisitor {
    type Value = Manifest;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of category names to layer values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut manifest = Manifest::new();
        while let Some((category, value)) = access.next_entry::<String, String>()? {
            manifest.insert(category, value);
        }
        Ok(manifest)
    }
}

impl<'de> Deserialize<'de> for Manifest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ManifestVisitor)
    }
}
