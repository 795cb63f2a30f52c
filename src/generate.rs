//! Random selection and duplicate-checked image generation.
//!
//! Stage 2 of the layergen pipeline, and the only stage with nontrivial
//! control flow. For every requested image the generator picks one random
//! item per configured category, decides whether the overlay layer is drawn,
//! and checks the resulting manifest against every combination ever
//! produced. Duplicates are discarded and re-picked; unique combinations are
//! rendered through the [`ImageBackend`] and persisted (pixels + manifest)
//! before the id counter advances.
//!
//! ## Termination
//!
//! The retry loop is bounded twice over:
//!
//! 1. **Exhaustion detection** — [`CombinationSpace`] counts the distinct
//!    manifests the index can yield (distinct "item type" value strings per
//!    category, so the count stays exact even when different type/item pairs
//!    collide on the same string). A request larger than what remains after
//!    subtracting already-recorded combinations fails immediately.
//! 2. **Attempt ceiling** — [`MAX_ATTEMPTS`] retries per image as a backstop.
//!
//! ## Output
//!
//! ```text
//! output/
//! ├── images/<id>.png      # composited raster, via the backend
//! └── data/<id>.json       # the image's manifest
//! ```
//!
//! The duplicate set itself is saved by the caller after `run` returns — one
//! terminal overwrite per run, never incrementally.

use crate::config::{GeneratorConfig, LAYER_COUNT};
use crate::duplicates::DuplicateSet;
use crate::imaging::{BackendError, CompositeParams, ImageBackend, LayerDraw};
use crate::index::AssetIndex;
use crate::manifest::{Manifest, layer_value};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Subdirectory of the output root for composited rasters.
pub const IMAGES_DIR: &str = "images";
/// Subdirectory of the output root for per-image manifests.
pub const DATA_DIR: &str = "data";

/// Retry ceiling per image. Exhaustion detection makes hitting this
/// unlikely; it exists so an unlucky streak can never spin forever.
pub const MAX_ATTEMPTS: u32 = 1_000;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Compositing failed: {0}")]
    Backend(#[from] BackendError),
    #[error("Layer order names unknown category: {0}")]
    UnknownCategory(String),
    #[error("Category has no types: {0}")]
    EmptyCategory(String),
    #[error("Type has no items: {0}/{1}")]
    EmptyType(String, String),
    #[error("Composition takes exactly three layers, got {0}")]
    LayerArity(usize),
    #[error("Requested {requested} unique images but only {available} combinations remain")]
    Exhausted { requested: u32, available: u64 },
    #[error("No unique combination found after {attempts} attempts")]
    MaxAttempts { attempts: u32 },
}

/// One picked layer: which category/type/item, and the asset file it names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub category: String,
    pub type_name: String,
    pub item: String,
    pub path: PathBuf,
}

/// A planned image: base layer, overlays in draw order, and the manifest
/// describing exactly the drawn layers. Produced by [`Generator::compose`],
/// rendered by [`Generator::render`] once it clears the duplicate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composition {
    pub base: PathBuf,
    pub overlays: Vec<PathBuf>,
    pub manifest: Manifest,
}

/// One emitted image in a run summary.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub id: u32,
    pub manifest: Manifest,
}

/// Result of a completed run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub start: u32,
    pub retries: u32,
    pub images: Vec<GeneratedImage>,
}

impl RunSummary {
    pub fn produced(&self) -> usize {
        self.images.len()
    }
}

/// The distinct-manifest space an index can yield under a layer order and
/// overlay chance.
///
/// Distinctness is counted over manifest value strings, not type/item pairs:
/// two pairs that format to the same "item type" string are one combination.
/// With chance strictly between 0 and 1 both the with-overlay and
/// without-overlay forms are reachable; at the extremes only one form is.
#[derive(Debug, Clone)]
pub struct CombinationSpace {
    order: Vec<String>,
    values: Vec<HashSet<String>>,
    overlay_chance: f64,
}

impl CombinationSpace {
    pub fn new(index: &AssetIndex, order: &[String], overlay_chance: f64) -> Self {
        let values = order
            .iter()
            .map(|category| category_values(index, category))
            .collect();
        Self {
            order: order.to_vec(),
            values,
            overlay_chance,
        }
    }

    /// Total number of distinct manifests reachable.
    pub fn size(&self) -> u64 {
        let count = |i: usize| self.values.get(i).map(|v| v.len() as u64).unwrap_or(0);
        let base = count(0).saturating_mul(count(1));
        if self.overlay_chance <= 0.0 {
            base
        } else if self.overlay_chance >= 1.0 {
            base.saturating_mul(count(2))
        } else {
            base.saturating_mul(1 + count(2))
        }
    }

    /// Whether a manifest is one this space can produce. Category sequence
    /// and every value must match; manifests recorded against a different
    /// asset set or layer order fall outside.
    pub fn contains(&self, manifest: &Manifest) -> bool {
        let categories: Vec<&str> = manifest.categories().collect();
        let reachable_form = match categories.len() {
            n if n == LAYER_COUNT - 1 => self.overlay_chance < 1.0,
            n if n == LAYER_COUNT => self.overlay_chance > 0.0,
            _ => false,
        };
        let Some(expected) = self.order.get(..categories.len()) else {
            return false;
        };
        if !reachable_form || categories != expected.iter().map(String::as_str).collect::<Vec<_>>()
        {
            return false;
        }
        manifest
            .iter()
            .enumerate()
            .all(|(i, (_, value))| self.values.get(i).is_some_and(|v| v.contains(value)))
    }

    /// Combinations not yet present in the duplicate set.
    pub fn remaining(&self, duplicates: &DuplicateSet) -> u64 {
        let used = duplicates.iter().filter(|m| self.contains(m)).count() as u64;
        self.size().saturating_sub(used)
    }
}

/// All distinct manifest value strings a category can contribute.
fn category_values(index: &AssetIndex, category: &str) -> HashSet<String> {
    let mut values = HashSet::new();
    if let Some(types) = index.types(category) {
        for type_name in types {
            if let Some(items) = index.items(category, type_name) {
                for item in items {
                    values.insert(layer_value(item, type_name));
                }
            }
        }
    }
    values
}

/// The generation engine: owns the RNG, borrows everything else.
pub struct Generator<'a, B, R> {
    index: &'a AssetIndex,
    config: &'a GeneratorConfig,
    assets_root: &'a Path,
    backend: &'a B,
    rng: R,
}

impl<'a, B: ImageBackend, R: Rng> Generator<'a, B, R> {
    pub fn new(
        index: &'a AssetIndex,
        config: &'a GeneratorConfig,
        assets_root: &'a Path,
        backend: &'a B,
        rng: R,
    ) -> Self {
        Self {
            index,
            config,
            assets_root,
            backend,
            rng,
        }
    }

    /// Pick one random (type, item) per category in `order` — uniform at the
    /// type level, then uniform at the item level. No weighting.
    pub fn pick(&mut self, order: &[String]) -> Result<Vec<Selection>, GenerateError> {
        let mut selections = Vec::with_capacity(order.len());
        for category in order {
            let types = self
                .index
                .types(category)
                .ok_or_else(|| GenerateError::UnknownCategory(category.clone()))?;
            let type_name = *types
                .choose(&mut self.rng)
                .ok_or_else(|| GenerateError::EmptyCategory(category.clone()))?;
            let items = self
                .index
                .items(category, type_name)
                .unwrap_or_default();
            let item = items.choose(&mut self.rng).ok_or_else(|| {
                GenerateError::EmptyType(category.clone(), type_name.to_string())
            })?;

            let path = self
                .assets_root
                .join(category)
                .join(type_name)
                .join(item);
            selections.push(Selection {
                category: category.clone(),
                type_name: type_name.to_string(),
                item: item.clone(),
                path,
            });
        }
        Ok(selections)
    }

    /// Plan one image from exactly three selections.
    ///
    /// Layer 1 is the base and layer 2 is always drawn over it; layer 3 is
    /// drawn with `overlay_chance` probability, decided here, independently
    /// per image. Only drawn layers enter the manifest — a skipped overlay
    /// is simply absent.
    pub fn compose(&mut self, selection: &[Selection]) -> Result<Composition, GenerateError> {
        if selection.len() != LAYER_COUNT {
            return Err(GenerateError::LayerArity(selection.len()));
        }

        let mut manifest = Manifest::new();
        manifest.insert(
            selection[0].category.clone(),
            layer_value(&selection[0].item, &selection[0].type_name),
        );
        manifest.insert(
            selection[1].category.clone(),
            layer_value(&selection[1].item, &selection[1].type_name),
        );
        let mut overlays = vec![selection[1].path.clone()];

        if self.rng.gen_bool(self.config.overlay_chance) {
            manifest.insert(
                selection[2].category.clone(),
                layer_value(&selection[2].item, &selection[2].type_name),
            );
            overlays.push(selection[2].path.clone());
        }

        Ok(Composition {
            base: selection[0].path.clone(),
            overlays,
            manifest,
        })
    }

    /// Execute a planned composition through the backend.
    pub fn render(&self, composition: &Composition, output: &Path) -> Result<(), GenerateError> {
        self.backend.composite(&CompositeParams {
            base: composition.base.clone(),
            overlays: composition
                .overlays
                .iter()
                .map(|p| LayerDraw::at_origin(p.clone()))
                .collect(),
            output: output.to_path_buf(),
        })?;
        Ok(())
    }

    /// Generate `amount` unique images with ids `start..start + amount`.
    ///
    /// Each image's pixels and manifest land on disk before the counter
    /// advances. The duplicate set grows strictly during the run; persisting
    /// it is the caller's job once `run` returns.
    pub fn run(
        &mut self,
        start: u32,
        amount: u32,
        duplicates: &mut DuplicateSet,
        output_dir: &Path,
    ) -> Result<RunSummary, GenerateError> {
        let space = CombinationSpace::new(self.index, &self.config.layers, self.config.overlay_chance);
        let available = space.remaining(duplicates);
        if u64::from(amount) > available {
            return Err(GenerateError::Exhausted {
                requested: amount,
                available,
            });
        }

        let images_dir = output_dir.join(IMAGES_DIR);
        let data_dir = output_dir.join(DATA_DIR);
        fs::create_dir_all(&images_dir)?;
        fs::create_dir_all(&data_dir)?;

        let order = self.config.layers.clone();
        let mut summary = RunSummary {
            start,
            ..Default::default()
        };

        for id in start..start + amount {
            let mut attempts = 0u32;
            let composition = loop {
                attempts += 1;
                if attempts > MAX_ATTEMPTS {
                    return Err(GenerateError::MaxAttempts {
                        attempts: MAX_ATTEMPTS,
                    });
                }

                let selection = self.pick(&order)?;
                let composition = self.compose(&selection)?;
                if duplicates.contains(&composition.manifest) {
                    summary.retries += 1;
                    continue;
                }
                break composition;
            };

            self.render(&composition, &images_dir.join(format!("{id}.png")))?;
            let json = serde_json::to_string_pretty(&composition.manifest)?;
            fs::write(data_dir.join(format!("{id}.json")), json)?;

            duplicates.insert(composition.manifest.clone());
            summary.images.push(GeneratedImage {
                id,
                manifest: composition.manifest,
            });
        }

        Ok(summary)
    }
}
