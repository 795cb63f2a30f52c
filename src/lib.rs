//! # Layergen
//!
//! Batch generator that composites layered image assets into unique
//! randomized images. Your filesystem is the data source: every
//! `assets/<category>/<type>/<item>.png` file is a layer candidate, and each
//! generated image stacks one random item per configured category.
//!
//! # Architecture: Three-Stage Pipeline
//!
//! Layergen processes assets through three independent stages, each driven by
//! JSON files the next stage (or the next run) consumes:
//!
//! ```text
//! 1. Index     assets/   →  data/index.json      (filesystem → lookup structure)
//! 2. Generate  index     →  output/images/ + output/data/
//! 3. Convert   manifests →  output/metadata/     (templated metadata records)
//! ```
//!
//! This separation exists for three reasons:
//!
//! - **Debuggability**: the index cache and every per-image manifest are
//!   human-readable JSON you can inspect.
//! - **Resumability**: the duplicate set persists between runs, so a second
//!   batch never repeats a combination from the first.
//! - **Testability**: picking, composing, and converting are functions over
//!   plain data; tests exercise them without encoding a single pixel.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`index`] | Stage 1 — walks the asset directory into an [`index::AssetIndex`], cached as JSON |
//! | [`generate`] | Stage 2 — random selection, duplicate-checked composition, image + manifest output |
//! | [`convert`] | Stage 3 — manifest → metadata records with templated name/description |
//! | [`manifest`] | Insertion-ordered category → value mapping, the duplicate-detection fingerprint |
//! | [`duplicates`] | Cross-run record of every produced manifest, loaded/saved at run boundaries |
//! | [`config`] | `layergen.toml` loading and validation (layer order, overlay chance) |
//! | [`imaging`] | Opaque compositing capability: load base, draw overlays, save |
//! | [`output`] | CLI output formatting — inventory and summary display |
//!
//! # Design Decisions
//!
//! ## Bounded Retries
//!
//! Duplicate combinations are discarded and regenerated, but never forever:
//! the generator counts the space of distinct combinations up front and
//! refuses requests it cannot satisfy, and a per-image attempt ceiling backs
//! that up. A saturated asset set produces an error, not a spinning process.
//!
//! ## Fixed Three-Layer Contract
//!
//! The index structure supports any number of categories, but composition is
//! deliberately fixed at three layers: base, character, and an overlay drawn
//! with a configurable chance (25% by default). The arity is validated at
//! config load so the contract is explicit rather than implied.
//!
//! ## Pure-Rust Imaging
//!
//! Compositing goes through the [`imaging::ImageBackend`] trait; the
//! production backend uses the `image` crate — no ImageMagick, no system
//! dependencies. The trait seam keeps the generation loop testable with a
//! recording mock.

pub mod config;
pub mod convert;
pub mod duplicates;
pub mod generate;
pub mod imaging;
pub mod index;
pub mod manifest;
pub mod output;
