//! Pure-Rust compositing backend on the `image` crate.

use super::backend::{BackendError, CompositeParams, ImageBackend};
use image::imageops;
use std::fs;

/// Production backend. Alpha-blended overlay via `imageops::overlay`; the
/// output format follows the output path's extension.
#[derive(Debug, Default)]
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ImageBackend for RustBackend {
    fn composite(&self, params: &CompositeParams) -> Result<(), BackendError> {
        let mut base = image::open(&params.base)?.to_rgba8();

        for layer in &params.overlays {
            let top = image::open(&layer.source)?.to_rgba8();
            imageops::overlay(&mut base, &top, layer.x, layer.y);
        }

        if let Some(parent) = params.output.parent() {
            fs::create_dir_all(parent)?;
        }
        base.save(&params.output)?;
        Ok(())
    }
}
