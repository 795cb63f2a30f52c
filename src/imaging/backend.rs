//! Compositing backend trait and shared types.
//!
//! One operation: [`ImageBackend::composite`] loads a base image, draws each
//! overlay onto it at its offset, and saves the result. Keeping the whole
//! draw as a single call lets backends hold the decoded base in memory for
//! the duration instead of exposing image handles through the trait.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// One overlay draw: source image and the offset it is drawn at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerDraw {
    pub source: PathBuf,
    pub x: i64,
    pub y: i64,
}

impl LayerDraw {
    /// An overlay drawn at the origin — the standard case for full-frame
    /// layers sharing the base's dimensions.
    pub fn at_origin(source: PathBuf) -> Self {
        Self { source, x: 0, y: 0 }
    }
}

/// A complete composite operation: base, overlays in draw order, output path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeParams {
    pub base: PathBuf,
    pub overlays: Vec<LayerDraw>,
    pub output: PathBuf,
}

/// Trait for compositing backends.
pub trait ImageBackend: Sync {
    /// Load the base, draw each overlay in order, save to the output path.
    fn composite(&self, params: &CompositeParams) -> Result<(), BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock backend that records composite calls without touching pixels.
    #[derive(Default)]
    pub struct MockBackend {
        pub operations: Mutex<Vec<CompositeParams>>,
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn get_operations(&self) -> Vec<CompositeParams> {
            self.operations.lock().unwrap().clone()
        }
    }

    impl ImageBackend for MockBackend {
        fn composite(&self, params: &CompositeParams) -> Result<(), BackendError> {
            self.operations.lock().unwrap().push(params.clone());
            Ok(())
        }
    }

    #[test]
    fn mock_records_composite() {
        let backend = MockBackend::new();
        backend
            .composite(&CompositeParams {
                base: "assets/background/red/a.png".into(),
                overlays: vec![LayerDraw::at_origin("assets/character/x/b.png".into())],
                output: "output/images/1.png".into(),
            })
            .unwrap();

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].overlays.len(), 1);
        assert_eq!(ops[0].overlays[0].x, 0);
    }
}
