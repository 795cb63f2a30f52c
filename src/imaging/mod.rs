//! Image compositing — pure Rust, zero external dependencies.
//!
//! The rest of the crate treats drawing as an opaque capability: load a base
//! image, draw overlay images onto it at offsets, save the result. That
//! capability is the [`ImageBackend`] trait; the production implementation
//! is [`RustBackend`] on the `image` crate, statically linked into the
//! binary.

pub mod backend;
pub mod rust_backend;

pub use backend::{BackendError, CompositeParams, ImageBackend, LayerDraw};
pub use rust_backend::RustBackend;
