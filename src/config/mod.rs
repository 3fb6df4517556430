// src/config/mod.rs

//! Jobs manifest loading and validation.
//!
//! - [`model`] holds the raw TOML model and the validated [`model::Manifest`].
//! - [`loader`] reads the file.
//! - [`validate`] checks references and cycles, then builds record subtrees.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_manifest_path, load_and_validate, load_from_path};
pub use model::{JobEntry, Manifest, RawManifest};
