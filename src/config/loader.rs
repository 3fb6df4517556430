// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{Manifest, RawManifest};
use crate::errors::Result;

/// Load a jobs manifest from a given path and return the raw `RawManifest`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation (reference correctness, cycles, etc.). Use
/// [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawManifest> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let manifest: RawManifest = toml::from_str(&contents)?;

    Ok(manifest)
}

/// Load a jobs manifest from path and run validation.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks for:
///   - unknown / self / duplicated `depends_on` and `target` references,
///   - reference cycles,
///   - basic pool-size sanity.
///
/// The resulting [`Manifest`] holds root job record subtrees ready to be
/// built through the registry and handed to the scheduler.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Manifest> {
    let raw_manifest = load_from_path(&path)?;
    let manifest = Manifest::try_from(raw_manifest)?;
    Ok(manifest)
}

/// Helper to resolve a default manifest path.
pub fn default_manifest_path() -> PathBuf {
    PathBuf::from("Jobs.toml")
}
