//! Manifest loading and script bundling for graft custom elements.
//!
//! Reads a `graft.toml` manifest and produces one self-contained classic script that
//! defines every listed element, for delivery with a plain `<script>` tag.

pub mod bundler;
pub mod generator;
pub mod manifest;

pub use bundler::{build, manifest_dir, BuildResult, BundleError, BundleOutput, BundledElement, Bundler};
pub use generator::{generate_element, generate_prelude};
pub use manifest::{BundleConfig, ElementManifest, Manifest, ManifestError, RuntimeConfig};
