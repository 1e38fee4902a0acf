//! Bundle build command.

use std::path::{Path, PathBuf};

use anyhow::Result;

/// Run the build command.
pub async fn run(manifest_path: &Path, output: Option<PathBuf>) -> Result<()> {
    tracing::info!("Bundling {}...", manifest_path.display());

    let result = graft_bundle::build(manifest_path, output.as_deref())?;

    for element in &result.elements {
        tracing::debug!("<{}> observes [{}]", element.tag, element.attributes.join(", "));
    }

    tracing::info!(
        "Bundled {} element(s), {} bytes in {}ms",
        result.elements.len(),
        result.bytes,
        result.duration_ms
    );

    tracing::info!("Output: {}", result.output_path.display());

    Ok(())
}
