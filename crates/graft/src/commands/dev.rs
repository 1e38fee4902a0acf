//! Development server command.

use std::path::PathBuf;

use anyhow::Result;
use graft_server::{DevServer, DevServerConfig};

/// Run the dev server.
pub async fn run(manifest_path: PathBuf, port: u16, open: bool) -> Result<()> {
    if !manifest_path.exists() {
        anyhow::bail!(
            "Manifest not found: {}. Run 'graft init' first.",
            manifest_path.display()
        );
    }

    tracing::info!("Starting development server on port {}", port);

    let config = DevServerConfig {
        manifest_path,
        port,
        open,
        ..Default::default()
    };

    DevServer::new(config).start().await?;

    Ok(())
}
