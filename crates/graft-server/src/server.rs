//! Development server implementation.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::State,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use tokio::sync::RwLock;
use tower_http::services::ServeDir;

use graft_bundle::{build, manifest_dir, BuildResult, Manifest};

use crate::demo::render_demo_page;
use crate::watcher::{FileWatcher, WatchEvent};

/// Configuration for the development server.
#[derive(Debug, Clone)]
pub struct DevServerConfig {
    /// Manifest to build and watch
    pub manifest_path: PathBuf,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            manifest_path: PathBuf::from("graft.toml"),
            port: 7777,
            host: "127.0.0.1".to_string(),
            open: true,
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid address {0}")]
    InvalidAddress(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("File watch error: {0}")]
    WatchError(String),
}

/// Shared server state.
struct ServerState {
    manifest_path: PathBuf,
    manifest: Manifest,
    last_build: Option<BuildResult>,
    last_error: Option<String>,
}

impl ServerState {
    fn new(manifest_path: PathBuf) -> Self {
        Self {
            manifest_path,
            manifest: Manifest::default(),
            last_build: None,
            last_error: None,
        }
    }

    /// Reload the manifest and rebuild the bundle, keeping the previous build on failure.
    fn rebuild(&mut self) {
        let manifest = match Manifest::load(&self.manifest_path) {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::error!("{}", e);
                self.last_error = Some(e.to_string());
                return;
            }
        };

        match build(&self.manifest_path, None) {
            Ok(result) => {
                tracing::info!(
                    "Rebuilt {} element(s) in {}ms",
                    result.elements.len(),
                    result.duration_ms
                );
                self.manifest = manifest;
                self.last_build = Some(result);
                self.last_error = None;
            }
            Err(e) => {
                tracing::error!("Build failed: {}", e);
                self.last_error = Some(e.to_string());
            }
        }
    }

    /// URL of the bundle, relative to the served directory, busting stale caches.
    fn bundle_url(&self) -> String {
        let url = bundle_url(&self.manifest.bundle.output);
        match &self.last_build {
            Some(build) => format!("{url}?v={}", build.bytes),
            None => url,
        }
    }
}

/// Development server.
pub struct DevServer {
    config: DevServerConfig,
}

impl DevServer {
    /// Create a new development server.
    pub fn new(config: DevServerConfig) -> Self {
        Self { config }
    }

    /// Start the development server.
    pub async fn start(self) -> Result<(), ServerError> {
        let raw_addr = format!("{}:{}", self.config.host, self.config.port);
        let addr: SocketAddr = raw_addr
            .parse()
            .map_err(|_| ServerError::InvalidAddress(raw_addr.clone()))?;

        let base_dir = manifest_dir(&self.config.manifest_path);

        let mut initial = ServerState::new(self.config.manifest_path.clone());
        initial.rebuild();
        // Watched paths arrive absolute
        let root = base_dir.canonicalize().unwrap_or_else(|_| base_dir.clone());
        let output = root.join(&initial.manifest.bundle.output);
        let state = Arc::new(RwLock::new(initial));

        // Writing the bundle must not trigger another rebuild
        let (watcher, mut rx) = FileWatcher::new(&root, Some(output))
            .map_err(|e| ServerError::WatchError(e.to_string()))?;

        let state_clone = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                handle_watch_event(&state_clone, event).await;
            }
            // Keep watcher alive
            drop(watcher);
        });

        let app = Router::new()
            .route("/", get(index_handler))
            .fallback_service(ServeDir::new(&base_dir))
            .with_state(state);

        tracing::info!("Starting dev server at http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        if self.config.open {
            let url = format!("http://{}", addr);
            let _ = open::that(&url);
        }

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }
}

/// Handle file watch events.
async fn handle_watch_event(state: &Arc<RwLock<ServerState>>, event: WatchEvent) {
    match &event {
        WatchEvent::ManifestModified(path) => {
            tracing::info!("Manifest modified: {}", path.display());
        }
        WatchEvent::SourceModified(path) => {
            tracing::info!("Source modified: {}", path.display());
        }
        WatchEvent::Created(path) | WatchEvent::Deleted(path) => {
            tracing::debug!("{:?}", event);
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if !matches!(ext, "js" | "mjs" | "toml") {
                return;
            }
        }
    }

    state.write().await.rebuild();
}

/// Handler for the demo page.
async fn index_handler(State(state): State<Arc<RwLock<ServerState>>>) -> impl IntoResponse {
    let state = state.read().await;

    Html(render_demo_page(
        &state.manifest,
        &state.bundle_url(),
        state.last_error.as_deref(),
    ))
}

fn bundle_url(output: &Path) -> String {
    let parts: Vec<String> = output
        .components()
        .filter_map(|c| match c {
            std::path::Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    format!("/{}", parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn creates_server_with_default_config() {
        let server = DevServer::new(DevServerConfig::default());
        assert_eq!(server.config.port, 7777);
        assert_eq!(server.config.manifest_path, PathBuf::from("graft.toml"));
    }

    #[test]
    fn bundle_url_is_rooted() {
        assert_eq!(bundle_url(Path::new("dist/elements.js")), "/dist/elements.js");
        assert_eq!(bundle_url(Path::new("./out.js")), "/out.js");
    }

    #[test]
    fn rebuild_records_success_and_failure() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("graft.toml");
        fs::write(
            &path,
            "[[element]]\ntag = \"x-card\"\ncomponent = \"Card\"\n",
        )
        .unwrap();

        let mut state = ServerState::new(path.clone());
        state.rebuild();
        assert!(state.last_error.is_none());
        assert_eq!(state.last_build.as_ref().unwrap().elements.len(), 1);
        assert!(temp.path().join("dist/elements.js").exists());

        fs::write(&path, "[[element]]\ntag = \"card\"\ncomponent = \"Card\"\n").unwrap();
        state.rebuild();
        assert!(state.last_error.as_ref().unwrap().contains("hyphen"));
        // Previous manifest and build survive
        assert!(state.manifest.element("x-card").is_some());
        assert!(state.last_build.is_some());
    }

    #[test]
    fn failed_bundle_keeps_previous_manifest() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("graft.toml");
        fs::write(&path, "[[element]]\ntag = \"x-card\"\ncomponent = \"Card\"\n").unwrap();

        let mut state = ServerState::new(path.clone());
        state.rebuild();
        let bytes = state.last_build.as_ref().unwrap().bytes;

        // Parses, but the source does not exist
        fs::write(
            &path,
            "[[element]]\ntag = \"x-other\"\ncomponent = \"Other\"\nsource = \"missing.js\"\n",
        )
        .unwrap();
        state.rebuild();

        assert!(state.last_error.as_ref().unwrap().contains("missing.js"));
        assert!(state.manifest.element("x-card").is_some());
        assert!(state.manifest.element("x-other").is_none());
        assert_eq!(state.last_build.as_ref().unwrap().bytes, bytes);
    }
}
