//! Development server for graft element bundles.
//!
//! Rebuilds the bundle whenever the manifest or a component source changes and serves a
//! demo page rendering every element.

pub mod demo;
pub mod server;
pub mod watcher;

pub use demo::render_demo_page;
pub use server::{DevServer, DevServerConfig, ServerError};
pub use watcher::{FileWatcher, WatchEvent};
