//! Self-contained script bundling.
//!
//! A bundle is one classic script: an IIFE holding the prelude scripts, the component
//! sources, the shared helpers and every element class. It resolves no modules and may be
//! included more than once on a page.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Instant;

use regex::Regex;
use walkdir::WalkDir;

use crate::generator::{generate_element, generate_prelude};
use crate::manifest::{Manifest, ManifestError};

/// A bundled element, for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundledElement {
    pub tag: String,

    /// Observed attributes in schema order
    pub attributes: Vec<String>,
}

/// Result of bundling a manifest.
#[derive(Debug, Clone)]
pub struct BundleOutput {
    /// The complete script
    pub script: String,

    pub elements: Vec<BundledElement>,

    /// Every file inlined, in inclusion order
    pub sources: Vec<PathBuf>,
}

/// Result of writing a bundle to disk.
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub output_path: PathBuf,

    pub elements: Vec<BundledElement>,

    /// Script size in bytes
    pub bytes: usize,

    pub duration_ms: u64,
}

/// Errors that can occur while bundling.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("Failed to read {path}: {message}")]
    ReadError { path: String, message: String },

    #[error("{0} uses import/export; bundle sources must be classic scripts")]
    ModuleSyntax(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),
}

static MODULE_SYNTAX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*(?:import(?:\s+[\w*{]|\s*['"{*])|export\s)"#).expect("Invalid module syntax regex")
});

/// Bundles manifests whose relative paths resolve against `base_dir`.
#[derive(Debug, Clone)]
pub struct Bundler {
    base_dir: PathBuf,
}

impl Bundler {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Bundle every element of `manifest` into one script.
    pub fn bundle(&self, manifest: &Manifest) -> Result<BundleOutput, BundleError> {
        let mut sections = Vec::new();
        let mut sources = Vec::new();

        for path in &manifest.bundle.prelude {
            let path = self.base_dir.join(path);
            sections.push(self.inline(&path, "prelude")?);
            sources.push(path);
        }

        for path in self.component_sources(manifest) {
            sections.push(self.inline(&path, "component")?);
            sources.push(path);
        }

        sections.push(generate_prelude());

        let mut elements = Vec::new();
        for element in &manifest.elements {
            sections.push(generate_element(element, &manifest.runtime));
            elements.push(BundledElement {
                tag: element.tag.clone(),
                attributes: element.observed_attributes(),
            });
        }

        // Sections are not re-indented: that would alter multi-line string literals.
        let body = sections.join("\n");

        let script = format!(
            "/* graft bundle: {count} element(s) */\n\
             (function () {{\n  'use strict';\n  if (typeof customElements === 'undefined') return;\n\n{body}}})();\n",
            count = elements.len(),
        );

        Ok(BundleOutput {
            script,
            elements,
            sources,
        })
    }

    /// Explicit element sources first, then the component directory, without repeats.
    ///
    /// Prelude scripts and the bundle's own output are never component sources.
    fn component_sources(&self, manifest: &Manifest) -> Vec<PathBuf> {
        let mut excluded: Vec<PathBuf> = manifest
            .bundle
            .prelude
            .iter()
            .map(|path| self.base_dir.join(path))
            .collect();
        excluded.push(self.base_dir.join(&manifest.bundle.output));

        let mut paths: Vec<PathBuf> = Vec::new();

        for element in &manifest.elements {
            if let Some(source) = &element.source {
                let path = self.base_dir.join(source);
                if !paths.contains(&path) && !excluded.contains(&path) {
                    paths.push(path);
                }
            }
        }

        if let Some(dir) = &manifest.bundle.components_dir {
            let dir = self.base_dir.join(dir);
            if !dir.exists() {
                tracing::warn!("Components directory not found: {}", dir.display());
            }

            for entry in WalkDir::new(&dir)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();

                let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
                if ext != "js" && ext != "mjs" {
                    continue;
                }

                // Skip test files and stories
                let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
                if filename.contains(".test.")
                    || filename.contains(".spec.")
                    || filename.contains(".stories.")
                {
                    continue;
                }

                let path = path.to_path_buf();
                if excluded.contains(&path) {
                    tracing::debug!("Skipping {} in components directory", path.display());
                    continue;
                }
                if !paths.contains(&path) {
                    paths.push(path);
                }
            }
        }

        paths
    }

    fn inline(&self, path: &Path, label: &str) -> Result<String, BundleError> {
        let source = fs::read_to_string(path).map_err(|e| BundleError::ReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        if MODULE_SYNTAX_RE.is_match(&source) {
            return Err(BundleError::ModuleSyntax(path.display().to_string()));
        }

        let name = path.strip_prefix(&self.base_dir).unwrap_or(path);
        tracing::debug!("Inlining {} {}", label, name.display());

        Ok(format!("// {label}: {}\n{}\n", name.display(), source.trim_end()))
    }
}

/// Load the manifest at `manifest_path`, bundle it and write the script.
///
/// `output` overrides the manifest's output path; relative paths resolve against the
/// manifest's directory.
pub fn build(manifest_path: &Path, output: Option<&Path>) -> Result<BuildResult, BundleError> {
    let start = Instant::now();

    let manifest = Manifest::load(manifest_path)?;
    let base_dir = manifest_dir(manifest_path);

    let bundle = Bundler::new(&base_dir).bundle(&manifest)?;

    let output_path = base_dir.join(output.unwrap_or(manifest.bundle.output.as_path()));
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).map_err(|e| BundleError::WriteError(e.to_string()))?;
    }
    fs::write(&output_path, &bundle.script).map_err(|e| BundleError::WriteError(e.to_string()))?;

    Ok(BuildResult {
        output_path,
        elements: bundle.elements,
        bytes: bundle.script.len(),
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

/// Directory relative manifest paths resolve against.
pub fn manifest_dir(manifest_path: &Path) -> PathBuf {
    manifest_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    const MANIFEST: &str = r#"
[bundle]
prelude = ["vendor/runtime.js"]
components_dir = "components"

[[element]]
tag = "x-hello-card"
component = "HelloCard"
source = "components/hello-card.js"
props = { name = "string" }

[[element]]
tag = "x-counter"
component = "Counter"
shadow = "open"
props = { start = "number", step = "number" }
events = { onChange = "change" }
"#;

    fn project() -> tempfile::TempDir {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("vendor")).unwrap();
        fs::create_dir_all(root.join("components")).unwrap();

        fs::write(root.join("graft.toml"), MANIFEST).unwrap();
        fs::write(root.join("vendor/runtime.js"), "var Runtime = {};").unwrap();
        fs::write(
            root.join("components/hello-card.js"),
            "function HelloCard(props) { return null; }",
        )
        .unwrap();
        fs::write(
            root.join("components/counter.js"),
            "function Counter(props) { return null; }",
        )
        .unwrap();
        fs::write(root.join("components/counter.test.js"), "test('x', () => {});").unwrap();

        temp
    }

    #[test]
    fn bundles_sources_in_order() {
        let temp = project();
        let manifest = Manifest::load(&temp.path().join("graft.toml")).unwrap();

        let output = Bundler::new(temp.path()).bundle(&manifest).unwrap();

        let names: Vec<_> = output
            .sources
            .iter()
            .map(|p| p.strip_prefix(temp.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("vendor/runtime.js"),
                PathBuf::from("components/hello-card.js"),
                PathBuf::from("components/counter.js"),
            ]
        );

        let runtime = output.script.find("var Runtime").unwrap();
        let hello = output.script.find("function HelloCard").unwrap();
        let helpers = output.script.find("const __graftCoerce").unwrap();
        let class = output.script.find("class XHelloCard").unwrap();
        assert!(runtime < hello && hello < helpers && helpers < class);
        assert!(!output.script.contains("test('x'"));
    }

    #[test]
    fn reports_elements_and_attributes() {
        let temp = project();
        let manifest = Manifest::load(&temp.path().join("graft.toml")).unwrap();

        let output = Bundler::new(temp.path()).bundle(&manifest).unwrap();

        assert_eq!(
            output.elements,
            vec![
                BundledElement {
                    tag: "x-hello-card".to_string(),
                    attributes: vec!["name".to_string()],
                },
                BundledElement {
                    tag: "x-counter".to_string(),
                    attributes: vec!["start".to_string(), "step".to_string()],
                },
            ]
        );
    }

    #[test]
    fn bundle_is_a_single_guarded_script() {
        let temp = project();
        let manifest = Manifest::load(&temp.path().join("graft.toml")).unwrap();

        let script = Bundler::new(temp.path()).bundle(&manifest).unwrap().script;

        assert!(script.starts_with("/* graft bundle: 2 element(s) */\n(function () {"));
        assert!(script.trim_end().ends_with("})();"));
        assert_eq!(script.matches("if (customElements.get(tag)) return;").count(), 2);
        assert!(!script.contains("\nimport "));
    }

    #[test]
    fn rejects_module_sources() {
        let temp = project();
        fs::write(
            temp.path().join("components/hello-card.js"),
            "import React from 'react';\nexport function HelloCard() {}",
        )
        .unwrap();
        let manifest = Manifest::load(&temp.path().join("graft.toml")).unwrap();

        let result = Bundler::new(temp.path()).bundle(&manifest);

        assert!(matches!(result, Err(BundleError::ModuleSyntax(path)) if path.ends_with("hello-card.js")));
    }

    #[test]
    fn missing_source_is_read_error() {
        let temp = project();
        fs::remove_file(temp.path().join("vendor/runtime.js")).unwrap();
        let manifest = Manifest::load(&temp.path().join("graft.toml")).unwrap();

        let result = Bundler::new(temp.path()).bundle(&manifest);

        assert!(matches!(result, Err(BundleError::ReadError { .. })));
    }

    #[test]
    fn build_writes_output() {
        let temp = project();

        let result = build(&temp.path().join("graft.toml"), None).unwrap();

        assert_eq!(result.output_path, temp.path().join("dist/elements.js"));
        let written = fs::read_to_string(&result.output_path).unwrap();
        assert_eq!(written.len(), result.bytes);
        assert_eq!(result.elements.len(), 2);
    }

    #[test]
    fn build_honors_output_override() {
        let temp = project();

        let result = build(&temp.path().join("graft.toml"), Some(Path::new("out/custom.js"))).unwrap();

        assert!(result.output_path.ends_with("out/custom.js"));
        assert!(result.output_path.exists());
    }

    #[test]
    fn repeated_builds_skip_output_and_prelude() {
        let temp = project();
        let manifest = MANIFEST.replace(r#"components_dir = "components""#, r#"components_dir = ".""#);
        fs::write(temp.path().join("graft.toml"), manifest).unwrap();
        let manifest_path = temp.path().join("graft.toml");

        let sizes: Vec<usize> = (0..3)
            .map(|_| build(&manifest_path, None).unwrap().bytes)
            .collect();

        assert_eq!(sizes[0], sizes[1]);
        assert_eq!(sizes[1], sizes[2]);
        let script = fs::read_to_string(temp.path().join("dist/elements.js")).unwrap();
        assert_eq!(script.matches("var Runtime").count(), 1);
        assert_eq!(script.matches("class XHelloCard extends").count(), 1);
    }

    #[test]
    fn manifest_dir_of_bare_file_is_current_dir() {
        assert_eq!(manifest_dir(Path::new("graft.toml")), PathBuf::from("."));
        assert_eq!(manifest_dir(Path::new("site/graft.toml")), PathBuf::from("site"));
    }
}
