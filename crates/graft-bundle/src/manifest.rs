//! `graft.toml` manifest: which components become which elements.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use graft_element::schema::deserialize_ordered;
use graft_element::{validate_tag_name, DefineError, EventMap, PropSchema, RenderMode, ShadowMode};

/// Parsed manifest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub bundle: BundleConfig,

    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Element definitions, in registration order
    #[serde(default, rename = "element")]
    pub elements: Vec<ElementManifest>,
}

/// Where the bundle goes and what it inlines.
#[derive(Debug, Clone, Deserialize)]
pub struct BundleConfig {
    /// Output script path, relative to the manifest
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Scripts inlined before anything else (e.g., the UI runtime itself)
    #[serde(default)]
    pub prelude: Vec<PathBuf>,

    /// Directory whose `.js` files are all inlined as component sources
    #[serde(default)]
    pub components_dir: Option<PathBuf>,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            prelude: Vec::new(),
            components_dir: None,
        }
    }
}

/// JavaScript expressions the generated elements use to reach the UI runtime.
#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeConfig {
    /// `createElement(component, props, ...children)`
    #[serde(default = "default_create_element")]
    pub create_element: String,

    /// `createRoot(container)` returning an object with `render` and `unmount`
    #[serde(default = "default_create_root")]
    pub create_root: String,

    /// Strict-mode wrapper component
    #[serde(default = "default_strict_mode")]
    pub strict_mode: String,

    /// Wrap every render in `strict_mode`
    #[serde(default = "default_true")]
    pub strict: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            create_element: default_create_element(),
            create_root: default_create_root(),
            strict_mode: default_strict_mode(),
            strict: true,
        }
    }
}

impl RuntimeConfig {
    pub fn render_mode(&self) -> RenderMode {
        if self.strict {
            RenderMode::Strict
        } else {
            RenderMode::Standard
        }
    }
}

/// One `[[element]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ElementManifest {
    /// Custom element tag name
    pub tag: String,

    /// JavaScript expression naming the component (e.g., "HelloCard")
    pub component: String,

    /// File defining the component, relative to the manifest
    #[serde(default)]
    pub source: Option<PathBuf>,

    /// Shadow root mode; omitted renders into the light DOM
    #[serde(default)]
    pub shadow: Option<ShadowMode>,

    #[serde(default)]
    pub props: PropSchema,

    #[serde(default)]
    pub events: EventMap,

    /// Attributes used when rendering this element on the demo page
    #[serde(default, deserialize_with = "deserialize_ordered")]
    pub demo: Vec<(String, String)>,
}

impl ElementManifest {
    pub fn observed_attributes(&self) -> Vec<String> {
        self.props.names().map(str::to_string).collect()
    }
}

fn default_output() -> PathBuf {
    PathBuf::from("dist/elements.js")
}
fn default_create_element() -> String {
    "React.createElement".to_string()
}
fn default_create_root() -> String {
    "ReactDOM.createRoot".to_string()
}
fn default_strict_mode() -> String {
    "React.StrictMode".to_string()
}
fn default_true() -> bool {
    true
}

/// Dotted JavaScript identifier path, e.g. `ReactDOM.createRoot`.
static EXPRESSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_$][\w$]*(?:\.[A-Za-z_$][\w$]*)*$").expect("Invalid expression regex")
});

/// Errors that can occur when loading a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse manifest: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid element: {0}")]
    InvalidTag(#[from] DefineError),

    #[error("Invalid {field} for {context}: '{value}' is not a JavaScript identifier path")]
    InvalidExpression {
        field: &'static str,
        context: String,
        value: String,
    },
}

impl Manifest {
    /// Load and validate a manifest file.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.display().to_string(),
            source,
        })?;
        content.parse()
    }

    /// Find an element by tag.
    pub fn element(&self, tag: &str) -> Option<&ElementManifest> {
        self.elements.iter().find(|e| e.tag == tag)
    }

    fn validate(mut self) -> Result<Self, ManifestError> {
        for (field, value) in [
            ("create_element", &self.runtime.create_element),
            ("create_root", &self.runtime.create_root),
            ("strict_mode", &self.runtime.strict_mode),
        ] {
            check_expression(field, "[runtime]", value)?;
        }

        for element in &self.elements {
            validate_tag_name(&element.tag)?;
            check_expression("component", &element.tag, &element.component)?;
        }

        // Later entries for a tag would never register; keep the first.
        let mut seen = HashSet::new();
        self.elements.retain(|element| {
            let first = seen.insert(element.tag.clone());
            if !first {
                tracing::warn!("Duplicate element '{}' in manifest, keeping the first", element.tag);
            }
            first
        });

        Ok(self)
    }
}

impl std::str::FromStr for Manifest {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let manifest: Manifest = toml::from_str(s)?;
        manifest.validate()
    }
}

fn check_expression(field: &'static str, context: &str, value: &str) -> Result<(), ManifestError> {
    if EXPRESSION_RE.is_match(value) {
        return Ok(());
    }
    Err(ManifestError::InvalidExpression {
        field,
        context: context.to_string(),
        value: value.to_string(),
    })
}
